//! Contains functionality related to BSON binary values.

use std::fmt::{self, Display};

use base64::{Engine, engine::general_purpose::STANDARD};

use crate::{
    error::{Error, Result},
    raw::RawBinaryRef,
    spec::BinarySubtype,
};

/// Represents a BSON binary value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Binary {
    /// The subtype of the bytes.
    pub subtype: BinarySubtype,

    /// The binary bytes.
    pub bytes: Vec<u8>,
}

impl Display for Binary {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(
            fmt,
            "Binary({:#x}, {})",
            u8::from(self.subtype),
            STANDARD.encode(&self.bytes)
        )
    }
}

impl Binary {
    /// Creates a [`Binary`] from a base64 string and optional [`BinarySubtype`]. If the
    /// `subtype` argument is [`None`], the [`Binary`] constructed will default to
    /// [`BinarySubtype::Generic`].
    ///
    /// ```rust
    /// # use bsonbuf::Binary;
    /// let binary = Binary::from_base64("aGVsbG8=", None)?;
    /// assert_eq!(binary.bytes, b"hello");
    /// # Ok::<(), bsonbuf::error::Error>(())
    /// ```
    pub fn from_base64(
        input: impl AsRef<str>,
        subtype: impl Into<Option<BinarySubtype>>,
    ) -> Result<Self> {
        let bytes = STANDARD
            .decode(input.as_ref())
            .map_err(Error::malformed_value)?;
        let subtype = match subtype.into() {
            Some(s) => s,
            None => BinarySubtype::Generic,
        };
        Ok(Binary { subtype, bytes })
    }

    /// Borrow the contents as a [`RawBinaryRef`].
    pub fn as_raw_binary(&self) -> RawBinaryRef<'_> {
        RawBinaryRef {
            bytes: self.bytes.as_slice(),
            subtype: self.subtype,
        }
    }
}

#[cfg(feature = "uuid-1")]
impl From<uuid::Uuid> for Binary {
    fn from(uuid: uuid::Uuid) -> Self {
        Binary {
            subtype: BinarySubtype::Uuid,
            bytes: uuid.as_bytes().to_vec(),
        }
    }
}

#[cfg(feature = "uuid-1")]
impl RawBinaryRef<'_> {
    /// Interpret this binary as a UUID. Fails if the subtype is not [`BinarySubtype::Uuid`] or the
    /// payload is not exactly 16 bytes.
    pub fn to_uuid(self) -> Result<uuid::Uuid> {
        if self.subtype != BinarySubtype::Uuid {
            return Err(Error::malformed_value(format!(
                "expected binary subtype {:#x} for a UUID, got {:#x}",
                u8::from(BinarySubtype::Uuid),
                u8::from(self.subtype)
            )));
        }
        uuid::Uuid::from_slice(self.bytes).map_err(Error::malformed_value)
    }
}
