use core::str;

use crate::error::{Error, Result};

/// A borrowed BSON-spec cstring: zero or more UTF-8 encoded characters, excluding the nul byte.
/// Constructed at run-time from a [`prim@str`] via [`TryFrom`], which rejects interior nul bytes.
///
/// Unlike [`std::ffi::CStr`], this is required to be valid UTF-8, and does not include the nul
/// terminator in the buffer.
///
/// ```
/// use bsonbuf::raw::CStr;
///
/// let key: &CStr = "hello".try_into()?;
/// assert_eq!(key.as_str(), "hello");
///
/// let invalid: Result<&CStr, _> = "foo\0bar".try_into();
/// assert!(invalid.is_err());
/// # Ok::<(), bsonbuf::error::Error>(())
/// ```
#[derive(Debug, PartialEq, Eq)]
#[repr(transparent)]
pub struct CStr {
    data: [u8],
}

impl<'a> TryFrom<&'a str> for &'a CStr {
    type Error = Error;

    fn try_from(value: &str) -> Result<&CStr> {
        match validate_cstr(value) {
            Some(cs) => Ok(cs),
            None => Err(Error::malformed_value(format!(
                "cstring with interior null: {:?}",
                value,
            ))),
        }
    }
}

impl CStr {
    pub(crate) fn from_str(value: &str) -> Result<&CStr> {
        value.try_into()
    }

    const fn from_str_unchecked(value: &str) -> &Self {
        // Safety: the conversion is safe because CStr is repr(transparent), and the deref is safe
        // because the pointer came from a safe reference.
        unsafe { &*(value.as_bytes() as *const [u8] as *const CStr) }
    }

    /// View the buffer as a Rust `&str`.
    pub fn as_str(&self) -> &str {
        // Safety: the only way to construct a CStr is from a valid &str.
        unsafe { str::from_utf8_unchecked(&self.data) }
    }

    /// The length in bytes of the buffer.
    pub fn len(&self) -> usize {
        self.as_str().len()
    }

    /// Whether the buffer contains zero bytes.
    pub fn is_empty(&self) -> bool {
        self.as_str().is_empty()
    }

    pub(crate) fn append_to(&self, buf: &mut Vec<u8>) {
        buf.extend(&self.data);
        buf.push(0);
    }
}

impl AsRef<CStr> for CStr {
    fn as_ref(&self) -> &CStr {
        self
    }
}

impl AsRef<str> for CStr {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

const fn validate_cstr(text: &str) -> Option<&CStr> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == 0 {
            return None;
        }
        i += 1;
    }
    Some(CStr::from_str_unchecked(text))
}
