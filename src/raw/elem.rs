use crate::{
    DateTime,
    Decimal128,
    Timestamp,
    error::{Error, Result},
    oid::ObjectId,
    spec::{BinarySubtype, ElementType},
};

use super::{
    RawArray,
    RawBinaryRef,
    RawBsonRef,
    RawDbPointerRef,
    RawDocument,
    RawJavaScriptCodeWithScopeRef,
    RawRegexRef,
    bytes_array,
    checked_add,
    f64_from_slice,
    i32_from_slice,
    i64_from_slice,
    read_lenencoded,
    read_nullterminated,
    usize_from_slice,
};

/// A single key/type/payload triple located inside an encoded document.
///
/// A `RawElement` is only a position: the key has been read and the payload's extent checked,
/// but the payload itself is decoded on request. The typed getters verify the declared type
/// before decoding and fail with
/// [`ErrorKind::TypeMismatch`](crate::error::ErrorKind::TypeMismatch) otherwise.
///
/// ```
/// use bsonbuf::{Builder, error::ErrorKind};
///
/// let mut builder = Builder::new();
/// builder.append("name", "ferris")?;
/// let doc = builder.view()?;
///
/// let element = doc.get_element("name")?;
/// assert_eq!(element.get_str()?, "ferris");
/// assert!(matches!(
///     element.get_i32().unwrap_err().kind,
///     ErrorKind::TypeMismatch { .. }
/// ));
/// # Ok::<(), bsonbuf::error::Error>(())
/// ```
#[derive(Clone, Copy, Debug)]
pub struct RawElement<'a> {
    key: &'a str,
    kind: ElementType,
    doc: &'a RawDocument,
    start_at: usize,
    size: usize,
}

impl<'a> RawElement<'a> {
    pub(super) fn new(
        key: &'a str,
        kind: ElementType,
        doc: &'a RawDocument,
        start_at: usize,
        size: usize,
    ) -> Self {
        Self {
            key,
            kind,
            doc,
            start_at,
            size,
        }
    }

    /// The element's key.
    pub fn key(&self) -> &'a str {
        self.key
    }

    /// The element's declared type.
    pub fn element_type(&self) -> ElementType {
        self.kind
    }

    /// The length in bytes of the encoded value.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Whether the encoded value occupies zero bytes (null, undefined, min key and max key).
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// The encoded value, without the type tag or key.
    pub fn value_bytes(&self) -> &'a [u8] {
        &self.doc.as_bytes()[self.start_at..self.start_at + self.size]
    }

    /// Decode the value of this element.
    pub fn value(&self) -> Result<RawBsonRef<'a>> {
        self.decode().map_err(|e| e.with_key(self.key))
    }

    fn decode(&self) -> Result<RawBsonRef<'a>> {
        let data = self.value_bytes();
        Ok(match self.kind {
            ElementType::Null => RawBsonRef::Null,
            ElementType::Undefined => RawBsonRef::Undefined,
            ElementType::MinKey => RawBsonRef::MinKey,
            ElementType::MaxKey => RawBsonRef::MaxKey,
            ElementType::ObjectId => RawBsonRef::ObjectId(ObjectId::from_bytes(bytes_array(data)?)),
            ElementType::Int32 => RawBsonRef::Int32(i32_from_slice(data)?),
            ElementType::Int64 => RawBsonRef::Int64(i64_from_slice(data)?),
            ElementType::Double => RawBsonRef::Double(f64_from_slice(data)?),
            ElementType::String => RawBsonRef::String(read_lenencoded(data)?),
            ElementType::JavaScriptCode => RawBsonRef::JavaScriptCode(read_lenencoded(data)?),
            ElementType::Symbol => RawBsonRef::Symbol(read_lenencoded(data)?),
            ElementType::EmbeddedDocument => RawBsonRef::Document(RawDocument::from_bytes(data)?),
            ElementType::Array => {
                RawBsonRef::Array(RawArray::from_doc(RawDocument::from_bytes(data)?))
            }
            ElementType::Boolean => RawBsonRef::Boolean(match data.first() {
                Some(0) => false,
                Some(1) => true,
                other => {
                    return Err(Error::malformed_value(format!(
                        "boolean must be stored as 0 or 1, got {:?}",
                        other
                    )));
                }
            }),
            ElementType::DateTime => {
                RawBsonRef::DateTime(DateTime::from_millis(i64_from_slice(data)?))
            }
            ElementType::Timestamp => RawBsonRef::Timestamp(Timestamp::from_le_bytes(
                bytes_array(data)?,
            )),
            ElementType::Decimal128 => {
                RawBsonRef::Decimal128(Decimal128::from_bytes(bytes_array(data)?))
            }
            ElementType::Binary => RawBsonRef::Binary(read_binary(data)?),
            ElementType::RegularExpression => {
                let pattern = read_nullterminated(data)?;
                let options = read_nullterminated(&data[pattern.len() + 1..])?;
                RawBsonRef::RegularExpression(RawRegexRef { pattern, options })
            }
            ElementType::DbPointer => {
                let namespace = read_lenencoded(data)?;
                let id_at = 4 + namespace.len() + 1;
                let id = ObjectId::from_bytes(bytes_array(&data[id_at..])?);
                RawBsonRef::DbPointer(RawDbPointerRef { namespace, id })
            }
            ElementType::JavaScriptCodeWithScope => {
                RawBsonRef::JavaScriptCodeWithScope(read_code_with_scope(data)?)
            }
        })
    }

    fn get_with<T>(
        &self,
        expected: ElementType,
        f: impl FnOnce(RawBsonRef<'a>) -> Option<T>,
    ) -> Result<T> {
        if self.kind != expected {
            return Err(Error::type_mismatch(self.kind, expected).with_key(self.key));
        }
        let value = self.value()?;
        f(value).ok_or_else(|| Error::type_mismatch(self.kind, expected).with_key(self.key))
    }

    /// Gets the value as a BSON double.
    pub fn get_f64(&self) -> Result<f64> {
        self.get_with(ElementType::Double, RawBsonRef::as_f64)
    }

    /// Gets the value as a UTF-8 string.
    pub fn get_str(&self) -> Result<&'a str> {
        self.get_with(ElementType::String, RawBsonRef::as_str)
    }

    /// Gets the value as an embedded document, as a view over the same bytes.
    pub fn get_document(&self) -> Result<&'a RawDocument> {
        self.get_with(ElementType::EmbeddedDocument, RawBsonRef::as_document)
    }

    /// Gets the value as an array, as a view over the same bytes.
    pub fn get_array(&self) -> Result<&'a RawArray> {
        self.get_with(ElementType::Array, RawBsonRef::as_array)
    }

    /// Gets the value as binary data.
    pub fn get_binary(&self) -> Result<RawBinaryRef<'a>> {
        self.get_with(ElementType::Binary, RawBsonRef::as_binary)
    }

    /// Checks that the value is the deprecated BSON undefined.
    pub fn get_undefined(&self) -> Result<()> {
        self.get_with(ElementType::Undefined, RawBsonRef::as_undefined)
    }

    /// Gets the value as an ObjectId.
    pub fn get_object_id(&self) -> Result<ObjectId> {
        self.get_with(ElementType::ObjectId, RawBsonRef::as_object_id)
    }

    /// Gets the value as a boolean.
    pub fn get_bool(&self) -> Result<bool> {
        self.get_with(ElementType::Boolean, RawBsonRef::as_bool)
    }

    /// Gets the value as a UTC datetime.
    pub fn get_datetime(&self) -> Result<DateTime> {
        self.get_with(ElementType::DateTime, RawBsonRef::as_datetime)
    }

    /// Checks that the value is BSON null.
    pub fn get_null(&self) -> Result<()> {
        self.get_with(ElementType::Null, RawBsonRef::as_null)
    }

    /// Gets the value as a regular expression.
    pub fn get_regex(&self) -> Result<RawRegexRef<'a>> {
        self.get_with(ElementType::RegularExpression, RawBsonRef::as_regex)
    }

    /// Gets the value as a DBPointer.
    pub fn get_db_pointer(&self) -> Result<RawDbPointerRef<'a>> {
        self.get_with(ElementType::DbPointer, RawBsonRef::as_db_pointer)
    }

    /// Gets the value as JavaScript code.
    pub fn get_javascript_code(&self) -> Result<&'a str> {
        self.get_with(ElementType::JavaScriptCode, RawBsonRef::as_javascript)
    }

    /// Gets the value as a symbol.
    pub fn get_symbol(&self) -> Result<&'a str> {
        self.get_with(ElementType::Symbol, RawBsonRef::as_symbol)
    }

    /// Gets the value as JavaScript code with its scope document.
    pub fn get_javascript_code_with_scope(&self) -> Result<RawJavaScriptCodeWithScopeRef<'a>> {
        self.get_with(
            ElementType::JavaScriptCodeWithScope,
            RawBsonRef::as_javascript_with_scope,
        )
    }

    /// Gets the value as a 32-bit integer.
    pub fn get_i32(&self) -> Result<i32> {
        self.get_with(ElementType::Int32, RawBsonRef::as_i32)
    }

    /// Gets the value as a timestamp.
    pub fn get_timestamp(&self) -> Result<Timestamp> {
        self.get_with(ElementType::Timestamp, RawBsonRef::as_timestamp)
    }

    /// Gets the value as a 64-bit integer.
    pub fn get_i64(&self) -> Result<i64> {
        self.get_with(ElementType::Int64, RawBsonRef::as_i64)
    }

    /// Gets the value as a Decimal128.
    pub fn get_decimal128(&self) -> Result<Decimal128> {
        self.get_with(ElementType::Decimal128, RawBsonRef::as_decimal128)
    }

    /// Checks that the value is a min key.
    pub fn get_min_key(&self) -> Result<()> {
        self.get_with(ElementType::MinKey, RawBsonRef::as_min_key)
    }

    /// Checks that the value is a max key.
    pub fn get_max_key(&self) -> Result<()> {
        self.get_with(ElementType::MaxKey, RawBsonRef::as_max_key)
    }
}

fn read_binary(data: &[u8]) -> Result<RawBinaryRef<'_>> {
    let len = usize_from_slice(data)?;
    let subtype = BinarySubtype::from(*data.get(4).ok_or_else(|| {
        Error::malformed_value("binary value is missing its subtype")
    })?);
    let payload = &data[5..];
    if payload.len() != len {
        return Err(Error::malformed_value(format!(
            "binary has wrong declared length: {} vs {}",
            len,
            payload.len()
        )));
    }

    let bytes = match subtype {
        BinarySubtype::BinaryOld => {
            if len < 4 {
                return Err(Error::malformed_value(
                    "old binary subtype has no inner declared length",
                ));
            }
            let oldlength = usize_from_slice(payload)?;
            if checked_add(oldlength, 4)? != len {
                return Err(Error::malformed_value(
                    "old binary subtype has wrong inner declared length",
                ));
            }
            &payload[4..]
        }
        _ => payload,
    };
    Ok(RawBinaryRef { subtype, bytes })
}

fn read_code_with_scope(data: &[u8]) -> Result<RawJavaScriptCodeWithScopeRef<'_>> {
    let length = usize_from_slice(data)?;
    if length != data.len() {
        return Err(Error::malformed_value(
            "code with scope has wrong declared length",
        ));
    }

    let code = read_lenencoded(&data[4..])?;
    let scope_start = 4 + 4 + code.len() + 1;
    let scope = RawDocument::from_bytes(&data[scope_start..])?;
    Ok(RawJavaScriptCodeWithScopeRef { code, scope })
}
