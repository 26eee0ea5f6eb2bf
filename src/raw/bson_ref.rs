use crate::{
    Binary,
    DateTime,
    Decimal128,
    Timestamp,
    error::{Error, Result},
    oid::ObjectId,
    raw::{CStr, RawArray, RawDocument, RawDocumentBuf, write_string},
    spec::{BinarySubtype, ElementType},
};

/// A BSON value referencing raw bytes stored elsewhere.
///
/// This is the closed set of values that can be appended to a [`Builder`](crate::Builder) and
/// read back from a [`RawElement`](crate::raw::RawElement). Each variant has exactly one wire
/// encoding; no numeric widening or narrowing is ever performed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawBsonRef<'a> {
    /// 64-bit binary floating point
    Double(f64),
    /// UTF-8 string
    String(&'a str),
    /// Array
    Array(&'a RawArray),
    /// Embedded document
    Document(&'a RawDocument),
    /// Boolean value
    Boolean(bool),
    /// Null value
    Null,
    /// Regular expression
    RegularExpression(RawRegexRef<'a>),
    /// JavaScript code
    JavaScriptCode(&'a str),
    /// JavaScript code w/ scope
    JavaScriptCodeWithScope(RawJavaScriptCodeWithScopeRef<'a>),
    /// 32-bit signed integer
    Int32(i32),
    /// 64-bit signed integer
    Int64(i64),
    /// Timestamp
    Timestamp(Timestamp),
    /// Binary data
    Binary(RawBinaryRef<'a>),
    /// [ObjectId](http://dochub.mongodb.org/core/objectids)
    ObjectId(ObjectId),
    /// UTC datetime
    DateTime(DateTime),
    /// Symbol (Deprecated)
    Symbol(&'a str),
    /// [128-bit decimal floating point](https://github.com/mongodb/specifications/blob/master/source/bson-decimal128/decimal128.rst)
    Decimal128(Decimal128),
    /// Undefined value (Deprecated)
    Undefined,
    /// Max key
    MaxKey,
    /// Min key
    MinKey,
    /// DBPointer (Deprecated)
    DbPointer(RawDbPointerRef<'a>),
}

impl<'a> RawBsonRef<'a> {
    /// Get the [`ElementType`] of this value.
    pub fn element_type(&self) -> ElementType {
        match *self {
            RawBsonRef::Double(..) => ElementType::Double,
            RawBsonRef::String(..) => ElementType::String,
            RawBsonRef::Array(..) => ElementType::Array,
            RawBsonRef::Document(..) => ElementType::EmbeddedDocument,
            RawBsonRef::Boolean(..) => ElementType::Boolean,
            RawBsonRef::Null => ElementType::Null,
            RawBsonRef::RegularExpression(..) => ElementType::RegularExpression,
            RawBsonRef::JavaScriptCode(..) => ElementType::JavaScriptCode,
            RawBsonRef::JavaScriptCodeWithScope(..) => ElementType::JavaScriptCodeWithScope,
            RawBsonRef::Int32(..) => ElementType::Int32,
            RawBsonRef::Int64(..) => ElementType::Int64,
            RawBsonRef::Timestamp(..) => ElementType::Timestamp,
            RawBsonRef::Binary(..) => ElementType::Binary,
            RawBsonRef::ObjectId(..) => ElementType::ObjectId,
            RawBsonRef::DateTime(..) => ElementType::DateTime,
            RawBsonRef::Symbol(..) => ElementType::Symbol,
            RawBsonRef::Decimal128(..) => ElementType::Decimal128,
            RawBsonRef::Undefined => ElementType::Undefined,
            RawBsonRef::MaxKey => ElementType::MaxKey,
            RawBsonRef::MinKey => ElementType::MinKey,
            RawBsonRef::DbPointer(..) => ElementType::DbPointer,
        }
    }

    /// Gets the `f64` that's referenced or returns [`None`] if the referenced value isn't a BSON
    /// double.
    pub fn as_f64(self) -> Option<f64> {
        match self {
            RawBsonRef::Double(d) => Some(d),
            _ => None,
        }
    }

    /// Gets the `&str` that's referenced or returns [`None`] if the referenced value isn't a BSON
    /// String.
    pub fn as_str(self) -> Option<&'a str> {
        match self {
            RawBsonRef::String(s) => Some(s),
            _ => None,
        }
    }

    /// Gets the [`RawArray`] that's referenced or returns [`None`] if the referenced value
    /// isn't a BSON array.
    pub fn as_array(self) -> Option<&'a RawArray> {
        match self {
            RawBsonRef::Array(v) => Some(v),
            _ => None,
        }
    }

    /// Gets the [`RawDocument`] that's referenced or returns [`None`] if the referenced value
    /// isn't a BSON document.
    pub fn as_document(self) -> Option<&'a RawDocument> {
        match self {
            RawBsonRef::Document(v) => Some(v),
            _ => None,
        }
    }

    /// Gets the `bool` that's referenced or returns [`None`] if the referenced value isn't a BSON
    /// boolean.
    pub fn as_bool(self) -> Option<bool> {
        match self {
            RawBsonRef::Boolean(v) => Some(v),
            _ => None,
        }
    }

    /// Gets the `i32` that's referenced or returns [`None`] if the referenced value isn't a BSON
    /// Int32.
    pub fn as_i32(self) -> Option<i32> {
        match self {
            RawBsonRef::Int32(v) => Some(v),
            _ => None,
        }
    }

    /// Gets the `i64` that's referenced or returns [`None`] if the referenced value isn't a BSON
    /// Int64.
    pub fn as_i64(self) -> Option<i64> {
        match self {
            RawBsonRef::Int64(v) => Some(v),
            _ => None,
        }
    }

    /// Gets the [`ObjectId`] that's referenced or returns [`None`] if the referenced value isn't
    /// a BSON ObjectID.
    pub fn as_object_id(self) -> Option<ObjectId> {
        match self {
            RawBsonRef::ObjectId(v) => Some(v),
            _ => None,
        }
    }

    /// Gets the [`RawBinaryRef`] that's referenced or returns [`None`] if the referenced value
    /// isn't a BSON binary.
    pub fn as_binary(self) -> Option<RawBinaryRef<'a>> {
        match self {
            RawBsonRef::Binary(v) => Some(v),
            _ => None,
        }
    }

    /// Gets the [`RawRegexRef`] that's referenced or returns [`None`] if the referenced value
    /// isn't a BSON regular expression.
    pub fn as_regex(self) -> Option<RawRegexRef<'a>> {
        match self {
            RawBsonRef::RegularExpression(v) => Some(v),
            _ => None,
        }
    }

    /// Gets the [`DateTime`] that's referenced or returns [`None`] if the referenced value isn't
    /// a BSON datetime.
    pub fn as_datetime(self) -> Option<DateTime> {
        match self {
            RawBsonRef::DateTime(v) => Some(v),
            _ => None,
        }
    }

    /// Gets the symbol that's referenced or returns [`None`] if the referenced value isn't a BSON
    /// symbol.
    pub fn as_symbol(self) -> Option<&'a str> {
        match self {
            RawBsonRef::Symbol(v) => Some(v),
            _ => None,
        }
    }

    /// Gets the [`Timestamp`] that's referenced or returns [`None`] if the referenced value isn't
    /// a BSON timestamp.
    pub fn as_timestamp(self) -> Option<Timestamp> {
        match self {
            RawBsonRef::Timestamp(timestamp) => Some(timestamp),
            _ => None,
        }
    }

    /// Gets the [`Decimal128`] that's referenced or returns [`None`] if the referenced value
    /// isn't a BSON Decimal128.
    pub fn as_decimal128(self) -> Option<Decimal128> {
        match self {
            RawBsonRef::Decimal128(d) => Some(d),
            _ => None,
        }
    }

    /// Gets the code that's referenced or returns [`None`] if the referenced value isn't a BSON
    /// JavaScript.
    pub fn as_javascript(self) -> Option<&'a str> {
        match self {
            RawBsonRef::JavaScriptCode(s) => Some(s),
            _ => None,
        }
    }

    /// Gets the [`RawJavaScriptCodeWithScopeRef`] that's referenced or returns [`None`] if the
    /// referenced value isn't a BSON JavaScript with scope.
    pub fn as_javascript_with_scope(self) -> Option<RawJavaScriptCodeWithScopeRef<'a>> {
        match self {
            RawBsonRef::JavaScriptCodeWithScope(s) => Some(s),
            _ => None,
        }
    }

    /// Gets the [`RawDbPointerRef`] that's referenced or returns [`None`] if the referenced value
    /// isn't a BSON DBPointer.
    pub fn as_db_pointer(self) -> Option<RawDbPointerRef<'a>> {
        match self {
            RawBsonRef::DbPointer(d) => Some(d),
            _ => None,
        }
    }

    /// Gets `()` if the referenced value is a BSON null, or [`None`] otherwise.
    pub fn as_null(self) -> Option<()> {
        match self {
            RawBsonRef::Null => Some(()),
            _ => None,
        }
    }

    /// Gets `()` if the referenced value is the deprecated BSON undefined, or [`None`] otherwise.
    pub fn as_undefined(self) -> Option<()> {
        match self {
            RawBsonRef::Undefined => Some(()),
            _ => None,
        }
    }

    /// Gets `()` if the referenced value is a BSON min key, or [`None`] otherwise.
    pub fn as_min_key(self) -> Option<()> {
        match self {
            RawBsonRef::MinKey => Some(()),
            _ => None,
        }
    }

    /// Gets `()` if the referenced value is a BSON max key, or [`None`] otherwise.
    pub fn as_max_key(self) -> Option<()> {
        match self {
            RawBsonRef::MaxKey => Some(()),
            _ => None,
        }
    }

    /// Append the encoded payload of this value (without type tag or key) to `buf`.
    pub(crate) fn append_to(self, buf: &mut Vec<u8>) -> Result<()> {
        match self {
            RawBsonRef::Int32(i) => buf.extend(i.to_le_bytes()),
            RawBsonRef::Int64(i) => buf.extend(i.to_le_bytes()),
            RawBsonRef::Double(d) => buf.extend(d.to_le_bytes()),
            RawBsonRef::String(s) | RawBsonRef::JavaScriptCode(s) | RawBsonRef::Symbol(s) => {
                write_string(buf, s)
            }
            RawBsonRef::Document(d) => buf.extend(d.as_bytes()),
            RawBsonRef::Array(a) => buf.extend(a.as_bytes()),
            RawBsonRef::Binary(b) => {
                let len = b.len()?;
                buf.extend(len.to_le_bytes());
                buf.push(b.subtype.into());
                if let BinarySubtype::BinaryOld = b.subtype {
                    buf.extend((len - 4).to_le_bytes())
                }
                buf.extend(b.bytes);
            }
            RawBsonRef::Boolean(b) => buf.push(b as u8),
            RawBsonRef::DateTime(dt) => buf.extend(dt.timestamp_millis().to_le_bytes()),
            RawBsonRef::DbPointer(dbp) => {
                write_string(buf, dbp.namespace);
                buf.extend(dbp.id.bytes());
            }
            RawBsonRef::Decimal128(d) => buf.extend(d.bytes()),
            RawBsonRef::RegularExpression(re) => {
                CStr::from_str(re.pattern)?.append_to(buf);
                CStr::from_str(re.options)?.append_to(buf);
            }
            RawBsonRef::JavaScriptCodeWithScope(code_w_scope) => {
                buf.extend(code_w_scope.len()?.to_le_bytes());
                write_string(buf, code_w_scope.code);
                buf.extend(code_w_scope.scope.as_bytes());
            }
            RawBsonRef::Timestamp(ts) => buf.extend(ts.to_le_bytes()),
            RawBsonRef::ObjectId(oid) => buf.extend(oid.bytes()),
            RawBsonRef::Null | RawBsonRef::Undefined | RawBsonRef::MinKey | RawBsonRef::MaxKey => {}
        }
        Ok(())
    }
}

impl From<i32> for RawBsonRef<'_> {
    fn from(i: i32) -> Self {
        RawBsonRef::Int32(i)
    }
}

impl From<i64> for RawBsonRef<'_> {
    fn from(i: i64) -> Self {
        RawBsonRef::Int64(i)
    }
}

impl<'a> From<&'a str> for RawBsonRef<'a> {
    fn from(s: &'a str) -> Self {
        RawBsonRef::String(s)
    }
}

impl<'a> From<&'a String> for RawBsonRef<'a> {
    fn from(s: &'a String) -> Self {
        RawBsonRef::String(s.as_str())
    }
}

impl From<f64> for RawBsonRef<'_> {
    fn from(f: f64) -> Self {
        RawBsonRef::Double(f)
    }
}

impl From<bool> for RawBsonRef<'_> {
    fn from(b: bool) -> Self {
        RawBsonRef::Boolean(b)
    }
}

impl<'a> From<RawBinaryRef<'a>> for RawBsonRef<'a> {
    fn from(b: RawBinaryRef<'a>) -> Self {
        RawBsonRef::Binary(b)
    }
}

impl<'a> From<&'a Binary> for RawBsonRef<'a> {
    fn from(b: &'a Binary) -> Self {
        RawBsonRef::Binary(b.as_raw_binary())
    }
}

impl<'a> From<RawRegexRef<'a>> for RawBsonRef<'a> {
    fn from(re: RawRegexRef<'a>) -> Self {
        RawBsonRef::RegularExpression(re)
    }
}

impl<'a> From<RawJavaScriptCodeWithScopeRef<'a>> for RawBsonRef<'a> {
    fn from(code_w_scope: RawJavaScriptCodeWithScopeRef<'a>) -> Self {
        RawBsonRef::JavaScriptCodeWithScope(code_w_scope)
    }
}

impl<'a> From<RawDbPointerRef<'a>> for RawBsonRef<'a> {
    fn from(dbp: RawDbPointerRef<'a>) -> Self {
        RawBsonRef::DbPointer(dbp)
    }
}

impl From<Timestamp> for RawBsonRef<'_> {
    fn from(ts: Timestamp) -> Self {
        RawBsonRef::Timestamp(ts)
    }
}

impl From<ObjectId> for RawBsonRef<'_> {
    fn from(oid: ObjectId) -> Self {
        RawBsonRef::ObjectId(oid)
    }
}

impl From<DateTime> for RawBsonRef<'_> {
    fn from(dt: DateTime) -> Self {
        RawBsonRef::DateTime(dt)
    }
}

impl From<Decimal128> for RawBsonRef<'_> {
    fn from(d: Decimal128) -> Self {
        RawBsonRef::Decimal128(d)
    }
}

impl<'a> From<&'a RawDocument> for RawBsonRef<'a> {
    fn from(d: &'a RawDocument) -> Self {
        RawBsonRef::Document(d)
    }
}

impl<'a> From<&'a RawDocumentBuf> for RawBsonRef<'a> {
    fn from(d: &'a RawDocumentBuf) -> Self {
        RawBsonRef::Document(d.as_ref())
    }
}

impl<'a> From<&'a RawArray> for RawBsonRef<'a> {
    fn from(a: &'a RawArray) -> Self {
        RawBsonRef::Array(a)
    }
}

/// A BSON binary value referencing raw bytes stored elsewhere.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawBinaryRef<'a> {
    /// The subtype of the binary value.
    pub subtype: BinarySubtype,

    /// The binary bytes.
    pub bytes: &'a [u8],
}

impl RawBinaryRef<'_> {
    /// Copy the contents into a [`Binary`].
    pub fn to_binary(&self) -> Binary {
        Binary {
            subtype: self.subtype,
            bytes: self.bytes.to_owned(),
        }
    }

    /// The declared payload length, which for the old binary subtype includes the inner length
    /// prefix.
    pub(crate) fn len(&self) -> Result<i32> {
        let len = match self.subtype {
            BinarySubtype::BinaryOld => self.bytes.len() + 4,
            _ => self.bytes.len(),
        };
        i32::try_from(len)
            .map_err(|_| Error::malformed_value(format!("binary length {len} exceeds i32::MAX")))
    }
}

/// A BSON regex referencing raw bytes stored elsewhere.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawRegexRef<'a> {
    /// The regex pattern to match.
    pub pattern: &'a str,

    /// The options for the regex.
    ///
    /// Options are identified by characters and are written exactly as supplied, without
    /// sorting or deduplication. The server expects them in alphabetical order. Valid options
    /// are 'i' for case insensitive matching, 'm' for multiline matching, 'x' for verbose mode,
    /// 'l' to make \w, \W, etc. locale dependent, 's' for dotall mode ('.' matches everything),
    /// and 'u' to make \w, \W, etc. match unicode.
    pub options: &'a str,
}

/// A BSON "code with scope" value referencing raw bytes stored elsewhere.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawJavaScriptCodeWithScopeRef<'a> {
    /// The JavaScript code.
    pub code: &'a str,

    /// The scope document containing variable bindings.
    pub scope: &'a RawDocument,
}

impl RawJavaScriptCodeWithScopeRef<'_> {
    pub(crate) fn len(self) -> Result<i32> {
        let len = 4 + 4 + self.code.len() + 1 + self.scope.as_bytes().len();
        i32::try_from(len).map_err(|_| {
            Error::malformed_value(format!("code with scope length {len} exceeds i32::MAX"))
        })
    }
}

/// A BSON DB pointer value referencing raw bytes stored elsewhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawDbPointerRef<'a> {
    /// The namespace the pointer refers to.
    pub namespace: &'a str,

    /// The id of the referenced document.
    pub id: ObjectId,
}
