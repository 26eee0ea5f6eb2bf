use std::fmt;

use crate::{
    DateTime,
    Decimal128,
    Timestamp,
    error::{Error, Result},
    oid::ObjectId,
};

use super::{
    Iter,
    RawBinaryRef,
    RawDbPointerRef,
    RawDocument,
    RawElement,
    RawJavaScriptCodeWithScopeRef,
    RawRegexRef,
};

/// A slice of a BSON document containing a BSON array value (akin to [`std::str`]). This can be
/// retrieved from a [`RawDocument`] via [`RawDocument::get_array`] or
/// [`RawElement::get_array`].
///
/// This is an _unsized_ type, meaning that it must always be used behind a pointer like `&`.
///
/// Iterating over a [`RawArray`] yields its elements in order; their keys are the positional
/// keys `"0"`, `"1"`, ... that were assigned when the array was written.
///
/// ```
/// use bsonbuf::Builder;
///
/// let mut builder = Builder::new();
/// builder.open_array_with_key("x")?;
/// builder.append_value(1)?;
/// builder.append_value(true)?;
/// builder.close_array()?;
/// let doc = builder.extract()?;
///
/// let array = doc.get_array("x")?;
/// assert_eq!(array.get_bool(1)?, true);
/// for element in array {
///     let element = element?;
///     println!("{}: {:?}", element.key(), element.value()?);
/// }
/// # Ok::<(), bsonbuf::error::Error>(())
/// ```
///
/// Note that accessing elements by index is an O(N) operation, as it requires iterating through
/// the array from the beginning to find the requested index.
#[derive(PartialEq)]
#[repr(transparent)]
pub struct RawArray {
    pub(crate) doc: RawDocument,
}

impl RawArray {
    pub(crate) fn from_doc(doc: &RawDocument) -> &RawArray {
        // SAFETY:
        //
        // Dereferencing a raw pointer requires unsafe due to the potential that the pointer is
        // null, dangling, or misaligned. We know the pointer is not null or dangling due to the
        // fact that it's created by a safe reference. Converting &RawDocument to *const
        // RawDocument will be properly aligned due to them being references to the same type,
        // and converting *const RawDocument to *const RawArray is aligned due to the fact that
        // the only field in a RawArray is a RawDocument, meaning the structs are represented
        // identically at the byte level.
        unsafe { &*(doc as *const RawDocument as *const RawArray) }
    }

    /// Gets an iterator over the elements of the array.
    pub fn iter(&self) -> Iter<'_> {
        self.doc.iter()
    }

    /// Gets the element at the given index, or `Ok(None)` if the array is shorter than that.
    pub fn get(&self, index: usize) -> Result<Option<RawElement<'_>>> {
        self.iter().nth(index).transpose()
    }

    fn get_element(&self, index: usize) -> Result<RawElement<'_>> {
        self.get(index)?
            .ok_or_else(|| Error::unset_element().with_index(index))
    }

    /// Gets the BSON double at the given index or returns an error if the index is out of range
    /// or the value isn't a double.
    pub fn get_f64(&self, index: usize) -> Result<f64> {
        self.get_element(index)?.get_f64()
    }

    /// Gets a reference to the string at the given index or returns an error if the index is out
    /// of range or the value isn't a string.
    pub fn get_str(&self, index: usize) -> Result<&str> {
        self.get_element(index)?.get_str()
    }

    /// Gets a reference to the document at the given index or returns an error if the index is
    /// out of range or the value isn't a document.
    pub fn get_document(&self, index: usize) -> Result<&RawDocument> {
        self.get_element(index)?.get_document()
    }

    /// Gets a reference to the array at the given index or returns an error if the index is out
    /// of range or the value isn't an array.
    pub fn get_array(&self, index: usize) -> Result<&RawArray> {
        self.get_element(index)?.get_array()
    }

    /// Gets the binary value at the given index or returns an error if the index is out of range
    /// or the value isn't a binary.
    pub fn get_binary(&self, index: usize) -> Result<RawBinaryRef<'_>> {
        self.get_element(index)?.get_binary()
    }

    /// Gets the undefined value at the given index or returns an error if the index is out of
    /// range or the value isn't undefined.
    pub fn get_undefined(&self, index: usize) -> Result<()> {
        self.get_element(index)?.get_undefined()
    }

    /// Gets the ObjectId at the given index or returns an error if the index is out of range or
    /// the value isn't an ObjectId.
    pub fn get_object_id(&self, index: usize) -> Result<ObjectId> {
        self.get_element(index)?.get_object_id()
    }

    /// Gets the boolean at the given index or returns an error if the index is out of range or
    /// the value isn't a boolean.
    pub fn get_bool(&self, index: usize) -> Result<bool> {
        self.get_element(index)?.get_bool()
    }

    /// Gets the DateTime at the given index or returns an error if the index is out of range or
    /// the value isn't a DateTime.
    pub fn get_datetime(&self, index: usize) -> Result<DateTime> {
        self.get_element(index)?.get_datetime()
    }

    /// Gets the null value at the given index or returns an error if the index is out of range or
    /// the value isn't null.
    pub fn get_null(&self, index: usize) -> Result<()> {
        self.get_element(index)?.get_null()
    }

    /// Gets the regex at the given index or returns an error if the index is out of range or the
    /// value isn't a regex.
    pub fn get_regex(&self, index: usize) -> Result<RawRegexRef<'_>> {
        self.get_element(index)?.get_regex()
    }

    /// Gets the DBPointer at the given index or returns an error if the index is out of range or
    /// the value isn't a DBPointer.
    pub fn get_db_pointer(&self, index: usize) -> Result<RawDbPointerRef<'_>> {
        self.get_element(index)?.get_db_pointer()
    }

    /// Gets the JavaScript code at the given index or returns an error if the index is out of
    /// range or the value isn't JavaScript code.
    pub fn get_javascript_code(&self, index: usize) -> Result<&str> {
        self.get_element(index)?.get_javascript_code()
    }

    /// Gets the symbol at the given index or returns an error if the index is out of range or the
    /// value isn't a symbol.
    pub fn get_symbol(&self, index: usize) -> Result<&str> {
        self.get_element(index)?.get_symbol()
    }

    /// Gets the JavaScript code with scope at the given index or returns an error if the index is
    /// out of range or the value isn't JavaScript code with scope.
    pub fn get_javascript_code_with_scope(
        &self,
        index: usize,
    ) -> Result<RawJavaScriptCodeWithScopeRef<'_>> {
        self.get_element(index)?.get_javascript_code_with_scope()
    }

    /// Gets the timestamp at the given index or returns an error if the index is out of range or
    /// the value isn't a timestamp.
    pub fn get_timestamp(&self, index: usize) -> Result<Timestamp> {
        self.get_element(index)?.get_timestamp()
    }

    /// Gets the BSON int32 at the given index or returns an error if the index is out of range or
    /// the value isn't a 32-bit integer.
    pub fn get_i32(&self, index: usize) -> Result<i32> {
        self.get_element(index)?.get_i32()
    }

    /// Gets the BSON int64 at the given index or returns an error if the index is out of range or
    /// the value isn't a 64-bit integer.
    pub fn get_i64(&self, index: usize) -> Result<i64> {
        self.get_element(index)?.get_i64()
    }

    /// Gets the Decimal128 at the given index or returns an error if the index is out of range or
    /// the value isn't a Decimal128.
    pub fn get_decimal128(&self, index: usize) -> Result<Decimal128> {
        self.get_element(index)?.get_decimal128()
    }

    /// Checks that the value at the given index is a min key.
    pub fn get_min_key(&self, index: usize) -> Result<()> {
        self.get_element(index)?.get_min_key()
    }

    /// Checks that the value at the given index is a max key.
    pub fn get_max_key(&self, index: usize) -> Result<()> {
        self.get_element(index)?.get_max_key()
    }

    /// Gets a reference to the raw bytes of the [`RawArray`].
    pub fn as_bytes(&self) -> &[u8] {
        self.doc.as_bytes()
    }

    /// Gets the array's elements as a document keyed by position.
    pub fn as_doc(&self) -> &RawDocument {
        &self.doc
    }

    /// Whether this array contains any elements or not.
    pub fn is_empty(&self) -> bool {
        self.doc.is_empty()
    }
}

impl fmt::Debug for RawArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawArray")
            .field("data", &hex::encode(self.doc.as_bytes()))
            .finish()
    }
}

impl<'a> IntoIterator for &'a RawArray {
    type IntoIter = Iter<'a>;
    type Item = Result<RawElement<'a>>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}
