use std::{borrow::Cow, fmt};

use crate::{
    DateTime,
    Decimal128,
    Timestamp,
    error::{Error, Result},
    oid::ObjectId,
};

use super::{
    Iter,
    MIN_BSON_DOCUMENT_SIZE,
    RawArray,
    RawBinaryRef,
    RawDbPointerRef,
    RawDocumentBuf,
    RawElement,
    RawJavaScriptCodeWithScopeRef,
    RawRegexRef,
    i32_from_slice,
};

/// A slice of a BSON document (akin to [`std::str`]). This can be created from a
/// [`RawDocumentBuf`] or any type that contains valid BSON data, including static binary literals,
/// [`Vec<u8>`](std::vec::Vec), or arrays.
///
/// This is an _unsized_ type, meaning that it must always be used behind a pointer like `&`. For an
/// owned version of this type, see [`RawDocumentBuf`]. A `&RawDocument` never outlives the bytes
/// it borrows, and reading it never copies them.
///
/// Accessing elements within a [`RawDocument`] is similar to element access in a map, but because
/// the contents are parsed during iteration instead of at creation time, format errors can happen
/// at any time during use.
///
/// Iterating over a [`RawDocument`] yields either an error or a [`RawElement`] that borrows from
/// the original document without making any additional allocations.
///
/// Individual elements can be accessed using [`RawDocument::get`] or any of
/// the type-specific getters, such as [`RawDocument::get_object_id`] or
/// [`RawDocument::get_str`]. Note that accessing elements is an O(N) operation, as it
/// requires iterating through the document from the beginning to find the requested key.
#[derive(PartialEq)]
#[repr(transparent)]
pub struct RawDocument {
    data: [u8],
}

impl RawDocument {
    /// Constructs a new [`RawDocument`], validating _only_ the
    /// following invariants:
    ///   * `data` is at least five bytes long (the minimum for a valid BSON document)
    ///   * the initial four bytes of `data` accurately represent the length of the bytes as
    ///     required by the BSON spec.
    ///   * the last byte of `data` is a 0
    ///
    /// Note that the internal structure of the bytes representing the
    /// BSON elements is _not_ validated at all by this method. If the
    /// bytes do not conform to the BSON spec, then method calls on
    /// the [`RawDocument`] will return Errors where appropriate.
    ///
    /// ```
    /// use bsonbuf::raw::RawDocument;
    ///
    /// let doc = RawDocument::from_bytes(b"\x05\0\0\0\0")?;
    /// assert!(doc.is_empty());
    /// # Ok::<(), bsonbuf::error::Error>(())
    /// ```
    pub fn from_bytes<D: AsRef<[u8]> + ?Sized>(data: &D) -> Result<&RawDocument> {
        let data = data.as_ref();

        if data.len() < MIN_BSON_DOCUMENT_SIZE as usize {
            return Err(Error::malformed_value("document too short"));
        }

        let length = i32_from_slice(data)?;

        if data.len() as i32 != length {
            return Err(Error::malformed_value("document length incorrect"));
        }

        if data[data.len() - 1] != 0 {
            return Err(Error::malformed_value("document not null-terminated"));
        }

        Ok(RawDocument::new_unchecked(data))
    }

    /// Creates a new `RawDocument` referencing the provided data slice.
    pub(crate) fn new_unchecked<D: AsRef<[u8]> + ?Sized>(data: &D) -> &RawDocument {
        // SAFETY:
        //
        // Dereferencing a raw pointer requires unsafe due to the potential that the pointer is
        // null, dangling, or misaligned. We know the pointer is not null or dangling due to the
        // fact that it's created by a safe reference. Converting &[u8] to *const [u8] will be
        // properly aligned due to them being references to the same type, and converting *const
        // [u8] to *const RawDocument is aligned due to the fact that the only field in a
        // RawDocument is a [u8] and it is #[repr(transparent), meaning the structs are represented
        // identically at the byte level.
        unsafe { &*(data.as_ref() as *const [u8] as *const RawDocument) }
    }

    /// Creates a new [`RawDocumentBuf`] with an owned copy of the BSON bytes.
    pub fn to_raw_document_buf(&self) -> RawDocumentBuf {
        RawDocumentBuf::new_unchecked(self.data.to_owned())
    }

    /// Gets an iterator over the elements in the [`RawDocument`]. Each call starts a new pass from
    /// the first element.
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(self)
    }

    /// Gets the element corresponding to the given key by scanning forward from the start of the
    /// document, returning `Ok(None)` if no element has that key.
    ///
    /// ```
    /// use bsonbuf::{Builder, spec::ElementType};
    ///
    /// let mut builder = Builder::new();
    /// builder.append("one", 1_i64)?;
    /// let doc = builder.view()?;
    ///
    /// let element = doc.get("one")?.expect("present");
    /// assert_eq!(element.element_type(), ElementType::Int64);
    /// assert!(doc.get("two")?.is_none());
    /// # Ok::<(), bsonbuf::error::Error>(())
    /// ```
    pub fn get(&self, key: impl AsRef<str>) -> Result<Option<RawElement<'_>>> {
        let key = key.as_ref();
        for element in self.iter() {
            let element = element?;
            if element.key() == key {
                return Ok(Some(element));
            }
        }
        Ok(None)
    }

    /// Gets the element corresponding to the given key, failing with
    /// [`ErrorKind::UnsetElement`](crate::error::ErrorKind::UnsetElement) if it is absent.
    pub fn get_element(&self, key: impl AsRef<str>) -> Result<RawElement<'_>> {
        let key = key.as_ref();
        self.get(key)?
            .ok_or_else(|| Error::unset_element().with_key(key))
    }

    /// Gets the BSON double value corresponding to a given key or returns an error if the key
    /// is absent or corresponds to a value which isn't a double.
    pub fn get_f64(&self, key: impl AsRef<str>) -> Result<f64> {
        self.get_element(key)?.get_f64()
    }

    /// Gets a reference to the string value corresponding to a given key or returns an error if the
    /// key is absent or corresponds to a value which isn't a string.
    pub fn get_str(&self, key: impl AsRef<str>) -> Result<&'_ str> {
        self.get_element(key)?.get_str()
    }

    /// Gets a reference to the document value corresponding to a given key or returns an error if
    /// the key is absent or corresponds to a value which isn't a document.
    pub fn get_document(&self, key: impl AsRef<str>) -> Result<&'_ RawDocument> {
        self.get_element(key)?.get_document()
    }

    /// Gets a reference to the array value corresponding to a given key or returns an error if
    /// the key is absent or corresponds to a value which isn't an array.
    pub fn get_array(&self, key: impl AsRef<str>) -> Result<&'_ RawArray> {
        self.get_element(key)?.get_array()
    }

    /// Gets a reference to the BSON binary value corresponding to a given key or returns an error
    /// if the key is absent or corresponds to a value which isn't a binary value.
    pub fn get_binary(&self, key: impl AsRef<str>) -> Result<RawBinaryRef<'_>> {
        self.get_element(key)?.get_binary()
    }

    /// Gets the BSON undefined value corresponding to a given key or returns an error if the key
    /// is absent or corresponds to a value which isn't undefined.
    pub fn get_undefined(&self, key: impl AsRef<str>) -> Result<()> {
        self.get_element(key)?.get_undefined()
    }

    /// Gets the ObjectId value corresponding to a given key or returns an error if the key is
    /// absent or corresponds to a value which isn't an ObjectId.
    pub fn get_object_id(&self, key: impl AsRef<str>) -> Result<ObjectId> {
        self.get_element(key)?.get_object_id()
    }

    /// Gets the boolean value corresponding to a given key or returns an error if the key is
    /// absent or corresponds to a value which isn't a boolean.
    pub fn get_bool(&self, key: impl AsRef<str>) -> Result<bool> {
        self.get_element(key)?.get_bool()
    }

    /// Gets the BSON DateTime value corresponding to a given key or returns an error if the key
    /// is absent or corresponds to a value which isn't a DateTime.
    pub fn get_datetime(&self, key: impl AsRef<str>) -> Result<DateTime> {
        self.get_element(key)?.get_datetime()
    }

    /// Gets the BSON null value corresponding to a given key or returns an error if the key is
    /// absent or corresponds to a value which isn't null.
    pub fn get_null(&self, key: impl AsRef<str>) -> Result<()> {
        self.get_element(key)?.get_null()
    }

    /// Gets a reference to the BSON regex value corresponding to a given key or returns an error if
    /// the key is absent or corresponds to a value which isn't a regex.
    pub fn get_regex(&self, key: impl AsRef<str>) -> Result<RawRegexRef<'_>> {
        self.get_element(key)?.get_regex()
    }

    /// Gets the deprecated DBPointer value corresponding to a given key or returns an error if the
    /// key is absent or corresponds to a value which isn't a DBPointer.
    pub fn get_db_pointer(&self, key: impl AsRef<str>) -> Result<RawDbPointerRef<'_>> {
        self.get_element(key)?.get_db_pointer()
    }

    /// Gets the JavaScript code corresponding to a given key or returns an error if the key is
    /// absent or corresponds to a value which isn't JavaScript code.
    pub fn get_javascript_code(&self, key: impl AsRef<str>) -> Result<&'_ str> {
        self.get_element(key)?.get_javascript_code()
    }

    /// Gets the symbol corresponding to a given key or returns an error if the key is absent or
    /// corresponds to a value which isn't a symbol.
    pub fn get_symbol(&self, key: impl AsRef<str>) -> Result<&'_ str> {
        self.get_element(key)?.get_symbol()
    }

    /// Gets the JavaScript code with scope corresponding to a given key or returns an error if
    /// the key is absent or corresponds to a value which isn't JavaScript code with scope.
    pub fn get_javascript_code_with_scope(
        &self,
        key: impl AsRef<str>,
    ) -> Result<RawJavaScriptCodeWithScopeRef<'_>> {
        self.get_element(key)?.get_javascript_code_with_scope()
    }

    /// Gets the BSON timestamp value corresponding to a given key or returns an error if the key
    /// is absent or corresponds to a value which isn't a timestamp.
    pub fn get_timestamp(&self, key: impl AsRef<str>) -> Result<Timestamp> {
        self.get_element(key)?.get_timestamp()
    }

    /// Gets the BSON int32 value corresponding to a given key or returns an error if the key is
    /// absent or corresponds to a value which isn't a 32-bit integer.
    pub fn get_i32(&self, key: impl AsRef<str>) -> Result<i32> {
        self.get_element(key)?.get_i32()
    }

    /// Gets the BSON int64 value corresponding to a given key or returns an error if the key is
    /// absent or corresponds to a value which isn't a 64-bit integer.
    pub fn get_i64(&self, key: impl AsRef<str>) -> Result<i64> {
        self.get_element(key)?.get_i64()
    }

    /// Gets the BSON Decimal128 value corresponding to a given key or returns an error if the key
    /// is absent or corresponds to a value which isn't a Decimal128.
    pub fn get_decimal128(&self, key: impl AsRef<str>) -> Result<Decimal128> {
        self.get_element(key)?.get_decimal128()
    }

    /// Checks that the value for the given key is a min key.
    pub fn get_min_key(&self, key: impl AsRef<str>) -> Result<()> {
        self.get_element(key)?.get_min_key()
    }

    /// Checks that the value for the given key is a max key.
    pub fn get_max_key(&self, key: impl AsRef<str>) -> Result<()> {
        self.get_element(key)?.get_max_key()
    }

    /// Return a reference to the contained data as a `&[u8]`
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Returns whether this document contains any elements or not.
    pub fn is_empty(&self) -> bool {
        self.as_bytes().len() == MIN_BSON_DOCUMENT_SIZE as usize
    }
}

impl fmt::Debug for RawDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawDocument")
            .field("data", &hex::encode(&self.data))
            .finish()
    }
}

impl AsRef<RawDocument> for RawDocument {
    fn as_ref(&self) -> &RawDocument {
        self
    }
}

impl AsRef<[u8]> for RawDocument {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl ToOwned for RawDocument {
    type Owned = RawDocumentBuf;

    fn to_owned(&self) -> Self::Owned {
        self.to_raw_document_buf()
    }
}

impl<'a> From<&'a RawDocument> for Cow<'a, RawDocument> {
    fn from(rdr: &'a RawDocument) -> Self {
        Cow::Borrowed(rdr)
    }
}

impl<'a> IntoIterator for &'a RawDocument {
    type IntoIter = Iter<'a>;
    type Item = Result<RawElement<'a>>;

    fn into_iter(self) -> Iter<'a> {
        Iter::new(self)
    }
}
