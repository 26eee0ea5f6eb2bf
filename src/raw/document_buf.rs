use std::{
    borrow::{Borrow, Cow},
    fmt,
    ops::Deref,
};

use crate::error::Result;

use super::{Iter, MIN_BSON_DOCUMENT_SIZE, RawDocument, RawElement};

/// An owned BSON document (akin to [`std::path::PathBuf`]), backed by a buffer of raw BSON bytes.
/// This is what [`Builder::extract`](crate::Builder::extract) hands over, and can also be created
/// from a `Vec<u8>` received from elsewhere.
///
/// ```
/// use bsonbuf::raw::RawDocumentBuf;
///
/// let doc = RawDocumentBuf::from_bytes(b"\x13\x00\x00\x00\x02hi\x00\x06\x00\x00\x00y'all\x00\x00".to_vec())?;
/// let mut iter = doc.iter();
/// let element = iter.next().unwrap()?;
/// assert_eq!(element.key(), "hi");
/// assert_eq!(element.get_str()?, "y'all");
/// assert!(iter.next().is_none());
/// # Ok::<(), bsonbuf::error::Error>(())
/// ```
///
/// This type implements `Deref` to [`RawDocument`], meaning that all methods on [`RawDocument`] are
/// available on [`RawDocumentBuf`] values as well.
#[derive(Clone, PartialEq)]
pub struct RawDocumentBuf {
    data: Vec<u8>,
}

impl RawDocumentBuf {
    /// Creates a new, empty [`RawDocumentBuf`].
    pub fn new() -> RawDocumentBuf {
        let mut data = MIN_BSON_DOCUMENT_SIZE.to_le_bytes().to_vec();
        data.push(0);
        Self { data }
    }

    /// Constructs a new [`RawDocumentBuf`], validating _only_ the
    /// following invariants:
    ///   * `data` is at least five bytes long (the minimum for a valid BSON document)
    ///   * the initial four bytes of `data` accurately represent the length of the bytes as
    ///     required by the BSON spec.
    ///   * the last byte of `data` is a 0
    ///
    /// Note that the internal structure of the bytes representing the
    /// BSON elements is _not_ validated at all by this method.
    pub fn from_bytes(data: Vec<u8>) -> Result<RawDocumentBuf> {
        let _ = RawDocument::from_bytes(data.as_slice())?;
        Ok(Self { data })
    }

    pub(crate) fn new_unchecked(data: Vec<u8>) -> RawDocumentBuf {
        Self { data }
    }

    /// Gets an iterator over the elements in the [`RawDocumentBuf`].
    ///
    /// There is no owning iterator for [`RawDocumentBuf`]; elements always borrow from it.
    pub fn iter(&self) -> Iter<'_> {
        self.into_iter()
    }

    /// Return the contained data as a `Vec<u8>`
    ///
    /// ```
    /// use bsonbuf::raw::RawDocumentBuf;
    ///
    /// assert_eq!(RawDocumentBuf::new().into_bytes(), b"\x05\x00\x00\x00\x00".to_vec());
    /// ```
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

impl Default for RawDocumentBuf {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RawDocumentBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawDocumentBuf")
            .field("data", &hex::encode(&self.data))
            .finish()
    }
}

impl<'a> From<RawDocumentBuf> for Cow<'a, RawDocument> {
    fn from(rd: RawDocumentBuf) -> Self {
        Cow::Owned(rd)
    }
}

impl<'a> From<&'a RawDocumentBuf> for Cow<'a, RawDocument> {
    fn from(rd: &'a RawDocumentBuf) -> Self {
        Cow::Borrowed(rd.as_ref())
    }
}

impl TryFrom<Vec<u8>> for RawDocumentBuf {
    type Error = crate::error::Error;

    fn try_from(data: Vec<u8>) -> Result<Self> {
        Self::from_bytes(data)
    }
}

impl<'a> IntoIterator for &'a RawDocumentBuf {
    type IntoIter = Iter<'a>;
    type Item = Result<RawElement<'a>>;

    fn into_iter(self) -> Iter<'a> {
        Iter::new(self)
    }
}

impl AsRef<RawDocument> for RawDocumentBuf {
    fn as_ref(&self) -> &RawDocument {
        RawDocument::new_unchecked(&self.data)
    }
}

impl AsRef<[u8]> for RawDocumentBuf {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl Deref for RawDocumentBuf {
    type Target = RawDocument;

    fn deref(&self) -> &Self::Target {
        RawDocument::new_unchecked(&self.data)
    }
}

impl Borrow<RawDocument> for RawDocumentBuf {
    fn borrow(&self) -> &RawDocument {
        self.deref()
    }
}
