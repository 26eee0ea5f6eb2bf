//! A streaming writer that assembles a single BSON document in one growable buffer.
//!
//! The [`Builder`] keeps a stack of open [frames](FrameKind) over one `Vec<u8>`. Scalars are
//! encoded straight into the buffer; opening a sub-document or array reserves a length prefix
//! whose offset is remembered on the stack, and closing it patches that prefix in place. Inside
//! an array every value receives the next positional key (`"0"`, `"1"`, ...).
//!
//! ```
//! use bsonbuf::Builder;
//!
//! let mut builder = Builder::new();
//! builder.open_document()?;
//! builder.append_key("x")?;
//! builder.append_value(1)?;
//! builder.append_key("y")?;
//! builder.open_array()?;
//! builder.append_value(1)?;
//! builder.append_value(2)?;
//! builder.close_array()?;
//! builder.close_document()?;
//!
//! let doc = builder.view()?;
//! assert_eq!(doc.get_i32("x")?, 1);
//! let y = doc.get_array("y")?;
//! let keys = y
//!     .iter()
//!     .map(|e| e.map(|e| e.key()))
//!     .collect::<Result<Vec<_>, _>>()?;
//! assert_eq!(keys, ["0", "1"]);
//! # Ok::<(), bsonbuf::error::Error>(())
//! ```
//!
//! Structurally invalid sequences are rejected with a typed error and leave the buffer as it was
//! before the call.

mod context;
mod frame;

use std::mem;

use crate::{
    error::{Error, Result},
    raw::{CStr, MIN_BSON_DOCUMENT_SIZE, RawBsonRef, RawDocument, RawDocumentBuf},
};

use self::frame::Frame;
pub use self::{
    context::{ArrayContext, Context, DocumentContext, Finished, KeyContext},
    frame::FrameKind,
};

/// Lifecycle of the implicit root document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Root {
    /// Appends go straight into the root; no explicit open was seen.
    Implicit,

    /// `open_document()` was called on the empty root and awaits its `close_document()`.
    Opened,

    /// The explicitly opened root was closed; nothing more may be written until a reset.
    Finalized,
}

/// Where the key of the element being written comes from.
#[derive(Clone, Copy)]
enum Slot<'k> {
    /// A key already written by `append_key`, whose tag byte sits at this offset.
    Pending(usize),

    /// A key supplied together with the value.
    Key(&'k CStr),

    /// The next positional key of the current array frame.
    Positional,
}

/// An append-only writer producing one top-level BSON document.
///
/// The root document frame is always present. The buffer holds a complete document once every
/// opened frame has been closed and no key is pending; that document is what [`Builder::view`]
/// and [`Builder::extract`] hand out.
///
/// ```
/// use bsonbuf::{Builder, error::ErrorKind};
///
/// let mut builder = Builder::new();
/// builder.append("name", "ferris")?;
/// builder.open_array_with_key("langs")?;
/// builder.append_value("rust")?;
///
/// // arrays only take positional keys
/// assert!(matches!(
///     builder.append_key("oops").unwrap_err().kind,
///     ErrorKind::WrongContext { .. }
/// ));
///
/// builder.close_array()?;
/// let doc = builder.extract()?;
/// assert_eq!(doc.get_array("langs")?.get_str(0)?, "rust");
/// # Ok::<(), bsonbuf::error::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct Builder {
    data: Vec<u8>,
    frames: Vec<Frame>,
    pending: Option<usize>,
    root: Root,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    /// Creates a builder holding an empty root document.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates a builder whose buffer can hold `capacity` bytes before reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut data = Vec::with_capacity(capacity.max(MIN_BSON_DOCUMENT_SIZE as usize));
        write_empty_document(&mut data);
        Self {
            data,
            frames: vec![Frame::root()],
            pending: None,
            root: Root::Implicit,
        }
    }

    /// The number of frames open beyond the root document.
    pub fn depth(&self) -> usize {
        self.frames.len() - 1
    }

    /// The kind of the frame the next value lands in, or `None` once the root has been
    /// finalized.
    pub fn current_kind(&self) -> Option<FrameKind> {
        if self.root == Root::Finalized {
            return None;
        }
        Some(self.top().kind)
    }

    /// Whether a key written by [`Builder::append_key`] is still waiting for its value.
    pub fn has_pending_key(&self) -> bool {
        self.pending.is_some()
    }

    /// Supplies the key for the next value appended to the current document frame.
    ///
    /// Fails with [`ErrorKind::WrongContext`](crate::error::ErrorKind::WrongContext) inside an
    /// array frame or when a key is already pending.
    pub fn append_key(&mut self, key: impl AsRef<str>) -> Result<()> {
        let key = self.accept_key(key.as_ref(), "append a key")?;
        self.unseal();
        self.pending = Some(self.data.len());
        // placeholder tag, patched once the value's type is known
        self.data.push(0);
        key.append_to(&mut self.data);
        Ok(())
    }

    /// Appends a value to the current frame.
    ///
    /// In a document frame the value takes the pending key and fails with
    /// [`ErrorKind::MissingKey`](crate::error::ErrorKind::MissingKey) if there is none. In an
    /// array frame it takes the next positional key.
    pub fn append_value<'a>(&mut self, value: impl Into<RawBsonRef<'a>>) -> Result<()> {
        let slot = self.value_slot("append a value")?;
        self.write_element(slot, value.into())
    }

    /// Appends a keyed value to the current document frame.
    pub fn append<'a>(
        &mut self,
        key: impl AsRef<str>,
        value: impl Into<RawBsonRef<'a>>,
    ) -> Result<()> {
        let slot = self.keyed_slot(key.as_ref(), "append a keyed value")?;
        self.write_element(slot, value.into())
    }

    /// Opens a sub-document as the next value of the current frame.
    ///
    /// On a fresh builder with no key pending this instead opens the root document itself, which
    /// is then finalized by the matching [`Builder::close_document`].
    pub fn open_document(&mut self) -> Result<()> {
        if self.can_open_root() {
            self.root = Root::Opened;
            tracing::trace!("opened root document");
            return Ok(());
        }
        let slot = self.value_slot("open a document")?;
        self.open_frame(slot, FrameKind::Document);
        Ok(())
    }

    /// Opens a keyed sub-document in the current document frame.
    pub fn open_document_with_key(&mut self, key: impl AsRef<str>) -> Result<()> {
        let slot = self.keyed_slot(key.as_ref(), "open a keyed document")?;
        self.open_frame(slot, FrameKind::Document);
        Ok(())
    }

    /// Opens an array as the next value of the current frame.
    pub fn open_array(&mut self) -> Result<()> {
        let slot = self.value_slot("open an array")?;
        self.open_frame(slot, FrameKind::Array);
        Ok(())
    }

    /// Opens a keyed array in the current document frame.
    pub fn open_array_with_key(&mut self, key: impl AsRef<str>) -> Result<()> {
        let slot = self.keyed_slot(key.as_ref(), "open a keyed array")?;
        self.open_frame(slot, FrameKind::Array);
        Ok(())
    }

    /// Closes the current document frame, or finalizes an explicitly opened root.
    pub fn close_document(&mut self) -> Result<()> {
        self.close_frame(FrameKind::Document)
    }

    /// Closes the current array frame.
    pub fn close_array(&mut self) -> Result<()> {
        self.close_frame(FrameKind::Array)
    }

    /// Appends every top-level element of `doc` to the current frame.
    ///
    /// In a document frame the elements keep their keys; in an array frame they are re-keyed
    /// positionally. Every element of `doc` is decoded before anything is written.
    pub fn concatenate(&mut self, doc: &RawDocument) -> Result<()> {
        if let Some(err) = self.closed_error("concatenate a document") {
            return Err(self.reject(err));
        }
        if self.pending.is_some() {
            return Err(self.reject(Error::wrong_context(
                "concatenate a document",
                self.describe(),
            )));
        }

        let elements = doc
            .iter()
            .map(|element| {
                let element = element?;
                element.value()?;
                Ok(element)
            })
            .collect::<Result<Vec<_>>>()
            .map_err(|e| self.reject(e))?;

        self.unseal();
        for element in elements {
            self.data.push(element.element_type() as u8);
            match self.top().kind {
                FrameKind::Document => {
                    self.data.extend(element.key().as_bytes());
                    self.data.push(0);
                }
                FrameKind::Array => {
                    let index = self.top_mut().take_index();
                    self.data.extend(index.to_string().as_bytes());
                    self.data.push(0);
                }
            }
            self.data.extend(element.value_bytes());
        }
        self.seal();
        Ok(())
    }

    /// A read-only view of the finished document.
    ///
    /// Fails with [`ErrorKind::Incomplete`](crate::error::ErrorKind::Incomplete) while frames are
    /// open or a key is pending.
    pub fn view(&self) -> Result<&RawDocument> {
        self.check_complete()?;
        Ok(RawDocument::new_unchecked(&self.data))
    }

    /// Hands over the finished document and resets the builder to an empty root.
    pub fn extract(&mut self) -> Result<RawDocumentBuf> {
        self.check_complete()?;
        let mut fresh = Vec::with_capacity(MIN_BSON_DOCUMENT_SIZE as usize);
        write_empty_document(&mut fresh);
        let data = mem::replace(&mut self.data, fresh);
        self.reset_frames();
        Ok(RawDocumentBuf::new_unchecked(data))
    }

    /// Discards all open frames and empties the root document, keeping the allocation.
    pub fn clear(&mut self) {
        self.data.clear();
        write_empty_document(&mut self.data);
        self.reset_frames();
    }

    fn reset_frames(&mut self) {
        self.frames.clear();
        self.frames.push(Frame::root());
        self.pending = None;
        self.root = Root::Implicit;
    }

    fn top(&self) -> &Frame {
        &self.frames[self.frames.len() - 1]
    }

    fn top_mut(&mut self) -> &mut Frame {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    fn describe(&self) -> String {
        if self.root == Root::Finalized {
            "a finalized document".to_owned()
        } else if self.pending.is_some() {
            "a document with a pending key".to_owned()
        } else {
            self.top().kind.to_string()
        }
    }

    fn reject(&self, err: Error) -> Error {
        tracing::debug!(depth = self.depth(), error = %err, "rejected builder operation");
        err
    }

    fn closed_error(&self, operation: &'static str) -> Option<Error> {
        (self.root == Root::Finalized).then(|| Error::wrong_context(operation, self.describe()))
    }

    fn can_open_root(&self) -> bool {
        self.root == Root::Implicit
            && self.frames.len() == 1
            && self.pending.is_none()
            && self.data.len() == MIN_BSON_DOCUMENT_SIZE as usize
    }

    fn value_slot(&self, operation: &'static str) -> Result<Slot<'static>> {
        if let Some(err) = self.closed_error(operation) {
            return Err(self.reject(err));
        }
        match (self.top().kind, self.pending) {
            (FrameKind::Document, Some(offset)) => Ok(Slot::Pending(offset)),
            (FrameKind::Document, None) => Err(self.reject(Error::missing_key())),
            (FrameKind::Array, _) => Ok(Slot::Positional),
        }
    }

    fn accept_key<'k>(&self, key: &'k str, operation: &'static str) -> Result<&'k CStr> {
        if let Some(err) = self.closed_error(operation) {
            return Err(self.reject(err));
        }
        if self.top().kind == FrameKind::Array || self.pending.is_some() {
            return Err(self.reject(Error::wrong_context(operation, self.describe())));
        }
        CStr::from_str(key).map_err(|e| self.reject(e))
    }

    fn keyed_slot<'k>(&self, key: &'k str, operation: &'static str) -> Result<Slot<'k>> {
        self.accept_key(key, operation).map(Slot::Key)
    }

    /// Whether the buffer currently ends with the root's terminator.
    fn is_sealed(&self) -> bool {
        self.frames.len() == 1 && self.pending.is_none()
    }

    fn unseal(&mut self) {
        if self.is_sealed() {
            self.data.pop();
        }
    }

    fn seal(&mut self) {
        if self.is_sealed() {
            self.data.push(0);
            self.patch_length(0);
        }
    }

    fn patch_length(&mut self, start: usize) {
        let len = (self.data.len() - start) as i32;
        self.data[start..start + 4].copy_from_slice(&len.to_le_bytes());
    }

    fn write_header(&mut self, slot: Slot<'_>, tag: u8) {
        match slot {
            Slot::Pending(offset) => self.data[offset] = tag,
            Slot::Key(key) => {
                self.data.push(tag);
                key.append_to(&mut self.data);
            }
            Slot::Positional => {
                self.data.push(tag);
                let index = self.top().next_index;
                self.data.extend(index.to_string().as_bytes());
                self.data.push(0);
            }
        }
    }

    fn finish_element(&mut self, slot: Slot<'_>) {
        match slot {
            Slot::Pending(_) => self.pending = None,
            Slot::Key(_) => {}
            Slot::Positional => {
                self.top_mut().take_index();
            }
        }
    }

    fn write_element(&mut self, slot: Slot<'_>, value: RawBsonRef<'_>) -> Result<()> {
        self.unseal();
        let mark = self.data.len();
        self.write_header(slot, value.element_type() as u8);
        if let Err(err) = value.append_to(&mut self.data) {
            self.data.truncate(mark);
            self.seal();
            return Err(self.reject(err));
        }
        self.finish_element(slot);
        self.seal();
        Ok(())
    }

    fn open_frame(&mut self, slot: Slot<'_>, kind: FrameKind) {
        self.unseal();
        self.write_header(slot, kind.element_type() as u8);
        self.finish_element(slot);
        let start = self.data.len();
        self.data.extend(MIN_BSON_DOCUMENT_SIZE.to_le_bytes());
        self.frames.push(Frame::open(kind, start));
        tracing::trace!(depth = self.depth(), ?kind, start, "opened frame");
    }

    fn close_frame(&mut self, kind: FrameKind) -> Result<()> {
        let operation = match kind {
            FrameKind::Document => "close a document",
            FrameKind::Array => "close an array",
        };

        if self.frames.len() == 1 {
            return self.close_root(kind, operation);
        }

        let current = self.top().kind;
        if current != kind {
            return Err(self.reject(Error::unbalanced_close(kind, Some(current))));
        }
        if self.pending.is_some() {
            return Err(self.reject(Error::wrong_context(operation, self.describe())));
        }

        let Some(frame) = self.frames.pop() else {
            return Err(self.reject(Error::unbalanced_close(kind, None)));
        };
        self.data.push(0);
        self.patch_length(frame.start);
        tracing::trace!(
            depth = self.depth(),
            ?kind,
            len = self.data.len() - frame.start,
            "closed frame"
        );
        self.seal();
        Ok(())
    }

    fn close_root(&mut self, kind: FrameKind, operation: &'static str) -> Result<()> {
        if kind == FrameKind::Array {
            return Err(self.reject(Error::unbalanced_close(kind, Some(FrameKind::Document))));
        }
        if self.pending.is_some() {
            return Err(self.reject(Error::wrong_context(operation, self.describe())));
        }
        match self.root {
            Root::Opened => {
                self.root = Root::Finalized;
                tracing::trace!(len = self.data.len(), "finalized root document");
                Ok(())
            }
            Root::Implicit | Root::Finalized => {
                Err(self.reject(Error::unbalanced_close(kind, None)))
            }
        }
    }

    fn check_complete(&self) -> Result<()> {
        let open_frames = self.depth() + usize::from(self.root == Root::Opened);
        let pending_key = self.pending.is_some();
        if open_frames > 0 || pending_key {
            return Err(Error::incomplete(open_frames, pending_key));
        }
        Ok(())
    }
}

fn write_empty_document(data: &mut Vec<u8>) {
    data.extend(MIN_BSON_DOCUMENT_SIZE.to_le_bytes());
    data.push(0);
}
