//! Typed veneers over [`Builder`] that only expose the operations valid at the current nesting
//! position.
//!
//! Each wrapper borrows the builder mutably and records the wrapper to return to on close in its
//! type parameter, so an unbalanced close or a keyed value inside an array does not compile. All
//! state still lives in the [`Builder`]; the wrappers are free to construct and drop.
//!
//! ```
//! use bsonbuf::Builder;
//!
//! let mut builder = Builder::new();
//! let doc = builder
//!     .start()?
//!     .append("x", 1)?
//!     .open_array("y")?
//!     .value(1)?
//!     .value(2)?
//!     .close_array()?
//!     .key("z")?
//!     .open_document()?
//!     .append("nested", true)?
//!     .close_document()?
//!     .close_document()?
//!     .extract()?;
//!
//! assert_eq!(doc.get_array("y")?.get_i32(1)?, 2);
//! assert!(doc.get_document("z")?.get_bool("nested")?);
//! # Ok::<(), bsonbuf::error::Error>(())
//! ```

use std::marker::PhantomData;

use crate::{
    error::Result,
    raw::{RawBsonRef, RawDocument, RawDocumentBuf},
};

use super::Builder;

mod private {
    use super::Builder;

    /// Proof that a wrapper is being built from inside this module.
    pub struct Token(pub(super) ());

    pub trait Sealed<'b>: Sized {
        fn wrap(builder: &'b mut Builder, token: Token) -> Self;
    }
}

use self::private::{Sealed, Token};

/// A position in a document under construction that a nested frame can return to.
///
/// Only the wrappers in this module implement it, and they can only be constructed by the
/// operations that move between them:
///
/// ```compile_fail
/// use bsonbuf::{Builder, DocumentContext, Finished, builder::Context};
///
/// let mut builder = Builder::new();
/// builder.open_document_with_key("a").unwrap();
/// // jumping straight to the root level will not compile:
/// let root = DocumentContext::<Finished>::wrap(&mut builder);
/// ```
pub trait Context<'b>: Sealed<'b> {}

fn enter<'b, C: Sealed<'b>>(builder: &'b mut Builder) -> C {
    C::wrap(builder, Token(()))
}

/// Inside a document frame: keys and keyed values are accepted.
#[must_use]
pub struct DocumentContext<'b, P> {
    builder: &'b mut Builder,
    parent: PhantomData<fn() -> P>,
}

/// Inside a document frame with a key written and its value outstanding.
#[must_use]
pub struct KeyContext<'b, P> {
    builder: &'b mut Builder,
    parent: PhantomData<fn() -> P>,
}

/// Inside an array frame: values receive positional keys.
#[must_use]
pub struct ArrayContext<'b, P> {
    builder: &'b mut Builder,
    parent: PhantomData<fn() -> P>,
}

/// The root document was closed; its bytes can be read or taken.
#[must_use]
pub struct Finished<'b> {
    builder: &'b mut Builder,
}

impl<'b, P> Sealed<'b> for DocumentContext<'b, P> {
    fn wrap(builder: &'b mut Builder, _: Token) -> Self {
        Self {
            builder,
            parent: PhantomData,
        }
    }
}

impl<'b, P> Sealed<'b> for ArrayContext<'b, P> {
    fn wrap(builder: &'b mut Builder, _: Token) -> Self {
        Self {
            builder,
            parent: PhantomData,
        }
    }
}

impl<'b> Sealed<'b> for Finished<'b> {
    fn wrap(builder: &'b mut Builder, _: Token) -> Self {
        Self { builder }
    }
}

impl<'b, P> Context<'b> for DocumentContext<'b, P> {}
impl<'b, P> Context<'b> for ArrayContext<'b, P> {}
impl<'b> Context<'b> for Finished<'b> {}

impl Builder {
    /// Opens the root document and returns the typed entry point into it.
    ///
    /// Fails if anything was already written to this builder.
    pub fn start(&mut self) -> Result<DocumentContext<'_, Finished<'_>>> {
        self.open_document()?;
        Ok(enter(self))
    }
}

impl<'b, P: Context<'b>> DocumentContext<'b, P> {
    /// Writes a key whose value must follow.
    pub fn key(self, key: impl AsRef<str>) -> Result<KeyContext<'b, P>> {
        self.builder.append_key(key)?;
        Ok(KeyContext {
            builder: self.builder,
            parent: PhantomData,
        })
    }

    /// Writes a keyed value.
    pub fn append<'a>(
        self,
        key: impl AsRef<str>,
        value: impl Into<RawBsonRef<'a>>,
    ) -> Result<Self> {
        self.builder.append(key, value)?;
        Ok(self)
    }

    /// Copies every element of `doc` into this document.
    pub fn concatenate(self, doc: &RawDocument) -> Result<Self> {
        self.builder.concatenate(doc)?;
        Ok(self)
    }

    /// Opens a keyed sub-document.
    pub fn open_document(self, key: impl AsRef<str>) -> Result<DocumentContext<'b, Self>> {
        self.builder.open_document_with_key(key)?;
        Ok(enter(self.builder))
    }

    /// Opens a keyed array.
    pub fn open_array(self, key: impl AsRef<str>) -> Result<ArrayContext<'b, Self>> {
        self.builder.open_array_with_key(key)?;
        Ok(enter(self.builder))
    }

    /// Closes this document and returns to the enclosing position.
    pub fn close_document(self) -> Result<P> {
        self.builder.close_document()?;
        Ok(enter(self.builder))
    }
}

impl<'b, P: Context<'b>> KeyContext<'b, P> {
    /// Supplies the value for the pending key.
    pub fn value<'a>(self, value: impl Into<RawBsonRef<'a>>) -> Result<DocumentContext<'b, P>> {
        self.builder.append_value(value)?;
        Ok(enter(self.builder))
    }

    /// Opens a sub-document under the pending key.
    pub fn open_document(self) -> Result<DocumentContext<'b, DocumentContext<'b, P>>> {
        self.builder.open_document()?;
        Ok(enter(self.builder))
    }

    /// Opens an array under the pending key.
    pub fn open_array(self) -> Result<ArrayContext<'b, DocumentContext<'b, P>>> {
        self.builder.open_array()?;
        Ok(enter(self.builder))
    }
}

impl<'b, P: Context<'b>> ArrayContext<'b, P> {
    /// Writes the next element.
    pub fn value<'a>(self, value: impl Into<RawBsonRef<'a>>) -> Result<Self> {
        self.builder.append_value(value)?;
        Ok(self)
    }

    /// Copies every element of `doc` into this array under fresh positional keys.
    pub fn concatenate(self, doc: &RawDocument) -> Result<Self> {
        self.builder.concatenate(doc)?;
        Ok(self)
    }

    /// Opens a sub-document as the next element.
    pub fn open_document(self) -> Result<DocumentContext<'b, Self>> {
        self.builder.open_document()?;
        Ok(enter(self.builder))
    }

    /// Opens a nested array as the next element.
    pub fn open_array(self) -> Result<ArrayContext<'b, Self>> {
        self.builder.open_array()?;
        Ok(enter(self.builder))
    }

    /// Closes this array and returns to the enclosing position.
    pub fn close_array(self) -> Result<P> {
        self.builder.close_array()?;
        Ok(enter(self.builder))
    }
}

impl<'b> Finished<'b> {
    /// A read-only view of the finished document.
    pub fn view(&self) -> Result<&RawDocument> {
        self.builder.view()
    }

    /// Takes the finished document and resets the builder.
    pub fn extract(self) -> Result<RawDocumentBuf> {
        self.builder.extract()
    }
}
