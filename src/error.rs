//! Contains the error-related types for the `bsonbuf` crate.

use thiserror::Error;

use crate::{builder::FrameKind, spec::ElementType};

pub type Result<T> = std::result::Result<T, Error>;

/// An error that can occur in the `bsonbuf` crate.
#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,

    /// The document key associated with the error, if any.
    pub key: Option<String>,

    /// The array index associated with the error, if any.
    pub index: Option<usize>,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(key) = self.key.as_deref() {
            write!(f, "Error at key \"{key}\": ")?;
        } else if let Some(index) = self.index {
            write!(f, "Error at array index {index}: ")?;
        }

        write!(f, "{}", self.kind)
    }
}

/// The types of errors that can occur in the `bsonbuf` crate.
#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A key or value was appended against a frame that cannot accept it, e.g. a key inside an
    /// array, a second key while one is already pending, or any append after the root document
    /// was finalized.
    #[error("Cannot {operation} while the current frame is {current}")]
    #[non_exhaustive]
    WrongContext {
        /// The attempted operation.
        operation: &'static str,

        /// A description of the builder's state when the operation was attempted.
        current: String,
    },

    /// A value was appended to a document frame without a preceding key.
    #[error("A value was appended to a document without a key")]
    MissingKey,

    /// A close was attempted against a frame of the other kind, or with no frame to close.
    #[error("Cannot close {attempted:?} while the current frame is {current:?}")]
    #[non_exhaustive]
    UnbalancedClose {
        /// The kind of frame the caller attempted to close.
        attempted: FrameKind,

        /// The kind of frame that is currently open, if any.
        current: Option<FrameKind>,
    },

    /// The builder's output was requested before every frame was closed.
    #[error("The document is incomplete: {open_frames} frame(s) still open")]
    #[non_exhaustive]
    Incomplete {
        /// The number of frames still open, counting an explicitly opened root.
        open_frames: usize,

        /// Whether a key is waiting for its value.
        pending_key: bool,
    },

    /// The type of the value in the document did not match the requested type.
    #[error("Expected type {expected:?}, got type {actual:?}")]
    #[non_exhaustive]
    TypeMismatch {
        /// The actual type of the value.
        actual: ElementType,

        /// The expected type of the value.
        expected: ElementType,
    },

    /// A value was extracted from a lookup that found nothing.
    #[error("The key was not present in the document")]
    UnsetElement,

    /// Malformed BSON bytes were encountered.
    #[error("Malformed BSON: {message}")]
    #[non_exhaustive]
    MalformedValue { message: String },

    /// Invalid UTF-8 bytes were encountered.
    #[error("Invalid UTF-8")]
    Utf8Encoding,

    /// An error related to the [`ObjectId`](crate::oid::ObjectId) type occurred.
    #[error("An ObjectId-related error occurred: {message}")]
    #[non_exhaustive]
    ObjectId { message: String },

    /// An error related to the [`DateTime`](crate::DateTime) type occurred.
    #[error("A DateTime-related error occurred: {message}")]
    #[non_exhaustive]
    DateTime { message: String },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self {
            kind,
            key: None,
            index: None,
        }
    }
}

impl Error {
    pub(crate) fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub(crate) fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub(crate) fn wrong_context(operation: &'static str, current: impl ToString) -> Self {
        ErrorKind::WrongContext {
            operation,
            current: current.to_string(),
        }
        .into()
    }

    pub(crate) fn missing_key() -> Self {
        ErrorKind::MissingKey.into()
    }

    pub(crate) fn unbalanced_close(attempted: FrameKind, current: Option<FrameKind>) -> Self {
        ErrorKind::UnbalancedClose { attempted, current }.into()
    }

    pub(crate) fn incomplete(open_frames: usize, pending_key: bool) -> Self {
        ErrorKind::Incomplete {
            open_frames,
            pending_key,
        }
        .into()
    }

    pub(crate) fn type_mismatch(actual: ElementType, expected: ElementType) -> Self {
        ErrorKind::TypeMismatch { actual, expected }.into()
    }

    pub(crate) fn unset_element() -> Self {
        ErrorKind::UnsetElement.into()
    }

    pub(crate) fn malformed_value(message: impl ToString) -> Self {
        ErrorKind::MalformedValue {
            message: message.to_string(),
        }
        .into()
    }

    pub(crate) fn oid(message: impl ToString) -> Self {
        ErrorKind::ObjectId {
            message: message.to_string(),
        }
        .into()
    }

    pub(crate) fn datetime(message: impl ToString) -> Self {
        ErrorKind::DateTime {
            message: message.to_string(),
        }
        .into()
    }

    /// Whether this error was caused by structurally invalid builder usage.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::WrongContext { .. }
                | ErrorKind::MissingKey
                | ErrorKind::UnbalancedClose { .. }
                | ErrorKind::Incomplete { .. }
        )
    }

    #[cfg(test)]
    pub(crate) fn is_type_mismatch(&self) -> bool {
        matches!(self.kind, ErrorKind::TypeMismatch { .. })
    }

    #[cfg(test)]
    pub(crate) fn is_malformed_value(&self) -> bool {
        matches!(self.kind, ErrorKind::MalformedValue { .. })
    }
}

impl From<simdutf8::basic::Utf8Error> for Error {
    fn from(_: simdutf8::basic::Utf8Error) -> Self {
        ErrorKind::Utf8Encoding.into()
    }
}
