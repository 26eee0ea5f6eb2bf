use std::fmt;

use crate::spec::ElementType;

/// The kind of an open frame on the [`Builder`](super::Builder)'s stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// A document frame: every value needs a caller supplied key.
    Document,

    /// An array frame: every value receives the next positional key.
    Array,
}

impl FrameKind {
    pub(crate) fn element_type(self) -> ElementType {
        match self {
            FrameKind::Document => ElementType::EmbeddedDocument,
            FrameKind::Array => ElementType::Array,
        }
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameKind::Document => f.write_str("a document"),
            FrameKind::Array => f.write_str("an array"),
        }
    }
}

/// An open document or array inside the builder's buffer.
///
/// `start` is the offset of the frame's length prefix, which is patched when the frame closes.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Frame {
    pub(crate) kind: FrameKind,
    pub(crate) start: usize,
    pub(crate) next_index: usize,
}

impl Frame {
    pub(crate) fn root() -> Self {
        Self {
            kind: FrameKind::Document,
            start: 0,
            next_index: 0,
        }
    }

    pub(crate) fn open(kind: FrameKind, start: usize) -> Self {
        Self {
            kind,
            start,
            next_index: 0,
        }
    }

    /// Hand out the positional key for the next array element.
    pub(crate) fn take_index(&mut self) -> usize {
        let index = self.next_index;
        self.next_index += 1;
        index
    }
}
