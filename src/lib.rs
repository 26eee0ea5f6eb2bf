// The MIT License (MIT)

// Copyright (c) 2015 Y. T. Chung <zonyitoo@gmail.com>

// Permission is hereby granted, free of charge, to any person obtaining a copy of
// this software and associated documentation files (the "Software"), to deal in
// the Software without restriction, including without limitation the rights to
// use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of
// the Software, and to permit persons to whom the Software is furnished to do so,
// subject to the following conditions:

// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.

// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS
// FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR
// COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER
// IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
// CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! BSON is a binary format in which zero or more key/value pairs are stored as a single entity.
//! We call this entity a document.
//!
//! This crate builds BSON documents incrementally into a single buffer and reads encoded documents
//! back without copying them. It implements version 1.1 of the
//! [BSON standard](http://bsonspec.org/spec.html).
//!
//! ## Building documents
//!
//! A [`Builder`] writes one top-level document. Keys are supplied for values inside documents,
//! and generated (`"0"`, `"1"`, ...) for values inside arrays. Sub-documents and arrays are
//! written by opening and closing frames:
//!
//! ```rust
//! use bsonbuf::{Builder, DateTime, oid::ObjectId};
//!
//! let mut builder = Builder::new();
//! builder.append("_id", ObjectId::new())?;
//! builder.append("title", "Moby-Dick")?;
//! builder.append("published", DateTime::from_millis(-3_792_096_000_000))?;
//! builder.open_array_with_key("tags")?;
//! builder.append_value("whale")?;
//! builder.append_value("sea")?;
//! builder.close_array()?;
//!
//! let doc = builder.extract()?;
//! assert_eq!(doc.get_str("title")?, "Moby-Dick");
//! # Ok::<(), bsonbuf::error::Error>(())
//! ```
//!
//! The same document can be written through the typed [`DocumentContext`]/[`ArrayContext`]
//! wrappers returned by [`Builder::start`], which reject unbalanced nesting at compile time.
//!
//! ## Reading documents
//!
//! [`RawDocument`] borrows encoded bytes, for example a reply received from a server, and walks
//! them lazily. Only the outer framing is checked up front:
//!
//! ```rust
//! use bsonbuf::{raw::RawDocument, spec::ElementType};
//!
//! let bytes = b"\x13\x00\x00\x00\x02hi\x00\x06\x00\x00\x00y'all\x00\x00";
//! let doc = RawDocument::from_bytes(bytes)?;
//!
//! for element in doc {
//!     let element = element?;
//!     assert_eq!(element.key(), "hi");
//!     assert_eq!(element.element_type(), ElementType::String);
//! }
//! # Ok::<(), bsonbuf::error::Error>(())
//! ```
//!
//! ## Features
//!
//! | Feature        | Description                                                        | Default |
//! |:---------------|:-------------------------------------------------------------------|:--------|
//! | `serde_json-1` | Render raw documents as relaxed Extended JSON                      | yes     |
//! | `uuid-1`       | Convert between [`uuid::Uuid`] and subtype 4 binaries              | yes     |
//! | `large_dates`  | Format and parse RFC 3339 dates outside of years 0000 through 9999 | no      |

#![cfg_attr(docsrs, feature(doc_cfg))]

#[doc(inline)]
pub use self::{
    binary::Binary,
    builder::{ArrayContext, Builder, DocumentContext, Finished, FrameKind, KeyContext},
    datetime::DateTime,
    decimal128::Decimal128,
    raw::{
        RawArray,
        RawBinaryRef,
        RawBsonRef,
        RawDbPointerRef,
        RawDocument,
        RawDocumentBuf,
        RawElement,
        RawJavaScriptCodeWithScopeRef,
        RawRegexRef,
    },
    timestamp::Timestamp,
};

pub mod binary;
pub mod builder;
pub mod datetime;
pub mod decimal128;
pub mod error;
pub mod oid;
pub mod raw;
pub mod spec;
pub mod timestamp;

#[cfg(test)]
mod tests;
