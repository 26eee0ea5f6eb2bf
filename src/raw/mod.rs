//! An API for interacting with raw BSON bytes.
//!
//! This module provides two document types, [`RawDocumentBuf`] and [`&RawDocument`](RawDocument)
//! (an owned buffer and a reference respectively, akin to [`String`] and [`&str`](str)), for
//! working with encoded BSON documents without parsing them into an intermediate tree.
//!
//! A [`&RawDocument`](RawDocument) can be created from anything that can be borrowed as a
//! `&[u8]`, such as a reply buffer handed over by a database driver. Only the outer framing is
//! validated up front; the elements are parsed lazily during iteration, so lookups return a
//! [`Result`](crate::error::Result).
//!
//! ```rust
//! use bsonbuf::raw::RawDocument;
//!
//! // See http://bsonspec.org/spec.html for details on the binary encoding of BSON.
//! let doc = RawDocument::from_bytes(b"\x13\x00\x00\x00\x02hi\x00\x06\x00\x00\x00y'all\x00\x00")?;
//! let elem = doc.get("hi")?.unwrap();
//!
//! assert_eq!(elem.key(), "hi");
//! assert_eq!(elem.get_str()?, "y'all");
//! # Ok::<(), bsonbuf::error::Error>(())
//! ```
//!
//! ### Iteration
//!
//! [`RawDocument`] implements [`IntoIterator`], which can also be accessed via
//! [`RawDocument::iter`]. Each call starts a fresh pass from the first element; the view itself
//! holds no cursor state.
//!
//! ```rust
//! use bsonbuf::{Builder, spec::ElementType};
//!
//! let mut builder = Builder::new();
//! builder.append("crate", "bsonbuf")?;
//! builder.append("year", 2024)?;
//! let doc = builder.extract()?;
//!
//! let mut keys = Vec::new();
//! for element in &doc {
//!     let element = element?;
//!     keys.push((element.key(), element.element_type()));
//! }
//! assert_eq!(keys, [("crate", ElementType::String), ("year", ElementType::Int32)]);
//! # Ok::<(), bsonbuf::error::Error>(())
//! ```

mod array;
mod bson_ref;
mod cstr;
mod document;
mod document_buf;
mod elem;
mod iter;
#[cfg(feature = "serde_json-1")]
mod json;

use crate::error::{Error, Result};

pub use self::{
    array::RawArray,
    bson_ref::{
        RawBinaryRef,
        RawBsonRef,
        RawDbPointerRef,
        RawJavaScriptCodeWithScopeRef,
        RawRegexRef,
    },
    cstr::CStr,
    document::RawDocument,
    document_buf::RawDocumentBuf,
    elem::RawElement,
    iter::Iter,
};

pub(crate) const MIN_BSON_DOCUMENT_SIZE: i32 = 4 + 1; // 4 bytes for length, one byte for null terminator
pub(crate) const MIN_BSON_STRING_SIZE: i32 = 4 + 1; // 4 bytes for length, one byte for null terminator
pub(crate) const MIN_CODE_WITH_SCOPE_SIZE: i32 = 4 + MIN_BSON_STRING_SIZE + MIN_BSON_DOCUMENT_SIZE;

/// Given a u8 slice, return a fixed-size array of its first N bytes, or an error if it is too
/// short.
fn bytes_array<const N: usize>(val: &[u8]) -> Result<[u8; N]> {
    val.get(..N)
        .and_then(|b| b.try_into().ok())
        .ok_or_else(|| {
            Error::malformed_value(format!(
                "expected at least {} bytes to read value, got {}",
                N,
                val.len()
            ))
        })
}

/// Given a u8 slice, return an f64 from the first eight bytes, as little endian.
fn f64_from_slice(val: &[u8]) -> Result<f64> {
    bytes_array(val).map(f64::from_le_bytes)
}

/// Given a u8 slice, return an i32 from the first four bytes, as little endian.
fn i32_from_slice(val: &[u8]) -> Result<i32> {
    bytes_array(val).map(i32::from_le_bytes)
}

/// Given a u8 slice, return an i64 from the first eight bytes, as little endian.
fn i64_from_slice(val: &[u8]) -> Result<i64> {
    bytes_array(val).map(i64::from_le_bytes)
}

/// Read a non-negative i32 length prefix as a usize.
fn usize_from_slice(val: &[u8]) -> Result<usize> {
    let len = i32_from_slice(val)?;
    usize::try_from(len).map_err(|_| Error::malformed_value(format!("negative length: {len}")))
}

fn read_nullterminated(buf: &[u8]) -> Result<&str> {
    let mut splits = buf.splitn(2, |x| *x == 0);
    let value = splits
        .next()
        .ok_or_else(|| Error::malformed_value("no value"))?;
    if splits.next().is_some() {
        try_to_str(value)
    } else {
        Err(Error::malformed_value("expected null terminator"))
    }
}

/// Read a length-prefixed, null-terminated string. The length prefix includes the terminator.
fn read_lenencoded(buf: &[u8]) -> Result<&str> {
    let length = i32_from_slice(buf)?;
    let end = checked_add(usize_from_slice(buf)?, 4)?;

    if length < MIN_BSON_STRING_SIZE - 4 {
        return Err(Error::malformed_value(format!(
            "BSON length encoded string needs to be at least {} bytes, instead got {}",
            MIN_BSON_STRING_SIZE - 4,
            length
        )));
    }

    if buf.len() < end {
        return Err(Error::malformed_value(format!(
            "expected buffer to contain at least {} bytes, but it only has {}",
            end,
            buf.len()
        )));
    }

    if buf[end - 1] != 0 {
        return Err(Error::malformed_value("expected string to be null-terminated"));
    }

    // exclude null byte
    try_to_str(&buf[4..(end - 1)])
}

fn try_to_str(data: &[u8]) -> Result<&str> {
    Ok(simdutf8::basic::from_utf8(data)?)
}

fn checked_add(lhs: usize, rhs: usize) -> Result<usize> {
    lhs.checked_add(rhs)
        .ok_or_else(|| Error::malformed_value("attempted to add with overflow"))
}

/// Write a length-prefixed, null-terminated string.
pub(crate) fn write_string(buf: &mut Vec<u8>, s: &str) {
    buf.extend(((s.len() + 1) as i32).to_le_bytes());
    buf.extend(s.as_bytes());
    buf.push(0);
}
