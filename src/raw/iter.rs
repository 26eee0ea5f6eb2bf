use crate::{
    error::{Error, Result},
    spec::ElementType,
};

use super::{
    MIN_BSON_DOCUMENT_SIZE,
    MIN_BSON_STRING_SIZE,
    MIN_CODE_WITH_SCOPE_SIZE,
    RawDocument,
    RawElement,
    checked_add,
    read_nullterminated,
    usize_from_slice,
};

/// An iterator over the elements of a [`RawDocument`] or [`RawArray`](super::RawArray).
///
/// The iterator validates each element's framing (type tag, key, and declared length) as it
/// advances, so that every yielded [`RawElement`] is guaranteed to lie within the document. The
/// value itself is decoded only when requested. After the first error, iteration stops.
pub struct Iter<'a> {
    doc: &'a RawDocument,
    offset: usize,

    /// Whether the underlying doc is assumed to be valid or if an error has been encountered.
    /// After an error, all subsequent iterations will return None.
    valid: bool,
}

impl<'a> Iter<'a> {
    pub(crate) fn new(doc: &'a RawDocument) -> Self {
        Self {
            doc,
            offset: 4,
            valid: true,
        }
    }

    fn bytes(&self) -> &'a [u8] {
        self.doc.as_bytes()
    }

    /// The last byte of the document is its terminator; no value may extend into it.
    fn verify_enough_bytes(&self, start: usize, num_bytes: usize) -> Result<()> {
        let end = checked_add(start, num_bytes)?;
        if end >= self.bytes().len() {
            return Err(Error::malformed_value(format!(
                "length exceeds remaining length of buffer: {} vs {}",
                num_bytes,
                self.bytes().len().saturating_sub(start + 1)
            )));
        }
        Ok(())
    }

    fn read_len(&self, starting_at: usize) -> Result<usize> {
        self.verify_enough_bytes(starting_at, 4)?;
        usize_from_slice(&self.bytes()[starting_at..])
    }

    fn next_document_len(&self, starting_at: usize) -> Result<usize> {
        self.verify_enough_bytes(starting_at, MIN_BSON_DOCUMENT_SIZE as usize)?;
        let size = self.read_len(starting_at)?;

        if size < MIN_BSON_DOCUMENT_SIZE as usize {
            return Err(Error::malformed_value(format!(
                "document too small: {} bytes",
                size
            )));
        }

        Ok(size)
    }

    fn string_len(&self, starting_at: usize) -> Result<usize> {
        let len = self.read_len(starting_at)?;
        if len < (MIN_BSON_STRING_SIZE - 4) as usize {
            return Err(Error::malformed_value(format!(
                "string length too small: {} bytes",
                len
            )));
        }
        checked_add(len, 4)
    }

    /// Compute the encoded size of the value of the given type starting at `valueoffset`.
    fn value_len(&self, element_type: ElementType, valueoffset: usize) -> Result<usize> {
        let size = match element_type {
            ElementType::Boolean => 1,
            ElementType::Int32 => 4,
            ElementType::Int64 | ElementType::Double => 8,
            ElementType::DateTime | ElementType::Timestamp => 8,
            ElementType::ObjectId => 12,
            ElementType::Decimal128 => 16,
            ElementType::Null
            | ElementType::Undefined
            | ElementType::MinKey
            | ElementType::MaxKey => 0,
            ElementType::String | ElementType::JavaScriptCode | ElementType::Symbol => {
                self.string_len(valueoffset)?
            }
            ElementType::EmbeddedDocument | ElementType::Array => {
                self.next_document_len(valueoffset)?
            }
            ElementType::Binary => {
                let len = self.read_len(valueoffset)?;
                checked_add(len, 4 + 1)?
            }
            ElementType::RegularExpression => {
                let pattern = read_nullterminated(&self.bytes()[valueoffset..])?;
                let options_at = valueoffset + pattern.len() + 1;
                let options = read_nullterminated(&self.bytes()[options_at..])?;
                pattern.len() + 1 + options.len() + 1
            }
            ElementType::DbPointer => checked_add(self.string_len(valueoffset)?, 12)?,
            ElementType::JavaScriptCodeWithScope => {
                let length = self.read_len(valueoffset)?;
                if length < MIN_CODE_WITH_SCOPE_SIZE as usize {
                    return Err(Error::malformed_value("code with scope length too small"));
                }
                length
            }
        };
        self.verify_enough_bytes(valueoffset, size)?;
        Ok(size)
    }

    fn next_element(&mut self) -> Result<RawElement<'a>> {
        let bytes = self.bytes();
        let key = read_nullterminated(&bytes[self.offset + 1..])?;
        let valueoffset = self.offset + 1 + key.len() + 1; // type specifier + key + \0

        let tag = bytes[self.offset];
        let element_type = ElementType::from(tag)
            .ok_or_else(|| Error::malformed_value(format!("invalid tag: {tag:#04x}")))
            .map_err(|e| e.with_key(key))?;

        let size = self
            .value_len(element_type, valueoffset)
            .map_err(|e| e.with_key(key))?;

        self.offset = valueoffset + size;
        Ok(RawElement::new(key, element_type, self.doc, valueoffset, size))
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = Result<RawElement<'a>>;

    fn next(&mut self) -> Option<Result<RawElement<'a>>> {
        if !self.valid {
            return None;
        }

        let len = self.bytes().len();
        if self.offset == len - 1 {
            if self.bytes()[self.offset] == 0 {
                // end of document marker
                return None;
            } else {
                self.valid = false;
                return Some(Err(Error::malformed_value("document not null terminated")));
            }
        } else if self.offset >= len {
            self.valid = false;
            return Some(Err(Error::malformed_value("iteration overflowed document")));
        }

        let result = self.next_element();
        if result.is_err() {
            self.valid = false;
        }
        Some(result)
    }
}

impl std::iter::FusedIterator for Iter<'_> {}

#[cfg(test)]
mod test {
    use crate::raw::RawDocument;

    #[test]
    fn stops_after_first_error() {
        // {"a": <string claiming 100 bytes>}
        let bytes = b"\x10\x00\x00\x00\x02a\x00\x64\x00\x00\x00abc\x00\x00";
        let doc = RawDocument::from_bytes(bytes).unwrap();
        let mut iter = doc.iter();
        let err = iter.next().unwrap().unwrap_err();
        assert!(err.is_malformed_value());
        assert_eq!(err.key.as_deref(), Some("a"));
        assert!(iter.next().is_none());
    }

    #[test]
    fn rejects_unknown_tag() {
        let bytes = b"\x08\x00\x00\x00\x20a\x00\x00";
        let doc = RawDocument::from_bytes(bytes).unwrap();
        let err = doc.iter().next().unwrap().unwrap_err();
        assert!(err.is_malformed_value());
    }

    #[test]
    fn value_cannot_overlap_terminator() {
        // {"a": int32} with only three payload bytes before the terminator
        let bytes = b"\x0b\x00\x00\x00\x10a\x00\x01\x00\x00\x00";
        let doc = RawDocument::from_bytes(bytes).unwrap();
        assert!(doc.iter().next().unwrap().is_err());
    }
}
