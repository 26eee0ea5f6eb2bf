//! Rendering of raw documents as [relaxed Extended JSON](https://www.mongodb.com/docs/manual/reference/mongodb-extended-json/).

use std::fmt;

use base64::{Engine, engine::general_purpose::STANDARD};
use serde_json::{Map, Value, json};

use crate::error::Result;

use super::{RawArray, RawBsonRef, RawDocument, RawDocumentBuf};

impl RawDocument {
    /// Converts the document into its relaxed Extended JSON representation.
    ///
    /// Every element is decoded along the way, so this fails on the first malformed element.
    ///
    /// ```
    /// use bsonbuf::Builder;
    /// use serde_json::json;
    ///
    /// let mut builder = Builder::new();
    /// builder.append("x", 1)?;
    /// builder.open_array_with_key("y")?;
    /// builder.append_value(1)?;
    /// builder.append_value(2)?;
    /// builder.close_array()?;
    ///
    /// assert_eq!(builder.view()?.to_relaxed_extjson()?, json!({ "x": 1, "y": [1, 2] }));
    /// # Ok::<(), bsonbuf::error::Error>(())
    /// ```
    pub fn to_relaxed_extjson(&self) -> Result<Value> {
        let mut map = Map::new();
        for element in self {
            let element = element?;
            let value = element.value()?;
            map.insert(element.key().to_owned(), value.to_relaxed_extjson()?);
        }
        Ok(Value::Object(map))
    }
}

impl RawArray {
    /// Converts the array into its relaxed Extended JSON representation.
    pub fn to_relaxed_extjson(&self) -> Result<Value> {
        let mut values = Vec::new();
        for element in self {
            values.push(element?.value()?.to_relaxed_extjson()?);
        }
        Ok(Value::Array(values))
    }
}

impl RawBsonRef<'_> {
    /// Converts the value into its relaxed Extended JSON representation.
    pub fn to_relaxed_extjson(self) -> Result<Value> {
        Ok(match self {
            RawBsonRef::Double(v) if v.is_nan() => {
                let s = if v.is_sign_negative() { "-NaN" } else { "NaN" };

                json!({ "$numberDouble": s })
            }
            RawBsonRef::Double(v) if v.is_infinite() => {
                let s = if v.is_sign_negative() {
                    "-Infinity"
                } else {
                    "Infinity"
                };

                json!({ "$numberDouble": s })
            }
            RawBsonRef::Double(v) => json!(v),
            RawBsonRef::String(v) => json!(v),
            RawBsonRef::Array(v) => v.to_relaxed_extjson()?,
            RawBsonRef::Document(v) => v.to_relaxed_extjson()?,
            RawBsonRef::Boolean(v) => json!(v),
            RawBsonRef::Null => Value::Null,
            RawBsonRef::RegularExpression(re) => json!({
                "$regularExpression": {
                    "pattern": re.pattern,
                    "options": re.options,
                }
            }),
            RawBsonRef::JavaScriptCode(code) => json!({ "$code": code }),
            RawBsonRef::JavaScriptCodeWithScope(code_w_scope) => json!({
                "$code": code_w_scope.code,
                "$scope": code_w_scope.scope.to_relaxed_extjson()?,
            }),
            RawBsonRef::Int32(v) => v.into(),
            RawBsonRef::Int64(v) => v.into(),
            RawBsonRef::Timestamp(ts) => json!({
                "$timestamp": {
                    "t": ts.time,
                    "i": ts.increment,
                }
            }),
            RawBsonRef::Binary(b) => {
                let tval: u8 = From::from(b.subtype);
                json!({
                    "$binary": {
                        "base64": STANDARD.encode(b.bytes),
                        "subType": hex::encode([tval]),
                    }
                })
            }
            RawBsonRef::ObjectId(v) => json!({ "$oid": v.to_hex() }),
            RawBsonRef::DateTime(v) if v.timestamp_millis() >= 0 => match v.try_to_rfc3339_string()
            {
                Ok(s) => json!({ "$date": s }),
                Err(_) => json!({
                    "$date": { "$numberLong": v.timestamp_millis().to_string() },
                }),
            },
            RawBsonRef::DateTime(v) => json!({
                "$date": { "$numberLong": v.timestamp_millis().to_string() },
            }),
            RawBsonRef::Symbol(v) => json!({ "$symbol": v }),
            RawBsonRef::Decimal128(d) => json!({ "$numberDecimalBytes": hex::encode(d.bytes()) }),
            RawBsonRef::Undefined => json!({ "$undefined": true }),
            RawBsonRef::MinKey => json!({ "$minKey": 1 }),
            RawBsonRef::MaxKey => json!({ "$maxKey": 1 }),
            RawBsonRef::DbPointer(dbp) => json!({
                "$dbPointer": {
                    "$ref": dbp.namespace,
                    "$id": {
                        "$oid": dbp.id.to_hex()
                    }
                }
            }),
        })
    }
}

impl fmt::Display for RawDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_relaxed_extjson() {
            Ok(value) => fmt::Display::fmt(&value, f),
            Err(e) => write!(f, "<malformed: {e}>"),
        }
    }
}

impl fmt::Display for RawDocumentBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&**self, f)
    }
}

impl fmt::Display for RawArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_relaxed_extjson() {
            Ok(value) => fmt::Display::fmt(&value, f),
            Err(e) => write!(f, "<malformed: {e}>"),
        }
    }
}
