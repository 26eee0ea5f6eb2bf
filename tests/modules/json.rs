use bsonbuf::{Builder, DateTime, RawBsonRef, oid::ObjectId};
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn documents_render_as_relaxed_extended_json() {
    let mut builder = Builder::new();
    builder
        .append("_id", ObjectId::parse_str("507f1f77bcf86cd799439011").unwrap())
        .unwrap();
    builder.append("n", 1.5).unwrap();
    builder.append("big", i64::MAX).unwrap();
    builder
        .append("when", DateTime::from_millis(1_500_000_000_000))
        .unwrap();
    builder.open_array_with_key("tags").unwrap();
    builder.append_value("a").unwrap();
    builder.append_value(RawBsonRef::Null).unwrap();
    builder.close_array().unwrap();
    let doc = builder.extract().unwrap();

    assert_eq!(
        doc.to_relaxed_extjson().unwrap(),
        json!({
            "_id": { "$oid": "507f1f77bcf86cd799439011" },
            "n": 1.5,
            "big": i64::MAX,
            "when": { "$date": "2017-07-14T02:40:00Z" },
            "tags": ["a", null],
        })
    );
}

#[test]
fn display_keeps_element_order() {
    let mut builder = Builder::new();
    builder.append("z", 1).unwrap();
    builder.append("a", 2).unwrap();
    let doc = builder.extract().unwrap();
    assert_eq!(doc.to_string(), r#"{"z":1,"a":2}"#);
}
