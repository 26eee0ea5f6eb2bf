//! Documents written by the builder compared against canonical encodings from the BSON corpus.

use bsonbuf::{
    Builder,
    DateTime,
    RawBinaryRef,
    RawBsonRef,
    RawDocument,
    RawRegexRef,
    Timestamp,
    oid::ObjectId,
    spec::BinarySubtype,
};
use pretty_assertions::assert_eq;

fn single<'a>(key: &str, value: impl Into<RawBsonRef<'a>>) -> String {
    let mut builder = Builder::new();
    builder.append(key, value).unwrap();
    hex::encode_upper(builder.view().unwrap().as_bytes())
}

fn run_case(canonical: &str, built: String) {
    assert_eq!(built, canonical);

    let bytes = hex::decode(canonical).unwrap();
    let doc = RawDocument::from_bytes(&bytes).unwrap();
    for element in doc {
        element.unwrap().value().unwrap();
    }
}

#[test]
fn int32() {
    run_case("0C0000001069000000008000", single("i", i32::MIN));
    run_case("0C000000106900FFFFFF7F00", single("i", i32::MAX));
}

#[test]
fn int64() {
    run_case("10000000126100010000000000000000", single("a", 1i64));
}

#[test]
fn double() {
    run_case("10000000016400000000000000F03F00", single("d", 1.0));
}

#[test]
fn string() {
    run_case("0E00000002610002000000620000", single("a", "b"));
    run_case("0D000000026100010000000000", single("a", ""));
}

#[test]
fn boolean_and_null() {
    run_case("090000000862000100", single("b", true));
    run_case("080000000A610000", single("a", RawBsonRef::Null));
}

#[test]
fn min_and_max_key() {
    run_case("08000000FF610000", single("a", RawBsonRef::MinKey));
    run_case("080000007F610000", single("a", RawBsonRef::MaxKey));
}

#[test]
fn object_id_datetime_and_timestamp() {
    run_case(
        "1400000007610000000000000000000000000000",
        single("a", ObjectId::from_bytes([0; 12])),
    );
    run_case(
        "10000000096100000000000000000000",
        single("a", DateTime::from_millis(0)),
    );
    run_case(
        "100000001161002A00000015CD5B0700",
        single(
            "a",
            Timestamp {
                time: 123456789,
                increment: 42,
            },
        ),
    );
}

#[test]
fn regex() {
    run_case(
        "0F0000000B610061626300696D0000",
        single(
            "a",
            RawRegexRef {
                pattern: "abc",
                options: "im",
            },
        ),
    );
}

#[test]
fn binary() {
    run_case(
        "0F0000000578000200000000FFFF00",
        single(
            "x",
            RawBinaryRef {
                subtype: BinarySubtype::Generic,
                bytes: b"\xff\xff",
            },
        ),
    );
}

#[test]
fn empty_subdocument() {
    let mut builder = Builder::new();
    builder.open_document_with_key("x").unwrap();
    builder.close_document().unwrap();
    run_case(
        "0D000000037800050000000000",
        hex::encode_upper(builder.view().unwrap().as_bytes()),
    );
}

#[test]
fn single_element_array() {
    let mut builder = Builder::new();
    builder.open_array_with_key("a").unwrap();
    builder.append_value(10).unwrap();
    builder.close_array().unwrap();
    run_case(
        "140000000461000C0000001030000A0000000000",
        hex::encode_upper(builder.view().unwrap().as_bytes()),
    );
}
