use pretty_assertions::assert_eq;

use crate::{
    Binary,
    Builder,
    DateTime,
    Decimal128,
    Timestamp,
    oid::ObjectId,
    raw::{
        RawBinaryRef,
        RawBsonRef,
        RawDbPointerRef,
        RawDocumentBuf,
        RawJavaScriptCodeWithScopeRef,
        RawRegexRef,
    },
    spec::{BinarySubtype, ElementType},
};

fn single(value: RawBsonRef<'_>) -> RawDocumentBuf {
    let mut builder = Builder::new();
    builder.append("v", value).unwrap();
    builder.extract().unwrap()
}

#[test]
fn int32_boundaries() {
    for value in [i32::MIN, -1, 0, 1, i32::MAX] {
        let doc = single(value.into());
        assert_eq!(doc.get_i32("v").unwrap(), value);
        assert_eq!(doc.get_element("v").unwrap().len(), 4);
    }
}

#[test]
fn int64_is_never_narrowed() {
    for value in [i64::MIN, 0, 1, i64::MAX] {
        let doc = single(value.into());
        let element = doc.get_element("v").unwrap();
        assert_eq!(element.element_type(), ElementType::Int64);
        assert_eq!(element.len(), 8);
        assert_eq!(element.get_i64().unwrap(), value);
    }
}

#[test]
fn doubles() {
    for value in [0.0, -0.0, 1.5, f64::MIN, f64::MAX, f64::INFINITY] {
        let doc = single(value.into());
        assert_eq!(doc.get_f64("v").unwrap().to_bits(), value.to_bits());
    }
    let doc = single(f64::NAN.into());
    assert!(doc.get_f64("v").unwrap().is_nan());
}

#[test]
fn strings() {
    for value in ["", "a", "ünïcödé 🦀", "with\0nul"] {
        let doc = single(value.into());
        assert_eq!(doc.get_str("v").unwrap(), value);
    }
    let doc = single("".into());
    assert_eq!(doc.as_bytes(), b"\x0d\x00\x00\x00\x02v\x00\x01\x00\x00\x00\x00\x00");
}

#[test]
fn booleans_and_unit_values() {
    assert!(single(true.into()).get_bool("v").unwrap());
    assert!(!single(false.into()).get_bool("v").unwrap());

    let doc = single(RawBsonRef::Null);
    let element = doc.get_element("v").unwrap();
    assert!(element.is_empty());
    element.get_null().unwrap();

    single(RawBsonRef::Undefined)
        .get_element("v")
        .unwrap()
        .get_undefined()
        .unwrap();
    single(RawBsonRef::MinKey)
        .get_element("v")
        .unwrap()
        .get_min_key()
        .unwrap();
    single(RawBsonRef::MaxKey)
        .get_element("v")
        .unwrap()
        .get_max_key()
        .unwrap();

    let doc = single(RawBsonRef::MinKey);
    assert_eq!(
        doc.get_element("v").unwrap().element_type(),
        ElementType::MinKey
    );
    assert!(
        doc.get_element("v")
            .unwrap()
            .get_max_key()
            .unwrap_err()
            .is_type_mismatch()
    );
}

#[test]
fn binaries() {
    let empty = Binary {
        subtype: BinarySubtype::Generic,
        bytes: Vec::new(),
    };
    let doc = single((&empty).into());
    assert_eq!(doc.get_binary("v").unwrap().to_binary(), empty);

    let user = RawBinaryRef {
        subtype: BinarySubtype::UserDefined(0x99),
        bytes: b"\x01\x02\x03",
    };
    let doc = single(user.into());
    assert_eq!(doc.get_binary("v").unwrap(), user);
}

#[test]
fn old_binary_carries_inner_length() {
    let old = RawBinaryRef {
        subtype: BinarySubtype::BinaryOld,
        bytes: b"abc",
    };
    let doc = single(old.into());
    assert_eq!(
        doc.get_element("v").unwrap().value_bytes(),
        b"\x07\x00\x00\x00\x02\x03\x00\x00\x00abc"
    );
    assert_eq!(doc.get_binary("v").unwrap(), old);
}

#[test]
fn object_ids_and_dates() {
    let oid = ObjectId::from_bytes(*b"twelve bytes");
    assert_eq!(single(oid.into()).get_object_id("v").unwrap(), oid);

    for millis in [i64::MIN, -1, 0, 1_700_000_000_123, i64::MAX] {
        let date = DateTime::from_millis(millis);
        assert_eq!(single(date.into()).get_datetime("v").unwrap(), date);
    }
}

#[test]
fn timestamps_write_increment_first() {
    let ts = Timestamp {
        time: 0x01020304,
        increment: 0x0a0b0c0d,
    };
    let doc = single(ts.into());
    assert_eq!(
        doc.get_element("v").unwrap().value_bytes(),
        b"\x0d\x0c\x0b\x0a\x04\x03\x02\x01"
    );
    assert_eq!(doc.get_timestamp("v").unwrap(), ts);
}

#[test]
fn decimal128_is_opaque() {
    let bytes = [
        0x01, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x40, 0x30,
    ];
    let doc = single(Decimal128::from_bytes(bytes).into());
    assert_eq!(doc.get_decimal128("v").unwrap().bytes(), bytes);
}

#[test]
fn regexes() {
    let re = RawRegexRef {
        pattern: "^ab+c$",
        options: "im",
    };
    assert_eq!(single(re.into()).get_regex("v").unwrap(), re);

    let empty = RawRegexRef {
        pattern: "",
        options: "",
    };
    assert_eq!(single(empty.into()).get_regex("v").unwrap(), empty);
}

#[test]
fn regex_options_are_written_as_given() {
    let re = RawRegexRef {
        pattern: "a",
        options: "mi",
    };
    let doc = single(re.into());
    assert_eq!(doc.as_bytes(), b"\x0d\x00\x00\x00\x0bv\x00a\x00mi\x00\x00");
    assert_eq!(doc.get_regex("v").unwrap().options, "mi");
}

#[test]
fn code_symbol_and_db_pointer() {
    let doc = single(RawBsonRef::JavaScriptCode("function() {}"));
    assert_eq!(
        doc.get_element("v").unwrap().get_javascript_code().unwrap(),
        "function() {}"
    );

    let doc = single(RawBsonRef::Symbol("sym"));
    assert_eq!(doc.get_element("v").unwrap().get_symbol().unwrap(), "sym");
    assert!(doc.get_str("v").unwrap_err().is_type_mismatch());

    let pointer = RawDbPointerRef {
        namespace: "db.coll",
        id: ObjectId::from_bytes([7; 12]),
    };
    let doc = single(pointer.into());
    assert_eq!(doc.get_element("v").unwrap().get_db_pointer().unwrap(), pointer);
}

#[test]
fn code_with_scope() {
    let mut scope = Builder::new();
    scope.append("x", 1).unwrap();
    let scope = scope.extract().unwrap();

    let code = RawJavaScriptCodeWithScopeRef {
        code: "return x;",
        scope: &scope,
    };
    let doc = single(code.into());
    let element = doc.get_element("v").unwrap();
    assert_eq!(element.len(), 4 + 4 + "return x;".len() + 1 + scope.as_bytes().len());

    let read = element.get_javascript_code_with_scope().unwrap();
    assert_eq!(read.code, "return x;");
    assert_eq!(read.scope.get_i32("x").unwrap(), 1);
}
