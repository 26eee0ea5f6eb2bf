use bsonbuf::{
    Builder,
    FrameKind,
    RawDocument,
    error::{Error, ErrorKind},
    spec::ElementType,
};
use pretty_assertions::assert_eq;

fn is_kind(result: Result<(), Error>, check: impl Fn(&ErrorKind) -> bool) -> bool {
    match result {
        Ok(()) => false,
        Err(e) => check(&e.kind),
    }
}

#[test]
fn invalid_sequences_are_rejected() {
    let mut builder = Builder::new();
    builder.open_array_with_key("list").unwrap();

    assert!(is_kind(builder.append_key("k"), |k| matches!(
        k,
        ErrorKind::WrongContext { .. }
    )));
    assert!(is_kind(builder.close_document(), |k| matches!(
        k,
        ErrorKind::UnbalancedClose {
            attempted: FrameKind::Document,
            current: Some(FrameKind::Array),
            ..
        }
    )));
    assert!(is_kind(builder.view().map(|_| ()), |k| matches!(
        k,
        ErrorKind::Incomplete { open_frames: 1, .. }
    )));

    builder.close_array().unwrap();
    assert!(is_kind(builder.append_value(1), |k| matches!(
        k,
        ErrorKind::MissingKey
    )));
    assert_eq!(builder.view().unwrap().get_array("list").unwrap().iter().count(), 0);
}

#[test]
fn usage_errors_are_classified() {
    let mut builder = Builder::new();
    let err = builder.close_array().unwrap_err();
    assert!(err.is_usage_error());

    let err = builder.append("nul\0", 1).unwrap_err();
    assert!(!err.is_usage_error());
}

#[test]
fn reads_bytes_from_elsewhere() {
    // {"hello": "world", "n": {"$numberLong": "7"}}
    let bytes = b"\x21\x00\x00\x00\x02hello\x00\x06\x00\x00\x00world\x00\x12n\x00\x07\x00\x00\x00\x00\x00\x00\x00\x00";
    let doc = RawDocument::from_bytes(bytes).unwrap();
    assert_eq!(doc.get_str("hello").unwrap(), "world");
    assert_eq!(doc.get_i64("n").unwrap(), 7);

    let types: Vec<_> = doc.iter().map(|e| e.unwrap().element_type()).collect();
    assert_eq!(types, [ElementType::String, ElementType::Int64]);

    let err = doc.get_i32("n").unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::TypeMismatch {
            actual: ElementType::Int64,
            expected: ElementType::Int32,
            ..
        }
    ));
}

#[test]
fn builder_output_can_be_reembedded() {
    let mut inner = Builder::new();
    inner.append("x", 1).unwrap();
    let inner = inner.extract().unwrap();

    let mut outer = Builder::new();
    outer.append("copy", &inner).unwrap();
    outer.open_array_with_key("spread").unwrap();
    outer.concatenate(&inner).unwrap();
    outer.close_array().unwrap();
    let outer = outer.extract().unwrap();

    assert_eq!(
        outer.get_document("copy").unwrap().as_bytes(),
        inner.as_bytes()
    );
    assert_eq!(outer.get_array("spread").unwrap().get_i32(0).unwrap(), 1);
}
