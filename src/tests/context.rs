use assert_matches::assert_matches;
use pretty_assertions::assert_eq;

use crate::{Builder, error::ErrorKind};

#[test]
fn fluent_build_matches_manual_build() {
    let mut manual = Builder::new();
    manual.open_document().unwrap();
    manual.append_key("x").unwrap();
    manual.append_value(1).unwrap();
    manual.append_key("y").unwrap();
    manual.open_array().unwrap();
    manual.append_value(1).unwrap();
    manual.append_value(2).unwrap();
    manual.close_array().unwrap();
    manual.close_document().unwrap();
    let expected = manual.extract().unwrap();

    let mut builder = Builder::new();
    let doc = builder
        .start()
        .unwrap()
        .key("x")
        .unwrap()
        .value(1)
        .unwrap()
        .key("y")
        .unwrap()
        .open_array()
        .unwrap()
        .value(1)
        .unwrap()
        .value(2)
        .unwrap()
        .close_array()
        .unwrap()
        .close_document()
        .unwrap()
        .extract()
        .unwrap();

    assert_eq!(doc.as_bytes(), expected.as_bytes());
}

#[test]
fn nested_contexts_return_to_their_parent() {
    let mut builder = Builder::new();
    let finished = builder
        .start()
        .unwrap()
        .open_array("matrix")
        .unwrap()
        .open_array()
        .unwrap()
        .value(1)
        .unwrap()
        .close_array()
        .unwrap()
        .open_document()
        .unwrap()
        .append("k", "v")
        .unwrap()
        .close_document()
        .unwrap()
        .close_array()
        .unwrap()
        .open_document("meta")
        .unwrap()
        .key("n")
        .unwrap()
        .open_document()
        .unwrap()
        .close_document()
        .unwrap()
        .close_document()
        .unwrap()
        .close_document()
        .unwrap();

    let doc = finished.view().unwrap();
    let matrix = doc.get_array("matrix").unwrap();
    assert_eq!(matrix.get_array(0).unwrap().get_i32(0).unwrap(), 1);
    assert_eq!(matrix.get_document(1).unwrap().get_str("k").unwrap(), "v");
    assert!(
        doc.get_document("meta")
            .unwrap()
            .get_document("n")
            .unwrap()
            .is_empty()
    );
}

#[test]
fn start_requires_an_empty_builder() {
    let mut builder = Builder::new();
    builder.append("a", 1).unwrap();
    assert_matches!(builder.start().err().unwrap().kind, ErrorKind::MissingKey);
}

#[test]
fn value_errors_propagate_through_contexts() {
    let mut builder = Builder::new();
    let err = builder
        .start()
        .unwrap()
        .append("bad\0key", 1)
        .err()
        .unwrap();
    assert_matches!(err.kind, ErrorKind::MalformedValue { .. });
}
