use proptest::prelude::*;

use crate::{
    Builder,
    DateTime,
    raw::{RawBsonRef, RawDocument},
};

#[derive(Clone, Debug)]
enum Node {
    Int(i64),
    Text(String),
    Flag(bool),
    Null,
    Document(Vec<(String, Node)>),
    Array(Vec<Node>),
}

fn arbitrary_node() -> impl Strategy<Value = Node> {
    let leaf = prop_oneof![
        any::<i64>().prop_map(Node::Int),
        any::<String>().prop_map(Node::Text),
        any::<bool>().prop_map(Node::Flag),
        Just(Node::Null),
    ];

    leaf.prop_recursive(4, 128, 8, |inner| {
        prop_oneof![
            prop::collection::vec(("[^\0]*", inner.clone()), 0..8).prop_map(Node::Document),
            prop::collection::vec(inner, 0..8).prop_map(Node::Array),
        ]
    })
}

fn arbitrary_fields() -> impl Strategy<Value = Vec<(String, Node)>> {
    prop::collection::vec(("[^\0]*", arbitrary_node()), 0..8)
}

fn write_value(builder: &mut Builder, node: &Node) {
    match node {
        Node::Int(i) => builder.append_value(*i).unwrap(),
        Node::Text(s) => builder.append_value(s.as_str()).unwrap(),
        Node::Flag(b) => builder.append_value(*b).unwrap(),
        Node::Null => builder.append_value(RawBsonRef::Null).unwrap(),
        Node::Document(fields) => {
            builder.open_document().unwrap();
            for (key, value) in fields {
                builder.append_key(key).unwrap();
                write_value(builder, value);
            }
            builder.close_document().unwrap();
        }
        Node::Array(items) => {
            builder.open_array().unwrap();
            for item in items {
                write_value(builder, item);
            }
            builder.close_array().unwrap();
        }
    }
}

fn assert_matches_node(value: RawBsonRef<'_>, node: &Node) {
    match node {
        Node::Int(i) => assert_eq!(value.as_i64(), Some(*i)),
        Node::Text(s) => assert_eq!(value.as_str(), Some(s.as_str())),
        Node::Flag(b) => assert_eq!(value.as_bool(), Some(*b)),
        Node::Null => assert_eq!(value.as_null(), Some(())),
        Node::Document(fields) => {
            let doc = value.as_document().unwrap();
            assert_fields(doc, fields);
        }
        Node::Array(items) => {
            let array = value.as_array().unwrap();
            let elements: Vec<_> = array.into_iter().map(|e| e.unwrap()).collect();
            assert_eq!(elements.len(), items.len());
            for (index, (element, item)) in elements.iter().zip(items).enumerate() {
                assert_eq!(element.key(), index.to_string());
                assert_matches_node(element.value().unwrap(), item);
            }
        }
    }
}

fn assert_fields(doc: &RawDocument, fields: &[(String, Node)]) {
    let elements: Vec<_> = doc.iter().map(|e| e.unwrap()).collect();
    assert_eq!(elements.len(), fields.len());
    for (element, (key, node)) in elements.iter().zip(fields) {
        assert_eq!(element.key(), key);
        assert_matches_node(element.value().unwrap(), node);
    }
}

proptest! {
    #[test]
    fn built_trees_read_back_in_order(fields in arbitrary_fields()) {
        let mut builder = Builder::new();
        for (key, node) in &fields {
            builder.append_key(key).unwrap();
            write_value(&mut builder, node);
        }
        let doc = builder.extract().unwrap();
        assert_fields(&doc, &fields);
        prop_assert!(builder.view().unwrap().is_empty());
    }

    #[test]
    fn declared_length_matches_buffer(fields in arbitrary_fields()) {
        let mut builder = Builder::new();
        for (key, node) in &fields {
            builder.append_key(key).unwrap();
            write_value(&mut builder, node);
        }
        let bytes = builder.view().unwrap().as_bytes();
        let declared = i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        prop_assert_eq!(declared as usize, bytes.len());
        prop_assert_eq!(bytes[bytes.len() - 1], 0);
    }

    #[test]
    fn clear_always_restores_the_empty_document(fields in arbitrary_fields()) {
        let mut builder = Builder::new();
        for (key, node) in &fields {
            builder.append_key(key).unwrap();
            write_value(&mut builder, node);
        }
        builder.clear();
        builder.clear();
        prop_assert_eq!(builder.view().unwrap().as_bytes(), b"\x05\x00\x00\x00\x00");
    }

    #[test]
    fn array_keys_count_up_from_zero(items in prop::collection::vec(arbitrary_node(), 0..40)) {
        let mut builder = Builder::new();
        builder.open_array_with_key("a").unwrap();
        for item in &items {
            write_value(&mut builder, item);
        }
        builder.close_array().unwrap();

        let doc = builder.extract().unwrap();
        let keys: Vec<String> = doc
            .get_array("a")
            .unwrap()
            .into_iter()
            .map(|e| e.unwrap().key().to_owned())
            .collect();
        let expected: Vec<String> = (0..items.len()).map(|i| i.to_string()).collect();
        prop_assert_eq!(keys, expected);
    }

    #[test]
    fn scalars_round_trip(
        i in any::<i32>(),
        l in any::<i64>(),
        d in any::<f64>(),
        s in any::<String>(),
        millis in any::<i64>(),
    ) {
        let mut builder = Builder::new();
        builder.append("i", i).unwrap();
        builder.append("l", l).unwrap();
        builder.append("d", d).unwrap();
        builder.append("s", s.as_str()).unwrap();
        builder.append("t", DateTime::from_millis(millis)).unwrap();
        let doc = builder.extract().unwrap();

        prop_assert_eq!(doc.get_i32("i").unwrap(), i);
        prop_assert_eq!(doc.get_i64("l").unwrap(), l);
        prop_assert_eq!(doc.get_f64("d").unwrap().to_bits(), d.to_bits());
        prop_assert_eq!(doc.get_str("s").unwrap(), s.as_str());
        prop_assert_eq!(doc.get_datetime("t").unwrap().timestamp_millis(), millis);
    }

    #[test]
    fn no_crash_on_arbitrary_bytes(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        if let Ok(doc) = RawDocument::from_bytes(&bytes) {
            for element in doc {
                match element {
                    Ok(element) => {
                        let _ = element.value();
                    }
                    Err(_) => break,
                }
            }
        }
    }

    #[test]
    fn framed_arbitrary_payloads_never_panic(body in prop::collection::vec(any::<u8>(), 0..128)) {
        let len = (body.len() + 5) as i32;
        let mut bytes = len.to_le_bytes().to_vec();
        bytes.extend(&body);
        bytes.push(0);
        let doc = RawDocument::from_bytes(&bytes).unwrap();
        let _ = doc.iter().count();
        let _ = doc.get("a");
    }
}
