#![no_main]
#[macro_use]
extern crate libfuzzer_sys;
extern crate bsonbuf;
use bsonbuf::{Builder, RawDocument};

fuzz_target!(|buf: &[u8]| {
    if let Ok(doc) = RawDocument::from_bytes(buf) {
        let mut builder = Builder::new();
        builder.append("before", true).unwrap();
        let accepted = builder.concatenate(doc).is_ok();

        builder.open_array_with_key("items").unwrap();
        if builder.concatenate(doc).is_ok() != accepted {
            panic!("document and array frames disagree on validity");
        }
        builder.close_array().unwrap();

        let out = builder.extract().unwrap();
        let out = RawDocument::from_bytes(out.as_bytes()).unwrap();
        for element in out {
            element.unwrap().value().unwrap();
        }
    }
});
