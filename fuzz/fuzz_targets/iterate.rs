#![no_main]
#[macro_use]
extern crate libfuzzer_sys;
extern crate bsonbuf;
use bsonbuf::RawDocument;

fuzz_target!(|buf: &[u8]| {
    if let Ok(doc) = RawDocument::from_bytes(buf) {
        for element in doc {
            match element {
                Ok(element) => {
                    let _ = element.value();
                }
                Err(_) => break,
            }
        }
    }
});
