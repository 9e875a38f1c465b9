//! Fuzzing target for instance documents
//!
//! Arbitrary YAML must never panic the document parser or the instance
//! builder.

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::path::Path;
use verminator_core::document::parse_instance;
use verminator_core::ProductInstance;

fuzz_target!(|data: &[u8]| {
    let content = String::from_utf8_lossy(data);
    if let Ok(document) = parse_instance(&content, Path::new("fuzz.yml")) {
        let _ = ProductInstance::from_document(&document);
    }
});
