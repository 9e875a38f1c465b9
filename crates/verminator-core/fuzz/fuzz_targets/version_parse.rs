//! Fuzzing target for version identifier parsing
//!
//! Any input must either parse or return an error, and whatever parses
//! must render back to a string that parses to the same identifier.

#![no_main]

use libfuzzer_sys::fuzz_target;
use verminator_core::VersionIdentifier;

fuzz_target!(|data: &[u8]| {
    let input = String::from_utf8_lossy(data);
    if let Ok(version) = VersionIdentifier::parse(&input) {
        let rendered = version.to_string();
        let reparsed = VersionIdentifier::parse(&rendered).expect("rendered version must parse");
        assert_eq!(version, reparsed);
    }
});
