//! Fuzz test for the Envist structural tokenizer and coercion engine
//!
//! Arbitrary values are split, tokenized and cast to find:
//! - Panics on unbalanced quotes, brackets or braces
//! - Empty or untrimmed fragments out of the smart splitter
//!
//! Run with: cargo +nightly fuzz run tokenizer_fuzz -- -max_total_time=60

#![no_main]

use envist_dsl::{cast_str, smart_split, to_csv, to_list, to_map};
use libfuzzer_sys::fuzz_target;

const ANNOTATIONS: [&str; 6] = [
    "list",
    "dict",
    "list<int>",
    "dict<str, list<int>>",
    "set<list<str>>",
    "json",
];

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        for part in smart_split(input, ',') {
            assert!(!part.is_empty(), "fragments are never empty");
            assert_eq!(part, part.trim(), "fragments are trimmed");
        }

        let _ = to_list(input);
        let _ = to_map(input);
        let _ = to_csv(input);

        for annotation in ANNOTATIONS {
            let _ = cast_str(input, annotation);
        }
    }
});
