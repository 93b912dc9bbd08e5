#![no_main]

use libfuzzer_sys::fuzz_target;
use cairn::edit_distance::{levenshtein, normalized_similarity};

fuzz_target!(|data: (&str, &str)| {
    let (a, b) = data;
    let distance = levenshtein(a, b);
    assert!(distance <= a.chars().count().max(b.chars().count()));
    assert_eq!(distance, levenshtein(b, a));

    let similarity = normalized_similarity(a, b);
    assert!((0.0..=1.0).contains(&similarity));
});
