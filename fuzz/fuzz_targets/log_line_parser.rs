#![no_main]

use libfuzzer_sys::fuzz_target;
use cairn::provenance::parse_log_line;

fuzz_target!(|data: &[u8]| {
    // Log files may contain torn or corrupted lines; parsing must never panic
    if let Ok(input) = std::str::from_utf8(data) {
        let _ = parse_log_line(input);
    }
});
