#![no_main]

use checkers::Value;
use checkers::checker::{Checker, Matches};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // First line is the pattern, the rest is the text
    if let Ok(s) = std::str::from_utf8(data) {
        let (pattern, text) = s.split_once('\n').unwrap_or((s, ""));
        let result = Matches.check(&Value::from(text), &[Value::from(pattern)]);
        if let Err(failure) = result {
            let message = failure.to_string();
            assert!(
                message.starts_with("unable to compile regexp: ") || message.contains("did not match pattern"),
                "unexpected failure: {message}"
            );
        }
    }
});
