//! Fuzz target for console line parsing
//!
//! # Invariants
//!
//! - Arbitrary text never panics the parser
//! - Blank lines are always `Empty`
//! - Lines that parse keep doing so with surrounding whitespace

#![no_main]

use babel_cli::{CommandError, parse_line};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|line: &str| {
    let parsed = parse_line(line, 0);

    if line.trim().is_empty() {
        assert_eq!(parsed, Err(CommandError::Empty));
    }

    if let Ok(input) = parsed {
        let padded = format!("  {line}\t");
        assert_eq!(parse_line(&padded, 0), Ok(input), "padding changed {line:?}");
    }
});
