use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use checkers_core::{CheckResult, Failure, Value};
use once_cell::sync::Lazy;
use regex::Regex;

use super::{Checker, expected_arg, pattern_arg};

/// Most patterns kept compiled at once; the cache is emptied when it would grow past this.
const CACHE_CAPACITY: usize = 256;

/// Longer patterns are compiled on every use instead of being cached.
const MAX_CACHED_PATTERN_LEN: usize = 1024;

static COMPILED: Lazy<Mutex<PatternCache>> = Lazy::new(|| Mutex::new(PatternCache::new(CACHE_CAPACITY)));

/// Passes when the obtained text matches the expected pattern as a whole.
///
/// Strings, stringers (any `Display`) and errors all count as text.
#[derive(Debug, Clone, Copy, Default)]
pub struct Matches;

impl Checker for Matches {
    fn name(&self) -> &'static str {
        "Matches"
    }

    fn check(&self, obtained: &Value, extras: &[Value]) -> CheckResult {
        let pattern = pattern_arg(expected_arg(extras)?)?;
        let Some(text) = obtained.text() else {
            return Err(Failure::msg(format!(
                "{}({}) is neither a string nor has a 'Display' implementation",
                obtained.type_name(),
                obtained.repr()
            )));
        };
        match_anchored(&text, pattern)
    }
}

/// Anchor a pattern at both ends so it can only match a whole string.
///
/// ## Examples
///
/// ```rust
/// use checkers::checker::anchor;
///
/// assert_eq!(anchor("est"), "^est$");
/// assert_eq!(anchor("^est$"), "^est$");
/// assert_eq!(anchor("^te"), "^te$");
/// ```
pub fn anchor(pattern: &str) -> Cow<'_, str> {
    match (pattern.starts_with('^'), pattern.ends_with('$')) {
        (true, true) => Cow::Borrowed(pattern),
        (true, false) => Cow::Owned(format!("{pattern}$")),
        (false, true) => Cow::Owned(format!("^{pattern}")),
        (false, false) => Cow::Owned(format!("^{pattern}$")),
    }
}

/// Match `text` against the anchored form of `pattern`.
pub(crate) fn match_anchored(text: &str, pattern: &str) -> CheckResult {
    let anchored = anchor(pattern);
    let regex = compile(&anchored)?;
    if regex.is_match(text) {
        Ok(())
    } else {
        Err(Failure::msg(format!("{text:?} did not match pattern {anchored:?}")))
    }
}

fn compile(anchored: &str) -> Result<Regex, Failure> {
    // Entries are inserted whole, so a poisoned cache is still consistent.
    COMPILED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_compile(anchored)
}

/// Compiled anchored patterns, keyed by their anchored source.
///
/// Only patterns that compile and are at most [`MAX_CACHED_PATTERN_LEN`] bytes are kept. Reaching `capacity`
/// drops every entry, so generated patterns cannot grow it without bound.
struct PatternCache {
    entries: HashMap<String, Regex>,
    capacity: usize,
}

impl PatternCache {
    fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity,
        }
    }

    fn get_or_compile(&mut self, anchored: &str) -> Result<Regex, Failure> {
        if let Some(regex) = self.entries.get(anchored) {
            return Ok(regex.clone());
        }
        let regex = Regex::new(anchored).map_err(|e| Failure::msg(format!("unable to compile regexp: {e}")))?;
        tracing::trace!(pattern = anchored, "compiled pattern");
        if anchored.len() > MAX_CACHED_PATTERN_LEN {
            return Ok(regex);
        }
        if self.entries.len() >= self.capacity {
            tracing::debug!(entries = self.entries.len(), "pattern cache full, clearing");
            self.entries.clear();
        }
        self.entries.insert(anchored.to_string(), regex.clone());
        Ok(regex)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
