//! Short, path-free type names for diagnostics.
//!
//! `std::any::type_name` spells out full module paths (`alloc::vec::Vec<alloc::string::String>`), which is
//! noise in a failure message. These helpers keep the generic structure and drop the paths.

/// Returns the short type name of `T`, e.g. `Vec<String>` instead of `alloc::vec::Vec<alloc::string::String>`.
pub fn short_type_name<T: ?Sized>() -> String {
    shorten(std::any::type_name::<T>())
}

/// Strips every `path::` prefix from a rendered type name.
///
/// ## Examples
/// ```rust
/// use checkers_core::type_name::shorten;
/// assert_eq!(shorten("std::collections::hash::map::HashMap<&str, alloc::string::String>"), "HashMap<&str, String>");
/// assert_eq!(shorten("[u8; 4]"), "[u8; 4]");
/// ```
pub fn shorten(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut segment = String::new();
    let mut chars = full.chars().peekable();
    while let Some(c) = chars.next() {
        if c == ':' && chars.peek() == Some(&':') {
            chars.next();
            segment.clear();
            continue;
        }
        if c.is_alphanumeric() || c == '_' {
            segment.push(c);
        } else {
            out.push_str(&segment);
            segment.clear();
            out.push(c);
        }
    }
    out.push_str(&segment);
    out
}
