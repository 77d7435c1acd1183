//! The checker protocol and the library of checkers that implement it.
//!
//! A checker is a named, stateless predicate over an obtained [`Value`] and zero or more extra arguments. It
//! reports success as `Ok(())` and failure as a [`Failure`] whose text the facade hands to the test host.
//!
//! ## Notes
//!
//! - Checkers never touch the host. Everything they know comes in through their arguments.
//! - Every checker in this module is a unit struct, so `&Equals` is a valid `&dyn Checker` with no setup.

use checkers_core::{CheckResult, Failure, Value};

mod boolean;
mod equality;
mod len;
mod panics;
mod pattern;

pub use boolean::{IsFalse, IsTrue};
pub use equality::{DeepEquals, Equals, IsNil};
pub use len::HasLen;
pub use panics::{PanicMatches, PanicPayload, describe_panic};
pub use pattern::{Matches, anchor};

/// A named predicate over a dynamically-typed value.
///
/// Implementors must be stateless: the same inputs always produce the same verdict.
pub trait Checker: Send + Sync {
    /// The name reported in diagnostics and used by [`lookup`].
    fn name(&self) -> &'static str;

    /// Evaluate the check.
    ///
    /// ## Parameters
    ///
    /// - `obtained`: the value under test
    /// - `extras`: extra arguments; by convention the first one is the expected value
    ///
    /// ## Returns
    ///
    /// - `Ok(())` when the check passes, otherwise the reason it did not.
    fn check(&self, obtained: &Value, extras: &[Value]) -> CheckResult;
}

impl std::fmt::Debug for dyn Checker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Every checker this crate ships, in documentation order.
pub static CATALOG: &[&dyn Checker] = &[
    &IsNil,
    &Equals,
    &DeepEquals,
    &IsTrue,
    &IsFalse,
    &HasLen,
    &Matches,
    &PanicMatches,
];

/// Find a shipped checker by name.
///
/// ## Examples
///
/// ```rust
/// use checkers::checker::lookup;
///
/// assert_eq!(lookup("HasLen").map(|c| c.name()), Some("HasLen"));
/// assert!(lookup("NotAChecker").is_none());
/// ```
pub fn lookup(name: &str) -> Option<&'static dyn Checker> {
    CATALOG.iter().copied().find(|checker| checker.name() == name)
}

// ============================================================================
// Shared argument handling
// ============================================================================

/// The first extra argument, or the failure every expected-value checker reports without one.
pub(crate) fn expected_arg(extras: &[Value]) -> Result<&Value, Failure> {
    extras.first().ok_or_else(|| Failure::msg("missing 'expected' value"))
}

/// The expected value as a regular expression source.
pub(crate) fn pattern_arg(expected: &Value) -> Result<&str, Failure> {
    expected
        .as_str()
        .ok_or_else(|| Failure::msg("expected value must be a string containing a regexp pattern"))
}
