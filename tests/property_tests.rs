//! Property-based tests for the shipped checkers
//!
//! These tests use proptest to check the universally-quantified behavior of each checker across many
//! randomly generated inputs.

use std::collections::BTreeMap;

use checkers::Value;
use checkers::checker::{Checker, DeepEquals, Equals, HasLen, IsNil, Matches, anchor};
use proptest::prelude::*;

fn message(checker: &dyn Checker, obtained: Value, expected: Value) -> Option<String> {
    checker.check(&obtained, &[expected]).err().map(|f| f.to_string())
}

// =============================================================================
// Equals
// =============================================================================

proptest! {
    /// Property: Equals on booleans succeeds iff equal, with the exact failure text otherwise
    #[test]
    fn equals_on_bools(a in any::<bool>(), b in any::<bool>()) {
        let got = message(&Equals, a.into(), b.into());
        if a == b {
            prop_assert_eq!(got, None);
        } else {
            prop_assert_eq!(got, Some(format!("expected bool value {b}, got {a}")));
        }
    }

    /// Property: Differing kinds fail on the type, whatever the values
    #[test]
    fn equals_on_differing_kinds(a in any::<i32>(), b in any::<i64>(), s in ".*") {
        prop_assert_eq!(
            message(&Equals, a.into(), b.into()),
            Some("obtained type i32 does not match expected type i64".to_string())
        );
        prop_assert_eq!(
            message(&Equals, s.into(), a.into()),
            Some("obtained type String does not match expected type i32".to_string())
        );
    }

    /// Property: Equals on same-width integers agrees with `==`
    #[test]
    fn equals_on_integers(a in any::<u64>(), b in any::<u64>()) {
        prop_assert_eq!(Equals.check(&a.into(), &[b.into()]).is_ok(), a == b);
    }
}

// =============================================================================
// IsNil / HasLen
// =============================================================================

proptest! {
    /// Property: Every present value is non-nil
    #[test]
    fn is_nil_rejects_present_values(n in any::<i64>(), s in ".*") {
        prop_assert!(IsNil.check(&Some(n).into(), &[]).is_err());
        prop_assert!(IsNil.check(&s.into(), &[]).is_err());
        prop_assert!(IsNil.check(&None::<i64>.into(), &[]).is_ok());
    }

    /// Property: HasLen succeeds iff the observed length equals the expected size
    #[test]
    fn has_len_on_sequences(items in prop::collection::vec(any::<u8>(), 0..32), size in 0usize..40) {
        let len = items.len();
        let got = message(&HasLen, items.into(), size.into());
        if len == size {
            prop_assert_eq!(got, None);
        } else {
            prop_assert_eq!(got, Some(format!("expected length {size}, obtained {len}")));
        }
    }

    /// Property: HasLen on maps counts entries
    #[test]
    fn has_len_on_maps(map in prop::collection::btree_map("[a-z]{1,4}", any::<i32>(), 0..16)) {
        let len = map.len();
        prop_assert_eq!(message(&HasLen, map.into(), len.into()), None);
    }
}

// =============================================================================
// Matches
// =============================================================================

proptest! {
    /// Property: A literal always matches itself once escaped
    #[test]
    fn matches_escaped_literal(text in ".*") {
        let pattern = regex::escape(&text);
        prop_assert_eq!(message(&Matches, text.as_str().into(), pattern.into()), None);
    }

    /// Property: Anchoring is idempotent and always yields a whole-string pattern
    #[test]
    fn anchoring_is_idempotent(pattern in "[a-z.*^$]{0,8}") {
        let once = anchor(&pattern).into_owned();
        prop_assert!(once.starts_with('^'));
        prop_assert!(once.ends_with('$'));
        prop_assert_eq!(anchor(&once).into_owned(), once);
    }

    /// Property: A proper substring never matches, the pattern being anchored
    #[test]
    fn matches_is_whole_string(prefix in "[a-z]{1,6}", rest in "[a-z]{1,6}") {
        let text = format!("{prefix}{rest}");
        prop_assert_eq!(
            message(&Matches, text.as_str().into(), prefix.as_str().into()),
            Some(format!("{text:?} did not match pattern \"^{prefix}$\""))
        );
    }
}

// =============================================================================
// DeepEquals
// =============================================================================

proptest! {
    /// Property: Every value deep-equals a clone of itself
    #[test]
    fn deep_equals_is_reflexive(
        map in prop::collection::btree_map("[a-z]{1,4}", prop::collection::vec(any::<i16>(), 0..4), 0..8)
    ) {
        let value: Value = map.into();
        prop_assert_eq!(message(&DeepEquals, value.clone(), value), None);
    }

    /// Property: Changing one entry of a map is reported at that key
    #[test]
    fn deep_equals_reports_changed_key(
        map in prop::collection::btree_map("[a-z]{1,4}", any::<i32>(), 1..8),
        pick in any::<prop::sample::Index>(),
    ) {
        let key = pick.get(&map.keys().cloned().collect::<Vec<_>>()).clone();
        let old = map[&key];
        let new = old.wrapping_add(1);
        let mut changed: BTreeMap<String, i32> = map.clone();
        changed.insert(key.clone(), new);

        prop_assert_eq!(
            message(&DeepEquals, map.into(), changed.into()),
            Some(format!("mismatch at [{key:?}]: unequal; obtained {old}; expected {new}"))
        );
    }
}
