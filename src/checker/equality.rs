use checkers_core::{CheckResult, Failure, Value, deep_equal};

use super::{Checker, expected_arg};

/// Passes when the obtained value is the canonical absence value (`()` or `None`).
#[derive(Debug, Clone, Copy, Default)]
pub struct IsNil;

impl Checker for IsNil {
    fn name(&self) -> &'static str {
        "IsNil"
    }

    fn check(&self, obtained: &Value, _extras: &[Value]) -> CheckResult {
        if obtained.is_nil() {
            Ok(())
        } else {
            Err(Failure::msg("obtained value is non-nil"))
        }
    }
}

/// Scalar equality between values of the same kind and width.
///
/// ## Notes
///
/// - `1i32` and `1i64` are different kinds: the check fails on the type before looking at the values.
/// - Aggregates and capability values are rejected; use [`DeepEquals`] for those.
#[derive(Debug, Clone, Copy, Default)]
pub struct Equals;

impl Checker for Equals {
    fn name(&self) -> &'static str {
        "Equals"
    }

    fn check(&self, obtained: &Value, extras: &[Value]) -> CheckResult {
        let expected = expected_arg(extras)?;
        if obtained.kind() != expected.kind() {
            return Err(Failure::msg(format!(
                "obtained type {} does not match expected type {}",
                obtained.type_name(),
                expected.type_name()
            )));
        }
        match obtained.scalar_eq(expected) {
            Some(true) => Ok(()),
            Some(false) => Err(Failure::msg(format!(
                "expected {} value {}, got {}",
                expected.type_name(),
                expected,
                obtained
            ))),
            None => Err(Failure::msg(format!(
                "Equals checker does not support type {}",
                obtained.type_name()
            ))),
        }
    }
}

/// Full structural comparison, reporting the first difference with its path.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeepEquals;

impl Checker for DeepEquals {
    fn name(&self) -> &'static str {
        "DeepEquals"
    }

    fn check(&self, obtained: &Value, extras: &[Value]) -> CheckResult {
        let expected = expected_arg(extras)?;
        deep_equal(obtained, expected).map_err(Failure::from)
    }
}
