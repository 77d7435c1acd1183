use checkers_core::{CheckResult, Failure, Value};

use super::Checker;

/// Passes when the obtained value is `true`.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsTrue;

/// Passes when the obtained value is `false`.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsFalse;

impl Checker for IsTrue {
    fn name(&self) -> &'static str {
        "IsTrue"
    }

    fn check(&self, obtained: &Value, _extras: &[Value]) -> CheckResult {
        check_polarity(self.name(), true, obtained)
    }
}

impl Checker for IsFalse {
    fn name(&self) -> &'static str {
        "IsFalse"
    }

    fn check(&self, obtained: &Value, _extras: &[Value]) -> CheckResult {
        check_polarity(self.name(), false, obtained)
    }
}

/// The failure states the value actually observed, not the one wanted.
fn check_polarity(name: &str, want: bool, obtained: &Value) -> CheckResult {
    let Some(got) = obtained.as_bool() else {
        return Err(Failure::msg(format!(
            "{name} checker expected bool, obtained was type {}",
            obtained.type_name()
        )));
    };
    if got == want {
        Ok(())
    } else {
        Err(Failure::msg(format!("obtained value is {got}")))
    }
}
