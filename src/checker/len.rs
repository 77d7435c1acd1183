use checkers_core::{CheckResult, Failure, Value};

use super::{Checker, expected_arg};

/// Passes when the obtained value's length equals the expected integer.
///
/// Sequences, arrays and maps report their element count, strings their byte length, and channels the number
/// of buffered messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct HasLen;

impl Checker for HasLen {
    fn name(&self) -> &'static str {
        "HasLen"
    }

    fn check(&self, obtained: &Value, extras: &[Value]) -> CheckResult {
        let expected = expected_arg(extras)?;
        let Some(size) = expected.as_integer() else {
            return Err(Failure::msg("expected value must be an integer length"));
        };
        let Some(length) = obtained.len() else {
            return Err(Failure::msg(format!(
                "HasLen checker expected array, channel, map, slice or string, obtained was type {}",
                obtained.type_name()
            )));
        };
        if i128::try_from(length).is_ok_and(|length| length == size) {
            Ok(())
        } else {
            Err(Failure::msg(format!("expected length {size}, obtained {length}")))
        }
    }
}
