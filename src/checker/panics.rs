use std::any::Any;
use std::error::Error;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use checkers_core::{CheckResult, Failure, Value};

use super::pattern::match_anchored;
use super::{Checker, expected_arg, pattern_arg};
use crate::host::FailNow;

/// Passes when calling the obtained zero-argument callable panics with a string or error matching the expected
/// pattern.
///
/// A test abort raised inside the callable, such as a failing `Test::assert`, is not a panic of the callable. It
/// passes through and still ends the enclosing test.
///
/// ## Examples
///
/// ```rust
/// use checkers::Value;
/// use checkers::checker::{Checker, PanicMatches};
///
/// let boom = Value::func(|| panic!("oopsy"));
/// assert!(PanicMatches.check(&boom, &[Value::from("oops.*")]).is_ok());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PanicMatches;

impl Checker for PanicMatches {
    fn name(&self) -> &'static str {
        "PanicMatches"
    }

    fn check(&self, obtained: &Value, extras: &[Value]) -> CheckResult {
        let pattern = pattern_arg(expected_arg(extras)?)?;
        let call = match obtained {
            Value::Func(func) => func.callable(),
            _ => None,
        };
        let Some(call) = call else {
            return Err(Failure::msg("first arg must be a function that takes no args"));
        };

        let payload = match panic::catch_unwind(AssertUnwindSafe(|| call())) {
            Ok(()) => return Err(Failure::msg("no panic")),
            Err(payload) => payload,
        };
        // A host abort belongs to the enclosing test, not to the callable under check.
        if payload.is::<FailNow>() {
            panic::resume_unwind(payload);
        }
        match describe_panic(payload.as_ref()) {
            PanicPayload::Text(text) => match_anchored(&text, pattern),
            opaque @ PanicPayload::Opaque { .. } => Err(Failure::msg(format!(
                "recovered panic value {opaque} is not a string nor an error"
            ))),
        }
    }
}

/// What a caught panic carried, as far as it can be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanicPayload {
    /// A string message or the text of an error.
    Text(String),
    /// Any other payload, rendered `{ty}({repr})`.
    Opaque { ty: String, repr: String },
}

impl fmt::Display for PanicPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PanicPayload::Text(text) => f.write_str(text),
            PanicPayload::Opaque { ty, repr } => write!(f, "{ty}({repr})"),
        }
    }
}

macro_rules! scalar_payloads {
    ($payload:expr; $($ty:ty),* $(,)?) => {
        $(
            if let Some(v) = $payload.downcast_ref::<$ty>() {
                let value = Value::from(*v);
                return PanicPayload::Opaque { ty: value.type_name(), repr: value.repr() };
            }
        )*
    };
}

/// Classify a panic payload caught by `catch_unwind`.
///
/// ## Notes
///
/// - `panic!("literal")` carries a `&'static str`, `panic!("{x}")` a `String`; both are text.
/// - Boxed errors, `std::io::Error` and [`Failure`] are text via their `Display`.
/// - Primitive scalars keep their type and value; anything else is opaque.
pub fn describe_panic(payload: &(dyn Any + Send)) -> PanicPayload {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        return PanicPayload::Text((*s).to_string());
    }
    if let Some(s) = payload.downcast_ref::<String>() {
        return PanicPayload::Text(s.clone());
    }
    if let Some(err) = payload.downcast_ref::<Box<dyn Error + Send + Sync>>() {
        return PanicPayload::Text(err.to_string());
    }
    if let Some(err) = payload.downcast_ref::<Box<dyn Error + Send>>() {
        return PanicPayload::Text(err.to_string());
    }
    if let Some(err) = payload.downcast_ref::<std::io::Error>() {
        return PanicPayload::Text(err.to_string());
    }
    if let Some(failure) = payload.downcast_ref::<Failure>() {
        return PanicPayload::Text(failure.to_string());
    }
    scalar_payloads!(payload; bool, char, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);
    PanicPayload::Opaque {
        ty: "Box<dyn Any + Send>".to_string(),
        repr: "..".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    fn check(f: Value, pattern: &str) -> CheckResult {
        PanicMatches.check(&f, &[Value::from(pattern)])
    }

    #[test]
    fn argument_checks_come_first() {
        let err = PanicMatches.check(&Value::func(|| {}), &[]).unwrap_err();
        assert_eq!(err.to_string(), "missing 'expected' value");
        let err = PanicMatches.check(&Value::func(|| {}), &[Value::from(42)]).unwrap_err();
        assert_eq!(err.to_string(), "expected value must be a string containing a regexp pattern");
        let err = check(Value::from(42), "something").unwrap_err();
        assert_eq!(err.to_string(), "first arg must be a function that takes no args");
        let err = check(Value::func(|_: i32| {}), "something").unwrap_err();
        assert_eq!(err.to_string(), "first arg must be a function that takes no args");
    }

    #[test]
    fn completing_normally_is_a_failure() {
        let err = check(Value::func(|| {}), "oops").unwrap_err();
        assert_eq!(err.to_string(), "no panic");
    }

    #[test]
    fn string_and_error_payloads_are_matched() {
        assert!(check(Value::func(|| panic!("oopsy")), "oops.*").is_ok());
        assert!(check(Value::func(|| panic!("{}", String::from("oopsy"))), "oops.*").is_ok());
        assert!(
            check(
                Value::func(|| panic::panic_any(io::Error::other("oopsy"))),
                "oops.*"
            )
            .is_ok()
        );
        let boxed = || panic::panic_any(Box::<dyn Error + Send + Sync>::from("oopsy"));
        assert!(check(Value::func(boxed), "oops.*").is_ok());
    }

    #[test]
    fn scalar_payload_is_described() {
        let err = check(Value::func(|| panic::panic_any(42)), "oops").unwrap_err();
        assert_eq!(err.to_string(), "recovered panic value i32(42) is not a string nor an error");
    }

    #[test]
    fn unknown_payload_is_opaque() {
        struct Secret;
        let err = check(Value::func(|| panic::panic_any(Secret)), "oops").unwrap_err();
        assert_eq!(
            err.to_string(),
            "recovered panic value Box<dyn Any + Send>(..) is not a string nor an error"
        );
    }
}
