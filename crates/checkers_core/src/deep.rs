//! Deep structural equality.
//!
//! Recurses through sequences (by index), maps (by key), and structs (by field) and stops at the first
//! difference, reporting it as a [`Mismatch`] with the accessor path from the comparison root.

use crate::failure::{Failure, Mismatch, MismatchKind, Path, PathElem};
use crate::value::Value;

/// Compares two values structurally.
///
/// ## Returns
/// - `Ok(())` when the values are equal.
/// - `Err(Mismatch)` describing the first difference found.
///
/// ## Notes
/// - Types must match exactly (kind and rendered type name), so `Vec<i32>` never equals `[i32; 2]`.
/// - Callables are never equal, not even to themselves.
///
/// ## Examples
/// ```rust
/// use std::collections::HashMap;
/// use checkers_core::{deep_equal, Value};
///
/// let obtained: HashMap<&str, Value> = HashMap::from([("foo", 1234.into()), ("bar", "result".into())]);
/// let expected: HashMap<&str, Value> = HashMap::from([("foo", 1234.into()), ("bar", "something".into())]);
/// let err = deep_equal(&obtained.into(), &expected.into()).unwrap_err();
/// assert_eq!(err.to_string(), r#"mismatch at ["bar"]: unequal; obtained "result"; expected "something""#);
/// ```
pub fn deep_equal(obtained: &Value, expected: &Value) -> Result<(), Mismatch> {
    let mut path = Path::default();
    compare(&mut path, obtained, expected)
}

/// [`deep_equal`] in `(is_equal, failure)` form.
pub fn deep_equal_bool(obtained: &Value, expected: &Value) -> (bool, Option<Failure>) {
    match deep_equal(obtained, expected) {
        Ok(()) => (true, None),
        Err(mismatch) => (false, Some(mismatch.into())),
    }
}

fn mismatch(path: &Path, kind: MismatchKind, obtained: &Value, expected: &Value) -> Result<(), Mismatch> {
    Err(Mismatch {
        path: path.clone(),
        kind,
        obtained: obtained.repr(),
        expected: expected.repr(),
    })
}

fn compare(path: &mut Path, v1: &Value, v2: &Value) -> Result<(), Mismatch> {
    match (v1, v2) {
        (Value::Nil, Value::Nil) => return Ok(()),
        (Value::Nil, _) | (_, Value::Nil) => return mismatch(path, MismatchKind::Validity, v1, v2),
        _ => {}
    }

    let (t1, t2) = (v1.type_name(), v2.type_name());
    if v1.kind() != v2.kind() || t1 != t2 {
        let kind = MismatchKind::TypeMismatch {
            obtained: t1,
            expected: t2,
        };
        return mismatch(path, kind, v1, v2);
    }

    match (v1, v2) {
        (Value::Seq(a), Value::Seq(b)) | (Value::Array(a), Value::Array(b)) => {
            let (xs, ys) = (a.items(), b.items());
            if xs.len() != ys.len() {
                let kind = MismatchKind::LengthMismatch {
                    obtained: xs.len(),
                    expected: ys.len(),
                };
                return mismatch(path, kind, v1, v2);
            }
            for (i, (x, y)) in xs.iter().zip(ys).enumerate() {
                path.push(PathElem::Index(i));
                compare(path, x, y)?;
                path.pop();
            }
            Ok(())
        }
        (Value::Map(a), Value::Map(b)) => {
            if a.entries().len() != b.entries().len() {
                let kind = MismatchKind::LengthMismatch {
                    obtained: a.entries().len(),
                    expected: b.entries().len(),
                };
                return mismatch(path, kind, v1, v2);
            }
            for (key, x) in a.entries() {
                path.push(PathElem::Key(key.repr()));
                match b.get(key) {
                    Some(y) => compare(path, x, y)?,
                    None => return mismatch(path, MismatchKind::Validity, x, &Value::Nil),
                }
                path.pop();
            }
            Ok(())
        }
        (Value::Struct(a), Value::Struct(b)) => {
            for ((name, x), (_, y)) in a.fields().iter().zip(b.fields()) {
                path.push(PathElem::Field(name.clone()));
                compare(path, x, y)?;
                path.pop();
            }
            Ok(())
        }
        (Value::Func(_), Value::Func(_)) => mismatch(path, MismatchKind::Unequal, v1, v2),
        (Value::Chan(a), Value::Chan(b)) if a == b => Ok(()),
        (Value::Stringer(a), Value::Stringer(b)) if a.text() == b.text() => Ok(()),
        (Value::Error(a), Value::Error(b)) if a.message() == b.message() => Ok(()),
        _ => match v1.scalar_eq(v2) {
            Some(true) => Ok(()),
            _ => mismatch(path, MismatchKind::Unequal, v1, v2),
        },
    }
}
