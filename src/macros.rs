/// [`Test::check`](crate::Test::check) with the extra arguments converted into [`Value`](crate::Value)s.
///
/// ```rust
/// use checkers::checker::{DeepEquals, Matches};
/// use checkers::{Test, check, run_test};
///
/// run_test("Macros", |handle| {
///     let t = Test::new(handle);
///     assert!(check!(t, "testing", Matches, "test.*"));
///     assert!(check!(t, vec![1, 2], DeepEquals, vec![1, 2]));
/// });
/// ```
#[macro_export]
macro_rules! check {
    ($test:expr, $obtained:expr, $checker:expr $(, $extra:expr)* $(,)?) => {
        $test.check($obtained, &$checker, &[$($crate::Value::from($extra)),*])
    };
}

/// [`Test::assert`](crate::Test::assert) with the extra arguments converted into [`Value`](crate::Value)s.
#[macro_export]
macro_rules! assert_that {
    ($test:expr, $obtained:expr, $checker:expr $(, $extra:expr)* $(,)?) => {
        $test.assert($obtained, &$checker, &[$($crate::Value::from($extra)),*])
    };
}
