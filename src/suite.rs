//! The suite engine: runs every `TestXxx` or `test_xxx` method of a suite struct as a subtest, with shared setup.
//!
//! ## Capabilities
//!
//! A suite describes itself through two traits, normally generated by macros:
//! - [`Inject`] (`#[derive(Inject)]`): where the test handle lives inside the struct
//! - [`Suite`] (`#[suite]` on the `impl` block): which methods exist, with their parameter and return counts
//!
//! ## Run
//!
//! 1. Inject the parent handle; a suite with no reachable [`Test`] slot fails the run.
//! 2. Locate `SetUpTest` (or `set_up_test`); a setup that takes arguments or returns values fails the run.
//! 3. Collect methods matching `Test<Name>` or `test_<name>`, sorted by method name.
//! 4. For each, open subtest `<name>`, inject its handle, run setup, then validate and call the method. A
//!    malformed test method fails only its own subtest.
//! 5. Re-inject the parent handle.

use std::fmt;

use checkers_core::type_name::short_type_name;
use miette::Diagnostic;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, trace};

use crate::host::{Handle, TestingT};
use crate::test::Test;

/// Method name of the optional per-test setup.
pub const SET_UP_TEST: &str = "SetUpTest";

/// Snake-case spelling of [`SET_UP_TEST`], accepted alongside it.
pub const SET_UP_TEST_SNAKE: &str = "set_up_test";

/// `TestFoo` runs as subtest `Foo`; `test_foo` runs as subtest `foo`.
static TEST_METHOD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:Test([A-Z]\w*)|test_([A-Za-z0-9]\w*))$").expect("INVARIANT: test method pattern is valid")
});

fn is_set_up(name: &str) -> bool {
    name == SET_UP_TEST || name == SET_UP_TEST_SNAKE
}

/// The subtest name for a test method, or `None` if `name` is not one.
fn subtest_name(name: &str) -> Option<&str> {
    let caps = TEST_METHOD.captures(name)?;
    caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str())
}

// ============================================================================
// Capabilities
// ============================================================================

/// Accepts the active test handle into the slot it holds, if any.
pub trait Inject {
    /// ## Returns
    ///
    /// - `true` once the handle was stored; `false` if there is nowhere to store it.
    fn inject(&mut self, handle: &Handle) -> bool;
}

impl Inject for Test {
    fn inject(&mut self, handle: &Handle) -> bool {
        self.set_handle(handle);
        true
    }
}

impl<I: Inject> Inject for Option<I> {
    /// `None` has nowhere to store the handle; that is "not found", never an error.
    fn inject(&mut self, handle: &Handle) -> bool {
        match self {
            Some(inner) => inner.inject(handle),
            None => {
                trace!(slot = %short_type_name::<Option<I>>(), "skipping empty slot");
                false
            }
        }
    }
}

impl<I: Inject + ?Sized> Inject for Box<I> {
    fn inject(&mut self, handle: &Handle) -> bool {
        (**self).inject(handle)
    }
}

/// A struct whose methods run as a suite.
pub trait Suite: Inject + Sized {
    /// Every method declared with a `self` receiver.
    fn methods() -> Vec<Method<Self>>;
}

/// One method of a suite, as declared.
pub struct Method<S> {
    name: &'static str,
    shape: Shape<S>,
}

enum Shape<S> {
    Callable(fn(&mut S)),
    Malformed { params: usize, returns: usize },
}

impl<S> Method<S> {
    /// A method taking no arguments and returning nothing.
    pub fn callable(name: &'static str, call: fn(&mut S)) -> Self {
        Self {
            name,
            shape: Shape::Callable(call),
        }
    }

    /// A method that cannot be called as a test or setup, with the counts that make it so.
    pub fn malformed(name: &'static str, params: usize, returns: usize) -> Self {
        debug_assert!(
            params > 0 || returns > 0,
            "a method with no parameters and no returns is callable"
        );
        Self {
            name,
            shape: Shape::Malformed { params, returns },
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Parameter count (receiver excluded) and return count.
    pub fn arity(&self) -> (usize, usize) {
        match self.shape {
            Shape::Callable(_) => (0, 0),
            Shape::Malformed { params, returns } => (params, returns),
        }
    }

    fn as_set_up(&self) -> Result<fn(&mut S), SuiteError> {
        match self.shape {
            Shape::Callable(call) => Ok(call),
            Shape::Malformed { params, .. } if params > 0 => Err(SuiteError::SetUpArguments {
                method: self.name.to_string(),
                params,
            }),
            Shape::Malformed { returns, .. } => Err(SuiteError::SetUpReturns {
                method: self.name.to_string(),
                returns,
            }),
        }
    }

    fn as_test(&self) -> Result<fn(&mut S), SuiteError> {
        match self.shape {
            Shape::Callable(call) => Ok(call),
            Shape::Malformed { params, .. } if params > 0 => Err(SuiteError::TestArguments {
                method: self.name.to_string(),
                params,
            }),
            Shape::Malformed { returns, .. } => Err(SuiteError::TestReturns {
                method: self.name.to_string(),
                returns,
            }),
        }
    }
}

impl<S> Clone for Method<S> {
    fn clone(&self) -> Self {
        let shape = match self.shape {
            Shape::Callable(call) => Shape::Callable(call),
            Shape::Malformed { params, returns } => Shape::Malformed { params, returns },
        };
        Self { name: self.name, shape }
    }
}

impl<S> fmt::Debug for Method<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (params, returns) = self.arity();
        f.debug_struct("Method")
            .field("name", &self.name)
            .field("params", &params)
            .field("returns", &returns)
            .finish()
    }
}

// ============================================================================
// Errors
// ============================================================================

/// A suite that is shaped wrong. These are programmer errors in the suite, not failures of the code under test.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum SuiteError {
    #[error("unable to initialize the suite handle: {suite} has no reachable `Test` field")]
    #[diagnostic(
        code(checkers::suite::missing_handle),
        help("add a `Test` field, or mark the field holding one with #[inject]; optional slots must be `Some`")
    )]
    MissingHandle { suite: String },

    #[error("{method} should take no arguments, it takes {params}")]
    #[diagnostic(code(checkers::suite::set_up_arguments))]
    SetUpArguments { method: String, params: usize },

    #[error("{method} should return nothing, it returns {returns} values")]
    #[diagnostic(code(checkers::suite::set_up_returns))]
    SetUpReturns { method: String, returns: usize },

    #[error("test method \"{method}\" takes {params} args, should take none")]
    #[diagnostic(code(checkers::suite::test_arguments))]
    TestArguments { method: String, params: usize },

    #[error("test method \"{method}\" returns {returns} values, should return none")]
    #[diagnostic(code(checkers::suite::test_returns))]
    TestReturns { method: String, returns: usize },
}

impl SuiteError {
    /// The message plus its help text, if any, as reported to the host.
    pub fn report(&self) -> String {
        match self.help() {
            Some(help) => format!("{self}\n  help: {help}"),
            None => self.to_string(),
        }
    }
}

// ============================================================================
// Discovery
// ============================================================================

/// The setup and the tests a suite run will execute.
pub struct Plan<S> {
    set_up: Option<fn(&mut S)>,
    tests: Vec<(String, Method<S>)>,
}

impl<S> Plan<S> {
    pub fn has_set_up(&self) -> bool {
        self.set_up.is_some()
    }

    /// Subtest names, in run order.
    pub fn test_names(&self) -> Vec<&str> {
        self.tests.iter().map(|(short, _)| short.as_str()).collect()
    }
}

/// Locate the setup and the test methods of `S`.
///
/// ## Errors
///
/// - [`SuiteError::SetUpArguments`] / [`SuiteError::SetUpReturns`] if the setup method is malformed.
pub fn discover<S: Suite>() -> Result<Plan<S>, SuiteError> {
    let methods = S::methods();
    debug!(suite = %short_type_name::<S>(), count = methods.len(), "scanning suite methods");

    let set_up = match methods.iter().find(|m| is_set_up(m.name)) {
        Some(method) => {
            debug!(method = method.name, "found setup");
            Some(method.as_set_up()?)
        }
        None => None,
    };

    let mut tests: Vec<(String, Method<S>)> = methods
        .into_iter()
        .filter_map(|method| {
            let short = subtest_name(method.name)?.to_string();
            debug!(method = method.name, subtest = %short, "matched test method");
            Some((short, method))
        })
        .collect();
    tests.sort_by_key(|(_, method)| method.name);

    Ok(Plan { set_up, tests })
}

// ============================================================================
// Execution
// ============================================================================

/// Run `suite` under `t`, reporting structural errors as a fatal failure of `t`.
pub fn run_suite<S: Suite>(t: &Handle, suite: &mut S) {
    if let Err(err) = try_run_suite(t, suite) {
        t.fatal(&err.report());
    }
}

/// Run `suite` under `t`, returning suite-level structural errors instead of reporting them.
///
/// Test-method errors are still reported to, and fatal for, their own subtest.
#[tracing::instrument(level = "debug", skip_all, fields(suite = %short_type_name::<S>(), test = %t.name()))]
pub fn try_run_suite<S: Suite>(t: &Handle, suite: &mut S) -> Result<(), SuiteError> {
    if !suite.inject(t) {
        return Err(SuiteError::MissingHandle {
            suite: short_type_name::<S>(),
        });
    }
    let plan = discover::<S>()?;

    for (short, method) in &plan.tests {
        t.run(short, &mut |sub: Handle| {
            trace!(test = %sub.name(), "injecting subtest handle");
            suite.inject(&sub);
            if let Some(set_up) = plan.set_up {
                set_up(suite);
            }
            match method.as_test() {
                Ok(call) => call(suite),
                Err(err) => sub.fatal(&err.report()),
            }
        });
    }

    suite.inject(t);
    Ok(())
}

/// Run `suite` as a root test named after its type, panicking with the failure listing if anything failed.
///
/// ## Examples
///
/// ```rust
/// use checkers::checker::Equals;
/// use checkers::{Inject, Test, check, suite};
///
/// #[derive(Default, Inject)]
/// struct Arithmetic {
///     t: Test,
///     base: i64,
/// }
///
/// #[suite]
/// impl Arithmetic {
///     fn set_up_test(&mut self) {
///         self.base = 40;
///     }
///
///     fn test_addition(&mut self) {
///         check!(self.t, self.base + 2, Equals, 42i64);
///     }
/// }
///
/// checkers::run(&mut Arithmetic::default());
/// ```
pub fn run<S: Suite>(suite: &mut S) {
    crate::host::run_test(&short_type_name::<S>(), |t| run_suite(&t, suite));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunConfig;
    use crate::host::Runner;
    use crate::report::CollectingReporter;

    #[derive(Default)]
    struct Manual {
        t: Test,
        calls: Vec<&'static str>,
    }

    impl Inject for Manual {
        fn inject(&mut self, handle: &Handle) -> bool {
            self.t.inject(handle)
        }
    }

    impl Manual {
        fn set_up_test(&mut self) {
            self.calls.push("set_up");
        }

        fn test_b(&mut self) {
            self.calls.push("b");
        }

        fn test_a(&mut self) {
            self.calls.push("a");
        }
    }

    impl Suite for Manual {
        fn methods() -> Vec<Method<Self>> {
            vec![
                Method::callable("test_b", Manual::test_b),
                Method::callable("helper", |_| {}),
                Method::callable("set_up_test", Manual::set_up_test),
                Method::callable("test_a", Manual::test_a),
                Method::callable("testNoUnderscore", |_| {}),
                Method::callable("test_", |_| {}),
                Method::malformed("test_args", 1, 0),
            ]
        }
    }

    #[test]
    fn discovery_sorts_and_strips_prefix() {
        let plan = discover::<Manual>().unwrap();
        assert!(plan.has_set_up());
        assert_eq!(plan.test_names(), vec!["a", "args", "b"]);
    }

    #[test]
    fn hand_written_suite_runs_setup_before_each_test() {
        let collector = CollectingReporter::new();
        let mut suite = Manual::default();
        let summary = Runner::new(RunConfig::default(), collector.clone()).run("Manual", |t| run_suite(&t, &mut suite));
        assert_eq!(suite.calls, vec!["set_up", "a", "set_up", "set_up", "b"]);
        assert_eq!((summary.passed, summary.failed), (2, 1));
        assert_eq!(
            collector.failures("Manual/args"),
            vec![r#"test method "test_args" takes 1 args, should take none"#]
        );
    }

    #[test]
    fn parent_handle_is_restored() {
        let mut suite = Manual::default();
        let collector = CollectingReporter::new();
        Runner::new(RunConfig::default(), collector).run("Manual", |t| {
            run_suite(&t, &mut suite);
            assert!(suite.t.handle().same_test(&t));
        });
    }

    #[test]
    fn empty_option_is_not_found() {
        let mut slot: Option<Test> = None;
        let collector = CollectingReporter::new();
        Runner::new(RunConfig::default(), collector).run("Root", |t| {
            assert!(!slot.inject(&t));
            let mut boxed: Box<Option<Test>> = Box::new(Some(Test::default()));
            assert!(boxed.inject(&t));
        });
    }

    #[test]
    fn malformed_set_up_is_reported() {
        let err = Method::<Manual>::malformed(SET_UP_TEST, 2, 0).as_set_up().unwrap_err();
        assert_eq!(err.to_string(), "SetUpTest should take no arguments, it takes 2");
        let err = Method::<Manual>::malformed(SET_UP_TEST_SNAKE, 0, 1).as_set_up().unwrap_err();
        assert_eq!(err.to_string(), "set_up_test should return nothing, it returns 1 values");
    }

    #[test]
    fn both_naming_forms_are_test_methods() {
        assert_eq!(subtest_name("TestFoo"), Some("Foo"));
        assert_eq!(subtest_name("TestA1_b"), Some("A1_b"));
        assert_eq!(subtest_name("test_foo"), Some("foo"));
        assert_eq!(subtest_name("test_9lives"), Some("9lives"));
        for name in ["Test", "Testfoo", "test_", "testFoo", "Test_Foo", "MyTestFoo", "TestFoo-bar"] {
            assert_eq!(subtest_name(name), None, "{name}");
        }
        assert!(is_set_up("SetUpTest"));
        assert!(is_set_up("set_up_test"));
        assert!(!is_set_up("SetupTest"));
    }

    #[derive(Default)]
    struct Camel {
        t: Test,
        calls: Vec<&'static str>,
    }

    impl Inject for Camel {
        fn inject(&mut self, handle: &Handle) -> bool {
            self.t.inject(handle)
        }
    }

    impl Suite for Camel {
        fn methods() -> Vec<Method<Self>> {
            vec![
                Method::callable("TestFoo", |s: &mut Camel| s.calls.push("foo")),
                Method::callable("SetUpTest", |s: &mut Camel| s.calls.push("set_up")),
                Method::callable("Testlower", |s: &mut Camel| s.calls.push("never")),
            ]
        }
    }

    #[test]
    fn camel_case_suite_runs_with_its_setup() {
        let collector = CollectingReporter::new();
        let mut suite = Camel::default();
        let summary = Runner::new(RunConfig::default(), collector.clone()).run("Camel", |t| run_suite(&t, &mut suite));
        assert_eq!(suite.calls, vec!["set_up", "foo"]);
        assert_eq!((summary.total, summary.passed), (1, 1));
        assert_eq!(collector.completed(), vec!["Camel/Foo", "Camel"]);
    }
}
