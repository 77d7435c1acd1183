//! The test-run handle: the narrow host contract checkers report through, and a default host for `cargo test`.
//!
//! ## Notes
//!
//! - Aborting a test unwinds with a private [`FailNow`] marker. [`TestingT::run`] catches it at the subtest
//!   boundary, so an abort never reaches siblings or the parent.
//! - A genuine panic inside a subtest becomes a `panic: {message}` failure of that subtest.
//! - A failed subtest marks its parent failed.

use std::cell::RefCell;
use std::fmt;
use std::ops::Deref;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::checker::describe_panic;
use crate::config::{ReportFormat, RunConfig};
use crate::report::{ConsoleReporter, FailureRecord, JsonReporter, Outcome, Reporter, Summary};

// ============================================================================
// Host contract
// ============================================================================

/// What the facade and the suite engine need from a test host.
pub trait TestingT {
    /// Full name of the test, with subtest names joined by `/`.
    fn name(&self) -> &str;

    /// Record a line of output against the test.
    fn log(&self, message: &str);

    /// Mark the test failed and keep running.
    fn error(&self, message: &str);

    /// Stop the current test immediately. It must already be, or now be, marked failed.
    fn fail_now(&self) -> !;

    /// [`error`](TestingT::error) followed by [`fail_now`](TestingT::fail_now).
    fn fatal(&self, message: &str) -> ! {
        self.error(message);
        self.fail_now()
    }

    fn failed(&self) -> bool;

    /// Run `f` as a named subtest with its own handle, returning whether it passed.
    fn run(&self, name: &str, f: &mut dyn FnMut(Handle)) -> bool;
}

/// Shared pointer to the active host test.
#[derive(Clone)]
pub struct Handle(Rc<dyn TestingT>);

impl Handle {
    pub fn new(t: impl TestingT + 'static) -> Self {
        Self(Rc::new(t))
    }

    pub fn from_rc(t: Rc<dyn TestingT>) -> Self {
        Self(t)
    }

    /// Whether both handles point at the same test.
    pub fn same_test(&self, other: &Handle) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Deref for Handle {
    type Target = dyn TestingT;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handle").field(&self.0.name()).finish()
    }
}

/// Unwind payload used by [`T::fail_now`].
#[derive(Debug, Clone, Copy)]
pub struct FailNow;

// ============================================================================
// Default host
// ============================================================================

/// State shared by every test of one run.
struct Session {
    config: RunConfig,
    reporter: RefCell<Box<dyn Reporter>>,
    summary: RefCell<Summary>,
}

#[derive(Default)]
struct TestState {
    failed: bool,
    messages: Vec<String>,
}

/// The default host test: a root test created by [`Runner`] or a subtest created by [`TestingT::run`].
pub struct T {
    name: String,
    state: RefCell<TestState>,
    session: Rc<Session>,
}

impl T {
    fn new(name: String, session: Rc<Session>) -> Self {
        Self {
            name,
            state: RefCell::new(TestState::default()),
            session,
        }
    }

    fn outcome(&self, elapsed: Duration) -> Outcome {
        let state = self.state.borrow();
        if state.failed {
            Outcome::Failed(elapsed, state.messages.clone())
        } else {
            Outcome::Passed(elapsed)
        }
    }

    /// Run `body` under a guard, recording a genuine panic as a failure of this test.
    fn guard(&self, body: impl FnOnce()) -> Duration {
        let start = Instant::now();
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(body)) {
            if !payload.is::<FailNow>() {
                self.error(&format!("panic: {}", describe_panic(payload.as_ref())));
            }
        }
        start.elapsed()
    }
}

impl TestingT for T {
    fn name(&self) -> &str {
        &self.name
    }

    fn log(&self, message: &str) {
        self.session.reporter.borrow_mut().on_log(&self.name, message);
    }

    fn error(&self, message: &str) {
        {
            let mut state = self.state.borrow_mut();
            state.failed = true;
            state.messages.push(message.to_string());
        }
        self.session.reporter.borrow_mut().on_failure(&self.name, message);
    }

    fn fail_now(&self) -> ! {
        self.state.borrow_mut().failed = true;
        panic::resume_unwind(Box::new(FailNow))
    }

    fn failed(&self) -> bool {
        self.state.borrow().failed
    }

    fn run(&self, name: &str, f: &mut dyn FnMut(Handle)) -> bool {
        let full = format!("{}/{}", self.name, name.replace(' ', "_"));
        let session = &self.session;

        if !session.config.selects(&full) {
            tracing::debug!(test = %full, "filtered out");
            session.summary.borrow_mut().skipped += 1;
            session
                .reporter
                .borrow_mut()
                .on_test_complete(&full, &Outcome::Skipped("filtered out".to_string()));
            return true;
        }

        session.reporter.borrow_mut().on_test_start(&full);
        let child = Rc::new(T::new(full, Rc::clone(session)));
        let handle = Handle(child.clone());
        let elapsed = child.guard(|| f(handle));
        let outcome = child.outcome(elapsed);

        {
            let mut summary = session.summary.borrow_mut();
            summary.total += 1;
            match &outcome {
                Outcome::Failed(_, messages) => {
                    summary.failed += 1;
                    summary.failures.push(FailureRecord {
                        test: child.name.clone(),
                        messages: messages.clone(),
                    });
                }
                _ => summary.passed += 1,
            }
        }
        session.reporter.borrow_mut().on_test_complete(&child.name, &outcome);

        let passed = !outcome.is_failure();
        if !passed {
            self.state.borrow_mut().failed = true;
        }
        passed
    }
}

// ============================================================================
// Runner
// ============================================================================

/// Runs one root test under a configuration and a reporter.
///
/// ## Examples
///
/// ```rust
/// use checkers::host::{Runner, TestingT};
/// use checkers::report::CollectingReporter;
/// use checkers::config::RunConfig;
///
/// let collector = CollectingReporter::new();
/// let summary = Runner::new(RunConfig::default(), collector.clone()).run("Root", |t| {
///     t.run("ok", &mut |_| {});
///     t.run("broken", &mut |sub| sub.error("boom"));
/// });
/// assert_eq!((summary.passed, summary.failed), (1, 1));
/// assert_eq!(collector.failures("Root/broken"), vec!["boom"]);
/// ```
pub struct Runner {
    config: RunConfig,
    reporter: Box<dyn Reporter>,
}

impl Runner {
    pub fn new(config: RunConfig, reporter: impl Reporter + 'static) -> Self {
        Self {
            config,
            reporter: Box::new(reporter),
        }
    }

    /// A runner whose reporter follows `config.format`, writing to stderr.
    pub fn from_config(config: RunConfig) -> Self {
        let reporter: Box<dyn Reporter> = match config.format {
            ReportFormat::Console => Box::new(ConsoleReporter::new(config.verbose)),
            ReportFormat::Json => Box::new(JsonReporter::new(std::io::stderr())),
        };
        Self { config, reporter }
    }

    pub fn run(self, name: &str, f: impl FnOnce(Handle)) -> Summary {
        let session = Rc::new(Session {
            config: self.config,
            reporter: RefCell::new(self.reporter),
            summary: RefCell::new(Summary {
                name: name.to_string(),
                ..Summary::default()
            }),
        });

        session.reporter.borrow_mut().on_test_start(name);
        let root = Rc::new(T::new(name.to_string(), Rc::clone(&session)));
        let handle = Handle(root.clone());
        let elapsed = root.guard(|| f(handle));
        let outcome = root.outcome(elapsed);
        session.reporter.borrow_mut().on_test_complete(name, &outcome);

        let mut summary = session.summary.replace(Summary::default());
        summary.duration = elapsed;
        if let Outcome::Failed(_, messages) = outcome {
            // The root fails whenever a subtest does; only its own messages are new.
            if !messages.is_empty() {
                summary.failures.insert(
                    0,
                    FailureRecord {
                        test: name.to_string(),
                        messages,
                    },
                );
            } else if summary.failures.is_empty() {
                summary.failures.push(FailureRecord {
                    test: name.to_string(),
                    messages: vec!["test aborted".to_string()],
                });
            }
        }
        session.reporter.borrow_mut().on_run_complete(&summary);
        summary
    }
}

/// Run `f` as a root test configured from the environment, panicking with the failure listing if it failed.
///
/// Meant to be the whole body of a `#[test]` function.
pub fn run_test(name: &str, f: impl FnOnce(Handle)) {
    crate::logging::init();
    let config = match RunConfig::from_env() {
        Ok(config) => config,
        Err(err) => panic!("invalid test configuration: {err}"),
    };
    let summary = Runner::from_config(config).run(name, f);
    if !summary.is_success() {
        panic!("{}", summary.render_failures());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Test;
    use crate::Value;
    use crate::checker::{Equals, PanicMatches};
    use crate::report::CollectingReporter;

    fn runner(collector: &CollectingReporter) -> Runner {
        Runner::new(RunConfig::default(), collector.clone())
    }

    #[test]
    fn fail_now_stops_only_the_subtest() {
        let collector = CollectingReporter::new();
        let mut reached = Vec::new();
        let summary = runner(&collector).run("Root", |t| {
            t.run("first", &mut |sub| {
                sub.error("first failure");
                sub.fail_now();
            });
            reached.push("between");
            t.run("second", &mut |_| {});
            reached.push("after");
        });
        assert_eq!(reached, vec!["between", "after"]);
        assert_eq!((summary.total, summary.passed, summary.failed), (2, 1, 1));
        assert_eq!(collector.failures("Root/first"), vec!["first failure"]);
    }

    #[test]
    fn failed_child_marks_parent_failed() {
        let collector = CollectingReporter::new();
        let summary = runner(&collector).run("Root", |t| {
            let passed = t.run("child", &mut |sub| sub.error("nope"));
            assert!(!passed);
            assert!(t.failed());
        });
        assert!(!summary.is_success());
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].test, "Root/child");
    }

    #[test]
    fn genuine_panic_is_recorded() {
        let collector = CollectingReporter::new();
        runner(&collector).run("Root", |t| {
            t.run("explodes", &mut |_| panic!("kaboom"));
        });
        assert_eq!(collector.failures("Root/explodes"), vec!["panic: kaboom"]);
    }

    #[test]
    fn fatal_on_root_is_reported_as_root_failure() {
        let collector = CollectingReporter::new();
        let summary = runner(&collector).run("Root", |t| t.fatal("cannot start"));
        assert_eq!(summary.failures[0].test, "Root");
        assert_eq!(summary.failures[0].messages, vec!["cannot start"]);
    }

    #[test]
    fn subtest_names_replace_spaces() {
        let collector = CollectingReporter::new();
        runner(&collector).run("Root", |t| {
            t.run("has spaces", &mut |sub| assert_eq!(sub.name(), "Root/has_spaces"));
        });
        assert_eq!(collector.completed(), vec!["Root/has_spaces", "Root"]);
    }

    #[test]
    fn filter_skips_unselected_subtests() {
        let collector = CollectingReporter::new();
        let config = RunConfig::new().with_filter(regex::Regex::new("keep").unwrap());
        let summary = Runner::new(config, collector.clone()).run("Root", |t| {
            t.run("keep_me", &mut |_| {});
            t.run("drop_me", &mut |sub| sub.error("should not run"));
        });
        assert_eq!((summary.passed, summary.skipped, summary.failed), (1, 1, 0));
        assert_eq!(
            collector.outcome("Root/drop_me"),
            Some(Outcome::Skipped("filtered out".to_string()))
        );
    }

    #[test]
    fn assert_inside_panic_matches_still_aborts_the_test() {
        let collector = CollectingReporter::new();
        let mut reached = false;
        let summary = runner(&collector).run("Root", |t| {
            t.run("nested", &mut |sub| {
                let test = Test::new(sub);
                let inner = test.clone();
                let call = Value::func(move || inner.assert(1, &Equals, &[2.into()]));
                test.check(call, &PanicMatches, &[".*".into()]);
                reached = true;
            });
        });
        assert!(!reached);
        assert_eq!(summary.failed, 1);
        let messages = collector.failures("Root/nested");
        assert_eq!(messages.len(), 1, "{messages:?}");
        assert!(messages[0].ends_with(": expected i32 value 2, got 1"), "{}", messages[0]);
    }

    #[test]
    fn log_lines_reach_the_reporter() {
        let collector = CollectingReporter::new();
        runner(&collector).run("Root", |t| t.log("hello"));
        assert_eq!(collector.logs("Root"), vec!["hello"]);
    }
}
