//! Reporting of test runs.
//!
//! ## Reporter Trait
//!
//! The host handle drives a [`Reporter`] with one event per test boundary, logged line and failure. Reporting
//! is kept apart from execution so output formats can be swapped without touching the run itself:
//! - [`ConsoleReporter`]: pytest-style progress on stderr
//! - [`JsonReporter`]: one JSON object per event line
//! - [`CollectingReporter`]: events kept in memory for assertions in tests

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;
use std::time::Duration;

use serde::Serialize;

// ============================================================================
// Outcomes and summaries
// ============================================================================

/// How a single test (root or subtest) ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Passed(Duration),
    /// Elapsed time and every failure message recorded against the test.
    Failed(Duration, Vec<String>),
    /// The reason the test never ran.
    Skipped(String),
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed(..))
    }
}

/// The messages recorded against one failed test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureRecord {
    pub test: String,
    pub messages: Vec<String>,
}

/// Totals for a whole run. Counts cover subtests; the root test only contributes to `failures`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub name: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration: Duration,
    pub failures: Vec<FailureRecord>,
}

impl Summary {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Human-readable listing of every failure, one block per test.
    pub fn render_failures(&self) -> String {
        let mut out = format!("{}: {} of {} subtests failed", self.name, self.failed, self.total);
        for record in &self.failures {
            out.push_str("\n--- FAIL: ");
            out.push_str(&record.test);
            for message in &record.messages {
                out.push_str("\n    ");
                out.push_str(message);
            }
        }
        out
    }
}

// ============================================================================
// Reporter Trait
// ============================================================================

/// Receives the events of a run.
///
/// Implement this trait to customize output format. Only failures and completions are mandatory.
pub trait Reporter {
    /// Called before a test body runs
    fn on_test_start(&mut self, _name: &str) {}

    /// Called for every line logged through the handle
    fn on_log(&mut self, _name: &str, _message: &str) {}

    /// Called each time a failure is recorded
    fn on_failure(&mut self, name: &str, message: &str);

    /// Called when a test completes
    fn on_test_complete(&mut self, name: &str, outcome: &Outcome);

    /// Called once, after the root test completes
    fn on_run_complete(&mut self, summary: &Summary);
}

// ============================================================================
// Console
// ============================================================================

/// Default console reporter (pytest-style)
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    pub verbose: bool,
}

impl ConsoleReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Reporter for ConsoleReporter {
    fn on_test_start(&mut self, name: &str) {
        if self.verbose {
            eprint!("{name} ... ");
        }
    }

    fn on_log(&mut self, name: &str, message: &str) {
        if self.verbose {
            eprintln!("\n    {name}: {message}");
        }
    }

    fn on_failure(&mut self, _name: &str, _message: &str) {}

    fn on_test_complete(&mut self, name: &str, outcome: &Outcome) {
        let status = match outcome {
            Outcome::Passed(d) => {
                if self.verbose {
                    format!("\x1b[32mPASSED\x1b[0m ({:.0}ms)", d.as_millis())
                } else {
                    "\x1b[32m.\x1b[0m".to_string()
                }
            }
            Outcome::Failed(d, _) => {
                if self.verbose {
                    format!("\x1b[31mFAILED\x1b[0m ({:.0}ms)", d.as_millis())
                } else {
                    "\x1b[31mF\x1b[0m".to_string()
                }
            }
            Outcome::Skipped(reason) => {
                if reason.is_empty() {
                    "\x1b[33mSKIPPED\x1b[0m".to_string()
                } else {
                    format!("\x1b[33mSKIPPED\x1b[0m ({reason})")
                }
            }
        };

        if self.verbose {
            eprintln!("{status}");
        } else {
            eprint!("{status}");
        }

        if let Outcome::Failed(_, messages) = outcome {
            eprintln!("\n\x1b[31m{name}\x1b[0m");
            for message in messages {
                eprintln!("    {message}");
            }
        }
    }

    fn on_run_complete(&mut self, summary: &Summary) {
        if !self.verbose {
            eprintln!();
        }

        let mut parts = Vec::new();
        if summary.passed > 0 {
            parts.push(format!("\x1b[32m{} passed\x1b[0m", summary.passed));
        }
        if summary.failed > 0 {
            parts.push(format!("\x1b[31m{} failed\x1b[0m", summary.failed));
        }
        if summary.skipped > 0 {
            parts.push(format!("\x1b[33m{} skipped\x1b[0m", summary.skipped));
        }
        if parts.is_empty() {
            parts.push("no subtests".to_string());
        }

        eprintln!(
            "====== {}: {} in {:.2}s ======",
            summary.name,
            parts.join(", "),
            summary.duration.as_secs_f64()
        );
    }
}

// ============================================================================
// Structured events
// ============================================================================

/// One reporter event in owned form, as serialized by [`JsonReporter`] and stored by [`CollectingReporter`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ReportEvent {
    Start { test: String },
    Log { test: String, message: String },
    Failure { test: String, message: String },
    Complete { test: String, outcome: Outcome },
    Summary { summary: Summary },
}

/// Writes every event as a single JSON line.
#[derive(Debug)]
pub struct JsonReporter<W: Write> {
    out: W,
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, event: &ReportEvent) {
        let written = serde_json::to_writer(&mut self.out, event)
            .map_err(std::io::Error::from)
            .and_then(|()| writeln!(self.out));
        if let Err(err) = written {
            tracing::warn!(error = %err, "failed to write report event");
        }
    }
}

impl<W: Write> Reporter for JsonReporter<W> {
    fn on_test_start(&mut self, name: &str) {
        self.emit(&ReportEvent::Start { test: name.to_string() });
    }

    fn on_log(&mut self, name: &str, message: &str) {
        self.emit(&ReportEvent::Log {
            test: name.to_string(),
            message: message.to_string(),
        });
    }

    fn on_failure(&mut self, name: &str, message: &str) {
        self.emit(&ReportEvent::Failure {
            test: name.to_string(),
            message: message.to_string(),
        });
    }

    fn on_test_complete(&mut self, name: &str, outcome: &Outcome) {
        self.emit(&ReportEvent::Complete {
            test: name.to_string(),
            outcome: outcome.clone(),
        });
    }

    fn on_run_complete(&mut self, summary: &Summary) {
        self.emit(&ReportEvent::Summary {
            summary: summary.clone(),
        });
        if let Err(err) = self.out.flush() {
            tracing::warn!(error = %err, "failed to flush report output");
        }
    }
}

// ============================================================================
// In-memory collection
// ============================================================================

/// Keeps every event in memory. Clones share the same event list, so a test can hand one clone to a runner
/// and inspect another afterwards.
#[derive(Debug, Clone, Default)]
pub struct CollectingReporter {
    events: Rc<RefCell<Vec<ReportEvent>>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ReportEvent> {
        self.events.borrow().clone()
    }

    /// Names of completed tests, in completion order.
    pub fn completed(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                ReportEvent::Complete { test, .. } => Some(test.clone()),
                _ => None,
            })
            .collect()
    }

    /// Outcome of the named test, if it completed.
    pub fn outcome(&self, test: &str) -> Option<Outcome> {
        self.events.borrow().iter().find_map(|event| match event {
            ReportEvent::Complete { test: name, outcome } if name == test => Some(outcome.clone()),
            _ => None,
        })
    }

    /// Failure messages recorded against the named test, in order.
    pub fn failures(&self, test: &str) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                ReportEvent::Failure { test: name, message } if name == test => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    /// Lines logged against the named test, in order.
    pub fn logs(&self, test: &str) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                ReportEvent::Log { test: name, message } if name == test => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: ReportEvent) {
        self.events.borrow_mut().push(event);
    }
}

impl Reporter for CollectingReporter {
    fn on_test_start(&mut self, name: &str) {
        self.push(ReportEvent::Start { test: name.to_string() });
    }

    fn on_log(&mut self, name: &str, message: &str) {
        self.push(ReportEvent::Log {
            test: name.to_string(),
            message: message.to_string(),
        });
    }

    fn on_failure(&mut self, name: &str, message: &str) {
        self.push(ReportEvent::Failure {
            test: name.to_string(),
            message: message.to_string(),
        });
    }

    fn on_test_complete(&mut self, name: &str, outcome: &Outcome) {
        self.push(ReportEvent::Complete {
            test: name.to_string(),
            outcome: outcome.clone(),
        });
    }

    fn on_run_complete(&mut self, summary: &Summary) {
        self.push(ReportEvent::Summary {
            summary: summary.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_reporter_writes_one_line_per_event() {
        let mut reporter = JsonReporter::new(Vec::new());
        reporter.on_test_start("Root/one");
        reporter.on_failure("Root/one", "obtained value is false");
        reporter.on_test_complete("Root/one", &Outcome::Skipped("filtered out".into()));
        let out = String::from_utf8(reporter.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        insta::assert_snapshot!(lines.join("\n"), @r#"
        {"event":"start","test":"Root/one"}
        {"event":"failure","test":"Root/one","message":"obtained value is false"}
        {"event":"complete","test":"Root/one","outcome":{"skipped":"filtered out"}}
        "#);
    }

    #[test]
    fn collecting_reporter_clones_share_events() {
        let collector = CollectingReporter::new();
        let mut handle: Box<dyn Reporter> = Box::new(collector.clone());
        handle.on_log("Root", "hello");
        handle.on_failure("Root", "boom");
        handle.on_test_complete("Root", &Outcome::Failed(Duration::ZERO, vec!["boom".into()]));
        assert_eq!(collector.logs("Root"), vec!["hello"]);
        assert_eq!(collector.failures("Root"), vec!["boom"]);
        assert!(collector.outcome("Root").is_some_and(|o| o.is_failure()));
        assert_eq!(collector.completed(), vec!["Root"]);
    }

    #[test]
    fn summary_lists_failures() {
        let summary = Summary {
            name: "Suite".into(),
            total: 2,
            passed: 1,
            failed: 1,
            failures: vec![FailureRecord {
                test: "Suite/broken".into(),
                messages: vec!["a.rs:3: no panic".into()],
            }],
            ..Summary::default()
        };
        assert!(!summary.is_success());
        insta::assert_snapshot!(summary.render_failures(), @r"
        Suite: 1 of 2 subtests failed
        --- FAIL: Suite/broken
            a.rs:3: no panic
        ");
    }
}
