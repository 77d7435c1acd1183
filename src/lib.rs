#![forbid(unsafe_code)]
//! Checkers: value checkers, an assertion facade and method-discovering test suites on top of `cargo test`.
//!
//! - [`checker`]: the [`Checker`] protocol and the shipped checkers (`Equals`, `DeepEquals`, `Matches`, ...)
//! - [`Test`]: `check` (fail and continue) and `assert` (fail and abort) over the active test handle
//! - [`suite`]: runs every `Test*`/`test_*` method of a struct as a subtest, with optional `SetUpTest`
//! - [`host`]: the handle contract ([`TestingT`]) and a default host with subtests and reporting
//!
//! ## Panic Policy
//!
//! - **Checkers**: outcomes are data (`Result<(), Failure>`), never panics.
//! - **Host**: aborting a test unwinds with a private marker that the enclosing subtest catches. `run_test` and
//!   `run` panic to tell the Rust test harness a test failed.
//! - **True invariants**: `.expect("INVARIANT: reason")`.
//!
//! ## Examples
//!
//! ```rust
//! use checkers::checker::{DeepEquals, HasLen, Matches};
//! use checkers::{Inject, Test, assert_that, check, suite};
//!
//! #[derive(Default, Inject)]
//! struct Inventory {
//!     t: Test,
//!     items: Vec<String>,
//! }
//!
//! #[suite]
//! impl Inventory {
//!     fn set_up_test(&mut self) {
//!         self.items = vec!["apple".into(), "pear".into()];
//!     }
//!
//!     fn test_contents(&mut self) {
//!         assert_that!(self.t, self.items.clone(), HasLen, 2);
//!         check!(self.t, self.items[0].as_str(), Matches, "ap+le");
//!         check!(self.t, self.items.clone(), DeepEquals, vec!["apple".to_string(), "pear".to_string()]);
//!     }
//! }
//!
//! checkers::run(&mut Inventory::default());
//! ```

extern crate self as checkers;

pub mod checker;
pub mod config;
pub mod host;
pub mod logging;
mod macros;
pub mod report;
pub mod suite;

pub use checkers_core::{
    CheckResult, ChanValue, ErrorValue, Failure, FuncValue, IntoFunc, Kind, MapValue, Mismatch, MismatchKind, Path,
    PathElem, SeqValue, StringerValue, StructValue, Value, deep_equal, deep_equal_bool,
};
pub use checkers_derive::{Inject, IntoValue, suite};

pub use checker::Checker;
pub use config::{ReportFormat, RunConfig};
pub use host::{Handle, Runner, TestingT, run_test};
pub use report::{CollectingReporter, ConsoleReporter, JsonReporter, Outcome, Reporter, Summary};
pub use suite::{Inject, Method, Suite, SuiteError, run, run_suite};
pub use test::Test;
