//! Provide the host-independent value model behind the `checkers` assertion library.
//!
//! This crate is intentionally small and dependency-light. It contains:
//! - [`Value`], the dynamically-typed currency every checker accepts,
//! - [`Failure`], the data form of a failed check,
//! - [`deep_equal`], the structural equality collaborator used by the `DeepEquals` checker.
//!
//! ## Notes
//!
//! - No IO, no global state, and no knowledge of any test host.
//! - Enable the `tokio` feature to lower `tokio::sync::mpsc::Sender` into a channel value.

pub mod deep;
pub mod failure;
pub mod type_name;
pub mod value;

pub use deep::{deep_equal, deep_equal_bool};
pub use failure::{Failure, Mismatch, MismatchKind, Path, PathElem};
pub use value::{
    ChanValue, ErrorValue, FuncValue, IntoFunc, Kind, MapValue, SeqValue, StringerValue, StructValue, Value,
};

/// Result of a single check: success, or a description of why it failed.
pub type CheckResult = Result<(), Failure>;
