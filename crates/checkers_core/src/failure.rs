//! Failure descriptions returned by checkers.
//!
//! A failing check is a normal outcome, so it travels as data: either a plain message or a structured
//! [`Mismatch`] carrying the accessor path at which two values first differ.

use std::fmt;

use thiserror::Error;

/// Why a check failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Failure {
    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Mismatch(#[from] Mismatch),
}

impl Failure {
    /// Creates a plain message failure.
    pub fn msg(message: impl Into<String>) -> Self {
        Failure::Message(message.into())
    }

    /// The accessor path of a structural mismatch, if this failure has one.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Failure::Message(_) => None,
            Failure::Mismatch(m) => Some(&m.path),
        }
    }
}

/// A structural difference found by deep equality.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("mismatch at {path}: {kind}; obtained {obtained}; expected {expected}")]
pub struct Mismatch {
    pub path: Path,
    pub kind: MismatchKind,
    /// Diagnostic rendering of the obtained value at `path`.
    pub obtained: String,
    /// Diagnostic rendering of the expected value at `path`.
    pub expected: String,
}

/// What differed at a mismatch path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MismatchKind {
    /// Same type, different scalar contents.
    Unequal,
    TypeMismatch { obtained: String, expected: String },
    LengthMismatch { obtained: usize, expected: usize },
    /// One side is nil, or a map key is present on one side only.
    Validity,
}

impl fmt::Display for MismatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MismatchKind::Unequal => f.write_str("unequal"),
            MismatchKind::TypeMismatch { obtained, expected } => write!(f, "type mismatch {obtained} vs {expected}"),
            MismatchKind::LengthMismatch { obtained, expected } => {
                write!(f, "length mismatch, {obtained} vs {expected}")
            }
            MismatchKind::Validity => f.write_str("validity mismatch"),
        }
    }
}

/// One step of an accessor chain from the comparison root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathElem {
    /// Sequence or array index, rendered `[i]`.
    Index(usize),
    /// Map key (already rendered with `Value::repr`), rendered `[key]`.
    Key(String),
    /// Struct field, rendered `.name`.
    Field(String),
}

/// An accessor chain such as `.items[2]["bar"]`. The empty path renders as `top level`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Path(Vec<PathElem>);

impl Path {
    pub fn push(&mut self, elem: PathElem) {
        self.0.push(elem);
    }

    pub fn pop(&mut self) {
        self.0.pop();
    }

    pub fn elems(&self) -> &[PathElem] {
        &self.0
    }

    pub fn is_top_level(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("top level");
        }
        for elem in &self.0 {
            match elem {
                PathElem::Index(i) => write!(f, "[{i}]")?,
                PathElem::Key(k) => write!(f, "[{k}]")?,
                PathElem::Field(name) => write!(f, ".{name}")?,
            }
        }
        Ok(())
    }
}
