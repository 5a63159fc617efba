//! Structured diagnostics.
//!
//! Non-fatal anomalies are collected as typed records rather than printed at
//! the point of discovery, so callers (and tests) can assert on them. Each
//! record is mirrored to the `log` facade when pushed; the CLI renders the
//! collected set at the end of a run.

use std::fmt;

/// One non-fatal anomaly observed during extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A declared field type matched none of the known kinds (classified
    /// as OTHER).
    UnknownFieldType {
        type_name: String,
        field: String,
        declared: String,
    },
    /// A scanner pass matched a field key that is not in the reflective
    /// field set (renamed or mistyped in source).
    UnknownField { type_name: String, field: String },
    /// A symbolic name reference could not be resolved; the symbolic text
    /// was kept verbatim as the wire name.
    UnresolvedName { type_name: String, expr: String },
    /// One type's extraction failed entirely and the type was dropped.
    TypeFailed { type_name: String, reason: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnknownFieldType { type_name, field, declared } => {
                write!(f, "unknown field type: {field} {declared} on {type_name}")
            }
            Diagnostic::UnknownField { type_name, field } => {
                write!(f, "unknown field: {field} on {type_name}")
            }
            Diagnostic::UnresolvedName { type_name, expr } => {
                write!(f, "unresolved param name `{expr}` on {type_name} (kept verbatim)")
            }
            Diagnostic::TypeFailed { type_name, reason } => {
                write!(f, "dropped {type_name}: {reason}")
            }
        }
    }
}

/// Collects diagnostics for one extraction scope.
#[derive(Debug, Default)]
pub struct DiagSink {
    records: Vec<Diagnostic>,
}

impl DiagSink {
    pub fn push(&mut self, d: Diagnostic) {
        log::warn!("{d}");
        self.records.push(d);
    }

    pub fn records(&self) -> &[Diagnostic] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Merge another sink's records (used when per-type results are joined).
    pub fn extend(&mut self, other: DiagSink) {
        self.records.extend(other.records);
    }

    pub fn into_records(self) -> Vec<Diagnostic> {
        self.records
    }
}
