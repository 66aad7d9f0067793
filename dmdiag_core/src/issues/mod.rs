// src/issues/mod.rs
//! Collection issue ledger
//!
//! An append-only diagnostic ledger shared by every resolver in a run.
//! Issues are never used for control flow: a failure to resolve one fact
//! never aborts resolution of others. The ledger is an explicit context
//! object handed to each resolver rather than process-wide state, and it
//! is synchronized so a concurrent fan-out can append safely.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// Issue severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

/// One recorded diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionIssue {
    pub severity: Severity,
    /// Resolution phase that recorded the issue (see [`crate::api::phases`]).
    pub phase: String,
    pub message: String,
}

impl std::fmt::Display for CollectionIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}[{}]: {}",
            self.severity.as_str(),
            self.phase,
            self.message
        )
    }
}

/// Append-safe issue sink, cheap to clone and hand to resolvers.
#[derive(Debug, Clone, Default)]
pub struct IssueLedger {
    entries: Arc<Mutex<Vec<CollectionIssue>>>,
}

impl IssueLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an issue.
    pub fn record(&self, severity: Severity, phase: &str, message: impl Into<String>) {
        let issue = CollectionIssue {
            severity,
            phase: phase.to_string(),
            message: message.into(),
        };

        if let Ok(mut entries) = self.entries.lock() {
            entries.push(issue);
        }
    }

    /// Record an Error-severity issue.
    pub fn error(&self, phase: &str, message: impl Into<String>) {
        self.record(Severity::Error, phase, message);
    }

    /// Record a Warning-severity issue.
    pub fn warning(&self, phase: &str, message: impl Into<String>) {
        self.record(Severity::Warning, phase, message);
    }

    /// Copy out everything recorded so far, in append order.
    pub fn snapshot(&self) -> Vec<CollectionIssue> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Summarize the run for final reporting.
    pub fn summary(&self) -> IssueSummary {
        let entries = self.snapshot();
        let errors = entries
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count();
        let warnings = entries
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count();

        IssueSummary { errors, warnings }
    }
}

/// Per-severity counts for the end-of-run summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueSummary {
    pub errors: usize,
    pub warnings: usize,
}

impl IssueSummary {
    /// A clean run is reported explicitly, not implied by silence.
    pub fn is_clean(&self) -> bool {
        self.errors == 0 && self.warnings == 0
    }
}

impl std::fmt::Display for IssueSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_clean() {
            write!(f, "clean run: no issues recorded")
        } else {
            write!(f, "{} error(s), {} warning(s)", self.errors, self.warnings)
        }
    }
}
