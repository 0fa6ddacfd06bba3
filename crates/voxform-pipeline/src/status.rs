//! Per-job status collection and progress reporting.
//!
//! Both are explicit context objects scoped to one job's execution and
//! reset between stages; there is no process-wide handler.

use serde::{Deserialize, Serialize};

/// Severity of a status message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Info,
    Warning,
}

/// An advisory message produced during stage execution.
///
/// Status messages never alter control flow.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StatusMessage {
    pub status: Status,
    pub message: String,
}

/// Collects advisory status messages for the stage currently running.
#[derive(Debug, Default)]
pub struct StatusHandler {
    messages: Vec<StatusMessage>,
}

impl StatusHandler {
    /// Create an empty handler
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an informational message
    pub fn info(&mut self, message: impl Into<String>) {
        self.messages.push(StatusMessage {
            status: Status::Info,
            message: message.into(),
        });
    }

    /// Record a warning
    pub fn warning(&mut self, message: impl Into<String>) {
        self.messages.push(StatusMessage {
            status: Status::Warning,
            message: message.into(),
        });
    }

    /// Messages collected so far
    pub fn messages(&self) -> &[StatusMessage] {
        &self.messages
    }

    /// Number of warnings collected so far
    pub fn warning_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.status == Status::Warning)
            .count()
    }

    /// Remove and return all collected messages
    pub fn drain(&mut self) -> Vec<StatusMessage> {
        std::mem::take(&mut self.messages)
    }

    /// Discard all collected messages
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

/// Reports coarse fractional progress of the running stage.
///
/// The sink decides where progress goes: the worker forwards it to the
/// controller's observer, the headless runner discards it.
pub struct ProgressReporter {
    sink: Box<dyn Fn(f32) + Send>,
}

impl ProgressReporter {
    /// Create a reporter forwarding to the given sink
    pub fn new(sink: impl Fn(f32) + Send + 'static) -> Self {
        Self {
            sink: Box::new(sink),
        }
    }

    /// A reporter that discards progress
    pub fn noop() -> Self {
        Self::new(|_| {})
    }

    /// Report progress as a fraction in [0, 1]
    pub fn report(&self, fraction: f32) {
        (self.sink)(fraction.clamp(0.0, 1.0));
    }
}

impl std::fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressReporter").finish_non_exhaustive()
    }
}
