//! Outcome notification
//!
//! Every externally visible call reports exactly one result through a
//! [`Notifier`]. Diagnostic logs go through the same sink but are not part of
//! the call contract.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};

/// A reported call outcome
#[derive(Clone, Debug, Serialize)]
pub struct Notification {
    pub success: bool,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    pub fn new(success: bool, message: &str) -> Self {
        Self {
            success,
            message: message.to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Sink for call outcomes and diagnostics
pub trait Notifier {
    /// Report the outcome of a call
    fn result(&self, success: bool, message: &str);

    /// Diagnostic side channel
    fn log(&self, message: &str) {
        log::debug!("{}", message);
    }
}

/// Notifier writing to the `log` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn result(&self, success: bool, message: &str) {
        if success {
            log::info!("{}", message);
        } else {
            log::warn!("{}", message);
        }
    }
}

/// Notifier keeping every result in memory
///
/// Clones share the same buffer, so a caller can hand one clone to the
/// contract and inspect results through another.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    results: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// All results reported so far
    pub fn results(&self) -> Vec<Notification> {
        self.buffer().clone()
    }

    /// The most recent result
    pub fn last(&self) -> Option<Notification> {
        self.results().pop()
    }

    pub fn clear(&self) {
        self.buffer().clear();
    }

    fn buffer(&self) -> MutexGuard<'_, Vec<Notification>> {
        self.results
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Notifier for RecordingNotifier {
    fn result(&self, success: bool, message: &str) {
        self.buffer().push(Notification::new(success, message));
    }
}

/// Fan a notification out to two sinks
impl<A: Notifier, B: Notifier> Notifier for (A, B) {
    fn result(&self, success: bool, message: &str) {
        self.0.result(success, message);
        self.1.result(success, message);
    }

    fn log(&self, message: &str) {
        self.0.log(message);
        self.1.log(message);
    }
}
