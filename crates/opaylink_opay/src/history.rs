// --- File: crates/opaylink_opay/src/history.rs ---

use crate::models::ValidationResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Number of validation attempts kept for display.
pub const DEFAULT_HISTORY_CAPACITY: usize = 5;

/// One validation attempt, as shown in the admin history panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub timestamp: String,
    pub valid: bool,
    pub reason: String,
    pub device_count: u32,
    pub active_number_count: u32,
    pub error: Option<String>,
}

impl HistoryEntry {
    pub fn success(result: &ValidationResult, at: DateTime<Utc>) -> Self {
        let reason = result.reason.clone().unwrap_or_else(|| {
            if result.valid {
                "Subscription active".to_string()
            } else {
                "Subscription inactive".to_string()
            }
        });

        Self {
            timestamp: at.to_rfc3339(),
            valid: result.valid,
            reason,
            device_count: result.device_count,
            active_number_count: result.active_number_count,
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            timestamp: at.to_rfc3339(),
            valid: false,
            reason: "Validation failed".to_string(),
            device_count: 0,
            active_number_count: 0,
            error: Some(message.into()),
        }
    }
}

/// Fixed-capacity, newest-first log of validation attempts.
///
/// Entries are never edited; the oldest one is dropped once the log is full.
#[derive(Debug)]
pub struct ValidationHistoryLog {
    capacity: usize,
    entries: Mutex<VecDeque<HistoryEntry>>,
}

impl Default for ValidationHistoryLog {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl ValidationHistoryLog {
    /// A capacity of zero is bumped to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn append(&self, entry: HistoryEntry) {
        let mut entries = self.lock();
        entries.push_front(entry);
        entries.truncate(self.capacity);
    }

    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panic while holding the lock cannot leave the deque half-written.
    fn lock(&self) -> MutexGuard<'_, VecDeque<HistoryEntry>> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
