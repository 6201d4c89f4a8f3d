use std::time::Duration;

use chrono::NaiveDate;
use thiserror::Error;

/// Failures reported by the directory and event stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Connectivity loss or any other backend failure
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store call timed out after {0:?}")]
    Timeout(Duration),

    /// The store rejected a second check-in for the same employee and day
    #[error("attendance already recorded for {employee_id} on {day}")]
    Duplicate { employee_id: String, day: NaiveDate },

    /// A stored row could not be mapped back into the model
    #[error("invalid record in store: {0}")]
    InvalidRecord(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}
