use serde::Serialize;
use utoipa::ToSchema;

use crate::model::{AttendanceEvent, Employee};

/// Result of one `record` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// Identifier is not in the directory. Nothing written.
    NotFound { identifier: String },

    /// The employee already checked in today. Nothing written.
    AlreadyMarked {
        employee: Employee,
        existing: AttendanceEvent,
    },

    /// A new check-in was appended.
    Recorded {
        employee: Employee,
        event: AttendanceEvent,
    },

    /// Another writer recorded the same employee for today between our check
    /// and our insert.
    RaceLost { employee: Employee },

    /// The directory or the event store failed; retry on the next detection.
    StoreError { detail: String },
}

impl Outcome {
    pub fn is_recorded(&self) -> bool {
        matches!(self, Outcome::Recorded { .. })
    }
}
