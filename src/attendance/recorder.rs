use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use tracing::{debug, error, info, instrument};

use crate::attendance::Outcome;
use crate::error::StoreError;
use crate::model::{AttendanceEvent, ScanMethod, TimeRange};
use crate::store::{DirectoryService, EventStore, with_timeout};

/// Turns a recognized identifier into at most one check-in per employee per
/// day.
///
/// The protocol is check-then-insert: look the employee up, look for a
/// same-day event, append. The two reads and the write are separate store
/// calls, so two kiosks sharing a store can both pass the check; the store's
/// own same-day rejection then surfaces as [`Outcome::RaceLost`].
///
/// The recorder keeps no mutable state and is shared behind an `Arc` by the
/// camera pipeline and the manual-entry handler.
pub struct AttendanceRecorder {
    directory: Arc<dyn DirectoryService>,
    events: Arc<dyn EventStore>,
    timeout: Duration,
}

impl AttendanceRecorder {
    pub fn new(
        directory: Arc<dyn DirectoryService>,
        events: Arc<dyn EventStore>,
        timeout: Duration,
    ) -> Self {
        Self {
            directory,
            events,
            timeout,
        }
    }

    #[instrument(name = "record_attendance", skip(self))]
    pub async fn record(&self, identifier: &str, now: NaiveDateTime, method: ScanMethod) -> Outcome {
        match self.try_record(identifier, now, method).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %e, "Attendance store failure");
                Outcome::StoreError {
                    detail: e.to_string(),
                }
            }
        }
    }

    async fn try_record(
        &self,
        identifier: &str,
        now: NaiveDateTime,
        method: ScanMethod,
    ) -> Result<Outcome, StoreError> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            debug!("Empty identifier");
            return Ok(Outcome::NotFound {
                identifier: String::new(),
            });
        }

        // 1️⃣ Directory lookup
        let Some(employee) =
            with_timeout(self.timeout, self.directory.find_employee(identifier)).await?
        else {
            info!("Employee not found");
            return Ok(Outcome::NotFound {
                identifier: identifier.to_string(),
            });
        };

        // 2️⃣ Same-day check
        let today = TimeRange::day_of(now);
        if let Some(existing) = with_timeout(
            self.timeout,
            self.events.find_event(&employee.employee_id, today),
        )
        .await?
        {
            info!(employee_id = %employee.employee_id, "Attendance already marked today");
            return Ok(Outcome::AlreadyMarked { employee, existing });
        }

        // 3️⃣ Append
        let event = AttendanceEvent::new(&employee, now, method);
        match with_timeout(self.timeout, self.events.append_event(&event)).await {
            Ok(()) => {
                info!(employee_id = %employee.employee_id, event_id = %event.id, "Attendance recorded");
                Ok(Outcome::Recorded { employee, event })
            }
            Err(StoreError::Duplicate { .. }) => {
                info!(employee_id = %employee.employee_id, "Concurrent check-in won the insert");
                Ok(Outcome::RaceLost { employee })
            }
            Err(e) => Err(e),
        }
    }
}
