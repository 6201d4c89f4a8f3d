use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use futures::TryStreamExt;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::StoreError;
use crate::model::{AttendanceEvent, Employee, TimeRange};
use crate::store::{DirectoryService, EventStore, with_timeout};

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[schema(example = json!({
    "date": "2026-03-09",
    "total_employees": 40,
    "present_today": 31,
    "attendance_rate": 77.5,
    "weekly_attendance": 142
}))]
pub struct DailyStats {
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    pub total_employees: u64,
    pub present_today: u64,
    /// Percentage of the directory present today, 0 for an empty directory
    pub attendance_rate: f64,
    /// Check-ins since Monday
    pub weekly_attendance: u64,
}

impl DailyStats {
    pub fn new(date: NaiveDate, total_employees: u64, present_today: u64, weekly_attendance: u64) -> Self {
        let attendance_rate = if total_employees > 0 {
            present_today as f64 / total_employees as f64 * 100.0
        } else {
            0.0
        };

        Self {
            date,
            total_employees,
            present_today,
            attendance_rate,
            weekly_attendance,
        }
    }
}

/// Read side of the attendance log: dashboard lists and statistics.
pub struct AttendanceQueries {
    directory: Arc<dyn DirectoryService>,
    events: Arc<dyn EventStore>,
    timeout: Duration,
}

impl AttendanceQueries {
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

    pub async fn recent_today(
        &self,
        now: NaiveDateTime,
        limit: usize,
    ) -> Result<Vec<AttendanceEvent>, StoreError> {
        with_timeout(
            self.timeout,
            self.events.list_recent(TimeRange::day_of(now), limit),
        )
        .await
    }

    pub async fn employee_history(
        &self,
        employee_id: &str,
        window: TimeRange,
    ) -> Result<Vec<AttendanceEvent>, StoreError> {
        with_timeout(
            self.timeout,
            self.events.list_for_employee(employee_id, window),
        )
        .await
    }

    /// Whole directory in directory order.
    pub async fn employees(&self) -> Result<Vec<Employee>, StoreError> {
        with_timeout(self.timeout, self.directory.employees().try_collect()).await
    }

    pub async fn employee(&self, employee_id: &str) -> Result<Option<Employee>, StoreError> {
        with_timeout(self.timeout, self.directory.find_employee(employee_id)).await
    }

    pub async fn daily_stats(&self, now: NaiveDateTime) -> Result<DailyStats, StoreError> {
        let total = with_timeout(self.timeout, self.directory.count_employees()).await?;
        let present = with_timeout(
            self.timeout,
            self.events.count(Some(TimeRange::day_of(now))),
        )
        .await?;
        let weekly = with_timeout(
            self.timeout,
            self.events.count(Some(TimeRange::week_of(now))),
        )
        .await?;

        Ok(DailyStats::new(now.date(), total, present, weekly))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_is_a_percentage() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        let stats = DailyStats::new(date, 8, 6, 20);

        assert!((stats.attendance_rate - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_directory_has_zero_rate() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        let stats = DailyStats::new(date, 0, 0, 0);

        assert_eq!(stats.attendance_rate, 0.0);
    }
}
