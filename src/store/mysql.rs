use std::str::FromStr;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use futures::StreamExt;
use futures::stream::BoxStream;
use sqlx::{FromRow, MySqlPool};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::db::ensure_schema;
use crate::error::StoreError;
use crate::model::{AttendanceEvent, Employee, ScanMethod, TimeRange};
use crate::store::{DirectoryService, EventStore};

const EVENT_COLUMNS: &str = "id, employee_id, name, check_in_time, verification_method";

#[derive(FromRow)]
struct AttendanceRow {
    id: String,
    employee_id: String,
    name: String,
    check_in_time: NaiveDateTime,
    verification_method: String,
}

impl TryFrom<AttendanceRow> for AttendanceEvent {
    type Error = StoreError;

    fn try_from(row: AttendanceRow) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| StoreError::InvalidRecord(format!("attendance id {}: {}", row.id, e)))?;
        let verification_method = ScanMethod::from_str(&row.verification_method).map_err(|_| {
            StoreError::InvalidRecord(format!(
                "attendance {} has unknown verification method {}",
                row.id, row.verification_method
            ))
        })?;

        Ok(AttendanceEvent {
            id,
            employee_id: row.employee_id,
            name: row.name,
            check_in_time: row.check_in_time,
            verification_method,
        })
    }
}

fn into_events(rows: Vec<AttendanceRow>) -> Result<Vec<AttendanceEvent>, StoreError> {
    rows.into_iter().map(AttendanceEvent::try_from).collect()
}

/// Directory and attendance log backed by MySQL.
pub struct MySqlStore {
    pool: MySqlPool,
    schema: OnceCell<()>,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self {
            pool,
            schema: OnceCell::new(),
        }
    }

    /// Pool with the schema ensured; retried on every call until it succeeds.
    async fn ready(&self) -> Result<&MySqlPool, StoreError> {
        self.schema
            .get_or_try_init(|| ensure_schema(&self.pool))
            .await?;
        Ok(&self.pool)
    }
}

#[async_trait]
impl DirectoryService for MySqlStore {
    async fn find_employee(&self, identifier: &str) -> Result<Option<Employee>, StoreError> {
        let pool = self.ready().await?;

        let employee = sqlx::query_as::<_, Employee>(
            r#"
            SELECT employee_id, name, department
            FROM employees
            WHERE employee_id = ?
            "#,
        )
        .bind(identifier)
        .fetch_optional(pool)
        .await?;

        Ok(employee)
    }

    async fn count_employees(&self) -> Result<u64, StoreError> {
        let pool = self.ready().await?;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM employees")
            .fetch_one(pool)
            .await?;

        Ok(total.max(0) as u64)
    }

    fn employees(&self) -> BoxStream<'_, Result<Employee, StoreError>> {
        sqlx::query_as::<_, Employee>(
            "SELECT employee_id, name, department FROM employees ORDER BY employee_id",
        )
        .fetch(&self.pool)
        .map(|row| row.map_err(StoreError::from))
        .boxed()
    }
}

#[async_trait]
impl EventStore for MySqlStore {
    async fn find_event(
        &self,
        employee_id: &str,
        window: TimeRange,
    ) -> Result<Option<AttendanceEvent>, StoreError> {
        let pool = self.ready().await?;

        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM attendance \
             WHERE employee_id = ? AND check_in_time >= ? AND check_in_time < ? \
             ORDER BY check_in_time ASC LIMIT 1"
        );
        let row = sqlx::query_as::<_, AttendanceRow>(&sql)
            .bind(employee_id)
            .bind(window.start)
            .bind(window.end)
            .fetch_optional(pool)
            .await?;

        row.map(AttendanceEvent::try_from).transpose()
    }

    async fn append_event(&self, event: &AttendanceEvent) -> Result<(), StoreError> {
        let pool = self.ready().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO attendance
            (id, employee_id, name, check_in_time, check_in_day, verification_method)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(event.id.to_string())
        .bind(&event.employee_id)
        .bind(&event.name)
        .bind(event.check_in_time)
        .bind(event.day())
        .bind(event.verification_method.as_ref())
        .execute(pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                // uq_attendance_employee_day: same employee, same day
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        return Err(StoreError::Duplicate {
                            employee_id: event.employee_id.clone(),
                            day: event.day(),
                        });
                    }
                }

                tracing::error!(error = %e, employee_id = %event.employee_id, "Attendance insert failed");
                Err(e.into())
            }
        }
    }

    async fn list_recent(
        &self,
        window: TimeRange,
        limit: usize,
    ) -> Result<Vec<AttendanceEvent>, StoreError> {
        let pool = self.ready().await?;

        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM attendance \
             WHERE check_in_time >= ? AND check_in_time < ? \
             ORDER BY check_in_time DESC LIMIT ?"
        );
        let rows = sqlx::query_as::<_, AttendanceRow>(&sql)
            .bind(window.start)
            .bind(window.end)
            .bind(limit as i64)
            .fetch_all(pool)
            .await?;

        into_events(rows)
    }

    async fn count(&self, window: Option<TimeRange>) -> Result<u64, StoreError> {
        let pool = self.ready().await?;

        let total = match window {
            Some(window) => {
                sqlx::query_scalar::<_, i64>(
                    "SELECT COUNT(*) FROM attendance WHERE check_in_time >= ? AND check_in_time < ?",
                )
                .bind(window.start)
                .bind(window.end)
                .fetch_one(pool)
                .await?
            }
            None => {
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM attendance")
                    .fetch_one(pool)
                    .await?
            }
        };

        Ok(total.max(0) as u64)
    }

    async fn list_for_employee(
        &self,
        employee_id: &str,
        window: TimeRange,
    ) -> Result<Vec<AttendanceEvent>, StoreError> {
        let pool = self.ready().await?;

        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM attendance \
             WHERE employee_id = ? AND check_in_time >= ? AND check_in_time < ? \
             ORDER BY check_in_time DESC"
        );
        let rows = sqlx::query_as::<_, AttendanceRow>(&sql)
            .bind(employee_id)
            .bind(window.start)
            .bind(window.end)
            .fetch_all(pool)
            .await?;

        into_events(rows)
    }
}
