use std::time::Duration;

use anyhow::Context;
use sqlx::MySqlPool;
use sqlx::mysql::MySqlPoolOptions;

const SCHEMA: [&str; 2] = [
    r#"
    CREATE TABLE IF NOT EXISTS employees (
        employee_id VARCHAR(64) NOT NULL PRIMARY KEY,
        name VARCHAR(255) NOT NULL,
        department VARCHAR(255) NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS attendance (
        id CHAR(36) NOT NULL PRIMARY KEY,
        employee_id VARCHAR(64) NOT NULL,
        name VARCHAR(255) NOT NULL,
        check_in_time DATETIME NOT NULL,
        check_in_day DATE NOT NULL,
        verification_method VARCHAR(16) NOT NULL,
        UNIQUE KEY uq_attendance_employee_day (employee_id, check_in_day),
        KEY idx_attendance_check_in_time (check_in_time)
    )
    "#,
];

/// Lazily connecting pool: the kiosk starts even while the database is down
/// and picks the connection up on the first successful call.
pub fn init_pool(database_url: &str, acquire_timeout: Duration) -> anyhow::Result<MySqlPool> {
    MySqlPoolOptions::new()
        .acquire_timeout(acquire_timeout)
        .connect_lazy(database_url)
        .context("Invalid DATABASE_URL")
}

/// Creates the kiosk tables if they are missing.
pub async fn ensure_schema(pool: &MySqlPool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }

    tracing::info!("Attendance schema ready");
    Ok(())
}
