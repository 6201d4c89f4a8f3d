use crate::api::attendance::ManualCheckIn;
use crate::api::employee::BadgeResponse;
use crate::attendance::{DailyStats, Outcome};
use crate::kiosk::presenter::{DashboardSnapshot, LastScan, Severity};
use crate::model::{AttendanceEvent, Employee, ScanMethod};
use utoipa::OpenApi;
use utoipa::openapi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance Kiosk API",
        version = "0.1.0",
        description = r#"
## QR Attendance Kiosk

A desk-side kiosk that reads employee QR badges and records **one check-in per employee per day**.

### 🔹 Key Features
- **Badge scanning**
  - Decoded badges pass a short cooldown gate, then the recorder
- **Manual entry**
  - Fallback when a badge cannot be read
- **Dashboard**
  - Status line, last recognized employee and today's recent check-ins
- **Statistics**
  - Present today, attendance rate and weekly check-ins

### 📦 Outcomes
Every check-in attempt answers with one of `recorded`, `already_marked`,
`not_found`, `race_lost` or `store_error`.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::manual_check_in,
        crate::api::attendance::recent,
        crate::api::attendance::stats,
        crate::api::attendance::employee_history,

        crate::api::employee::list,
        crate::api::employee::badge,

        crate::api::kiosk::status,
        crate::api::kiosk::refresh
    ),
    components(
        schemas(
            ManualCheckIn,
            BadgeResponse,
            Outcome,
            Employee,
            AttendanceEvent,
            ScanMethod,
            DailyStats,
            DashboardSnapshot,
            LastScan,
            Severity
        )
    ),
    tags(
        (name = "Attendance", description = "Check-in and attendance query APIs"),
        (name = "Employees", description = "Read-only directory and badge APIs"),
        (name = "Kiosk", description = "Kiosk dashboard APIs"),
    )
)]
pub struct ApiDoc;

/// Paths declared under this prefix in the handler annotations
const DOCUMENTED_PREFIX: &str = "/api";

/// OpenAPI document with every path moved under `api_prefix`.
pub fn openapi_for(api_prefix: &str) -> openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    let prefix = api_prefix.trim_end_matches('/');

    doc.paths.paths = std::mem::take(&mut doc.paths.paths)
        .into_iter()
        .map(|(path, item)| {
            let rest = path.strip_prefix(DOCUMENTED_PREFIX).unwrap_or(&path);
            (format!("{prefix}{rest}"), item)
        })
        .collect();

    doc
}
