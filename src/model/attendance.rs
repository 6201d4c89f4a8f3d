use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::model::employee::Employee;

/// How the identifier reached the kiosk.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ScanMethod {
    Scan,
    Manual,
}

/// One check-in. Append-only: created once per employee per day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "id": "6f1c2d1e-8a4b-4c36-9d55-0b9f1f6f2a10",
        "employee_id": "E100",
        "name": "Asha",
        "check_in_time": "2026-03-09T09:00:00",
        "verification_method": "scan"
    })
)]
pub struct AttendanceEvent {
    #[schema(value_type = String, format = "uuid")]
    pub id: Uuid,

    #[schema(example = "E100")]
    pub employee_id: String,

    /// Employee name at the time of the check-in
    #[schema(example = "Asha")]
    pub name: String,

    #[schema(example = "2026-03-09T09:00:00", value_type = String, format = "date-time")]
    pub check_in_time: NaiveDateTime,

    pub verification_method: ScanMethod,
}

impl AttendanceEvent {
    /// `check_in_time` is truncated to whole seconds, the precision of the
    /// `DATETIME` column.
    pub fn new(employee: &Employee, check_in_time: NaiveDateTime, method: ScanMethod) -> Self {
        let check_in_time = check_in_time.with_nanosecond(0).unwrap_or(check_in_time);

        Self {
            id: Uuid::new_v4(),
            employee_id: employee.employee_id.clone(),
            name: employee.name.clone(),
            check_in_time,
            verification_method: method,
        }
    }

    pub fn day(&self) -> NaiveDate {
        self.check_in_time.date()
    }
}
