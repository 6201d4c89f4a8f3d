use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "employee_id": "E100",
        "name": "Asha",
        "department": "Engineering"
    })
)]
pub struct Employee {
    /// Identifier printed in the employee's QR badge
    #[schema(example = "E100")]
    pub employee_id: String,

    #[schema(example = "Asha")]
    pub name: String,

    #[schema(example = "Engineering", nullable = true)]
    pub department: Option<String>,
}

impl Employee {
    pub fn new(employee_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            employee_id: employee_id.into(),
            name: name.into(),
            department: None,
        }
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }
}
