use actix_web::{HttpResponse, Responder, web};
use serde::Serialize;
use serde_json::json;
use tracing::error;
use utoipa::ToSchema;

use crate::kiosk::{Kiosk, badge_payload};
use crate::model::Employee;

#[derive(Debug, Serialize, ToSchema)]
#[schema(example = json!({
    "employee_id": "E100",
    "name": "Asha",
    "qr_data": "{\"employee_id\":\"E100\"}"
}))]
pub struct BadgeResponse {
    pub employee_id: String,
    pub name: String,
    /// Text to encode in the employee's QR badge
    pub qr_data: String,
}

fn store_unavailable() -> HttpResponse {
    HttpResponse::ServiceUnavailable().json(json!({
        "message": "Employee directory unavailable"
    }))
}

/// List the employee directory
#[utoipa::path(
    get,
    path = "/api/employees",
    responses(
        (status = 200, description = "All employees", body = [Employee]),
        (status = 503, description = "Employee directory unavailable")
    ),
    tag = "Employees"
)]
pub async fn list(kiosk: web::Data<Kiosk>) -> impl Responder {
    match kiosk.queries().employees().await {
        Ok(employees) => HttpResponse::Ok().json(employees),
        Err(e) => {
            error!(error = %e, "Failed to list employees");
            store_unavailable()
        }
    }
}

/// QR badge payload for one employee
#[utoipa::path(
    get,
    path = "/api/employees/{employee_id}/badge",
    params(
        ("employee_id" = String, Path, description = "Employee identifier")
    ),
    responses(
        (status = 200, description = "Badge payload", body = BadgeResponse),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "Employee not found"
        })),
        (status = 503, description = "Employee directory unavailable")
    ),
    tag = "Employees"
)]
pub async fn badge(kiosk: web::Data<Kiosk>, path: web::Path<String>) -> impl Responder {
    let employee_id = path.into_inner();

    match kiosk.queries().employee(&employee_id).await {
        Ok(Some(employee)) => HttpResponse::Ok().json(BadgeResponse {
            qr_data: badge_payload(&employee.employee_id),
            employee_id: employee.employee_id,
            name: employee.name,
        }),
        Ok(None) => HttpResponse::NotFound().json(json!({
            "message": "Employee not found"
        })),
        Err(e) => {
            error!(error = %e, employee_id = %employee_id, "Failed to look up employee");
            store_unavailable()
        }
    }
}
