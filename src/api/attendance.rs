use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, web};
use chrono::Datelike;
use serde::Deserialize;
use serde_json::json;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

use crate::attendance::{DailyStats, Outcome};
use crate::kiosk::Kiosk;
use crate::model::{AttendanceEvent, TimeRange};

#[derive(Deserialize, ToSchema)]
pub struct ManualCheckIn {
    #[schema(example = "E100")]
    pub employee_id: String,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecentQuery {
    /// Maximum number of events (1-100)
    pub limit: Option<usize>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MonthQuery {
    /// Defaults to the current year
    pub year: Option<i32>,
    /// 1-12, defaults to the current month
    pub month: Option<u32>,
}

fn status_of(outcome: &Outcome) -> StatusCode {
    match outcome {
        Outcome::Recorded { .. } | Outcome::AlreadyMarked { .. } => StatusCode::OK,
        Outcome::NotFound { .. } => StatusCode::NOT_FOUND,
        Outcome::RaceLost { .. } => StatusCode::CONFLICT,
        Outcome::StoreError { .. } => StatusCode::SERVICE_UNAVAILABLE,
    }
}

fn store_unavailable() -> HttpResponse {
    HttpResponse::ServiceUnavailable().json(json!({
        "message": "Attendance store unavailable"
    }))
}

/// Manual check-in endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/manual",
    request_body = ManualCheckIn,
    responses(
        (status = 200, description = "Recorded, or already marked today", body = Outcome),
        (status = 404, description = "Employee not found", body = Outcome, example = json!({
            "outcome": "not_found",
            "identifier": "ZZZ"
        })),
        (status = 409, description = "Recorded concurrently by another kiosk", body = Outcome),
        (status = 429, description = "Too many manual entries"),
        (status = 503, description = "Attendance store unavailable", body = Outcome)
    ),
    tag = "Attendance"
)]
pub async fn manual_check_in(
    kiosk: web::Data<Kiosk>,
    payload: web::Json<ManualCheckIn>,
) -> impl Responder {
    let outcome = kiosk.check_in_manual(&payload.employee_id).await;
    HttpResponse::build(status_of(&outcome)).json(outcome)
}

/// Today's most recent check-ins
#[utoipa::path(
    get,
    path = "/api/attendance/recent",
    params(RecentQuery),
    responses(
        (status = 200, description = "Newest first", body = [AttendanceEvent]),
        (status = 503, description = "Attendance store unavailable")
    ),
    tag = "Attendance"
)]
pub async fn recent(kiosk: web::Data<Kiosk>, query: web::Query<RecentQuery>) -> impl Responder {
    let limit = query.limit.unwrap_or(kiosk.recent_limit()).clamp(1, 100);

    match kiosk.queries().recent_today(kiosk.now(), limit).await {
        Ok(events) => HttpResponse::Ok().json(events),
        Err(e) => {
            error!(error = %e, "Failed to fetch recent attendance");
            store_unavailable()
        }
    }
}

/// Today's statistics
#[utoipa::path(
    get,
    path = "/api/attendance/stats",
    responses(
        (status = 200, description = "Attendance statistics for today", body = DailyStats),
        (status = 503, description = "Attendance store unavailable")
    ),
    tag = "Attendance"
)]
pub async fn stats(kiosk: web::Data<Kiosk>) -> impl Responder {
    match kiosk.queries().daily_stats(kiosk.now()).await {
        Ok(stats) => HttpResponse::Ok().json(stats),
        Err(e) => {
            error!(error = %e, "Failed to compute attendance statistics");
            store_unavailable()
        }
    }
}

/// One employee's check-ins for a month
#[utoipa::path(
    get,
    path = "/api/attendance/employee/{employee_id}",
    params(
        ("employee_id" = String, Path, description = "Employee identifier"),
        MonthQuery
    ),
    responses(
        (status = 200, description = "Newest first", body = [AttendanceEvent]),
        (status = 400, description = "Invalid year or month", body = Object, example = json!({
            "message": "Invalid year or month"
        })),
        (status = 503, description = "Attendance store unavailable")
    ),
    tag = "Attendance"
)]
pub async fn employee_history(
    kiosk: web::Data<Kiosk>,
    path: web::Path<String>,
    query: web::Query<MonthQuery>,
) -> impl Responder {
    let employee_id = path.into_inner();
    let today = kiosk.now().date();
    let year = query.year.unwrap_or(today.year());
    let month = query.month.unwrap_or(today.month());

    let Some(window) = TimeRange::month_of(year, month) else {
        return HttpResponse::BadRequest().json(json!({
            "message": "Invalid year or month"
        }));
    };

    match kiosk.queries().employee_history(&employee_id, window).await {
        Ok(events) => HttpResponse::Ok().json(events),
        Err(e) => {
            error!(error = %e, employee_id = %employee_id, "Failed to fetch attendance history");
            store_unavailable()
        }
    }
}
