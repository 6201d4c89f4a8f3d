use actix_web::{HttpResponse, Responder, web};
use serde_json::json;
use tokio::sync::watch;

use crate::kiosk::{DashboardSnapshot, Kiosk};

/// What the kiosk screen currently shows
#[utoipa::path(
    get,
    path = "/api/kiosk/status",
    responses(
        (status = 200, description = "Dashboard snapshot", body = DashboardSnapshot)
    ),
    tag = "Kiosk"
)]
pub async fn status(
    kiosk: web::Data<Kiosk>,
    snapshots: web::Data<watch::Receiver<DashboardSnapshot>>,
) -> impl Responder {
    let snapshot = snapshots.borrow().clone();
    HttpResponse::Ok().json(snapshot.for_day(kiosk.now().date()))
}

/// Reload today's check-ins into the dashboard
#[utoipa::path(
    post,
    path = "/api/kiosk/refresh",
    responses(
        (status = 200, description = "Dashboard reloaded", body = Object, example = json!({
            "loaded": 7
        })),
        (status = 503, description = "Attendance store unavailable")
    ),
    tag = "Kiosk"
)]
pub async fn refresh(kiosk: web::Data<Kiosk>) -> impl Responder {
    match kiosk.refresh_dashboard().await {
        Ok(loaded) => HttpResponse::Ok().json(json!({ "loaded": loaded })),
        Err(e) => {
            tracing::error!(error = %e, "Failed to refresh dashboard");
            HttpResponse::ServiceUnavailable().json(json!({
                "message": "Attendance store unavailable"
            }))
        }
    }
}
