use crate::api::{attendance, employee, kiosk};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::web;
use anyhow::anyhow;

pub type RateLimit = GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware>;

/// Per-IP limit for the manual-entry endpoint
pub fn build_limit(requests_per_min: u32) -> anyhow::Result<RateLimit> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);

    GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .ok_or_else(|| anyhow!("invalid rate limit: {requests_per_min} requests per minute"))
}

pub fn configure(cfg: &mut web::ServiceConfig, api_prefix: &str, manual_limit: &RateLimit) {
    cfg.service(
        web::scope(api_prefix)
            .service(
                web::scope("/attendance")
                    // /attendance/manual
                    .service(
                        web::resource("/manual")
                            .wrap(Governor::new(manual_limit))
                            .route(web::post().to(attendance::manual_check_in)),
                    )
                    // /attendance/recent
                    .service(web::resource("/recent").route(web::get().to(attendance::recent)))
                    // /attendance/stats
                    .service(web::resource("/stats").route(web::get().to(attendance::stats)))
                    // /attendance/employee/{employee_id}
                    .service(
                        web::resource("/employee/{employee_id}")
                            .route(web::get().to(attendance::employee_history)),
                    ),
            )
            .service(
                web::scope("/employees")
                    // /employees
                    .service(web::resource("").route(web::get().to(employee::list)))
                    // /employees/{employee_id}/badge
                    .service(
                        web::resource("/{employee_id}/badge").route(web::get().to(employee::badge)),
                    ),
            )
            .service(
                web::scope("/kiosk")
                    .service(web::resource("/status").route(web::get().to(kiosk::status)))
                    .service(web::resource("/refresh").route(web::post().to(kiosk::refresh))),
            ),
    );
}

// CAMERA / STDIN
//  └─ ScannerFeed ── Detection ──► Pipeline (cooldown gate) ──► AttendanceRecorder
//                                                                    │
// GET /employees/{id}/badge ── badge_payload (read back by parse_payload)
// POST /attendance/manual ──────────────────────────────────────────┤
//                                                                    ▼
//                                           PresenterHandle ──► Dashboard ──► GET /kiosk/status
