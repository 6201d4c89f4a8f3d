use std::sync::Arc;

use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use dotenvy::dotenv;
use tokio::sync::mpsc;

use attendance_kiosk::config::Config;
use attendance_kiosk::docs;
use attendance_kiosk::kiosk::{
    Clock, Dashboard, Kiosk, PresenterHandle, ScannerFeed, Severity, SystemClock,
};
use attendance_kiosk::routes;
use attendance_kiosk::store::{self, DirectoryService, Stores};
use attendance_kiosk::utils::employee_cache::CachedDirectory;
use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa_swagger_ui::SwaggerUi;

/// Employees loaded per batch during cache warmup
const WARMUP_BATCH: usize = 500;

#[get("/")]
async fn index() -> impl Responder {
    "Attendance kiosk"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "kiosk.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(config.log_level)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!(backend = ?config.store_backend, "Kiosk starting...");

    let backend = store::open(&config)?;

    let cache = Arc::new(CachedDirectory::new(
        backend.directory.clone(),
        config.employee_cache_ttl,
    ));
    let directory: Arc<dyn DirectoryService> = cache.clone();
    let stores = Stores {
        directory,
        events: backend.events,
    };

    actix_web::rt::spawn(async move {
        if let Err(e) = cache.warmup(WARMUP_BATCH).await {
            warn!(error = %e, "Failed to warmup employee cache");
        }
    });

    // Presentation context
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let (presenter, presenter_rx) = PresenterHandle::channel(config.presenter_channel_capacity);
    let (dashboard, snapshots) = Dashboard::new(config.recent_limit);
    actix_web::rt::spawn(dashboard.run(presenter_rx));

    let kiosk = Kiosk::new(
        &stores,
        presenter.clone(),
        clock.clone(),
        config.store_timeout,
        config.recent_limit,
    );

    match kiosk.refresh_dashboard().await {
        Ok(loaded) => info!(loaded, "Loaded today's attendance"),
        Err(e) => {
            warn!(error = %e, "Failed to load today's attendance");
            presenter.on_status("Database not connected!", Severity::Error);
        }
    }

    // Camera context
    let (detection_tx, detection_rx) = mpsc::channel(config.detection_channel_capacity.max(1));
    actix_web::rt::spawn(kiosk.pipeline(config.qr_cooldown).run(detection_rx));

    let feed = ScannerFeed::new(
        config.scanner_command.clone(),
        config.scanner_restart_delay,
        clock,
        detection_tx,
        presenter,
    );
    actix_web::rt::spawn(feed.run());

    let manual_limit = routes::build_limit(config.rate_manual_per_min)?;
    let api_prefix = config.api_prefix.clone();
    let api_doc = docs::openapi_for(&api_prefix);

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", api_doc.clone()),
            )
            .app_data(Data::new(kiosk.clone()))
            .app_data(Data::new(snapshots.clone()))
            .service(index)
            .configure(|cfg| routes::configure(cfg, &api_prefix, &manual_limit))
    })
    .bind(&config.server_addr)?
    .run()
    .await?;

    Ok(())
}
