use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use anyhow::Context;
use dotenvy::dotenv;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

mod api;
mod auth;
mod config;
mod db;
mod docs;
mod error;
mod model;
mod models;
mod routes;
mod services;
mod store;
mod utils;

use config::Config;
use db::init_db;

use crate::docs::ApiDoc;
use crate::services::clock::{Clock, SystemClock};
use crate::services::compiler::ReportCompiler;
use crate::services::mailer::SmtpDispatcher;
use crate::services::recorder::AttendanceRecorder;
use crate::services::render::HtmlReportRenderer;
use crate::services::report::ReportService;
use crate::services::scheduler::ReportScheduler;
use crate::store::{AttendanceStore, MySqlAttendanceStore};
use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!(timezone = %config.timezone, "Server starting...");

    let pool = init_db(&config.database_url, config.database_max_connections)
        .await
        .context("failed to connect to the database")?;

    let store: Arc<dyn AttendanceStore> = Arc::new(MySqlAttendanceStore::new(pool));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new(config.timezone));

    let dispatcher =
        SmtpDispatcher::new(&config.smtp).context("invalid mail transport configuration")?;
    let report_service = Arc::new(ReportService::new(
        ReportCompiler::new(store.clone()),
        Arc::new(HtmlReportRenderer::new(config.school_name.clone())),
        Arc::new(dispatcher),
        clock.clone(),
        config.report_recipient.clone(),
    ));
    let recorder = Data::new(AttendanceRecorder::new(store, clock.clone()));

    let shutdown = CancellationToken::new();
    let scheduler = ReportScheduler::new(
        report_service.clone(),
        clock,
        config.report_time,
        shutdown.clone(),
    );
    let scheduler_handle = actix_web::rt::spawn(scheduler.run());

    let limiter = Arc::new(routes::build_limiter(config.rate_protected_per_min)?);
    let server_addr = config.server_addr.clone();
    let config_data = Data::new(config);
    let report_data = Data::from(report_service);

    HttpServer::new(move || {
        let api_prefix = config_data.api_prefix.clone();
        let limiter = limiter.clone();
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(config_data.clone())
            .app_data(recorder.clone())
            .app_data(report_data.clone())
            .configure(|cfg| routes::configure(cfg, &api_prefix, limiter))
    })
    .bind(server_addr)?
    .run()
    .await?;

    info!("Server stopped, waiting for the report scheduler");
    shutdown.cancel();
    if let Err(e) = scheduler_handle.await {
        tracing::error!(error = %e, "Report scheduler task failed");
    }

    Ok(())
}
