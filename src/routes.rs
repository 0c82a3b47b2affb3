use crate::{
    api::{attendance, report},
    auth::middleware::auth_middleware,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use anyhow::{Context, Result};
use std::sync::Arc;

pub type Limiter = Governor<PeerIpKeyExtractor, NoOpMiddleware>;

/// Per-IP limiter allowing `requests_per_min` with an equal burst.
pub fn build_limiter(requests_per_min: u32) -> Result<Limiter> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .context("invalid rate limiter configuration")?;
    Ok(Governor::new(&cfg))
}

pub fn configure(cfg: &mut web::ServiceConfig, api_prefix: &str, limiter: Arc<Limiter>) {
    // Protected routes
    cfg.service(
        web::scope(api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(limiter) // rate limiting
            .configure(attendance_routes),
    );
}

pub fn attendance_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/attendance")
            // /attendance/classes/{class_id}
            .service(
                web::resource("/classes/{class_id}")
                    .route(web::put().to(attendance::submit_attendance))
                    .route(web::get().to(attendance::class_roll)),
            )
            // /attendance/report
            .service(web::resource("/report").route(web::get().to(report::daily_report)))
            // /attendance/report/send
            .service(web::resource("/report/send").route(web::post().to(report::send_report)))
            // /attendance/roster
            .service(web::resource("/roster").route(web::get().to(report::daily_roster)))
            // /attendance/summary
            .service(web::resource("/summary").route(web::get().to(report::daily_summary))),
    );
}
