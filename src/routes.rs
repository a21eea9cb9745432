use crate::{
    api::{attendance, pages},
    config::Config,
    error::AppError,
    services::attendance::AttendanceService,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;
use anyhow::Context;
use std::sync::Arc;

type Limiter = Governor<PeerIpKeyExtractor, NoOpMiddleware>;

/// Per-route rate limiters, built once and shared by every worker.
#[derive(Clone)]
pub struct RateLimiters {
    submit: Arc<Limiter>,
    read: Arc<Limiter>,
}

impl RateLimiters {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            submit: Arc::new(
                build_limiter(config.rate_submit_per_min)
                    .context("invalid RATE_SUBMIT_PER_MIN")?,
            ),
            read: Arc::new(
                build_limiter(config.rate_read_per_min).context("invalid RATE_READ_PER_MIN")?,
            ),
        })
    }
}

fn build_limiter(requests_per_min: u32) -> anyhow::Result<Limiter> {
    let burst = requests_per_min.max(1);
    let per_ms = 60_000 / u64::from(burst);
    let cfg = GovernorConfigBuilder::default()
        .milliseconds_per_request(per_ms.max(1))
        .burst_size(burst)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .context("governor rejected the rate limit settings")?;
    Ok(Governor::new(&cfg))
}

/// Everything a worker needs: the shared service, config and limiters.
#[derive(Clone)]
pub struct AppState {
    pub service: web::Data<AttendanceService>,
    pub config: web::Data<Config>,
    pub limiters: RateLimiters,
}

impl AppState {
    pub fn new(service: AttendanceService, config: Config) -> anyhow::Result<Self> {
        let limiters = RateLimiters::from_config(&config)?;
        Ok(Self {
            service: web::Data::new(service),
            config: web::Data::new(config),
            limiters,
        })
    }

    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.service.clone())
            .app_data(self.config.clone())
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                AppError::invalid_input(format!("invalid JSON body: {err}")).into()
            }));
        configure(cfg, &self.limiters);
    }
}

pub fn configure(cfg: &mut web::ServiceConfig, limiters: &RateLimiters) {
    // JSON API
    cfg.service(
        web::resource("/submit-attendance")
            .wrap(limiters.submit.clone())
            .route(web::post().to(attendance::submit_attendance)),
    )
    .service(
        web::resource("/attendance-data")
            .wrap(limiters.read.clone())
            .route(web::get().to(attendance::attendance_summary)),
    )
    .service(
        web::resource("/all-attendance-records")
            .wrap(limiters.read.clone())
            .route(web::get().to(attendance::all_attendance_records)),
    )
    .service(
        web::resource("/attendance_records.csv")
            .wrap(limiters.read.clone())
            .route(web::get().to(attendance::download_csv)),
    );

    // Pages
    cfg.service(
        web::resource("/")
            .wrap(limiters.read.clone())
            .route(web::get().to(pages::roster_page)),
    )
    .service(
        web::resource("/records")
            .wrap(limiters.read.clone())
            .route(web::get().to(pages::records_page)),
    );
}
