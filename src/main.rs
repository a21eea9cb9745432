use actix_web::middleware::NormalizePath;
use actix_web::{App, HttpServer};
use anyhow::Context;
use dotenvy::dotenv;

use attendance_monitor::config::Config;
use attendance_monitor::docs::ApiDoc;
use attendance_monitor::routes::AppState;
use attendance_monitor::services::attendance::AttendanceService;
use attendance_monitor::store;

use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::from_env().context("invalid configuration")?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "attendance.log");
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

    info!(backend = config.store.tag(), roster = config.roster.len(), "Server starting...");

    // credentials are checked here; a bad key stops startup
    let store = store::connect(&config.store).await?;
    let server_addr = config.server_addr.clone();
    let state = AppState::new(AttendanceService::new(store), config)?;

    info!(addr = %server_addr, "Listening");

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .configure(|cfg| state.configure(cfg))
    })
    .bind(&server_addr)?
    .run()
    .await?;

    Ok(())
}
