use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use uicms_core::api::router::api_router;
use uicms_core::api::types::ApiContext;
use uicms_core::config::{self, AppConfig};
use uicms_core::db::sqlite::open_database;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    let app_config = AppConfig::from_env();
    tracing::info!(
        "{} v{} starting on {}",
        config::APP_NAME,
        config::APP_VERSION,
        app_config.bind_addr
    );

    let conn = open_database(&app_config.database_path)?;
    let ctx = ApiContext::new(conn, &app_config);

    let app = api_router(ctx)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(app_config.bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
