pub mod health;
pub mod modules;
pub mod shared;

pub use modules::content;

use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use sea_orm::DatabaseConnection;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::content::application::service::ContentService;
use crate::content::config::ContentConfig;
use crate::content::wiring;
use crate::shared::api::json_config::custom_json_config;

/// Shared application state: one `ContentService` behind an `Arc` (cheap to
/// clone per-request, holds no per-request mutable state) plus the
/// boundary auth secret and, when running against Postgres, the live
/// connection the readiness probe pings.
#[derive(Clone)]
pub struct AppState {
    pub content: Arc<ContentService>,
    pub api_key_sha256: String,
    pub db: Option<Arc<DatabaseConnection>>,
}

#[cfg(test)]
impl AppState {
    /// Wires a memory-backed `ContentService` (no Postgres required) with
    /// the given API key digest, for use by handler/extractor tests.
    pub fn for_tests(api_key_sha256: String) -> Self {
        Self {
            content: Arc::new(content::application::service::test_support::memory_service()),
            api_key_sha256,
            db: None,
        }
    }
}

#[actix_web::main]
#[cfg(not(tarpaulin_include))]
async fn start() -> std::io::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting application...");

    let config = ContentConfig::from_env();
    let server_url = format!("{}:{}", config.host, config.port);
    info!(%server_url, "binding HTTP server");

    let (service, db) = wiring::build(&config).await;
    let state = AppState {
        content: Arc::new(service),
        api_key_sha256: config.api_key_sha256.clone(),
        db,
    };

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(custom_json_config())
            .service(health::healthz)
            .service(health::healthz_ready)
            .configure(content::adapter::incoming::web::routes::configure)
    })
    .bind(server_url)?
    .run()
    .await
}

#[cfg(not(tarpaulin_include))]
fn main() {
    if let Err(e) = start() {
        eprintln!("Error starting app: {e}");
    }
}
