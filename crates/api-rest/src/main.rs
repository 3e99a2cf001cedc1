//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own.
//!
//! ## Intended use
//! Useful for development when only the REST server (with OpenAPI/Swagger UI) is wanted. The
//! workspace's main `permissions-run` binary also loads `.env` before serving the same router.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{router, AppState};
use permissions_core::{
    catalog_path_from_env_value, rest_addr_from_env_value, CoreConfig, EntitlementService,
    CATALOG_FILE_ENV, REST_ADDR_ENV,
};
use scope_wire::CatalogFile;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = rest_addr_from_env_value(std::env::var(REST_ADDR_ENV).ok());
    let catalog_path = catalog_path_from_env_value(std::env::var(CATALOG_FILE_ENV).ok());
    let catalog = CatalogFile::load(catalog_path.as_deref())?;
    let cfg = Arc::new(CoreConfig::new(addr, catalog)?);

    tracing::info!("-- Starting Permissions REST API on {}", cfg.rest_addr());

    let app = router(AppState {
        entitlements: EntitlementService::new(cfg.catalog()),
    });

    let listener = tokio::net::TcpListener::bind(cfg.rest_addr()).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
