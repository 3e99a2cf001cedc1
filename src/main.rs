use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{AppState, router};
use permissions_core::{
    CATALOG_FILE_ENV, CoreConfig, EntitlementService, REST_ADDR_ENV, catalog_path_from_env_value,
    rest_addr_from_env_value,
};
use scope_wire::CatalogFile;

/// Main entry point for the permissions service
///
/// Loads `.env`, resolves configuration once and serves the REST API with Swagger UI.
///
/// # Environment Variables
/// - `PERMISSIONS_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `PERMISSIONS_CATALOG_FILE`: YAML option catalog (default: builtin catalog)
/// - `RUST_LOG`: tracing filter directives
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration is invalid or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("permissions=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = rest_addr_from_env_value(std::env::var(REST_ADDR_ENV).ok());
    let catalog_path = catalog_path_from_env_value(std::env::var(CATALOG_FILE_ENV).ok());
    let catalog = CatalogFile::load(catalog_path.as_deref())?;
    let cfg = Arc::new(CoreConfig::new(rest_addr, catalog)?);

    tracing::info!("++ Starting Permissions REST on {}", cfg.rest_addr());

    let rest_app = router(AppState {
        entitlements: EntitlementService::new(cfg.catalog()),
    });

    let listener = tokio::net::TcpListener::bind(cfg.rest_addr()).await?;
    axum::serve(listener, rest_app).await?;

    Ok(())
}
