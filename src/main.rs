use tracing::info;
use tracing_subscriber::EnvFilter;

use rust_recipes::api::create_api_router;
use rust_recipes::config::Config;
use rust_recipes::entities::{connect, setup_schema};
use rust_recipes::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .init();

    let config = Config::from_env()?;

    let db = connect(&config).await?;
    setup_schema(&db).await?;

    let bind_addr = config.bind_addr.clone();
    let app = create_api_router(AppState::new(db, config));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %bind_addr, "Running");
    axum::serve(listener, app).await?;

    Ok(())
}
