use backend::{AppState, catalog::Catalog, config::ServerConfig, create_router, error::ServerError};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::parse();
    let catalog = Catalog::from_file(&config.catalog)?;
    tracing::info!(
        courses = catalog.len(),
        "loaded course catalog from {}",
        config.catalog.display()
    );

    let state = AppState {
        max_limit: config.max_limit,
        ..AppState::new(catalog)
    };
    let app = create_router(state);

    tracing::info!("starting backend on http://{}", config.addr);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
