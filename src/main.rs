use std::sync::Arc;

use movieshelf::{AppState, app, config::Config, db, fixtures, store::Catalog};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,movieshelf=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = Arc::new(Config::from_env()?);

    let db = db::connect_and_migrate(config.database_url.as_str()).await?;
    let catalog = Catalog::new(db);

    if config.seed_fixtures {
        fixtures::seed(&catalog).await?;
    }

    let state = Arc::new(AppState { config: config.clone(), catalog });

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "listening");
    axum::serve(listener, app(state)).await?;

    Ok(())
}
