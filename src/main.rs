use std::sync::Arc;

use clap::Parser;
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

use user_accounts_api::{
    app,
    database::{DatabaseManager, PgUserStore},
    AppConfig, AppState,
};

#[derive(Debug, Parser)]
#[command(name = "user-accounts-api", version, about = "User accounts HTTP service")]
struct Args {
    /// Listen port, overrides PORT
    #[arg(long)]
    port: Option<u16>,

    /// Validate configuration and exit
    #[arg(long)]
    check_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(port) = args.port {
        config.server.port = port;
    }

    if args.check_config {
        println!("{:#?}", config);
        return Ok(());
    }

    tracing::info!("Starting user accounts API in {:?} mode", config.environment);

    let pool = DatabaseManager::connect(&config.database).await?;
    let state = AppState::from_config(&config, Arc::new(PgUserStore::new(pool)))?;

    let mut router = app(state);
    if config.security.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Listening on http://{}", bind_addr);

    axum::serve(listener, router).await?;
    Ok(())
}
