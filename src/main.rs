use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tirhuta_api::app::{router, AppState};
use tirhuta_api::config::AppConfig;
use tirhuta_api::database::connect_lazy;
use tirhuta_api::storage::LocalStorage;

#[derive(Parser)]
#[command(name = "tirhuta-api")]
#[command(about = "Tirhuta video and music streaming API server")]
#[command(version)]
struct Cli {
    #[arg(long, env = "PORT", default_value_t = 5000, help = "Port to listen on")]
    port: u16,

    #[arg(long, env = "BIND_HOST", default_value = "0.0.0.0", help = "Interface to bind")]
    host: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so DATABASE_URL, JWT_SECRET, etc. reach the config
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = AppConfig::from_env();

    let default_filter = if config.filter.debug_logging {
        "tirhuta_api=info,tirhuta_api::database=debug,tower_http=info"
    } else {
        "tirhuta_api=info,tower_http=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .init();

    tracing::info!("Starting Tirhuta API in {:?} mode", config.environment);

    let pool = connect_lazy(&config.database).context("invalid database configuration")?;
    let storage = LocalStorage::new(&config.storage.root, &config.storage.public_url)
        .await
        .context("failed to prepare upload storage")?;
    let uploads_dir = storage.root().to_string_lossy().into_owned();

    let state = AppState::new(pool, Arc::new(storage), config);
    let app = router(state, Some(&uploads_dir));

    let bind_addr = format!("{}:{}", cli.host, cli.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Tirhuta API listening on http://{}", bind_addr);
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
