use anyhow::{Context, Result};
use shop_assistant::{config, server};
use tracing::info;
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

/// Resolves the effective log filter. `RUST_LOG` wins over the config file,
/// and a bare level must be one `tracing` knows about.
fn log_filter(configured: &str) -> Result<(String, EnvFilter)> {
    let level = std::env::var("RUST_LOG").unwrap_or_else(|_| configured.to_string());

    level.parse::<LevelFilter>().map_err(|_| {
        anyhow::anyhow!(
            "Invalid log level: '{}'. Valid levels: error, warn, info, debug, trace",
            level
        )
    })?;

    let filter = EnvFilter::try_new(&level)
        .with_context(|| format!("Failed to build log filter from '{level}'"))?;
    Ok((level, filter))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logging is configured from the file, so the file comes first.
    let config = match config::load().await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let (level, filter) = match log_filter(&config.server.logs.level) {
        Ok(resolved) => resolved,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt().with_env_filter(filter).json().init();

    info!(
        shop = %config.chat.shop_name,
        model = %config.llm.model,
        "Starting shop assistant with log level: {}",
        level
    );

    server::run(config).await?;

    Ok(())
}
