use dotenvy::dotenv;
use log::{error, info};
use std::path::PathBuf;
use std::sync::Arc;

use proflow::core::config::{AppConfig, DEFAULT_CONFIG_FILE};
use proflow::core::shared::state::AppState;
use proflow::core::shared::utils::{create_conn, run_migrations};
use proflow::main_module::run_axum_server;

fn print_usage() {
    println!("Usage: proflow [--config <path>] [--no-migrate]");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .write_style(env_logger::WriteStyle::Always)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    let config_path = match args.iter().position(|a| a == "--config") {
        Some(idx) => match args.get(idx + 1) {
            Some(path) => PathBuf::from(path),
            None => {
                print_usage();
                anyhow::bail!("--config requires a path");
            }
        },
        None => PathBuf::from(DEFAULT_CONFIG_FILE),
    };
    let skip_migrations = args.iter().any(|a| a == "--no-migrate");

    let config = AppConfig::load(&config_path)?;
    info!(
        "Starting ProFlow {} ({})",
        env!("CARGO_PKG_VERSION"),
        config.company.name
    );

    let pool = create_conn(&config.database)?;
    if skip_migrations {
        info!("Skipping database migrations");
    } else {
        run_migrations(&pool).map_err(|e| {
            error!("Failed to run migrations: {e}");
            anyhow::anyhow!("{e}")
        })?;
    }

    let state = Arc::new(AppState::new(config, pool));
    run_axum_server(state).await?;
    info!("Server stopped");
    Ok(())
}
