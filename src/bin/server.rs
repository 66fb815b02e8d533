//! CardWise API server

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use cardwise::config::{get_config, CliArgs};
use cardwise::maintenance::{spawn_backup_task, BackupSettings};
use cardwise::scan::OllamaClient;
use cardwise::{create_app, db, logging, run_migrations, seed, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    if dotenv::dotenv().is_ok() {
        println!("Loaded .env file");
    }

    let args = CliArgs::parse();
    // Logging is configured from the config, so a bad config is reported on stderr
    let config = get_config(&args).map_err(anyhow::Error::msg)?;
    let _log_guard = logging::init_logging(args.debug, args.log_json, config.log_dir.as_deref().map(Path::new));

    info!("Starting CardWise server");
    info!("Database: {}", config.database_url);

    // Initialize the database pool and bring the schema up to date
    let pool = Arc::new(db::init_pool(&config.database_url)?);
    {
        let mut conn = pool.get().context("Failed to get a database connection")?;
        run_migrations(&mut conn)?;
    }

    if config.seed_on_startup {
        let admin = seed::seed_admin_user(&pool)?;
        info!("{}", admin.message);
        let cards = seed::seed_sample_cards(&pool)?;
        info!("{}", cards.message);
    }

    let backups = BackupSettings {
        dir: PathBuf::from(&config.backup_dir),
        keep: config.backup_count as usize,
    };
    match config.backup_interval() {
        Some(interval) => {
            spawn_backup_task(pool.clone(), backups.clone(), interval);
        }
        None => warn!("Scheduled backups are disabled"),
    }

    let analyzer = Arc::new(OllamaClient::new(&config.ollama_host, &config.ollama_model)?);
    let app = create_app(AppState::new(pool, analyzer, backups));

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server running at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
