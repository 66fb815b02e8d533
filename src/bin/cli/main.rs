mod client;
mod commands;
mod output;

use cardwise::config;
use clap::{Parser, Subcommand};
use client::CardwiseClient;
use output::{OutputConfig, OutputFormat};
use std::process;

/// CLI for a CardWise server
#[derive(Parser, Debug)]
#[clap(name = "cardwise-cli", about = "CLI for the CardWise sports card server")]
struct Cli {
    /// Server URL to connect to
    #[clap(
        long,
        env = "CARDWISE_URL",
        global = true
    )]
    server_url: Option<String>,

    /// Output format
    #[clap(long, value_enum, default_value_t = OutputFormat::Human, global = true)]
    format: OutputFormat,

    /// Quiet mode: minimal output (just IDs or counts)
    #[clap(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Browse the collection
    #[command(subcommand)]
    Card(commands::card::CardCommands),
    /// Manage the wishlist
    #[command(subcommand)]
    Wishlist(commands::wishlist::WishlistCommands),
    /// Run and watch batch scans
    #[command(subcommand)]
    Scan(commands::scan::ScanCommands),
    /// Settings, exports and backups
    #[command(subcommand)]
    Settings(commands::settings::SettingsCommands),
    /// Load initial data
    #[command(subcommand)]
    Seed(commands::seed::SeedCommands),
}

/// Resolves the server URL from CLI args, config file, or defaults
///
/// Precedence: CLI flag / env var > `server_url` in the config file >
/// localhost on the configured port > localhost:3000
fn resolve_server_url(cli_url: Option<String>) -> String {
    if let Some(url) = cli_url {
        return url;
    }

    let update = config::config_from_file(config::default_config_file()).unwrap_or_default();
    if let Some(url) = update.server_url {
        return url;
    }

    format!("http://localhost:{}", update.port.unwrap_or(3000))
}

/// Formats an error for human-readable stderr output
fn format_error(err: &dyn std::error::Error) -> String {
    let err_string = err.to_string();

    if err_string.contains("error sending request")
        || err_string.contains("connection refused")
        || err_string.contains("Connection refused")
        || err_string.contains("tcp connect error")
    {
        return format!(
            "Could not connect to server. Is cardwise running?\n  {}",
            err_string
        );
    }

    err_string
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let server_url = resolve_server_url(cli.server_url);
    let client = CardwiseClient::new(server_url);
    let output_config = OutputConfig {
        format: cli.format,
        quiet: cli.quiet,
    };

    let result = match cli.command {
        Commands::Card(cmd) => commands::card::execute(&client, cmd, &output_config).await,
        Commands::Wishlist(cmd) => commands::wishlist::execute(&client, cmd, &output_config).await,
        Commands::Scan(cmd) => commands::scan::execute(&client, cmd, &output_config).await,
        Commands::Settings(cmd) => commands::settings::execute(&client, cmd, &output_config).await,
        Commands::Seed(cmd) => commands::seed::execute(&client, cmd, &output_config).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", format_error(e.as_ref()));
        process::exit(1);
    }
}
