use std::path::PathBuf;

use clap::{Subcommand, ValueEnum};

use crate::client::CardwiseClient;
use crate::output::{self, OutputConfig};

/// Settings sections the server stores
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Section {
    Ebay,
    Tcgplayer,
    Notifications,
    Scanning,
}

impl Section {
    fn path(self) -> &'static str {
        match self {
            Section::Ebay => "ebay",
            Section::Tcgplayer => "tcgplayer",
            Section::Notifications => "notifications",
            Section::Scanning => "scanning",
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ExportFormat {
    Json,
    Csv,
}

/// Settings and maintenance commands
#[derive(Subcommand, Debug)]
pub enum SettingsCommands {
    /// Show one settings section
    Get {
        #[clap(value_enum)]
        section: Section,
    },
    /// Download the whole collection
    Export {
        #[clap(long, value_enum, default_value_t = ExportFormat::Json)]
        export_format: ExportFormat,
        /// Write to this file instead of stdout
        #[clap(long, short)]
        output: Option<PathBuf>,
    },
    /// Write a database backup on the server
    Backup,
}

/// Executes a settings command
pub async fn execute(
    client: &CardwiseClient,
    cmd: SettingsCommands,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        SettingsCommands::Get { section } => {
            let value = client.get_settings(section.path()).await?;
            output::print_value(&value, config);
        }
        SettingsCommands::Export { export_format, output: destination } => {
            let format = match export_format {
                ExportFormat::Json => "json",
                ExportFormat::Csv => "csv",
            };
            let body = client.export_collection(format).await?;
            match destination {
                Some(path) => {
                    tokio::fs::write(&path, body).await?;
                    output::print_success(&format!("Exported collection to {}", path.display()), config);
                }
                None => print!("{}", body),
            }
        }
        SettingsCommands::Backup => {
            let path = client.backup().await?;
            output::print_success(&format!("Backup written to {}", path), config);
        }
    }
    Ok(())
}
