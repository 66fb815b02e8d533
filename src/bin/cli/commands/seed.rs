use clap::Subcommand;

use crate::client::CardwiseClient;
use crate::output::{self, OutputConfig};

/// Seeding commands
#[derive(Subcommand, Debug)]
pub enum SeedCommands {
    /// Create the administrator account if it is missing
    Admin,
    /// Give the administrator the sample cards
    Cards,
}

pub async fn execute(
    client: &CardwiseClient,
    cmd: SeedCommands,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let report = match cmd {
        SeedCommands::Admin => client.seed("admin").await?,
        SeedCommands::Cards => client.seed("cards").await?,
    };
    output::print_value(&report, config);
    Ok(())
}
