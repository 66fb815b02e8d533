use cardwise::dto::CardListQuery;
use clap::Subcommand;

use crate::client::CardwiseClient;
use crate::output::{self, OutputConfig};

/// Collection commands
#[derive(Subcommand, Debug)]
pub enum CardCommands {
    /// List cards with optional filters
    List {
        /// Page number, starting at 1
        #[clap(long)]
        page: Option<u32>,
        /// Cards per page (all cards when omitted)
        #[clap(long)]
        limit: Option<u32>,
        /// Text matched against player, set, manufacturer and card number
        #[clap(long)]
        search: Option<String>,
        /// Only cards of this sport
        #[clap(long)]
        sport: Option<String>,
        /// Only cards from this year
        #[clap(long)]
        year: Option<i32>,
        /// Only cards marked for trade
        #[clap(long)]
        for_trade: bool,
    },
    /// Get a specific card by ID
    Get {
        /// The card ID
        id: String,
    },
    /// Delete a card
    Delete {
        /// The card ID
        id: String,
    },
    /// Show collection totals and breakdowns
    Stats,
}

/// Executes a card command
pub async fn execute(
    client: &CardwiseClient,
    cmd: CardCommands,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        CardCommands::List {
            page,
            limit,
            search,
            sport,
            year,
            for_trade,
        } => {
            let query = CardListQuery {
                page,
                limit,
                search,
                sport,
                year,
                for_trade: for_trade.then_some(true),
            };
            let page = client.list_cards(&query).await?;
            output::print_cards(&page, config);
        }
        CardCommands::Get { id } => {
            let card = client.get_card(&id).await?;
            output::print_card(&card, config);
        }
        CardCommands::Delete { id } => {
            let message = client.delete_card(&id).await?;
            output::print_success(&message, config);
        }
        CardCommands::Stats => {
            let stats = client.card_stats().await?;
            output::print_stats(&stats, config);
        }
    }
    Ok(())
}
