use cardwise::dto::WishlistItemDto;
use cardwise::models::WishlistPriority;
use clap::Subcommand;

use crate::client::CardwiseClient;
use crate::output::{self, OutputConfig};

/// Wishlist commands
#[derive(Subcommand, Debug)]
pub enum WishlistCommands {
    /// List the wishlist, newest first
    List,
    /// Add a card to the wishlist
    Add {
        /// Name of the player
        #[clap(long)]
        player: String,
        /// Sport the card belongs to
        #[clap(long)]
        sport: String,
        #[clap(long)]
        year: Option<i32>,
        #[clap(long)]
        manufacturer: Option<String>,
        #[clap(long)]
        set_name: Option<String>,
        /// low, medium or high
        #[clap(long)]
        priority: Option<WishlistPriority>,
        /// Most you would pay, in dollars
        #[clap(long)]
        max_price: Option<f64>,
        #[clap(long)]
        notes: Option<String>,
    },
    /// Remove an item from the wishlist
    Remove {
        /// The wishlist item ID
        id: String,
    },
}

/// Executes a wishlist command
pub async fn execute(
    client: &CardwiseClient,
    cmd: WishlistCommands,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        WishlistCommands::List => {
            let items = client.list_wishlist().await?;
            output::print_wishlist(&items, config);
        }
        WishlistCommands::Add {
            player,
            sport,
            year,
            manufacturer,
            set_name,
            priority,
            max_price,
            notes,
        } => {
            let dto = WishlistItemDto {
                player_name: Some(player),
                sport: Some(sport),
                year,
                manufacturer,
                set_name,
                priority,
                max_price,
                notes,
                ..Default::default()
            };
            let item = client.add_wishlist_item(dto).await?;
            output::print_wishlist_item(&item, config);
        }
        WishlistCommands::Remove { id } => {
            let message = client.remove_wishlist_item(&id).await?;
            output::print_success(&message, config);
        }
    }
    Ok(())
}
