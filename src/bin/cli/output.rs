use cardwise::dto::{CardPage, CollectionStats};
use cardwise::models::{Card, ScanJob, ScanProgress, WishlistItem};
use clap::ValueEnum;
use serde::Serialize;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

/// Bundled output configuration passed to all print functions
#[derive(Debug, Clone, Copy)]
pub struct OutputConfig {
    /// The output format
    pub format: OutputFormat,
    /// When true, print minimal output (just IDs or counts)
    pub quiet: bool,
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("Failed to encode output: {}", e),
    }
}

fn money(value: f64) -> String {
    format!("${:.2}", value)
}

/// Prints a page of cards in the specified format
pub fn print_cards(page: &CardPage, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if page.cards.is_empty() {
                if !config.quiet {
                    println!("No cards found.");
                }
                return;
            }
            if config.quiet {
                for card in &page.cards {
                    println!("{}", card.get_id());
                }
                return;
            }
            let max_id = page.cards.iter().map(|c| c.get_id().len()).max().unwrap_or(2);
            let max_player = page
                .cards
                .iter()
                .map(|c| c.get_player_name().len())
                .max()
                .unwrap_or(6)
                .max(6);
            println!(
                "{:<id_w$}  {:<player_w$}  {:<10}  {:>4}  {:<10}  {:>10}",
                "ID",
                "PLAYER",
                "SPORT",
                "YEAR",
                "CONDITION",
                "VALUE",
                id_w = max_id,
                player_w = max_player,
            );
            for card in &page.cards {
                println!(
                    "{:<id_w$}  {:<player_w$}  {:<10}  {:>4}  {:<10}  {:>10}",
                    card.get_id(),
                    card.get_player_name(),
                    card.get_sport(),
                    card.get_year(),
                    card.get_condition().overall.as_str(),
                    money(card.get_estimated_value()),
                    id_w = max_id,
                    player_w = max_player,
                );
            }
            println!();
            println!(
                "Page {} of {} ({} cards)",
                page.page,
                page.total_pages.max(1),
                page.total
            );
        }
        OutputFormat::Json => print_json(page),
    }
}

/// Prints a single card in the specified format
pub fn print_card(card: &Card, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if config.quiet {
                println!("{}", card.get_id());
                return;
            }
            let condition = card.get_condition();
            println!("ID:           {}", card.get_id());
            println!("Player:       {}", card.get_player_name());
            println!("Sport:        {}", card.get_sport());
            println!("Year:         {}", card.get_year());
            println!("Set:          {} {} #{}", card.get_manufacturer(), card.get_set_name(), card.get_card_number());
            println!(
                "Condition:    {} (centering {}, corners {}, edges {}, surface {})",
                condition.overall, condition.centering, condition.corners, condition.edges, condition.surface
            );
            println!("Value:        {} (market {})", money(card.get_estimated_value()), money(card.get_market_value()));
            if !card.get_tags().is_empty() {
                println!("Tags:         {}", card.get_tags().join(", "));
            }
            if let Some(lot) = card.get_lot_number() {
                println!("Lot:          {}", lot);
            }
            if !card.get_notes().is_empty() {
                println!("Notes:        {}", card.get_notes());
            }
            println!("Created:      {}", card.get_created_at().format("%Y-%m-%d %H:%M"));
        }
        OutputFormat::Json => print_json(card),
    }
}

/// Prints the collection summary
pub fn print_stats(stats: &CollectionStats, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if config.quiet {
                println!("{}", stats.total_cards);
                return;
            }
            println!("Cards:          {}", stats.total_cards);
            println!("Total value:    {}", money(stats.total_value));
            println!("Added (30 days): {}", stats.recent_additions);
            if !stats.sport_breakdown.is_empty() {
                println!();
                println!("By sport:");
                for sport in &stats.sport_breakdown {
                    println!("  {:<14} {:>6}", sport.sport, sport.count);
                }
            }
            if !stats.value_distribution.is_empty() {
                println!();
                println!("By value:");
                for bucket in &stats.value_distribution {
                    println!("  {:<14} {:>6}", bucket.range, bucket.count);
                }
            }
        }
        OutputFormat::Json => print_json(stats),
    }
}

/// Prints the wishlist in the specified format
pub fn print_wishlist(items: &[WishlistItem], config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if items.is_empty() {
                if !config.quiet {
                    println!("Wishlist is empty.");
                }
                return;
            }
            if config.quiet {
                for item in items {
                    println!("{}", item.get_id());
                }
                return;
            }
            let max_id = items.iter().map(|i| i.get_id().len()).max().unwrap_or(2);
            println!("{:<id_w$}  {:<8}  {:<10}  {:>10}  PLAYER", "ID", "PRIORITY", "SPORT", "MAX PRICE", id_w = max_id);
            for item in items {
                let max_price = item.get_max_price().map(money).unwrap_or_else(|| "-".to_string());
                println!(
                    "{:<id_w$}  {:<8}  {:<10}  {:>10}  {}",
                    item.get_id(),
                    item.get_priority(),
                    item.get_sport(),
                    max_price,
                    item.get_player_name(),
                    id_w = max_id,
                );
            }
        }
        OutputFormat::Json => print_json(items),
    }
}

pub fn print_wishlist_item(item: &WishlistItem, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if config.quiet {
                println!("{}", item.get_id());
                return;
            }
            println!("ID:        {}", item.get_id());
            println!("Player:    {}", item.get_player_name());
            println!("Sport:     {}", item.get_sport());
            if let Some(year) = item.get_year() {
                println!("Year:      {}", year);
            }
            println!("Priority:  {}", item.get_priority());
            if let Some(max_price) = item.get_max_price() {
                println!("Max price: {}", money(max_price));
            }
            println!("Added:     {}", item.get_date_added().format("%Y-%m-%d %H:%M"));
        }
        OutputFormat::Json => print_json(item),
    }
}

/// Prints scan jobs, newest first as the server returns them
pub fn print_scan_jobs(jobs: &[ScanJob], config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if jobs.is_empty() {
                if !config.quiet {
                    println!("No scan jobs.");
                }
                return;
            }
            if config.quiet {
                for job in jobs {
                    println!("{}", job.id);
                }
                return;
            }
            let max_id = jobs.iter().map(|j| j.id.len()).max().unwrap_or(2);
            println!("{:<id_w$}  {:<10}  {:>9}  {:>5}  {:>6}  NAME", "ID", "STATUS", "PROCESSED", "SAVED", "FAILED", id_w = max_id);
            for job in jobs {
                println!(
                    "{:<id_w$}  {:<10}  {:>9}  {:>5}  {:>6}  {}",
                    job.id,
                    job.status,
                    format!("{}/{}", job.processed_cards, job.total_cards),
                    job.saved_cards,
                    job.failed_cards,
                    job.job_name,
                    id_w = max_id,
                );
            }
        }
        OutputFormat::Json => print_json(jobs),
    }
}

pub fn print_scan_job(job: &ScanJob, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if config.quiet {
                println!("{}", job.id);
                return;
            }
            println!("Job:        {}", job.id);
            println!("Name:       {}", job.job_name);
            println!("Folder:     {}", job.folder_path);
            println!("Status:     {}", job.status);
            println!("Threshold:  {:.2}", job.settings.confidence_threshold);
            if let Some(ref error) = job.error {
                println!("Error:      {}", error);
            }
        }
        OutputFormat::Json => print_json(job),
    }
}

pub fn print_progress(progress: &ScanProgress, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if config.quiet {
                println!("{}/{}", progress.current_card, progress.total_cards);
                return;
            }
            println!("Job:        {}", progress.job_id);
            println!("Status:     {}", progress.status);
            println!("Progress:   {}/{}", progress.current_card, progress.total_cards);
            println!("Elapsed:    {}s", progress.processing_time);
            if progress.estimated_time_remaining > 0 {
                println!("Remaining:  ~{}s", progress.estimated_time_remaining);
            }
        }
        OutputFormat::Json => print_json(progress),
    }
}

/// Prints a free-form JSON document, such as a settings section or a seed report
pub fn print_value(value: &serde_json::Value, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human if config.quiet => {
            if let Some(message) = value.get("message").and_then(|m| m.as_str()) {
                println!("{}", message);
            }
        }
        _ => print_json(value),
    }
}

/// Prints a simple success message (for operations that don't return data)
pub fn print_success(message: &str, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if !config.quiet {
                println!("{}", message);
            }
        }
        OutputFormat::Json => print_json(&serde_json::json!({"status": "ok", "message": message})),
    }
}
