use crate::db::DbPool;
use crate::dto::{CardListQuery, CollectionStats, SportCount, ValueBucket};
use crate::models::Card;
use crate::schema::cards;
use chrono::{Duration, Utc};
use diesel::dsl::{count_star, sum};
use diesel::prelude::*;
use diesel::sqlite::Sqlite;
use anyhow::Result;
use tracing::{instrument, debug, info};

/// Estimated-value ranges reported by [`collection_stats`], lower bound inclusive
pub const VALUE_RANGES: [(&str, f64, Option<f64>); 4] = [
    ("$0-$10", 0.0, Some(10.0)),
    ("$10-$50", 10.0, Some(50.0)),
    ("$50-$100", 50.0, Some(100.0)),
    ("$100+", 100.0, None),
];

/// Inserts a new card into the database
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `card` - The card to insert, as built by [`Card::new`]
///
/// ### Returns
///
/// A Result containing the inserted Card
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The owning user does not exist
/// - The database insert operation fails
#[instrument(skip(pool, card), fields(card_id = %card.get_id(), player = %card.get_player_name()))]
pub fn create_card(pool: &DbPool, card: Card) -> Result<Card> {
    debug!("Creating new card");

    let conn = &mut pool.get()?;

    diesel::insert_into(cards::table)
        .values(&card)
        .execute(conn)?;

    info!("Successfully created card with id: {}", card.get_id());

    Ok(card)
}

/// Inserts several cards in one transaction
///
/// Either every card is stored or none is.
#[instrument(skip(pool, new_cards), fields(count = new_cards.len()))]
pub fn create_cards(pool: &DbPool, new_cards: &[Card]) -> Result<usize> {
    let conn = &mut pool.get()?;

    let inserted = conn.transaction::<_, diesel::result::Error, _>(|conn| {
        diesel::insert_into(cards::table)
            .values(new_cards)
            .execute(conn)
    })?;

    info!("Inserted {} cards", inserted);
    Ok(inserted)
}

/// Retrieves a card from the database by its ID
///
/// ### Returns
///
/// A Result containing an Option with the Card if found, or None if not found
#[instrument(skip(pool), fields(card_id = %card_id))]
pub fn get_card(pool: &DbPool, card_id: &str) -> Result<Option<Card>> {
    debug!("Retrieving card");

    let conn = &mut pool.get()?;

    let result = cards::table
        .find(card_id)
        .select(Card::as_select())
        .first(conn)
        .optional()?;

    if result.is_some() {
        debug!("Card found");
    } else {
        debug!("Card not found");
    }

    Ok(result)
}

/// Builds the filtered card query shared by the page and count queries
fn filtered_cards<'a>(user_id: &'a str, query: &'a CardListQuery) -> cards::BoxedQuery<'a, Sqlite> {
    let mut card_query = cards::table
        .filter(cards::user_id.eq(user_id))
        .into_boxed();

    if let Some(term) = query.search_term() {
        let pattern = format!("%{}%", escape_like(term));
        card_query = card_query.filter(
            cards::player_name.like(pattern.clone()).escape('\\')
                .or(cards::set_name.like(pattern.clone()).escape('\\'))
                .or(cards::manufacturer.like(pattern.clone()).escape('\\'))
                .or(cards::card_number.like(pattern).escape('\\')),
        );
    }

    if let Some(sport) = query.sport_filter() {
        card_query = card_query.filter(cards::sport.eq(sport));
    }

    if let Some(year) = query.year {
        card_query = card_query.filter(cards::year.eq(year));
    }

    if let Some(for_trade) = query.for_trade {
        card_query = card_query.filter(cards::is_for_trade.eq(for_trade));
    }

    card_query
}

/// Escapes the LIKE wildcards in a user-supplied search term
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Lists a user's cards, newest first, with optional filtering and paging
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `user_id` - Owner of the cards
/// * `query` - Search, filter and paging options
///
/// ### Returns
///
/// The requested page of cards and the total number of matching cards
#[instrument(skip(pool, query), fields(user_id = %user_id))]
pub fn list_cards(pool: &DbPool, user_id: &str, query: &CardListQuery) -> Result<(Vec<Card>, i64)> {
    debug!("Listing cards with filters: {:?}", query);

    let conn = &mut pool.get()?;

    let total: i64 = filtered_cards(user_id, query).count().get_result(conn)?;

    let mut page_query = filtered_cards(user_id, query)
        .order((cards::created_at.desc(), cards::id.asc()))
        .select(Card::as_select());

    if let Some(limit) = query.limit.filter(|l| *l > 0) {
        let offset = (query.page() as i64 - 1) * limit as i64;
        page_query = page_query.limit(limit as i64).offset(offset);
    }

    let results = page_query.load(conn)?;

    info!("Retrieved {} of {} matching cards", results.len(), total);
    Ok((results, total))
}

/// Lists every card a user owns, newest first
pub fn list_all_cards(pool: &DbPool, user_id: &str) -> Result<Vec<Card>> {
    list_cards(pool, user_id, &CardListQuery::default()).map(|(cards, _)| cards)
}

/// Counts the cards a user owns
#[instrument(skip(pool), fields(user_id = %user_id))]
pub fn count_cards(pool: &DbPool, user_id: &str) -> Result<i64> {
    let conn = &mut pool.get()?;
    let count = cards::table
        .filter(cards::user_id.eq(user_id))
        .count()
        .get_result(conn)?;
    Ok(count)
}

/// Writes every editable field of `card` back to its row
///
/// ### Errors
///
/// Returns an error if the card no longer exists or the update fails
#[instrument(skip(pool, card), fields(card_id = %card.get_id()))]
pub fn update_card(pool: &DbPool, card: &Card) -> Result<Card> {
    debug!("Updating card");

    let conn = &mut pool.get()?;

    let updated = diesel::update(cards::table.find(card.get_id()))
        .set(card)
        .returning(Card::as_returning())
        .get_result(conn)?;

    info!("Successfully updated card");
    Ok(updated)
}

/// Deletes a card
///
/// ### Returns
///
/// The deleted card, or None if no card had that ID
#[instrument(skip(pool), fields(card_id = %card_id))]
pub fn delete_card(pool: &DbPool, card_id: &str) -> Result<Option<Card>> {
    debug!("Deleting card");

    let conn = &mut pool.get()?;

    let deleted = diesel::delete(cards::table.find(card_id))
        .returning(Card::as_returning())
        .get_result(conn)
        .optional()?;

    if deleted.is_some() {
        info!("Card deleted");
    }
    Ok(deleted)
}

/// Deletes every card a user owns, returning how many were removed
#[instrument(skip(pool), fields(user_id = %user_id))]
pub fn delete_cards_for_user(pool: &DbPool, user_id: &str) -> Result<usize> {
    let conn = &mut pool.get()?;
    let deleted = diesel::delete(cards::table.filter(cards::user_id.eq(user_id))).execute(conn)?;
    info!("Deleted {} cards", deleted);
    Ok(deleted)
}

/// Summarises a user's collection
///
/// Counts, total estimated value, the five newest cards, the cards added in
/// the last 30 days, a per-sport breakdown (largest first) and a histogram
/// of estimated values over [`VALUE_RANGES`].
#[instrument(skip(pool), fields(user_id = %user_id))]
pub fn collection_stats(pool: &DbPool, user_id: &str) -> Result<CollectionStats> {
    let conn = &mut pool.get()?;

    let total_cards: i64 = cards::table.filter(cards::user_id.eq(user_id)).count().get_result(conn)?;

    let total_value: Option<f64> = cards::table
        .filter(cards::user_id.eq(user_id))
        .select(sum(cards::estimated_value))
        .first(conn)?;

    let recent_cards = cards::table
        .filter(cards::user_id.eq(user_id))
        .order((cards::created_at.desc(), cards::id.asc()))
        .limit(5)
        .select(Card::as_select())
        .load(conn)?;

    let month_ago = (Utc::now() - Duration::days(30)).naive_utc();
    let recent_additions: i64 = cards::table
        .filter(cards::user_id.eq(user_id))
        .filter(cards::created_at.ge(month_ago))
        .count()
        .get_result(conn)?;

    let mut sport_breakdown: Vec<SportCount> = cards::table
        .filter(cards::user_id.eq(user_id))
        .group_by(cards::sport)
        .select((cards::sport, count_star()))
        .load::<(String, i64)>(conn)?
        .into_iter()
        .map(|(sport, count)| SportCount { sport, count })
        .collect();
    sport_breakdown.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.sport.cmp(&b.sport)));

    let mut value_distribution = Vec::with_capacity(VALUE_RANGES.len());
    for (range, low, high) in VALUE_RANGES {
        let mut bucket = cards::table
            .filter(cards::user_id.eq(user_id))
            .filter(cards::estimated_value.ge(low))
            .into_boxed();
        if let Some(high) = high {
            bucket = bucket.filter(cards::estimated_value.lt(high));
        }
        let count: i64 = bucket.count().get_result(conn)?;
        value_distribution.push(ValueBucket { range: range.to_string(), count });
    }

    debug!("Collection has {} cards", total_cards);

    Ok(CollectionStats {
        total_cards,
        total_value: total_value.unwrap_or(0.0),
        recent_cards,
        recent_additions,
        sport_breakdown,
        value_distribution,
    })
}
