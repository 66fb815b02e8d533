use crate::db::DbPool;
use crate::models::WishlistItem;
use crate::schema::wishlist_items;
use diesel::prelude::*;
use anyhow::Result;
use tracing::{instrument, debug, info};

/// Inserts a new wishlist item
#[instrument(skip(pool, item), fields(item_id = %item.get_id(), player = %item.get_player_name()))]
pub fn create_wishlist_item(pool: &DbPool, item: WishlistItem) -> Result<WishlistItem> {
    let conn = &mut pool.get()?;

    diesel::insert_into(wishlist_items::table)
        .values(&item)
        .execute(conn)?;

    info!("Added wishlist item with id: {}", item.get_id());
    Ok(item)
}

/// Retrieves a wishlist item by its ID
#[instrument(skip(pool), fields(item_id = %item_id))]
pub fn get_wishlist_item(pool: &DbPool, item_id: &str) -> Result<Option<WishlistItem>> {
    let conn = &mut pool.get()?;

    let item = wishlist_items::table
        .find(item_id)
        .select(WishlistItem::as_select())
        .first(conn)
        .optional()?;

    debug!("Wishlist item found: {}", item.is_some());
    Ok(item)
}

/// Lists a user's wishlist, most recently added first
#[instrument(skip(pool), fields(user_id = %user_id))]
pub fn list_wishlist_items(pool: &DbPool, user_id: &str) -> Result<Vec<WishlistItem>> {
    let conn = &mut pool.get()?;

    let items = wishlist_items::table
        .filter(wishlist_items::user_id.eq(user_id))
        .order((wishlist_items::date_added.desc(), wishlist_items::id.asc()))
        .select(WishlistItem::as_select())
        .load(conn)?;

    info!("Retrieved {} wishlist items", items.len());
    Ok(items)
}

/// Writes the editable fields of `item` back to its row
#[instrument(skip(pool, item), fields(item_id = %item.get_id()))]
pub fn update_wishlist_item(pool: &DbPool, item: &WishlistItem) -> Result<WishlistItem> {
    let conn = &mut pool.get()?;

    let updated = diesel::update(wishlist_items::table.find(item.get_id()))
        .set(item)
        .returning(WishlistItem::as_returning())
        .get_result(conn)?;

    info!("Updated wishlist item");
    Ok(updated)
}

/// Removes a wishlist item, returning whether a row was deleted
#[instrument(skip(pool), fields(item_id = %item_id))]
pub fn delete_wishlist_item(pool: &DbPool, item_id: &str) -> Result<bool> {
    let conn = &mut pool.get()?;

    let deleted = diesel::delete(wishlist_items::table.find(item_id)).execute(conn)?;

    debug!("Deleted {} wishlist rows", deleted);
    Ok(deleted > 0)
}

/// Removes every wishlist item a user owns
#[instrument(skip(pool), fields(user_id = %user_id))]
pub fn delete_wishlist_for_user(pool: &DbPool, user_id: &str) -> Result<usize> {
    let conn = &mut pool.get()?;
    let deleted = diesel::delete(wishlist_items::table.filter(wishlist_items::user_id.eq(user_id)))
        .execute(conn)?;
    info!("Deleted {} wishlist items", deleted);
    Ok(deleted)
}
