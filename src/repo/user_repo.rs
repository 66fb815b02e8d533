use crate::db::DbPool;
use crate::models::User;
use crate::schema::users;
use diesel::prelude::*;
use anyhow::Result;
use tracing::{instrument, debug, info};

/// Inserts a new user
///
/// ### Errors
///
/// Returns an error if the email is already taken or the insert fails
#[instrument(skip(pool, user), fields(email = %user.get_email()))]
pub fn create_user(pool: &DbPool, user: User) -> Result<User> {
    let conn = &mut pool.get()?;

    diesel::insert_into(users::table)
        .values(&user)
        .execute(conn)?;

    info!("Created user with id: {}", user.get_id());
    Ok(user)
}

/// Looks a user up by email, ignoring case
#[instrument(skip(pool))]
pub fn get_user_by_email(pool: &DbPool, email: &str) -> Result<Option<User>> {
    let conn = &mut pool.get()?;

    let user = users::table
        .filter(users::email.eq(email.trim().to_lowercase()))
        .select(User::as_select())
        .first(conn)
        .optional()?;

    debug!("User found: {}", user.is_some());
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::tests::setup_test_db;

    #[test]
    fn test_create_and_find_user() {
        let pool = setup_test_db();
        let user = User::new("Someone@Example.com", "s$h".to_string(), "Some", "One", "user");
        create_user(&pool, user.clone()).unwrap();

        let found = get_user_by_email(&pool, "someone@example.COM").unwrap().unwrap();
        assert_eq!(found.get_id(), user.get_id());
        assert_eq!(found.get_password_hash(), "s$h");

        assert!(get_user_by_email(&pool, "nobody@example.com").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let pool = setup_test_db();
        create_user(&pool, User::new("a@b.c", "x".to_string(), "A", "B", "user")).unwrap();
        assert!(create_user(&pool, User::new("a@b.c", "y".to_string(), "A", "B", "user")).is_err());
    }
}
