use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An account that owns cards and wishlist items
///
/// The API has no sign-in, so in practice only the seeded administrator exists.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    id: String,
    email: String,
    #[serde(skip_serializing)]
    password_hash: String,
    first_name: String,
    last_name: String,
    role: String,
    is_active: bool,
    created_at: NaiveDateTime,
}

impl User {
    /// Creates a new active user
    ///
    /// ### Arguments
    ///
    /// * `email` - Login address, stored lowercased
    /// * `password_hash` - Output of [`crate::password::hash_password`]
    /// * `first_name`, `last_name` - Display names
    /// * `role` - `admin` or `user`
    pub fn new(
        email: &str,
        password_hash: String,
        first_name: &str,
        last_name: &str,
        role: &str,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.trim().to_lowercase(),
            password_hash,
            first_name: first_name.trim().to_string(),
            last_name: last_name.trim().to_string(),
            role: role.to_string(),
            is_active: true,
            created_at: Utc::now().naive_utc(),
        }
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_email(&self) -> &str {
        &self.email
    }

    pub fn get_password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn get_first_name(&self) -> &str {
        &self.first_name
    }

    pub fn get_last_name(&self) -> &str {
        &self.last_name
    }

    pub fn get_role(&self) -> &str {
        &self.role
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_is_never_serialized() {
        let user = User::new(" Admin@CardWise.com ", "salt$digest".to_string(), "Admin", "User", "admin");
        let json = serde_json::to_value(&user).unwrap();

        assert_eq!(json["email"], "admin@cardwise.com");
        assert_eq!(json["firstName"], "Admin");
        assert_eq!(json["isActive"], true);
        assert!(json.get("passwordHash").is_none());
        assert_eq!(user.get_password_hash(), "salt$digest");
    }
}
