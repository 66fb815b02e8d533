//! Password hashing for user accounts
//!
//! Hashes are bcrypt strings (`$2b$12$...`) that carry their own salt and cost.

pub use bcrypt::BcryptError;

/// Work factor for new hashes
pub const HASH_COST: u32 = 12;

/// Hashes a password with a fresh random salt
pub fn hash_password(password: &str) -> Result<String, BcryptError> {
    bcrypt::hash(password, HASH_COST)
}

/// Checks a password against a stored hash; malformed hashes never verify
pub fn verify_password(password: &str, stored: &str) -> bool {
    bcrypt::verify(password, stored).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_format() {
        let hash = hash_password("admin123").unwrap();
        assert!(hash.starts_with("$2b$12$"), "{}", hash);
        assert_eq!(hash.len(), 60);
    }

    #[test]
    fn test_verify() {
        let hash = hash_password("admin123").unwrap();
        assert!(verify_password("admin123", &hash));
        assert!(!verify_password("admin124", &hash));
    }

    #[test]
    fn test_salts_differ() {
        assert_ne!(hash_password("same").unwrap(), hash_password("same").unwrap());
    }

    #[test]
    fn test_malformed_hashes_fail() {
        assert!(!verify_password("x", "no-separator"));
        assert!(!verify_password("x", "$2b$12$short"));
        assert!(!verify_password("x", ""));
    }
}
