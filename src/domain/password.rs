//! Password hashing for local accounts.
//!
//! Hashes are Argon2id PHC strings with a random salt. Google-only accounts
//! carry no hash at all, see [`super::User::verify_password`].

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use once_cell::sync::Lazy;

use crate::config::MIN_PASSWORD_LENGTH;
use crate::errors::{AppError, AppResult};

/// Verified against when a login names an unknown email, so that path costs
/// the same as a wrong password.
static DUMMY_HASH: Lazy<Option<String>> =
    Lazy::new(|| hash_plain("never-a-real-password").ok());

/// A stored password hash
#[derive(Clone, PartialEq, Eq)]
pub struct Password {
    hash: String,
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password([REDACTED])")
    }
}

impl Password {
    /// Hash a new password. Fewer than six characters is a validation error.
    pub fn new(plain_text: &str) -> AppResult<Self> {
        if plain_text.chars().count() < MIN_PASSWORD_LENGTH as usize {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }

        Ok(Self {
            hash: hash_plain(plain_text)?,
        })
    }

    /// Wrap a hash loaded from the `users` table
    pub fn from_hash(hash: String) -> Self {
        Self { hash }
    }

    pub fn as_str(&self) -> &str {
        &self.hash
    }

    pub fn into_string(self) -> String {
        self.hash
    }

    /// A malformed stored hash never matches.
    pub fn verify(&self, plain_text: &str) -> bool {
        matches_hash(plain_text, &self.hash)
    }

    /// Spend one verification on a throwaway hash.
    pub fn verify_dummy(plain_text: &str) {
        if let Some(hash) = DUMMY_HASH.as_deref() {
            let _ = matches_hash(plain_text, hash);
        }
    }
}

fn hash_plain(plain_text: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain_text.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::internal(format!("Password hash failed: {}", e)))
}

fn matches_hash(plain_text: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(plain_text.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!(error = %e, "Stored password hash is malformed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let password = Password::new("owner123").unwrap();

        assert!(password.verify("owner123"));
        assert!(!password.verify("owner124"));
    }

    #[test]
    fn test_stored_hash_round_trips() {
        let stored = Password::new("guest-pass").unwrap().into_string();

        assert!(Password::from_hash(stored).verify("guest-pass"));
    }

    #[test]
    fn test_salts_differ() {
        let a = Password::new("samesame").unwrap();
        let b = Password::new("samesame").unwrap();

        assert_ne!(a, b);
        assert!(a.verify("samesame") && b.verify("samesame"));
    }

    #[test]
    fn test_length_is_counted_in_characters() {
        assert!(Password::new("12345").is_err());
        assert!(Password::new("123456").is_ok());
        assert!(Password::new("äöüßé").is_err());
    }

    #[test]
    fn test_malformed_hash_never_matches() {
        assert!(!Password::from_hash("not-a-phc-string".into()).verify("anything"));
    }

    #[test]
    fn test_debug_hides_hash() {
        let password = Password::new("secret123").unwrap();
        assert_eq!(format!("{:?}", password), "Password([REDACTED])");
    }

    #[test]
    fn test_verify_dummy_does_not_panic() {
        Password::verify_dummy("whatever");
    }
}
