//! Password handling for user credentials.
//!
//! `Password` is the hashed value object that gets stored. `UserPassword` is
//! what a `User` carries: either the plain text received from a client or the
//! hash loaded from storage.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use serde::{Deserialize, Deserializer};

use crate::error::{DomainError, DomainResult};

/// Hashed password value object.
#[derive(Clone, PartialEq, Eq)]
pub struct Password {
    hash: String,
}

// Don't expose hash in debug output
impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Password")
            .field("hash", &"[REDACTED]")
            .finish()
    }
}

impl Password {
    /// Create a new password by hashing the plain text.
    ///
    /// Any string is accepted, including an empty one.
    ///
    /// # Errors
    /// Returns a password error if argon2 fails to hash.
    pub fn new(plain_text: &str) -> DomainResult<Self> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(plain_text.as_bytes(), &salt)
            .map_err(|e| DomainError::password(format!("Password hash failed: {}", e)))?;

        Ok(Self {
            hash: hash.to_string(),
        })
    }

    /// Wrap a hash read back from the `users` table.
    pub fn from_hash(hash: String) -> Self {
        Self { hash }
    }

    /// Get the hash string for storage.
    pub fn as_str(&self) -> &str {
        &self.hash
    }

    /// Verify a plain text password against this hash.
    pub fn verify(&self, plain_text: &str) -> bool {
        match PasswordHash::new(&self.hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(plain_text.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}

impl From<Password> for String {
    fn from(password: Password) -> Self {
        password.hash
    }
}

/// Password attribute of a user.
///
/// Only ever deserialized (as `Plain`); there is no `Serialize` impl.
#[derive(Clone, PartialEq, Eq)]
pub enum UserPassword {
    /// Received from a client, not yet hashed
    Plain(String),
    /// Hashed, as stored in the database
    Hashed(Password),
}

impl std::fmt::Debug for UserPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserPassword::Plain(_) => f.write_str("Plain([REDACTED])"),
            UserPassword::Hashed(_) => f.write_str("Hashed([REDACTED])"),
        }
    }
}

impl UserPassword {
    /// Hash a plain password; an already hashed one is returned unchanged.
    pub fn seal(self) -> DomainResult<Password> {
        match self {
            UserPassword::Plain(plain) => Password::new(&plain),
            UserPassword::Hashed(password) => Ok(password),
        }
    }

    /// Check a candidate plain text against this password.
    pub fn matches(&self, plain_text: &str) -> bool {
        match self {
            UserPassword::Plain(plain) => plain == plain_text,
            UserPassword::Hashed(password) => password.verify(plain_text),
        }
    }
}

impl<'de> Deserialize<'de> for UserPassword {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(UserPassword::Plain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_and_verify() {
        let plain = "SecurePassword123!";
        let password = Password::new(plain).unwrap();

        assert!(password.verify(plain));
        assert!(!password.verify("WrongPassword123"));
    }

    #[test]
    fn test_same_password_different_salts() {
        let pass1 = Password::new("SamePassword123").unwrap();
        let pass2 = Password::new("SamePassword123").unwrap();

        assert_ne!(pass1.as_str(), pass2.as_str());
        assert!(pass1.verify("SamePassword123"));
        assert!(pass2.verify("SamePassword123"));
    }

    #[test]
    fn test_short_and_empty_passwords_are_hashed() {
        for plain in ["abc", "x", ""] {
            let password = Password::new(plain).unwrap();
            assert_ne!(password.as_str(), plain);
            assert!(password.verify(plain));
        }
    }

    #[test]
    fn test_seal_keeps_existing_hash() {
        let hashed = Password::new("password").unwrap();
        let sealed = UserPassword::Hashed(hashed.clone()).seal().unwrap();
        assert_eq!(sealed, hashed);
    }

    #[test]
    fn test_seal_hashes_plain_text() {
        let sealed = UserPassword::Plain("password".to_string()).seal().unwrap();
        assert_ne!(sealed.as_str(), "password");
        assert!(sealed.verify("password"));
    }

    #[test]
    fn test_debug_is_redacted() {
        let plain = UserPassword::Plain("hunter22".to_string());
        assert!(!format!("{:?}", plain).contains("hunter22"));
    }
}
