use std::fmt;

use actix_web::web;
use argon2::{
    Argon2,
    password_hash::{
        self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use derive_more::Display;

#[derive(Debug, Display)]
pub enum PasswordError {
    #[display(fmt = "password hashing failed: {}", _0)]
    Hash(password_hash::Error),
    #[display(fmt = "stored password hash is malformed: {}", _0)]
    Malformed(password_hash::Error),
    #[display(fmt = "blocking thread pool is unavailable")]
    Blocking,
}

impl std::error::Error for PasswordError {}

/// Salted Argon2 hash in PHC string form. The salt is embedded in the string.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    /// Hashes `password` with a fresh random salt. This is deliberately slow.
    pub fn compute(password: &str) -> Result<Self, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| Self(hash.to_string()))
            .map_err(PasswordError::Hash)
    }

    /// Runs [`PasswordDigest::compute`] on the blocking pool.
    pub async fn compute_blocking(password: String) -> Result<Self, PasswordError> {
        web::block(move || Self::compute(&password))
            .await
            .map_err(|_| PasswordError::Blocking)?
    }

    /// Wraps a hash previously produced by [`PasswordDigest::compute`].
    pub(crate) fn from_stored(hash: String) -> Self {
        Self(hash)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Checks `password` against this digest. A mismatch is `Ok(false)`.
    pub fn verify(&self, password: &str) -> Result<bool, PasswordError> {
        let parsed = PasswordHash::new(&self.0).map_err(PasswordError::Malformed)?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(PasswordError::Hash(e)),
        }
    }

    pub async fn verify_blocking(self, password: String) -> Result<bool, PasswordError> {
        web::block(move || self.verify(&password))
            .await
            .map_err(|_| PasswordError::Blocking)?
    }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordDigest(<redacted>)")
    }
}
