//! Password hashes as stored in the config (`auth.users.<name>`):
//! salted Argon2id PHC strings.

use argon2::{
    password_hash::{
        rand_core::OsRng,
        PasswordHash, PasswordHasher, PasswordVerifier, SaltString
    },
    Argon2
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HashingError {
    #[error("argon2 hashing error: {0}")]
    Argon2(argon2::password_hash::Error),
}

impl From<argon2::password_hash::Error> for HashingError {
    fn from(e: argon2::password_hash::Error) -> Self {
        HashingError::Argon2(e)
    }
}

pub fn create_password_hash(password: &str) -> Result<String, HashingError> {
    let salt = SaltString::generate(&mut OsRng);
    // default params, Argon2id v19
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// A wrong password is `Ok(false)`; an unparseable stored hash is an
/// error.
pub fn verify_password(password: &str, existing_hash: &str) -> Result<bool, HashingError> {
    let parsed = PasswordHash::new(existing_hash.trim())?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e.into()),
    }
}
