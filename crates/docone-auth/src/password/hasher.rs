//! Link password hashing with Argon2id.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, PasswordHash, PasswordVerifier, SaltString};
use argon2::{Argon2, PasswordHasher as _};

use docone_core::error::AppError;
use docone_core::result::AppResult;

/// Produces PHC strings (`$argon2id$...`) with a fresh salt per hash. Only
/// the PHC string is ever stored for a link.
#[derive(Debug, Clone, Default)]
pub struct PasswordHasher {
    argon: Argon2<'static>,
}

impl PasswordHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon
            .hash_password(password.as_bytes(), &salt)
            .map(|phc| phc.to_string())
            .map_err(|e| AppError::internal(format!("Cannot hash link password: {e}")))
    }

    /// `Ok(false)` for a wrong password; `Err` only when `phc` is not a
    /// usable hash.
    pub fn verify_password(&self, password: &str, phc: &str) -> AppResult<bool> {
        let stored = PasswordHash::new(phc)
            .map_err(|e| AppError::internal(format!("Stored link password hash is corrupt: {e}")))?;
        match self.argon.verify_password(password.as_bytes(), &stored) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AppError::internal(format!(
                "Link password verification failed: {e}"
            ))),
        }
    }
}
