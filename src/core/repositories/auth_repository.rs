//! Local PIN security plus stub hooks for future remote auth and sync.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::errors::{AppError, AppResult};
use crate::storage::Database;

use super::{settings_repository::keys, SettingsRepository};

const PIN_MIN_LEN: usize = 4;
const PIN_MAX_LEN: usize = 8;

pub struct AuthRepository;

impl AuthRepository {
    /// Stores an argon2 hash of the PIN in the app-config table.
    pub fn set_pin(db: &Database, pin: &str) -> AppResult<()> {
        Self::validate_pin(pin)?;
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(pin.as_bytes(), &salt)
            .map_err(|err| AppError::Unknown(format!("failed to hash PIN: {err}")))?
            .to_string();
        SettingsRepository::set(db, keys::PIN_HASH, &hash)
    }

    pub fn is_pin_set(db: &Database) -> AppResult<bool> {
        Ok(SettingsRepository::get(db, keys::PIN_HASH)?.is_some())
    }

    pub fn verify_pin(db: &Database, pin: &str) -> AppResult<bool> {
        let stored = SettingsRepository::get(db, keys::PIN_HASH)?
            .ok_or_else(|| AppError::Unauthorized("PIN is not configured".into()))?;
        let parsed = PasswordHash::new(&stored)
            .map_err(|err| AppError::Unknown(format!("failed to parse stored PIN hash: {err}")))?;
        Ok(Argon2::default()
            .verify_password(pin.as_bytes(), &parsed)
            .is_ok())
    }

    pub fn clear_pin(db: &Database) -> AppResult<()> {
        SettingsRepository::remove(db, keys::PIN_HASH)
    }

    /// Remote sign-in is not wired up in this build.
    pub fn sign_in_remote(_db: &Database, _provider: &str) -> AppResult<()> {
        Err(AppError::Unauthorized(
            "remote auth is not available in this build".into(),
        ))
    }

    /// Cloud sync is not wired up in this build.
    pub fn sync_remote(_db: &Database) -> AppResult<()> {
        Err(AppError::Validation(
            "cloud sync is not available in this build".into(),
        ))
    }

    fn validate_pin(pin: &str) -> AppResult<()> {
        let len_ok = (PIN_MIN_LEN..=PIN_MAX_LEN).contains(&pin.len());
        if !len_ok || !pin.chars().all(|c| c.is_ascii_digit()) {
            return Err(AppError::Validation(format!(
                "PIN must be {PIN_MIN_LEN} to {PIN_MAX_LEN} digits"
            )));
        }
        Ok(())
    }
}
