//! Typed access to the generic key/value app-config table.

use rusqlite::{params, OptionalExtension};
use serde::{de::DeserializeOwned, Serialize};

use crate::domain::UserProfile;
use crate::errors::AppResult;
use crate::storage::{Database, StoreEvent};

/// Well-known configuration keys.
pub mod keys {
    pub const DARK_MODE: &str = "theme.dark_mode";
    pub const CURRENCY: &str = "app.currency";
    pub const LOCALE: &str = "app.locale";
    pub const PIN_HASH: &str = "security.pin_hash";
    pub const USER_PROFILE: &str = "user.profile";
}

pub struct SettingsRepository;

impl SettingsRepository {
    pub fn get(db: &Database, key: &str) -> AppResult<Option<String>> {
        let value = db
            .conn()
            .query_row(
                "SELECT value FROM app_config WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn set(db: &Database, key: &str, value: &str) -> AppResult<()> {
        db.conn().execute(
            "INSERT INTO app_config (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        db.emit(StoreEvent::Settings);
        Ok(())
    }

    /// Removing an absent key is a no-op.
    pub fn remove(db: &Database, key: &str) -> AppResult<()> {
        let removed = db
            .conn()
            .execute("DELETE FROM app_config WHERE key = ?1", params![key])?;
        if removed > 0 {
            db.emit(StoreEvent::Settings);
        }
        Ok(())
    }

    pub fn get_bool(db: &Database, key: &str) -> AppResult<Option<bool>> {
        Ok(Self::get(db, key)?.map(|value| value == "true"))
    }

    pub fn set_bool(db: &Database, key: &str, value: bool) -> AppResult<()> {
        Self::set(db, key, if value { "true" } else { "false" })
    }

    pub fn get_json<T: DeserializeOwned>(db: &Database, key: &str) -> AppResult<Option<T>> {
        match Self::get(db, key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn set_json<T: Serialize>(db: &Database, key: &str, value: &T) -> AppResult<()> {
        Self::set(db, key, &serde_json::to_string(value)?)
    }

    /// The single local user; defaults apply until a profile is saved.
    pub fn profile(db: &Database) -> AppResult<UserProfile> {
        Ok(Self::get_json(db, keys::USER_PROFILE)?.unwrap_or_default())
    }

    pub fn set_profile(db: &Database, profile: &UserProfile) -> AppResult<()> {
        Self::set_json(db, keys::USER_PROFILE, profile)
    }
}
