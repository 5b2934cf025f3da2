//! Runtime configuration for the app shell.

use serde::{Deserialize, Serialize};

use crate::core::repositories::{settings_repository::keys, SettingsRepository};
use crate::errors::AppResult;
use crate::storage::Database;

const DEFAULT_CURRENCY: &str = "USD";
const DEFAULT_LOCALE: &str = "en-US";

/// Explicitly constructed configuration object, loaded once at app start and
/// injected wherever needed. It is never torn down and is mutated only
/// through its own setters, which persist to the app-config table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    dark_mode: bool,
    currency: String,
    locale: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dark_mode: false,
            currency: DEFAULT_CURRENCY.into(),
            locale: DEFAULT_LOCALE.into(),
        }
    }
}

impl AppConfig {
    /// Loads the persisted configuration, falling back to defaults for
    /// anything not yet stored.
    pub fn load(db: &Database) -> AppResult<Self> {
        let defaults = Self::default();
        Ok(Self {
            dark_mode: SettingsRepository::get_bool(db, keys::DARK_MODE)?
                .unwrap_or(defaults.dark_mode),
            currency: SettingsRepository::get(db, keys::CURRENCY)?.unwrap_or(defaults.currency),
            locale: SettingsRepository::get(db, keys::LOCALE)?.unwrap_or(defaults.locale),
        })
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn set_dark_mode(&mut self, db: &Database, dark_mode: bool) -> AppResult<()> {
        SettingsRepository::set_bool(db, keys::DARK_MODE, dark_mode)?;
        self.dark_mode = dark_mode;
        Ok(())
    }

    pub fn set_currency(&mut self, db: &Database, currency: impl Into<String>) -> AppResult<()> {
        let currency = currency.into();
        SettingsRepository::set(db, keys::CURRENCY, &currency)?;
        self.currency = currency;
        Ok(())
    }

    pub fn set_locale(&mut self, db: &Database, locale: impl Into<String>) -> AppResult<()> {
        let locale = locale.into();
        SettingsRepository::set(db, keys::LOCALE, &locale)?;
        self.locale = locale;
        Ok(())
    }
}
