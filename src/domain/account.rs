use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;

/// Represents a money holding tracked by the local user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub kind: AccountKind,
    pub currency: String,
    pub opening_balance: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn new(name: impl Into<String>, kind: AccountKind, currency: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            currency: currency.into(),
            opening_balance: 0.0,
            note: None,
            is_archived: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_opening_balance(mut self, opening_balance: f64) -> Self {
        self.opening_balance = opening_balance;
        self
    }
}

impl Identifiable for Account {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for Account {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for Account {
    fn display_label(&self) -> String {
        format!("{} ({})", self.name, self.kind.as_str())
    }
}

/// Enumerates the supported account classifications.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AccountKind {
    Cash,
    Bank,
    Savings,
    Card,
    Wallet,
}

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Cash => "cash",
            AccountKind::Bank => "bank",
            AccountKind::Savings => "savings",
            AccountKind::Card => "card",
            AccountKind::Wallet => "wallet",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "cash" => Some(AccountKind::Cash),
            "bank" => Some(AccountKind::Bank),
            "savings" => Some(AccountKind::Savings),
            "card" => Some(AccountKind::Card),
            "wallet" => Some(AccountKind::Wallet),
            _ => None,
        }
    }
}

impl ToSql for AccountKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for AccountKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let raw = value.as_str()?;
        AccountKind::parse(raw).ok_or(FromSqlError::InvalidType)
    }
}
