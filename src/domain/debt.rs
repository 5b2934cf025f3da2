use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;

/// Money owed to or lent by the local user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Debt {
    pub id: Uuid,
    pub name: String,
    pub kind: DebtKind,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    pub is_settled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Debt {
    pub fn new(name: impl Into<String>, kind: DebtKind, amount: f64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            amount,
            note: None,
            due_date: None,
            is_settled: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn remaining(&self, paid_total: f64) -> f64 {
        (self.amount - paid_total).max(0.0)
    }

    pub fn percent_paid(&self, paid_total: f64) -> f64 {
        if self.amount.abs() < f64::EPSILON {
            100.0
        } else {
            ((paid_total / self.amount) * 100.0).min(100.0)
        }
    }
}

impl Identifiable for Debt {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for Debt {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Whether the local user owes the money or is owed it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DebtKind {
    Owed,
    Lent,
}

impl DebtKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DebtKind::Owed => "owed",
            DebtKind::Lent => "lent",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "owed" => Some(DebtKind::Owed),
            "lent" => Some(DebtKind::Lent),
            _ => None,
        }
    }
}

impl ToSql for DebtKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for DebtKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let raw = value.as_str()?;
        DebtKind::parse(raw).ok_or(FromSqlError::InvalidType)
    }
}

/// A repayment recorded against a debt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DebtPayment {
    pub id: Uuid,
    pub debt_id: Uuid,
    pub amount: f64,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl DebtPayment {
    pub fn new(debt_id: Uuid, amount: f64, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            debt_id,
            amount,
            date,
            note: None,
        }
    }
}

/// Projected schedule for clearing one debt at a fixed monthly payment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PayoffPlan {
    pub debt_id: Uuid,
    pub debt_name: String,
    pub remaining: f64,
    pub monthly_payment: f64,
    pub months: u32,
    pub projected_date: NaiveDate,
}
