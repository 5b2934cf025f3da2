//! Debt CRUD, payment history, and the payoff estimator.

use chrono::{NaiveDate, Utc};
use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

use crate::domain::period::add_months;
use crate::domain::{Debt, DebtPayment, PayoffPlan};
use crate::errors::{AppError, AppResult};
use crate::storage::{Database, StoreEvent};

pub struct DebtRepository;

impl DebtRepository {
    pub fn create(db: &Database, debt: &Debt) -> AppResult<()> {
        Self::validate(debt)?;
        db.conn().execute(
            "INSERT INTO debts (id, name, kind, amount, note, due_date, is_settled, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                debt.id,
                debt.name,
                debt.kind,
                debt.amount,
                debt.note,
                debt.due_date,
                debt.is_settled,
                debt.created_at,
                debt.updated_at,
            ],
        )?;
        db.emit(StoreEvent::Debts);
        Ok(())
    }

    pub fn update(db: &Database, debt: &Debt) -> AppResult<()> {
        Self::validate(debt)?;
        let affected = db.conn().execute(
            "UPDATE debts SET name = ?2, kind = ?3, amount = ?4, note = ?5, due_date = ?6,
                    is_settled = ?7, updated_at = ?8
             WHERE id = ?1",
            params![
                debt.id,
                debt.name,
                debt.kind,
                debt.amount,
                debt.note,
                debt.due_date,
                debt.is_settled,
                Utc::now(),
            ],
        )?;
        if affected == 0 {
            return Err(AppError::NotFound(format!("debt {}", debt.id)));
        }
        db.emit(StoreEvent::Debts);
        Ok(())
    }

    pub fn get(db: &Database, id: Uuid) -> AppResult<Debt> {
        db.conn()
            .query_row(
                "SELECT id, name, kind, amount, note, due_date, is_settled, created_at, updated_at
                 FROM debts WHERE id = ?1",
                params![id],
                map_debt,
            )
            .optional()?
            .ok_or_else(|| AppError::NotFound(format!("debt {id}")))
    }

    pub fn list(db: &Database, include_settled: bool) -> AppResult<Vec<Debt>> {
        let mut stmt = db.conn().prepare(
            "SELECT id, name, kind, amount, note, due_date, is_settled, created_at, updated_at
             FROM debts WHERE is_settled <= ?1 ORDER BY name",
        )?;
        let rows = stmt.query_map(params![include_settled], map_debt)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn set_settled(db: &Database, id: Uuid, settled: bool) -> AppResult<()> {
        let affected = db.conn().execute(
            "UPDATE debts SET is_settled = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, settled, Utc::now()],
        )?;
        if affected == 0 {
            return Err(AppError::NotFound(format!("debt {id}")));
        }
        db.emit(StoreEvent::Debts);
        Ok(())
    }

    /// Removes the debt together with its payment history.
    pub fn delete(db: &Database, id: Uuid) -> AppResult<()> {
        let affected = db
            .conn()
            .execute("DELETE FROM debts WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(AppError::NotFound(format!("debt {id}")));
        }
        db.emit(StoreEvent::Debts);
        Ok(())
    }

    /// Records a repayment; settles the debt automatically once the paid
    /// total covers the full amount.
    pub fn add_payment(db: &Database, payment: &DebtPayment) -> AppResult<()> {
        if payment.amount <= 0.0 {
            return Err(AppError::Validation(
                "payment amount must be positive".into(),
            ));
        }
        let debt = Self::get(db, payment.debt_id)?;
        if debt.is_settled {
            return Err(AppError::Validation("debt is already settled".into()));
        }
        let tx = db.conn().unchecked_transaction()?;
        tx.execute(
            "INSERT INTO debt_payments (id, debt_id, amount, date, note)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                payment.id,
                payment.debt_id,
                payment.amount,
                payment.date,
                payment.note,
            ],
        )?;
        let paid: f64 = tx.query_row(
            "SELECT COALESCE(SUM(amount), 0) FROM debt_payments WHERE debt_id = ?1",
            params![payment.debt_id],
            |row| row.get(0),
        )?;
        if paid >= debt.amount {
            tx.execute(
                "UPDATE debts SET is_settled = 1, updated_at = ?2 WHERE id = ?1",
                params![debt.id, Utc::now()],
            )?;
        }
        tx.commit()?;
        db.emit(StoreEvent::Debts);
        Ok(())
    }

    pub fn payments_for(db: &Database, debt_id: Uuid) -> AppResult<Vec<DebtPayment>> {
        let mut stmt = db.conn().prepare(
            "SELECT id, debt_id, amount, date, note FROM debt_payments
             WHERE debt_id = ?1 ORDER BY date",
        )?;
        let rows = stmt.query_map(params![debt_id], |row| {
            Ok(DebtPayment {
                id: row.get("id")?,
                debt_id: row.get("debt_id")?,
                amount: row.get("amount")?,
                date: row.get("date")?,
                note: row.get("note")?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn paid_total(db: &Database, debt_id: Uuid) -> AppResult<f64> {
        let paid: f64 = db.conn().query_row(
            "SELECT COALESCE(SUM(amount), 0) FROM debt_payments WHERE debt_id = ?1",
            params![debt_id],
            |row| row.get(0),
        )?;
        Ok(paid)
    }

    /// Projects, per unsettled debt, how many whole months of the given
    /// payment clear the remaining amount and the resulting payoff date.
    /// Deliberately simplistic: no interest compounding, no ordering.
    pub fn estimate_payoff(
        db: &Database,
        monthly_payment: f64,
        today: NaiveDate,
    ) -> AppResult<Vec<PayoffPlan>> {
        if monthly_payment <= 0.0 {
            return Err(AppError::Validation(
                "monthly payment must be positive".into(),
            ));
        }
        let debts = Self::list(db, false)?;
        if debts.is_empty() {
            return Err(AppError::Validation("no active debts to calculate".into()));
        }
        let mut plans = Vec::with_capacity(debts.len());
        for debt in debts {
            let remaining = debt.remaining(Self::paid_total(db, debt.id)?);
            let months = (remaining / monthly_payment).ceil() as u32;
            plans.push(PayoffPlan {
                debt_id: debt.id,
                debt_name: debt.name,
                remaining,
                monthly_payment,
                months,
                projected_date: add_months(today, months as i32),
            });
        }
        Ok(plans)
    }

    fn validate(debt: &Debt) -> AppResult<()> {
        if debt.name.trim().is_empty() {
            return Err(AppError::Validation("debt name must not be empty".into()));
        }
        if debt.amount <= 0.0 {
            return Err(AppError::Validation("debt amount must be positive".into()));
        }
        Ok(())
    }
}

fn map_debt(row: &Row<'_>) -> rusqlite::Result<Debt> {
    Ok(Debt {
        id: row.get("id")?,
        name: row.get("name")?,
        kind: row.get("kind")?,
        amount: row.get("amount")?,
        note: row.get("note")?,
        due_date: row.get("due_date")?,
        is_settled: row.get("is_settled")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
