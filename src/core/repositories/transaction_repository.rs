use chrono::{NaiveDate, Utc};
use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

use crate::domain::period::PeriodWindow;
use crate::domain::{Label, Transaction};
use crate::errors::{AppError, AppResult};
use crate::storage::{Database, StoreEvent};

use super::CategoryRepository;

pub struct TransactionRepository;

impl TransactionRepository {
    pub fn create(db: &Database, txn: &Transaction) -> AppResult<()> {
        Self::validate(db, txn)?;
        db.conn().execute(
            "INSERT INTO transactions (id, account_id, category_id, kind, amount, date, note, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                txn.id,
                txn.account_id,
                txn.category_id,
                txn.kind,
                txn.amount,
                txn.date,
                txn.note,
                txn.created_at,
                txn.updated_at,
            ],
        )?;
        db.emit(StoreEvent::Transactions);
        Ok(())
    }

    pub fn update(db: &Database, txn: &Transaction) -> AppResult<()> {
        Self::validate(db, txn)?;
        let affected = db.conn().execute(
            "UPDATE transactions SET account_id = ?2, category_id = ?3, kind = ?4, amount = ?5,
                    date = ?6, note = ?7, updated_at = ?8
             WHERE id = ?1",
            params![
                txn.id,
                txn.account_id,
                txn.category_id,
                txn.kind,
                txn.amount,
                txn.date,
                txn.note,
                Utc::now(),
            ],
        )?;
        if affected == 0 {
            return Err(AppError::NotFound(format!("transaction {}", txn.id)));
        }
        db.emit(StoreEvent::Transactions);
        Ok(())
    }

    pub fn get(db: &Database, id: Uuid) -> AppResult<Transaction> {
        db.conn()
            .query_row(
                "SELECT id, account_id, category_id, kind, amount, date, note, created_at, updated_at
                 FROM transactions WHERE id = ?1",
                params![id],
                map_transaction,
            )
            .optional()?
            .ok_or_else(|| AppError::NotFound(format!("transaction {id}")))
    }

    pub fn delete(db: &Database, id: Uuid) -> AppResult<()> {
        let affected = db
            .conn()
            .execute("DELETE FROM transactions WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(AppError::NotFound(format!("transaction {id}")));
        }
        db.emit(StoreEvent::Transactions);
        Ok(())
    }

    pub fn list(db: &Database) -> AppResult<Vec<Transaction>> {
        let mut stmt = db.conn().prepare(
            "SELECT id, account_id, category_id, kind, amount, date, note, created_at, updated_at
             FROM transactions ORDER BY date DESC, created_at DESC",
        )?;
        let rows = stmt.query_map([], map_transaction)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn list_in_range(db: &Database, start: NaiveDate, end: NaiveDate) -> AppResult<Vec<Transaction>> {
        let mut stmt = db.conn().prepare(
            "SELECT id, account_id, category_id, kind, amount, date, note, created_at, updated_at
             FROM transactions WHERE date BETWEEN ?1 AND ?2 ORDER BY date DESC, created_at DESC",
        )?;
        let rows = stmt.query_map(params![start, end], map_transaction)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn list_for_account(db: &Database, account_id: Uuid) -> AppResult<Vec<Transaction>> {
        let mut stmt = db.conn().prepare(
            "SELECT id, account_id, category_id, kind, amount, date, note, created_at, updated_at
             FROM transactions WHERE account_id = ?1 ORDER BY date DESC, created_at DESC",
        )?;
        let rows = stmt.query_map(params![account_id], map_transaction)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Total expense volume for one category inside a period window, both
    /// bounds inclusive. Feeds the budget recalculation routine.
    pub fn sum_expenses_for_category(
        db: &Database,
        category_id: Uuid,
        window: &PeriodWindow,
    ) -> AppResult<f64> {
        let total: f64 = db.conn().query_row(
            "SELECT COALESCE(SUM(amount), 0) FROM transactions
             WHERE kind = 'expense' AND category_id = ?1 AND date BETWEEN ?2 AND ?3",
            params![category_id, window.start, window.end],
            |row| row.get(0),
        )?;
        Ok(total)
    }

    /// Replaces the transaction's label set atomically.
    pub fn set_labels(db: &Database, txn_id: Uuid, label_ids: &[Uuid]) -> AppResult<()> {
        Self::get(db, txn_id)?;
        let tx = db.conn().unchecked_transaction()?;
        tx.execute(
            "DELETE FROM transaction_labels WHERE transaction_id = ?1",
            params![txn_id],
        )?;
        for label_id in label_ids {
            tx.execute(
                "INSERT OR IGNORE INTO transaction_labels (transaction_id, label_id) VALUES (?1, ?2)",
                params![txn_id, label_id],
            )?;
        }
        tx.commit()?;
        db.emit(StoreEvent::Transactions);
        Ok(())
    }

    pub fn labels_for(db: &Database, txn_id: Uuid) -> AppResult<Vec<Label>> {
        let mut stmt = db.conn().prepare(
            "SELECT l.id, l.name, l.color, l.created_at
             FROM labels l
             JOIN transaction_labels tl ON tl.label_id = l.id
             WHERE tl.transaction_id = ?1 ORDER BY l.name",
        )?;
        let rows = stmt.query_map(params![txn_id], |row| {
            Ok(Label {
                id: row.get("id")?,
                name: row.get("name")?,
                color: row.get("color")?,
                created_at: row.get("created_at")?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn validate(db: &Database, txn: &Transaction) -> AppResult<()> {
        if txn.amount <= 0.0 {
            return Err(AppError::Validation("amount must be positive".into()));
        }
        let account_present: i64 = db.conn().query_row(
            "SELECT COUNT(*) FROM accounts WHERE id = ?1",
            params![txn.account_id],
            |row| row.get(0),
        )?;
        if account_present == 0 {
            return Err(AppError::Validation("linked account does not exist".into()));
        }
        CategoryRepository::ensure_exists(db, txn.category_id)
    }
}

fn map_transaction(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: row.get("id")?,
        account_id: row.get("account_id")?,
        category_id: row.get("category_id")?,
        kind: row.get("kind")?,
        amount: row.get("amount")?,
        date: row.get("date")?,
        note: row.get("note")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
