use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

use crate::domain::Account;
use crate::errors::{AppError, AppResult};
use crate::storage::{Database, StoreEvent};

pub struct AccountRepository;

impl AccountRepository {
    pub fn create(db: &Database, account: &Account) -> AppResult<()> {
        Self::validate_name(db, None, &account.name)?;
        db.conn().execute(
            "INSERT INTO accounts (id, name, kind, currency, opening_balance, note, is_archived, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                account.id,
                account.name,
                account.kind,
                account.currency,
                account.opening_balance,
                account.note,
                account.is_archived,
                account.created_at,
                account.updated_at,
            ],
        )?;
        db.emit(StoreEvent::Accounts);
        Ok(())
    }

    pub fn update(db: &Database, account: &Account) -> AppResult<()> {
        Self::validate_name(db, Some(account.id), &account.name)?;
        let affected = db.conn().execute(
            "UPDATE accounts SET name = ?2, kind = ?3, currency = ?4, opening_balance = ?5,
                    note = ?6, is_archived = ?7, updated_at = ?8
             WHERE id = ?1",
            params![
                account.id,
                account.name,
                account.kind,
                account.currency,
                account.opening_balance,
                account.note,
                account.is_archived,
                Utc::now(),
            ],
        )?;
        if affected == 0 {
            return Err(AppError::NotFound(format!("account {}", account.id)));
        }
        db.emit(StoreEvent::Accounts);
        Ok(())
    }

    pub fn get(db: &Database, id: Uuid) -> AppResult<Account> {
        db.conn()
            .query_row(
                "SELECT id, name, kind, currency, opening_balance, note, is_archived, created_at, updated_at
                 FROM accounts WHERE id = ?1",
                params![id],
                map_account,
            )
            .optional()?
            .ok_or_else(|| AppError::NotFound(format!("account {id}")))
    }

    pub fn list(db: &Database, include_archived: bool) -> AppResult<Vec<Account>> {
        let mut stmt = db.conn().prepare(
            "SELECT id, name, kind, currency, opening_balance, note, is_archived, created_at, updated_at
             FROM accounts WHERE is_archived <= ?1 ORDER BY name",
        )?;
        let rows = stmt.query_map(params![include_archived], map_account)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn set_archived(db: &Database, id: Uuid, archived: bool) -> AppResult<()> {
        let affected = db.conn().execute(
            "UPDATE accounts SET is_archived = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, archived, Utc::now()],
        )?;
        if affected == 0 {
            return Err(AppError::NotFound(format!("account {id}")));
        }
        db.emit(StoreEvent::Accounts);
        Ok(())
    }

    pub fn delete(db: &Database, id: Uuid) -> AppResult<()> {
        let linked: i64 = db.conn().query_row(
            "SELECT COUNT(*) FROM transactions WHERE account_id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        if linked > 0 {
            return Err(AppError::Validation(
                "account has linked transactions".into(),
            ));
        }
        let affected = db
            .conn()
            .execute("DELETE FROM accounts WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(AppError::NotFound(format!("account {id}")));
        }
        db.emit(StoreEvent::Accounts);
        Ok(())
    }

    /// Current balance: opening balance plus signed transaction activity.
    pub fn balance(db: &Database, id: Uuid) -> AppResult<f64> {
        let account = Self::get(db, id)?;
        let activity: f64 = db.conn().query_row(
            "SELECT COALESCE(SUM(CASE kind WHEN 'income' THEN amount ELSE -amount END), 0)
             FROM transactions WHERE account_id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        Ok(account.opening_balance + activity)
    }

    fn validate_name(db: &Database, exclude: Option<Uuid>, candidate: &str) -> AppResult<()> {
        if candidate.trim().is_empty() {
            return Err(AppError::Validation("account name must not be empty".into()));
        }
        let duplicates: i64 = db.conn().query_row(
            "SELECT COUNT(*) FROM accounts
             WHERE LOWER(TRIM(name)) = LOWER(TRIM(?1)) AND id IS NOT ?2",
            params![candidate, exclude],
            |row| row.get(0),
        )?;
        if duplicates > 0 {
            return Err(AppError::Validation(format!(
                "account `{candidate}` already exists"
            )));
        }
        Ok(())
    }
}

fn map_account(row: &Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        id: row.get("id")?,
        name: row.get("name")?,
        kind: row.get("kind")?,
        currency: row.get("currency")?,
        opening_balance: row.get("opening_balance")?,
        note: row.get("note")?,
        is_archived: row.get("is_archived")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AccountKind;

    fn memory_db() -> Database {
        Database::open_in_memory().expect("in-memory database")
    }

    #[test]
    fn create_and_fetch_roundtrip() {
        let db = memory_db();
        let account =
            Account::new("Checking", AccountKind::Bank, "USD").with_opening_balance(100.0);
        AccountRepository::create(&db, &account).unwrap();

        let fetched = AccountRepository::get(&db, account.id).unwrap();
        assert_eq!(fetched.name, "Checking");
        assert_eq!(fetched.kind, AccountKind::Bank);
        assert!((fetched.opening_balance - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let db = memory_db();
        AccountRepository::create(&db, &Account::new("Cash", AccountKind::Cash, "USD")).unwrap();
        let err = AccountRepository::create(&db, &Account::new(" cash ", AccountKind::Cash, "USD"))
            .expect_err("duplicate must fail");
        assert!(matches!(err, AppError::Validation(_)), "got {err:?}");
    }

    #[test]
    fn get_missing_account_is_not_found() {
        let db = memory_db();
        let err = AccountRepository::get(&db, Uuid::new_v4()).expect_err("must fail");
        assert!(matches!(err, AppError::NotFound(_)), "got {err:?}");
    }

    #[test]
    fn archived_accounts_are_hidden_by_default() {
        let db = memory_db();
        let account = Account::new("Old wallet", AccountKind::Wallet, "EUR");
        AccountRepository::create(&db, &account).unwrap();
        AccountRepository::set_archived(&db, account.id, true).unwrap();

        assert!(AccountRepository::list(&db, false).unwrap().is_empty());
        assert_eq!(AccountRepository::list(&db, true).unwrap().len(), 1);
    }
}
