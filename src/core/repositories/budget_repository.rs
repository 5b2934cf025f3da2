//! Budget CRUD plus the period-window recalculation of cached spend.

use chrono::{NaiveDate, Utc};
use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

use crate::domain::period::PeriodWindow;
use crate::domain::Budget;
use crate::errors::{AppError, AppResult};
use crate::storage::{Database, StoreEvent};

use super::{CategoryRepository, TransactionRepository};

/// A budget enriched with its category's presentation fields.
#[derive(Debug, Clone)]
pub struct BudgetOverview {
    pub budget: Budget,
    pub category_name: String,
    pub category_icon: String,
    pub category_color: String,
}

pub struct BudgetRepository;

impl BudgetRepository {
    pub fn create(db: &Database, budget: &Budget) -> AppResult<()> {
        Self::validate(db, budget)?;
        db.conn().execute(
            "INSERT INTO budgets (id, name, category_id, amount, spent, period, start_date,
                                  end_date, alert_threshold, is_active, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                budget.id,
                budget.name,
                budget.category_id,
                budget.amount,
                budget.spent,
                budget.period,
                budget.start_date,
                budget.end_date,
                budget.alert_threshold,
                budget.is_active,
                budget.created_at,
                budget.updated_at,
            ],
        )?;
        db.emit(StoreEvent::Budgets);
        Ok(())
    }

    pub fn update(db: &Database, budget: &Budget) -> AppResult<()> {
        Self::validate(db, budget)?;
        let affected = db.conn().execute(
            "UPDATE budgets SET name = ?2, category_id = ?3, amount = ?4, period = ?5,
                    start_date = ?6, end_date = ?7, alert_threshold = ?8, is_active = ?9,
                    updated_at = ?10
             WHERE id = ?1",
            params![
                budget.id,
                budget.name,
                budget.category_id,
                budget.amount,
                budget.period,
                budget.start_date,
                budget.end_date,
                budget.alert_threshold,
                budget.is_active,
                Utc::now(),
            ],
        )?;
        if affected == 0 {
            return Err(AppError::NotFound(format!("budget {}", budget.id)));
        }
        db.emit(StoreEvent::Budgets);
        Ok(())
    }

    pub fn get(db: &Database, id: Uuid) -> AppResult<Budget> {
        db.conn()
            .query_row(
                "SELECT id, name, category_id, amount, spent, period, start_date, end_date,
                        alert_threshold, is_active, created_at, updated_at
                 FROM budgets WHERE id = ?1",
                params![id],
                map_budget,
            )
            .optional()?
            .ok_or_else(|| AppError::NotFound(format!("budget {id}")))
    }

    pub fn list(db: &Database, active_only: bool) -> AppResult<Vec<Budget>> {
        let mut stmt = db.conn().prepare(
            "SELECT id, name, category_id, amount, spent, period, start_date, end_date,
                    alert_threshold, is_active, created_at, updated_at
             FROM budgets WHERE is_active >= ?1 ORDER BY name",
        )?;
        let rows = stmt.query_map(params![active_only], map_budget)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Budgets joined with their category's name, icon, and color.
    pub fn list_with_category(db: &Database, active_only: bool) -> AppResult<Vec<BudgetOverview>> {
        let mut stmt = db.conn().prepare(
            "SELECT b.id, b.name, b.category_id, b.amount, b.spent, b.period, b.start_date,
                    b.end_date, b.alert_threshold, b.is_active, b.created_at, b.updated_at,
                    c.name AS category_name, c.icon AS category_icon, c.color AS category_color
             FROM budgets b
             JOIN categories c ON c.id = b.category_id
             WHERE b.is_active >= ?1 ORDER BY b.name",
        )?;
        let rows = stmt.query_map(params![active_only], |row| {
            Ok(BudgetOverview {
                budget: map_budget(row)?,
                category_name: row.get("category_name")?,
                category_icon: row.get("category_icon")?,
                category_color: row.get("category_color")?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn set_active(db: &Database, id: Uuid, active: bool) -> AppResult<()> {
        let affected = db.conn().execute(
            "UPDATE budgets SET is_active = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, active, Utc::now()],
        )?;
        if affected == 0 {
            return Err(AppError::NotFound(format!("budget {id}")));
        }
        db.emit(StoreEvent::Budgets);
        Ok(())
    }

    pub fn delete(db: &Database, id: Uuid) -> AppResult<()> {
        let affected = db
            .conn()
            .execute("DELETE FROM budgets WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(AppError::NotFound(format!("budget {id}")));
        }
        db.emit(StoreEvent::Budgets);
        Ok(())
    }

    /// The window `offset` periods away from the one containing `today`.
    pub fn current_window(budget: &Budget, today: NaiveDate, offset: i32) -> PeriodWindow {
        budget.window(today, offset)
    }

    /// Re-derives the cached `spent` of every active budget from the
    /// transactions inside its current period window.
    ///
    /// Full re-scan on every call; a budget is only written back (and its
    /// `updated_at` bumped) when the recomputed total differs, which makes
    /// back-to-back invocations idempotent. Returns how many budgets were
    /// updated.
    pub fn recalculate_spent(db: &Database, today: NaiveDate) -> AppResult<usize> {
        let budgets = Self::list(db, true)?;
        let mut updated = 0usize;
        for budget in &budgets {
            let window = budget.window(today, 0);
            let total =
                TransactionRepository::sum_expenses_for_category(db, budget.category_id, &window)?;
            if (total - budget.spent).abs() > f64::EPSILON {
                db.conn().execute(
                    "UPDATE budgets SET spent = ?2, updated_at = ?3 WHERE id = ?1",
                    params![budget.id, total, Utc::now()],
                )?;
                updated += 1;
            }
        }
        if updated > 0 {
            tracing::info!(updated, scanned = budgets.len(), "budget spend recalculated");
            db.emit(StoreEvent::Budgets);
        }
        Ok(updated)
    }

    fn validate(db: &Database, budget: &Budget) -> AppResult<()> {
        if budget.name.trim().is_empty() {
            return Err(AppError::Validation("budget name must not be empty".into()));
        }
        if budget.amount <= 0.0 {
            return Err(AppError::Validation(
                "budget amount must be positive".into(),
            ));
        }
        if !(0.0..=100.0).contains(&budget.alert_threshold) {
            return Err(AppError::Validation(
                "alert threshold must be between 0 and 100".into(),
            ));
        }
        CategoryRepository::ensure_exists(db, budget.category_id)
    }
}

fn map_budget(row: &Row<'_>) -> rusqlite::Result<Budget> {
    Ok(Budget {
        id: row.get("id")?,
        name: row.get("name")?,
        category_id: row.get("category_id")?,
        amount: row.get("amount")?,
        spent: row.get("spent")?,
        period: row.get("period")?,
        start_date: row.get("start_date")?,
        end_date: row.get("end_date")?,
        alert_threshold: row.get("alert_threshold")?,
        is_active: row.get("is_active")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::repositories::AccountRepository;
    use crate::domain::{
        Account, AccountKind, Category, CategoryKind, PeriodKind, Transaction, TransactionKind,
    };

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn seeded_db() -> (Database, Account, Category) {
        let db = Database::open_in_memory().expect("in-memory database");
        let account = Account::new("Checking", AccountKind::Bank, "USD");
        AccountRepository::create(&db, &account).unwrap();
        let category = Category::new("Groceries", CategoryKind::Expense, "cart", "#c62828");
        CategoryRepository::create(&db, &category).unwrap();
        (db, account, category)
    }

    #[test]
    fn invalid_thresholds_are_rejected() {
        let (db, _, category) = seeded_db();
        let budget = Budget::new(
            "Food",
            category.id,
            300.0,
            PeriodKind::Monthly,
            date(2024, 1, 1),
        )
        .with_alert_threshold(120.0);
        let err = BudgetRepository::create(&db, &budget).expect_err("must fail");
        assert!(matches!(err, AppError::Validation(_)), "got {err:?}");
    }

    #[test]
    fn overview_carries_category_presentation_fields() {
        let (db, _, category) = seeded_db();
        let budget = Budget::new(
            "Food",
            category.id,
            300.0,
            PeriodKind::Monthly,
            date(2024, 1, 1),
        );
        BudgetRepository::create(&db, &budget).unwrap();

        let overviews = BudgetRepository::list_with_category(&db, true).unwrap();
        assert_eq!(overviews.len(), 1);
        assert_eq!(overviews[0].category_name, "Groceries");
        assert_eq!(overviews[0].category_icon, "cart");
        assert_eq!(overviews[0].category_color, "#c62828");
    }

    #[test]
    fn recalculation_tracks_window_spend_and_is_idempotent() {
        let (db, account, category) = seeded_db();
        let budget = Budget::new(
            "Food",
            category.id,
            300.0,
            PeriodKind::Monthly,
            date(2024, 1, 1),
        );
        BudgetRepository::create(&db, &budget).unwrap();

        let today = date(2024, 2, 15);
        let in_window = Transaction::new(
            account.id,
            category.id,
            TransactionKind::Expense,
            80.0,
            date(2024, 2, 3),
        );
        TransactionRepository::create(&db, &in_window).unwrap();
        let out_of_window = Transaction::new(
            account.id,
            category.id,
            TransactionKind::Expense,
            55.0,
            date(2024, 1, 28),
        );
        TransactionRepository::create(&db, &out_of_window).unwrap();

        assert_eq!(BudgetRepository::recalculate_spent(&db, today).unwrap(), 1);
        let refreshed = BudgetRepository::get(&db, budget.id).unwrap();
        assert!((refreshed.spent - 80.0).abs() < f64::EPSILON);

        // Second pass with unchanged transactions must not rewrite anything.
        assert_eq!(BudgetRepository::recalculate_spent(&db, today).unwrap(), 0);
        let again = BudgetRepository::get(&db, budget.id).unwrap();
        assert_eq!(again.updated_at, refreshed.updated_at);
    }

    #[test]
    fn inactive_budgets_are_skipped_by_recalculation() {
        let (db, account, category) = seeded_db();
        let budget = Budget::new(
            "Food",
            category.id,
            300.0,
            PeriodKind::Monthly,
            date(2024, 1, 1),
        );
        BudgetRepository::create(&db, &budget).unwrap();
        BudgetRepository::set_active(&db, budget.id, false).unwrap();

        let txn = Transaction::new(
            account.id,
            category.id,
            TransactionKind::Expense,
            80.0,
            date(2024, 2, 3),
        );
        TransactionRepository::create(&db, &txn).unwrap();

        assert_eq!(
            BudgetRepository::recalculate_spent(&db, date(2024, 2, 15)).unwrap(),
            0
        );
        let unchanged = BudgetRepository::get(&db, budget.id).unwrap();
        assert!(unchanged.spent.abs() < f64::EPSILON);
    }
}
