use chrono::NaiveDate;
use fintra_core::core::repositories::{AccountRepository, CategoryRepository};
use fintra_core::domain::{Account, AccountKind, Category, CategoryKind};
use fintra_core::storage::Database;

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// In-memory store seeded with one account and one expense category.
pub fn seeded_db() -> (Database, Account, Category) {
    let db = Database::open_in_memory().expect("in-memory database");
    let account = Account::new("Checking", AccountKind::Bank, "USD").with_opening_balance(500.0);
    AccountRepository::create(&db, &account).expect("seed account");
    let category = Category::new("Groceries", CategoryKind::Expense, "cart", "#c62828");
    CategoryRepository::create(&db, &category).expect("seed category");
    (db, account, category)
}
