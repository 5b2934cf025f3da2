//! End-to-end checks against an on-disk store.

use fintra_core::config::AppConfig;
use fintra_core::core::repositories::{
    AccountRepository, AuthRepository, BudgetRepository, CategoryRepository, SettingsRepository,
    TransactionRepository,
};
use fintra_core::domain::{
    Account, AccountKind, Budget, Category, CategoryKind, PeriodKind, Transaction,
    TransactionKind, UserProfile,
};
use fintra_core::storage::Database;

mod common;
use common::date;

#[test]
fn data_survives_a_reopen() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("fintra.sqlite");

    let account = Account::new("Checking", AccountKind::Bank, "USD").with_opening_balance(250.0);
    let category = Category::new("Groceries", CategoryKind::Expense, "cart", "#c62828");
    let budget = Budget::new(
        "Food",
        category.id,
        300.0,
        PeriodKind::Monthly,
        date(2024, 1, 1),
    );

    {
        let db = Database::open(&path).expect("open store");
        AccountRepository::create(&db, &account).unwrap();
        CategoryRepository::create(&db, &category).unwrap();
        BudgetRepository::create(&db, &budget).unwrap();
        let txn = Transaction::new(
            account.id,
            category.id,
            TransactionKind::Expense,
            45.0,
            date(2024, 6, 5),
        );
        TransactionRepository::create(&db, &txn).unwrap();
        BudgetRepository::recalculate_spent(&db, date(2024, 6, 12)).unwrap();
    }

    let db = Database::open(&path).expect("reopen store");
    let accounts = AccountRepository::list(&db, true).unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].id, account.id);
    assert!((AccountRepository::balance(&db, account.id).unwrap() - 205.0).abs() < f64::EPSILON);

    let stored = BudgetRepository::get(&db, budget.id).unwrap();
    assert!((stored.spent - 45.0).abs() < f64::EPSILON);
    assert!((stored.remaining() - 255.0).abs() < f64::EPSILON);
}

#[test]
fn config_profile_and_pin_persist_together() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("fintra.sqlite");

    {
        let db = Database::open(&path).expect("open store");
        let mut config = AppConfig::load(&db).unwrap();
        config.set_dark_mode(&db, true).unwrap();
        config.set_currency(&db, "EUR").unwrap();
        SettingsRepository::set_profile(
            &db,
            &UserProfile {
                display_name: "Alex".into(),
                onboarding_complete: true,
            },
        )
        .unwrap();
        AuthRepository::set_pin(&db, "4821").unwrap();
    }

    let db = Database::open(&path).expect("reopen store");
    let config = AppConfig::load(&db).unwrap();
    assert!(config.dark_mode());
    assert_eq!(config.currency(), "EUR");
    assert_eq!(config.locale(), "en-US");

    let profile = SettingsRepository::profile(&db).unwrap();
    assert_eq!(profile.display_name, "Alex");
    assert!(profile.onboarding_complete);

    assert!(AuthRepository::verify_pin(&db, "4821").unwrap());
    assert!(!AuthRepository::verify_pin(&db, "1111").unwrap());
}
