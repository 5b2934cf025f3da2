use fintra_core::core::repositories::{
    BudgetRepository, CategoryRepository, TransactionRepository,
};
use fintra_core::domain::{Budget, Category, CategoryKind, PeriodKind, Transaction, TransactionKind};
use fintra_core::storage::StoreEvent;

mod common;
use common::{date, seeded_db};

#[test]
fn recalculation_attributes_spend_to_the_current_window() {
    let (db, account, groceries) = seeded_db();
    let transport = Category::new("Transport", CategoryKind::Expense, "bus", "#1565c0");
    CategoryRepository::create(&db, &transport).unwrap();

    let food_budget = Budget::new(
        "Food",
        groceries.id,
        300.0,
        PeriodKind::Monthly,
        date(2024, 1, 1),
    );
    BudgetRepository::create(&db, &food_budget).unwrap();
    let transport_budget = Budget::new(
        "Commute",
        transport.id,
        100.0,
        PeriodKind::Weekly,
        date(2024, 1, 1),
    );
    BudgetRepository::create(&db, &transport_budget).unwrap();

    // Wednesday 2024-06-12: weekly window 06-10..06-16, monthly 06-01..06-30.
    let today = date(2024, 6, 12);
    let entries = [
        (groceries.id, 42.0, date(2024, 6, 1)),
        (groceries.id, 18.0, date(2024, 6, 30)),
        (groceries.id, 99.0, date(2024, 5, 31)), // previous month
        (transport.id, 12.0, date(2024, 6, 10)),
        (transport.id, 12.0, date(2024, 6, 16)),
        (transport.id, 12.0, date(2024, 6, 9)), // previous week
    ];
    for (category_id, amount, day) in entries {
        let txn = Transaction::new(
            account.id,
            category_id,
            TransactionKind::Expense,
            amount,
            day,
        );
        TransactionRepository::create(&db, &txn).unwrap();
    }

    assert_eq!(BudgetRepository::recalculate_spent(&db, today).unwrap(), 2);

    let food = BudgetRepository::get(&db, food_budget.id).unwrap();
    assert!((food.spent - 60.0).abs() < f64::EPSILON);
    let commute = BudgetRepository::get(&db, transport_budget.id).unwrap();
    assert!((commute.spent - 24.0).abs() < f64::EPSILON);
}

#[test]
fn recalculation_twice_in_a_row_changes_nothing() {
    let (db, account, category) = seeded_db();
    let budget = Budget::new(
        "Food",
        category.id,
        300.0,
        PeriodKind::Monthly,
        date(2024, 1, 1),
    );
    BudgetRepository::create(&db, &budget).unwrap();
    let txn = Transaction::new(
        account.id,
        category.id,
        TransactionKind::Expense,
        75.0,
        date(2024, 6, 5),
    );
    TransactionRepository::create(&db, &txn).unwrap();

    let today = date(2024, 6, 12);
    assert_eq!(BudgetRepository::recalculate_spent(&db, today).unwrap(), 1);
    let first = BudgetRepository::get(&db, budget.id).unwrap();

    assert_eq!(BudgetRepository::recalculate_spent(&db, today).unwrap(), 0);
    let second = BudgetRepository::get(&db, budget.id).unwrap();
    assert_eq!(first.spent, second.spent);
    assert_eq!(first.updated_at, second.updated_at);
}

#[test]
fn recalculation_clears_spend_when_transactions_disappear() {
    let (db, account, category) = seeded_db();
    let budget = Budget::new(
        "Food",
        category.id,
        300.0,
        PeriodKind::Monthly,
        date(2024, 1, 1),
    );
    BudgetRepository::create(&db, &budget).unwrap();
    let txn = Transaction::new(
        account.id,
        category.id,
        TransactionKind::Expense,
        75.0,
        date(2024, 6, 5),
    );
    TransactionRepository::create(&db, &txn).unwrap();

    let today = date(2024, 6, 12);
    BudgetRepository::recalculate_spent(&db, today).unwrap();
    TransactionRepository::delete(&db, txn.id).unwrap();
    assert_eq!(BudgetRepository::recalculate_spent(&db, today).unwrap(), 1);

    let refreshed = BudgetRepository::get(&db, budget.id).unwrap();
    assert!(refreshed.spent.abs() < f64::EPSILON);
}

#[test]
fn once_budgets_accumulate_between_their_own_dates() {
    let (db, account, category) = seeded_db();
    let budget = Budget::new(
        "Trip",
        category.id,
        1000.0,
        PeriodKind::Once,
        date(2024, 3, 1),
    )
    .with_end_date(date(2024, 8, 31));
    BudgetRepository::create(&db, &budget).unwrap();

    for (amount, day) in [(100.0, date(2024, 2, 28)), (200.0, date(2024, 3, 1)), (300.0, date(2024, 8, 31))] {
        let txn = Transaction::new(
            account.id,
            category.id,
            TransactionKind::Expense,
            amount,
            day,
        );
        TransactionRepository::create(&db, &txn).unwrap();
    }

    // Reference date is far outside the window; a one-off budget ignores it.
    BudgetRepository::recalculate_spent(&db, date(2025, 1, 15)).unwrap();
    let refreshed = BudgetRepository::get(&db, budget.id).unwrap();
    assert!((refreshed.spent - 500.0).abs() < f64::EPSILON);
}

#[test]
fn budget_writes_push_change_events() {
    let (db, _, category) = seeded_db();
    let rx = db.subscribe();
    let budget = Budget::new(
        "Food",
        category.id,
        300.0,
        PeriodKind::Monthly,
        date(2024, 1, 1),
    );
    BudgetRepository::create(&db, &budget).unwrap();
    assert_eq!(rx.try_recv().ok(), Some(StoreEvent::Budgets));
}
