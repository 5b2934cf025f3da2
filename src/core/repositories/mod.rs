//! One stateless repository per aggregate, operating on a borrowed
//! [`Database`](crate::storage::Database). Storage failures are converted
//! into the shared error taxonomy at this boundary.

pub mod account_repository;
pub mod auth_repository;
pub mod budget_repository;
pub mod category_repository;
pub mod debt_repository;
pub mod habit_repository;
pub mod label_repository;
pub mod settings_repository;
pub mod transaction_repository;

pub use account_repository::AccountRepository;
pub use auth_repository::AuthRepository;
pub use budget_repository::{BudgetOverview, BudgetRepository};
pub use category_repository::CategoryRepository;
pub use debt_repository::DebtRepository;
pub use habit_repository::HabitRepository;
pub use label_repository::LabelRepository;
pub use settings_repository::SettingsRepository;
pub use transaction_repository::TransactionRepository;
