pub mod account;
pub mod budget;
pub mod category;
pub mod common;
pub mod debt;
pub mod habit;
pub mod label;
pub mod period;
pub mod profile;
pub mod transaction;

pub use account::{Account, AccountKind};
pub use budget::Budget;
pub use category::{Category, CategoryKind};
pub use common::{Displayable, Identifiable, NamedEntity};
pub use debt::{Debt, DebtKind, DebtPayment, PayoffPlan};
pub use habit::{Habit, HabitLog, HabitStats};
pub use label::Label;
pub use period::{period_window, PeriodKind, PeriodWindow};
pub use profile::UserProfile;
pub use transaction::{Transaction, TransactionKind};
