//! Budget records and their derived spending indicators.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;
use crate::domain::period::{period_window, PeriodKind, PeriodWindow};

pub const DEFAULT_ALERT_THRESHOLD: f64 = 80.0;

/// A spending guardrail for a category over a recurring or one-off period.
///
/// `spent` is the persisted cache maintained by the recalculation routine;
/// every other indicator is derived on demand and never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Budget {
    pub id: Uuid,
    pub name: String,
    pub category_id: Uuid,
    pub amount: f64,
    pub spent: f64,
    pub period: PeriodKind,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub alert_threshold: f64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Budget {
    pub fn new(
        name: impl Into<String>,
        category_id: Uuid,
        amount: f64,
        period: PeriodKind,
        start_date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            category_id,
            amount,
            spent: 0.0,
            period,
            start_date,
            end_date: None,
            alert_threshold: DEFAULT_ALERT_THRESHOLD,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Only meaningful for `PeriodKind::Once`; stored but unused otherwise.
    pub fn with_end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn with_alert_threshold(mut self, alert_threshold: f64) -> Self {
        self.alert_threshold = alert_threshold;
        self
    }

    /// The period window `offset` steps away from the one containing `today`.
    pub fn window(&self, today: NaiveDate, offset: i32) -> PeriodWindow {
        period_window(self.period, self.start_date, self.end_date, today, offset)
    }

    pub fn percent_used(&self) -> f64 {
        if self.amount.abs() < f64::EPSILON {
            if self.spent.abs() < f64::EPSILON {
                0.0
            } else {
                100.0
            }
        } else {
            (self.spent / self.amount) * 100.0
        }
    }

    pub fn remaining(&self) -> f64 {
        (self.amount - self.spent).max(0.0)
    }

    pub fn over_amount(&self) -> f64 {
        (self.spent - self.amount).max(0.0)
    }

    pub fn is_over(&self) -> bool {
        self.spent > self.amount
    }

    /// True once spending crosses the alert threshold but is not yet over.
    pub fn near_threshold(&self) -> bool {
        !self.is_over() && self.percent_used() >= self.alert_threshold
    }
}

impl Identifiable for Budget {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for Budget {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for Budget {
    fn display_label(&self) -> String {
        format!("{} ({})", self.name, self.period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_budget(amount: f64, spent: f64) -> Budget {
        let mut budget = Budget::new(
            "Groceries",
            Uuid::new_v4(),
            amount,
            PeriodKind::Monthly,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        );
        budget.spent = spent;
        budget
    }

    #[test]
    fn derived_indicators_track_spent() {
        let budget = sample_budget(200.0, 150.0);
        assert!((budget.percent_used() - 75.0).abs() < f64::EPSILON);
        assert!((budget.remaining() - 50.0).abs() < f64::EPSILON);
        assert!(budget.over_amount().abs() < f64::EPSILON);
        assert!(!budget.is_over());
    }

    #[test]
    fn near_threshold_flips_at_the_configured_percent() {
        let mut budget = sample_budget(100.0, 79.0);
        assert!(!budget.near_threshold());
        budget.spent = 80.0;
        assert!(budget.near_threshold());
        budget.spent = 120.0;
        assert!(!budget.near_threshold(), "over budget is not near-threshold");
        assert!((budget.over_amount() - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_amount_budget_reports_full_use_once_spent() {
        let untouched = sample_budget(0.0, 0.0);
        assert!(untouched.percent_used().abs() < f64::EPSILON);
        let spent = sample_budget(0.0, 5.0);
        assert!((spent.percent_used() - 100.0).abs() < f64::EPSILON);
    }
}
