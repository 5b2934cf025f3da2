//! Habit records plus the streak and XP derivations over their logs.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;

/// XP needed to advance one level.
pub const XP_PER_LEVEL: u32 = 100;

/// A recurring daily habit the user wants to build.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Habit {
    pub id: Uuid,
    pub name: String,
    pub icon: String,
    pub color: String,
    pub xp_reward: u32,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Habit {
    pub fn new(
        name: impl Into<String>,
        icon: impl Into<String>,
        color: impl Into<String>,
        xp_reward: u32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            icon: icon.into(),
            color: color.into(),
            xp_reward,
            is_archived: false,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Identifiable for Habit {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for Habit {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for Habit {
    fn display_label(&self) -> String {
        format!("{} {}", self.icon, self.name)
    }
}

/// One completed day for a habit; at most one log exists per habit and date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HabitLog {
    pub id: Uuid,
    pub habit_id: Uuid,
    pub date: NaiveDate,
}

impl HabitLog {
    pub fn new(habit_id: Uuid, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            habit_id,
            date,
        }
    }
}

/// Derived progress indicators; recomputed from the logs, never persisted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct HabitStats {
    pub completions: u32,
    pub current_streak: u32,
    pub best_streak: u32,
    pub total_xp: u32,
    pub level: u32,
    pub xp_into_level: u32,
}

/// Computes streaks and XP from a habit's completion dates.
///
/// `dates` must be sorted ascending and free of duplicates, which the
/// storage layer guarantees. The current streak counts back from `today`,
/// or from yesterday when today has not been logged yet.
pub fn stats_from_logs(xp_reward: u32, dates: &[NaiveDate], today: NaiveDate) -> HabitStats {
    let completions = dates.len() as u32;
    let total_xp = completions * xp_reward;

    let mut best_streak = 0u32;
    let mut run = 0u32;
    let mut previous: Option<NaiveDate> = None;
    for &date in dates {
        run = match previous {
            Some(prev) if date - prev == Duration::days(1) => run + 1,
            _ => 1,
        };
        best_streak = best_streak.max(run);
        previous = Some(date);
    }

    let mut current_streak = 0u32;
    let mut cursor = if dates.binary_search(&today).is_ok() {
        today
    } else {
        today - Duration::days(1)
    };
    while dates.binary_search(&cursor).is_ok() {
        current_streak += 1;
        cursor = cursor - Duration::days(1);
    }

    HabitStats {
        completions,
        current_streak,
        best_streak,
        total_xp,
        level: 1 + total_xp / XP_PER_LEVEL,
        xp_into_level: total_xp % XP_PER_LEVEL,
    }
}
