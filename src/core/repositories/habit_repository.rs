//! Habit CRUD, day logging, and the derived streak/XP stats.

use chrono::{NaiveDate, Utc};
use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

use crate::domain::habit::{stats_from_logs, HabitStats};
use crate::domain::{Habit, HabitLog};
use crate::errors::{AppError, AppResult};
use crate::storage::{Database, StoreEvent};

pub struct HabitRepository;

impl HabitRepository {
    pub fn create(db: &Database, habit: &Habit) -> AppResult<()> {
        Self::validate(habit)?;
        db.conn().execute(
            "INSERT INTO habits (id, name, icon, color, xp_reward, is_archived, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                habit.id,
                habit.name,
                habit.icon,
                habit.color,
                habit.xp_reward,
                habit.is_archived,
                habit.created_at,
                habit.updated_at,
            ],
        )?;
        db.emit(StoreEvent::Habits);
        Ok(())
    }

    pub fn update(db: &Database, habit: &Habit) -> AppResult<()> {
        Self::validate(habit)?;
        let affected = db.conn().execute(
            "UPDATE habits SET name = ?2, icon = ?3, color = ?4, xp_reward = ?5,
                    is_archived = ?6, updated_at = ?7
             WHERE id = ?1",
            params![
                habit.id,
                habit.name,
                habit.icon,
                habit.color,
                habit.xp_reward,
                habit.is_archived,
                Utc::now(),
            ],
        )?;
        if affected == 0 {
            return Err(AppError::NotFound(format!("habit {}", habit.id)));
        }
        db.emit(StoreEvent::Habits);
        Ok(())
    }

    pub fn get(db: &Database, id: Uuid) -> AppResult<Habit> {
        db.conn()
            .query_row(
                "SELECT id, name, icon, color, xp_reward, is_archived, created_at, updated_at
                 FROM habits WHERE id = ?1",
                params![id],
                map_habit,
            )
            .optional()?
            .ok_or_else(|| AppError::NotFound(format!("habit {id}")))
    }

    pub fn list(db: &Database, include_archived: bool) -> AppResult<Vec<Habit>> {
        let mut stmt = db.conn().prepare(
            "SELECT id, name, icon, color, xp_reward, is_archived, created_at, updated_at
             FROM habits WHERE is_archived <= ?1 ORDER BY name",
        )?;
        let rows = stmt.query_map(params![include_archived], map_habit)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn set_archived(db: &Database, id: Uuid, archived: bool) -> AppResult<()> {
        let affected = db.conn().execute(
            "UPDATE habits SET is_archived = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, archived, Utc::now()],
        )?;
        if affected == 0 {
            return Err(AppError::NotFound(format!("habit {id}")));
        }
        db.emit(StoreEvent::Habits);
        Ok(())
    }

    /// Removes the habit together with its log history.
    pub fn delete(db: &Database, id: Uuid) -> AppResult<()> {
        let affected = db
            .conn()
            .execute("DELETE FROM habits WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(AppError::NotFound(format!("habit {id}")));
        }
        db.emit(StoreEvent::Habits);
        Ok(())
    }

    /// Marks `date` as completed. Logging the same day twice is a no-op;
    /// returns whether a new entry was written.
    pub fn log(db: &Database, habit_id: Uuid, date: NaiveDate) -> AppResult<bool> {
        Self::get(db, habit_id)?;
        let log = HabitLog::new(habit_id, date);
        let inserted = db.conn().execute(
            "INSERT OR IGNORE INTO habit_logs (id, habit_id, date) VALUES (?1, ?2, ?3)",
            params![log.id, log.habit_id, log.date],
        )?;
        if inserted > 0 {
            db.emit(StoreEvent::Habits);
        }
        Ok(inserted > 0)
    }

    /// Removes the completion for `date`; absent entries are ignored.
    pub fn unlog(db: &Database, habit_id: Uuid, date: NaiveDate) -> AppResult<()> {
        let removed = db.conn().execute(
            "DELETE FROM habit_logs WHERE habit_id = ?1 AND date = ?2",
            params![habit_id, date],
        )?;
        if removed > 0 {
            db.emit(StoreEvent::Habits);
        }
        Ok(())
    }

    pub fn is_logged(db: &Database, habit_id: Uuid, date: NaiveDate) -> AppResult<bool> {
        let present: i64 = db.conn().query_row(
            "SELECT COUNT(*) FROM habit_logs WHERE habit_id = ?1 AND date = ?2",
            params![habit_id, date],
            |row| row.get(0),
        )?;
        Ok(present > 0)
    }

    /// Completion dates for one habit, ascending.
    pub fn logged_dates(db: &Database, habit_id: Uuid) -> AppResult<Vec<NaiveDate>> {
        let mut stmt = db
            .conn()
            .prepare("SELECT date FROM habit_logs WHERE habit_id = ?1 ORDER BY date")?;
        let rows = stmt.query_map(params![habit_id], |row| row.get(0))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Streaks, XP, and level derived from the habit's full log history.
    pub fn stats(db: &Database, habit_id: Uuid, today: NaiveDate) -> AppResult<HabitStats> {
        let habit = Self::get(db, habit_id)?;
        let dates = Self::logged_dates(db, habit_id)?;
        Ok(stats_from_logs(habit.xp_reward, &dates, today))
    }

    fn validate(habit: &Habit) -> AppResult<()> {
        if habit.name.trim().is_empty() {
            return Err(AppError::Validation("habit name must not be empty".into()));
        }
        if habit.xp_reward == 0 {
            return Err(AppError::Validation(
                "habit XP reward must be positive".into(),
            ));
        }
        Ok(())
    }
}

fn map_habit(row: &Row<'_>) -> rusqlite::Result<Habit> {
    Ok(Habit {
        id: row.get("id")?,
        name: row.get("name")?,
        icon: row.get("icon")?,
        color: row.get("color")?,
        xp_reward: row.get("xp_reward")?,
        is_archived: row.get("is_archived")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn db_with_habit() -> (Database, Habit) {
        let db = Database::open_in_memory().expect("in-memory database");
        let habit = Habit::new("Morning run", "shoe", "#00897b", 10);
        HabitRepository::create(&db, &habit).unwrap();
        (db, habit)
    }

    #[test]
    fn logging_is_idempotent_per_day() {
        let (db, habit) = db_with_habit();
        let day = date(2024, 6, 10);
        assert!(HabitRepository::log(&db, habit.id, day).unwrap());
        assert!(!HabitRepository::log(&db, habit.id, day).unwrap());
        assert_eq!(HabitRepository::logged_dates(&db, habit.id).unwrap().len(), 1);
    }

    #[test]
    fn stats_reflect_logged_days() {
        let (db, habit) = db_with_habit();
        for day in [date(2024, 6, 10), date(2024, 6, 11), date(2024, 6, 12)] {
            HabitRepository::log(&db, habit.id, day).unwrap();
        }
        let stats = HabitRepository::stats(&db, habit.id, date(2024, 6, 12)).unwrap();
        assert_eq!(stats.current_streak, 3);
        assert_eq!(stats.total_xp, 30);

        HabitRepository::unlog(&db, habit.id, date(2024, 6, 12)).unwrap();
        let stats = HabitRepository::stats(&db, habit.id, date(2024, 6, 12)).unwrap();
        assert_eq!(stats.current_streak, 2);
    }

    #[test]
    fn deleting_a_habit_drops_its_logs() {
        let (db, habit) = db_with_habit();
        HabitRepository::log(&db, habit.id, date(2024, 6, 10)).unwrap();
        HabitRepository::delete(&db, habit.id).unwrap();

        let orphaned: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM habit_logs", [], |row| row.get(0))
            .unwrap();
        assert_eq!(orphaned, 0);
    }
}
