use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

use crate::domain::Label;
use crate::errors::{AppError, AppResult};
use crate::storage::{Database, StoreEvent};

pub struct LabelRepository;

impl LabelRepository {
    pub fn create(db: &Database, label: &Label) -> AppResult<()> {
        Self::validate_name(db, None, &label.name)?;
        db.conn().execute(
            "INSERT INTO labels (id, name, color, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![label.id, label.name, label.color, label.created_at],
        )?;
        db.emit(StoreEvent::Labels);
        Ok(())
    }

    pub fn update(db: &Database, label: &Label) -> AppResult<()> {
        Self::validate_name(db, Some(label.id), &label.name)?;
        let affected = db.conn().execute(
            "UPDATE labels SET name = ?2, color = ?3 WHERE id = ?1",
            params![label.id, label.name, label.color],
        )?;
        if affected == 0 {
            return Err(AppError::NotFound(format!("label {}", label.id)));
        }
        db.emit(StoreEvent::Labels);
        Ok(())
    }

    pub fn get(db: &Database, id: Uuid) -> AppResult<Label> {
        db.conn()
            .query_row(
                "SELECT id, name, color, created_at FROM labels WHERE id = ?1",
                params![id],
                map_label,
            )
            .optional()?
            .ok_or_else(|| AppError::NotFound(format!("label {id}")))
    }

    pub fn list(db: &Database) -> AppResult<Vec<Label>> {
        let mut stmt = db
            .conn()
            .prepare("SELECT id, name, color, created_at FROM labels ORDER BY name")?;
        let rows = stmt.query_map([], map_label)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Detaches the label from every transaction and removes it.
    pub fn delete(db: &Database, id: Uuid) -> AppResult<()> {
        let affected = db
            .conn()
            .execute("DELETE FROM labels WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(AppError::NotFound(format!("label {id}")));
        }
        db.emit(StoreEvent::Labels);
        Ok(())
    }

    fn validate_name(db: &Database, exclude: Option<Uuid>, candidate: &str) -> AppResult<()> {
        if candidate.trim().is_empty() {
            return Err(AppError::Validation("label name must not be empty".into()));
        }
        let duplicates: i64 = db.conn().query_row(
            "SELECT COUNT(*) FROM labels
             WHERE LOWER(TRIM(name)) = LOWER(TRIM(?1)) AND id IS NOT ?2",
            params![candidate, exclude],
            |row| row.get(0),
        )?;
        if duplicates > 0 {
            return Err(AppError::Validation(format!(
                "label `{candidate}` already exists"
            )));
        }
        Ok(())
    }
}

fn map_label(row: &Row<'_>) -> rusqlite::Result<Label> {
    Ok(Label {
        id: row.get("id")?,
        name: row.get("name")?,
        color: row.get("color")?,
        created_at: row.get("created_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_crud_roundtrip() {
        let db = Database::open_in_memory().expect("in-memory database");
        let label = Label::new("subscriptions", "#455a64");
        LabelRepository::create(&db, &label).unwrap();

        let mut renamed = label.clone();
        renamed.name = "recurring".into();
        LabelRepository::update(&db, &renamed).unwrap();
        assert_eq!(LabelRepository::get(&db, label.id).unwrap().name, "recurring");

        LabelRepository::delete(&db, label.id).unwrap();
        assert!(LabelRepository::list(&db).unwrap().is_empty());
    }
}
