use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

use crate::domain::{Category, CategoryKind};
use crate::errors::{AppError, AppResult};
use crate::storage::{Database, StoreEvent};

pub struct CategoryRepository;

impl CategoryRepository {
    pub fn create(db: &Database, category: &Category) -> AppResult<()> {
        Self::validate_name(db, None, &category.name)?;
        db.conn().execute(
            "INSERT INTO categories (id, name, kind, icon, color, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                category.id,
                category.name,
                category.kind,
                category.icon,
                category.color,
                category.created_at,
                category.updated_at,
            ],
        )?;
        db.emit(StoreEvent::Categories);
        Ok(())
    }

    pub fn update(db: &Database, category: &Category) -> AppResult<()> {
        Self::validate_name(db, Some(category.id), &category.name)?;
        let affected = db.conn().execute(
            "UPDATE categories SET name = ?2, kind = ?3, icon = ?4, color = ?5, updated_at = ?6
             WHERE id = ?1",
            params![
                category.id,
                category.name,
                category.kind,
                category.icon,
                category.color,
                Utc::now(),
            ],
        )?;
        if affected == 0 {
            return Err(AppError::NotFound(format!("category {}", category.id)));
        }
        db.emit(StoreEvent::Categories);
        Ok(())
    }

    pub fn get(db: &Database, id: Uuid) -> AppResult<Category> {
        db.conn()
            .query_row(
                "SELECT id, name, kind, icon, color, created_at, updated_at
                 FROM categories WHERE id = ?1",
                params![id],
                map_category,
            )
            .optional()?
            .ok_or_else(|| AppError::NotFound(format!("category {id}")))
    }

    pub fn list(db: &Database, kind: Option<CategoryKind>) -> AppResult<Vec<Category>> {
        let mut stmt = db.conn().prepare(
            "SELECT id, name, kind, icon, color, created_at, updated_at
             FROM categories WHERE ?1 IS NULL OR kind = ?1 ORDER BY name",
        )?;
        let rows = stmt.query_map(params![kind], map_category)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Deletion is rejected while transactions or budgets still reference
    /// the category; callers re-point those first.
    pub fn delete(db: &Database, id: Uuid) -> AppResult<()> {
        let linked: i64 = db.conn().query_row(
            "SELECT (SELECT COUNT(*) FROM transactions WHERE category_id = ?1)
                  + (SELECT COUNT(*) FROM budgets WHERE category_id = ?1)",
            params![id],
            |row| row.get(0),
        )?;
        if linked > 0 {
            return Err(AppError::Validation(
                "category is referenced by transactions or budgets".into(),
            ));
        }
        let affected = db
            .conn()
            .execute("DELETE FROM categories WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(AppError::NotFound(format!("category {id}")));
        }
        db.emit(StoreEvent::Categories);
        Ok(())
    }

    pub(crate) fn ensure_exists(db: &Database, id: Uuid) -> AppResult<()> {
        let present: i64 = db.conn().query_row(
            "SELECT COUNT(*) FROM categories WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        if present == 0 {
            return Err(AppError::Validation(
                "linked category does not exist".into(),
            ));
        }
        Ok(())
    }

    fn validate_name(db: &Database, exclude: Option<Uuid>, candidate: &str) -> AppResult<()> {
        if candidate.trim().is_empty() {
            return Err(AppError::Validation(
                "category name must not be empty".into(),
            ));
        }
        let duplicates: i64 = db.conn().query_row(
            "SELECT COUNT(*) FROM categories
             WHERE LOWER(TRIM(name)) = LOWER(TRIM(?1)) AND id IS NOT ?2",
            params![candidate, exclude],
            |row| row.get(0),
        )?;
        if duplicates > 0 {
            return Err(AppError::Validation(format!(
                "category `{candidate}` already exists"
            )));
        }
        Ok(())
    }
}

fn map_category(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get("id")?,
        name: row.get("name")?,
        kind: row.get("kind")?,
        icon: row.get("icon")?,
        color: row.get("color")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
