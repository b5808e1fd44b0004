//! # Menu Repository
//!
//! Database operations for menu items and categories.
//!
//! ## Key Operations
//! - Catalog lookup used by the cart (`get_by_id` / `require`)
//! - CRUD for menu items and categories
//! - Featured flag toggle
//!
//! ## Price Changes
//! ```text
//! UPDATE menu_items SET price_cents = 1500
//!      │
//!      ├── cart_lines.unit_price_cents   unchanged (snapshot)
//!      └── orders.total_cents            unchanged (frozen)
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use lemon_core::{Category, MenuItem};

const MENU_ITEM_COLUMNS: &str =
    "id, title, price_cents, featured, category_id, created_at, updated_at";

/// Repository for menu item database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = MenuRepository::new(pool);
///
/// let items = repo.list().await?;
/// let item = repo.require("uuid-here").await?;
/// ```
#[derive(Debug, Clone)]
pub struct MenuRepository {
    pool: SqlitePool,
}

impl MenuRepository {
    /// Creates a new MenuRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MenuRepository { pool }
    }

    /// Lists every menu item ordered by title.
    pub async fn list(&self) -> DbResult<Vec<MenuItem>> {
        let sql = format!("SELECT {MENU_ITEM_COLUMNS} FROM menu_items ORDER BY title, id");

        let items = sqlx::query_as::<_, MenuItem>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = items.len(), "Listed menu items");
        Ok(items)
    }

    /// Gets a menu item by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<MenuItem>> {
        let sql = format!("SELECT {MENU_ITEM_COLUMNS} FROM menu_items WHERE id = ?1");

        let item = sqlx::query_as::<_, MenuItem>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(item)
    }

    /// Gets a menu item by ID, failing with `NotFound` if absent.
    pub async fn require(&self, id: &str) -> DbResult<MenuItem> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Menu item", id))
    }

    /// Inserts a new menu item.
    ///
    /// ## Errors
    /// - `NotFound` if `category_id` does not reference a category
    pub async fn insert(&self, item: &MenuItem) -> DbResult<MenuItem> {
        debug!(id = %item.id, title = %item.title, "Inserting menu item");

        sqlx::query(
            r#"
            INSERT INTO menu_items (
                id, title, price_cents, featured, category_id, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&item.id)
        .bind(&item.title)
        .bind(item.price_cents)
        .bind(item.featured)
        .bind(&item.category_id)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| category_fk(e, &item.category_id))?;

        Ok(item.clone())
    }

    /// Replaces the editable fields of a menu item.
    ///
    /// Existing cart lines and orders keep their snapshotted prices.
    pub async fn update(&self, item: &MenuItem) -> DbResult<MenuItem> {
        debug!(id = %item.id, price_cents = item.price_cents, "Updating menu item");

        let sql = format!(
            r#"
            UPDATE menu_items SET
                title = ?2,
                price_cents = ?3,
                featured = ?4,
                category_id = ?5,
                updated_at = ?6
            WHERE id = ?1
            RETURNING {MENU_ITEM_COLUMNS}
            "#
        );

        sqlx::query_as::<_, MenuItem>(&sql)
            .bind(&item.id)
            .bind(&item.title)
            .bind(item.price_cents)
            .bind(item.featured)
            .bind(&item.category_id)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| category_fk(e, &item.category_id))?
            .ok_or_else(|| DbError::not_found("Menu item", &item.id))
    }

    /// Flips the featured flag and returns the updated item.
    pub async fn toggle_featured(&self, id: &str) -> DbResult<MenuItem> {
        debug!(id = %id, "Toggling featured flag");

        let sql = format!(
            r#"
            UPDATE menu_items SET
                featured = NOT featured,
                updated_at = ?2
            WHERE id = ?1
            RETURNING {MENU_ITEM_COLUMNS}
            "#
        );

        sqlx::query_as::<_, MenuItem>(&sql)
            .bind(id)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Menu item", id))
    }

    /// Deletes a menu item. Cart lines referencing it go with it.
    ///
    /// ## Errors
    /// - `Referenced` if any placed order contains the item
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting menu item");

        let result = sqlx::query("DELETE FROM menu_items WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::ForeignKeyViolation { .. } => DbError::Referenced {
                    entity: "Menu item".to_string(),
                    id: id.to_string(),
                },
                other => other,
            })?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Menu item", id));
        }

        Ok(())
    }

    /// Counts menu items.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM menu_items")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Repository for menu categories.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Lists categories ordered by title.
    pub async fn list(&self) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, slug, title FROM categories ORDER BY title, id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Inserts a category.
    ///
    /// ## Errors
    /// - `UniqueViolation` if the slug is taken
    pub async fn insert(&self, category: &Category) -> DbResult<Category> {
        debug!(id = %category.id, slug = %category.slug, "Inserting category");

        sqlx::query("INSERT INTO categories (id, slug, title) VALUES (?1, ?2, ?3)")
            .bind(&category.id)
            .bind(&category.slug)
            .bind(&category.title)
            .execute(&self.pool)
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::UniqueViolation { .. } => DbError::duplicate("slug", &category.slug),
                other => other,
            })?;

        Ok(category.clone())
    }
}

/// Maps a foreign key failure on `menu_items.category_id` to `NotFound`.
fn category_fk(err: sqlx::Error, category_id: &str) -> DbError {
    match DbError::from(err) {
        DbError::ForeignKeyViolation { .. } => DbError::not_found("Category", category_id),
        other => other,
    }
}

/// Generates a new menu item ID.
pub fn generate_menu_item_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generates a new category ID.
pub fn generate_category_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
