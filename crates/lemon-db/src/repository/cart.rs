//! # Cart Repository
//!
//! Per-user cart lines. Every method takes the owning user's id; there is no
//! way to reach another user's cart through this API.
//!
//! ## Duplicate Adds
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Two concurrent add_item(user, item) calls                              │
//! │                                                                         │
//! │  call A ──► INSERT cart_lines ... ──► ok                ──► 201        │
//! │  call B ──► INSERT cart_lines ... ──► UNIQUE violation  ──► 409        │
//! │                                                                         │
//! │  No SELECT-then-INSERT: the UNIQUE(user_id, menu_item_id) constraint   │
//! │  decides the winner atomically.                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::menu::MenuRepository;
use lemon_core::cart::snapshot_line;
use lemon_core::CartLine;

/// `UniqueViolation::field` reported when a menu item is already in the cart.
pub const DUPLICATE_CART_LINE: &str = "cart line for menu item";

pub(crate) const CART_LINE_COLUMNS: &str =
    "id, user_id, menu_item_id, quantity, unit_price_cents, line_total_cents, added_at";

/// Repository for cart line database operations.
#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

impl CartRepository {
    /// Creates a new CartRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CartRepository { pool }
    }

    /// Lists the user's cart lines, oldest first.
    pub async fn list(&self, user_id: &str) -> DbResult<Vec<CartLine>> {
        let sql = format!(
            "SELECT {CART_LINE_COLUMNS} FROM cart_lines WHERE user_id = ?1 ORDER BY added_at, id"
        );

        let lines = sqlx::query_as::<_, CartLine>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(lines)
    }

    /// Adds a menu item to the user's cart.
    ///
    /// ## What This Does
    /// 1. Resolves the menu item (catalog lookup)
    /// 2. Snapshots its current price into a new line
    /// 3. Inserts the line, relying on the UNIQUE constraint for duplicates
    ///
    /// ## Errors
    /// - `Domain(Validation)` if `quantity < 1`
    /// - `NotFound` if the menu item does not exist
    /// - `UniqueViolation` if the item is already in this user's cart
    pub async fn add_item(
        &self,
        user_id: &str,
        menu_item_id: &str,
        quantity: i64,
    ) -> DbResult<CartLine> {
        lemon_core::validation::validate_quantity(quantity)
            .map_err(lemon_core::CoreError::from)?;

        let item = MenuRepository::new(self.pool.clone())
            .require(menu_item_id)
            .await?;

        let line = snapshot_line(generate_cart_line_id(), user_id, &item, quantity, Utc::now())?;

        debug!(
            user_id = %user_id,
            menu_item_id = %menu_item_id,
            quantity = quantity,
            unit_price_cents = line.unit_price_cents,
            "Adding cart line"
        );

        self.insert(&line).await?;
        Ok(line)
    }

    /// Inserts a prepared cart line.
    pub async fn insert(&self, line: &CartLine) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO cart_lines (
                id, user_id, menu_item_id, quantity,
                unit_price_cents, line_total_cents, added_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&line.id)
        .bind(&line.user_id)
        .bind(&line.menu_item_id)
        .bind(line.quantity)
        .bind(line.unit_price_cents)
        .bind(line.line_total_cents)
        .bind(line.added_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => {
                DbError::duplicate(DUPLICATE_CART_LINE, &line.menu_item_id)
            }
            DbError::ForeignKeyViolation { .. } => {
                DbError::not_found("Menu item", &line.menu_item_id)
            }
            other => other,
        })?;

        Ok(())
    }

    /// Removes the line for one menu item.
    ///
    /// ## Errors
    /// - `NotFound` if the user has no line for that item
    pub async fn remove_item(&self, user_id: &str, menu_item_id: &str) -> DbResult<()> {
        debug!(user_id = %user_id, menu_item_id = %menu_item_id, "Removing cart line");

        let result = sqlx::query("DELETE FROM cart_lines WHERE user_id = ?1 AND menu_item_id = ?2")
            .bind(user_id)
            .bind(menu_item_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Cart line", menu_item_id));
        }

        Ok(())
    }

    /// Removes every line for the user. Succeeds on an empty cart.
    ///
    /// ## Returns
    /// Number of lines removed.
    pub async fn clear(&self, user_id: &str) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM cart_lines WHERE user_id = ?1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        debug!(user_id = %user_id, removed = result.rows_affected(), "Cleared cart");
        Ok(result.rows_affected())
    }
}

/// Generates a new cart line ID.
pub fn generate_cart_line_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::testing::{seed_item, seed_user};
    use lemon_core::{CoreError, Money};

    #[tokio::test]
    async fn test_add_then_list() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = seed_user(&db, "alice").await;
        let item = seed_item(&db, "Greek Salad", 1250).await;

        let line = db.carts().add_item(&user.id, &item.id, 2).await.unwrap();
        assert_eq!(line.line_total(), Money::from_cents(2500));

        let lines = db.carts().list(&user.id).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0], line);
    }

    #[tokio::test]
    async fn test_add_duplicate_is_conflict() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = seed_user(&db, "alice").await;
        let item = seed_item(&db, "Greek Salad", 1250).await;

        db.carts().add_item(&user.id, &item.id, 1).await.unwrap();
        let err = db.carts().add_item(&user.id, &item.id, 3).await.unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { .. }));
        let lines = db.carts().list(&user.id).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 1);
    }

    #[tokio::test]
    async fn test_add_invalid_quantity() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = seed_user(&db, "alice").await;
        let item = seed_item(&db, "Greek Salad", 1250).await;

        let err = db.carts().add_item(&user.id, &item.id, 0).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));
        assert!(db.carts().list(&user.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_unknown_item() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = seed_user(&db, "alice").await;

        let err = db.carts().add_item(&user.id, "missing", 1).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_price_snapshot_survives_catalog_change() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = seed_user(&db, "alice").await;
        let mut item = seed_item(&db, "Bruschetta", 1000).await;

        db.carts().add_item(&user.id, &item.id, 1).await.unwrap();

        item.price_cents = 4000;
        db.menu().update(&item).await.unwrap();

        let lines = db.carts().list(&user.id).await.unwrap();
        assert_eq!(lines[0].unit_price_cents, 1000);
        assert_eq!(lines[0].line_total_cents, 1000);
    }

    #[tokio::test]
    async fn test_carts_are_isolated_per_user() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let alice = seed_user(&db, "alice").await;
        let bob = seed_user(&db, "bob").await;
        let item = seed_item(&db, "Greek Salad", 1250).await;

        db.carts().add_item(&alice.id, &item.id, 1).await.unwrap();
        db.carts().add_item(&bob.id, &item.id, 1).await.unwrap();

        // bob removing his own line leaves alice's intact
        db.carts().remove_item(&bob.id, &item.id).await.unwrap();
        assert_eq!(db.carts().list(&alice.id).await.unwrap().len(), 1);
        assert!(db.carts().list(&bob.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_missing_line() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = seed_user(&db, "alice").await;
        let item = seed_item(&db, "Greek Salad", 1250).await;

        let err = db.carts().remove_item(&user.id, &item.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = seed_user(&db, "alice").await;
        let a = seed_item(&db, "A", 100).await;
        let b = seed_item(&db, "B", 200).await;

        db.carts().add_item(&user.id, &a.id, 1).await.unwrap();
        db.carts().add_item(&user.id, &b.id, 1).await.unwrap();

        assert_eq!(db.carts().clear(&user.id).await.unwrap(), 2);
        assert_eq!(db.carts().clear(&user.id).await.unwrap(), 0);
        assert!(db.carts().list(&user.id).await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_adds_yield_one_line() {
        let path = std::env::temp_dir().join(format!("lemon-cart-{}.db", Uuid::new_v4()));
        let db = Database::new(DbConfig::new(&path).max_connections(8))
            .await
            .unwrap();
        let user = seed_user(&db, "alice").await;
        let item = seed_item(&db, "Greek Salad", 1250).await;

        const N: usize = 16;
        let mut handles = Vec::with_capacity(N);
        for _ in 0..N {
            let carts = db.carts();
            let user_id = user.id.clone();
            let item_id = item.id.clone();
            handles.push(tokio::spawn(async move {
                carts.add_item(&user_id, &item_id, 1).await
            }));
        }

        let mut ok = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => ok += 1,
                Err(DbError::UniqueViolation { .. }) => conflicts += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        let lines = db.carts().list(&user.id).await.unwrap();
        db.close().await;
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
        }

        assert_eq!(ok, 1);
        assert_eq!(conflicts, N - 1);
        assert_eq!(lines.len(), 1);
    }
}
