//! # Order Repository
//!
//! Orders and order items, including the cart → order transaction.
//!
//! ## Order Creation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create_from_cart(user)                  one SQLite transaction         │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │   │                                                                     │
//! │   ├── DELETE FROM cart_lines WHERE user_id = ? RETURNING ...           │
//! │   │     snapshot + clear in one statement; takes the write lock, so    │
//! │   │     concurrent adds/removes for this user wait for COMMIT          │
//! │   │                                                                     │
//! │   ├── no rows? ──► ROLLBACK ──► EmptyCart                              │
//! │   │                                                                     │
//! │   ├── build_order(lines)        exact integer total                    │
//! │   ├── INSERT INTO orders                                               │
//! │   ├── INSERT INTO order_items   (one per line)                         │
//! │   │                                                                     │
//! │  COMMIT ─────────────────────► all visible at once, or nothing         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::cart::CART_LINE_COLUMNS;
use lemon_core::cart::build_order;
use lemon_core::{
    CartLine, CoreError, Order, OrderItem, OrderItemDetail, OrderScope, OrderStatus, PlacedOrder,
    User,
};

const ORDER_COLUMNS: &str =
    "id, user_id, total_cents, status, delivery_crew_id, date, created_at";

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Converts the user's cart into an order.
    ///
    /// ## Errors
    /// - `Domain(EmptyCart)` if the cart has no lines; nothing is written
    /// - `Domain(AmountOverflow)` if the total does not fit; nothing is written
    /// - `TransactionFailed` if the commit fails; nothing is written
    pub async fn create_from_cart(&self, user_id: &str) -> DbResult<PlacedOrder> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let sql = format!("DELETE FROM cart_lines WHERE user_id = ?1 RETURNING {CART_LINE_COLUMNS}");
        let mut lines = sqlx::query_as::<_, CartLine>(&sql)
            .bind(user_id)
            .fetch_all(&mut *tx)
            .await?;

        if lines.is_empty() {
            tx.rollback()
                .await
                .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
            return Err(CoreError::EmptyCart.into());
        }

        // RETURNING order is unspecified
        lines.sort_by(|a, b| a.added_at.cmp(&b.added_at).then_with(|| a.id.cmp(&b.id)));

        let now = Utc::now();
        let placed = match build_order(
            generate_order_id(),
            user_id,
            &lines,
            now.date_naive(),
            now,
            generate_order_item_id,
        ) {
            Ok(placed) => placed,
            Err(e) => {
                tx.rollback()
                    .await
                    .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
                return Err(e.into());
            }
        };

        insert_order(&mut tx, &placed).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            order_id = %placed.order.id,
            user_id = %user_id,
            items = placed.items.len(),
            total_cents = placed.order.total_cents,
            "Order placed"
        );

        Ok(placed)
    }

    /// Lists the orders inside `scope`, newest first.
    pub async fn list(&self, scope: &OrderScope) -> DbResult<Vec<Order>> {
        let orders = match scope {
            OrderScope::All => {
                let sql = format!("SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC, id");
                sqlx::query_as::<_, Order>(&sql)
                    .fetch_all(&self.pool)
                    .await?
            }
            OrderScope::AssignedTo(crew_id) => {
                let sql = format!(
                    "SELECT {ORDER_COLUMNS} FROM orders WHERE delivery_crew_id = ?1 ORDER BY created_at DESC, id"
                );
                sqlx::query_as::<_, Order>(&sql)
                    .bind(crew_id)
                    .fetch_all(&self.pool)
                    .await?
            }
            OrderScope::OwnedBy(user_id) => {
                let sql = format!(
                    "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = ?1 ORDER BY created_at DESC, id"
                );
                sqlx::query_as::<_, Order>(&sql)
                    .bind(user_id)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        debug!(count = orders.len(), ?scope, "Listed orders");
        Ok(orders)
    }

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1");

        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    /// Gets an order by ID, failing with `NotFound` if absent.
    pub async fn require(&self, id: &str) -> DbResult<Order> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", id))
    }

    /// Gets the items of an order.
    ///
    /// ## Errors
    /// - `NotFound` if the order does not exist
    pub async fn items(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        self.require(order_id).await?;

        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT id, order_id, menu_item_id, quantity FROM order_items WHERE order_id = ?1 ORDER BY rowid",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Gets the items of an order joined with each menu item's current
    /// title and price.
    pub async fn items_detail(&self, order_id: &str) -> DbResult<Vec<OrderItemDetail>> {
        self.require(order_id).await?;

        let items = sqlx::query_as::<_, OrderItemDetail>(
            r#"
            SELECT
                oi.id,
                oi.order_id,
                oi.menu_item_id,
                m.title,
                m.price_cents,
                oi.quantity
            FROM order_items oi
            INNER JOIN menu_items m ON m.id = oi.menu_item_id
            WHERE oi.order_id = ?1
            ORDER BY oi.rowid
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Flips the order status in a single statement.
    ///
    /// ## Returns
    /// `(previous_status, updated_order)`
    pub async fn toggle_status(&self, id: &str) -> DbResult<(OrderStatus, Order)> {
        let sql = format!(
            r#"
            UPDATE orders SET
                status = CASE status WHEN 'placed' THEN 'out_for_delivery' ELSE 'placed' END
            WHERE id = ?1
            RETURNING {ORDER_COLUMNS}
            "#
        );

        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Order", id))?;

        let previous = order.status.toggled();
        debug!(order_id = %id, from = %previous, to = %order.status, "Toggled order status");

        Ok((previous, order))
    }

    /// Assigns a delivery crew member to an order.
    ///
    /// The crew user only has to exist; group membership is not checked.
    ///
    /// ## Errors
    /// - `NotFound` if the user or the order does not exist (nothing changes)
    pub async fn assign_delivery_crew(&self, id: &str, crew_user_id: &str) -> DbResult<(Order, User)> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let crew = sqlx::query_as::<_, User>(
            "SELECT id, username, email, is_admin, created_at FROM users WHERE id = ?1",
        )
        .bind(crew_user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("User", crew_user_id))?;

        let sql = format!(
            "UPDATE orders SET delivery_crew_id = ?2 WHERE id = ?1 RETURNING {ORDER_COLUMNS}"
        );
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .bind(&crew.id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("Order", id))?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        debug!(order_id = %id, crew_user_id = %crew.id, "Assigned delivery crew");
        Ok((order, crew))
    }

    /// Deletes an order and, by cascade, its items.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM orders WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }

        debug!(order_id = %id, "Deleted order");
        Ok(())
    }
}

async fn insert_order(tx: &mut Transaction<'_, Sqlite>, placed: &PlacedOrder) -> DbResult<()> {
    let order = &placed.order;

    sqlx::query(
        r#"
        INSERT INTO orders (
            id, user_id, total_cents, status, delivery_crew_id, date, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(&order.id)
    .bind(&order.user_id)
    .bind(order.total_cents)
    .bind(order.status)
    .bind(&order.delivery_crew_id)
    .bind(order.date)
    .bind(order.created_at)
    .execute(&mut **tx)
    .await?;

    for item in &placed.items {
        sqlx::query(
            "INSERT INTO order_items (id, order_id, menu_item_id, quantity) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&item.id)
        .bind(&item.order_id)
        .bind(&item.menu_item_id)
        .bind(item.quantity)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

/// Generates a new order ID.
pub fn generate_order_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generates a new order item ID.
pub fn generate_order_item_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
