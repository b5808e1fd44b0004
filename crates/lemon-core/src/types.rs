//! # Domain Types
//!
//! Core domain types used throughout Little Lemon.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    MenuItem     │   │    CartLine     │   │     Order       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │◄──│  menu_item_id   │   │  id (UUID)      │       │
//! │  │  title          │   │  user_id        │   │  user_id        │       │
//! │  │  price_cents    │   │  unit_price ❄   │   │  total_cents ❄  │       │
//! │  │  category_id    │   │  line_total     │   │  status         │       │
//! │  │  featured       │   │  quantity       │   │  delivery_crew  │       │
//! │  └─────────────────┘   └─────────────────┘   └────────┬────────┘       │
//! │                                                        │ 1..n           │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌────────▼────────┐       │
//! │  │    Category     │   │   OrderStatus   │   │   OrderItem     │       │
//! │  │  slug, title    │   │  Placed         │   │  menu_item_id   │       │
//! │  └─────────────────┘   │  OutForDelivery │   │  quantity       │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ❄ = frozen at creation, never recomputed from the catalog             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Catalog
// =============================================================================

/// A menu category (e.g. "mains", "desserts").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Category {
    pub id: String,
    /// URL-safe business key.
    pub slug: String,
    pub title: String,
}

/// An item on the menu.
///
/// Read-only to the cart and order engines: they only consume its id and
/// current price.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct MenuItem {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown on the menu.
    pub title: String,

    /// Current price in cents.
    pub price_cents: i64,

    /// Whether the item is highlighted on the menu.
    pub featured: bool,

    /// Category this item is listed under.
    pub category_id: String,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl MenuItem {
    /// Returns the current price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Users & Groups
// =============================================================================

/// A user known to the identity store.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    /// Superuser flag; grants the Admin role.
    pub is_admin: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A role group whose membership is administered through the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Group {
    Manager,
    DeliveryCrew,
}

impl Group {
    /// Human-readable group name used in response messages.
    pub const fn label(&self) -> &'static str {
        match self {
            Group::Manager => "Manager",
            Group::DeliveryCrew => "Delivery crew",
        }
    }
}

// =============================================================================
// Cart
// =============================================================================

/// One user's pending quantity of one menu item.
///
/// ## Snapshot Pattern
/// `unit_price_cents` is copied from the menu item when the line is created
/// and is never updated afterwards, even if the catalog price changes.
/// Lines are never mutated in place: remove and re-add to change quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CartLine {
    pub id: String,
    pub user_id: String,
    pub menu_item_id: String,
    /// Always >= 1.
    pub quantity: i64,
    /// Unit price in cents at time of adding (frozen).
    pub unit_price_cents: i64,
    /// unit_price × quantity.
    pub line_total_cents: i64,
    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    /// Returns the frozen unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// The delivery status of an order.
///
/// Two states with a single bidirectional toggle between them; there is no
/// terminal state (deletion removes the order regardless of status).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Initial state on creation.
    Placed,
    /// Picked up by (or completed by) the delivery crew.
    OutForDelivery,
}

impl OrderStatus {
    /// Returns the other state.
    pub const fn toggled(self) -> Self {
        match self {
            OrderStatus::Placed => OrderStatus::OutForDelivery,
            OrderStatus::OutForDelivery => OrderStatus::Placed,
        }
    }

    /// Boolean view of the status (`false` = placed, `true` = out for delivery).
    pub const fn as_bool(self) -> bool {
        matches!(self, OrderStatus::OutForDelivery)
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Placed
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Placed => write!(f, "placed"),
            OrderStatus::OutForDelivery => write!(f, "out for delivery"),
        }
    }
}

// =============================================================================
// Order
// =============================================================================

/// An order created atomically from a user's cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: String,
    /// Owning customer.
    pub user_id: String,
    /// Sum of the cart line totals at creation time (frozen).
    pub total_cents: i64,
    pub status: OrderStatus,
    /// Assigned delivery crew member, set by a manager.
    pub delivery_crew_id: Option<String>,
    /// Calendar date the order was placed.
    #[ts(as = "String")]
    pub date: NaiveDate,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Returns the frozen total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Order Item
// =============================================================================

/// One menu item carried over from the cart into an order.
///
/// No per-item price is stored; the order total is authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub menu_item_id: String,
    pub quantity: i64,
}

/// An order item joined with the menu item's current title and price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderItemDetail {
    pub id: String,
    pub order_id: String,
    pub menu_item_id: String,
    pub title: String,
    /// Current catalog price, not the price paid.
    pub price_cents: i64,
    pub quantity: i64,
}

/// The result of converting a cart into an order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlacedOrder {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_default() {
        assert_eq!(OrderStatus::default(), OrderStatus::Placed);
        assert!(!OrderStatus::default().as_bool());
    }

    #[test]
    fn test_order_status_toggle_is_involution() {
        for status in [OrderStatus::Placed, OrderStatus::OutForDelivery] {
            assert_ne!(status.toggled(), status);
            assert_eq!(status.toggled().toggled(), status);
        }
    }

    #[test]
    fn test_order_status_serializes_snake_case() {
        let json = serde_json::to_string(&OrderStatus::OutForDelivery).unwrap();
        assert_eq!(json, "\"out_for_delivery\"");
    }

    #[test]
    fn test_group_labels() {
        assert_eq!(Group::Manager.label(), "Manager");
        assert_eq!(Group::DeliveryCrew.label(), "Delivery crew");
    }
}
