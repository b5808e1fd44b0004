//! # Cart Math
//!
//! Pure functions behind the cart → order transition.
//!
//! ## Cart → Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart to Order Conversion                             │
//! │                                                                         │
//! │  add to cart ──► snapshot_line(item, qty)                              │
//! │                  unit price frozen, line total = qty × price            │
//! │                                                                         │
//! │  place order ──► build_order(lines)                                    │
//! │                  ├── lines empty?  → CoreError::EmptyCart              │
//! │                  ├── total = Σ line totals (integer cents, checked)    │
//! │                  ├── Order { status: Placed, crew: None, date }        │
//! │                  └── one OrderItem per line (menu item + quantity)     │
//! │                                                                         │
//! │  The database layer persists the result and clears the cart inside     │
//! │  one transaction.                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{CartLine, MenuItem, Order, OrderItem, OrderStatus, PlacedOrder};
use crate::validation::validate_quantity;

/// Creates a cart line for `item`, freezing its current price.
///
/// ## Errors
/// - `Validation` if `quantity < 1`
/// - `AmountOverflow` if `quantity × price` does not fit in i64 cents
///
/// ## Example
/// ```rust
/// # use chrono::Utc;
/// # use lemon_core::{cart::snapshot_line, MenuItem};
/// let item = MenuItem {
///     id: "item-a".into(),
///     title: "Bruschetta".into(),
///     price_cents: 1000,
///     featured: false,
///     category_id: "starters".into(),
///     created_at: Utc::now(),
///     updated_at: Utc::now(),
/// };
///
/// let line = snapshot_line("line-1".into(), "user-1", &item, 2, Utc::now()).unwrap();
/// assert_eq!(line.unit_price_cents, 1000);
/// assert_eq!(line.line_total_cents, 2000);
/// ```
pub fn snapshot_line(
    id: String,
    user_id: &str,
    item: &MenuItem,
    quantity: i64,
    added_at: DateTime<Utc>,
) -> CoreResult<CartLine> {
    validate_quantity(quantity)?;

    let line_total = item
        .price()
        .checked_multiply_quantity(quantity)
        .ok_or_else(|| CoreError::overflow("cart line total"))?;

    Ok(CartLine {
        id,
        user_id: user_id.to_string(),
        menu_item_id: item.id.clone(),
        quantity,
        unit_price_cents: item.price_cents,
        line_total_cents: line_total.cents(),
        added_at,
    })
}

/// Computes the exact order total of a set of cart lines.
pub fn order_total(lines: &[CartLine]) -> CoreResult<Money> {
    Money::checked_sum(lines.iter().map(CartLine::line_total))
        .ok_or_else(|| CoreError::overflow("order total"))
}

/// Builds the order and its items from a cart snapshot.
///
/// `next_id` supplies identifiers for the order items; the caller owns id
/// generation so this stays deterministic under test.
///
/// ## Errors
/// - `EmptyCart` if `lines` is empty
/// - `AmountOverflow` if the total does not fit in i64 cents
pub fn build_order<F>(
    order_id: String,
    user_id: &str,
    lines: &[CartLine],
    date: NaiveDate,
    created_at: DateTime<Utc>,
    mut next_id: F,
) -> CoreResult<PlacedOrder>
where
    F: FnMut() -> String,
{
    if lines.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    let total = order_total(lines)?;

    let order = Order {
        id: order_id,
        user_id: user_id.to_string(),
        total_cents: total.cents(),
        status: OrderStatus::Placed,
        delivery_crew_id: None,
        date,
        created_at,
    };

    let items = lines
        .iter()
        .map(|line| OrderItem {
            id: next_id(),
            order_id: order.id.clone(),
            menu_item_id: line.menu_item_id.clone(),
            quantity: line.quantity,
        })
        .collect();

    Ok(PlacedOrder { order, items })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn test_item(id: &str, price_cents: i64) -> MenuItem {
        MenuItem {
            id: id.to_string(),
            title: format!("Item {}", id),
            price_cents,
            featured: false,
            category_id: "mains".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn line(id: &str, item: &MenuItem, qty: i64) -> CartLine {
        snapshot_line(id.to_string(), "user-1", item, qty, Utc::now()).unwrap()
    }

    fn counter() -> impl FnMut() -> String {
        let mut n = 0;
        move || {
            n += 1;
            format!("item-{}", n)
        }
    }

    #[test]
    fn test_snapshot_line_computes_total() {
        let item = test_item("a", 1099);
        let line = line("l1", &item, 3);

        assert_eq!(line.unit_price(), Money::from_cents(1099));
        assert_eq!(line.line_total(), Money::from_cents(3297));
        assert_eq!(line.menu_item_id, "a");
        assert_eq!(line.user_id, "user-1");
    }

    #[test]
    fn test_snapshot_line_rejects_zero_quantity() {
        let item = test_item("a", 1000);
        let result = snapshot_line("l1".to_string(), "user-1", &item, 0, Utc::now());
        assert!(matches!(result, Err(CoreError::Validation(_))));
    }

    #[test]
    fn test_snapshot_line_overflow() {
        let item = test_item("a", i64::MAX);
        let result = snapshot_line("l1".to_string(), "user-1", &item, 2, Utc::now());
        assert!(matches!(result, Err(CoreError::AmountOverflow { .. })));
    }

    #[test]
    fn test_snapshot_is_independent_of_later_price_changes() {
        let mut item = test_item("a", 1000);
        let frozen = line("l1", &item, 1);

        item.price_cents = 5000;

        assert_eq!(frozen.unit_price_cents, 1000);
        assert_eq!(frozen.line_total_cents, 1000);
    }

    #[test]
    fn test_build_order_two_lines() {
        let a = test_item("a", 1000);
        let b = test_item("b", 500);
        let lines = vec![line("l1", &a, 2), line("l2", &b, 1)];
        let today = Utc::now().date_naive();

        let placed =
            build_order("order-1".to_string(), "user-1", &lines, today, Utc::now(), counter())
                .unwrap();

        assert_eq!(placed.order.total(), Money::from_cents(2500));
        assert_eq!(placed.order.status, OrderStatus::Placed);
        assert_eq!(placed.order.delivery_crew_id, None);
        assert_eq!(placed.order.date, today);
        assert_eq!(placed.items.len(), 2);
        assert!(placed.items.iter().all(|i| i.order_id == "order-1"));
        assert_eq!(placed.items[0].quantity, 2);
        assert_eq!(placed.items[1].menu_item_id, "b");
    }

    #[test]
    fn test_build_order_empty_cart() {
        let result = build_order(
            "order-1".to_string(),
            "user-1",
            &[],
            Utc::now().date_naive(),
            Utc::now(),
            counter(),
        );
        assert!(matches!(result, Err(CoreError::EmptyCart)));
    }

    #[test]
    fn test_order_total_many_lines_exact() {
        let item = test_item("a", 33);
        let lines: Vec<CartLine> = (0..3_000).map(|i| line(&i.to_string(), &item, 3)).collect();

        assert_eq!(order_total(&lines).unwrap(), Money::from_cents(3_000 * 99));
    }
}
