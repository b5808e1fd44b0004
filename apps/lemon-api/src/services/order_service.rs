//! Order service.
//!
//! ## Visibility
//! ```text
//! list / view items ──► OrderScope::for_caller
//!                        Admin, Manager → all
//!                        DeliveryCrew   → assigned to caller
//!                        Customer       → owned by caller
//!
//! Orders outside the caller's scope report NotFound, never Forbidden,
//! so their existence is not revealed.
//! ```

use lemon_core::{Caller, Operation, Order, OrderItem, OrderItemDetail, OrderScope};
use lemon_db::Database;
use serde::{Deserialize, Serialize};

use super::{authorize, require_caller, MessageResponse};
use crate::error::{ApiError, ApiResult};

/// Body of `PUT /api/orders/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct AssignCrewRequest {
    pub delivery_crew: String,
}

/// Response for a placed order.
#[derive(Debug, Clone, Serialize)]
pub struct OrderPlacedResponse {
    pub message: String,
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Order service implementation.
#[derive(Debug, Clone)]
pub struct OrderService {
    db: Database,
}

impl OrderService {
    pub fn new(db: Database) -> Self {
        OrderService { db }
    }

    /// Converts the caller's cart into an order.
    pub async fn create(&self, caller: Option<&Caller>) -> ApiResult<OrderPlacedResponse> {
        let caller = require_caller(caller, Operation::CreateOrder)?;

        let placed = self.db.orders().create_from_cart(&caller.user_id).await?;

        Ok(OrderPlacedResponse {
            message: format!(
                "Your order has been placed! Your order number is {}",
                placed.order.id
            ),
            order: placed.order,
            items: placed.items,
        })
    }

    /// Lists the orders visible to the caller.
    pub async fn list(&self, caller: Option<&Caller>) -> ApiResult<Vec<Order>> {
        let caller = require_caller(caller, Operation::ListOrders)?;
        let scope = OrderScope::for_caller(caller);

        Ok(self.db.orders().list(&scope).await?)
    }

    /// Lists an order's items with current menu titles and prices.
    pub async fn items(
        &self,
        caller: Option<&Caller>,
        order_id: &str,
    ) -> ApiResult<Vec<OrderItemDetail>> {
        let caller = require_caller(caller, Operation::ViewOrderItems)?;

        let order = self.db.orders().require(order_id).await?;
        if !OrderScope::for_caller(caller).permits(&order) {
            return Err(ApiError::not_found("Order", order_id));
        }

        Ok(self.db.orders().items_detail(order_id).await?)
    }

    /// Flips the order between placed and out for delivery.
    pub async fn toggle_status(
        &self,
        caller: Option<&Caller>,
        order_id: &str,
    ) -> ApiResult<MessageResponse> {
        authorize(caller, Operation::ToggleOrderStatus)?;

        let (previous, order) = self.db.orders().toggle_status(order_id).await?;

        Ok(MessageResponse::new(format!(
            "Order status of the order id:{} has changed to {} from {}",
            order.id, order.status, previous
        )))
    }

    /// Assigns a delivery crew member. The user only has to exist.
    pub async fn assign_delivery_crew(
        &self,
        caller: Option<&Caller>,
        order_id: &str,
        request: AssignCrewRequest,
    ) -> ApiResult<MessageResponse> {
        authorize(caller, Operation::AssignDeliveryCrew)?;

        let (order, crew) = self
            .db
            .orders()
            .assign_delivery_crew(order_id, &request.delivery_crew)
            .await?;

        Ok(MessageResponse::new(format!(
            "{} has been assigned as a delivery partner for the order id:{}",
            crew.username, order.id
        )))
    }

    /// Deletes an order and its items.
    pub async fn delete(&self, caller: Option<&Caller>, order_id: &str) -> ApiResult<MessageResponse> {
        authorize(caller, Operation::DeleteOrder)?;

        self.db.orders().delete(order_id).await?;

        Ok(MessageResponse::new(format!(
            "Order with order id {} has been deleted",
            order_id
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::services::cart_service::{AddToCartRequest, CartService};
    use crate::services::testing;
    use lemon_core::{Money, OrderStatus, Role};

    async fn place(db: &Database, caller: &Caller, price_cents: i64) -> Order {
        let item = testing::item(db, "Dish", price_cents).await;
        CartService::new(db.clone())
            .add(
                Some(caller),
                AddToCartRequest {
                    menuitem: item.id,
                    quantity: 1,
                },
            )
            .await
            .unwrap();
        OrderService::new(db.clone())
            .create(Some(caller))
            .await
            .unwrap()
            .order
    }

    #[tokio::test]
    async fn test_create_order_message_and_total() {
        let db = testing::db().await;
        let alice = testing::user(&db, "alice").await;
        let caller = testing::customer(&alice);
        let a = testing::item(&db, "A", 1000).await;
        let b = testing::item(&db, "B", 500).await;
        let carts = CartService::new(db.clone());
        for (id, qty) in [(&a.id, 2), (&b.id, 1)] {
            carts
                .add(
                    Some(&caller),
                    AddToCartRequest {
                        menuitem: id.clone(),
                        quantity: qty,
                    },
                )
                .await
                .unwrap();
        }

        let placed = OrderService::new(db.clone()).create(Some(&caller)).await.unwrap();

        assert_eq!(placed.order.total(), Money::from_cents(2500));
        assert_eq!(placed.items.len(), 2);
        assert_eq!(
            placed.message,
            format!("Your order has been placed! Your order number is {}", placed.order.id)
        );
        assert!(carts.list(Some(&caller)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_cart_is_bad_request() {
        let db = testing::db().await;
        let alice = testing::user(&db, "alice").await;
        let service = OrderService::new(db);

        let err = service
            .create(Some(&testing::customer(&alice)))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::BadRequest);
    }

    #[tokio::test]
    async fn test_list_scoping_by_role() {
        let db = testing::db().await;
        let alice = testing::user(&db, "alice").await;
        let bob = testing::user(&db, "bob").await;
        let crew = testing::user(&db, "crew").await;
        let boss = testing::user(&db, "boss").await;
        let manager = testing::with_role(&boss, Role::Manager);

        let alice_order = place(&db, &testing::customer(&alice), 100).await;
        let bob_order = place(&db, &testing::customer(&bob), 200).await;

        let service = OrderService::new(db.clone());
        service
            .assign_delivery_crew(
                Some(&manager),
                &bob_order.id,
                AssignCrewRequest {
                    delivery_crew: crew.id.clone(),
                },
            )
            .await
            .unwrap();

        let mine = service.list(Some(&testing::customer(&alice))).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, alice_order.id);

        let assigned = service
            .list(Some(&testing::with_role(&crew, Role::DeliveryCrew)))
            .await
            .unwrap();
        assert_eq!(assigned.len(), 1);
        assert_eq!(assigned[0].id, bob_order.id);

        let all = service.list(Some(&manager)).await.unwrap();
        assert_eq!(all.len(), 2);

        let admin = testing::with_role(&boss, Role::Admin);
        assert_eq!(service.list(Some(&admin)).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_items_hidden_outside_scope() {
        let db = testing::db().await;
        let alice = testing::user(&db, "alice").await;
        let bob = testing::user(&db, "bob").await;
        let order = place(&db, &testing::customer(&alice), 100).await;
        let service = OrderService::new(db);

        let items = service
            .items(Some(&testing::customer(&alice)), &order.id)
            .await
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Dish");

        let err = service
            .items(Some(&testing::customer(&bob)), &order.id)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_toggle_status_message() {
        let db = testing::db().await;
        let alice = testing::user(&db, "alice").await;
        let caller = testing::customer(&alice);
        let order = place(&db, &caller, 100).await;
        let service = OrderService::new(db.clone());

        let msg = service.toggle_status(Some(&caller), &order.id).await.unwrap();
        assert_eq!(
            msg.message,
            format!(
                "Order status of the order id:{} has changed to out for delivery from placed",
                order.id
            )
        );

        service.toggle_status(Some(&caller), &order.id).await.unwrap();
        let stored = db.orders().require(&order.id).await.unwrap();
        assert_eq!(stored.status, OrderStatus::Placed);

        let err = service.toggle_status(Some(&caller), "missing").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_staff_only_operations() {
        let db = testing::db().await;
        let alice = testing::user(&db, "alice").await;
        let caller = testing::customer(&alice);
        let order = place(&db, &caller, 100).await;
        let service = OrderService::new(db.clone());

        let err = service.delete(Some(&caller), &order.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);

        let err = service
            .assign_delivery_crew(
                Some(&caller),
                &order.id,
                AssignCrewRequest {
                    delivery_crew: alice.id.clone(),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);

        let err = service.delete(None, &order.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);

        let admin = testing::with_role(&alice, Role::Admin);
        let msg = service.delete(Some(&admin), &order.id).await.unwrap();
        assert_eq!(
            msg.message,
            format!("Order with order id {} has been deleted", order.id)
        );
        assert!(db.orders().get_by_id(&order.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_assign_crew_message_and_missing_order() {
        let db = testing::db().await;
        let alice = testing::user(&db, "alice").await;
        let crew = testing::user(&db, "dave").await;
        let order = place(&db, &testing::customer(&alice), 100).await;
        let manager = testing::with_role(&alice, Role::Manager);
        let service = OrderService::new(db);

        let msg = service
            .assign_delivery_crew(
                Some(&manager),
                &order.id,
                AssignCrewRequest {
                    delivery_crew: crew.id.clone(),
                },
            )
            .await
            .unwrap();
        assert_eq!(
            msg.message,
            format!("dave has been assigned as a delivery partner for the order id:{}", order.id)
        );

        let err = service
            .assign_delivery_crew(
                Some(&manager),
                "missing",
                AssignCrewRequest {
                    delivery_crew: crew.id,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
