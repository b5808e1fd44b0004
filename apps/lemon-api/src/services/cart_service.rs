//! Cart service.
//!
//! Every operation acts on the authenticated caller's own cart.

use lemon_core::{Caller, CartLine, Operation};
use lemon_db::Database;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{require_caller, MessageResponse};
use crate::error::ApiResult;

/// Body of `POST /api/cart/menu-items`.
#[derive(Debug, Clone, Deserialize)]
pub struct AddToCartRequest {
    pub menuitem: String,
    pub quantity: i64,
}

/// Response for a successful add.
#[derive(Debug, Clone, Serialize)]
pub struct CartAddedResponse {
    pub message: String,
    pub line: CartLine,
}

/// Cart service implementation.
#[derive(Debug, Clone)]
pub struct CartService {
    db: Database,
}

impl CartService {
    pub fn new(db: Database) -> Self {
        CartService { db }
    }

    /// Lists the caller's cart.
    pub async fn list(&self, caller: Option<&Caller>) -> ApiResult<Vec<CartLine>> {
        let caller = require_caller(caller, Operation::ViewCart)?;
        Ok(self.db.carts().list(&caller.user_id).await?)
    }

    /// Adds a menu item to the caller's cart at its current price.
    pub async fn add(
        &self,
        caller: Option<&Caller>,
        request: AddToCartRequest,
    ) -> ApiResult<CartAddedResponse> {
        let caller = require_caller(caller, Operation::AddToCart)?;

        let line = self
            .db
            .carts()
            .add_item(&caller.user_id, &request.menuitem, request.quantity)
            .await?;

        Ok(CartAddedResponse {
            message: "Item added to cart!".to_string(),
            line,
        })
    }

    /// Removes one menu item from the caller's cart.
    pub async fn remove(
        &self,
        caller: Option<&Caller>,
        menu_item_id: &str,
    ) -> ApiResult<MessageResponse> {
        let caller = require_caller(caller, Operation::RemoveFromCart)?;

        self.db
            .carts()
            .remove_item(&caller.user_id, menu_item_id)
            .await?;

        Ok(MessageResponse::new("Item removed from cart"))
    }

    /// Empties the caller's cart. Succeeds on an empty cart.
    pub async fn clear(&self, caller: Option<&Caller>) -> ApiResult<MessageResponse> {
        let caller = require_caller(caller, Operation::ClearCart)?;

        let removed = self.db.carts().clear(&caller.user_id).await?;
        info!(user_id = %caller.user_id, removed, "Cart cleared");

        Ok(MessageResponse::new("All items removed from the cart"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::services::testing;

    #[tokio::test]
    async fn test_add_list_remove() {
        let db = testing::db().await;
        let alice = testing::user(&db, "alice").await;
        let caller = testing::customer(&alice);
        let item = testing::item(&db, "Greek Salad", 1250).await;
        let service = CartService::new(db);

        let added = service
            .add(
                Some(&caller),
                AddToCartRequest {
                    menuitem: item.id.clone(),
                    quantity: 2,
                },
            )
            .await
            .unwrap();
        assert_eq!(added.message, "Item added to cart!");
        assert_eq!(added.line.line_total_cents, 2500);

        let lines = service.list(Some(&caller)).await.unwrap();
        assert_eq!(lines.len(), 1);

        let removed = service.remove(Some(&caller), &item.id).await.unwrap();
        assert_eq!(removed.message, "Item removed from cart");

        let err = service.remove(Some(&caller), &item.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_duplicate_add_is_conflict() {
        let db = testing::db().await;
        let alice = testing::user(&db, "alice").await;
        let caller = testing::customer(&alice);
        let item = testing::item(&db, "Greek Salad", 1250).await;
        let service = CartService::new(db);

        let request = AddToCartRequest {
            menuitem: item.id.clone(),
            quantity: 1,
        };
        service.add(Some(&caller), request.clone()).await.unwrap();
        let err = service.add(Some(&caller), request).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::Conflict);
        assert_eq!(service.list(Some(&caller)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_zero_quantity_is_validation_error() {
        let db = testing::db().await;
        let alice = testing::user(&db, "alice").await;
        let item = testing::item(&db, "Greek Salad", 1250).await;
        let service = CartService::new(db);

        let err = service
            .add(
                Some(&testing::customer(&alice)),
                AddToCartRequest {
                    menuitem: item.id,
                    quantity: 0,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_anonymous_rejected() {
        let db = testing::db().await;
        let service = CartService::new(db);

        let err = service.list(None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);
        let err = service.clear(None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);
    }

    #[tokio::test]
    async fn test_clear_twice() {
        let db = testing::db().await;
        let alice = testing::user(&db, "alice").await;
        let caller = testing::customer(&alice);
        let service = CartService::new(db);

        let first = service.clear(Some(&caller)).await.unwrap();
        let second = service.clear(Some(&caller)).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.message, "All items removed from the cart");
    }
}
