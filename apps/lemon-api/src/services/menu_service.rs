//! Menu catalog service: menu items and categories.

use chrono::Utc;
use lemon_core::validation::{validate_price_cents, validate_slug, validate_title};
use lemon_core::{Caller, Category, MenuItem, Operation};
use lemon_db::repository::menu::{generate_category_id, generate_menu_item_id};
use lemon_db::Database;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{authorize, MessageResponse};
use crate::error::ApiResult;

/// Body of `POST /api/menu-items` and `PUT /api/menu-items/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct MenuItemRequest {
    pub title: String,
    pub price_cents: i64,
    #[serde(default)]
    pub featured: bool,
    pub category_id: String,
}

impl MenuItemRequest {
    fn validate(&self) -> ApiResult<()> {
        validate_title(&self.title)?;
        validate_price_cents(self.price_cents)?;
        Ok(())
    }
}

/// Body of `POST /api/categories`.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRequest {
    pub slug: String,
    pub title: String,
}

/// Response for a featured-flag toggle.
#[derive(Debug, Clone, Serialize)]
pub struct FeaturedToggled {
    pub message: String,
    pub item: MenuItem,
}

/// Menu service implementation.
#[derive(Debug, Clone)]
pub struct MenuService {
    db: Database,
}

impl MenuService {
    pub fn new(db: Database) -> Self {
        MenuService { db }
    }

    /// Lists every menu item. Open to anonymous callers.
    pub async fn list(&self, caller: Option<&Caller>) -> ApiResult<Vec<MenuItem>> {
        authorize(caller, Operation::ListMenuItems)?;
        Ok(self.db.menu().list().await?)
    }

    pub async fn get(&self, caller: Option<&Caller>, id: &str) -> ApiResult<MenuItem> {
        authorize(caller, Operation::ViewMenuItem)?;
        Ok(self.db.menu().require(id).await?)
    }

    pub async fn create(
        &self,
        caller: Option<&Caller>,
        request: MenuItemRequest,
    ) -> ApiResult<MenuItem> {
        authorize(caller, Operation::CreateMenuItem)?;
        request.validate()?;

        let now = Utc::now();
        let item = self
            .db
            .menu()
            .insert(&MenuItem {
                id: generate_menu_item_id(),
                title: request.title.trim().to_string(),
                price_cents: request.price_cents,
                featured: request.featured,
                category_id: request.category_id,
                created_at: now,
                updated_at: now,
            })
            .await?;

        info!(id = %item.id, title = %item.title, "Menu item created");
        Ok(item)
    }

    /// Replaces the editable fields. Cart lines and orders keep their prices.
    pub async fn update(
        &self,
        caller: Option<&Caller>,
        id: &str,
        request: MenuItemRequest,
    ) -> ApiResult<MenuItem> {
        authorize(caller, Operation::UpdateMenuItem)?;
        request.validate()?;

        let existing = self.db.menu().require(id).await?;
        let item = self
            .db
            .menu()
            .update(&MenuItem {
                title: request.title.trim().to_string(),
                price_cents: request.price_cents,
                featured: request.featured,
                category_id: request.category_id,
                ..existing
            })
            .await?;

        Ok(item)
    }

    pub async fn toggle_featured(
        &self,
        caller: Option<&Caller>,
        id: &str,
    ) -> ApiResult<FeaturedToggled> {
        authorize(caller, Operation::ToggleFeatured)?;

        let item = self.db.menu().toggle_featured(id).await?;

        Ok(FeaturedToggled {
            message: format!(
                "Featured status of {} has changed to {}",
                item.title, item.featured
            ),
            item,
        })
    }

    pub async fn delete(&self, caller: Option<&Caller>, id: &str) -> ApiResult<MessageResponse> {
        authorize(caller, Operation::DeleteMenuItem)?;

        self.db.menu().delete(id).await?;
        info!(id = %id, "Menu item deleted");

        Ok(MessageResponse::new(format!("Menu item {} has been deleted", id)))
    }

    /// Lists categories. Open to anonymous callers.
    pub async fn list_categories(&self, caller: Option<&Caller>) -> ApiResult<Vec<Category>> {
        authorize(caller, Operation::ListCategories)?;
        Ok(self.db.categories().list().await?)
    }

    pub async fn create_category(
        &self,
        caller: Option<&Caller>,
        request: CategoryRequest,
    ) -> ApiResult<Category> {
        authorize(caller, Operation::CreateCategory)?;
        validate_slug(&request.slug)?;
        validate_title(&request.title)?;

        let category = self
            .db
            .categories()
            .insert(&Category {
                id: generate_category_id(),
                slug: request.slug,
                title: request.title.trim().to_string(),
            })
            .await?;

        Ok(category)
    }
}
