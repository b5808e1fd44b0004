//! Fixtures shared by the repository tests.

use chrono::Utc;
use lemon_core::{Category, MenuItem, User};
use uuid::Uuid;

use crate::pool::Database;

pub(crate) async fn seed_user(db: &Database, username: &str) -> User {
    db.users().create(username, None, false).await.unwrap()
}

/// Inserts a menu item under a fresh category.
pub(crate) async fn seed_item(db: &Database, title: &str, price_cents: i64) -> MenuItem {
    let category = db
        .categories()
        .insert(&Category {
            id: Uuid::new_v4().to_string(),
            slug: format!("cat-{}", Uuid::new_v4()),
            title: "Test".to_string(),
        })
        .await
        .unwrap();

    let now = Utc::now();
    db.menu()
        .insert(&MenuItem {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            price_cents,
            featured: false,
            category_id: category.id,
            created_at: now,
            updated_at: now,
        })
        .await
        .unwrap()
}
