//! # Repository Module
//!
//! Database repository implementations for Little Lemon.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  lemon-api service                                                     │
//! │       │                                                                 │
//! │       │  db.carts().add_item(user, item, qty)                          │
//! │       ▼                                                                 │
//! │  CartRepository                                                        │
//! │  ├── list(&self, user)                                                 │
//! │  ├── add_item(&self, user, item, qty)                                  │
//! │  ├── remove_item(&self, user, item)                                    │
//! │  └── clear(&self, user)                                                │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`MenuRepository`](menu::MenuRepository) / [`CategoryRepository`](menu::CategoryRepository) - Catalog
//! - [`CartRepository`](cart::CartRepository) - Per-user cart lines
//! - [`OrderRepository`](order::OrderRepository) - Orders, items, cart → order transaction
//! - [`UserRepository`](user::UserRepository) - Users, groups, [`RoleResolver`](user::RoleResolver)

pub mod cart;
pub mod menu;
pub mod order;
pub mod user;
