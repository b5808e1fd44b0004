//! # Little Lemon API
//!
//! HTTP server for the restaurant ordering backend.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Lemon API Services                              │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  CartService   │  │  OrderService  │  │  MenuService               ││
//! │  │                │  │                │  │                            ││
//! │  │ • List         │  │ • Create       │  │ • List / Get               ││
//! │  │ • Add          │  │ • List (scoped)│  │ • Create / Update / Delete ││
//! │  │ • Remove       │  │ • Items        │  │ • Toggle featured          ││
//! │  │ • Clear        │  │ • Toggle/Assign│  │ • Categories               ││
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘│
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐                                │
//! │  │  GroupService  │  │  HealthService │                                │
//! │  │ • List/Add/Rm  │  │ • Check        │                                │
//! │  └────────────────┘  └────────────────┘                                │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                      Infrastructure                               │  │
//! │  │  SQLite (lemon-db)     JWT bearer auth     RoleResolver           │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables:
//! - `LEMON_HTTP_PORT` - HTTP port (default: 8000)
//! - `LEMON_DB_PATH` - SQLite database file (default: ./little_lemon.db)
//! - `LEMON_DB_MAX_CONNECTIONS` - Pool size (default: 5)
//! - `JWT_SECRET` - Secret for JWT verification
//! - `JWT_ACCESS_LIFETIME_SECS` - Access token lifetime (default: 3600)

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::http::{header, HeaderMap};
use lemon_core::Caller;
use lemon_db::{Database, RoleResolver};
use tracing::warn;

use crate::auth::{extract_bearer_token, JwtManager};
use crate::services::cart_service::CartService;
use crate::services::group_service::GroupService;
use crate::services::health_service::HealthService;
use crate::services::menu_service::MenuService;
use crate::services::order_service::OrderService;

// Re-exports
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, ErrorCode};

/// Shared application state.
pub struct AppState {
    pub db: Database,
    pub jwt: JwtManager,
    pub roles: Arc<dyn RoleResolver>,
    pub config: ApiConfig,
    pub carts: CartService,
    pub orders: OrderService,
    pub menu: MenuService,
    pub groups: GroupService,
    pub health: HealthService,
}

impl AppState {
    pub fn new(db: Database, config: ApiConfig) -> Self {
        AppState {
            jwt: JwtManager::new(&config.jwt_secret, config.jwt_access_lifetime_secs),
            roles: Arc::new(db.users()),
            carts: CartService::new(db.clone()),
            orders: OrderService::new(db.clone()),
            menu: MenuService::new(db.clone()),
            groups: GroupService::new(db.clone()),
            health: HealthService::new(db.clone()),
            config,
            db,
        }
    }

    /// Resolves the caller from the `Authorization` header.
    ///
    /// A missing or invalid token, or one naming an unknown user, yields
    /// `None`; the permission table then decides whether that is allowed.
    pub async fn authenticate(&self, headers: &HeaderMap) -> ApiResult<Option<Caller>> {
        let Some(value) = headers.get(header::AUTHORIZATION) else {
            return Ok(None);
        };

        let Some(token) = value.to_str().ok().and_then(extract_bearer_token) else {
            warn!("Malformed Authorization header");
            return Ok(None);
        };

        let claims = match self.jwt.validate_access_token(token) {
            Ok(claims) => claims,
            Err(e) => {
                warn!(error = %e, "Rejected bearer token");
                return Ok(None);
            }
        };

        match self.roles.resolve_roles(&claims.sub).await? {
            Some(roles) => Ok(Some(Caller::new(claims.sub, roles))),
            None => {
                warn!(user_id = %claims.sub, "Token subject is not a known user");
                Ok(None)
            }
        }
    }
}
