//! Service layer.
//!
//! Each service checks the caller against the permission table, delegates
//! to `lemon-db`, and shapes the response body. Handlers in `routes` stay
//! thin: authenticate, call a service, pick a status code.

pub mod cart_service;
pub mod group_service;
pub mod health_service;
pub mod menu_service;
pub mod order_service;

use lemon_core::policy;
use lemon_core::{Caller, Operation};
use serde::Serialize;
use tracing::warn;

use crate::error::ApiResult;

/// `{ "message": "..." }` body used by mutating endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        MessageResponse {
            message: message.into(),
        }
    }
}

/// Applies the permission table, logging rejections.
pub(crate) fn authorize(caller: Option<&Caller>, operation: Operation) -> ApiResult<()> {
    policy::authorize(caller, operation).map_err(|e| {
        warn!(
            ?operation,
            user_id = caller.map(|c| c.user_id.as_str()).unwrap_or("<anonymous>"),
            "Access rejected"
        );
        e.into()
    })
}

/// Like [`authorize`], returning the caller for operations on own data.
pub(crate) fn require_caller(caller: Option<&Caller>, operation: Operation) -> ApiResult<&Caller> {
    authorize(caller, operation)?;
    Ok(policy::require_caller(caller, operation)?)
}
