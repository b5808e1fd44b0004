//! Health check service.
//!
//! Reports whether the database answers a trivial query.

use chrono::{DateTime, Utc};
use lemon_db::Database;
use serde::Serialize;

/// Serving status of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServingStatus {
    Serving,
    NotServing,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthCheckResponse {
    pub status: ServingStatus,
    pub message: String,
    pub version: &'static str,
    pub timestamp: DateTime<Utc>,
}

/// Health service implementation.
#[derive(Debug, Clone)]
pub struct HealthService {
    db: Database,
}

impl HealthService {
    pub fn new(db: Database) -> Self {
        HealthService { db }
    }

    pub async fn check(&self) -> HealthCheckResponse {
        let (status, message) = if self.db.health_check().await {
            (ServingStatus::Serving, "Database connected")
        } else {
            (ServingStatus::NotServing, "Database unreachable")
        };

        HealthCheckResponse {
            status,
            message: message.to_string(),
            version: env!("CARGO_PKG_VERSION"),
            timestamp: Utc::now(),
        }
    }
}
