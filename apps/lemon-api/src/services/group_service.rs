//! Role-group membership service (Manager and DeliveryCrew groups).

use lemon_core::validation::validate_username;
use lemon_core::{Caller, Group, Operation, User};
use lemon_db::Database;
use serde::Deserialize;
use tracing::info;

use super::{authorize, MessageResponse};
use crate::error::{ApiError, ApiResult};

/// Body of `POST /api/groups/{group}/users`.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupMemberRequest {
    pub username: String,
}

/// Group service implementation.
#[derive(Debug, Clone)]
pub struct GroupService {
    db: Database,
}

impl GroupService {
    pub fn new(db: Database) -> Self {
        GroupService { db }
    }

    pub async fn list(&self, caller: Option<&Caller>, group: Group) -> ApiResult<Vec<User>> {
        authorize(caller, Operation::ListGroupMembers)?;
        Ok(self.db.users().list_group(group).await?)
    }

    /// Adds a user by username. Re-adding a member succeeds.
    pub async fn add(
        &self,
        caller: Option<&Caller>,
        group: Group,
        request: GroupMemberRequest,
    ) -> ApiResult<MessageResponse> {
        authorize(caller, Operation::AddGroupMember)?;
        validate_username(&request.username)?;

        let user = self
            .db
            .users()
            .get_by_username(&request.username)
            .await?
            .ok_or_else(|| ApiError::not_found("User", &request.username))?;

        let added = self.db.users().add_to_group(&user.id, group).await?;
        if added {
            info!(user_id = %user.id, ?group, "Group member added");
        }

        Ok(MessageResponse::new(format!(
            "{} added to {} group",
            user.username,
            group.label()
        )))
    }

    pub async fn remove(
        &self,
        caller: Option<&Caller>,
        group: Group,
        user_id: &str,
    ) -> ApiResult<MessageResponse> {
        authorize(caller, Operation::RemoveGroupMember)?;

        let user = self
            .db
            .users()
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("User", user_id))?;
        self.db.users().remove_from_group(&user.id, group).await?;
        info!(user_id = %user.id, ?group, "Group member removed");

        Ok(MessageResponse::new(format!(
            "{} removed from {} group",
            user.username,
            group.label()
        )))
    }
}
