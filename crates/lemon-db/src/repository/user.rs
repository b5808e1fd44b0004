//! # User Repository
//!
//! Users, role-group membership, and role resolution.
//!
//! ## Role Resolution
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  user id ──► UserRepository::resolve_roles                              │
//! │                                                                         │
//! │    users row missing?        → None (caller is unauthenticated)        │
//! │    always                    → Customer                                │
//! │    users.is_admin = 1        → + Admin                                 │
//! │    user_groups 'manager'     → + Manager                               │
//! │    user_groups 'delivery_crew' → + DeliveryCrew                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use lemon_core::{Group, Role, RoleSet, User};

const USER_COLUMNS: &str = "id, username, email, is_admin, created_at";

/// Maps a user id to the capabilities that user holds.
///
/// The request layer only sees this trait, so the identity store behind it
/// can change without touching the engines.
#[async_trait]
pub trait RoleResolver: Send + Sync {
    /// Returns the user's roles, or `None` if the user is unknown.
    async fn resolve_roles(&self, user_id: &str) -> DbResult<Option<RoleSet>>;
}

/// Repository for users and group membership.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn get_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1");

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Inserts a user.
    ///
    /// ## Errors
    /// - `UniqueViolation` if the username is taken
    pub async fn insert(&self, user: &User) -> DbResult<User> {
        debug!(id = %user.id, username = %user.username, "Inserting user");

        sqlx::query(
            "INSERT INTO users (id, username, email, is_admin, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(user.is_admin)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("username", &user.username),
            other => other,
        })?;

        Ok(user.clone())
    }

    /// Creates a user with a fresh id.
    pub async fn create(
        &self,
        username: &str,
        email: Option<&str>,
        is_admin: bool,
    ) -> DbResult<User> {
        self.insert(&User {
            id: generate_user_id(),
            username: username.to_string(),
            email: email.map(str::to_string),
            is_admin,
            created_at: Utc::now(),
        })
        .await
    }

    /// Lists the members of a group ordered by username.
    pub async fn list_group(&self, group: Group) -> DbResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.username, u.email, u.is_admin, u.created_at
            FROM users u
            INNER JOIN user_groups g ON g.user_id = u.id
            WHERE g.group_name = ?1
            ORDER BY u.username
            "#,
        )
        .bind(group)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Adds a user to a group.
    ///
    /// ## Returns
    /// `true` if the user was newly added, `false` if already a member.
    pub async fn add_to_group(&self, user_id: &str, group: Group) -> DbResult<bool> {
        let result =
            sqlx::query("INSERT OR IGNORE INTO user_groups (user_id, group_name) VALUES (?1, ?2)")
                .bind(user_id)
                .bind(group)
                .execute(&self.pool)
                .await
                .map_err(|e| match DbError::from(e) {
                    DbError::ForeignKeyViolation { .. } => DbError::not_found("User", user_id),
                    other => other,
                })?;

        let added = result.rows_affected() > 0;
        debug!(user_id = %user_id, ?group, added, "Added user to group");
        Ok(added)
    }

    /// Removes a user from a group.
    ///
    /// ## Errors
    /// - `NotFound` if the user is not a member
    pub async fn remove_from_group(&self, user_id: &str, group: Group) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM user_groups WHERE user_id = ?1 AND group_name = ?2")
            .bind(user_id)
            .bind(group)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(format!("{} member", group.label()), user_id));
        }

        debug!(user_id = %user_id, ?group, "Removed user from group");
        Ok(())
    }

    /// Returns the groups a user belongs to.
    pub async fn groups_of(&self, user_id: &str) -> DbResult<Vec<Group>> {
        let groups: Vec<Group> =
            sqlx::query_scalar("SELECT group_name FROM user_groups WHERE user_id = ?1")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(groups)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[async_trait]
impl RoleResolver for UserRepository {
    async fn resolve_roles(&self, user_id: &str) -> DbResult<Option<RoleSet>> {
        let Some(user) = self.get_by_id(user_id).await? else {
            return Ok(None);
        };

        let mut roles = RoleSet::customer();
        if user.is_admin {
            roles.insert(Role::Admin);
        }
        for group in self.groups_of(user_id).await? {
            roles.insert(match group {
                Group::Manager => Role::Manager,
                Group::DeliveryCrew => Role::DeliveryCrew,
            });
        }

        Ok(Some(roles))
    }
}

/// Generates a new user ID.
pub fn generate_user_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
