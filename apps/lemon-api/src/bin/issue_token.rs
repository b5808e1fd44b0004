//! # Development Token Issuer
//!
//! Prints a bearer token for an existing user, signed with the same
//! `JWT_SECRET` the server verifies against.
//!
//! ## Usage
//! ```bash
//! cargo run -p lemon-api --bin issue-token -- manager
//!
//! curl -H "Authorization: Bearer $(cargo run -q -p lemon-api --bin issue-token -- customer)" \
//!      localhost:8000/api/cart/menu-items
//! ```

use std::env;

use anyhow::{bail, Context};

use lemon_api::auth::JwtManager;
use lemon_api::ApiConfig;
use lemon_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let Some(username) = env::args().nth(1) else {
        bail!("Usage: issue-token <username>");
    };

    let config = ApiConfig::load().context("Invalid configuration")?;
    let db = Database::new(DbConfig::new(&config.database_path).max_connections(1))
        .await
        .context("Failed to open database")?;

    let user = db
        .users()
        .get_by_username(&username)
        .await?
        .with_context(|| format!("No user named '{}' (run the seed binary first)", username))?;

    let jwt = JwtManager::new(&config.jwt_secret, config.jwt_access_lifetime_secs);
    let token = jwt.issue_access_token(&user.id, Some(&user.username))?;

    println!("{}", token);

    db.close().await;
    Ok(())
}
