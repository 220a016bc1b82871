//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! sb-cli user create --name "Alice" --email alice@example.com --password "correct horse battery"
//! ```

use snippetbox_core::UserId;
use snippetbox_web::config::{ConfigError, get_database_url};
use snippetbox_web::db::{PgUserRepository, create_pool};
use snippetbox_web::services::auth::{AuthError, AuthService};
use thiserror::Error;

/// Errors that can occur during user operations.
#[derive(Debug, Error)]
pub enum UserError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Create an account with the same rules as the signup form.
///
/// # Errors
///
/// Returns `UserError::Auth` for an invalid email, a short password or a
/// taken address, and `UserError::Database` if the database is unreachable.
pub async fn create(name: &str, email: &str, password: &str) -> Result<UserId, UserError> {
    dotenvy::dotenv().ok();

    let database_url = get_database_url("SNIPPETBOX_DATABASE_URL")?;

    tracing::info!("Connecting to database...");
    let pool = create_pool(&database_url).await?;
    let users = PgUserRepository::new(pool);

    let id = AuthService::new(&users)
        .register(name, email, password)
        .await?;

    tracing::info!(user_id = %id, email = %email, "User created");
    Ok(id)
}
