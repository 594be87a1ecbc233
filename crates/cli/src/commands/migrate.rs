//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! issuedesk migrate
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string
//!
//! # Migration Files
//!
//! Migrations live in `crates/server/migrations/` and are embedded at build
//! time. They create the default `issue_reports` table; a custom
//! `ISSUE_TABLE` must be created with the same columns.

use secrecy::SecretString;
use thiserror::Error;

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run all pending migrations.
///
/// # Errors
///
/// Returns error if `DATABASE_URL` is unset, the database is unreachable,
/// or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")
        .map(SecretString::from)
        .map_err(|_| MigrationError::MissingEnvVar("DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    let pool = issuedesk_server::db::create_pool(&database_url).await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
