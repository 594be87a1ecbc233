//! Look up a stored issue report.
//!
//! # Usage
//!
//! ```bash
//! issuedesk show 42
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string
//! - `ISSUE_TABLE` - Table to read from (default: `issue_reports`)

use secrecy::SecretString;
use thiserror::Error;

use issuedesk_core::{OrderId, OrderIdError};
use issuedesk_server::db::{self, InvalidTableName, IssueStore, PgIssueStore, RepositoryError, TableName};

/// Errors that can occur while looking up a report.
#[derive(Debug, Error)]
pub enum ShowError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Order id argument is not valid.
    #[error("Invalid order id: {0}")]
    InvalidOrderId(#[from] OrderIdError),

    /// `ISSUE_TABLE` is not a valid table name.
    #[error(transparent)]
    InvalidTable(#[from] InvalidTableName),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Connect(#[from] sqlx::Error),

    /// Query failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// No report stored for the order.
    #[error("No issue report for order {0}")]
    NotFound(OrderId),

    /// Report could not be rendered.
    #[error("Could not render report: {0}")]
    Render(#[from] serde_json::Error),
}

/// Print the report stored for `order_id` as JSON.
///
/// # Errors
///
/// Returns error if the order id is invalid, the database is unreachable,
/// or no report exists.
pub async fn run(order_id: &str) -> Result<(), ShowError> {
    dotenvy::dotenv().ok();

    let order_id = OrderId::parse(order_id.trim())?;
    let database_url = std::env::var("DATABASE_URL")
        .map(SecretString::from)
        .map_err(|_| ShowError::MissingEnvVar("DATABASE_URL"))?;
    let table = TableName::parse(
        &std::env::var("ISSUE_TABLE").unwrap_or_else(|_| "issue_reports".to_string()),
    )?;

    let pool = db::create_pool(&database_url).await?;
    let store = PgIssueStore::new(pool, table);

    let found = store.get(&order_id).await?;
    let report = found.ok_or(ShowError::NotFound(order_id))?;

    let rendered = serde_json::to_string_pretty(&report)?;

    #[allow(clippy::print_stdout)]
    {
        println!("{rendered}");
    }

    Ok(())
}
