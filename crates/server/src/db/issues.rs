//! Issue report persistence.
//!
//! Reports are keyed by order id. A second report for the same order
//! replaces the first (last writer wins).

use std::fmt;
use std::sync::LazyLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use sqlx::PgPool;
use sqlx::types::Json;
use thiserror::Error;
use tracing::instrument;

use issuedesk_core::{Flow, IssueReport, OrderId, ReportSource};

use super::RepositoryError;

/// Plain SQL identifier: letters, digits and underscores, not starting with a digit.
static TABLE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,62}$").expect("Invalid regex"));

// =============================================================================
// Table Name
// =============================================================================

/// Table name was not a plain SQL identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{0}' is not a valid table name (letters, digits and underscores only)")]
pub struct InvalidTableName(pub String);

/// A validated table name, safe to interpolate into SQL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableName(String);

impl TableName {
    /// Validate a table name.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTableName`] unless the name is a plain identifier of
    /// at most 63 characters.
    pub fn parse(name: &str) -> Result<Self, InvalidTableName> {
        if TABLE_NAME_RE.is_match(name) {
            Ok(Self(name.to_owned()))
        } else {
            Err(InvalidTableName(name.to_owned()))
        }
    }

    /// Returns the table name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Store Trait
// =============================================================================

/// Document store for issue reports.
#[async_trait]
pub trait IssueStore: Send + Sync {
    /// Write a report, replacing any report stored for the same order id.
    async fn put(&self, report: &IssueReport) -> Result<(), RepositoryError>;

    /// Read the report stored for an order id.
    async fn get(&self, order_id: &OrderId) -> Result<Option<IssueReport>, RepositoryError>;

    /// Check the store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` issue report queries.
#[derive(Debug, sqlx::FromRow)]
struct IssueReportRow {
    order_id: OrderId,
    flow: Json<Flow>,
    error: String,
    source: String,
    reporter: Option<String>,
    original_input: String,
    extractor_version: i16,
    reported_at: DateTime<Utc>,
}

impl TryFrom<IssueReportRow> for IssueReport {
    type Error = RepositoryError;

    fn try_from(row: IssueReportRow) -> Result<Self, Self::Error> {
        let source = ReportSource::from_str_opt(&row.source).ok_or_else(|| {
            RepositoryError::DataCorruption(format!("invalid report source: {}", row.source))
        })?;
        let extractor_version = u16::try_from(row.extractor_version).map_err(|_| {
            RepositoryError::DataCorruption(format!(
                "invalid extractor version: {}",
                row.extractor_version
            ))
        })?;

        Ok(Self {
            order_id: row.order_id,
            flow: row.flow.0,
            error: row.error,
            source,
            reporter: row.reporter,
            original_input: row.original_input,
            extractor_version,
            reported_at: row.reported_at,
        })
    }
}

// =============================================================================
// PostgreSQL Store
// =============================================================================

/// `PostgreSQL`-backed [`IssueStore`].
#[derive(Debug, Clone)]
pub struct PgIssueStore {
    pool: PgPool,
    table: TableName,
}

impl PgIssueStore {
    /// Create a new store writing to `table`.
    #[must_use]
    pub const fn new(pool: PgPool, table: TableName) -> Self {
        Self { pool, table }
    }

    /// Returns the table reports are written to.
    #[must_use]
    pub const fn table(&self) -> &TableName {
        &self.table
    }
}

#[async_trait]
impl IssueStore for PgIssueStore {
    #[instrument(skip(self, report), fields(table = %self.table, order_id = %report.order_id))]
    async fn put(&self, report: &IssueReport) -> Result<(), RepositoryError> {
        let extractor_version = i16::try_from(report.extractor_version).map_err(|_| {
            RepositoryError::DataCorruption(format!(
                "extractor version out of range: {}",
                report.extractor_version
            ))
        })?;

        let sql = format!(
            r"
            INSERT INTO {table} (
                order_id, flow, error, source, reporter,
                original_input, extractor_version, reported_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (order_id) DO UPDATE SET
                flow = EXCLUDED.flow,
                error = EXCLUDED.error,
                source = EXCLUDED.source,
                reporter = EXCLUDED.reporter,
                original_input = EXCLUDED.original_input,
                extractor_version = EXCLUDED.extractor_version,
                reported_at = EXCLUDED.reported_at
            ",
            table = self.table
        );

        sqlx::query(&sql)
            .bind(&report.order_id)
            .bind(Json(&report.flow))
            .bind(&report.error)
            .bind(report.source.as_str())
            .bind(report.reporter.as_deref())
            .bind(&report.original_input)
            .bind(extractor_version)
            .bind(report.reported_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    #[instrument(skip(self), fields(table = %self.table))]
    async fn get(&self, order_id: &OrderId) -> Result<Option<IssueReport>, RepositoryError> {
        let sql = format!(
            r"
            SELECT order_id, flow, error, source, reporter,
                   original_input, extractor_version, reported_at
            FROM {table}
            WHERE order_id = $1
            ",
            table = self.table
        );

        let row = sqlx::query_as::<_, IssueReportRow>(&sql)
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(IssueReport::try_from).transpose()
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
