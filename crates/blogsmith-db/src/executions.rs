//! Database operations for the append-only `execution_log` table.
//!
//! Every attempted generation cycle writes exactly one row here. There are
//! deliberately no update or delete operations in this module.

use blogsmith_core::{ExecutionStatus, TriggerSource};
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `execution_log` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ExecutionLogRow {
    pub id: i64,
    pub campaign_id: i64,
    pub executed_at: DateTime<Utc>,
    pub status: String,
    pub trigger_source: String,
    pub articles_generated: i32,
    pub products_enriched: i32,
    pub products_skipped: i32,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Payload for [`append_execution`].
#[derive(Debug, Clone)]
pub struct NewExecutionLogEntry {
    pub campaign_id: i64,
    pub status: ExecutionStatus,
    pub trigger_source: TriggerSource,
    pub articles_generated: i32,
    pub products_enriched: i32,
    pub products_skipped: i32,
    pub error_message: Option<String>,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Append one execution record and return the stored row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn append_execution(
    pool: &PgPool,
    entry: &NewExecutionLogEntry,
) -> Result<ExecutionLogRow, DbError> {
    let row = sqlx::query_as::<_, ExecutionLogRow>(
        "INSERT INTO execution_log (campaign_id, status, trigger_source, articles_generated, \
             products_enriched, products_skipped, error_message) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING id, campaign_id, executed_at, status, trigger_source, articles_generated, \
                   products_enriched, products_skipped, error_message, created_at",
    )
    .bind(entry.campaign_id)
    .bind(entry.status.to_string())
    .bind(entry.trigger_source.to_string())
    .bind(entry.articles_generated)
    .bind(entry.products_enriched)
    .bind(entry.products_skipped)
    .bind(&entry.error_message)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// List a campaign's execution history, most recent first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_executions(
    pool: &PgPool,
    campaign_id: i64,
    limit: i64,
) -> Result<Vec<ExecutionLogRow>, DbError> {
    let rows = sqlx::query_as::<_, ExecutionLogRow>(
        "SELECT id, campaign_id, executed_at, status, trigger_source, articles_generated, \
                products_enriched, products_skipped, error_message, created_at \
         FROM execution_log \
         WHERE campaign_id = $1 \
         ORDER BY executed_at DESC, id DESC \
         LIMIT $2",
    )
    .bind(campaign_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
