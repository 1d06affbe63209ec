//! Database operations for the `articles` table.

use blogsmith_core::ArticleStatus;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

const ARTICLE_COLUMNS: &str =
    "id, public_id, campaign_id, store_id, title, meta_description, body_html, keywords, \
     category, subcategory, language, word_count, status, quality_score, validation_issues, \
     product_links, created_at, updated_at";

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `articles` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ArticleRow {
    pub id: i64,
    pub public_id: Uuid,
    /// `None` for manually-authored articles; pipeline output always links
    /// back to its campaign.
    pub campaign_id: Option<i64>,
    pub store_id: i64,
    pub title: String,
    pub meta_description: Option<String>,
    pub body_html: String,
    pub keywords: Vec<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub language: String,
    pub word_count: i32,
    pub status: String,
    pub quality_score: i32,
    /// Validator issue strings, stored as a JSON array.
    pub validation_issues: serde_json::Value,
    /// Ordered `ProductLink` objects for products referenced in `body_html`.
    pub product_links: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for [`insert_article`].
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub campaign_id: Option<i64>,
    pub store_id: i64,
    pub title: String,
    pub meta_description: Option<String>,
    pub body_html: String,
    pub keywords: Vec<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub language: String,
    pub word_count: i32,
    pub status: ArticleStatus,
    pub quality_score: i32,
    pub validation_issues: serde_json::Value,
    pub product_links: serde_json::Value,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Insert an article and return the full new row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_article(pool: &PgPool, new: &NewArticle) -> Result<ArticleRow, DbError> {
    let public_id = Uuid::new_v4();

    let sql = format!(
        "INSERT INTO articles (public_id, campaign_id, store_id, title, meta_description, \
             body_html, keywords, category, subcategory, language, word_count, status, \
             quality_score, validation_issues, product_links) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) \
         RETURNING {ARTICLE_COLUMNS}"
    );

    let row = sqlx::query_as::<_, ArticleRow>(&sql)
        .bind(public_id)
        .bind(new.campaign_id)
        .bind(new.store_id)
        .bind(&new.title)
        .bind(&new.meta_description)
        .bind(&new.body_html)
        .bind(&new.keywords)
        .bind(&new.category)
        .bind(&new.subcategory)
        .bind(&new.language)
        .bind(new.word_count)
        .bind(new.status.to_string())
        .bind(new.quality_score)
        .bind(&new.validation_issues)
        .bind(&new.product_links)
        .fetch_one(pool)
        .await?;

    Ok(row)
}

/// Fetch an article by its public UUID, as used in API paths.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row matches, [`DbError::Sqlx`] on
/// query failure.
pub async fn get_article_by_public_id(
    pool: &PgPool,
    public_id: Uuid,
) -> Result<ArticleRow, DbError> {
    let sql = format!("SELECT {ARTICLE_COLUMNS} FROM articles WHERE public_id = $1");

    sqlx::query_as::<_, ArticleRow>(&sql)
        .bind(public_id)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)
}

/// List articles, newest first, optionally narrowed to one campaign.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_articles(
    pool: &PgPool,
    campaign_id: Option<i64>,
    limit: i64,
) -> Result<Vec<ArticleRow>, DbError> {
    let sql = format!(
        "SELECT {ARTICLE_COLUMNS} FROM articles \
         WHERE ($1::bigint IS NULL OR campaign_id = $1) \
         ORDER BY created_at DESC, id DESC \
         LIMIT $2"
    );

    let rows = sqlx::query_as::<_, ArticleRow>(&sql)
        .bind(campaign_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Mark an article as published.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row matches, [`DbError::Sqlx`] on
/// query failure.
pub async fn mark_article_published(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE articles \
         SET status = 'published', updated_at = NOW() \
         WHERE id = $1",
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    Ok(())
}
