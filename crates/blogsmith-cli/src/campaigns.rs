//! Campaign inspection commands.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// Resolve an optional store slug to its internal id.
///
/// # Errors
///
/// Returns an error when the slug does not match any store.
pub(crate) async fn resolve_store_filter(
    pool: &PgPool,
    store: Option<&str>,
) -> anyhow::Result<Option<i64>> {
    match store {
        Some(slug) => {
            let store = blogsmith_db::get_store_by_slug(pool, slug)
                .await?
                .ok_or_else(|| anyhow::anyhow!("store '{slug}' not found"))?;
            Ok(Some(store.id))
        }
        None => Ok(None),
    }
}

/// Print a one-line summary per campaign, newest first.
///
/// # Errors
///
/// Returns an error when the store filter does not resolve or the query fails.
pub(crate) async fn run_list(
    pool: &PgPool,
    store: Option<&str>,
    limit: i64,
) -> anyhow::Result<()> {
    let store_id = resolve_store_filter(pool, store).await?;
    let rows = blogsmith_db::list_campaigns(pool, store_id, limit).await?;

    if rows.is_empty() {
        println!("no campaigns");
        return Ok(());
    }

    let now = Utc::now();
    println!("{} campaign(s)", rows.len());
    for row in &rows {
        let due = row
            .status_enum()
            .ok()
            .zip(row.next_execution)
            .is_some_and(|(status, next)| blogsmith_core::is_due(status, next, now));
        println!(
            "{}  {:<9} {:<8} gen {:>3}  pub {:>3}  next {:<16}{}  {}",
            row.public_id,
            row.status,
            row.frequency,
            row.articles_generated,
            row.articles_published,
            fmt_ts(row.next_execution),
            if due { " (due)" } else { "" },
            row.name
        );
    }

    Ok(())
}

fn fmt_ts(ts: Option<DateTime<Utc>>) -> String {
    ts.map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string())
}
