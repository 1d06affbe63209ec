//! Store seeding command.

use sqlx::PgPool;

use blogsmith_core::{load_stores, AppConfig};

/// Load the stores file named by config and upsert every entry, keyed by slug.
///
/// The whole batch lands in one transaction, so a malformed entry rolls back
/// the run instead of leaving a partial seed.
///
/// # Errors
///
/// Returns an error if the stores file cannot be read or fails validation,
/// or if the upsert transaction fails.
pub(crate) async fn run_seed(pool: &PgPool, config: &AppConfig) -> anyhow::Result<()> {
    let stores_file = load_stores(&config.stores_path)?;
    let count = blogsmith_db::seed_stores(pool, &stores_file.stores).await?;

    println!(
        "seeded {count} store(s) from {}",
        config.stores_path.display()
    );
    for store in &stores_file.stores {
        let marker = if store.active { "" } else { " (inactive)" };
        println!("  {}{marker}", store.slug());
    }

    Ok(())
}
