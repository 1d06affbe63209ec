use blogsmith_core::StoreConfig;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// Upsert stores from config into the database, keyed by slug.
///
/// Returns the number of stores processed (inserted or updated).
/// All upserts run inside a single transaction; if any operation fails
/// the entire batch is rolled back. `public_id` is generated on first
/// insert and preserved across re-seeds.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn seed_stores(pool: &PgPool, stores: &[StoreConfig]) -> Result<usize, DbError> {
    let mut tx = pool.begin().await?;
    let mut count = 0usize;

    for store in stores {
        let slug = store.slug();

        sqlx::query(
            "INSERT INTO stores (public_id, name, slug, base_url, language, is_active, notes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (slug) DO UPDATE SET \
                 name = EXCLUDED.name, \
                 base_url = EXCLUDED.base_url, \
                 language = EXCLUDED.language, \
                 is_active = EXCLUDED.is_active, \
                 notes = EXCLUDED.notes, \
                 updated_at = NOW()",
        )
        .bind(Uuid::new_v4())
        .bind(&store.name)
        .bind(&slug)
        .bind(store.origin())
        .bind(&store.language)
        .bind(store.active)
        .bind(&store.notes)
        .execute(&mut *tx)
        .await?;

        count += 1;
    }

    tx.commit().await?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    #[test]
    fn seed_module_is_accessible() {
        // Verify the module compiles and DbError is visible from the seed module.
        // Slug logic is tested in blogsmith-core.
        let _ = std::mem::size_of::<crate::DbError>();
    }
}
