//! Schema migrations.
//!
//! The SQL files under `migrations/` are embedded at compile time, so an
//! installed binary carries its own schema.

use sqlx::migrate::Migrator;
use sqlx::SqlitePool;

use crate::error_handling::StoreError;

static MIGRATOR: Migrator = sqlx::migrate!();

/// Brings the registry schema up to date. Already-applied migrations are skipped.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), StoreError> {
    MIGRATOR.run(pool).await?;
    log::debug!("Registry schema at version {}", latest_version());
    Ok(())
}

fn latest_version() -> i64 {
    MIGRATOR.iter().map(|m| m.version).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::pool::init_memory_pool;

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let pool = init_memory_pool().await.unwrap();
        run_migrations(&pool).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let columns: Vec<String> =
            sqlx::query_scalar("SELECT name FROM pragma_table_info('domains')")
                .fetch_all(&*pool)
                .await
                .unwrap();
        for expected in ["domain", "group_name", "last_status", "last_checked", "last_error"] {
            assert!(columns.iter().any(|c| c == expected), "missing {expected}");
        }
    }
}
