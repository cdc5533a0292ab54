//! Shared fixtures for integration tests.

use crate::{Database, PoolConfig, Result};

/// Open a migrated in-memory database.
///
/// In-memory SQLite databases exist per connection, so the pool is pinned
/// to exactly one connection; a wider pool would hand each query its own
/// empty database.
pub async fn memory_database() -> Result<Database> {
    let db = Database::connect_with_config(
        "sqlite::memory:",
        PoolConfig::new().max_connections(1).min_connections(1),
    )
    .await?;
    db.migrate().await?;
    Ok(db)
}
