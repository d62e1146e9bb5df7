//! Storage infrastructure for nuages.

pub mod entity;
pub mod mapper;
pub mod migrations;
pub mod sea_orm_repo;


use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tracing::info;

pub use migrations::Migrator;
pub use sea_orm_repo::SeaOrmNuageRepository;

/// Recycle interval long enough that the pool never retires the connection.
const NEVER_RECYCLE: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

/// An in-memory SQLite database lives and dies with its connection: the pool
/// holds exactly one, and that one is never closed for age or idleness.
fn connect_options(url: &str, max_connections: u32) -> ConnectOptions {
    let mut options = ConnectOptions::new(url.to_owned());
    options.min_connections(1).sqlx_logging(false);
    if is_in_memory(url) {
        options
            .max_connections(1)
            .max_lifetime(NEVER_RECYCLE)
            .idle_timeout(NEVER_RECYCLE);
    } else {
        options.max_connections(max_connections.max(1));
    }
    options
}

/// Open the pool and bring the schema up to date.
///
/// # Errors
/// Connection or migration failure.
pub async fn connect(url: &str, max_connections: u32) -> Result<DatabaseConnection, DbErr> {
    let options = connect_options(url, max_connections);
    let max_connections = options.get_max_connections().unwrap_or(1);

    let db = Database::connect(options).await?;
    Migrator::up(&db, None).await?;
    info!(max_connections, "Database ready");
    Ok(db)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn in_memory_pool_keeps_its_only_connection() {
        let options = connect_options("sqlite::memory:", 10);
        assert_eq!(options.get_max_connections(), Some(1));
        assert_eq!(options.get_max_lifetime(), Some(NEVER_RECYCLE));
        assert_eq!(options.get_idle_timeout(), Some(NEVER_RECYCLE));
    }

    #[test]
    fn file_pool_uses_configured_size_and_default_recycling() {
        let options = connect_options("sqlite://nuages.sqlite3?mode=rwc", 8);
        assert_eq!(options.get_max_connections(), Some(8));
        assert_eq!(options.get_max_lifetime(), None);
        assert_eq!(options.get_idle_timeout(), None);
    }

    #[tokio::test]
    async fn in_memory_schema_is_ready_after_connect() {
        use sea_orm::EntityTrait;

        let db = connect("sqlite::memory:", 4).await.unwrap();
        let rows = entity::Entity::find().all(&db).await.unwrap();
        assert!(rows.is_empty());
    }
}
