use async_trait::async_trait;
use nuages_sdk::{Nuage, NuageUpdate};
use uuid::Uuid;

/// Fields persisted when a nuage is recorded.
///
/// `id` and the timestamps are generated by the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NuageRecord {
    pub name: String,
    pub node_name: String,
    pub instance_id: u32,
    pub template: String,
    pub cores: u32,
    pub memory_mb: u32,
    pub swap_mb: u32,
    pub disk_mb: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,

    /// A unique constraint (`name` or `instance_id`) rejected the write.
    #[error("duplicate key: {constraint}")]
    DuplicateKey { constraint: String },

    #[error("store backend failure: {0}")]
    Backend(String),
}

/// Durable table of nuage records.
///
/// Each call runs as its own unit of work against the store.
#[async_trait]
pub trait NuageRepository: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Nuage>, RepositoryError>;

    async fn get_by_name(&self, name: &str) -> Result<Option<Nuage>, RepositoryError>;

    async fn list_all(&self) -> Result<Vec<Nuage>, RepositoryError>;

    /// Insert a record and return it with its generated id and timestamps.
    async fn create(&self, record: NuageRecord) -> Result<Nuage, RepositoryError>;

    /// Replace the mutable resource fields of an existing record.
    async fn update(&self, id: Uuid, update: NuageUpdate) -> Result<Nuage, RepositoryError>;

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;

    /// Highest `instance_id` recorded on `node_name`, or `default` when none.
    async fn last_instance_id_for_node(
        &self,
        node_name: &str,
        default: u32,
    ) -> Result<u32, RepositoryError>;
}
