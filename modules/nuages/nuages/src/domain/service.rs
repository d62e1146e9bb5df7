//! The nuages coordinator.
//!
//! Two systems of record are involved: the local record store and the
//! cluster. Steps are ordered, never wrapped in a distributed transaction:
//!
//! - create: cluster first, then the local record. A failed insert leaves an
//!   orphaned instance on the cluster; it is logged and not compensated.
//! - delete: cluster first, then the local record. A failed cluster delete
//!   keeps the record so the caller can retry with the same id.
//!
//! Calls to the cluster are awaited without timeout or retry.

use std::sync::Arc;

use nuages_sdk::limits::INSTANCE_ID;
use nuages_sdk::{NewNuage, Nuage, NuagePhase, NuageStatus, NuageUpdate};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use super::cluster::{ClusterClient, ClusterError, InstanceSpec, InstanceStatus, PowerAction};
use super::error::DomainError;
use super::placement::{PlacementStrategy, RandomPlacement};
use super::repo::{NuageRecord, NuageRepository, RepositoryError};

/// Sentinel passed to the per-node hint lookup; below every valid id.
const NO_LOCAL_HINT: u32 = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Storage backend that receives the root filesystem of new instances.
    pub storage_backend: String,
    /// Start instances as soon as the cluster has created them.
    pub autostart: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            storage_backend: "local-lvm".to_owned(),
            autostart: true,
        }
    }
}

pub struct NuagesService {
    repo: Arc<dyn NuageRepository>,
    cluster: Arc<dyn ClusterClient>,
    placement: Arc<dyn PlacementStrategy>,
    config: ServiceConfig,
}

impl NuagesService {
    /// Creates a coordinator with random placement.
    #[must_use]
    pub fn new(
        repo: Arc<dyn NuageRepository>,
        cluster: Arc<dyn ClusterClient>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            repo,
            cluster,
            placement: Arc::new(RandomPlacement),
            config,
        }
    }

    #[must_use]
    pub fn with_placement(mut self, placement: Arc<dyn PlacementStrategy>) -> Self {
        self.placement = placement;
        self
    }

    async fn fetch(&self, id: Uuid) -> Result<Nuage, DomainError> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(id))
    }

    /// # Errors
    /// `NameConflict`, `UpstreamUnavailable` or `Store`.
    #[instrument(skip(self, new), fields(name = %new.name))]
    pub async fn create(&self, new: NewNuage) -> Result<Nuage, DomainError> {
        info!("Creating nuage");

        // Fast path only; the unique index on `name` is the real guarantee.
        if self.repo.get_by_name(&new.name).await?.is_some() {
            return Err(DomainError::NameConflict { name: new.name });
        }

        let nodes = self
            .cluster
            .list_nodes()
            .await
            .map_err(|e| upstream_failure("list_nodes", &e))?;
        let node = self.placement.select_node(&nodes).ok_or_else(|| {
            warn!("Cluster reported no online nodes");
            DomainError::UpstreamUnavailable {
                operation: "list_nodes",
                message: "no online nodes available".to_owned(),
            }
        })?;

        let instance_id = self
            .cluster
            .next_global_id()
            .await
            .map_err(|e| upstream_failure("next_global_id", &e))?;
        if !INSTANCE_ID.contains(&instance_id) {
            warn!(instance_id, "Allocator returned an id outside the valid range");
            return Err(DomainError::UpstreamUnavailable {
                operation: "next_global_id",
                message: format!("allocated id {instance_id} is outside the valid range"),
            });
        }
        self.compare_with_local_hint(&node, instance_id).await;

        let spec = InstanceSpec {
            node: node.clone(),
            instance_id,
            template: new.template.clone(),
            cores: new.cores,
            memory_mb: new.memory_mb,
            swap_mb: new.swap_mb,
            disk_mb: new.disk_mb,
            hostname: new.name.clone(),
            storage_backend: self.config.storage_backend.clone(),
            autostart: self.config.autostart,
        };
        self.cluster
            .create_instance(&spec)
            .await
            .map_err(|e| upstream_failure("create_instance", &e))?;
        debug!(node = %node, instance_id, "Instance created on cluster");

        let record = NuageRecord {
            name: new.name,
            node_name: node,
            instance_id,
            template: new.template,
            cores: new.cores,
            memory_mb: new.memory_mb,
            swap_mb: new.swap_mb,
            disk_mb: new.disk_mb,
        };
        let name = record.name.clone();
        let node = record.node_name.clone();

        match self.repo.create(record).await {
            Ok(nuage) => {
                info!(
                    id = %nuage.id,
                    node = %nuage.node_name,
                    instance_id = nuage.instance_id,
                    "Successfully created nuage"
                );
                Ok(nuage)
            }
            Err(e) => {
                error!(
                    node = %node,
                    instance_id,
                    error = %e,
                    "Instance exists on the cluster but could not be recorded; it is now orphaned"
                );
                Err(match e {
                    RepositoryError::DuplicateKey { constraint } if constraint.contains("name") => {
                        DomainError::NameConflict { name }
                    }
                    other => other.into(),
                })
            }
        }
    }

    /// The cluster allocator is authoritative. A value not above the highest
    /// id recorded locally for the node means the two have drifted.
    async fn compare_with_local_hint(&self, node: &str, instance_id: u32) {
        match self.repo.last_instance_id_for_node(node, NO_LOCAL_HINT).await {
            Ok(last) if last != NO_LOCAL_HINT && instance_id <= last => {
                warn!(
                    node = %node,
                    instance_id,
                    last_recorded = last,
                    "Allocated id is not above the highest id recorded for this node"
                );
            }
            Ok(_) => {}
            Err(e) => debug!(error = %e, "Local id hint unavailable"),
        }
    }

    /// # Errors
    /// `NotFound` or `Store`.
    #[instrument(skip(self), fields(nuage_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<Nuage, DomainError> {
        debug!("Getting nuage by id");
        self.fetch(id).await
    }

    /// # Errors
    /// `Store`.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Nuage>, DomainError> {
        let nuages = self.repo.list_all().await?;
        debug!("Listed {} nuages", nuages.len());
        Ok(nuages)
    }

    /// Local metadata only; the instance on the cluster keeps its allocation.
    ///
    /// # Errors
    /// `NotFound` or `Store`.
    #[instrument(skip(self, update), fields(nuage_id = %id))]
    pub async fn update(&self, id: Uuid, update: NuageUpdate) -> Result<Nuage, DomainError> {
        info!("Updating nuage resources");
        self.fetch(id).await?;

        let nuage = self
            .repo
            .update(id, update)
            .await
            .map_err(|e| record_failure(id, e))?;

        info!("Successfully updated nuage");
        Ok(nuage)
    }

    /// # Errors
    /// `NotFound`, `UpstreamUnavailable` (record kept) or `Store`.
    #[instrument(skip(self), fields(nuage_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        info!("Deleting nuage");
        let nuage = self.fetch(id).await?;

        self.cluster
            .delete_instance(&nuage.node_name, nuage.instance_id, true, true)
            .await
            .map_err(|e| upstream_failure("delete_instance", &e))?;

        if let Err(e) = self.repo.delete(id).await {
            error!(
                node = %nuage.node_name,
                instance_id = nuage.instance_id,
                error = %e,
                "Instance removed from the cluster but the local record remains"
            );
            return Err(record_failure(id, e));
        }

        info!("Successfully deleted nuage");
        Ok(())
    }

    /// # Errors
    /// `NotFound`, `UpstreamUnavailable` or `Store`.
    pub async fn start(&self, id: Uuid) -> Result<Nuage, DomainError> {
        self.transition(id, PowerAction::Start).await
    }

    /// # Errors
    /// `NotFound`, `UpstreamUnavailable` or `Store`.
    pub async fn stop(&self, id: Uuid) -> Result<Nuage, DomainError> {
        self.transition(id, PowerAction::Stop).await
    }

    /// # Errors
    /// `NotFound`, `UpstreamUnavailable` or `Store`.
    pub async fn reboot(&self, id: Uuid) -> Result<Nuage, DomainError> {
        self.transition(id, PowerAction::Reboot).await
    }

    /// # Errors
    /// `NotFound`, `UpstreamUnavailable` or `Store`.
    pub async fn shutdown(&self, id: Uuid) -> Result<Nuage, DomainError> {
        self.transition(id, PowerAction::Shutdown).await
    }

    /// Phase is never mirrored locally, so the record comes back unchanged.
    #[instrument(skip(self, action), fields(nuage_id = %id, action = action.as_str()))]
    async fn transition(&self, id: Uuid, action: PowerAction) -> Result<Nuage, DomainError> {
        let nuage = self.fetch(id).await?;

        self.cluster
            .power(&nuage.node_name, nuage.instance_id, action)
            .await
            .map_err(|e| upstream_failure(action.as_str(), &e))?;

        info!("Cluster accepted {} request", action.as_str());
        Ok(nuage)
    }

    /// # Errors
    /// `NotFound`, `UpstreamUnavailable` or `Store`.
    #[instrument(skip(self), fields(nuage_id = %id))]
    pub async fn status(&self, id: Uuid) -> Result<NuageStatus, DomainError> {
        let nuage = self.fetch(id).await?;

        let raw = self
            .cluster
            .instance_status(&nuage.node_name, nuage.instance_id)
            .await
            .map_err(|e| upstream_failure("instance_status", &e))?;

        Ok(translate_status(id, &raw))
    }
}

fn upstream_failure(operation: &'static str, err: &ClusterError) -> DomainError {
    warn!(operation, error = %err, "Cluster call failed");
    DomainError::upstream(operation, err)
}

fn record_failure(id: Uuid, err: RepositoryError) -> DomainError {
    match err {
        RepositoryError::NotFound => DomainError::not_found(id),
        other => other.into(),
    }
}

/// Translate raw cluster counters into percentages.
pub(crate) fn translate_status(id: Uuid, raw: &InstanceStatus) -> NuageStatus {
    NuageStatus {
        id,
        phase: NuagePhase::from_remote(&raw.phase),
        raw_phase: raw.phase.clone(),
        cpu_usage: clamp_percent(raw.cpu.unwrap_or(0.0) * 100.0),
        memory_usage: usage_percent(raw.mem, raw.maxmem),
        disk_usage: usage_percent(raw.disk, raw.maxdisk),
        swap_usage: usage_percent(raw.swap, raw.maxswap),
    }
}

/// `used / total * 100`; a zero or missing total reads as idle.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn usage_percent(used: Option<u64>, total: Option<u64>) -> f64 {
    match (used, total) {
        (Some(used), Some(total)) if total > 0 => clamp_percent(used as f64 / total as f64 * 100.0),
        _ => 0.0,
    }
}

fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}
