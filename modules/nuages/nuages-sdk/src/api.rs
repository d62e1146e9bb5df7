//! Public API trait for the nuages module.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::NuagesError;
use crate::models::{NewNuage, Nuage, NuageStatus, NuageUpdate};

/// In-process interface to the nuages coordinator.
///
/// ```ignore
/// let nuages: Arc<dyn NuagesApi> = ...;
/// let created = nuages.create(new_nuage).await?;
/// nuages.stop(created.id).await?;
/// let status = nuages.status(created.id).await?;
/// ```
///
/// Lifecycle calls return the stored record unchanged; the phase of an
/// instance is only available through [`NuagesApi::status`].
#[async_trait]
pub trait NuagesApi: Send + Sync {
    /// Allocate placement and an identifier, create the instance and record it.
    ///
    /// # Errors
    /// `Validation` for out-of-range input, `Conflict` if the name is taken,
    /// `UpstreamUnavailable` if any cluster call fails.
    async fn create(&self, new: NewNuage) -> Result<Nuage, NuagesError>;

    /// # Errors
    /// `NotFound` if no record has this id.
    async fn get(&self, id: Uuid) -> Result<Nuage, NuagesError>;

    /// # Errors
    /// `Store` if the record store fails.
    async fn list(&self) -> Result<Vec<Nuage>, NuagesError>;

    /// Replace the resource reservation of the local record.
    ///
    /// # Errors
    /// `Validation` for out-of-range input, `NotFound` if no record has this id.
    async fn update(&self, id: Uuid, update: NuageUpdate) -> Result<Nuage, NuagesError>;

    /// Delete the instance on the cluster, then the local record.
    ///
    /// # Errors
    /// `NotFound` if no record has this id, `UpstreamUnavailable` if the
    /// cluster refuses the deletion (the record is kept).
    async fn delete(&self, id: Uuid) -> Result<(), NuagesError>;

    /// # Errors
    /// `NotFound` or `UpstreamUnavailable`.
    async fn start(&self, id: Uuid) -> Result<Nuage, NuagesError>;

    /// # Errors
    /// `NotFound` or `UpstreamUnavailable`.
    async fn stop(&self, id: Uuid) -> Result<Nuage, NuagesError>;

    /// # Errors
    /// `NotFound` or `UpstreamUnavailable`.
    async fn reboot(&self, id: Uuid) -> Result<Nuage, NuagesError>;

    /// # Errors
    /// `NotFound` or `UpstreamUnavailable`.
    async fn shutdown(&self, id: Uuid) -> Result<Nuage, NuagesError>;

    /// Query the live status of the instance.
    ///
    /// # Errors
    /// `NotFound` or `UpstreamUnavailable`.
    async fn status(&self, id: Uuid) -> Result<NuageStatus, NuagesError>;
}
