//! In-process implementation of the SDK API over the coordinator.

use std::sync::Arc;

use async_trait::async_trait;
use nuages_sdk::{
    NewNuage, Nuage, NuageStatus, NuageUpdate, NuagesApi, NuagesError, validate_new_nuage,
    validate_update,
};
use uuid::Uuid;

use super::error::DomainError;
use super::service::NuagesService;

/// Validates inputs against the SDK limits, then delegates to the service.
pub struct LocalClient {
    service: Arc<NuagesService>,
}

impl LocalClient {
    #[must_use]
    pub fn new(service: Arc<NuagesService>) -> Self {
        Self { service }
    }
}

fn first_violation(violations: &[nuages_sdk::FieldViolation]) -> NuagesError {
    violations.first().map_or_else(
        || NuagesError::Validation {
            field: String::new(),
            message: "invalid input".to_owned(),
        },
        |v| DomainError::validation(v.field, v.message.clone()).into(),
    )
}

#[async_trait]
impl NuagesApi for LocalClient {
    async fn create(&self, new: NewNuage) -> Result<Nuage, NuagesError> {
        validate_new_nuage(&new).map_err(|v| first_violation(&v))?;
        Ok(self.service.create(new).await?)
    }

    async fn get(&self, id: Uuid) -> Result<Nuage, NuagesError> {
        Ok(self.service.get(id).await?)
    }

    async fn list(&self) -> Result<Vec<Nuage>, NuagesError> {
        Ok(self.service.list().await?)
    }

    async fn update(&self, id: Uuid, update: NuageUpdate) -> Result<Nuage, NuagesError> {
        validate_update(&update).map_err(|v| first_violation(&v))?;
        Ok(self.service.update(id, update).await?)
    }

    async fn delete(&self, id: Uuid) -> Result<(), NuagesError> {
        Ok(self.service.delete(id).await?)
    }

    async fn start(&self, id: Uuid) -> Result<Nuage, NuagesError> {
        Ok(self.service.start(id).await?)
    }

    async fn stop(&self, id: Uuid) -> Result<Nuage, NuagesError> {
        Ok(self.service.stop(id).await?)
    }

    async fn reboot(&self, id: Uuid) -> Result<Nuage, NuagesError> {
        Ok(self.service.reboot(id).await?)
    }

    async fn shutdown(&self, id: Uuid) -> Result<Nuage, NuagesError> {
        Ok(self.service.shutdown(id).await?)
    }

    async fn status(&self, id: Uuid) -> Result<NuageStatus, NuagesError> {
        Ok(self.service.status(id).await?)
    }
}
