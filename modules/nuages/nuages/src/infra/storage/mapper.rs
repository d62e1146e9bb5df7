//! Entity to domain model mappers.

use nuages_sdk::{Nuage, NuageUpdate};
use sea_orm::ActiveValue::{Set, Unchanged};
use time::OffsetDateTime;
use uuid::Uuid;

use super::entity;
use crate::domain::repo::{NuageRecord, RepositoryError};

fn to_u32<T>(column: &str, value: T) -> Result<u32, RepositoryError>
where
    T: Copy + std::fmt::Display,
    u32: TryFrom<T>,
{
    u32::try_from(value)
        .map_err(|_| RepositoryError::Backend(format!("column {column} holds invalid value {value}")))
}

fn to_i32(column: &str, value: u32) -> Result<i32, RepositoryError> {
    i32::try_from(value)
        .map_err(|_| RepositoryError::Backend(format!("{column} value {value} does not fit the column")))
}

impl TryFrom<entity::Model> for Nuage {
    type Error = RepositoryError;

    fn try_from(model: entity::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            instance_id: to_u32("instance_id", model.instance_id)?,
            cores: to_u32("cores", model.cores)?,
            memory_mb: to_u32("memory_mb", model.memory_mb)?,
            swap_mb: to_u32("swap_mb", model.swap_mb)?,
            disk_mb: to_u32("disk_mb", model.disk_mb)?,
            name: model.name,
            node_name: model.node_name,
            template: model.template,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

/// Active model for a fresh insert; both timestamps are set to `now`.
pub fn record_to_active_model(
    record: NuageRecord,
    id: Uuid,
    now: OffsetDateTime,
) -> Result<entity::ActiveModel, RepositoryError> {
    Ok(entity::ActiveModel {
        id: Set(id),
        name: Set(record.name),
        node_name: Set(record.node_name),
        instance_id: Set(i64::from(record.instance_id)),
        template: Set(record.template),
        cores: Set(to_i32("cores", record.cores)?),
        memory_mb: Set(to_i32("memory_mb", record.memory_mb)?),
        swap_mb: Set(to_i32("swap_mb", record.swap_mb)?),
        disk_mb: Set(to_i32("disk_mb", record.disk_mb)?),
        created_at: Set(now),
        updated_at: Set(now),
    })
}

/// Active model touching only the resource columns and `updated_at`.
pub fn update_to_active_model(
    id: Uuid,
    update: NuageUpdate,
    now: OffsetDateTime,
) -> Result<entity::ActiveModel, RepositoryError> {
    Ok(entity::ActiveModel {
        id: Unchanged(id),
        cores: Set(to_i32("cores", update.cores)?),
        memory_mb: Set(to_i32("memory_mb", update.memory_mb)?),
        swap_mb: Set(to_i32("swap_mb", update.swap_mb)?),
        disk_mb: Set(to_i32("disk_mb", update.disk_mb)?),
        updated_at: Set(now),
        ..Default::default()
    })
}
