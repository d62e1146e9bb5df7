use async_trait::async_trait;
use nuages_sdk::{Nuage, NuageUpdate};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, SqlErr,
};
use time::OffsetDateTime;
use uuid::Uuid;

use super::entity::{self, Entity as NuageEntity};
use super::mapper::{record_to_active_model, update_to_active_model};
use crate::domain::repo::{NuageRecord, NuageRepository, RepositoryError};

/// `SeaORM` implementation of [`NuageRepository`].
///
/// Every call takes its own connection from the pool, so each operation is
/// an independent unit of work.
pub struct SeaOrmNuageRepository {
    db: DatabaseConnection,
}

impl SeaOrmNuageRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Unique violations are reported by the column they hit (`name` or
/// `instance_id`) whatever the backend's message format.
fn classify(err: DbErr) -> RepositoryError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(message)) => {
            let constraint = if message.contains("instance_id") {
                "instance_id".to_owned()
            } else if message.contains("name") {
                "name".to_owned()
            } else {
                message
            };
            RepositoryError::DuplicateKey { constraint }
        }
        _ => match err {
            DbErr::RecordNotFound(_) | DbErr::RecordNotUpdated => RepositoryError::NotFound,
            other => RepositoryError::Backend(other.to_string()),
        },
    }
}

fn now() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

#[async_trait]
impl NuageRepository for SeaOrmNuageRepository {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Nuage>, RepositoryError> {
        NuageEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(classify)?
            .map(Nuage::try_from)
            .transpose()
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Nuage>, RepositoryError> {
        NuageEntity::find()
            .filter(entity::Column::Name.eq(name))
            .one(&self.db)
            .await
            .map_err(classify)?
            .map(Nuage::try_from)
            .transpose()
    }

    async fn list_all(&self) -> Result<Vec<Nuage>, RepositoryError> {
        NuageEntity::find()
            .order_by_asc(entity::Column::CreatedAt)
            .order_by_asc(entity::Column::Name)
            .all(&self.db)
            .await
            .map_err(classify)?
            .into_iter()
            .map(Nuage::try_from)
            .collect()
    }

    async fn create(&self, record: NuageRecord) -> Result<Nuage, RepositoryError> {
        let active = record_to_active_model(record, Uuid::new_v4(), now())?;
        let model = active.insert(&self.db).await.map_err(classify)?;
        Nuage::try_from(model)
    }

    async fn update(&self, id: Uuid, update: NuageUpdate) -> Result<Nuage, RepositoryError> {
        let active = update_to_active_model(id, update, now())?;
        let model = active.update(&self.db).await.map_err(classify)?;
        Nuage::try_from(model)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let result = NuageEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(classify)?;
        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn last_instance_id_for_node(
        &self,
        node_name: &str,
        default: u32,
    ) -> Result<u32, RepositoryError> {
        let max: Option<Option<i64>> = NuageEntity::find()
            .select_only()
            .column_as(entity::Column::InstanceId.max(), "max_instance_id")
            .filter(entity::Column::NodeName.eq(node_name))
            .into_tuple()
            .one(&self.db)
            .await
            .map_err(classify)?;

        match max.flatten() {
            Some(value) => u32::try_from(value).map_err(|_| {
                RepositoryError::Backend(format!("column instance_id holds invalid value {value}"))
            }),
            None => Ok(default),
        }
    }
}
