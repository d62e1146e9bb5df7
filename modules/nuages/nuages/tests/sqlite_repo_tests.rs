#![allow(clippy::unwrap_used, clippy::expect_used)]

//! `SeaORM` repository against an in-memory SQLite database.

use nuages::domain::repo::{NuageRecord, NuageRepository, RepositoryError};
use nuages::infra::storage::{self, SeaOrmNuageRepository};
use nuages_sdk::NuageUpdate;
use uuid::Uuid;

async fn repo() -> SeaOrmNuageRepository {
    let db = storage::connect("sqlite::memory:", 1).await.unwrap();
    SeaOrmNuageRepository::new(db)
}

fn record(name: &str, node: &str, instance_id: u32) -> NuageRecord {
    NuageRecord {
        name: name.to_owned(),
        node_name: node.to_owned(),
        instance_id,
        template: "local:vztmpl/debian-12.tar.zst".to_owned(),
        cores: 2,
        memory_mb: 1024,
        swap_mb: 512,
        disk_mb: 8192,
    }
}

#[tokio::test]
async fn test_create_then_lookup_by_id_and_name() {
    let repo = repo().await;

    let created = repo.create(record("alpha", "pve1", 105)).await.unwrap();

    assert_eq!(created.created_at, created.updated_at);
    let by_id = repo.get_by_id(created.id).await.unwrap().unwrap();
    let by_name = repo.get_by_name("alpha").await.unwrap().unwrap();
    assert_eq!(by_id, created);
    assert_eq!(by_name.id, created.id);
    assert_eq!(by_name.instance_id, 105);
}

#[tokio::test]
async fn test_missing_rows_read_as_none() {
    let repo = repo().await;

    assert!(repo.get_by_id(Uuid::new_v4()).await.unwrap().is_none());
    assert!(repo.get_by_name("ghost").await.unwrap().is_none());
    assert!(repo.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unique_name_is_enforced() {
    let repo = repo().await;
    repo.create(record("alpha", "pve1", 105)).await.unwrap();

    let err = repo.create(record("alpha", "pve2", 106)).await.unwrap_err();

    assert!(matches!(err, RepositoryError::DuplicateKey { ref constraint } if constraint == "name"));
    assert_eq!(repo.list_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_unique_instance_id_is_enforced() {
    let repo = repo().await;
    repo.create(record("alpha", "pve1", 105)).await.unwrap();

    let err = repo.create(record("beta", "pve2", 105)).await.unwrap_err();

    assert!(
        matches!(err, RepositoryError::DuplicateKey { ref constraint } if constraint == "instance_id")
    );
}

#[tokio::test]
async fn test_update_replaces_resources_and_bumps_updated_at() {
    let repo = repo().await;
    let created = repo.create(record("alpha", "pve1", 105)).await.unwrap();

    let updated = repo
        .update(
            created.id,
            NuageUpdate {
                cores: 8,
                memory_mb: 4096,
                swap_mb: 0,
                disk_mb: 20_480,
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.cores, 8);
    assert_eq!(updated.memory_mb, 4096);
    assert_eq!(updated.swap_mb, 0);
    assert_eq!(updated.disk_mb, 20_480);
    assert_eq!(updated.name, created.name);
    assert_eq!(updated.node_name, created.node_name);
    assert_eq!(updated.instance_id, created.instance_id);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);
}

#[tokio::test]
async fn test_update_and_delete_of_missing_row_are_not_found() {
    let repo = repo().await;
    let update = NuageUpdate {
        cores: 1,
        memory_mb: 512,
        swap_mb: 512,
        disk_mb: 10_240,
    };

    assert!(matches!(
        repo.update(Uuid::new_v4(), update).await.unwrap_err(),
        RepositoryError::NotFound
    ));
    assert!(matches!(
        repo.delete(Uuid::new_v4()).await.unwrap_err(),
        RepositoryError::NotFound
    ));
}

#[tokio::test]
async fn test_delete_removes_row() {
    let repo = repo().await;
    let created = repo.create(record("alpha", "pve1", 105)).await.unwrap();

    repo.delete(created.id).await.unwrap();

    assert!(repo.get_by_id(created.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_last_instance_id_is_per_node_with_default() {
    let repo = repo().await;
    repo.create(record("a", "pve1", 105)).await.unwrap();
    repo.create(record("b", "pve1", 230)).await.unwrap();
    repo.create(record("c", "pve2", 900)).await.unwrap();

    assert_eq!(repo.last_instance_id_for_node("pve1", 0).await.unwrap(), 230);
    assert_eq!(repo.last_instance_id_for_node("pve2", 0).await.unwrap(), 900);
    assert_eq!(repo.last_instance_id_for_node("pve3", 42).await.unwrap(), 42);
}

#[tokio::test]
async fn test_list_returns_every_record() {
    let repo = repo().await;
    repo.create(record("a", "pve1", 105)).await.unwrap();
    repo.create(record("b", "pve2", 106)).await.unwrap();

    let mut names: Vec<String> = repo
        .list_all()
        .await
        .unwrap()
        .into_iter()
        .map(|n| n.name)
        .collect();
    names.sort();

    assert_eq!(names, vec!["a", "b"]);
}
