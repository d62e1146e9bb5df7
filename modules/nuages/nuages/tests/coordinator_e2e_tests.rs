#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Coordinator wired to the real adapters: `SQLite` records and a mocked
//! Proxmox API.

use std::sync::Arc;

use httpmock::prelude::*;
use nuages::domain::error::DomainError;
use nuages::domain::service::ServiceConfig;
use nuages::infra::proxmox::ProxmoxClient;
use nuages::infra::storage::{self, SeaOrmNuageRepository};
use nuages::{NewNuage, NuagePhase, NuagesService, ProxmoxConfig};
use secrecy::SecretString;
use serde_json::json;

fn proxmox_config(server: &MockServer) -> ProxmoxConfig {
    ProxmoxConfig {
        host: "127.0.0.1".to_owned(),
        port: server.port(),
        scheme: "http".to_owned(),
        user: "root@pam".to_owned(),
        token_name: "nuages".to_owned(),
        token_value: SecretString::from("s3cret".to_owned()),
        ..ProxmoxConfig::default()
    }
}

async fn service(server: &MockServer) -> NuagesService {
    let db = storage::connect("sqlite::memory:", 1).await.unwrap();
    let cluster = ProxmoxClient::new(&proxmox_config(server)).unwrap();
    NuagesService::new(
        Arc::new(SeaOrmNuageRepository::new(db)),
        Arc::new(cluster),
        ServiceConfig::default(),
    )
}

fn alpha() -> NewNuage {
    NewNuage {
        name: "alpha".to_owned(),
        template: "local:vztmpl/debian-12.tar.zst".to_owned(),
        cores: 1,
        memory_mb: 512,
        swap_mb: 512,
        disk_mb: 10_240,
    }
}

fn mock_placement(server: &MockServer) {
    server.mock(|when, then| {
        when.method(GET).path("/api2/json/nodes");
        then.status(200)
            .json_body(json!({"data": [{"node": "pve1", "status": "online"}]}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/api2/json/cluster/nextid");
        then.status(200).json_body(json!({"data": "105"}));
    });
}

#[tokio::test]
async fn test_create_status_delete_against_proxmox_api() {
    let server = MockServer::start();
    mock_placement(&server);
    let create = server.mock(|when, then| {
        when.method(POST)
            .path("/api2/json/nodes/pve1/lxc")
            .body_includes("vmid=105")
            .body_includes("rootfs=local-lvm%3A10");
        then.status(200).json_body(json!({"data": "UPID:pve1"}));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/api2/json/nodes/pve1/lxc/105/status/current");
        then.status(200).json_body(json!({"data": {
            "status": "stopped", "cpu": 0, "mem": 0, "maxmem": 0, "disk": 0, "maxdisk": 0
        }}));
    });
    let delete = server.mock(|when, then| {
        when.method(DELETE)
            .path("/api2/json/nodes/pve1/lxc/105")
            .query_param("force", "1")
            .query_param("purge", "1");
        then.status(200).json_body(json!({"data": "UPID:pve1"}));
    });
    let service = service(&server).await;

    let nuage = service.create(alpha()).await.unwrap();
    assert_eq!(nuage.node_name, "pve1");
    assert_eq!(nuage.instance_id, 105);
    create.assert();

    let status = service.status(nuage.id).await.unwrap();
    assert_eq!(status.phase, NuagePhase::Stopped);
    assert!(status.cpu_usage.abs() < f64::EPSILON);
    assert!(status.memory_usage.abs() < f64::EPSILON);
    assert!(status.disk_usage.abs() < f64::EPSILON);

    service.delete(nuage.id).await.unwrap();
    delete.assert();
    assert!(matches!(
        service.get(nuage.id).await.unwrap_err(),
        DomainError::NotFound { .. }
    ));
}

#[tokio::test]
async fn test_failed_remote_delete_keeps_record_for_retry() {
    let server = MockServer::start();
    mock_placement(&server);
    server.mock(|when, then| {
        when.method(POST).path("/api2/json/nodes/pve1/lxc");
        then.status(200).json_body(json!({"data": "UPID:pve1"}));
    });
    server.mock(|when, then| {
        when.method(DELETE).path("/api2/json/nodes/pve1/lxc/105");
        then.status(500).body("CT 105 is locked (backup)");
    });
    let service = service(&server).await;
    let nuage = service.create(alpha()).await.unwrap();

    let err = service.delete(nuage.id).await.unwrap_err();

    assert!(matches!(
        err,
        DomainError::UpstreamUnavailable {
            operation: "delete_instance",
            ..
        }
    ));
    assert_eq!(service.get(nuage.id).await.unwrap().id, nuage.id);
}

#[tokio::test]
async fn test_rejected_create_leaves_no_record() {
    let server = MockServer::start();
    mock_placement(&server);
    server.mock(|when, then| {
        when.method(POST).path("/api2/json/nodes/pve1/lxc");
        then.status(500).body("storage 'local-lvm' does not exist");
    });
    let service = service(&server).await;

    let err = service.create(alpha()).await.unwrap_err();

    assert!(matches!(
        err,
        DomainError::UpstreamUnavailable {
            operation: "create_instance",
            ..
        }
    ));
    assert!(service.list().await.unwrap().is_empty());
}
