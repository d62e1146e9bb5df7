//! Nuages Module Implementation
//!
//! Keeps container records in the local store in step with the Proxmox
//! cluster that owns the containers. The public API is defined in
//! `nuages-sdk` and re-exported here.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub use nuages_sdk::{
    NewNuage, Nuage, NuagePhase, NuageStatus, NuageUpdate, NuagesApi, NuagesError,
};

pub mod api;
pub mod config;
pub mod domain;
pub mod infra;

pub use config::{NuagesConfig, ProxmoxConfig};
pub use domain::local_client::LocalClient;
pub use domain::service::NuagesService;
