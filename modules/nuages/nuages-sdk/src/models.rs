//! Public models for the nuages module.
//!
//! These are transport-agnostic data structures that define the contract
//! between the nuages module and its consumers.

use time::OffsetDateTime;
use uuid::Uuid;

/// A managed container instance and its placement on the cluster.
///
/// `node_name` and `instance_id` are assigned once at creation and never change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nuage {
    pub id: Uuid,
    pub name: String,
    pub node_name: String,
    pub instance_id: u32,
    pub template: String,
    pub cores: u32,
    pub memory_mb: u32,
    pub swap_mb: u32,
    pub disk_mb: u32,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Data required to create a nuage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNuage {
    pub name: String,
    pub template: String,
    pub cores: u32,
    pub memory_mb: u32,
    pub swap_mb: u32,
    pub disk_mb: u32,
}

/// Full replacement of the mutable resource reservation.
///
/// Applied to the local record only; the running instance keeps its
/// original allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NuageUpdate {
    pub cores: u32,
    pub memory_mb: u32,
    pub swap_mb: u32,
    pub disk_mb: u32,
}

/// Lifecycle phase reported by the cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NuagePhase {
    Running,
    Stopped,
    Unknown,
}

impl NuagePhase {
    /// Translate the cluster's phase string.
    #[must_use]
    pub fn from_remote(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "running" => Self::Running,
            "stopped" => Self::Stopped,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Stopped => "stopped",
            Self::Unknown => "unknown",
        }
    }
}

/// Live view of an instance, computed on demand and never stored.
///
/// Every usage value is a percentage in `[0.0, 100.0]`.
#[derive(Debug, Clone, PartialEq)]
pub struct NuageStatus {
    pub id: Uuid,
    pub phase: NuagePhase,
    pub raw_phase: String,
    pub cpu_usage: f64,
    pub memory_usage: f64,
    pub disk_usage: f64,
    pub swap_usage: f64,
}
