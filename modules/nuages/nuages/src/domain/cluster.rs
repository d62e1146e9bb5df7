use std::time::Duration;

use async_trait::async_trait;

/// Everything the cluster needs to create a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceSpec {
    pub node: String,
    pub instance_id: u32,
    pub template: String,
    pub cores: u32,
    pub memory_mb: u32,
    pub swap_mb: u32,
    pub disk_mb: u32,
    pub hostname: String,
    pub storage_backend: String,
    pub autostart: bool,
}

/// Raw counters reported by the cluster for one instance.
///
/// Counters the cluster omits are `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstanceStatus {
    pub phase: String,
    pub cpu: Option<f64>,
    pub mem: Option<u64>,
    pub maxmem: Option<u64>,
    pub disk: Option<u64>,
    pub maxdisk: Option<u64>,
    pub swap: Option<u64>,
    pub maxswap: Option<u64>,
}

/// Lifecycle transitions delegated to the cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerAction {
    Start,
    Stop,
    Reboot,
    Shutdown,
}

impl PowerAction {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Reboot => "reboot",
            Self::Shutdown => "shutdown",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClusterError {
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("TLS error: {0}")]
    Tls(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The cluster answered with a non-2xx status.
    #[error("cluster API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("unexpected cluster response: {0}")]
    Decode(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Orchestration API of the cluster that owns the containers.
///
/// Implementations raise on any transport or API failure and never retry;
/// transition legality (e.g. stopping a stopped instance) is left to the
/// cluster.
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Names of the nodes currently able to host instances.
    async fn list_nodes(&self) -> Result<Vec<String>, ClusterError>;

    /// Next identifier from the cluster-wide allocator.
    async fn next_global_id(&self) -> Result<u32, ClusterError>;

    async fn create_instance(&self, spec: &InstanceSpec) -> Result<(), ClusterError>;

    async fn power(
        &self,
        node: &str,
        instance_id: u32,
        action: PowerAction,
    ) -> Result<(), ClusterError>;

    async fn delete_instance(
        &self,
        node: &str,
        instance_id: u32,
        force: bool,
        purge: bool,
    ) -> Result<(), ClusterError>;

    async fn instance_status(
        &self,
        node: &str,
        instance_id: u32,
    ) -> Result<InstanceStatus, ClusterError>;
}
