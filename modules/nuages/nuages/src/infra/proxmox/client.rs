use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderValue, Method, Request};
use http_body_util::{BodyExt, Full};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use super::tls;
use super::wire::{CurrentStatus, Envelope, NextId, NodeEntry};
use crate::config::ProxmoxConfig;
use crate::domain::cluster::{
    ClusterClient, ClusterError, InstanceSpec, InstanceStatus, PowerAction,
};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Cluster client speaking the Proxmox VE JSON API with token authentication.
///
/// Every call is a single request: no retry, and no timeout unless
/// `timeout_ms` is configured.
pub struct ProxmoxClient {
    http: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
    base_url: String,
    auth: HeaderValue,
    net0: String,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for ProxmoxClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxmoxClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl ProxmoxClient {
    /// # Errors
    /// Returns `ClusterError::Tls` when the TLS stack cannot be set up and
    /// `ClusterError::InvalidRequest` when the credentials do not form a
    /// valid header.
    pub fn new(config: &ProxmoxConfig) -> Result<Self, ClusterError> {
        let tls = tls::client_config(config.verify_tls)?;
        let https = hyper_rustls::HttpsConnectorBuilder::new()
            .with_tls_config(tls)
            .https_or_http()
            .enable_http1()
            .enable_http2()
            .build();
        let http = Client::builder(TokioExecutor::new()).build(https);

        let mut auth = HeaderValue::from_str(&format!(
            "PVEAPIToken={}!{}={}",
            config.user,
            config.token_name,
            config.token_value.expose_secret()
        ))
        .map_err(|_| {
            ClusterError::InvalidRequest("credentials contain invalid header characters".to_owned())
        })?;
        auth.set_sensitive(true);

        if config.scheme == "http" {
            tracing::warn!("Proxmox API reached over plain HTTP; use only for testing");
        }

        Ok(Self {
            http,
            base_url: config.base_url(),
            auth,
            net0: config.net0.clone(),
            timeout: config.timeout_ms.map(Duration::from_millis),
        })
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        form: Option<String>,
    ) -> Result<T, ClusterError> {
        let uri = format!("{}{path}", self.base_url);
        let mut builder = Request::builder()
            .method(method.clone())
            .uri(&uri)
            .header(AUTHORIZATION, self.auth.clone());
        let body = match form {
            Some(form) => {
                builder = builder.header(CONTENT_TYPE, FORM_CONTENT_TYPE);
                Full::new(Bytes::from(form))
            }
            None => Full::new(Bytes::new()),
        };
        let request = builder
            .body(body)
            .map_err(|e| ClusterError::InvalidRequest(e.to_string()))?;

        debug!(%method, path, "Calling Proxmox API");
        let exchange = async {
            let response = self
                .http
                .request(request)
                .await
                .map_err(|e| ClusterError::Transport(Box::new(e)))?;
            let status = response.status();
            let bytes = response
                .into_body()
                .collect()
                .await
                .map_err(|e| ClusterError::Transport(Box::new(e)))?
                .to_bytes();
            Ok::<_, ClusterError>((status, bytes))
        };
        let (status, bytes) = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, exchange)
                .await
                .map_err(|_| ClusterError::Timeout(limit))??,
            None => exchange.await?,
        };

        if !status.is_success() {
            return Err(ClusterError::Api {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        serde_json::from_slice::<Envelope<T>>(&bytes)
            .map(|envelope| envelope.data)
            .map_err(|e| ClusterError::Decode(e.to_string()))
    }
}

/// Node names are interpolated into request paths.
fn node_segment(node: &str) -> Result<&str, ClusterError> {
    if node.is_empty() || node.contains(['/', '?', '#']) {
        return Err(ClusterError::InvalidRequest(format!("invalid node name '{node}'")));
    }
    Ok(node)
}

/// `<storage>:<GiB>`, rounding partial gigabytes up.
pub(super) fn rootfs(storage: &str, disk_mb: u32) -> String {
    format!("{storage}:{}", disk_mb.div_ceil(1024))
}

fn create_form(spec: &InstanceSpec, net0: &str) -> Result<String, ClusterError> {
    let fields = [
        ("vmid", spec.instance_id.to_string()),
        ("ostemplate", spec.template.clone()),
        ("hostname", spec.hostname.clone()),
        ("cores", spec.cores.to_string()),
        ("memory", spec.memory_mb.to_string()),
        ("swap", spec.swap_mb.to_string()),
        ("rootfs", rootfs(&spec.storage_backend, spec.disk_mb)),
        ("net0", net0.to_owned()),
        ("start", u8::from(spec.autostart).to_string()),
    ];
    serde_urlencoded::to_string(fields).map_err(|e| ClusterError::InvalidRequest(e.to_string()))
}

#[async_trait]
impl ClusterClient for ProxmoxClient {
    #[instrument(skip(self))]
    async fn list_nodes(&self) -> Result<Vec<String>, ClusterError> {
        let nodes: Vec<NodeEntry> = self.send(Method::GET, "/nodes", None).await?;
        Ok(nodes
            .into_iter()
            .filter(NodeEntry::is_online)
            .map(|n| n.node)
            .collect())
    }

    #[instrument(skip(self))]
    async fn next_global_id(&self) -> Result<u32, ClusterError> {
        let next: NextId = self.send(Method::GET, "/cluster/nextid", None).await?;
        next.value()
            .ok_or_else(|| ClusterError::Decode(format!("unusable next id {next:?}")))
    }

    #[instrument(skip(self, spec), fields(node = %spec.node, instance_id = spec.instance_id))]
    async fn create_instance(&self, spec: &InstanceSpec) -> Result<(), ClusterError> {
        let path = format!("/nodes/{}/lxc", node_segment(&spec.node)?);
        let form = create_form(spec, &self.net0)?;
        let _task: serde_json::Value = self.send(Method::POST, &path, Some(form)).await?;
        Ok(())
    }

    #[instrument(skip(self, action), fields(action = action.as_str()))]
    async fn power(
        &self,
        node: &str,
        instance_id: u32,
        action: PowerAction,
    ) -> Result<(), ClusterError> {
        let path = format!(
            "/nodes/{}/lxc/{instance_id}/status/{}",
            node_segment(node)?,
            action.as_str()
        );
        let _task: serde_json::Value = self.send(Method::POST, &path, None).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_instance(
        &self,
        node: &str,
        instance_id: u32,
        force: bool,
        purge: bool,
    ) -> Result<(), ClusterError> {
        let query = serde_urlencoded::to_string([
            ("force", u8::from(force)),
            ("purge", u8::from(purge)),
        ])
        .map_err(|e| ClusterError::InvalidRequest(e.to_string()))?;
        let path = format!("/nodes/{}/lxc/{instance_id}?{query}", node_segment(node)?);
        let _task: serde_json::Value = self.send(Method::DELETE, &path, None).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn instance_status(
        &self,
        node: &str,
        instance_id: u32,
    ) -> Result<InstanceStatus, ClusterError> {
        let path = format!("/nodes/{}/lxc/{instance_id}/status/current", node_segment(node)?);
        let raw: CurrentStatus = self.send(Method::GET, &path, None).await?;
        Ok(raw.into())
    }
}
