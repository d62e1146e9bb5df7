//! Configuration for the nuages module.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::domain::service::ServiceConfig;

/// Configuration for the nuages module.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct NuagesConfig {
    pub proxmox: ProxmoxConfig,
    /// Start containers right after the cluster has created them.
    pub autostart: Option<bool>,
}

impl NuagesConfig {
    #[must_use]
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            storage_backend: self.proxmox.storage.clone(),
            autostart: self.autostart.unwrap_or(true),
        }
    }
}

/// Connection settings for the Proxmox API.
///
/// The four credentials have no default; [`ProxmoxConfig::validate`] reports
/// the first one missing together with the environment variable that sets it.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ProxmoxConfig {
    pub host: String,
    pub port: u16,
    pub scheme: String,
    pub user: String,
    pub token_name: String,
    pub token_value: SecretString,
    /// Cluster certificates are usually self-signed.
    pub verify_tls: bool,
    pub timeout_ms: Option<u64>,
    /// Storage backend for container root filesystems.
    pub storage: String,
    /// Network interface definition passed as `net0`.
    pub net0: String,
}

impl Default for ProxmoxConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 8006,
            scheme: "https".to_owned(),
            user: String::new(),
            token_name: String::new(),
            token_value: SecretString::from(String::new()),
            verify_tls: false,
            timeout_ms: None,
            storage: "local-lvm".to_owned(),
            net0: "name=eth0,bridge=vmbr0,ip=dhcp".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("missing Proxmox setting `{setting}` (set {env_var})")]
pub struct MissingSetting {
    pub setting: &'static str,
    pub env_var: &'static str,
}

impl ProxmoxConfig {
    /// # Errors
    /// Returns the first credential left empty.
    pub fn validate(&self) -> Result<(), MissingSetting> {
        let checks = [
            ("host", "PROXMOX_HOST", self.host.as_str()),
            ("user", "PROXMOX_USER", self.user.as_str()),
            ("token_name", "PROXMOX_TOKEN_NAME", self.token_name.as_str()),
            (
                "token_value",
                "PROXMOX_TOKEN_VALUE",
                self.token_value.expose_secret(),
            ),
        ];
        for (setting, env_var, value) in checks {
            if value.trim().is_empty() {
                return Err(MissingSetting { setting, env_var });
            }
        }
        Ok(())
    }

    /// `{scheme}://{host}:{port}/api2/json`
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}/api2/json", self.scheme, self.host, self.port)
    }

    /// A copy safe to print: the token is replaced by a placeholder.
    #[must_use]
    pub fn redacted(&self) -> RedactedProxmoxConfig {
        RedactedProxmoxConfig {
            host: self.host.clone(),
            port: self.port,
            scheme: self.scheme.clone(),
            user: self.user.clone(),
            token_name: self.token_name.clone(),
            token_value: if self.token_value.expose_secret().is_empty() {
                String::new()
            } else {
                "***".to_owned()
            },
            verify_tls: self.verify_tls,
            timeout_ms: self.timeout_ms,
            storage: self.storage.clone(),
            net0: self.net0.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RedactedProxmoxConfig {
    pub host: String,
    pub port: u16,
    pub scheme: String,
    pub user: String,
    pub token_name: String,
    pub token_value: String,
    pub verify_tls: bool,
    pub timeout_ms: Option<u64>,
    pub storage: String,
    pub net0: String,
}
