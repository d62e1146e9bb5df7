//! Layered server configuration.
//!
//! Precedence, lowest first: built-in defaults, the YAML file given with
//! `--config`, `NUAGES__*` environment variables (`__` separates sections),
//! the `PROXMOX_*` variables, then command-line overrides.

use std::net::SocketAddr;
use std::path::Path;

use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use nuages::NuagesConfig;
use nuages::config::RedactedProxmoxConfig;
use serde::{Deserialize, Serialize};

use crate::logging::LoggingConfig;

/// Variables read without the `NUAGES__` prefix, mapped under `nuages.proxmox`.
const PROXMOX_ENV: [&str; 4] = [
    "PROXMOX_HOST",
    "PROXMOX_USER",
    "PROXMOX_TOKEN_NAME",
    "PROXMOX_TOKEN_VALUE",
];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub nuages: NuagesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8087)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://development.sqlite3?mode=rwc".to_owned(),
            max_connections: 10,
        }
    }
}

/// Overrides taken from the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct CliOverrides {
    pub port: Option<u16>,
    pub mock: bool,
    pub verbose: u8,
}

impl AppConfig {
    /// Load every layer. A `path` that does not exist is an error.
    ///
    /// # Errors
    /// Unreadable file or a value of the wrong shape.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            if !path.is_file() {
                anyhow::bail!("config file does not exist: {}", path.display());
            }
            figment = figment.merge(Yaml::file(path));
        }
        figment
            .merge(Env::prefixed("NUAGES__").split("__"))
            .merge(Env::raw().only(&PROXMOX_ENV).map(|key| {
                key.as_str()
                    .to_ascii_lowercase()
                    .replacen("proxmox_", "nuages.proxmox.", 1)
                    .into()
            }))
            .extract()
            .context("invalid configuration")
    }

    pub fn apply_cli_overrides(&mut self, cli: CliOverrides) {
        if let Some(port) = cli.port {
            self.server.bind_addr.set_port(port);
        }
        if cli.mock {
            self.database.url = "sqlite::memory:".to_owned();
        }
        if let Some(level) = LoggingConfig::level_for_verbosity(cli.verbose) {
            self.logging.level = level.to_owned();
        }
    }

    /// Fails on the first missing Proxmox credential.
    ///
    /// # Errors
    /// Names the setting and the environment variable that provides it.
    pub fn validate(&self) -> Result<()> {
        self.nuages.proxmox.validate()?;
        Ok(())
    }

    /// Effective configuration as YAML with the API token masked.
    ///
    /// # Errors
    /// Serialization failure.
    pub fn to_redacted_yaml(&self) -> Result<String> {
        let view = RedactedView {
            server: &self.server,
            database: &self.database,
            logging: &self.logging,
            nuages: RedactedNuages {
                proxmox: self.nuages.proxmox.redacted(),
                autostart: self.nuages.autostart,
            },
        };
        serde_saphyr::to_string(&view).context("failed to render configuration")
    }
}

#[derive(Serialize)]
struct RedactedView<'a> {
    server: &'a ServerConfig,
    database: &'a DatabaseConfig,
    logging: &'a LoggingConfig,
    nuages: RedactedNuages,
}

#[derive(Serialize)]
struct RedactedNuages {
    proxmox: RedactedProxmoxConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    autostart: Option<bool>,
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::logging::LogFormat;
    use figment::Jail;
    use secrecy::ExposeSecret;

    #[test]
    fn defaults_apply_without_any_source() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            let cfg = AppConfig::load(None).unwrap();
            assert_eq!(cfg.server.bind_addr.to_string(), "127.0.0.1:8087");
            assert_eq!(cfg.database.url, "sqlite://development.sqlite3?mode=rwc");
            assert_eq!(cfg.database.max_connections, 10);
            assert_eq!(cfg.nuages.proxmox.port, 8006);
            assert!(cfg.validate().is_err());
            Ok(())
        });
    }

    #[test]
    fn legacy_proxmox_variables_fill_credentials() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env("PROXMOX_HOST", "pve.example.org");
            jail.set_env("PROXMOX_USER", "root@pam");
            jail.set_env("PROXMOX_TOKEN_NAME", "nuages");
            jail.set_env("PROXMOX_TOKEN_VALUE", "a1b2-c3d4");

            let cfg = AppConfig::load(None).unwrap();

            assert_eq!(cfg.nuages.proxmox.host, "pve.example.org");
            assert_eq!(cfg.nuages.proxmox.user, "root@pam");
            assert_eq!(cfg.nuages.proxmox.token_name, "nuages");
            assert_eq!(cfg.nuages.proxmox.token_value.expose_secret(), "a1b2-c3d4");
            assert!(cfg.validate().is_ok());
            Ok(())
        });
    }

    #[test]
    fn yaml_then_prefixed_env_in_precedence_order() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file(
                "nuages.yaml",
                r"
server:
  bind_addr: 0.0.0.0:9000
database:
  url: sqlite://from-file.sqlite3
nuages:
  proxmox:
    host: file-host
    storage: ceph
",
            )?;
            jail.set_env("NUAGES__NUAGES__PROXMOX__HOST", "env-host");
            jail.set_env("NUAGES__DATABASE__MAX_CONNECTIONS", "3");

            let cfg = AppConfig::load(Some(Path::new("nuages.yaml"))).unwrap();

            assert_eq!(cfg.server.bind_addr.port(), 9000);
            assert_eq!(cfg.database.url, "sqlite://from-file.sqlite3");
            assert_eq!(cfg.database.max_connections, 3);
            assert_eq!(cfg.nuages.proxmox.host, "env-host");
            assert_eq!(cfg.nuages.proxmox.storage, "ceph");
            Ok(())
        });
    }

    #[test]
    fn missing_file_is_an_error() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            assert!(AppConfig::load(Some(Path::new("absent.yaml"))).is_err());
            Ok(())
        });
    }

    #[test]
    fn missing_token_error_names_variable() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env("PROXMOX_HOST", "pve");
            jail.set_env("PROXMOX_USER", "root@pam");
            jail.set_env("PROXMOX_TOKEN_NAME", "nuages");

            let err = AppConfig::load(None).unwrap().validate().unwrap_err();
            assert!(err.to_string().contains("PROXMOX_TOKEN_VALUE"));
            Ok(())
        });
    }

    #[test]
    fn cli_overrides_win() {
        let mut cfg = AppConfig::default();
        cfg.apply_cli_overrides(CliOverrides {
            port: Some(9999),
            mock: true,
            verbose: 2,
        });
        assert_eq!(cfg.server.bind_addr.port(), 9999);
        assert_eq!(cfg.database.url, "sqlite::memory:");
        assert_eq!(cfg.logging.level, "debug");
        assert_eq!(cfg.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn printed_config_masks_token() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env("PROXMOX_TOKEN_VALUE", "super-secret-token");
            let yaml = AppConfig::load(None).unwrap().to_redacted_yaml().unwrap();
            assert!(!yaml.contains("super-secret-token"));
            assert!(yaml.contains("***"));
            Ok(())
        });
    }
}
