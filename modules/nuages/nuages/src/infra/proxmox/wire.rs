//! Payloads of the Proxmox VE JSON API.
//!
//! Every response wraps its payload as `{"data": ...}`.

use serde::{Deserialize, Deserializer};

use crate::domain::cluster::InstanceStatus;

#[derive(Debug, Deserialize)]
pub(super) struct Envelope<T> {
    pub data: T,
}

#[derive(Debug, Deserialize)]
pub(super) struct NodeEntry {
    pub node: String,
    #[serde(default)]
    pub status: Option<String>,
}

impl NodeEntry {
    pub fn is_online(&self) -> bool {
        self.status.as_deref() == Some("online")
    }
}

/// `/cluster/nextid` answers with a string on most versions, a number on some.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum NextId {
    Text(String),
    Number(u64),
}

impl NextId {
    pub fn value(&self) -> Option<u32> {
        match self {
            Self::Text(text) => text.trim().parse().ok(),
            Self::Number(n) => u32::try_from(*n).ok(),
        }
    }
}

/// Counters of `/nodes/{node}/lxc/{vmid}/status/current`.
#[derive(Debug, Default, Deserialize)]
pub(super) struct CurrentStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub cpu: Option<f64>,
    #[serde(default, deserialize_with = "counter")]
    pub mem: Option<u64>,
    #[serde(default, deserialize_with = "counter")]
    pub maxmem: Option<u64>,
    #[serde(default, deserialize_with = "counter")]
    pub disk: Option<u64>,
    #[serde(default, deserialize_with = "counter")]
    pub maxdisk: Option<u64>,
    #[serde(default, deserialize_with = "counter")]
    pub swap: Option<u64>,
    #[serde(default, deserialize_with = "counter")]
    pub maxswap: Option<u64>,
}

/// Byte counters occasionally arrive as floats or strings.
fn counter<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0)
                .map(float_to_u64)
        }),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn float_to_u64(value: f64) -> u64 {
    value as u64
}

impl From<CurrentStatus> for InstanceStatus {
    fn from(raw: CurrentStatus) -> Self {
        Self {
            phase: raw.status,
            cpu: raw.cpu,
            mem: raw.mem,
            maxmem: raw.maxmem,
            disk: raw.disk,
            maxdisk: raw.maxdisk,
            swap: raw.swap,
            maxswap: raw.maxswap,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn next_id_accepts_string_and_number() {
        let text: Envelope<NextId> = serde_json::from_str(r#"{"data":"105"}"#).unwrap();
        let number: Envelope<NextId> = serde_json::from_str(r#"{"data":106}"#).unwrap();
        assert_eq!(text.data.value(), Some(105));
        assert_eq!(number.data.value(), Some(106));
    }

    #[test]
    fn next_id_rejects_garbage() {
        let garbage: Envelope<NextId> = serde_json::from_str(r#"{"data":"abc"}"#).unwrap();
        assert_eq!(garbage.data.value(), None);
    }

    #[test]
    fn only_online_nodes_are_online() {
        let nodes: Envelope<Vec<NodeEntry>> = serde_json::from_str(
            r#"{"data":[{"node":"pve1","status":"online"},{"node":"pve2","status":"offline"},{"node":"pve3"}]}"#,
        )
        .unwrap();
        let online: Vec<&str> = nodes
            .data
            .iter()
            .filter(|n| n.is_online())
            .map(|n| n.node.as_str())
            .collect();
        assert_eq!(online, vec!["pve1"]);
    }

    #[test]
    fn status_tolerates_missing_and_float_counters() {
        let raw: Envelope<CurrentStatus> = serde_json::from_str(
            r#"{"data":{"status":"running","cpu":0.25,"mem":1048576.0,"maxmem":"2097152"}}"#,
        )
        .unwrap();
        let status = InstanceStatus::from(raw.data);
        assert_eq!(status.phase, "running");
        assert_eq!(status.cpu, Some(0.25));
        assert_eq!(status.mem, Some(1_048_576));
        assert_eq!(status.maxmem, Some(2_097_152));
        assert_eq!(status.disk, None);
    }
}
