use nuages_sdk::limits::{
    CORES, DEFAULT_CORES, DEFAULT_DISK_MB, DEFAULT_MEMORY_MB, DEFAULT_SWAP_MB, DISK_MB, MEMORY_MB,
    SWAP_MB,
};
use nuages_sdk::{
    FieldViolation, NewNuage, Nuage, NuageStatus, NuageUpdate, validate_new_nuage,
    validate_update,
};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

/// REST DTO for a nuage record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NuageDto {
    pub id: Uuid,
    pub name: String,
    pub node_name: String,
    pub instance_id: u32,
    pub template: String,
    pub cores: u32,
    pub memory_mb: u32,
    pub swap_mb: u32,
    pub disk_mb: u32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Nuage> for NuageDto {
    fn from(n: Nuage) -> Self {
        Self {
            id: n.id,
            name: n.name,
            node_name: n.node_name,
            instance_id: n.instance_id,
            template: n.template,
            cores: n.cores,
            memory_mb: n.memory_mb,
            swap_mb: n.swap_mb,
            disk_mb: n.disk_mb,
            created_at: n.created_at,
            updated_at: n.updated_at,
        }
    }
}

/// Live status of a nuage; utilisation values are percentages.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NuageStatusDto {
    pub id: Uuid,
    /// `running`, `stopped` or `unknown`
    pub phase: String,
    /// Phase exactly as the cluster reported it.
    pub raw_phase: String,
    pub cpu_usage: f64,
    pub memory_usage: f64,
    pub disk_usage: f64,
    pub swap_usage: f64,
}

impl From<NuageStatus> for NuageStatusDto {
    fn from(s: NuageStatus) -> Self {
        Self {
            id: s.id,
            phase: s.phase.as_str().to_owned(),
            raw_phase: s.raw_phase,
            cpu_usage: s.cpu_usage,
            memory_usage: s.memory_usage,
            disk_usage: s.disk_usage,
            swap_usage: s.swap_usage,
        }
    }
}

fn default_cores() -> i64 {
    i64::from(DEFAULT_CORES)
}
fn default_memory_mb() -> i64 {
    i64::from(DEFAULT_MEMORY_MB)
}
fn default_swap_mb() -> i64 {
    i64::from(DEFAULT_SWAP_MB)
}
fn default_disk_mb() -> i64 {
    i64::from(DEFAULT_DISK_MB)
}

/// Request to create a nuage. Omitted resources take their defaults.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateNuageRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub template: String,
    #[serde(default = "default_cores")]
    pub cores: i64,
    #[serde(default = "default_memory_mb")]
    pub memory_mb: i64,
    #[serde(default = "default_swap_mb")]
    pub swap_mb: i64,
    #[serde(default = "default_disk_mb")]
    pub disk_mb: i64,
}

/// Full replacement of the resource reservation.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateNuageRequest {
    #[serde(default = "default_cores")]
    pub cores: i64,
    #[serde(default = "default_memory_mb")]
    pub memory_mb: i64,
    #[serde(default = "default_swap_mb")]
    pub swap_mb: i64,
    #[serde(default = "default_disk_mb")]
    pub disk_mb: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthDto {
    pub status: String,
}

/// Checks one resource on its own. A value that does not fit `u32` or lies
/// outside `bounds` yields a single violation and `None`.
fn resource(
    field: &'static str,
    value: i64,
    bounds: &RangeInclusive<u32>,
    out: &mut Vec<FieldViolation>,
) -> Option<u32> {
    match u32::try_from(value) {
        Ok(narrowed) if bounds.contains(&narrowed) => Some(narrowed),
        _ => {
            out.push(FieldViolation {
                field,
                message: format!(
                    "must be between {} and {}, got {value}",
                    bounds.start(),
                    bounds.end()
                ),
            });
            None
        }
    }
}

/// Resources that passed their checks. Rejected fields hold the lower bound,
/// which keeps the SDK validators from reporting them a second time.
struct Resources {
    cores: u32,
    memory_mb: u32,
    swap_mb: u32,
    disk_mb: u32,
}

fn resources(
    cores: i64,
    memory_mb: i64,
    swap_mb: i64,
    disk_mb: i64,
    out: &mut Vec<FieldViolation>,
) -> Resources {
    Resources {
        cores: resource("cores", cores, &CORES, out).unwrap_or(*CORES.start()),
        memory_mb: resource("memory_mb", memory_mb, &MEMORY_MB, out)
            .unwrap_or(*MEMORY_MB.start()),
        swap_mb: resource("swap_mb", swap_mb, &SWAP_MB, out).unwrap_or(*SWAP_MB.start()),
        disk_mb: resource("disk_mb", disk_mb, &DISK_MB, out).unwrap_or(*DISK_MB.start()),
    }
}

impl CreateNuageRequest {
    /// Violations come back in field order.
    ///
    /// # Errors
    /// Every field outside its bounds.
    pub fn validate(self) -> Result<NewNuage, Vec<FieldViolation>> {
        let mut resource_violations = Vec::new();
        let r = resources(
            self.cores,
            self.memory_mb,
            self.swap_mb,
            self.disk_mb,
            &mut resource_violations,
        );
        let new = NewNuage {
            name: self.name,
            template: self.template,
            cores: r.cores,
            memory_mb: r.memory_mb,
            swap_mb: r.swap_mb,
            disk_mb: r.disk_mb,
        };
        let mut violations = validate_new_nuage(&new).err().unwrap_or_default();
        violations.extend(resource_violations);
        if violations.is_empty() {
            Ok(new)
        } else {
            Err(violations)
        }
    }
}

impl UpdateNuageRequest {
    /// # Errors
    /// Every field outside its bounds.
    pub fn validate(self) -> Result<NuageUpdate, Vec<FieldViolation>> {
        let mut violations = Vec::new();
        let r = resources(
            self.cores,
            self.memory_mb,
            self.swap_mb,
            self.disk_mb,
            &mut violations,
        );
        if !violations.is_empty() {
            return Err(violations);
        }
        let update = NuageUpdate {
            cores: r.cores,
            memory_mb: r.memory_mb,
            swap_mb: r.swap_mb,
            disk_mb: r.disk_mb,
        };
        validate_update(&update)?;
        Ok(update)
    }
}
