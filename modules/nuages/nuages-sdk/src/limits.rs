//! Resource limits accepted at the module boundary.
//!
//! The coordinator assumes its inputs already satisfy these bounds; callers
//! (REST handlers, in-process clients) validate before invoking it.

use std::ops::RangeInclusive;

use crate::models::{NewNuage, NuageUpdate};

pub const NAME_LENGTH: RangeInclusive<usize> = 1..=255;
pub const TEMPLATE_LENGTH: RangeInclusive<usize> = 1..=255;

pub const CORES: RangeInclusive<u32> = 1..=64;
pub const MEMORY_MB: RangeInclusive<u32> = 256..=32_768;
pub const SWAP_MB: RangeInclusive<u32> = 0..=16_384;
pub const DISK_MB: RangeInclusive<u32> = 1_024..=1_048_576;

/// Identifiers the cluster can hand out.
pub const INSTANCE_ID: RangeInclusive<u32> = 100..=999_999_999;

pub const DEFAULT_CORES: u32 = 1;
pub const DEFAULT_MEMORY_MB: u32 = 512;
pub const DEFAULT_SWAP_MB: u32 = 512;
pub const DEFAULT_DISK_MB: u32 = 10_240;

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: String,
}

fn check_text(
    field: &'static str,
    value: &str,
    bounds: &RangeInclusive<usize>,
    out: &mut Vec<FieldViolation>,
) {
    let len = value.chars().count();
    if value.trim().is_empty() {
        out.push(FieldViolation {
            field,
            message: "must not be blank".to_owned(),
        });
    } else if !bounds.contains(&len) {
        out.push(FieldViolation {
            field,
            message: format!(
                "length must be between {} and {} characters, got {len}",
                bounds.start(),
                bounds.end()
            ),
        });
    }
}

fn check_range(
    field: &'static str,
    value: u32,
    bounds: &RangeInclusive<u32>,
    out: &mut Vec<FieldViolation>,
) {
    if !bounds.contains(&value) {
        out.push(FieldViolation {
            field,
            message: format!(
                "must be between {} and {}, got {value}",
                bounds.start(),
                bounds.end()
            ),
        });
    }
}

fn check_resources(
    cores: u32,
    memory_mb: u32,
    swap_mb: u32,
    disk_mb: u32,
    out: &mut Vec<FieldViolation>,
) {
    check_range("cores", cores, &CORES, out);
    check_range("memory_mb", memory_mb, &MEMORY_MB, out);
    check_range("swap_mb", swap_mb, &SWAP_MB, out);
    check_range("disk_mb", disk_mb, &DISK_MB, out);
}

/// Validate a creation request, reporting every offending field.
///
/// # Errors
/// Returns the list of violations when any field is out of bounds.
pub fn validate_new_nuage(new: &NewNuage) -> Result<(), Vec<FieldViolation>> {
    let mut violations = Vec::new();
    check_text("name", &new.name, &NAME_LENGTH, &mut violations);
    check_text("template", &new.template, &TEMPLATE_LENGTH, &mut violations);
    check_resources(new.cores, new.memory_mb, new.swap_mb, new.disk_mb, &mut violations);

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

/// Validate a resource update, reporting every offending field.
///
/// # Errors
/// Returns the list of violations when any field is out of bounds.
pub fn validate_update(update: &NuageUpdate) -> Result<(), Vec<FieldViolation>> {
    let mut violations = Vec::new();
    check_resources(
        update.cores,
        update.memory_mb,
        update.swap_mb,
        update.disk_mb,
        &mut violations,
    );

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn valid() -> NewNuage {
        NewNuage {
            name: "alpha".to_owned(),
            template: "debian-12".to_owned(),
            cores: 2,
            memory_mb: 1024,
            swap_mb: 512,
            disk_mb: 8192,
        }
    }

    #[test]
    fn accepts_request_within_bounds() {
        assert!(validate_new_nuage(&valid()).is_ok());
    }

    #[test]
    fn accepts_boundary_values() {
        let new = NewNuage {
            cores: *CORES.end(),
            memory_mb: *MEMORY_MB.start(),
            swap_mb: 0,
            disk_mb: *DISK_MB.end(),
            ..valid()
        };
        assert!(validate_new_nuage(&new).is_ok());
    }

    #[test]
    fn reports_every_offending_field() {
        let new = NewNuage {
            name: "   ".to_owned(),
            cores: 0,
            memory_mb: 128,
            disk_mb: 10,
            ..valid()
        };
        let violations = validate_new_nuage(&new).unwrap_err();
        let fields: Vec<&str> = violations.iter().map(|v| v.field).collect();
        assert_eq!(fields, vec!["name", "cores", "memory_mb", "disk_mb"]);
    }

    #[test]
    fn rejects_overlong_template() {
        let new = NewNuage {
            template: "t".repeat(256),
            ..valid()
        };
        let violations = validate_new_nuage(&new).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "template");
    }

    #[test]
    fn update_checks_resources_only() {
        let update = NuageUpdate {
            cores: 65,
            memory_mb: 512,
            swap_mb: 20_000,
            disk_mb: 2048,
        };
        let violations = validate_update(&update).unwrap_err();
        let fields: Vec<&str> = violations.iter().map(|v| v.field).collect();
        assert_eq!(fields, vec!["cores", "swap_mb"]);
    }
}
