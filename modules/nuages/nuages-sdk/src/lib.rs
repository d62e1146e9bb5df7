//! Nuages SDK
//!
//! Transport-agnostic contract of the nuages module: the records it manages,
//! the resource limits enforced at the boundary, the public error type and the
//! [`NuagesApi`] trait consumed by in-process callers.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod api;
pub mod error;
pub mod limits;
pub mod models;

pub use api::NuagesApi;
pub use error::NuagesError;
pub use limits::{FieldViolation, validate_new_nuage, validate_update};
pub use models::{NewNuage, Nuage, NuagePhase, NuageStatus, NuageUpdate};
