//! HTTP surface of the nuages module.

pub mod context;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod openapi;
pub mod routes;

pub use routes::router;
