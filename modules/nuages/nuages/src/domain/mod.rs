pub mod cluster;
pub mod error;
pub mod local_client;
pub mod placement;
pub mod repo;
pub mod service;
