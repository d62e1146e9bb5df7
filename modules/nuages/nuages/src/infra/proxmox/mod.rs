//! Proxmox VE adapter for the cluster port.

mod client;
mod tls;
mod wire;


pub use client::ProxmoxClient;
