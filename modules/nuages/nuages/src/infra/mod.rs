pub mod proxmox;
pub mod storage;
