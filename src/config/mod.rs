//! Configuration models for the board client.

pub mod client;

pub use client::{ClientConfig, StoreBackendConfig};
