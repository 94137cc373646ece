//! Builders to construct client components from configuration.

pub mod client_builder;

pub use client_builder::build_board_client;
