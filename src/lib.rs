//! # Pressboard Client
//!
//! Session-coordinated API client core for the Pressboard print-shop
//! scheduling board.
//!
//! The board server hands out short-lived access tokens; any API call may
//! come back with a 403 meaning "token expired, refresh it". This library
//! provides the coordination layer that makes that invisible to the rest of
//! the application: a session gate that serializes concurrent API calls
//! behind a single-flight token refresh cycle.
//!
//! ## Core Problem Solved
//!
//! A scheduling board fires many API calls at once (timeline fetches, task
//! moves, lock toggles), and an expired access token fails all of them at
//! the same moment. Handling that naively goes wrong in quiet ways:
//!
//! - **Duplicate refreshes**: every rejected call starts its own refresh,
//!   and all but one invalidate the others' fresh tokens
//! - **Lost requests**: calls rejected mid-refresh are dropped instead of
//!   being re-issued with the new token
//! - **Deadlock**: a refresh that never resolves parks every caller forever
//! - **Stale reads**: a late caller is served with pre-refresh credentials
//!
//! ## Key Features
//!
//! - **Single-Flight Refresh**: concurrent 403s coalesce into exactly one
//!   refresh call; everyone shares its outcome
//! - **FIFO Settlement**: requests queued during a refresh are re-issued in
//!   arrival order with the new token, before the gate reopens
//! - **Terminal Failure Fan-Out**: a failed refresh settles every parked
//!   caller with a session-expired error and clears the session store once
//! - **Pluggable Collaborators**: transport, refresher, and session store
//!   are trait seams; reqwest and in-memory/JSON-file backends ship in
//!   `infra`
//! - **Typed Board Operations**: login, timeline queries, and task
//!   mutations as a thin façade over the gate
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pressboard_client::builders::build_board_client;
//! use pressboard_client::config::ClientConfig;
//!
//! let cfg = ClientConfig::from_json_str(config_json)?;
//! let client = build_board_client(&cfg).await?;
//!
//! client.login("operator", "secret").await?;
//! let calendar = client.calendar().await?;
//! client.move_task(task_id, machine_id, new_start).await?;
//! ```
//!
//! For complete examples, see:
//! - `tests/reauth_gate_test.rs` - gate coordination integration tests
//! - `README.md` - comprehensive documentation

#![deny(warnings)]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Typed API façade: login and board operations over the gate.
pub mod api;
/// Builders to construct the client from configuration.
#[cfg(feature = "reqwest-transport")]
pub mod builders;
/// Configuration models for the client.
pub mod config;
/// Core abstractions: wire models, session state, and the refresh gate.
pub mod core;
/// Infrastructure adapters for transports and session stores.
pub mod infra;
/// Shared utilities.
pub mod util;
