//! Builder assembling a ready board client from configuration.

use std::sync::Arc;
use std::time::Duration;

use crate::api::BoardClient;
use crate::config::{ClientConfig, StoreBackendConfig};
use crate::core::{AppResult, GateOptions, SessionGate};
use crate::infra::http::{ReqwestRefresher, ReqwestTransport};
use crate::infra::store::{ConfiguredStore, FileSessionStore, InMemorySessionStore};

/// Validate `cfg` and build a [`BoardClient`] over the reqwest transport and
/// the configured session store.
pub async fn build_board_client(
    cfg: &ClientConfig,
) -> AppResult<BoardClient<ReqwestTransport, ReqwestRefresher, ConfiguredStore>> {
    cfg.validate()
        .map_err(|e| anyhow::anyhow!("config invalid: {e}"))?;

    let request_timeout = Duration::from_secs(cfg.request_timeout_secs);
    let transport = Arc::new(ReqwestTransport::new(&cfg.base_url, request_timeout)?);
    let refresher = Arc::new(ReqwestRefresher::new(&cfg.base_url, request_timeout)?);

    let store = Arc::new(match &cfg.store {
        StoreBackendConfig::InMemory => ConfiguredStore::Memory(InMemorySessionStore::new()),
        StoreBackendConfig::File { path } => {
            ConfiguredStore::File(FileSessionStore::load(path).await?)
        }
    });

    let options = GateOptions {
        refresh_timeout: Duration::from_secs(cfg.refresh_timeout_secs),
    };
    let gate = SessionGate::new(Arc::clone(&transport), refresher, Arc::clone(&store), options);

    Ok(BoardClient::new(gate, transport, store))
}
