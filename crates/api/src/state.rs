use std::sync::Arc;

use msgdesk_core::channels::ChannelRates;
use msgdesk_core::types::DbId;
use msgdesk_db::repositories::ClientRepo;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: the pool is reference counted and the config is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: msgdesk_db::DbPool,
    /// Server configuration (JWT settings, default rates).
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// The rates a client is billed at: its plan's, or the platform defaults.
    pub async fn rates_for_client(&self, client_id: DbId) -> Result<ChannelRates, sqlx::Error> {
        Ok(ClientRepo::plan_rates(&self.pool, client_id)
            .await?
            .unwrap_or(self.config.default_rates))
    }
}
