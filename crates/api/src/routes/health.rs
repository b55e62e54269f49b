//! Liveness and readiness check.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok` when every check passes, `degraded` otherwise.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// RCS template tables the startup bootstrap failed to create.
    pub missing_rcs_tables: Vec<&'static str>,
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = msgdesk_db::health_check(&state.pool).await.is_ok();
    let missing_rcs_tables = if db_healthy {
        msgdesk_db::missing_rcs_tables(&state.pool)
            .await
            .unwrap_or_default()
    } else {
        Vec::new()
    };
    let status = if db_healthy && missing_rcs_tables.is_empty() {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        missing_rcs_tables,
    })
}

/// Mounted at the root, outside `/api`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
