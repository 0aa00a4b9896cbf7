//! Health check endpoint

use axum::Json;
use axum::extract::State;

use crate::state::AppState;

pub async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "tradedesk-cloud",
        "version": env!("CARGO_PKG_VERSION"),
        "relay_connections": state.relay.connection_count(),
    }))
}
