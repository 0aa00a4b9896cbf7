//! API routes for tradedesk-cloud

pub mod chat;
pub mod crew;
pub mod health;
pub mod notifications;
pub mod organization;
pub mod realtime;
pub mod realtime_ws;

use axum::routing::{get, post};
use axum::{Router, middleware};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::session_auth_middleware;
use crate::state::AppState;

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    // Session-authenticated REST API
    let api = Router::new()
        .route("/api/realtime/chat/token", post(realtime::issue_chat_token))
        .route(
            "/api/realtime/notifications/token",
            post(realtime::issue_notifications_token),
        )
        .route(
            "/api/organization/subscription",
            get(organization::get_subscription),
        )
        .route(
            "/api/organization/entitlements",
            get(organization::get_entitlements),
        )
        .route("/api/crew", get(crew::list_crew).post(crew::add_crew))
        .route(
            "/api/chat/channels/{channel_id}/messages",
            get(chat::list_channel_messages).post(chat::post_channel_message),
        )
        .route("/api/chat/direct/{user_id}", post(chat::post_direct_message))
        .route(
            "/api/admin/notifications",
            post(notifications::publish_notification),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_auth_middleware,
        ));

    // Relay sockets authenticate in-band with a relay token
    let relay = Router::new()
        .route("/ws/chat", get(realtime_ws::handle_chat_ws))
        .route("/ws/notifications", get(realtime_ws::handle_notifications_ws));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(api)
        .merge(relay)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
