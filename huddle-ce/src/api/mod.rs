//! REST API for the coordination engine

pub mod handlers;
pub mod sse;

use crate::state::AppState;
use axum::routing::{delete, get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/venues", get(handlers::list_venues))
        .route("/venues/:venue_id", get(handlers::venue_detail))
        .route("/users/:user_id", get(handlers::user_profile))
        .route("/interests", post(handlers::toggle_interest))
        .route("/recommendations", get(handlers::recommendations))
        .route("/action-items", get(handlers::list_action_items))
        .route("/action-items/archived", get(handlers::list_archived))
        .route("/action-items/expire", post(handlers::expire_stale))
        .route("/action-items/:item_id", delete(handlers::delete_archived))
        .route("/action-items/:item_id/complete", post(handlers::complete_item))
        .route("/action-items/:item_id/dismiss", post(handlers::dismiss_item))
        .route("/events", get(sse::event_stream))
        .layer(TraceLayer::new_for_http())
        // Open CORS: the engine sits behind the deployment's own gateway.
        .layer(CorsLayer::permissive())
        .with_state(state)
}
