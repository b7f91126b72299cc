pub mod backups;
pub mod health;

use crate::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::Router;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn create_router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_archive_mb * 1024 * 1024;

    Router::new()
        .nest("/api/backups", backups::router(state.clone()))
        .route("/api/health", axum::routing::get(health::health))
        .route("/ws", axum::routing::get(crate::ws::ui::ws_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
