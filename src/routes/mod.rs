pub mod admin;
pub mod catalog;
pub mod library;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let max_upload_bytes = state.config.max_upload_bytes() as usize;

    Router::new()
        .merge(catalog::router())
        .merge(library::router())
        .merge(admin::router(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
