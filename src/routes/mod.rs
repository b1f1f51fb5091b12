//! Router assembly.

mod auth;
mod common;
mod pokemon;

pub use auth::auth_routes;
pub use common::common_routes;
pub use pokemon::pokemon_routes;

use crate::state::AppState;
use axum::{extract::DefaultBodyLimit, Router};
use tower_http::{limit::RequestBodyLimitLayer, services::ServeDir, trace::TraceLayer};

/// Full application: catalog, accounts, operational routes, and uploaded images
/// served from the image store's public prefix.
pub fn app(state: AppState, max_upload_bytes: usize) -> Router {
    let images = ServeDir::new(state.images.root());
    let prefix = state.images.public_prefix().to_string();
    Router::new()
        .merge(common_routes())
        .merge(auth_routes())
        .merge(pokemon_routes())
        .nest_service(&prefix, images)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
