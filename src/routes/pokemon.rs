//! Catalog routes.

use crate::handlers::pokemon::{create, delete, get as read, list, list_for_nav, update};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn pokemon_routes() -> Router<AppState> {
    Router::new()
        .route("/pokemon", get(list).post(create))
        .route("/pokemon/list-for-nav", get(list_for_nav))
        .route("/pokemon/:id", get(read).put(update).delete(delete))
}
