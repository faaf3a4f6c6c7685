pub mod auth;
pub mod categories;
pub mod comments;
pub mod favorites;
pub mod profile;
pub mod ratings;
pub mod recipes;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    Extension, Router,
};
use tower_http::trace::TraceLayer;

use crate::middleware::{auth::auth_middleware, logging::logging_middleware};
use crate::state::AppState;

use auth::auth_router;
use categories::category_router;
use comments::comment_router;
use favorites::favorite_router;
use profile::profile_router;
use ratings::rating_router;
use recipes::recipe_router;

pub fn create_api_router(state: AppState) -> Router {
    let api = Router::new()
        .merge(auth_router())
        .merge(category_router())
        .merge(recipe_router())
        .merge(comment_router())
        .merge(rating_router())
        .merge(favorite_router())
        .merge(profile_router());

    Router::new()
        .nest("/api", api)
        .layer(from_fn_with_state(state.clone(), auth_middleware))
        .layer(Extension(state))
        .layer(from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
}
