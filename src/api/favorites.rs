use axum::{
    extract::{Extension, Path},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;

use crate::error::AppResult;
use crate::extractors::AuthUser;
use crate::services::favorites;
use crate::state::AppState;

pub fn favorite_router() -> Router {
    Router::new()
        .route("/favorites", get(get_favorites))
        .route(
            "/recipes/:id/favorite",
            get(get_favorite_state).post(toggle_favorite),
        )
}

async fn get_favorites(
    caller: AuthUser,
    Extension(state): Extension<AppState>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(favorites::list_favorites(&state.db, caller.user_id).await?))
}

async fn get_favorite_state(
    caller: AuthUser,
    Path(id): Path<i32>,
    Extension(state): Extension<AppState>,
) -> AppResult<impl IntoResponse> {
    let is_favorite = favorites::is_favorite(&state.db, id, caller.user_id).await?;

    Ok(Json(json!({ "is_favorite": is_favorite })))
}

async fn toggle_favorite(
    caller: AuthUser,
    Path(id): Path<i32>,
    Extension(state): Extension<AppState>,
) -> AppResult<impl IntoResponse> {
    let toggle = favorites::toggle_favorite(&state.db, id, caller.user_id).await?;

    Ok(Json(json!({ "status": toggle })))
}
