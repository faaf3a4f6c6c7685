use axum::{extract::Extension, response::IntoResponse, routing::get, Json, Router};
use serde_json::json;

use crate::error::AppResult;
use crate::extractors::AuthUser;
use crate::services::users;
use crate::state::AppState;

pub fn profile_router() -> Router {
    Router::new().route("/profile", get(get_profile))
}

//yes, just a username.
async fn get_profile(
    caller: AuthUser,
    Extension(state): Extension<AppState>,
) -> AppResult<impl IntoResponse> {
    let user = users::get_user(&state.db, caller.user_id).await?;

    Ok(Json(json!({
        "id": user.id,
        "username": user.username,
    })))
}
