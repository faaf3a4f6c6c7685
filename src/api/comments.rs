use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use validator::Validate;

use crate::error::AppResult;
use crate::extractors::{AuthUser, ValidJson};
use crate::services::comments;
use crate::state::AppState;

pub fn comment_router() -> Router {
    Router::new().route(
        "/recipes/:id/comments",
        get(get_comments).post(add_comment),
    )
}

async fn get_comments(
    Path(id): Path<i32>,
    Extension(state): Extension<AppState>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(comments::list_comments(&state.db, id).await?))
}

async fn add_comment(
    caller: AuthUser,
    Path(id): Path<i32>,
    Extension(state): Extension<AppState>,
    ValidJson(payload): ValidJson<CreateComment>,
) -> AppResult<impl IntoResponse> {
    let comment = comments::add_comment(&state.db, id, caller.user_id, &payload.text).await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

#[derive(Deserialize, Validate)]
struct CreateComment {
    #[validate(length(min = 1, max = 5000))]
    text: String,
}
