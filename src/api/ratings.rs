use axum::{
    extract::{Extension, Path},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::error::AppResult;
use crate::extractors::{AuthUser, ValidJson};
use crate::services::{ratings, recipes};
use crate::state::AppState;

pub fn rating_router() -> Router {
    Router::new()
        .route("/recipes/:id/ratings", get(get_ratings))
        .route("/recipes/:id/rate", post(rate_recipe))
        .route("/recipes/:id/rating", get(get_my_rating))
}

async fn get_ratings(
    Path(id): Path<i32>,
    Extension(state): Extension<AppState>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(ratings::list_ratings(&state.db, id).await?))
}

async fn rate_recipe(
    caller: AuthUser,
    Path(id): Path<i32>,
    Extension(state): Extension<AppState>,
    ValidJson(payload): ValidJson<RatePayload>,
) -> AppResult<impl IntoResponse> {
    let outcome = ratings::record_rating(&state.db, id, caller.user_id, payload.rating).await?;
    let recipe = recipes::get_recipe(&state.db, id).await?;

    Ok(Json(json!({
        "status": outcome,
        "average_rating": recipe.average_rating,
    })))
}

async fn get_my_rating(
    caller: AuthUser,
    Path(id): Path<i32>,
    Extension(state): Extension<AppState>,
) -> AppResult<impl IntoResponse> {
    let rating = ratings::get_user_rating(&state.db, id, caller.user_id).await?;

    Ok(Json(json!({ "rating": rating })))
}

// An i64 field: floats and strings fail to deserialize, they are never rounded.
#[derive(Deserialize, Validate)]
struct RatePayload {
    #[validate(range(min = 1, max = 5))]
    rating: i64,
}
