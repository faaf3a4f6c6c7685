use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::error::AppResult;
use crate::extractors::{not_blank, AuthUser, MaybeAuthUser, ValidJson};
use crate::services::recipes::{self, RecipeDraft, RecipePatch};
use crate::services::search::{search_recipes, SearchParams};
use crate::state::AppState;

//ROUTERS
pub fn recipe_router() -> Router {
    Router::new()
        .route("/recipes", get(get_recipes).post(create_recipe))
        .route("/recipes/search", get(search))
        .route(
            "/recipes/:id",
            get(get_recipe).patch(patch_recipe).delete(delete_recipe),
        )
}

//ROUTES
async fn get_recipes(Extension(state): Extension<AppState>) -> AppResult<impl IntoResponse> {
    Ok(Json(recipes::list_recipes(&state.db).await?))
}

/// `?q=&category=&min_rating=`; no usable filter means a random sample.
async fn search(
    Query(params): Query<SearchParams>,
    Extension(state): Extension<AppState>,
) -> AppResult<impl IntoResponse> {
    let found = search_recipes(&state.db, &params, state.config.discovery_sample_size).await?;
    Ok(Json(found))
}

async fn get_recipe(
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(id): Path<i32>,
    Extension(state): Extension<AppState>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(recipes::recipe_detail(&state.db, id, viewer).await?))
}

async fn create_recipe(
    caller: AuthUser,
    Extension(state): Extension<AppState>,
    ValidJson(payload): ValidJson<CreateRecipe>,
) -> AppResult<impl IntoResponse> {
    let draft = RecipeDraft {
        title: payload.title.trim().to_owned(),
        description: payload.description,
        cooking_steps: payload.cooking_steps,
        cooking_time: payload.cooking_time,
        image: payload.image,
        ingredients: payload.ingredients,
        category_ids: payload.category_ids,
    };
    let recipe = recipes::create_recipe(&state.db, caller.user_id, draft).await?;

    Ok((StatusCode::CREATED, Json(recipe)))
}

async fn patch_recipe(
    caller: AuthUser,
    Path(id): Path<i32>,
    Extension(state): Extension<AppState>,
    ValidJson(payload): ValidJson<PatchRecipe>,
) -> AppResult<impl IntoResponse> {
    let patch = RecipePatch {
        title: payload.title.map(|title| title.trim().to_owned()),
        description: payload.description,
        cooking_steps: payload.cooking_steps,
        cooking_time: payload.cooking_time,
        image: payload.image,
        ingredients: payload.ingredients,
        category_ids: payload.category_ids,
    };

    Ok(Json(
        recipes::update_recipe(&state.db, id, caller.user_id, patch).await?,
    ))
}

async fn delete_recipe(
    caller: AuthUser,
    Path(id): Path<i32>,
    Extension(state): Extension<AppState>,
) -> AppResult<impl IntoResponse> {
    recipes::delete_recipe(&state.db, id, caller.user_id).await?;

    Ok(Json(json!({
        "message": "Resource deleted successfully"
    })))
}

//Structs
#[derive(Deserialize, Validate, Debug)]
struct CreateRecipe {
    #[validate(length(min = 1, max = 200), custom(function = "not_blank"))]
    title: String,
    #[validate(length(min = 1))]
    description: String,
    #[validate(length(min = 1))]
    cooking_steps: String,
    #[validate(range(min = 0))]
    cooking_time: i32,
    #[serde(default)]
    image: String,
    #[validate(length(min = 1))]
    ingredients: String,
    #[serde(default)]
    category_ids: Vec<i32>,
}

#[derive(Deserialize, Validate)]
struct PatchRecipe {
    #[validate(length(min = 1, max = 200), custom(function = "not_blank"))]
    title: Option<String>,
    #[validate(length(min = 1))]
    description: Option<String>,
    #[validate(length(min = 1))]
    cooking_steps: Option<String>,
    #[validate(range(min = 0))]
    cooking_time: Option<i32>,
    image: Option<String>,
    #[validate(length(min = 1))]
    ingredients: Option<String>,
    category_ids: Option<Vec<i32>>,
}
