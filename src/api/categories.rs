use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::error::AppResult;
use crate::extractors::{not_blank, AuthUser, ValidJson};
use crate::services::categories::{self, CategoryDraft, CategoryPatch};
use crate::state::AppState;

//ROUTERS
pub fn category_router() -> Router {
    Router::new()
        .route("/categories", get(get_categories).post(create_category))
        .route(
            "/categories/:id",
            get(get_category)
                .patch(patch_category)
                .delete(delete_category),
        )
}

//ROUTES
async fn get_categories(Extension(state): Extension<AppState>) -> AppResult<impl IntoResponse> {
    Ok(Json(categories::list_categories(&state.db).await?))
}

async fn get_category(
    Path(id): Path<i32>,
    Extension(state): Extension<AppState>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(categories::get_category(&state.db, id).await?))
}

async fn create_category(
    _caller: AuthUser,
    Extension(state): Extension<AppState>,
    ValidJson(payload): ValidJson<CreateCategory>,
) -> AppResult<impl IntoResponse> {
    let draft = CategoryDraft {
        name: payload.name.trim().to_owned(),
        description: payload.description,
    };
    let category = categories::create_category(&state.db, draft).await?;

    Ok((StatusCode::CREATED, Json(category)))
}

async fn patch_category(
    _caller: AuthUser,
    Path(id): Path<i32>,
    Extension(state): Extension<AppState>,
    ValidJson(payload): ValidJson<PatchCategory>,
) -> AppResult<impl IntoResponse> {
    let patch = CategoryPatch {
        name: payload.name.map(|name| name.trim().to_owned()),
        description: payload.description,
    };

    Ok(Json(categories::update_category(&state.db, id, patch).await?))
}

async fn delete_category(
    _caller: AuthUser,
    Path(id): Path<i32>,
    Extension(state): Extension<AppState>,
) -> AppResult<impl IntoResponse> {
    categories::delete_category(&state.db, id).await?;

    Ok(Json(json!({
        "message": "Resource deleted successfully"
    })))
}

//Structs
#[derive(Deserialize, Validate, Debug)]
struct CreateCategory {
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    name: String,
    #[serde(default)]
    description: String,
}

#[derive(Deserialize, Validate)]
struct PatchCategory {
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    name: Option<String>,
    description: Option<String>,
}
