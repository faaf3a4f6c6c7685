use axum::{extract::Extension, http::StatusCode, response::IntoResponse, routing::post, Json, Router};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::error::AppResult;
use crate::extractors::ValidJson;
use crate::middleware::auth::generate_token;
use crate::services::users;
use crate::state::AppState;

pub fn auth_router() -> Router {
    Router::new()
        .route("/register", post(register_user))
        .route("/login", post(login))
}

async fn register_user(
    Extension(state): Extension<AppState>,
    ValidJson(payload): ValidJson<CreateUser>,
) -> AppResult<impl IntoResponse> {
    let user = users::register(&state.db, &payload.username, &payload.password).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "id": user.id,
            "username": user.username,
        })),
    ))
}

async fn login(
    Extension(state): Extension<AppState>,
    ValidJson(payload): ValidJson<UserLogin>,
) -> AppResult<impl IntoResponse> {
    let user = users::authenticate(&state.db, &payload.username, &payload.password).await?;
    let token = generate_token(user.id, &state.config.secret, state.config.token_ttl_hours)?;

    Ok(Json(json!({ "token": token })))
}

//structs
#[derive(Deserialize, Validate, Debug)]
struct CreateUser {
    #[validate(regex(path = *USERNAME_REGEX, message = "3-32 letters, digits or underscores"))]
    username: String,
    #[validate(length(min = 8, max = 128))]
    password: String,
}

#[derive(Deserialize, Validate)]
struct UserLogin {
    username: String,
    password: String,
}

static USERNAME_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_]{3,32}$").unwrap());
