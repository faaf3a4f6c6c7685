use crate::entities::user::Entity as UserEntity;
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Resolves a bearer token, when one is sent, into `Claims` in the request
/// extensions. Requests without a token pass through untouched; whether a
/// route needs a caller is decided by the `AuthUser` extractor.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = match req.headers().get(AUTHORIZATION) {
        Some(header) => header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(AppError::Unauthorized)?
            .to_owned(),
        None => return Ok(next.run(req).await),
    };

    let claims = validate_token(&state.db, &state.config.secret, &token).await?;
    debug!(user_id = claims.user_id, "Authenticated request");

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i32,
    pub exp: usize,
}

pub fn generate_token(user_id: i32, secret: &str, ttl_hours: i64) -> Result<String, AuthError> {
    let exp = Utc::now()
        .checked_add_signed(Duration::hours(ttl_hours))
        .ok_or(AuthError::GenerationFail)?
        .timestamp() as usize;

    let claims = Claims { user_id, exp };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AuthError::GenerationFail)
}

pub fn decode_claims(secret: &str, token: &str) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| AuthError::InvalidToken)
}

/// Decodes the token and checks that its user still exists.
pub async fn validate_token(
    db: &DatabaseConnection,
    secret: &str,
    token: &str,
) -> Result<Claims, AuthError> {
    let claims = decode_claims(secret, token)?;

    match UserEntity::find_by_id(claims.user_id).one(db).await {
        Ok(Some(_)) => Ok(claims),
        Ok(None) => Err(AuthError::InvalidUser),
        Err(err) => Err(AuthError::Internal(err.to_string())),
    }
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid user id")]
    InvalidUser,
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error("Failed to generate token")]
    GenerationFail,
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidUser | AuthError::InvalidToken => AppError::Unauthorized,
            AuthError::GenerationFail | AuthError::Internal(_) => {
                AppError::Internal(err.to_string())
            }
        }
    }
}
