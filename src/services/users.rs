use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tracing::info;

use super::ensure_user;
use crate::entities::user;
use crate::error::{AppError, AppResult};

pub async fn register(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> AppResult<user::Model> {
    let password_hash =
        hash_password(password).map_err(|err| AppError::Internal(err.to_string()))?;

    let model = user::ActiveModel {
        username: Set(username.to_owned()),
        password: Set(password_hash),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(|err| match AppError::from(err) {
        AppError::Constraint(_) => AppError::Conflict("Username already exists".into()),
        other => other,
    })?;

    info!(user_id = model.id, username = %model.username, "Registered user");
    Ok(model)
}

/// Same error for an unknown name and a wrong password.
pub async fn authenticate(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> AppResult<user::Model> {
    let model = user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await?
        .ok_or(AppError::Unauthorized)?;

    model
        .check_hash(password)
        .map_err(|_| AppError::Unauthorized)?;

    Ok(model)
}

pub async fn get_user(db: &DatabaseConnection, user_id: i32) -> AppResult<user::Model> {
    ensure_user(db, user_id).await
}

fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)?
        .to_string();

    Ok(password_hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashed_password_verifies() {
        let hash = hash_password("Muzion15").unwrap();
        let model = user::Model {
            id: 1,
            username: "user".into(),
            password: hash,
            created_at: Utc::now(),
        };

        assert!(model.check_hash("Muzion15").is_ok());
        assert!(model.check_hash("muzion15").is_err());
    }
}
