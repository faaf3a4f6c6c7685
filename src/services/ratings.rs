use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;
use tracing::info;

use super::{ensure_user, find_recipe, lock_recipe};
use crate::entities::{rating, recipe, user};
use crate::error::{AppError, AppResult};

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RatingOutcome {
    Created,
    Updated,
}

#[derive(Clone, Debug, Serialize)]
pub struct RatingView {
    pub id: i32,
    pub user: String,
    pub rating: i32,
    pub created_at: DateTime<Utc>,
}

pub fn validate_rating(value: i64) -> AppResult<i32> {
    if (MIN_RATING..=MAX_RATING).contains(&value) {
        Ok(value as i32)
    } else {
        Err(AppError::Validation(format!(
            "Rating must be an integer between {MIN_RATING} and {MAX_RATING}, got {value}"
        )))
    }
}

/// Arithmetic mean, 0 for an unrated recipe.
pub fn mean_rating(values: &[i32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let total: i64 = values.iter().map(|&v| i64::from(v)).sum();
    total as f64 / values.len() as f64
}

/// Creates or overwrites `user_id`'s rating of a recipe, then rewrites the
/// recipe's `average_rating` inside the same transaction.
pub async fn record_rating(
    db: &DatabaseConnection,
    recipe_id: i32,
    user_id: i32,
    value: i64,
) -> AppResult<RatingOutcome> {
    let value = validate_rating(value)?;

    let txn = db.begin().await?;
    lock_recipe(&txn, recipe_id).await?;
    ensure_user(&txn, user_id).await?;

    let now = Utc::now();
    let existing = rating::Entity::find()
        .filter(rating::Column::RecipeId.eq(recipe_id))
        .filter(rating::Column::UserId.eq(user_id))
        .one(&txn)
        .await?;

    let outcome = match existing {
        Some(model) => {
            let mut entry: rating::ActiveModel = model.into();
            entry.rating = Set(value);
            entry.updated_at = Set(now);
            entry.update(&txn).await?;
            RatingOutcome::Updated
        }
        None => {
            rating::ActiveModel {
                recipe_id: Set(recipe_id),
                user_id: Set(user_id),
                rating: Set(value),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            RatingOutcome::Created
        }
    };

    let average = refresh_average(&txn, recipe_id).await?;
    txn.commit().await?;

    info!(recipe_id, user_id, value, average, ?outcome, "Recorded rating");
    Ok(outcome)
}

/// Recomputes the cached average from the stored ratings. Needed whenever
/// ratings change without going through `record_rating`.
pub async fn recompute_average(db: &DatabaseConnection, recipe_id: i32) -> AppResult<f64> {
    let txn = db.begin().await?;
    lock_recipe(&txn, recipe_id).await?;
    let average = refresh_average(&txn, recipe_id).await?;
    txn.commit().await?;
    Ok(average)
}

pub(crate) async fn refresh_average<C>(conn: &C, recipe_id: i32) -> AppResult<f64>
where
    C: ConnectionTrait,
{
    let values: Vec<i32> = rating::Entity::find()
        .select_only()
        .column(rating::Column::Rating)
        .filter(rating::Column::RecipeId.eq(recipe_id))
        .into_tuple()
        .all(conn)
        .await?;

    let average = mean_rating(&values);

    recipe::Entity::update_many()
        .col_expr(recipe::Column::AverageRating, Expr::value(average))
        .filter(recipe::Column::Id.eq(recipe_id))
        .exec(conn)
        .await?;

    Ok(average)
}

pub async fn get_user_rating(
    db: &DatabaseConnection,
    recipe_id: i32,
    user_id: i32,
) -> AppResult<Option<i32>> {
    find_recipe(db, recipe_id).await?;

    let entry = rating::Entity::find()
        .filter(rating::Column::RecipeId.eq(recipe_id))
        .filter(rating::Column::UserId.eq(user_id))
        .one(db)
        .await?;

    Ok(entry.map(|model| model.rating))
}

pub async fn list_ratings(db: &DatabaseConnection, recipe_id: i32) -> AppResult<Vec<RatingView>> {
    find_recipe(db, recipe_id).await?;
    ratings_of(db, recipe_id).await
}

pub(crate) async fn ratings_of<C>(conn: &C, recipe_id: i32) -> AppResult<Vec<RatingView>>
where
    C: ConnectionTrait,
{
    let rows = rating::Entity::find()
        .filter(rating::Column::RecipeId.eq(recipe_id))
        .order_by_desc(rating::Column::CreatedAt)
        .find_also_related(user::Entity)
        .all(conn)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(model, rater)| RatingView {
            id: model.id,
            user: rater.map(|u| u.username).unwrap_or_default(),
            rating: model.rating,
            created_at: model.created_at,
        })
        .collect())
}
