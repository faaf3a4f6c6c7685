use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;
use tracing::info;

use super::{ensure_user, find_recipe, lock_recipe};
use crate::entities::{favorite, recipe};
use crate::error::AppResult;

/// Result of flipping a favorite. Serialized as `"added"` / `"removed"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FavoriteToggle {
    Added,
    Removed,
}

#[derive(Clone, Debug, Serialize)]
pub struct FavoriteView {
    pub id: i32,
    pub recipe: recipe::Model,
    pub created_at: DateTime<Utc>,
}

/// Strict toggle: absent becomes `Added`, present becomes `Removed`.
///
/// The check and the write happen in one transaction holding the recipe row
/// lock, so two concurrent toggles never both see "absent". The unique key on
/// (recipe_id, user_id) stays as the last line: if it ever fires, the caller
/// gets `AppError::Constraint`, a 500.
pub async fn toggle_favorite(
    db: &DatabaseConnection,
    recipe_id: i32,
    user_id: i32,
) -> AppResult<FavoriteToggle> {
    let txn = db.begin().await?;
    lock_recipe(&txn, recipe_id).await?;
    ensure_user(&txn, user_id).await?;

    let existing = favorite::Entity::find()
        .filter(favorite::Column::RecipeId.eq(recipe_id))
        .filter(favorite::Column::UserId.eq(user_id))
        .one(&txn)
        .await?;

    let toggle = match existing {
        Some(model) => {
            model.delete(&txn).await?;
            FavoriteToggle::Removed
        }
        None => {
            favorite::ActiveModel {
                recipe_id: Set(recipe_id),
                user_id: Set(user_id),
                created_at: Set(Utc::now()),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            FavoriteToggle::Added
        }
    };

    txn.commit().await?;

    info!(recipe_id, user_id, ?toggle, "Toggled favorite");
    Ok(toggle)
}

pub async fn is_favorite(db: &DatabaseConnection, recipe_id: i32, user_id: i32) -> AppResult<bool> {
    find_recipe(db, recipe_id).await?;

    let count = favorite::Entity::find()
        .filter(favorite::Column::RecipeId.eq(recipe_id))
        .filter(favorite::Column::UserId.eq(user_id))
        .count(db)
        .await?;

    Ok(count > 0)
}

/// The user's favorites, most recently added first.
pub async fn list_favorites(db: &DatabaseConnection, user_id: i32) -> AppResult<Vec<FavoriteView>> {
    let rows = favorite::Entity::find()
        .filter(favorite::Column::UserId.eq(user_id))
        .order_by_desc(favorite::Column::CreatedAt)
        .order_by_desc(favorite::Column::Id)
        .find_also_related(recipe::Entity)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(model, recipe)| {
            recipe.map(|recipe| FavoriteView {
                id: model.id,
                recipe,
                created_at: model.created_at,
            })
        })
        .collect())
}
