//! Business operations behind the HTTP handlers. Every function takes the
//! connection explicitly and maps storage failures into `AppError`.

pub mod categories;
pub mod comments;
pub mod favorites;
pub mod ratings;
pub mod recipes;
pub mod search;
pub mod users;

use sea_orm::{sea_query::Expr, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};

use crate::entities::{recipe, user};
use crate::error::{AppError, AppResult};

pub(crate) async fn find_recipe<C>(conn: &C, recipe_id: i32) -> AppResult<recipe::Model>
where
    C: ConnectionTrait,
{
    recipe::Entity::find_by_id(recipe_id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::not_found("recipe", recipe_id))
}

/// Must be the first statement of the transaction. The no-op `UPDATE` takes
/// the SQLite write lock up front, so concurrent writers for a recipe wait
/// on `busy_timeout` and then run one after another.
pub(crate) async fn lock_recipe<C>(conn: &C, recipe_id: i32) -> AppResult<recipe::Model>
where
    C: ConnectionTrait,
{
    let touched = recipe::Entity::update_many()
        .col_expr(
            recipe::Column::AverageRating,
            Expr::col(recipe::Column::AverageRating).into(),
        )
        .filter(recipe::Column::Id.eq(recipe_id))
        .exec(conn)
        .await?;

    if touched.rows_affected == 0 {
        return Err(AppError::not_found("recipe", recipe_id));
    }

    find_recipe(conn, recipe_id).await
}

pub(crate) async fn ensure_user<C>(conn: &C, user_id: i32) -> AppResult<user::Model>
where
    C: ConnectionTrait,
{
    user::Entity::find_by_id(user_id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::not_found("user", user_id))
}
