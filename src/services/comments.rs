use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Serialize;
use tracing::info;

use super::{ensure_user, find_recipe};
use crate::entities::{comment, user};
use crate::error::{AppError, AppResult};

#[derive(Clone, Debug, Serialize)]
pub struct CommentView {
    pub id: i32,
    pub author: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Comments on a recipe, newest first.
pub async fn list_comments(db: &DatabaseConnection, recipe_id: i32) -> AppResult<Vec<CommentView>> {
    find_recipe(db, recipe_id).await?;
    comments_of(db, recipe_id).await
}

pub(crate) async fn comments_of<C>(conn: &C, recipe_id: i32) -> AppResult<Vec<CommentView>>
where
    C: ConnectionTrait,
{
    let rows = comment::Entity::find()
        .filter(comment::Column::RecipeId.eq(recipe_id))
        .order_by_desc(comment::Column::CreatedAt)
        .order_by_desc(comment::Column::Id)
        .find_also_related(user::Entity)
        .all(conn)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(model, author)| CommentView {
            id: model.id,
            author: author.map(|u| u.username).unwrap_or_default(),
            text: model.text,
            created_at: model.created_at,
        })
        .collect())
}

pub async fn add_comment(
    db: &DatabaseConnection,
    recipe_id: i32,
    author_id: i32,
    text: &str,
) -> AppResult<CommentView> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::Validation("Comment text must not be empty".into()));
    }

    find_recipe(db, recipe_id).await?;
    let author = ensure_user(db, author_id).await?;

    let now = Utc::now();
    let model = comment::ActiveModel {
        recipe_id: Set(recipe_id),
        author_id: Set(author_id),
        text: Set(text.to_owned()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(recipe_id, author_id, comment_id = model.id, "Added comment");

    Ok(CommentView {
        id: model.id,
        author: author.username,
        text: model.text,
        created_at: model.created_at,
    })
}
