use std::collections::BTreeSet;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;
use tracing::info;

use super::comments::{comments_of, CommentView};
use super::ratings::{ratings_of, RatingView};
use super::search::newest_first;
use super::{ensure_user, find_recipe, lock_recipe};
use crate::entities::{category, favorite, rating, recipe, recipe_category};
use crate::error::{AppError, AppResult};

#[derive(Clone, Debug)]
pub struct RecipeDraft {
    pub title: String,
    pub description: String,
    pub cooking_steps: String,
    pub cooking_time: i32,
    pub image: String,
    pub ingredients: String,
    pub category_ids: Vec<i32>,
}

/// Fields left as `None` are kept. `category_ids: Some(..)` replaces the
/// whole set of links.
#[derive(Clone, Debug, Default)]
pub struct RecipePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub cooking_steps: Option<String>,
    pub cooking_time: Option<i32>,
    pub image: Option<String>,
    pub ingredients: Option<String>,
    pub category_ids: Option<Vec<i32>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct RecipeDetail {
    #[serde(flatten)]
    pub recipe: recipe::Model,
    pub author: String,
    pub categories: Vec<category::Model>,
    pub comments: Vec<CommentView>,
    pub ratings: Vec<RatingView>,
    /// Always false for anonymous viewers.
    pub is_favorite: bool,
    pub user_rating: Option<i32>,
}

pub async fn get_recipe(db: &DatabaseConnection, recipe_id: i32) -> AppResult<recipe::Model> {
    find_recipe(db, recipe_id).await
}

/// Every recipe, most recent first.
pub async fn list_recipes(db: &DatabaseConnection) -> AppResult<Vec<recipe::Model>> {
    Ok(newest_first(recipe::Entity::find()).all(db).await?)
}

pub async fn recipe_detail(
    db: &DatabaseConnection,
    recipe_id: i32,
    viewer: Option<i32>,
) -> AppResult<RecipeDetail> {
    let recipe = find_recipe(db, recipe_id).await?;
    let author = ensure_user(db, recipe.author_id).await?;
    let categories = categories_of(db, &recipe).await?;
    let comments = comments_of(db, recipe_id).await?;
    let ratings = ratings_of(db, recipe_id).await?;

    let (is_favorite, user_rating) = match viewer {
        Some(user_id) => {
            let favorite = favorite::Entity::find()
                .filter(favorite::Column::RecipeId.eq(recipe_id))
                .filter(favorite::Column::UserId.eq(user_id))
                .one(db)
                .await?;
            let rating = rating::Entity::find()
                .filter(rating::Column::RecipeId.eq(recipe_id))
                .filter(rating::Column::UserId.eq(user_id))
                .one(db)
                .await?;
            (favorite.is_some(), rating.map(|r| r.rating))
        }
        None => (false, None),
    };

    Ok(RecipeDetail {
        recipe,
        author: author.username,
        categories,
        comments,
        ratings,
        is_favorite,
        user_rating,
    })
}

pub async fn categories_of<C>(conn: &C, recipe: &recipe::Model) -> AppResult<Vec<category::Model>>
where
    C: ConnectionTrait,
{
    Ok(recipe
        .find_related(category::Entity)
        .order_by_asc(category::Column::Name)
        .all(conn)
        .await?)
}

pub async fn create_recipe(
    db: &DatabaseConnection,
    author_id: i32,
    draft: RecipeDraft,
) -> AppResult<recipe::Model> {
    ensure_user(db, author_id).await?;

    // Writes first, so the transaction never has to upgrade a read lock.
    let txn = db.begin().await?;
    let now = Utc::now();
    let model = recipe::ActiveModel {
        title: Set(draft.title),
        description: Set(draft.description),
        cooking_steps: Set(draft.cooking_steps),
        cooking_time: Set(draft.cooking_time),
        image: Set(draft.image),
        author_id: Set(author_id),
        ingredients: Set(draft.ingredients),
        created_at: Set(now),
        updated_at: Set(now),
        average_rating: Set(0.0),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    link_categories(&txn, model.id, &draft.category_ids).await?;
    txn.commit().await?;

    info!(recipe_id = model.id, author_id, title = %model.title, "Created recipe");
    Ok(model)
}

/// Only the author may edit a recipe.
pub async fn update_recipe(
    db: &DatabaseConnection,
    recipe_id: i32,
    actor_id: i32,
    patch: RecipePatch,
) -> AppResult<recipe::Model> {
    let txn = db.begin().await?;
    let existing = lock_recipe(&txn, recipe_id).await?;
    ensure_owner(&existing, actor_id)?;

    let mut entry: recipe::ActiveModel = existing.into();
    if let Some(title) = patch.title {
        entry.title = Set(title);
    }
    if let Some(description) = patch.description {
        entry.description = Set(description);
    }
    if let Some(cooking_steps) = patch.cooking_steps {
        entry.cooking_steps = Set(cooking_steps);
    }
    if let Some(cooking_time) = patch.cooking_time {
        entry.cooking_time = Set(cooking_time);
    }
    if let Some(image) = patch.image {
        entry.image = Set(image);
    }
    if let Some(ingredients) = patch.ingredients {
        entry.ingredients = Set(ingredients);
    }
    entry.updated_at = Set(Utc::now());

    let model = entry.update(&txn).await?;

    if let Some(category_ids) = patch.category_ids {
        recipe_category::Entity::delete_many()
            .filter(recipe_category::Column::RecipeId.eq(recipe_id))
            .exec(&txn)
            .await?;
        link_categories(&txn, recipe_id, &category_ids).await?;
    }

    txn.commit().await?;

    info!(recipe_id, actor_id, "Updated recipe");
    Ok(model)
}

/// Only the author may delete a recipe. Comments, ratings, favorites and
/// category links go with it through the foreign key cascade.
pub async fn delete_recipe(db: &DatabaseConnection, recipe_id: i32, actor_id: i32) -> AppResult<()> {
    let txn = db.begin().await?;
    let existing = lock_recipe(&txn, recipe_id).await?;
    ensure_owner(&existing, actor_id)?;

    existing.delete(&txn).await?;
    txn.commit().await?;

    info!(recipe_id, actor_id, "Deleted recipe");
    Ok(())
}

fn ensure_owner(recipe: &recipe::Model, actor_id: i32) -> AppResult<()> {
    if recipe.author_id == actor_id {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "Only the author can modify recipe {}",
            recipe.id
        )))
    }
}

async fn link_categories<C>(conn: &C, recipe_id: i32, category_ids: &[i32]) -> AppResult<()>
where
    C: ConnectionTrait,
{
    let wanted: BTreeSet<i32> = category_ids.iter().copied().collect();
    if wanted.is_empty() {
        return Ok(());
    }

    let found: BTreeSet<i32> = category::Entity::find()
        .filter(category::Column::Id.is_in(wanted.iter().copied()))
        .all(conn)
        .await?
        .into_iter()
        .map(|model| model.id)
        .collect();

    if let Some(missing) = wanted.difference(&found).next() {
        return Err(AppError::not_found("category", *missing));
    }

    let now = Utc::now();
    let links = wanted.into_iter().map(|category_id| recipe_category::ActiveModel {
        recipe_id: Set(recipe_id),
        category_id: Set(category_id),
        created_at: Set(now),
        ..Default::default()
    });

    recipe_category::Entity::insert_many(links).exec(conn).await?;
    Ok(())
}
