//! Recipe search: an optional text query ORed across title, description and
//! ingredients, ANDed with an exact category name and a minimum average
//! rating. Category and rating narrow the rows in SQL; the text query is
//! matched afterwards with full Unicode case folding. A search with no
//! usable filter at all returns a random handful of recipes instead
//! ("discovery").

use rand::seq::SliceRandom;
use sea_orm::{
    sea_query::{Expr, Query},
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Select,
};
use serde::Deserialize;
use tracing::debug;

use crate::entities::{category, recipe, recipe_category};
use crate::error::AppResult;

/// Raw query-string parameters, exactly as the client sent them.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub category: Option<String>,
    pub min_rating: Option<String>,
}

/// Parameters after normalization: blanks dropped, `min_rating` parsed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecipeFilter {
    pub query: Option<String>,
    pub category: Option<String>,
    pub min_rating: Option<f64>,
}

impl RecipeFilter {
    pub fn from_params(params: &SearchParams) -> Self {
        RecipeFilter {
            query: non_blank(params.q.as_deref()),
            category: non_blank(params.category.as_deref()),
            // Unparseable means "no filter", never an error.
            min_rating: params
                .min_rating
                .as_deref()
                .and_then(|raw| raw.trim().parse::<f64>().ok())
                .filter(|value| value.is_finite()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.query.is_none() && self.category.is_none() && self.min_rating.is_none()
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

pub async fn search_recipes(
    db: &DatabaseConnection,
    params: &SearchParams,
    discovery_size: usize,
) -> AppResult<Vec<recipe::Model>> {
    let filter = RecipeFilter::from_params(params);

    if filter.is_empty() {
        let all = newest_first(recipe::Entity::find()).all(db).await?;
        debug!(total = all.len(), discovery_size, "Discovery search");
        return Ok(discovery_sample(all, discovery_size));
    }

    debug!(?filter, "Filtered search");
    let mut found = filtered(&filter).all(db).await?;

    // SQLite's lower() only folds ASCII, so text matching happens here.
    if let Some(query) = &filter.query {
        let needle = query.to_lowercase();
        found.retain(|recipe| matches_text(recipe, &needle));
    }

    Ok(found)
}

/// Up to `size` recipes drawn without replacement.
pub fn discovery_sample(mut recipes: Vec<recipe::Model>, size: usize) -> Vec<recipe::Model> {
    recipes.shuffle(&mut rand::thread_rng());
    recipes.truncate(size);
    recipes
}

pub(crate) fn newest_first(select: Select<recipe::Entity>) -> Select<recipe::Entity> {
    select
        .order_by_desc(recipe::Column::CreatedAt)
        .order_by_desc(recipe::Column::Id)
}

/// Category and rating conditions; the text query is applied by the caller.
fn filtered(filter: &RecipeFilter) -> Select<recipe::Entity> {
    let mut select = recipe::Entity::find();

    if let Some(name) = &filter.category {
        let linked = Query::select()
            .column((recipe_category::Entity, recipe_category::Column::RecipeId))
            .from(recipe_category::Entity)
            .inner_join(
                category::Entity,
                Expr::col((category::Entity, category::Column::Id))
                    .equals((recipe_category::Entity, recipe_category::Column::CategoryId)),
            )
            .and_where(Expr::col((category::Entity, category::Column::Name)).eq(name.as_str()))
            .to_owned();
        select = select.filter(recipe::Column::Id.in_subquery(linked));
    }

    if let Some(min_rating) = filter.min_rating {
        select = select.filter(recipe::Column::AverageRating.gte(min_rating));
    }

    newest_first(select)
}

/// `needle` must already be lowercased.
fn matches_text(recipe: &recipe::Model, needle: &str) -> bool {
    [&recipe.title, &recipe.description, &recipe.ingredients]
        .into_iter()
        .any(|field| field.to_lowercase().contains(needle))
}
