use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryOrder, Set};
use tracing::info;

use crate::entities::category;
use crate::error::{AppError, AppResult};

#[derive(Clone, Debug)]
pub struct CategoryDraft {
    pub name: String,
    pub description: String,
}

#[derive(Clone, Debug, Default)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub description: Option<String>,
}

pub async fn list_categories(db: &DatabaseConnection) -> AppResult<Vec<category::Model>> {
    Ok(category::Entity::find()
        .order_by_asc(category::Column::Name)
        .order_by_asc(category::Column::Id)
        .all(db)
        .await?)
}

pub async fn get_category(db: &DatabaseConnection, id: i32) -> AppResult<category::Model> {
    category::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found("category", id))
}

pub async fn create_category(
    db: &DatabaseConnection,
    draft: CategoryDraft,
) -> AppResult<category::Model> {
    let model = category::ActiveModel {
        name: Set(draft.name),
        description: Set(draft.description),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(category_id = model.id, name = %model.name, "Created category");
    Ok(model)
}

pub async fn update_category(
    db: &DatabaseConnection,
    id: i32,
    patch: CategoryPatch,
) -> AppResult<category::Model> {
    let existing = get_category(db, id).await?;

    if patch.name.is_none() && patch.description.is_none() {
        return Ok(existing);
    }

    let mut entry: category::ActiveModel = existing.into();
    if let Some(name) = patch.name {
        entry.name = Set(name);
    }
    if let Some(description) = patch.description {
        entry.description = Set(description);
    }

    let model = entry.update(db).await?;

    info!(category_id = id, "Updated category");
    Ok(model)
}

/// Deleting a category drops its recipe links through the foreign key
/// cascade; the recipes themselves stay.
pub async fn delete_category(db: &DatabaseConnection, id: i32) -> AppResult<()> {
    let existing = get_category(db, id).await?;
    existing.delete(db).await?;

    info!(category_id = id, "Deleted category");
    Ok(())
}
