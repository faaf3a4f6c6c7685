use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    // Not unique: two categories may share a name, search matches both.
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::recipe_category::Entity")]
    RecipeCategory,
}

impl Related<super::recipe_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RecipeCategory.def()
    }
}

impl Related<super::recipe::Entity> for Entity {
    fn to() -> RelationDef {
        super::recipe_category::Relation::Recipe.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::recipe_category::Relation::Category.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
