pub mod category;
pub mod comment;
pub mod favorite;
pub mod rating;
pub mod recipe;
pub mod recipe_category;
pub mod user;

use sea_orm::{
    sea_query::{Index, IndexCreateStatement, IntoIndexColumn, IntoTableRef},
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema,
};
use tracing::info;

use crate::config::Config;

pub async fn connect(config: &Config) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(config.database_url.clone());
    opt.max_connections(config.db_max_connections)
        .sqlx_logging(false);

    // Every connection to `:memory:` is a separate database, and it lives
    // exactly as long as that connection.
    if config.database_url.contains(":memory:") {
        opt.max_connections(1).min_connections(1);
    }

    Database::connect(opt).await
}

/// Creates every table, index and composite unique key that is not there yet.
pub async fn setup_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    create_table(db, user::Entity).await?;
    create_table(db, category::Entity).await?;
    create_table(db, recipe::Entity).await?;
    create_table(db, recipe_category::Entity).await?;
    create_table(db, comment::Entity).await?;
    create_table(db, rating::Entity).await?;
    create_table(db, favorite::Entity).await?;

    let unique_keys = [
        unique_pair(
            "uq_recipe_categories_recipe_category",
            recipe_category::Entity,
            recipe_category::Column::RecipeId,
            recipe_category::Column::CategoryId,
        ),
        unique_pair(
            "uq_ratings_recipe_user",
            rating::Entity,
            rating::Column::RecipeId,
            rating::Column::UserId,
        ),
        unique_pair(
            "uq_favorites_recipe_user",
            favorite::Entity,
            favorite::Column::RecipeId,
            favorite::Column::UserId,
        ),
    ];

    let backend = db.get_database_backend();
    for key in unique_keys {
        db.execute(backend.build(&key)).await?;
    }

    info!("Database schema is ready");
    Ok(())
}

async fn create_table<E>(db: &DatabaseConnection, _entity: E) -> Result<(), DbErr>
where
    E: EntityTrait,
{
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut table = schema.create_table_from_entity(E::default());
    table.if_not_exists();
    db.execute(backend.build(&table)).await?;

    for mut index in schema.create_index_from_entity(E::default()) {
        index.if_not_exists();
        db.execute(backend.build(&index)).await?;
    }

    Ok(())
}

fn unique_pair<T, A, B>(name: &str, table: T, first: A, second: B) -> IndexCreateStatement
where
    T: IntoTableRef,
    A: IntoIndexColumn,
    B: IntoIndexColumn,
{
    Index::create()
        .if_not_exists()
        .name(name)
        .table(table)
        .col(first)
        .col(second)
        .unique()
        .to_owned()
}
