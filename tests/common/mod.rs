#![allow(dead_code)]

use chrono::Utc;
use rust_recipes::config::Config;
use rust_recipes::entities::{category, connect, setup_schema, user};
use rust_recipes::services::categories::{self, CategoryDraft};
use rust_recipes::services::recipes::{self, RecipeDraft};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use tempfile::TempDir;

pub const SECRET: &str = "test-secret";

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_owned(),
        secret: SECRET.to_owned(),
        bind_addr: "127.0.0.1:0".to_owned(),
        db_max_connections: 1,
        token_ttl_hours: 1,
        discovery_sample_size: 5,
    }
}

/// A fresh in-memory database with the full schema.
pub async fn test_db() -> DatabaseConnection {
    let db = connect(&test_config())
        .await
        .expect("Failed to open in-memory database");
    setup_schema(&db).await.expect("Failed to create schema");
    db
}

/// A database file in a fresh temp dir, served by a pool of `connections`.
/// Keep the `TempDir` alive for as long as the connection is used.
pub async fn file_db(connections: u32) -> (TempDir, DatabaseConnection) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = Config {
        database_url: format!(
            "sqlite://{}?mode=rwc",
            dir.path().join("recipes.db").display()
        ),
        db_max_connections: connections,
        ..test_config()
    };

    let db = connect(&config)
        .await
        .expect("Failed to open database file");
    setup_schema(&db).await.expect("Failed to create schema");
    (dir, db)
}

/// Inserts a user directly; the password is not a real hash.
pub async fn create_user(db: &DatabaseConnection, username: &str) -> i32 {
    user::ActiveModel {
        username: Set(username.to_owned()),
        password: Set("not-a-hash".to_owned()),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert user")
    .id
}

pub async fn create_category(db: &DatabaseConnection, name: &str) -> category::Model {
    categories::create_category(
        db,
        CategoryDraft {
            name: name.to_owned(),
            description: String::new(),
        },
    )
    .await
    .expect("Failed to create category")
}

pub fn draft(title: &str, description: &str, ingredients: &str) -> RecipeDraft {
    RecipeDraft {
        title: title.to_owned(),
        description: description.to_owned(),
        cooking_steps: "Cook it.".to_owned(),
        cooking_time: 30,
        image: String::new(),
        ingredients: ingredients.to_owned(),
        category_ids: Vec::new(),
    }
}

pub async fn create_recipe(
    db: &DatabaseConnection,
    author_id: i32,
    title: &str,
    description: &str,
    ingredients: &str,
) -> i32 {
    recipes::create_recipe(db, author_id, draft(title, description, ingredients))
        .await
        .expect("Failed to create recipe")
        .id
}
