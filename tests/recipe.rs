mod common;

use rust_recipes::entities::{comment, favorite, rating, recipe, recipe_category, user};
use rust_recipes::error::AppError;
use rust_recipes::services::categories::{self, CategoryPatch};
use rust_recipes::services::comments::{add_comment, list_comments};
use rust_recipes::services::favorites::toggle_favorite;
use rust_recipes::services::ratings::record_rating;
use rust_recipes::services::recipes::{
    self, create_recipe as create_full_recipe, recipe_detail, RecipePatch,
};
use sea_orm::{EntityTrait, PaginatorTrait};

use common::{create_category, create_recipe, create_user, draft, test_db};

#[tokio::test]
async fn test_create_with_categories() {
    let db = test_db().await;
    let author = create_user(&db, "chef").await;
    let soups = create_category(&db, "Soups").await;
    let russian = create_category(&db, "Russian").await;

    let mut new_recipe = draft("Borscht", "Beet soup", "beets, cabbage");
    new_recipe.category_ids = vec![soups.id, russian.id, soups.id];
    let created = create_full_recipe(&db, author, new_recipe).await.unwrap();

    assert_eq!(created.average_rating, 0.0);
    assert_eq!(created.author_id, author);

    let detail = recipe_detail(&db, created.id, None).await.unwrap();
    let names: Vec<&str> = detail.categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Russian", "Soups"]);
    assert_eq!(detail.author, "chef");
    assert_eq!(detail.user_rating, None);
    assert_eq!(recipe_category::Entity::find().count(&db).await.unwrap(), 2);
}

#[tokio::test]
async fn test_create_with_unknown_category_rolls_back() {
    let db = test_db().await;
    let author = create_user(&db, "chef").await;

    let mut new_recipe = draft("Borscht", "Beet soup", "beets");
    new_recipe.category_ids = vec![42];

    assert!(matches!(
        create_full_recipe(&db, author, new_recipe).await,
        Err(AppError::NotFound(_))
    ));
    assert!(recipes::list_recipes(&db).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_only_author_may_update() {
    let db = test_db().await;
    let author = create_user(&db, "chef").await;
    let stranger = create_user(&db, "stranger").await;
    let baking = create_category(&db, "Baking").await;
    let recipe_id = create_recipe(&db, author, "Bread", "Loaf", "flour").await;

    let patch = RecipePatch {
        title: Some("Rye bread".to_owned()),
        category_ids: Some(vec![baking.id]),
        ..Default::default()
    };

    assert!(matches!(
        recipes::update_recipe(&db, recipe_id, stranger, patch.clone()).await,
        Err(AppError::Forbidden(_))
    ));
    assert_eq!(recipes::get_recipe(&db, recipe_id).await.unwrap().title, "Bread");

    let updated = recipes::update_recipe(&db, recipe_id, author, patch)
        .await
        .unwrap();
    assert_eq!(updated.title, "Rye bread");
    assert_eq!(updated.ingredients, "flour");
    assert!(updated.updated_at >= updated.created_at);

    let detail = recipe_detail(&db, recipe_id, None).await.unwrap();
    assert_eq!(detail.categories.len(), 1);

    // Empty list clears the links.
    recipes::update_recipe(
        &db,
        recipe_id,
        author,
        RecipePatch {
            category_ids: Some(Vec::new()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(recipe_category::Entity::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_update_keeps_average_rating() {
    let db = test_db().await;
    let author = create_user(&db, "chef").await;
    let critic = create_user(&db, "critic").await;
    let recipe_id = create_recipe(&db, author, "Bread", "Loaf", "flour").await;

    record_rating(&db, recipe_id, critic, 4).await.unwrap();
    let updated = recipes::update_recipe(
        &db,
        recipe_id,
        author,
        RecipePatch {
            description: Some("Crusty loaf".to_owned()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(updated.average_rating, 4.0);
}

#[tokio::test]
async fn test_delete_cascades_dependents() {
    let db = test_db().await;
    let author = create_user(&db, "chef").await;
    let fan = create_user(&db, "fan").await;
    let mains = create_category(&db, "Mains").await;

    let mut new_recipe = draft("Beef Stroganoff", "Creamy beef", "beef, cream");
    new_recipe.category_ids = vec![mains.id];
    let doomed = create_full_recipe(&db, author, new_recipe).await.unwrap().id;
    let survivor = create_recipe(&db, author, "Plov", "Rice", "rice, lamb").await;

    for recipe_id in [doomed, survivor] {
        add_comment(&db, recipe_id, fan, "Tasty").await.unwrap();
        record_rating(&db, recipe_id, fan, 5).await.unwrap();
        toggle_favorite(&db, recipe_id, fan).await.unwrap();
    }

    assert!(matches!(
        recipes::delete_recipe(&db, doomed, fan).await,
        Err(AppError::Forbidden(_))
    ));
    recipes::delete_recipe(&db, doomed, author).await.unwrap();

    assert!(matches!(
        recipes::get_recipe(&db, doomed).await,
        Err(AppError::NotFound(_))
    ));
    assert_eq!(recipe::Entity::find().count(&db).await.unwrap(), 1);
    assert_eq!(comment::Entity::find().count(&db).await.unwrap(), 1);
    assert_eq!(rating::Entity::find().count(&db).await.unwrap(), 1);
    assert_eq!(favorite::Entity::find().count(&db).await.unwrap(), 1);
    assert_eq!(recipe_category::Entity::find().count(&db).await.unwrap(), 0);

    // The category itself is untouched.
    assert!(categories::get_category(&db, mains.id).await.is_ok());
}

#[tokio::test]
async fn test_deleting_category_keeps_recipes() {
    let db = test_db().await;
    let author = create_user(&db, "chef").await;
    let drinks = create_category(&db, "Drinks").await;

    let mut new_recipe = draft("Kompot", "Fruit drink", "apples");
    new_recipe.category_ids = vec![drinks.id];
    let recipe_id = create_full_recipe(&db, author, new_recipe).await.unwrap().id;

    categories::delete_category(&db, drinks.id).await.unwrap();

    assert_eq!(recipe_category::Entity::find().count(&db).await.unwrap(), 0);
    let detail = recipe_detail(&db, recipe_id, None).await.unwrap();
    assert!(detail.categories.is_empty());

    assert!(matches!(
        categories::delete_category(&db, drinks.id).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_category_update() {
    let db = test_db().await;
    let created = create_category(&db, "Dessert").await;

    let unchanged = categories::update_category(&db, created.id, CategoryPatch::default())
        .await
        .unwrap();
    assert_eq!(unchanged, created);

    let renamed = categories::update_category(
        &db,
        created.id,
        CategoryPatch {
            name: Some("Desserts".to_owned()),
            description: Some("Sweet things".to_owned()),
        },
    )
    .await
    .unwrap();
    assert_eq!(renamed.name, "Desserts");
    assert_eq!(renamed.description, "Sweet things");

    let names: Vec<String> = categories::list_categories(&db)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Desserts".to_owned()]);

    assert!(matches!(
        categories::update_category(&db, created.id + 1, CategoryPatch::default()).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_deleting_user_removes_their_recipes() {
    let db = test_db().await;
    let author = create_user(&db, "chef").await;
    let other = create_user(&db, "other").await;
    create_recipe(&db, author, "Shashlik", "Skewers", "pork").await;
    let kept = create_recipe(&db, other, "Lavash", "Flatbread", "flour").await;

    user::Entity::delete_by_id(author).exec(&db).await.unwrap();

    let left: Vec<i32> = recipes::list_recipes(&db)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(left, vec![kept]);
}

#[tokio::test]
async fn test_comments() {
    let db = test_db().await;
    let author = create_user(&db, "chef").await;
    let guest = create_user(&db, "guest").await;
    let recipe_id = create_recipe(&db, author, "Draniki", "Potato pancakes", "potatoes").await;

    assert!(matches!(
        add_comment(&db, recipe_id, guest, "   ").await,
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        add_comment(&db, recipe_id + 1, guest, "Hello").await,
        Err(AppError::NotFound(_))
    ));

    let first = add_comment(&db, recipe_id, guest, "  Crispy!  ").await.unwrap();
    assert_eq!(first.text, "Crispy!");
    assert_eq!(first.author, "guest");
    add_comment(&db, recipe_id, author, "Thanks").await.unwrap();

    let texts: Vec<String> = list_comments(&db, recipe_id)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.text)
        .collect();
    assert_eq!(texts, vec!["Thanks".to_owned(), "Crispy!".to_owned()]);

    let detail = recipe_detail(&db, recipe_id, Some(guest)).await.unwrap();
    assert_eq!(detail.comments.len(), 2);
}

#[tokio::test]
async fn test_detail_shows_viewer_rating() {
    let db = test_db().await;
    let author = create_user(&db, "chef").await;
    let critic = create_user(&db, "critic").await;
    let recipe_id = create_recipe(&db, author, "Pelmeni", "Dumplings", "meat").await;

    record_rating(&db, recipe_id, critic, 3).await.unwrap();

    let as_critic = recipe_detail(&db, recipe_id, Some(critic)).await.unwrap();
    assert_eq!(as_critic.user_rating, Some(3));
    assert_eq!(as_critic.ratings.len(), 1);
    assert_eq!(as_critic.recipe.average_rating, 3.0);

    let as_author = recipe_detail(&db, recipe_id, Some(author)).await.unwrap();
    assert_eq!(as_author.user_rating, None);
}
