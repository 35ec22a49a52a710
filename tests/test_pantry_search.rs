use mealfinder::{
    FinderConfig, ProviderConfig, RecipeFinder, TranslationConfig,
};
use mockito::{Matcher, Server};
use serde_json::json;

/// Full wiring through configuration, with every backend pointed at mock servers
fn config_for(mealdb: &str, spoonacular: &str, supabase: &str) -> FinderConfig {
    let mut config = FinderConfig::default();
    config.providers.insert(
        "mealdb".to_string(),
        ProviderConfig {
            enabled: true,
            api_key: None,
            base_url: Some(mealdb.to_string()),
        },
    );
    config.providers.insert(
        "spoonacular".to_string(),
        ProviderConfig {
            enabled: true,
            api_key: Some("test-key".to_string()),
            base_url: Some(spoonacular.to_string()),
        },
    );
    config.translations = TranslationConfig {
        enabled: true,
        url: Some(supabase.to_string()),
        api_key: Some("anon".to_string()),
        table: "recipe_translations".to_string(),
    };
    config
}

fn pantry(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_pantry_search_translates_cached_names() {
    let mealdb = Server::new_async().await;
    let mut spoonacular = Server::new_async().await;
    let mut supabase = Server::new_async().await;

    let search = spoonacular
        .mock("GET", "/recipes/findByIngredients")
        .match_query(Matcher::UrlEncoded("ingredients".into(), "chicken,rice".into()))
        .with_status(200)
        .with_body(
            json!([
                { "id": 1, "title": "Chicken Rice" },
                { "id": 2, "title": "Chicken Congee" },
                { "id": 3, "title": "Rice Salad" }
            ])
            .to_string(),
        )
        .create_async()
        .await;

    let translations = supabase
        .mock("GET", "/rest/v1/recipe_translations")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded(
                "recipe_id".into(),
                r#"in.("spoon-1","spoon-2","spoon-3")"#.into(),
            ),
            Matcher::UrlEncoded("locale".into(), "eq.es".into()),
        ]))
        .with_status(200)
        .with_body(
            json!([
                { "recipe_id": "spoon-1", "locale": "es", "name": "Arroz con pollo" },
                { "recipe_id": "spoon-3", "locale": "es", "name": "Ensalada de arroz" }
            ])
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let finder =
        RecipeFinder::from_config(&config_for(&mealdb.url(), &spoonacular.url(), &supabase.url()))
            .unwrap();
    let recipes = finder
        .search_pantry(&pantry(&["chicken", "rice"]), Some("es"))
        .await;

    let names: Vec<&str> = recipes.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["Arroz con pollo", "Chicken Congee", "Ensalada de arroz"]
    );
    search.assert_async().await;
    translations.assert_async().await;
}

#[tokio::test]
async fn test_default_locale_never_queries_cache() {
    let mealdb = Server::new_async().await;
    let mut spoonacular = Server::new_async().await;
    let mut supabase = Server::new_async().await;

    let _search = spoonacular
        .mock("GET", "/recipes/findByIngredients")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(json!([{ "id": 5, "title": "Egg Fried Rice" }]).to_string())
        .create_async()
        .await;
    let cache = supabase
        .mock("GET", "/rest/v1/recipe_translations")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let finder =
        RecipeFinder::from_config(&config_for(&mealdb.url(), &spoonacular.url(), &supabase.url()))
            .unwrap();
    let recipes = finder.search_pantry(&pantry(&["egg"]), Some("en")).await;

    assert_eq!(recipes.len(), 1);
    assert_eq!(recipes[0].name, "Egg Fried Rice");
    cache.assert_async().await;
}

#[tokio::test]
async fn test_cache_outage_returns_empty_list() {
    let mealdb = Server::new_async().await;
    let mut spoonacular = Server::new_async().await;
    let mut supabase = Server::new_async().await;

    let _search = spoonacular
        .mock("GET", "/recipes/findByIngredients")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(json!([{ "id": 5, "title": "Egg Fried Rice" }]).to_string())
        .create_async()
        .await;
    let _cache = supabase
        .mock("GET", "/rest/v1/recipe_translations")
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;

    let finder =
        RecipeFinder::from_config(&config_for(&mealdb.url(), &spoonacular.url(), &supabase.url()))
            .unwrap();

    assert!(finder
        .search_pantry(&pantry(&["egg"]), Some("fr"))
        .await
        .is_empty());
    assert!(finder
        .try_search_pantry(&pantry(&["egg"]), Some("fr"))
        .await
        .is_err());
}

#[tokio::test]
async fn test_without_spoonacular_pantry_uses_mealdb() {
    let mut mealdb = Server::new_async().await;
    let _chicken = mealdb
        .mock("GET", "/filter.php")
        .match_query(Matcher::UrlEncoded("i".into(), "chicken".into()))
        .with_status(200)
        .with_body(r#"{"meals": [{"idMeal": "1", "strMeal": "Chicken Rice"}, {"idMeal": "2", "strMeal": "Chicken Pie"}]}"#)
        .create_async()
        .await;
    let _rice = mealdb
        .mock("GET", "/filter.php")
        .match_query(Matcher::UrlEncoded("i".into(), "rice".into()))
        .with_status(200)
        .with_body(r#"{"meals": [{"idMeal": "1", "strMeal": "Chicken Rice"}]}"#)
        .create_async()
        .await;

    let mut config = FinderConfig::default();
    config
        .providers
        .get_mut("mealdb")
        .unwrap()
        .base_url = Some(mealdb.url());

    let finder = RecipeFinder::from_config(&config).unwrap();
    let recipes = finder.search_pantry(&pantry(&["chicken", "rice"]), None).await;

    assert_eq!(recipes.len(), 1);
    assert_eq!(recipes[0].id, "1");
}
