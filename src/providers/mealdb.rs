use async_trait::async_trait;
use log::{debug, warn};
use rand::seq::SliceRandom;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::time::Duration;

use crate::config::ProviderConfig;
use crate::error::FinderError;
use crate::model::{FilterPage, Ingredient, Recipe, RecipeFilters};
use crate::providers::html::decode_text;
use crate::providers::MealProvider;

const DEFAULT_BASE_URL: &str = "https://www.themealdb.com/api/json/v1";
const FREE_API_KEY: &str = "1";
const MAX_INGREDIENTS: usize = 20;

/// TheMealDB v1 JSON API.
///
/// None of its endpoints paginate: filters return every matching summary and
/// the caller slices locally.
pub struct MealDbProvider {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct MealsResponse {
    meals: Option<Vec<Map<String, Value>>>,
}

impl MealDbProvider {
    /// Create a new TheMealDB provider from configuration
    pub fn new(config: &ProviderConfig, timeout: Duration) -> Result<Self, FinderError> {
        let base_url = match &config.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => {
                let api_key = config
                    .api_key
                    .clone()
                    .or_else(|| std::env::var("MEALDB_API_KEY").ok())
                    .unwrap_or_else(|| FREE_API_KEY.to_string());
                format!("{}/{}", DEFAULT_BASE_URL, api_key)
            }
        };

        let client = Client::builder()
            .timeout(timeout)
            .user_agent("mealfinder/0.3")
            .build()?;

        Ok(MealDbProvider { client, base_url })
    }

    #[doc(hidden)]
    pub fn with_base_url(base_url: String) -> Self {
        MealDbProvider {
            client: Client::new(),
            base_url,
        }
    }

    async fn get_meals(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<Vec<Recipe>, FinderError> {
        let response = self
            .client
            .get(format!("{}/{}", self.base_url, endpoint))
            .query(params)
            .send()
            .await?
            .error_for_status()?;

        let body: MealsResponse = response.json().await?;
        let meals = body.meals.unwrap_or_default();
        debug!("{} {:?} returned {} meals", endpoint, params, meals.len());

        Ok(meals.iter().map(meal_to_recipe).collect())
    }

    /// Summaries for a category and/or area, intersected by id when both are set
    async fn filter_summaries(&self, filters: &RecipeFilters) -> Result<Vec<Recipe>, FinderError> {
        let by_category = match &filters.category {
            Some(category) => Some(
                self.get_meals("filter.php", &[("c", category.as_str())])
                    .await?,
            ),
            None => None,
        };
        let by_area = match &filters.area {
            Some(area) => Some(
                self.get_meals("filter.php", &[("a", area.as_str())])
                    .await?,
            ),
            None => None,
        };

        let mut recipes = match (by_category, by_area) {
            (Some(category), Some(area)) => intersect_by_id(category, &area),
            (Some(category), None) => category,
            (None, Some(area)) => area,
            (None, None) => Vec::new(),
        };

        // filter.php only returns id, name and thumbnail
        for recipe in &mut recipes {
            if let Some(category) = &filters.category {
                recipe.category = category.clone();
            }
            if let Some(area) = &filters.area {
                recipe.area = area.clone();
            }
        }

        Ok(recipes)
    }
}

#[async_trait]
impl MealProvider for MealDbProvider {
    fn provider_name(&self) -> &str {
        "mealdb"
    }

    async fn search_meals(&self, query: &str) -> Result<Vec<Recipe>, FinderError> {
        self.get_meals("search.php", &[("s", query)]).await
    }

    async fn filter_by_multiple(
        &self,
        filters: &RecipeFilters,
        offset: usize,
    ) -> Result<FilterPage, FinderError> {
        if let Some(diet) = &filters.diet {
            warn!("TheMealDB has no diet filter, ignoring '{}'", diet);
        }
        debug!("TheMealDB returns full filter sets, offset {} ignored", offset);

        let recipes = self.filter_summaries(filters).await?;
        Ok(FilterPage {
            total_count: recipes.len(),
            recipes,
        })
    }

    async fn get_multiple_random_meals(&self, count: usize) -> Result<Vec<Recipe>, FinderError> {
        let mut recipes = Vec::with_capacity(count);
        for _ in 0..count {
            if let Some(recipe) = self.get_random_meal().await? {
                recipes.push(recipe);
            }
        }
        Ok(recipes)
    }

    async fn search_by_ingredients(
        &self,
        ingredients: &[String],
    ) -> Result<Vec<Recipe>, FinderError> {
        let mut matches: Option<Vec<Recipe>> = None;

        for ingredient in ingredients {
            // TheMealDB expects underscores in multi-word ingredient names
            let term = ingredient.trim().replace(' ', "_");
            if term.is_empty() {
                continue;
            }
            let found = self.get_meals("filter.php", &[("i", term.as_str())]).await?;
            matches = Some(match matches {
                Some(previous) => intersect_by_id(previous, &found),
                None => found,
            });

            if matches.as_ref().is_some_and(Vec::is_empty) {
                break;
            }
        }

        Ok(matches.unwrap_or_default())
    }

    async fn get_random_meal(&self) -> Result<Option<Recipe>, FinderError> {
        Ok(self.get_meals("random.php", &[]).await?.into_iter().next())
    }

    async fn get_random_meal_with_filters(
        &self,
        filters: &RecipeFilters,
    ) -> Result<Option<Recipe>, FinderError> {
        if filters.category.is_none() && filters.area.is_none() {
            return self.get_random_meal().await;
        }

        let summaries = self.filter_summaries(filters).await?;
        let picked = {
            let mut rng = rand::thread_rng();
            summaries.choose(&mut rng).cloned()
        };

        match picked {
            Some(summary) => match self.lookup_meal(&summary.id).await? {
                Some(full) => Ok(Some(full)),
                None => Ok(Some(summary)),
            },
            None => Ok(None),
        }
    }

    async fn lookup_meal(&self, id: &str) -> Result<Option<Recipe>, FinderError> {
        Ok(self.get_meals("lookup.php", &[("i", id)]).await?.into_iter().next())
    }

    fn server_paginates(&self, _filters: &RecipeFilters) -> bool {
        false
    }
}

/// Keep recipes from `left` whose id also appears in `right`, in `left` order
fn intersect_by_id(left: Vec<Recipe>, right: &[Recipe]) -> Vec<Recipe> {
    let ids: HashSet<&str> = right.iter().map(|r| r.id.as_str()).collect();
    left.into_iter()
        .filter(|r| ids.contains(r.id.as_str()))
        .collect()
}

fn text_field(meal: &Map<String, Value>, key: &str) -> String {
    meal.get(key)
        .and_then(Value::as_str)
        .map(decode_text)
        .unwrap_or_default()
}

fn meal_to_recipe(meal: &Map<String, Value>) -> Recipe {
    let ingredients = (1..=MAX_INGREDIENTS)
        .filter_map(|i| {
            let name = text_field(meal, &format!("strIngredient{}", i));
            if name.is_empty() {
                return None;
            }
            let measure = text_field(meal, &format!("strMeasure{}", i));
            Some(Ingredient::new(name, measure))
        })
        .collect();

    let thumbnail = text_field(meal, "strMealThumb");

    Recipe {
        id: text_field(meal, "idMeal"),
        name: text_field(meal, "strMeal"),
        category: text_field(meal, "strCategory"),
        area: text_field(meal, "strArea"),
        instructions: meal
            .get("strInstructions")
            .and_then(Value::as_str)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
        ingredients,
        thumbnail: (!thumbnail.is_empty()).then_some(thumbnail),
        ready_in_minutes: None,
        calories: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    const ARRABIATA: &str = r#"{
        "meals": [{
            "idMeal": "52771",
            "strMeal": "Spicy Arrabiata Penne",
            "strCategory": "Vegetarian",
            "strArea": "Italian",
            "strInstructions": "Bring a large pot of water to a boil.\r\nAdd the penne.",
            "strMealThumb": "https://www.themealdb.com/images/media/meals/ustsqw1468250014.jpg",
            "strIngredient1": "penne rigate",
            "strMeasure1": "1 pound",
            "strIngredient2": "olive oil",
            "strMeasure2": "1/4 cup",
            "strIngredient3": "",
            "strMeasure3": " ",
            "strIngredient4": null,
            "strMeasure4": null
        }]
    }"#;

    #[tokio::test]
    async fn test_search_meals_parses_full_recipe() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/search.php")
            .match_query(Matcher::UrlEncoded("s".into(), "Arrabiata".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(ARRABIATA)
            .create_async()
            .await;

        let provider = MealDbProvider::with_base_url(server.url());
        let recipes = provider.search_meals("Arrabiata").await.unwrap();

        assert_eq!(recipes.len(), 1);
        let recipe = &recipes[0];
        assert_eq!(recipe.id, "52771");
        assert_eq!(recipe.name, "Spicy Arrabiata Penne");
        assert_eq!(recipe.area, "Italian");
        assert_eq!(
            recipe.ingredients,
            vec![
                Ingredient::new("penne rigate", "1 pound"),
                Ingredient::new("olive oil", "1/4 cup"),
            ]
        );
        assert!(recipe.thumbnail.is_some());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_null_meals_is_empty() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/search.php")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"meals": null}"#)
            .create_async()
            .await;

        let provider = MealDbProvider::with_base_url(server.url());
        assert!(provider.search_meals("nothing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_filter_category_and_area_intersects() {
        let mut server = Server::new_async().await;
        let _c = server
            .mock("GET", "/filter.php")
            .match_query(Matcher::UrlEncoded("c".into(), "Seafood".into()))
            .with_status(200)
            .with_body(
                r#"{"meals": [
                    {"idMeal": "1", "strMeal": "Fish Pie", "strMealThumb": "a.jpg"},
                    {"idMeal": "2", "strMeal": "Paella", "strMealThumb": "b.jpg"},
                    {"idMeal": "3", "strMeal": "Kedgeree", "strMealThumb": "c.jpg"}
                ]}"#,
            )
            .create_async()
            .await;
        let _a = server
            .mock("GET", "/filter.php")
            .match_query(Matcher::UrlEncoded("a".into(), "British".into()))
            .with_status(200)
            .with_body(
                r#"{"meals": [
                    {"idMeal": "3", "strMeal": "Kedgeree", "strMealThumb": "c.jpg"},
                    {"idMeal": "1", "strMeal": "Fish Pie", "strMealThumb": "a.jpg"}
                ]}"#,
            )
            .create_async()
            .await;

        let provider = MealDbProvider::with_base_url(server.url());
        let filters = RecipeFilters::new(Some("Seafood"), Some("British"), None);
        let page = provider.filter_by_multiple(&filters, 24).await.unwrap();

        let ids: Vec<&str> = page.recipes.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert_eq!(page.total_count, 2);
        assert_eq!(page.recipes[0].category, "Seafood");
        assert_eq!(page.recipes[0].area, "British");
        assert!(!provider.server_paginates(&filters));
    }

    #[tokio::test]
    async fn test_search_by_ingredients_intersects() {
        let mut server = Server::new_async().await;
        let _chicken = server
            .mock("GET", "/filter.php")
            .match_query(Matcher::UrlEncoded("i".into(), "chicken_breast".into()))
            .with_status(200)
            .with_body(
                r#"{"meals": [
                    {"idMeal": "10", "strMeal": "Chicken Rice"},
                    {"idMeal": "11", "strMeal": "Chicken Salad"}
                ]}"#,
            )
            .create_async()
            .await;
        let _rice = server
            .mock("GET", "/filter.php")
            .match_query(Matcher::UrlEncoded("i".into(), "rice".into()))
            .with_status(200)
            .with_body(r#"{"meals": [{"idMeal": "10", "strMeal": "Chicken Rice"}]}"#)
            .create_async()
            .await;

        let provider = MealDbProvider::with_base_url(server.url());
        let recipes = provider
            .search_by_ingredients(&["chicken breast".to_string(), "rice".to_string()])
            .await
            .unwrap();

        assert_eq!(recipes.len(), 1);
        assert_eq!(recipes[0].name, "Chicken Rice");
    }

    #[tokio::test]
    async fn test_multiple_random_meals_calls_random_each_time() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/random.php")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(ARRABIATA)
            .expect(3)
            .create_async()
            .await;

        let provider = MealDbProvider::with_base_url(server.url());
        let recipes = provider.get_multiple_random_meals(3).await.unwrap();

        assert_eq!(recipes.len(), 3);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_server_error_is_reported() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/lookup.php")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let provider = MealDbProvider::with_base_url(server.url());
        let result = provider.lookup_meal("52771").await;
        assert!(matches!(result, Err(FinderError::FetchError(_))));
    }

    #[test]
    fn test_provider_name() {
        let provider = MealDbProvider::with_base_url("http://localhost".to_string());
        assert_eq!(provider.provider_name(), "mealdb");
    }
}
