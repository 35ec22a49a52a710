use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use crate::config::ProviderConfig;
use crate::error::FinderError;
use crate::model::{FilterPage, Ingredient, Recipe, RecipeFilters, PAGE_SIZE};
use crate::providers::html::{decode_text, html_to_text};
use crate::providers::MealProvider;

const DEFAULT_BASE_URL: &str = "https://api.spoonacular.com";

/// Largest `number` Spoonacular accepts on list endpoints
const MAX_RESULTS: usize = 100;

/// Marks ids that belong to Spoonacular so they never collide with TheMealDB ids
pub const SPOONACULAR_ID_PREFIX: &str = "spoon-";

/// Spoonacular food API. `complexSearch` paginates server-side.
pub struct SpoonacularProvider {
    client: Client,
    api_key: String,
    base_url: String,
    page_size: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ComplexSearchResponse {
    #[serde(default)]
    results: Vec<RecipeInformation>,
    #[serde(default)]
    total_results: usize,
}

#[derive(Debug, Deserialize)]
struct RandomResponse {
    #[serde(default)]
    recipes: Vec<RecipeInformation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecipeInformation {
    id: u64,
    #[serde(default)]
    title: String,
    image: Option<String>,
    ready_in_minutes: Option<u32>,
    instructions: Option<String>,
    #[serde(default)]
    extended_ingredients: Vec<SpoonacularIngredient>,
    #[serde(default)]
    cuisines: Vec<String>,
    #[serde(default)]
    dish_types: Vec<String>,
    nutrition: Option<Nutrition>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IngredientMatch {
    id: u64,
    #[serde(default)]
    title: String,
    image: Option<String>,
    #[serde(default)]
    used_ingredients: Vec<SpoonacularIngredient>,
    #[serde(default)]
    missed_ingredients: Vec<SpoonacularIngredient>,
}

#[derive(Debug, Deserialize)]
struct SpoonacularIngredient {
    #[serde(default)]
    name: String,
    #[serde(default)]
    amount: Option<f64>,
    #[serde(default)]
    unit: String,
}

#[derive(Debug, Deserialize)]
struct Nutrition {
    #[serde(default)]
    nutrients: Vec<Nutrient>,
}

#[derive(Debug, Deserialize)]
struct Nutrient {
    name: String,
    amount: f64,
}

impl SpoonacularProvider {
    /// Create a new Spoonacular provider from configuration
    pub fn new(config: &ProviderConfig, timeout: Duration) -> Result<Self, FinderError> {
        // Try config first, then fall back to environment variable
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("SPOONACULAR_API_KEY").ok())
            .ok_or_else(|| {
                FinderError::ProviderError(
                    "SPOONACULAR_API_KEY not found in config or environment".to_string(),
                )
            })?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let client = Client::builder()
            .timeout(timeout)
            .user_agent("mealfinder/0.3")
            .build()?;

        Ok(SpoonacularProvider {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            page_size: PAGE_SIZE,
        })
    }

    #[doc(hidden)]
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        SpoonacularProvider {
            client: Client::new(),
            api_key,
            base_url,
            page_size: PAGE_SIZE,
        }
    }

    /// Number of results requested per filtered page
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.clamp(1, MAX_RESULTS);
        self
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, FinderError> {
        let response = self
            .client
            .get(format!("{}/{}", self.base_url, path))
            .query(&[("apiKey", self.api_key.as_str())])
            .query(params)
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        debug!("spoonacular {} returned {} bytes", path, body.len());
        Ok(serde_json::from_str(&body)?)
    }

    async fn complex_search(
        &self,
        query: Option<&str>,
        filters: &RecipeFilters,
        offset: usize,
        number: usize,
    ) -> Result<ComplexSearchResponse, FinderError> {
        let mut params = vec![
            ("offset", offset.to_string()),
            ("number", number.to_string()),
            ("addRecipeInformation", "true".to_string()),
            ("fillIngredients", "true".to_string()),
            ("addRecipeNutrition", "true".to_string()),
        ];
        if let Some(query) = query {
            params.push(("query", query.to_string()));
        }
        if let Some(category) = &filters.category {
            params.push(("type", category.to_lowercase()));
        }
        if let Some(area) = &filters.area {
            params.push(("cuisine", area.clone()));
        }
        if let Some(diet) = &filters.diet {
            params.push(("diet", diet.to_lowercase()));
        }

        self.get_json("recipes/complexSearch", &params).await
    }

    async fn random(&self, count: usize, tags: Vec<String>) -> Result<Vec<Recipe>, FinderError> {
        let mut params = vec![("number", count.clamp(1, MAX_RESULTS).to_string())];
        if !tags.is_empty() {
            params.push(("include-tags", tags.join(",")));
        }
        let response: RandomResponse = self.get_json("recipes/random", &params).await?;
        Ok(response.recipes.into_iter().map(information_to_recipe).collect())
    }
}

#[async_trait]
impl MealProvider for SpoonacularProvider {
    fn provider_name(&self) -> &str {
        "spoonacular"
    }

    async fn search_meals(&self, query: &str) -> Result<Vec<Recipe>, FinderError> {
        let response = self
            .complex_search(Some(query), &RecipeFilters::default(), 0, MAX_RESULTS)
            .await?;
        Ok(response.results.into_iter().map(information_to_recipe).collect())
    }

    async fn filter_by_multiple(
        &self,
        filters: &RecipeFilters,
        offset: usize,
    ) -> Result<FilterPage, FinderError> {
        let response = self
            .complex_search(None, filters, offset, self.page_size)
            .await?;
        Ok(FilterPage {
            total_count: response.total_results,
            recipes: response.results.into_iter().map(information_to_recipe).collect(),
        })
    }

    async fn get_multiple_random_meals(&self, count: usize) -> Result<Vec<Recipe>, FinderError> {
        if count == 0 {
            return Ok(Vec::new());
        }
        self.random(count, Vec::new()).await
    }

    async fn search_by_ingredients(
        &self,
        ingredients: &[String],
    ) -> Result<Vec<Recipe>, FinderError> {
        if ingredients.is_empty() {
            return Ok(Vec::new());
        }

        let params = vec![
            ("ingredients", ingredients.join(",")),
            // pantry results are not paginated, so ask for as many as allowed
            ("number", MAX_RESULTS.to_string()),
            ("ranking", "1".to_string()),
            ("ignorePantry", "true".to_string()),
        ];
        let matches: Vec<IngredientMatch> =
            self.get_json("recipes/findByIngredients", &params).await?;

        Ok(matches.into_iter().map(match_to_recipe).collect())
    }

    async fn get_random_meal(&self) -> Result<Option<Recipe>, FinderError> {
        Ok(self.random(1, Vec::new()).await?.into_iter().next())
    }

    async fn get_random_meal_with_filters(
        &self,
        filters: &RecipeFilters,
    ) -> Result<Option<Recipe>, FinderError> {
        let tags = [&filters.category, &filters.area]
            .into_iter()
            .flatten()
            .map(|tag| tag.to_lowercase())
            .collect();
        Ok(self.random(1, tags).await?.into_iter().next())
    }

    async fn lookup_meal(&self, id: &str) -> Result<Option<Recipe>, FinderError> {
        let raw_id = id.strip_prefix(SPOONACULAR_ID_PREFIX).unwrap_or(id);
        if raw_id.is_empty() || !raw_id.chars().all(|c| c.is_ascii_digit()) {
            return Ok(None);
        }

        let info: RecipeInformation = self
            .get_json(
                &format!("recipes/{}/information", raw_id),
                &[("includeNutrition", "true".to_string())],
            )
            .await?;
        Ok(Some(information_to_recipe(info)))
    }

    fn server_paginates(&self, _filters: &RecipeFilters) -> bool {
        true
    }
}

fn prefixed_id(id: u64) -> String {
    format!("{}{}", SPOONACULAR_ID_PREFIX, id)
}

fn format_measure(ingredient: &SpoonacularIngredient) -> String {
    let amount = match ingredient.amount {
        Some(amount) if amount.fract() == 0.0 => format!("{}", amount as i64),
        Some(amount) => format!("{:.2}", amount)
            .trim_end_matches('0')
            .to_string(),
        None => String::new(),
    };
    format!("{} {}", amount, ingredient.unit).trim().to_string()
}

fn convert_ingredients(ingredients: Vec<SpoonacularIngredient>) -> Vec<Ingredient> {
    ingredients
        .into_iter()
        .filter(|i| !i.name.trim().is_empty())
        .map(|i| {
            let measure = format_measure(&i);
            Ingredient::new(decode_text(&i.name), measure)
        })
        .collect()
}

fn information_to_recipe(info: RecipeInformation) -> Recipe {
    let calories = info.nutrition.and_then(|n| {
        n.nutrients
            .into_iter()
            .find(|nutrient| nutrient.name.eq_ignore_ascii_case("calories"))
            .map(|nutrient| nutrient.amount)
    });

    Recipe {
        id: prefixed_id(info.id),
        name: decode_text(&info.title),
        category: info.dish_types.into_iter().next().unwrap_or_default(),
        area: info.cuisines.into_iter().next().unwrap_or_default(),
        instructions: info
            .instructions
            .as_deref()
            .map(html_to_text)
            .unwrap_or_default(),
        ingredients: convert_ingredients(info.extended_ingredients),
        thumbnail: info.image,
        ready_in_minutes: info.ready_in_minutes,
        calories,
    }
}

fn match_to_recipe(found: IngredientMatch) -> Recipe {
    let mut ingredients = convert_ingredients(found.used_ingredients);
    ingredients.extend(convert_ingredients(found.missed_ingredients));

    Recipe {
        id: prefixed_id(found.id),
        name: decode_text(&found.title),
        ingredients,
        thumbnail: found.image,
        ..Default::default()
    }
}
