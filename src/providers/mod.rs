mod composite;
mod factory;
mod html;
mod mealdb;
mod spoonacular;

pub use composite::CompositeProvider;
pub use factory::ProviderFactory;
pub use mealdb::MealDbProvider;
pub use spoonacular::{SpoonacularProvider, SPOONACULAR_ID_PREFIX};

use async_trait::async_trait;

use crate::error::FinderError;
use crate::model::{FilterPage, Recipe, RecipeFilters};

/// Unified trait for all meal data providers
#[async_trait]
pub trait MealProvider: Send + Sync {
    /// Get the provider name (e.g., "mealdb", "spoonacular")
    fn provider_name(&self) -> &str;

    /// Free-text search by recipe name. Returns the complete matching set.
    async fn search_meals(&self, query: &str) -> Result<Vec<Recipe>, FinderError>;

    /// Browse by category/area/diet starting at a zero-based offset
    async fn filter_by_multiple(
        &self,
        filters: &RecipeFilters,
        offset: usize,
    ) -> Result<FilterPage, FinderError>;

    /// Up to `count` random recipes
    async fn get_multiple_random_meals(&self, count: usize) -> Result<Vec<Recipe>, FinderError>;

    /// Recipes that use the given pantry ingredients
    async fn search_by_ingredients(
        &self,
        ingredients: &[String],
    ) -> Result<Vec<Recipe>, FinderError>;

    async fn get_random_meal(&self) -> Result<Option<Recipe>, FinderError>;

    /// A random recipe within the category and/or area of `filters`
    async fn get_random_meal_with_filters(
        &self,
        filters: &RecipeFilters,
    ) -> Result<Option<Recipe>, FinderError>;

    /// Full recipe by provider id
    async fn lookup_meal(&self, id: &str) -> Result<Option<Recipe>, FinderError>;

    /// Whether `filter_by_multiple` returns only the requested page for these
    /// filters. When false the provider returns the whole matching set and the
    /// caller slices it.
    fn server_paginates(&self, filters: &RecipeFilters) -> bool {
        filters.diet.is_some()
    }
}
