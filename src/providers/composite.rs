use async_trait::async_trait;
use log::{debug, warn};

use crate::error::FinderError;
use crate::model::{FilterPage, Recipe, RecipeFilters};
use crate::providers::{MealProvider, SPOONACULAR_ID_PREFIX};

/// Routes each request to the backend that can answer it.
///
/// Name search, random browsing and category/area filters go to the primary
/// (TheMealDB). Diet filters and pantry search need the secondary
/// (Spoonacular) and fall back to the primary when it is not configured.
pub struct CompositeProvider {
    primary: Box<dyn MealProvider>,
    secondary: Option<Box<dyn MealProvider>>,
}

impl CompositeProvider {
    pub fn new(primary: Box<dyn MealProvider>, secondary: Option<Box<dyn MealProvider>>) -> Self {
        CompositeProvider { primary, secondary }
    }

    fn for_filters(&self, filters: &RecipeFilters) -> &dyn MealProvider {
        match (&filters.diet, &self.secondary) {
            (Some(_), Some(secondary)) => secondary.as_ref(),
            _ => self.primary.as_ref(),
        }
    }

    /// Diet that has to be served by the primary because no secondary exists
    fn unserved_diet<'a>(&self, filters: &'a RecipeFilters) -> Option<&'a str> {
        match self.secondary {
            Some(_) => None,
            None => filters.diet.as_deref(),
        }
    }

    fn for_ingredients(&self) -> &dyn MealProvider {
        self.secondary
            .as_deref()
            .unwrap_or_else(|| self.primary.as_ref())
    }

    fn for_id(&self, id: &str) -> &dyn MealProvider {
        match &self.secondary {
            Some(secondary) if id.starts_with(SPOONACULAR_ID_PREFIX) => secondary.as_ref(),
            _ => self.primary.as_ref(),
        }
    }
}

#[async_trait]
impl MealProvider for CompositeProvider {
    fn provider_name(&self) -> &str {
        "composite"
    }

    async fn search_meals(&self, query: &str) -> Result<Vec<Recipe>, FinderError> {
        self.primary.search_meals(query).await
    }

    async fn filter_by_multiple(
        &self,
        filters: &RecipeFilters,
        offset: usize,
    ) -> Result<FilterPage, FinderError> {
        if let Some(diet) = self.unserved_diet(filters) {
            warn!(
                "Diet filter '{}' needs spoonacular, falling back to {}",
                diet,
                self.primary.provider_name()
            );
        }
        let provider = self.for_filters(filters);
        debug!("Filtering {:?} with {}", filters, provider.provider_name());
        provider.filter_by_multiple(filters, offset).await
    }

    async fn get_multiple_random_meals(&self, count: usize) -> Result<Vec<Recipe>, FinderError> {
        self.primary.get_multiple_random_meals(count).await
    }

    async fn search_by_ingredients(
        &self,
        ingredients: &[String],
    ) -> Result<Vec<Recipe>, FinderError> {
        let provider = self.for_ingredients();
        debug!(
            "Pantry search for {} ingredients with {}",
            ingredients.len(),
            provider.provider_name()
        );
        provider.search_by_ingredients(ingredients).await
    }

    async fn get_random_meal(&self) -> Result<Option<Recipe>, FinderError> {
        self.primary.get_random_meal().await
    }

    async fn get_random_meal_with_filters(
        &self,
        filters: &RecipeFilters,
    ) -> Result<Option<Recipe>, FinderError> {
        self.primary.get_random_meal_with_filters(filters).await
    }

    async fn lookup_meal(&self, id: &str) -> Result<Option<Recipe>, FinderError> {
        self.for_id(id).lookup_meal(id).await
    }

    fn server_paginates(&self, filters: &RecipeFilters) -> bool {
        self.for_filters(filters).server_paginates(filters)
    }
}
