use log::{error, info};
use std::time::Duration;

use crate::config::FinderConfig;
use crate::error::FinderError;
use crate::model::{Recipe, RecipeFilters, RecipePage, RecipeQuery};
use crate::pipelines::{pantry, recipes, ListingSettings};
use crate::providers::{MealProvider, ProviderFactory};
use crate::translation::{
    is_default_locale, translate_recipe, NoTranslationCache, SupabaseTranslationCache,
    TranslationCache,
};

/// Entry point for the route layer: owns one provider and one translation cache
pub struct RecipeFinder {
    provider: Box<dyn MealProvider>,
    translations: Box<dyn TranslationCache>,
    settings: ListingSettings,
}

/// Builder for configuring a [`RecipeFinder`]
#[derive(Default)]
pub struct RecipeFinderBuilder {
    provider: Option<Box<dyn MealProvider>>,
    translations: Option<Box<dyn TranslationCache>>,
    default_locale: Option<String>,
    page_size: Option<usize>,
    random_total_items: Option<usize>,
}

impl RecipeFinderBuilder {
    /// Set the meal provider
    ///
    /// # Example
    /// ```
    /// use mealfinder::{MealDbProvider, RecipeFinder};
    ///
    /// let builder = RecipeFinder::builder()
    ///     .provider(MealDbProvider::with_base_url("https://www.themealdb.com/api/json/v1/1".into()));
    /// ```
    pub fn provider(mut self, provider: impl MealProvider + 'static) -> Self {
        self.provider = Some(Box::new(provider));
        self
    }

    /// Set an already boxed provider, e.g. one from [`ProviderFactory`]
    pub fn boxed_provider(mut self, provider: Box<dyn MealProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the translation cache. Without one every lookup misses.
    pub fn translations(mut self, cache: impl TranslationCache + 'static) -> Self {
        self.translations = Some(Box::new(cache));
        self
    }

    pub fn boxed_translations(mut self, cache: Box<dyn TranslationCache>) -> Self {
        self.translations = Some(cache);
        self
    }

    /// Locale served untranslated (default "en")
    pub fn default_locale(mut self, locale: impl Into<String>) -> Self {
        self.default_locale = Some(locale.into());
        self
    }

    /// Recipes per listing page (default 24)
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Total reported for random browsing (default 10000)
    pub fn random_total_items(mut self, total: usize) -> Self {
        self.random_total_items = Some(total);
        self
    }

    /// Build the finder
    ///
    /// # Errors
    /// Returns `FinderError::BuilderError` if no provider was set or the page
    /// size is zero.
    pub fn build(self) -> Result<RecipeFinder, FinderError> {
        let provider = self.provider.ok_or_else(|| {
            FinderError::BuilderError(
                "No meal provider specified. Use .provider() or RecipeFinder::from_config()"
                    .to_string(),
            )
        })?;

        let defaults = ListingSettings::default();
        let settings = ListingSettings {
            default_locale: self.default_locale.unwrap_or(defaults.default_locale),
            page_size: self.page_size.unwrap_or(defaults.page_size),
            random_total_items: self
                .random_total_items
                .unwrap_or(defaults.random_total_items),
        };
        if settings.page_size == 0 {
            return Err(FinderError::BuilderError(
                "Page size must be at least 1".to_string(),
            ));
        }

        Ok(RecipeFinder {
            provider,
            translations: self
                .translations
                .unwrap_or_else(|| Box::new(NoTranslationCache)),
            settings,
        })
    }
}

impl RecipeFinder {
    /// Creates a new builder
    ///
    /// # Example
    /// ```
    /// use mealfinder::RecipeFinder;
    ///
    /// let builder = RecipeFinder::builder();
    /// ```
    pub fn builder() -> RecipeFinderBuilder {
        RecipeFinderBuilder::default()
    }

    /// Wire providers and the translation cache from configuration
    pub fn from_config(config: &FinderConfig) -> Result<Self, FinderError> {
        let provider = ProviderFactory::from_config(config)?;

        let translations: Box<dyn TranslationCache> = if config.translations.enabled {
            Box::new(SupabaseTranslationCache::new(
                &config.translations,
                Duration::from_secs(config.timeout),
            )?)
        } else {
            Box::new(NoTranslationCache)
        };
        info!(
            "Recipe finder using {} provider and {} translations",
            provider.provider_name(),
            translations.cache_name()
        );

        RecipeFinder::builder()
            .boxed_provider(provider)
            .boxed_translations(translations)
            .default_locale(config.default_locale.clone())
            .page_size(config.page_size)
            .random_total_items(config.random_total_items)
            .build()
    }

    pub fn settings(&self) -> &ListingSettings {
        &self.settings
    }

    /// One translated page of recipes; empty on any failure
    pub async fn fetch_recipes(&self, query: &RecipeQuery) -> RecipePage {
        recipes::fetch_recipes(
            self.provider.as_ref(),
            self.translations.as_ref(),
            &self.settings,
            query,
        )
        .await
    }

    /// Like [`fetch_recipes`](Self::fetch_recipes) but reports failures
    pub async fn try_fetch_recipes(&self, query: &RecipeQuery) -> Result<RecipePage, FinderError> {
        recipes::try_fetch_recipes(
            self.provider.as_ref(),
            self.translations.as_ref(),
            &self.settings,
            query,
        )
        .await
    }

    /// Recipes that use the pantry ingredients; empty on any failure
    pub async fn search_pantry(&self, ingredients: &[String], locale: Option<&str>) -> Vec<Recipe> {
        pantry::search_pantry(
            self.provider.as_ref(),
            self.translations.as_ref(),
            &self.settings.default_locale,
            ingredients,
            locale,
        )
        .await
    }

    pub async fn try_search_pantry(
        &self,
        ingredients: &[String],
        locale: Option<&str>,
    ) -> Result<Vec<Recipe>, FinderError> {
        pantry::try_search_pantry(
            self.provider.as_ref(),
            self.translations.as_ref(),
            &self.settings.default_locale,
            ingredients,
            locale,
        )
        .await
    }

    /// Full recipe for a detail page; `None` when unknown or on failure
    pub async fn get_recipe(&self, id: &str, locale: Option<&str>) -> Option<Recipe> {
        let found = self.provider.lookup_meal(id).await;
        self.finish_single(found, locale, "looking up recipe")
            .await
    }

    /// A random recipe, restricted to the category/area of `filters` when set
    pub async fn random_recipe(&self, filters: &RecipeFilters, locale: Option<&str>) -> Option<Recipe> {
        let found = if filters.category.is_none() && filters.area.is_none() {
            self.provider.get_random_meal().await
        } else {
            self.provider.get_random_meal_with_filters(filters).await
        };
        self.finish_single(found, locale, "picking random recipe")
            .await
    }

    async fn finish_single(
        &self,
        found: Result<Option<Recipe>, FinderError>,
        locale: Option<&str>,
        action: &str,
    ) -> Option<Recipe> {
        let result = match (found, locale) {
            (Ok(Some(recipe)), Some(locale))
                if !is_default_locale(Some(locale), &self.settings.default_locale) =>
            {
                translate_recipe(self.translations.as_ref(), recipe, locale)
                    .await
                    .map(Some)
            }
            (found, _) => found,
        };

        match result {
            Ok(recipe) => recipe,
            Err(e) => {
                error!("Error {}: {}", action, e);
                None
            }
        }
    }
}
