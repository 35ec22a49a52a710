//! Recipe discovery over third-party meal APIs.
//!
//! `mealfinder` aggregates TheMealDB and Spoonacular behind one
//! [`MealProvider`] interface, serves paged listings and pantry searches, and
//! swaps in cached translations for non-default locales.
//!
//! ```no_run
//! # use mealfinder::{RecipeFinder, RecipeQuery, FinderConfig};
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let finder = RecipeFinder::from_config(&FinderConfig::load()?)?;
//! let page = finder
//!     .fetch_recipes(&RecipeQuery::new().category("Dessert").page(2).locale("fr"))
//!     .await;
//! println!("{} of {}", page.recipes.len(), page.total_items);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod model;
pub mod pipelines;
pub mod providers;
pub mod translation;

pub use crate::builder::{RecipeFinder, RecipeFinderBuilder};
pub use crate::config::{FinderConfig, ProviderConfig, TranslationConfig};
pub use crate::error::FinderError;
pub use crate::model::{
    FilterPage, Ingredient, QueryIntent, Recipe, RecipeFilters, RecipePage, RecipeQuery,
    PAGE_SIZE, RANDOM_TOTAL_ITEMS,
};
pub use crate::providers::{
    CompositeProvider, MealDbProvider, MealProvider, ProviderFactory, SpoonacularProvider,
};
pub use crate::translation::{
    CachedTranslation, NoTranslationCache, SupabaseTranslationCache, TranslationCache,
};

/// Build a finder from `mealfinder.toml` and `MEALFINDER__*` environment variables
pub fn finder_from_env() -> Result<RecipeFinder, FinderError> {
    let config = FinderConfig::load()?;
    RecipeFinder::from_config(&config)
}
