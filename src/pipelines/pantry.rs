use log::{debug, error};

use crate::error::FinderError;
use crate::model::Recipe;
use crate::providers::MealProvider;
use crate::translation::{is_default_locale, translate_recipes_list, TranslationCache};

/// Find recipes that use the given pantry ingredients.
///
/// Ingredients go to the provider untouched. The result is neither paginated
/// nor deduplicated; names are translated in one batch for non-default
/// locales. Failures are logged and turn into an empty list.
pub async fn search_pantry(
    provider: &dyn MealProvider,
    cache: &dyn TranslationCache,
    default_locale: &str,
    ingredients: &[String],
    locale: Option<&str>,
) -> Vec<Recipe> {
    match try_search_pantry(provider, cache, default_locale, ingredients, locale).await {
        Ok(recipes) => recipes,
        Err(e) => {
            error!("Error searching pantry {:?}: {}", ingredients, e);
            Vec::new()
        }
    }
}

pub async fn try_search_pantry(
    provider: &dyn MealProvider,
    cache: &dyn TranslationCache,
    default_locale: &str,
    ingredients: &[String],
    locale: Option<&str>,
) -> Result<Vec<Recipe>, FinderError> {
    let recipes = provider.search_by_ingredients(ingredients).await?;
    debug!("Pantry search matched {} recipes", recipes.len());

    match locale {
        Some(locale) if !recipes.is_empty() && !is_default_locale(Some(locale), default_locale) => {
            translate_recipes_list(cache, recipes, locale).await
        }
        _ => Ok(recipes),
    }
}
