use log::{debug, error};

use crate::error::FinderError;
use crate::model::{QueryIntent, Recipe, RecipeFilters, RecipePage, RecipeQuery};
use crate::pipelines::{dedupe_recipes, page_offset, page_slice, ListingSettings};
use crate::providers::MealProvider;
use crate::translation::{is_default_locale, translate_recipe, TranslationCache};

/// Fetch one page of recipes for a listing query.
///
/// This pipeline:
/// 1. Dispatches on the query intent (search, filtered browse, random browse)
/// 2. Drops duplicate ids, keeping the first occurrence
/// 3. Slices the page locally unless the provider already paginated it
/// 4. Applies cached translations to the page
///
/// Failures are logged and turn into an empty page; use [`try_fetch_recipes`]
/// to see the error.
pub async fn fetch_recipes(
    provider: &dyn MealProvider,
    cache: &dyn TranslationCache,
    settings: &ListingSettings,
    query: &RecipeQuery,
) -> RecipePage {
    match try_fetch_recipes(provider, cache, settings, query).await {
        Ok(page) => page,
        Err(e) => {
            error!("Error fetching recipes for {:?}: {}", query, e);
            RecipePage::empty()
        }
    }
}

pub async fn try_fetch_recipes(
    provider: &dyn MealProvider,
    cache: &dyn TranslationCache,
    settings: &ListingSettings,
    query: &RecipeQuery,
) -> Result<RecipePage, FinderError> {
    let page = query.page_number();
    let page_size = settings.page_size;

    let (recipes, total_items) = match query.intent() {
        QueryIntent::FreeTextSearch(text) => {
            let found = dedupe_recipes(provider.search_meals(&text).await?);
            let total = found.len();
            (page_slice(found, page, page_size), total)
        }
        QueryIntent::FilteredBrowse(filters) => {
            filtered_page(provider, &filters, page, page_size).await?
        }
        QueryIntent::RandomBrowse => {
            let found = dedupe_recipes(provider.get_multiple_random_meals(page_size).await?);
            (found, settings.random_total_items)
        }
    };

    debug!(
        "Page {} has {} recipes of {} total",
        page,
        recipes.len(),
        total_items
    );

    let recipes = match query.locale.as_deref() {
        Some(locale) if !is_default_locale(Some(locale), &settings.default_locale) => {
            translate_page(cache, recipes, locale).await?
        }
        _ => recipes,
    };

    Ok(RecipePage {
        recipes,
        total_items,
    })
}

async fn filtered_page(
    provider: &dyn MealProvider,
    filters: &RecipeFilters,
    page: usize,
    page_size: usize,
) -> Result<(Vec<Recipe>, usize), FinderError> {
    let offset = page_offset(page, page_size);
    let result = provider.filter_by_multiple(filters, offset).await?;
    let found = dedupe_recipes(result.recipes);

    if provider.server_paginates(filters) {
        debug!("{} paginated {:?} server-side", provider.provider_name(), filters);
        Ok((found, result.total_count))
    } else {
        let total = found.len();
        Ok((page_slice(found, page, page_size), total))
    }
}

async fn translate_page(
    cache: &dyn TranslationCache,
    recipes: Vec<Recipe>,
    locale: &str,
) -> Result<Vec<Recipe>, FinderError> {
    let mut translated = Vec::with_capacity(recipes.len());
    for recipe in recipes {
        translated.push(translate_recipe(cache, recipe, locale).await?);
    }
    Ok(translated)
}
