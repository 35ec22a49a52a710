//! Read-only lookup of pre-computed recipe translations.
//!
//! Nothing here translates text live: a cache miss means the recipe is served
//! in its original language.

mod supabase;

pub use supabase::SupabaseTranslationCache;

use async_trait::async_trait;
use log::debug;
use serde::Deserialize;
use std::collections::HashMap;

use crate::error::FinderError;
use crate::model::{Ingredient, Recipe};

/// A stored translation of one recipe into one locale
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CachedTranslation {
    pub recipe_id: String,
    pub locale: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub ingredients: Option<Vec<Ingredient>>,
}

#[async_trait]
pub trait TranslationCache: Send + Sync {
    /// Get the backend name (e.g., "supabase")
    fn cache_name(&self) -> &str;

    /// Cached translation of one recipe, if any
    async fn lookup(
        &self,
        recipe_id: &str,
        locale: &str,
    ) -> Result<Option<CachedTranslation>, FinderError>;

    /// Cached translations for many recipes in a single query, keyed by recipe id
    async fn lookup_many(
        &self,
        recipe_ids: &[String],
        locale: &str,
    ) -> Result<HashMap<String, CachedTranslation>, FinderError>;
}

/// Cache used when translations are not configured. Every lookup misses.
pub struct NoTranslationCache;

#[async_trait]
impl TranslationCache for NoTranslationCache {
    fn cache_name(&self) -> &str {
        "none"
    }

    async fn lookup(
        &self,
        _recipe_id: &str,
        _locale: &str,
    ) -> Result<Option<CachedTranslation>, FinderError> {
        Ok(None)
    }

    async fn lookup_many(
        &self,
        _recipe_ids: &[String],
        _locale: &str,
    ) -> Result<HashMap<String, CachedTranslation>, FinderError> {
        Ok(HashMap::new())
    }
}

/// True when `locale` is served untranslated: absent, blank, or the same
/// primary language as `default_locale` ("en", "EN", "en-US").
pub fn is_default_locale(locale: Option<&str>, default_locale: &str) -> bool {
    match locale.map(str::trim).filter(|l| !l.is_empty()) {
        None => true,
        Some(locale) => primary_subtag(locale).eq_ignore_ascii_case(primary_subtag(default_locale)),
    }
}

fn primary_subtag(locale: &str) -> &str {
    locale.split(['-', '_']).next().unwrap_or(locale)
}

/// Apply the cached translation of a single recipe.
///
/// A hit only counts when it carries non-empty instructions; it then replaces
/// name, instructions and (when cached) ingredients. Everything else, and any
/// miss, leaves the recipe as it was.
pub async fn translate_recipe(
    cache: &dyn TranslationCache,
    recipe: Recipe,
    locale: &str,
) -> Result<Recipe, FinderError> {
    let Some(cached) = cache.lookup(&recipe.id, locale).await? else {
        debug!("No {} translation cached for recipe {}", locale, recipe.id);
        return Ok(recipe);
    };

    let instructions = match cached.instructions {
        Some(instructions) if !instructions.trim().is_empty() => instructions,
        _ => return Ok(recipe),
    };

    let ingredients = match cached.ingredients {
        Some(ingredients) if !ingredients.is_empty() => ingredients,
        _ => recipe.ingredients.clone(),
    };

    Ok(Recipe {
        name: if cached.name.is_empty() {
            recipe.name.clone()
        } else {
            cached.name
        },
        instructions,
        ingredients,
        ..recipe
    })
}

/// Apply cached translations to a list with one batched lookup.
///
/// Only the name is replaced; list views never show instructions. Length and
/// order are preserved.
pub async fn translate_recipes_list(
    cache: &dyn TranslationCache,
    recipes: Vec<Recipe>,
    locale: &str,
) -> Result<Vec<Recipe>, FinderError> {
    if recipes.is_empty() {
        return Ok(recipes);
    }

    let ids: Vec<String> = recipes.iter().map(|r| r.id.clone()).collect();
    let mut cached = cache.lookup_many(&ids, locale).await?;
    debug!(
        "{} of {} recipes have a cached {} translation",
        cached.len(),
        recipes.len(),
        locale
    );

    Ok(recipes
        .into_iter()
        .map(|recipe| match cached.remove(&recipe.id) {
            Some(translation) if !translation.name.is_empty() => Recipe {
                name: translation.name,
                ..recipe
            },
            _ => recipe,
        })
        .collect())
}
