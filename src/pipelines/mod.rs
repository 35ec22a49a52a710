pub mod pantry;
pub mod recipes;

use std::collections::HashSet;

use crate::model::{Recipe, PAGE_SIZE, RANDOM_TOTAL_ITEMS};

/// Knobs shared by the listing pipelines
#[derive(Debug, Clone)]
pub struct ListingSettings {
    /// Locale served without translation
    pub default_locale: String,
    pub page_size: usize,
    /// Total reported for random browsing
    pub random_total_items: usize,
}

impl Default for ListingSettings {
    fn default() -> Self {
        ListingSettings {
            default_locale: "en".to_string(),
            page_size: PAGE_SIZE,
            random_total_items: RANDOM_TOTAL_ITEMS,
        }
    }
}

/// Keep the first recipe for each id, in order. Recipes without an id are dropped.
pub fn dedupe_recipes(recipes: Vec<Recipe>) -> Vec<Recipe> {
    let mut seen = HashSet::new();
    recipes
        .into_iter()
        .filter(|recipe| recipe.has_id() && seen.insert(recipe.id.clone()))
        .collect()
}

/// Zero-based offset of a 1-based page. Saturates instead of overflowing.
pub fn page_offset(page: usize, page_size: usize) -> usize {
    page.saturating_sub(1).saturating_mul(page_size)
}

/// Slice `[(page-1)*size, page*size)` out of a complete result set
pub fn page_slice(recipes: Vec<Recipe>, page: usize, page_size: usize) -> Vec<Recipe> {
    let start = page_offset(page, page_size);
    recipes.into_iter().skip(start).take(page_size).collect()
}
