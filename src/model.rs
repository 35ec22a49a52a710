use serde::{Deserialize, Serialize};

/// Number of recipes on one listing page
pub const PAGE_SIZE: usize = 24;

/// Reported total for random browsing, which has no fixed universe
pub const RANDOM_TOTAL_ITEMS: usize = 10000;

/// A recipe as normalized from any provider.
///
/// `id` is the identity of a recipe: two values with the same `id` are the same
/// recipe even if one of them is translated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub area: String,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ready_in_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,
}

impl Recipe {
    /// Recipes with an empty id cannot be deduplicated and are dropped
    pub fn has_id(&self) -> bool {
        !self.id.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    #[serde(default)]
    pub measure: String,
}

impl Ingredient {
    pub fn new(name: impl Into<String>, measure: impl Into<String>) -> Self {
        Ingredient {
            name: name.into(),
            measure: measure.into(),
        }
    }
}

/// Facets for filtered browsing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilters {
    pub category: Option<String>,
    pub area: Option<String>,
    pub diet: Option<String>,
}

impl RecipeFilters {
    /// Build filters, treating blank strings as absent
    pub fn new(category: Option<&str>, area: Option<&str>, diet: Option<&str>) -> Self {
        RecipeFilters {
            category: non_blank(category),
            area: non_blank(area),
            diet: non_blank(diet),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.area.is_none() && self.diet.is_none()
    }
}

/// What the caller asked for, in dispatch priority order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryIntent {
    FreeTextSearch(String),
    FilteredBrowse(RecipeFilters),
    RandomBrowse,
}

/// A listing request coming from the route layer
#[derive(Debug, Clone, Default)]
pub struct RecipeQuery {
    pub locale: Option<String>,
    pub search: Option<String>,
    pub category: Option<String>,
    pub area: Option<String>,
    pub diet: Option<String>,
    pub page: usize,
}

impl RecipeQuery {
    pub fn new() -> Self {
        RecipeQuery {
            page: 1,
            ..Default::default()
        }
    }

    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn search(mut self, query: impl Into<String>) -> Self {
        self.search = Some(query.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn area(mut self, area: impl Into<String>) -> Self {
        self.area = Some(area.into());
        self
    }

    pub fn diet(mut self, diet: impl Into<String>) -> Self {
        self.diet = Some(diet.into());
        self
    }

    pub fn page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    /// 1-based page number; 0 is read as the first page
    pub fn page_number(&self) -> usize {
        self.page.max(1)
    }

    /// Classify the request. Search wins over filters, filters win over random.
    pub fn intent(&self) -> QueryIntent {
        if let Some(query) = non_blank(self.search.as_deref()) {
            return QueryIntent::FreeTextSearch(query);
        }

        let filters = RecipeFilters::new(
            self.category.as_deref(),
            self.area.as_deref(),
            self.diet.as_deref(),
        );
        if filters.is_empty() {
            QueryIntent::RandomBrowse
        } else {
            QueryIntent::FilteredBrowse(filters)
        }
    }
}

/// A provider's answer to a filtered browse
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterPage {
    pub recipes: Vec<Recipe>,
    /// Size of the full matching set on the provider side
    pub total_count: usize,
}

/// One page of listing results handed back to the caller
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipePage {
    pub recipes: Vec<Recipe>,
    pub total_items: usize,
}

impl RecipePage {
    pub fn empty() -> Self {
        RecipePage::default()
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
