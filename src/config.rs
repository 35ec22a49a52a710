use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;

use crate::model::{PAGE_SIZE, RANDOM_TOTAL_ITEMS};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct FinderConfig {
    /// Locale that is served untranslated
    #[serde(default = "default_locale")]
    pub default_locale: String,
    /// Recipes per listing page
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Total reported for random browsing
    #[serde(default = "default_random_total_items")]
    pub random_total_items: usize,
    /// Map of provider name to provider configuration
    #[serde(default = "default_providers")]
    pub providers: HashMap<String, ProviderConfig>,
    /// Translation cache configuration
    #[serde(default)]
    pub translations: TranslationConfig,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

/// Configuration for a specific meal provider
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ProviderConfig {
    /// Whether this provider is enabled
    pub enabled: bool,
    /// API key (can also be set via environment variable)
    pub api_key: Option<String>,
    /// Base URL for the API endpoint (for proxies and tests)
    pub base_url: Option<String>,
}

/// Configuration for the Supabase-backed translation cache
#[derive(Debug, Deserialize, Clone)]
pub struct TranslationConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Project URL, e.g. https://xyz.supabase.co
    pub url: Option<String>,
    /// Anon or service key
    pub api_key: Option<String>,
    /// Table holding cached translations
    #[serde(default = "default_table")]
    pub table: String,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: None,
            api_key: None,
            table: default_table(),
        }
    }
}

fn default_locale() -> String {
    "en".to_string()
}

fn default_page_size() -> usize {
    PAGE_SIZE
}

fn default_random_total_items() -> usize {
    RANDOM_TOTAL_ITEMS
}

fn default_providers() -> HashMap<String, ProviderConfig> {
    let mut providers = HashMap::new();
    providers.insert(
        "mealdb".to_string(),
        ProviderConfig {
            enabled: true,
            ..Default::default()
        },
    );
    providers
}

fn default_table() -> String {
    "recipe_translations".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            default_locale: default_locale(),
            page_size: default_page_size(),
            random_total_items: default_random_total_items(),
            providers: default_providers(),
            translations: TranslationConfig::default(),
            timeout: default_timeout(),
        }
    }
}

impl FinderConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with MEALFINDER__ prefix
    /// 2. mealfinder.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: MEALFINDER__PROVIDERS__SPOONACULAR__API_KEY
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }

    /// Returns the provider section if present and enabled
    pub fn enabled_provider(&self, name: &str) -> Option<&ProviderConfig> {
        self.providers.get(name).filter(|p| p.enabled)
    }
}

/// Load configuration from file and environment variables
pub fn load_config() -> Result<FinderConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("mealfinder").required(false))
        // Use double underscore for nested: MEALFINDER__TRANSLATIONS__URL
        .add_source(
            Environment::with_prefix("MEALFINDER")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}
