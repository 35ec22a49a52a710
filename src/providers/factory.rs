use log::info;
use std::time::Duration;

use crate::config::{FinderConfig, ProviderConfig};
use crate::error::FinderError;
use crate::providers::{CompositeProvider, MealDbProvider, MealProvider, SpoonacularProvider};

pub struct ProviderFactory;

impl ProviderFactory {
    /// Create a provider instance from configuration
    pub fn create(
        provider_name: &str,
        config: &ProviderConfig,
        finder: &FinderConfig,
    ) -> Result<Box<dyn MealProvider>, FinderError> {
        // Validate that provider is enabled
        if !config.enabled {
            return Err(FinderError::ProviderError(format!(
                "Provider '{}' is not enabled in configuration",
                provider_name
            )));
        }

        let timeout = Duration::from_secs(finder.timeout);
        match provider_name {
            "mealdb" => Ok(Box::new(MealDbProvider::new(config, timeout)?)),
            "spoonacular" => Ok(Box::new(
                SpoonacularProvider::new(config, timeout)?.with_page_size(finder.page_size),
            )),
            _ => Err(FinderError::ProviderError(format!(
                "Unknown provider: {}",
                provider_name
            ))),
        }
    }

    /// Build the routing provider: TheMealDB as primary, Spoonacular when enabled
    pub fn from_config(config: &FinderConfig) -> Result<Box<dyn MealProvider>, FinderError> {
        let primary_config = config.enabled_provider("mealdb").ok_or_else(|| {
            FinderError::ProviderError("Provider 'mealdb' must be enabled".to_string())
        })?;
        let primary = Self::create("mealdb", primary_config, config)?;

        let secondary = match config.enabled_provider("spoonacular") {
            Some(spoonacular) => {
                info!("Spoonacular enabled for diet filters and pantry search");
                Some(Self::create("spoonacular", spoonacular, config)?)
            }
            None => None,
        };

        Ok(Box::new(CompositeProvider::new(primary, secondary)))
    }

    /// List all available provider names
    pub fn available_providers() -> Vec<&'static str> {
        vec!["mealdb", "spoonacular"]
    }
}
