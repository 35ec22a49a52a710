use thiserror::Error;

/// Errors that can occur while talking to meal providers or the translation cache
#[derive(Error, Debug)]
pub enum FinderError {
    /// HTTP request to a provider or the cache failed
    #[error("Failed to fetch: {0}")]
    FetchError(#[from] reqwest::Error),

    /// Provider answered with something we could not use
    #[error("Provider error: {0}")]
    ProviderError(String),

    /// Failed to decode a JSON payload
    #[error("Failed to parse response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Translation cache lookup failed
    #[error("Translation lookup failed: {0}")]
    TranslationError(String),

    /// Builder configuration error
    #[error("Builder error: {0}")]
    BuilderError(String),

    /// Environment variable error
    #[error("Environment variable error: {0}")]
    EnvError(#[from] std::env::VarError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),
}
