use thiserror::Error;

use crate::core::config::ConfigError;
use crate::core::errors::ProviderError;

#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("Missing required secret: {0}")]
    MissingSecret(&'static str),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to load vector index: {0}")]
    Index(#[source] ProviderError),

    #[error("Failed to construct API client: {0}")]
    Client(#[source] ProviderError),
}
