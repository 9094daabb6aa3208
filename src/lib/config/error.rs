use super::provider::ProviderCategory;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when loading or validating provider configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config from {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config from {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to write config to {path:?}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("provider names in {path:?} must be strings")]
    InvalidProviderName { path: PathBuf },

    #[error("no {category} providers configured")]
    NoProvidersConfigured { category: ProviderCategory },

    #[error("active {category} provider '{provider}' not found (available: {available})")]
    ActiveProviderNotFound {
        category: ProviderCategory,
        provider: String,
        available: String,
    },

    #[error("{category} provider '{provider}' is not declared")]
    UnknownProvider {
        category: ProviderCategory,
        provider: String,
    },

    #[error("provider '{provider}' has no API key configured")]
    MissingApiKey { provider: String },
}

impl ConfigError {
    /// Short remediation hint shown to API callers
    pub fn user_message(&self) -> String {
        match self {
            ConfigError::ActiveProviderNotFound {
                category,
                provider,
                available,
            } => format!(
                "The active {category} provider '{provider}' is not declared. \
                 Available providers: {available}. Select one of them in the settings."
            ),
            ConfigError::MissingApiKey { provider } => format!(
                "Provider '{provider}' has no API key. Set api_key in its configuration \
                 or export the referenced environment variable."
            ),
            ConfigError::NoProvidersConfigured { category } => format!(
                "No {category} providers are configured. Add one to {}.",
                category.file_name()
            ),
            ConfigError::Parse { path, source } => format!(
                "Configuration file {} is not valid YAML: {source}. Check indentation and syntax.",
                path.display()
            ),
            other => other.to_string(),
        }
    }
}
