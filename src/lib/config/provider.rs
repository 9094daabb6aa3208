//! # Provider Configuration
//!
//! Types for the text and image provider files. Each file declares an
//! ordered `providers` mapping and names one of them `active_provider`.
//!
//! ## Provider Types
//!
//! | Type | API format |
//! |------|------------|
//! | `google_gemini`, `gemini`, `google`, `google_genai` | Google Gemini `generateContent` |
//! | `openai`, `openai_compatible`, `image_api`, anything else | OpenAI-compatible |

use super::error::ConfigError;
use crate::constants::{IMAGE_PROVIDERS_FILE, TEXT_PROVIDERS_FILE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;
use utoipa::ToSchema;

/// Which provider file a configuration belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProviderCategory {
    Text,
    Image,
}

impl ProviderCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderCategory::Text => "text",
            ProviderCategory::Image => "image",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            ProviderCategory::Text => TEXT_PROVIDERS_FILE,
            ProviderCategory::Image => IMAGE_PROVIDERS_FILE,
        }
    }

    /// Provider name used when the file has no `active_provider`
    pub fn default_active(self) -> &'static str {
        match self {
            ProviderCategory::Text => "google_gemini",
            ProviderCategory::Image => "google_genai",
        }
    }
}

impl fmt::Display for ProviderCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// API format spoken by a provider, inferred from its `type` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAiCompatible,
    GoogleGemini,
}

impl ProviderKind {
    /// Infer the API format (case-insensitive). Unknown types are treated as
    /// OpenAI-compatible.
    pub fn from_type(provider_type: &str) -> Self {
        match provider_type.trim().to_lowercase().as_str() {
            "google_gemini" | "gemini" | "google" | "google_genai" | "google-ai" => {
                ProviderKind::GoogleGemini
            }
            _ => ProviderKind::OpenAiCompatible,
        }
    }
}

/// One declared provider, after environment interpolation.
///
/// # Example
///
/// ```yaml
/// providers:
///   openai_compat:
///     type: openai_compatible
///     api_key: ${TEXT_API_KEY}
///     base_url: https://api.openai.com
///     model: gpt-4o
/// ```
#[derive(Debug, Clone, Serialize, PartialEq, ToSchema)]
pub struct ProviderEntry {
    /// Key of the entry in the `providers` mapping
    pub name: String,
    /// Raw `type` value
    #[serde(rename = "type")]
    pub provider_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Path override appended to `base_url`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    pub supports_images: bool,
    pub high_concurrency: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    /// Provider-specific options not covered above
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    #[schema(value_type = Object)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct RawProviderEntry {
    #[serde(rename = "type", default)]
    provider_type: String,
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    base_url: Option<String>,
    #[serde(default)]
    api_path: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    temperature: Option<f32>,
    #[serde(default)]
    max_output_tokens: Option<u32>,
    #[serde(default)]
    supports_images: Option<bool>,
    #[serde(default)]
    high_concurrency: Option<bool>,
    #[serde(default)]
    aspect_ratio: Option<String>,
    #[serde(default)]
    size: Option<String>,
    #[serde(flatten)]
    extra: BTreeMap<String, serde_yaml::Value>,
}

impl ProviderEntry {
    pub(super) fn from_raw(name: String, raw: RawProviderEntry) -> Self {
        let non_blank = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        Self {
            name,
            provider_type: raw.provider_type,
            api_key: non_blank(raw.api_key),
            base_url: non_blank(raw.base_url),
            api_path: non_blank(raw.api_path),
            model: non_blank(raw.model),
            temperature: raw.temperature,
            max_output_tokens: raw.max_output_tokens,
            supports_images: raw.supports_images.unwrap_or(true),
            high_concurrency: raw.high_concurrency.unwrap_or(false),
            aspect_ratio: non_blank(raw.aspect_ratio),
            size: non_blank(raw.size),
            extra: raw.extra,
        }
    }

    pub fn kind(&self) -> ProviderKind {
        ProviderKind::from_type(&self.provider_type)
    }

    pub fn is_gemini(&self) -> bool {
        self.kind() == ProviderKind::GoogleGemini
    }

    /// API key, or an error when it is absent or blank.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ConfigError::MissingApiKey {
                provider: self.name.clone(),
            })
    }

    /// String option from the provider-specific extras
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(serde_yaml::Value::as_str)
    }

    /// Copy suitable for display with the API key masked.
    pub fn masked(&self) -> Self {
        let mut copy = self.clone();
        copy.api_key = self.api_key.as_deref().map(mask_key);
        copy
    }
}

/// Mask an API key keeping four characters at each end.
///
/// # Examples
///
/// ```
/// use postcraft::config::provider::mask_key;
///
/// assert_eq!(mask_key("sk-1234567890abcdef"), "sk-1****cdef");
/// assert_eq!(mask_key("short"), "****");
/// ```
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}****{tail}")
}

/// A parsed provider file.
#[derive(Debug, Clone, Serialize, PartialEq, ToSchema)]
pub struct ProvidersFile {
    pub category: ProviderCategory,
    pub active_provider: String,
    /// Providers in declaration order
    pub providers: Vec<ProviderEntry>,
}

impl ProvidersFile {
    pub fn get(&self, name: &str) -> Option<&ProviderEntry> {
        self.providers.iter().find(|entry| entry.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.providers.iter().map(|entry| entry.name.as_str()).collect()
    }

    /// The provider named by `active_provider`.
    pub fn active(&self) -> Result<&ProviderEntry, ConfigError> {
        if self.providers.is_empty() {
            return Err(ConfigError::NoProvidersConfigured {
                category: self.category,
            });
        }
        self.get(&self.active_provider)
            .ok_or_else(|| ConfigError::ActiveProviderNotFound {
                category: self.category,
                provider: self.active_provider.clone(),
                available: self.names().join(", "),
            })
    }

    /// Pick the provider for a request.
    ///
    /// Requests carrying images prefer the active provider when it accepts
    /// images, then the first declared provider that does. When none accepts
    /// images the active provider is used anyway.
    pub fn select(&self, needs_images: bool) -> Result<&ProviderEntry, ConfigError> {
        if !needs_images {
            return self.active();
        }
        if self.providers.is_empty() {
            return Err(ConfigError::NoProvidersConfigured {
                category: self.category,
            });
        }

        if let Some(active) = self.get(&self.active_provider) {
            if active.supports_images {
                return Ok(active);
            }
        }
        if let Some(entry) = self.providers.iter().find(|entry| entry.supports_images) {
            return Ok(entry);
        }

        warn!(
            category = %self.category,
            active = self.active_provider.as_str(),
            "No provider accepts images, using the active provider"
        );
        self.active()
    }

    /// Copy with every API key masked
    pub fn masked(&self) -> Self {
        Self {
            category: self.category,
            active_provider: self.active_provider.clone(),
            providers: self.providers.iter().map(ProviderEntry::masked).collect(),
        }
    }
}
