use super::error::ConfigError;
use super::loader::load_providers;
use super::provider::{ProviderCategory, ProvidersFile};
use crate::constants::{HISTORY_DIR, OUTPUT_DIR};
use std::path::{Path, PathBuf};

/// Runtime settings resolved from the command line
#[derive(Debug, Clone)]
pub struct AppSettings {
    /// Directory holding `text_providers.yaml` and `image_providers.yaml`
    pub config_dir: PathBuf,
    pub history_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Overrides for the built-in prompt templates
    pub prompts_dir: Option<PathBuf>,
    /// Pre-built frontend served at `/`
    pub static_dir: Option<PathBuf>,
    /// Allowed CORS origins; empty allows any origin
    pub cors_origins: Vec<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from("."),
            history_dir: PathBuf::from(HISTORY_DIR),
            output_dir: PathBuf::from(OUTPUT_DIR),
            prompts_dir: None,
            static_dir: None,
            cors_origins: Vec::new(),
        }
    }
}

impl AppSettings {
    /// Settings with every data directory placed under `root`
    pub fn rooted(root: &Path) -> Self {
        Self {
            config_dir: root.to_path_buf(),
            history_dir: root.join(HISTORY_DIR),
            output_dir: root.join(OUTPUT_DIR),
            ..Self::default()
        }
    }

    /// Load the text provider file. Re-read on every call so edits apply
    /// without a restart.
    pub fn text_providers(&self) -> Result<ProvidersFile, ConfigError> {
        load_providers(&self.config_dir, ProviderCategory::Text)
    }

    pub fn image_providers(&self) -> Result<ProvidersFile, ConfigError> {
        load_providers(&self.config_dir, ProviderCategory::Image)
    }

    pub fn providers(&self, category: ProviderCategory) -> Result<ProvidersFile, ConfigError> {
        load_providers(&self.config_dir, category)
    }
}
