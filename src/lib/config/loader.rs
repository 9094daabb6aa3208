use super::defaults;
use super::env::interpolate_value;
use super::error::ConfigError;
use super::provider::{ProviderCategory, ProviderEntry, ProvidersFile, RawProviderEntry};
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, info, warn};

static ENV_FILE: OnceLock<EnvFile> = OnceLock::new();

/// Raw provider file for deserialization from YAML
#[derive(Debug, Deserialize, Default)]
struct RawProvidersFile {
    #[serde(default)]
    active_provider: Option<String>,
    #[serde(default)]
    providers: Option<Mapping>,
}

/// What happened when reading the env file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvFile {
    Loaded,
    Missing,
    Invalid(String),
}

/// Loads the env file once per process. Call before logging is set up so
/// the file can carry `RUST_LOG`; the caller logs the outcome.
pub fn ensure_env_loaded(path: &Path) -> EnvFile {
    ENV_FILE.get_or_init(|| load_env_file(path)).clone()
}

/// Read `path` into the process environment without overriding
/// variables that are already set.
pub fn load_env_file(path: &Path) -> EnvFile {
    match dotenvy::from_path(path) {
        Ok(()) => EnvFile::Loaded,
        Err(err) if err.not_found() => EnvFile::Missing,
        Err(err) => EnvFile::Invalid(err.to_string()),
    }
}

/// Load one provider file from `dir`, falling back to the built-in
/// defaults when the file does not exist.
pub fn load_providers(
    dir: &Path,
    category: ProviderCategory,
) -> Result<ProvidersFile, ConfigError> {
    let path = dir.join(category.file_name());
    debug!(path = %path.display(), %category, "Reading provider configuration");

    match read_document(&path)? {
        Some(document) => build(category, document, &path),
        None => {
            warn!(path = %path.display(), %category, "Provider file not found, using defaults");
            let document = parse_document(defaults::document(category), &path)?;
            build(category, document, &path)
        }
    }
}

/// Switch `active_provider` in the provider file, keeping `${NAME}`
/// references as written.
pub fn set_active_provider(
    dir: &Path,
    category: ProviderCategory,
    provider: &str,
) -> Result<ProvidersFile, ConfigError> {
    let path = dir.join(category.file_name());
    let mut document = match read_document(&path)? {
        Some(document) => document,
        None => parse_document(defaults::document(category), &path)?,
    };

    let declared = document
        .get("providers")
        .and_then(Value::as_mapping)
        .is_some_and(|providers| providers.contains_key(provider));
    if !declared {
        return Err(ConfigError::UnknownProvider {
            category,
            provider: provider.to_string(),
        });
    }

    if let Some(map) = document.as_mapping_mut() {
        map.insert(
            Value::String("active_provider".to_string()),
            Value::String(provider.to_string()),
        );
    }

    let content = serde_yaml::to_string(&document).map_err(|source| ConfigError::Serialize {
        path: path.clone(),
        source,
    })?;
    write_file(&path, &content)?;
    info!(path = %path.display(), %category, provider, "Active provider updated");

    load_providers(dir, category)
}

fn read_document(path: &Path) -> Result<Option<Value>, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(source) if source.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    parse_document(&content, path).map(Some)
}

fn parse_document(content: &str, path: &Path) -> Result<Value, ConfigError> {
    if content.trim().is_empty() {
        return Ok(Value::Mapping(Mapping::new()));
    }
    let document: Value = serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(match document {
        Value::Null => Value::Mapping(Mapping::new()),
        other => other,
    })
}

fn build(
    category: ProviderCategory,
    mut document: Value,
    path: &Path,
) -> Result<ProvidersFile, ConfigError> {
    let mut missing = Vec::new();
    let mut lookup = |name: &str| env::var(name).ok();
    interpolate_value(&mut document, &mut lookup, &mut missing);
    for variable in &missing {
        warn!(
            variable = variable.as_str(),
            path = %path.display(),
            "Environment variable referenced in provider config is not set"
        );
    }

    let raw: RawProvidersFile =
        serde_yaml::from_value(document).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    let active_provider = raw
        .active_provider
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| category.default_active().to_string());

    let mut providers = Vec::new();
    for (key, value) in raw.providers.unwrap_or_default() {
        let name = key
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ConfigError::InvalidProviderName {
                path: path.to_path_buf(),
            })?;
        let value = match value {
            Value::Null => Value::Mapping(Mapping::new()),
            other => other,
        };
        let entry: RawProviderEntry =
            serde_yaml::from_value(value).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        providers.push(ProviderEntry::from_raw(name, entry));
    }

    debug!(
        %category,
        active = active_provider.as_str(),
        provider_count = providers.len(),
        "Provider configuration loaded"
    );

    Ok(ProvidersFile {
        category,
        active_provider,
        providers,
    })
}

fn write_file(path: &Path, content: &str) -> Result<(), ConfigError> {
    let io_error = |source: io::Error| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    let tmp: PathBuf = path.with_extension("yaml.tmp");
    fs::write(&tmp, content).map_err(io_error)?;
    fs::rename(&tmp, path).map_err(io_error)
}
