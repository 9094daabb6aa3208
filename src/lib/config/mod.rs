pub mod app;
pub mod defaults;
pub mod env;
pub mod error;
pub mod loader;
pub mod provider;

pub use app::AppSettings;
pub use env::{Interpolated, interpolate_env};
pub use error::ConfigError;
pub use loader::{EnvFile, ensure_env_loaded, load_env_file, load_providers, set_active_provider};
pub use provider::{ProviderCategory, ProviderEntry, ProviderKind, ProvidersFile};
