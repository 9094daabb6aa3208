pub mod application;
pub mod cli;
pub mod config;
pub mod constants;
pub mod domain;
pub mod infrastructure;

pub use application::{generate, outline, prompts};
pub use cli::Cli;
pub use config::{AppSettings, ConfigError};
pub use domain::types;
pub use infrastructure::{image, model, server, storage};

use config::{EnvFile, ProviderCategory};
use std::error::Error;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

pub async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let env_file = config::ensure_env_loaded(&cli.env_file);
    init_tracing();
    info!(version = env!("CARGO_PKG_VERSION"), "Starting postcraft");
    debug!(?cli, "CLI arguments parsed");

    let path = cli.env_file.display();
    match env_file {
        EnvFile::Loaded => info!(%path, "Loaded environment file"),
        EnvFile::Missing => debug!(%path, "No environment file found"),
        EnvFile::Invalid(err) => warn!(%path, %err, "Failed to load environment file"),
    }
    let settings = cli.settings();

    // Report configuration problems at startup; requests re-read the files.
    for category in [ProviderCategory::Text, ProviderCategory::Image] {
        match settings.providers(category).and_then(|file| {
            let active = file.active()?.name.clone();
            Ok((active, file.providers.len()))
        }) {
            Ok((active, count)) => info!(
                %category,
                active = active.as_str(),
                providers = count,
                "Provider configuration loaded"
            ),
            Err(err) => warn!(%category, error = %err, "Provider configuration is not usable yet"),
        }
    }

    info!(addr = %cli.addr, "Starting REST server");
    server::serve(settings, cli.addr).await?;
    info!("Server stopped");
    Ok(())
}

fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_level(true)
            .init();
    });
}
