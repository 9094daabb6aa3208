use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use crate::config::AppSettings;
use crate::constants::{DEFAULT_BIND, ENV_PATH, HISTORY_DIR, OUTPUT_DIR};

#[derive(Parser, Debug)]
#[command(
    name = "postcraft",
    version,
    about = "Outline and image post generation backed by configurable AI providers"
)]
pub struct Cli {
    /// Address the REST server binds to
    #[arg(long, default_value = DEFAULT_BIND)]
    pub addr: SocketAddr,
    /// Directory holding text_providers.yaml and image_providers.yaml
    #[arg(long, default_value = ".")]
    pub config_dir: PathBuf,
    #[arg(long, default_value = HISTORY_DIR)]
    pub history_dir: PathBuf,
    #[arg(long, default_value = OUTPUT_DIR)]
    pub output_dir: PathBuf,
    /// Directory with outline_prompt.txt / image_prompt.txt overrides
    #[arg(long)]
    pub prompts_dir: Option<PathBuf>,
    /// Built frontend to serve at `/`
    #[arg(long)]
    pub static_dir: Option<PathBuf>,
    /// Allowed CORS origin (repeatable); any origin when omitted
    #[arg(long = "cors-origin")]
    pub cors_origins: Vec<String>,
    #[arg(long, default_value = ENV_PATH)]
    pub env_file: PathBuf,
}

impl Cli {
    pub fn settings(&self) -> AppSettings {
        AppSettings {
            config_dir: self.config_dir.clone(),
            history_dir: self.history_dir.clone(),
            output_dir: self.output_dir.clone(),
            prompts_dir: self.prompts_dir.clone(),
            static_dir: self.static_dir.clone(),
            cors_origins: self.cors_origins.clone(),
        }
    }
}
