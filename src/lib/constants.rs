//! Application constants
//!
//! Single source of truth for paths, endpoints and limits.

/// Text provider configuration file name
pub const TEXT_PROVIDERS_FILE: &str = "text_providers.yaml";

/// Image provider configuration file name
pub const IMAGE_PROVIDERS_FILE: &str = "image_providers.yaml";

/// Default environment file path
pub const ENV_PATH: &str = ".env";

/// Default REST bind address
pub const DEFAULT_BIND: &str = "0.0.0.0:12398";

/// Default directory for history records
pub const HISTORY_DIR: &str = "history";

/// Default directory for generated images
pub const OUTPUT_DIR: &str = "output";

pub const DEFAULT_OPENAI_ENDPOINT: &str = "https://api.openai.com";
pub const DEFAULT_OPENAI_CHAT_PATH: &str = "/v1/chat/completions";
pub const DEFAULT_OPENAI_IMAGE_PATH: &str = "/v1/images/generations";

pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
/// Default Gemini API path (fallback when not specified in config)
pub const DEFAULT_GEMINI_API_PATH: &str = "v1beta/models";

pub const DEFAULT_TEXT_MODEL: &str = "gpt-4o";
pub const DEFAULT_TEMPERATURE: f32 = 1.0;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 8000;

pub const DEFAULT_GEMINI_IMAGE_MODEL: &str = "gemini-2.0-flash-exp-image-generation";
pub const DEFAULT_OPENAI_IMAGE_MODEL: &str = "gpt-image-1";
pub const DEFAULT_ASPECT_RATIO: &str = "3:4";
pub const DEFAULT_IMAGE_SIZE: &str = "1024x1536";

/// Upstream request timeout in seconds
pub const REQUEST_TIMEOUT_SECS: u64 = 300;

/// Upstream error bodies are cut to this many characters
pub const ERROR_BODY_LIMIT: usize = 500;

/// Route prefix generated images are served from
pub const IMAGE_ROUTE_PREFIX: &str = "/api/images";

/// Request body limit; reference images travel as base64
pub const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

/// Pages rendered at once when a provider allows high concurrency
pub const MAX_CONCURRENT_PAGES: usize = 8;
