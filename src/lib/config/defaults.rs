//! Built-in provider files used when a YAML file is absent.

use super::provider::ProviderCategory;

pub const DEFAULT_TEXT_PROVIDERS: &str = r#"
active_provider: google_gemini
providers:
  google_gemini:
    type: google_gemini
    api_key: ${GEMINI_API_KEY}
    model: gemini-2.0-flash-exp
    temperature: 1.0
    max_output_tokens: 8000
"#;

pub const DEFAULT_IMAGE_PROVIDERS: &str = r#"
active_provider: google_genai
providers:
  google_genai:
    type: google_genai
    api_key: ${GEMINI_API_KEY}
    model: gemini-2.0-flash-exp-image-generation
    aspect_ratio: "3:4"
    high_concurrency: false
"#;

pub fn document(category: ProviderCategory) -> &'static str {
    match category {
        ProviderCategory::Text => DEFAULT_TEXT_PROVIDERS,
        ProviderCategory::Image => DEFAULT_IMAGE_PROVIDERS,
    }
}
