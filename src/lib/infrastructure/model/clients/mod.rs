//! Model clients

mod base;
pub(crate) mod gemini;
mod openai;

pub use base::{AuthScheme, HttpClientBase};
pub use gemini::GeminiClient;
pub use openai::OpenAIClient;
