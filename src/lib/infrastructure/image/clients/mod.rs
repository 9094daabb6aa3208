mod gemini;
mod openai;

pub use gemini::GeminiImageClient;
pub use openai::OpenAIImageClient;
