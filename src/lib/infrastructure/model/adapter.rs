//! Message adapters - convert between different API formats

use crate::domain::types::{ChatMessage, ContentPart, ImageData, MessageRole};
use serde_json::{Value, json};

/// Adapter for converting messages to different API formats
pub struct MessageAdapter;

impl MessageAdapter {
    /// Convert messages to OpenAI-style format.
    ///
    /// Text-only messages keep the plain `"content": "..."` form; messages
    /// with images use the multimodal array form with data URLs.
    pub fn to_openai_format(messages: &[ChatMessage]) -> Vec<Value> {
        messages
            .iter()
            .map(|msg| {
                let content = if msg.has_images() {
                    Value::Array(msg.parts.iter().map(openai_part).collect())
                } else {
                    Value::String(msg.text())
                };
                json!({
                    "role": msg.role.as_str(),
                    "content": content
                })
            })
            .collect()
    }

    /// Convert messages to Gemini format
    /// Returns: (system_instruction_text, contents)
    pub fn to_gemini_format(messages: &[ChatMessage]) -> (Option<String>, Vec<Value>) {
        let mut system_parts = Vec::new();
        let mut contents = Vec::new();

        for message in messages {
            match message.role {
                MessageRole::System => system_parts.push(message.text()),
                MessageRole::User => contents.push(json!({
                    "role": "user",
                    "parts": Self::gemini_parts(&message.parts)
                })),
                MessageRole::Assistant => contents.push(json!({
                    "role": "model",
                    "parts": Self::gemini_parts(&message.parts)
                })),
            }
        }

        let system_instruction = if system_parts.is_empty() {
            None
        } else {
            Some(system_parts.join("\n\n"))
        };

        (system_instruction, contents)
    }

    /// Gemini `parts` array for text and inline images
    pub fn gemini_parts(parts: &[ContentPart]) -> Vec<Value> {
        parts
            .iter()
            .map(|part| match part {
                ContentPart::Text(text) => json!({ "text": text }),
                ContentPart::Image(image) => gemini_inline_image(image),
            })
            .collect()
    }
}

fn openai_part(part: &ContentPart) -> Value {
    match part {
        ContentPart::Text(text) => json!({ "type": "text", "text": text }),
        ContentPart::Image(image) => json!({
            "type": "image_url",
            "image_url": { "url": image.to_data_url() }
        }),
    }
}

pub(crate) fn gemini_inline_image(image: &ImageData) -> Value {
    json!({
        "inline_data": {
            "mime_type": image.mime_type,
            "data": image.to_base64()
        }
    })
}
