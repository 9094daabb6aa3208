//! Prompt templates
//!
//! Built-in templates are compiled in; a prompts directory may override
//! either file by name.

use crate::config::ConfigError;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, info};

pub const OUTLINE_PROMPT_FILE: &str = "outline_prompt.txt";
pub const IMAGE_PROMPT_FILE: &str = "image_prompt.txt";

const BUILTIN_OUTLINE: &str = include_str!("../../../prompts/outline_prompt.txt");
const BUILTIN_IMAGE: &str = include_str!("../../../prompts/image_prompt.txt");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplates {
    /// Placeholders: `{topic}`
    pub outline: String,
    /// Placeholders: `{page_content}`, `{page_type}`, `{full_outline}`, `{user_topic}`
    pub image: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PromptTemplates {
    pub fn builtin() -> Self {
        Self {
            outline: BUILTIN_OUTLINE.to_string(),
            image: BUILTIN_IMAGE.to_string(),
        }
    }

    /// Built-in templates with any files found in `dir` taking precedence.
    pub fn load(dir: Option<&Path>) -> Result<Self, ConfigError> {
        let mut templates = Self::builtin();
        let Some(dir) = dir else {
            return Ok(templates);
        };

        if let Some(outline) = read_override(dir, OUTLINE_PROMPT_FILE)? {
            templates.outline = outline;
        }
        if let Some(image) = read_override(dir, IMAGE_PROMPT_FILE)? {
            templates.image = image;
        }
        Ok(templates)
    }

    pub fn outline_prompt(&self, topic: &str) -> String {
        render(&self.outline, &[("topic", topic)])
    }

    pub fn image_prompt(
        &self,
        page_content: &str,
        page_type: &str,
        full_outline: &str,
        user_topic: &str,
    ) -> String {
        render(
            &self.image,
            &[
                ("page_content", page_content),
                ("page_type", page_type),
                ("full_outline", full_outline),
                ("user_topic", user_topic),
            ],
        )
    }
}

fn read_override(dir: &Path, name: &str) -> Result<Option<String>, ConfigError> {
    let path = dir.join(name);
    match fs::read_to_string(&path) {
        Ok(text) => {
            info!(path = %path.display(), "Using prompt template override");
            Ok(Some(text))
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "No prompt override, using built-in");
            Ok(None)
        }
        Err(source) => Err(ConfigError::Io { path, source }),
    }
}

/// Replace `{name}` placeholders in one pass.
///
/// Unknown placeholders and stray braces are kept as written, and
/// substituted values are never expanded again.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let replacement = after.find('}').and_then(|close| {
            let name = &after[..close];
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });
        match replacement {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
