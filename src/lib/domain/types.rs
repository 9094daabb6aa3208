use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Error)]
pub enum ImageDecodeError {
    #[error("image data is empty")]
    Empty,
    #[error("malformed data URL")]
    InvalidDataUrl,
    #[error("invalid base64 image data: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Raw image bytes with their MIME type
#[derive(Clone, PartialEq, Eq)]
pub struct ImageData {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageData")
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ImageData {
    pub fn new(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Wrap bytes, detecting the MIME type from their signature
    pub fn sniffed(bytes: Vec<u8>) -> Self {
        let mime_type = sniff_mime(&bytes).to_string();
        Self { mime_type, bytes }
    }

    /// Decode plain base64 or a `data:<mime>;base64,<payload>` URL.
    pub fn from_base64(input: &str) -> Result<Self, ImageDecodeError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ImageDecodeError::Empty);
        }

        let (declared_mime, payload) = match input.strip_prefix("data:") {
            Some(rest) => {
                let (header, payload) = rest
                    .split_once(',')
                    .ok_or(ImageDecodeError::InvalidDataUrl)?;
                let mime = header
                    .strip_suffix(";base64")
                    .ok_or(ImageDecodeError::InvalidDataUrl)?;
                (Some(mime).filter(|m| !m.is_empty()), payload)
            }
            None => (None, input),
        };

        let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = STANDARD.decode(compact)?;
        if bytes.is_empty() {
            return Err(ImageDecodeError::Empty);
        }

        Ok(match declared_mime {
            Some(mime) => Self::new(mime, bytes),
            None => Self::sniffed(bytes),
        })
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }
}

/// Detect common image formats from magic bytes; defaults to PNG.
pub fn sniff_mime(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        "image/png"
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg"
    } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        "image/webp"
    } else if bytes.starts_with(b"GIF8") {
        "image/gif"
    } else {
        "image/png"
    }
}

/// File extension for an image MIME type
pub fn extension_for(mime_type: &str) -> &'static str {
    match mime_type {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "png",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    Text(String),
    Image(ImageData),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub parts: Vec<ContentPart>,
}

impl ChatMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            parts: vec![ContentPart::Text(content.into())],
        }
    }

    /// Text followed by images, in order
    pub fn with_images(
        role: MessageRole,
        content: impl Into<String>,
        images: Vec<ImageData>,
    ) -> Self {
        let mut parts = vec![ContentPart::Text(content.into())];
        parts.extend(images.into_iter().map(ContentPart::Image));
        Self { role, parts }
    }

    pub fn has_images(&self) -> bool {
        self.parts
            .iter()
            .any(|part| matches!(part, ContentPart::Image(_)))
    }

    /// Concatenated text parts
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                ContentPart::Text(text) => Some(text.as_str()),
                ContentPart::Image(_) => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Role of a page within a post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum PageType {
    Cover,
    #[default]
    Content,
    Summary,
}

impl PageType {
    /// Map an outline tag such as `[封面]` or `[Cover]` to a page type.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "封面" | "cover" => PageType::Cover,
            "总结" | "summary" => PageType::Summary,
            _ => PageType::Content,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PageType::Cover => "cover",
            PageType::Content => "content",
            PageType::Summary => "summary",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OutlinePage {
    pub index: usize,
    #[serde(rename = "type", default)]
    pub page_type: PageType,
    pub content: String,
}

impl OutlinePage {
    pub fn new(index: usize, page_type: PageType, content: impl Into<String>) -> Self {
        Self {
            index,
            page_type,
            content: content.into(),
        }
    }
}
