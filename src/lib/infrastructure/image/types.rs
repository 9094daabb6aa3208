//! Image request and result types

use crate::domain::types::{ImageData, extension_for};

/// Image generation request
#[derive(Debug, Clone)]
pub struct ImageRequest {
    pub prompt: String,
    pub model: String,
    /// Images the provider should keep the style of
    pub reference_images: Vec<ImageData>,
    pub aspect_ratio: String,
    pub size: String,
}

/// A generated image as returned by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl GeneratedImage {
    pub fn extension(&self) -> &'static str {
        extension_for(&self.mime_type)
    }

    pub fn into_image_data(self) -> ImageData {
        ImageData::new(self.mime_type, self.bytes)
    }
}

impl From<ImageData> for GeneratedImage {
    fn from(image: ImageData) -> Self {
        Self {
            bytes: image.bytes,
            mime_type: image.mime_type,
        }
    }
}
