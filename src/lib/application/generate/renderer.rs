use super::errors::GenerateError;
use crate::application::prompts::PromptTemplates;
use crate::constants::IMAGE_ROUTE_PREFIX;
use crate::domain::types::{ImageData, OutlinePage};
use crate::infrastructure::image::{ImageClient, ImageRequest};
use crate::infrastructure::storage::{OutputStore, PageImage};
use tracing::{info, warn};

/// A page image written to the output store
pub(super) struct RenderedPage {
    pub page: PageImage,
    pub image: ImageData,
}

/// Renders single pages of one task with a fixed provider and context.
pub(super) struct PageRenderer<'a> {
    pub client: &'a dyn ImageClient,
    pub store: &'a OutputStore,
    pub prompts: &'a PromptTemplates,
    pub task_id: &'a str,
    pub topic: &'a str,
    pub full_outline: &'a str,
    pub model: &'a str,
    pub aspect_ratio: &'a str,
    pub size: &'a str,
}

impl PageRenderer<'_> {
    pub async fn render(
        &self,
        page: &OutlinePage,
        references: &[ImageData],
    ) -> Result<RenderedPage, GenerateError> {
        let prompt = self.prompts.image_prompt(
            &page.content,
            page.page_type.as_str(),
            self.full_outline,
            self.topic,
        );
        let request = ImageRequest {
            prompt,
            model: self.model.to_string(),
            reference_images: references.to_vec(),
            aspect_ratio: self.aspect_ratio.to_string(),
            size: self.size.to_string(),
        };

        let image = match self.client.generate(request).await {
            Ok(generated) => generated.into_image_data(),
            Err(err) => {
                warn!(
                    task_id = self.task_id,
                    index = page.index,
                    error = %err,
                    "Page generation failed"
                );
                return Err(err.into());
            }
        };

        let filename = self.store.save(self.task_id, page.index, &image).await?;
        info!(
            task_id = self.task_id,
            index = page.index,
            page_type = page.page_type.as_str(),
            filename = filename.as_str(),
            "Page generated"
        );
        Ok(RenderedPage {
            page: PageImage {
                index: page.index,
                url: image_url(&filename),
                filename,
            },
            image,
        })
    }
}

pub fn image_url(filename: &str) -> String {
    format!("{IMAGE_ROUTE_PREFIX}/{filename}")
}
