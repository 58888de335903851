use std::sync::Arc;

use crate::captioner::ImageCaptioner;
use crate::error::AppError;
use crate::image_upload::ImageUpload;
use crate::models::{BilingualAltText, Caption};
use crate::translator::Translator;

/// Chains the captioning and translation services into one alt-text result.
pub struct AltTextService {
    captioner: Arc<dyn ImageCaptioner>,
    translator: Arc<dyn Translator>,
    target_lang: String,
}

impl AltTextService {
    pub fn new(
        captioner: Arc<dyn ImageCaptioner>,
        translator: Arc<dyn Translator>,
        target_lang: impl Into<String>,
    ) -> Self {
        Self {
            captioner,
            translator,
            target_lang: target_lang.into(),
        }
    }

    #[tracing::instrument(skip_all, fields(bytes = image.data.len()))]
    pub async fn caption(&self, image: &ImageUpload, api_key: &str) -> Result<Caption, AppError> {
        let alt_text = self.captioner.caption(image, api_key).await?;
        Ok(Caption { alt_text })
    }

    #[tracing::instrument(skip_all, fields(to_lang = %self.target_lang))]
    pub async fn translate(&self, text: &str) -> Result<BilingualAltText, AppError> {
        let original = text.trim();
        if original.is_empty() {
            return Err(AppError::MissingText);
        }

        let translated = self.translator.translate(original).await?;
        Ok(BilingualAltText::new(
            original.to_string(),
            &self.target_lang,
            translated,
        ))
    }

    pub async fn generate(
        &self,
        image: &ImageUpload,
        api_key: &str,
    ) -> Result<BilingualAltText, AppError> {
        let caption = self.caption(image, api_key).await?;
        if caption.alt_text.is_empty() {
            return Err(AppError::Upstream(
                "captioning service returned an empty caption".to_string(),
            ));
        }
        self.translate(&caption.alt_text).await
    }
}
