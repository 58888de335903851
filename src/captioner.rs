use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::image_upload::ImageUpload;

#[async_trait]
pub trait ImageCaptioner: Send + Sync {
    async fn caption(&self, image: &ImageUpload, api_key: &str) -> Result<String, CaptionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum CaptionError {
    #[error("captioning api rejected the credentials")]
    Unauthorized,
    #[error("captioning api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("captioning api returned an unexpected body: {0}")]
    MalformedResponse(String),
}

#[derive(Deserialize)]
struct GeneratedText {
    generated_text: String,
}

/// Image-to-text through the Hugging Face inference router.
pub struct HuggingFaceCaptioner {
    client: reqwest::Client,
    api_url: String,
}

impl HuggingFaceCaptioner {
    pub fn new(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into(),
        }
    }
}

#[async_trait]
impl ImageCaptioner for HuggingFaceCaptioner {
    async fn caption(&self, image: &ImageUpload, api_key: &str) -> Result<String, CaptionError> {
        tracing::debug!(
            bytes = image.data.len(),
            content_type = image.content_type,
            "Sending image to captioning API"
        );

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(api_key)
            .header(CONTENT_TYPE, image.content_type)
            .body(image.data.clone())
            .send()
            .await
            .map_err(|e| CaptionError::ApiRequestFailed(format!("request: {}", e)))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(CaptionError::Unauthorized);
        }

        let body = response
            .text()
            .await
            .map_err(|e| CaptionError::ApiRequestFailed(format!("body: {}", e)))?;

        if !status.is_success() {
            return Err(CaptionError::ApiRequestFailed(format!(
                "status {}: {}",
                status,
                body.chars().take(500).collect::<String>()
            )));
        }

        let results: Vec<GeneratedText> = serde_json::from_str(&body)
            .map_err(|e| CaptionError::MalformedResponse(e.to_string()))?;

        let caption = results
            .into_iter()
            .next()
            .map(|r| r.generated_text.trim().to_string())
            .ok_or_else(|| CaptionError::MalformedResponse("empty result list".to_string()))?;

        tracing::info!(chars = caption.chars().count(), "Caption generated");

        Ok(caption)
    }
}
