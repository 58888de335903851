use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str) -> Result<String, TranslationError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TranslationError {
    #[error("translation api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("translation api returned an unexpected body: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Serialize)]
struct TranslationRequest<'a> {
    input: &'a str,
    to_lang: &'a str,
    model: &'a str,
    top_k: u32,
    top_p: f32,
    repetition_penalty: f32,
    temperature: f32,
}

#[derive(Deserialize)]
struct TranslationResponse {
    result: String,
}

/// Client for the Mesolitica public translation endpoint.
pub struct MesoliticaTranslator {
    client: reqwest::Client,
    api_url: String,
    to_lang: String,
    model: String,
}

impl MesoliticaTranslator {
    pub fn new(
        client: reqwest::Client,
        api_url: impl Into<String>,
        to_lang: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            to_lang: to_lang.into(),
            model: model.into(),
        }
    }
}

#[async_trait]
impl Translator for MesoliticaTranslator {
    async fn translate(&self, text: &str) -> Result<String, TranslationError> {
        // Greedy decoding: the same caption always yields the same translation.
        let payload = TranslationRequest {
            input: text,
            to_lang: &self.to_lang,
            model: &self.model,
            top_k: 1,
            top_p: 1.0,
            repetition_penalty: 1.1,
            temperature: 0.0,
        };

        tracing::debug!(to_lang = %self.to_lang, model = %self.model, "Sending text to translation API");

        let response = self
            .client
            .post(&self.api_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| TranslationError::ApiRequestFailed(format!("request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(TranslationError::ApiRequestFailed(format!(
                "status {}: {}",
                status,
                body.chars().take(500).collect::<String>()
            )));
        }

        let parsed: TranslationResponse = response
            .json()
            .await
            .map_err(|e| TranslationError::MalformedResponse(e.to_string()))?;

        tracing::info!(
            chars = parsed.result.chars().count(),
            "Translation completed"
        );

        Ok(parsed.result.trim().to_string())
    }
}
