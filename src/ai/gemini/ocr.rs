use super::client::GeminiHttpClient;
use super::types::{Content, GenerateContentResponse, InlineData, Part};
use crate::ai::TextExtractionService;
use crate::models::PoemImage;
use crate::{prompts, Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct OcrRequest {
    contents: Vec<Content>,
}

pub struct GeminiOcrClient {
    http: GeminiHttpClient,
}

impl GeminiOcrClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(api_key, model, reqwest::Client::new())
    }

    pub fn new_with_client(api_key: String, model: String, client: reqwest::Client) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(api_key, model, Duration::from_secs(30), client),
        }
    }
}

#[cfg(test)]
super::impl_with_gemini_base_url!(GeminiOcrClient);

#[async_trait]
impl TextExtractionService for GeminiOcrClient {
    async fn extract_text(&self, image: &PoemImage) -> Result<String> {
        tracing::debug!(
            "Extracting poem text from image ({} bytes, {}) via Gemini",
            image.data.len(),
            image.mime_type
        );

        use base64::Engine as _;
        let base64_image = base64::engine::general_purpose::STANDARD.encode(&image.data);

        let request = OcrRequest {
            contents: vec![Content::user(vec![
                Part::Text {
                    text: prompts::OCR_EXTRACTION.to_string(),
                },
                Part::InlineData {
                    inline_data: InlineData {
                        mime_type: image.mime_type.clone(),
                        data: base64_image,
                    },
                },
            ])],
        };

        let response: GenerateContentResponse = self.http.generate_content(&request).await?;

        let text = response
            .first_text()
            .ok_or_else(|| Error::AiProvider("No text in Gemini OCR response".to_string()))?;

        let extracted = text.trim().to_string();
        tracing::info!("Gemini OCR extracted {} chars", extracted.len());

        Ok(extracted)
    }
}
