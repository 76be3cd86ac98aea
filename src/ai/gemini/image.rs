use super::client::GeminiHttpClient;
use crate::ai::ImageGenerationService;
use crate::models::PoemAnalysis;
use crate::{prompts, Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

// Portrait ratio suited to a poster or phone background.
const ASPECT_RATIO: &str = "9:16";
const OUTPUT_MIME_TYPE: &str = "image/jpeg";
const SAMPLE_COUNT: u32 = 1;

#[derive(Debug, Serialize)]
struct PredictRequest {
    instances: Vec<PromptInstance>,
    parameters: PredictParameters,
}

#[derive(Debug, Serialize)]
struct PromptInstance {
    prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictParameters {
    sample_count: u32,
    aspect_ratio: String,
    output_mime_type: String,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    bytes_base64_encoded: String,
    #[serde(default)]
    mime_type: Option<String>,
}

pub struct GeminiImageClient {
    http: GeminiHttpClient,
}

impl GeminiImageClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(api_key, model, reqwest::Client::new())
    }

    pub fn new_with_client(api_key: String, model: String, client: reqwest::Client) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(
                api_key,
                model,
                Duration::from_secs(120),
                client,
            ),
        }
    }

    fn build_prompt(analysis: &PoemAnalysis) -> String {
        prompts::render(
            prompts::BACKGROUND_IMAGE,
            &[
                ("art_style", &analysis.art_style),
                ("imagery", &analysis.imagery.join(", ")),
                ("atmosphere", &analysis.atmosphere),
                ("emotions", &analysis.emotions.join(", ")),
                ("placement", &analysis.text_placement.region_phrase()),
            ],
        )
    }
}

#[cfg(test)]
super::impl_with_gemini_base_url!(GeminiImageClient);

#[async_trait]
impl ImageGenerationService for GeminiImageClient {
    async fn generate_background(&self, analysis: &PoemAnalysis) -> Result<Vec<u8>> {
        let request = PredictRequest {
            instances: vec![PromptInstance {
                prompt: Self::build_prompt(analysis),
            }],
            parameters: PredictParameters {
                sample_count: SAMPLE_COUNT,
                aspect_ratio: ASPECT_RATIO.to_string(),
                output_mime_type: OUTPUT_MIME_TYPE.to_string(),
            },
        };

        let response: PredictResponse = self.http.predict(&request).await?;

        let prediction = response
            .predictions
            .first()
            .ok_or_else(|| Error::AiProvider("No image in Imagen response".to_string()))?;

        if let Some(mime_type) = &prediction.mime_type {
            tracing::debug!("Imagen returned image with mime_type: {}", mime_type);
        }

        use base64::Engine as _;
        base64::engine::general_purpose::STANDARD
            .decode(&prediction.bytes_base64_encoded)
            .map_err(|e| Error::AiProvider(format!("Failed to decode Imagen base64 image: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::gemini::test_support;
    use crate::models::{TextPlacement, TextStyle};
    use wiremock::matchers::body_string_contains;
    use wiremock::{MockServer, ResponseTemplate};

    const DEFAULT_MODEL: &str = "imagen-4.0-generate-001";

    fn make_client(server: &MockServer, api_key: &str) -> GeminiImageClient {
        GeminiImageClient::new(api_key.to_string(), DEFAULT_MODEL.to_string())
            .with_base_url(server.uri())
    }

    fn sample_analysis() -> PoemAnalysis {
        PoemAnalysis {
            title: "Night Walk".to_string(),
            author: "Anonymous".to_string(),
            body: "Down the lane\nunder stars".to_string(),
            emotions: vec!["calm".to_string(), "wistful".to_string()],
            imagery: vec!["starry night".to_string(), "quiet lane".to_string()],
            atmosphere: "dreamy".to_string(),
            art_style: "ethereal watercolor".to_string(),
            text_placement: TextPlacement::TopLeft,
            text_style: TextStyle::Glow,
        }
    }

    fn prediction_body(b64: &str) -> serde_json::Value {
        serde_json::json!({
            "predictions": [{
                "bytesBase64Encoded": b64,
                "mimeType": "image/jpeg"
            }]
        })
    }

    #[tokio::test]
    async fn test_generate_background_decodes_prediction_bytes() {
        let server = MockServer::start().await;

        use base64::Engine as _;
        let fake_image = vec![0xFF, 0xD8, 0xFF, 0xE0];
        let b64 = base64::engine::general_purpose::STANDARD.encode(&fake_image);

        test_support::post_path_regex(test_support::PREDICT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(200).set_body_json(prediction_body(&b64)))
            .mount(&server)
            .await;

        let client = make_client(&server, "key");

        let bytes = client
            .generate_background(&sample_analysis())
            .await
            .unwrap();
        assert_eq!(bytes, fake_image);
    }

    #[tokio::test]
    async fn test_request_carries_portrait_parameters_and_prompt_constraints() {
        let server = MockServer::start().await;

        use base64::Engine as _;
        let b64 = base64::engine::general_purpose::STANDARD.encode([0x00]);

        test_support::post_path_regex(test_support::PREDICT_PATH_REGEX)
            .and(body_string_contains("\"sampleCount\":1"))
            .and(body_string_contains("\"aspectRatio\":\"9:16\""))
            .and(body_string_contains("\"outputMimeType\":\"image/jpeg\""))
            .and(body_string_contains("NO TEXT"))
            .and(body_string_contains("ethereal watercolor"))
            // The hyphenated placement must surface as prose.
            .and(body_string_contains("top left region"))
            .respond_with(ResponseTemplate::new(200).set_body_json(prediction_body(&b64)))
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(&server, "key");

        client
            .generate_background(&sample_analysis())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_api_error_returns_ai_provider_error() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::PREDICT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let client = make_client(&server, "key");

        let err = client
            .generate_background(&sample_analysis())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AiProvider(_)));
    }

    #[tokio::test]
    async fn test_generate_background_rejects_empty_predictions() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::PREDICT_PATH_REGEX)
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "predictions": [] })),
            )
            .mount(&server)
            .await;

        let client = make_client(&server, "key");

        let err = client
            .generate_background(&sample_analysis())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AiProvider(_)));
    }

    #[tokio::test]
    async fn test_generate_background_rejects_invalid_base64() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::PREDICT_PATH_REGEX)
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(prediction_body("!!!invalid-base64!!!")),
            )
            .mount(&server)
            .await;

        let client = make_client(&server, "key");

        let err = client
            .generate_background(&sample_analysis())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AiProvider(_)));
    }
}
