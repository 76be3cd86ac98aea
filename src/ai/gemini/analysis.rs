use super::client::GeminiHttpClient;
use super::types::{Content, GenerateContentResponse, Part};
use crate::ai::PoemAnalysisService;
use crate::models::PoemAnalysis;
use crate::{prompts, Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct AnalysisRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: AnalysisGenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisGenerationConfig {
    response_mime_type: String,
    response_schema: serde_json::Value,
}

/// OpenAPI-style schema sent with every analysis request. All nine fields
/// are required and the placement/style values are enum-constrained, so a
/// conforming response deserializes straight into [`PoemAnalysis`].
fn response_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "author": { "type": "STRING" },
            "body": { "type": "STRING" },
            "emotions": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "minItems": 1,
                "maxItems": 3
            },
            "imagery": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "minItems": 2,
                "maxItems": 4
            },
            "atmosphere": { "type": "STRING" },
            "artStyle": { "type": "STRING" },
            "textPlacement": {
                "type": "STRING",
                "enum": [
                    "center", "top-center", "bottom-center",
                    "top-left", "top-right", "bottom-left", "bottom-right"
                ]
            },
            "textStyle": {
                "type": "STRING",
                "enum": ["shadow", "glow", "overlay"]
            }
        },
        "required": [
            "title", "author", "body", "emotions", "imagery",
            "atmosphere", "artStyle", "textPlacement", "textStyle"
        ]
    })
}

pub struct GeminiAnalysisClient {
    http: GeminiHttpClient,
}

impl GeminiAnalysisClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(api_key, model, reqwest::Client::new())
    }

    pub fn new_with_client(api_key: String, model: String, client: reqwest::Client) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(api_key, model, Duration::from_secs(60), client),
        }
    }
}

#[cfg(test)]
super::impl_with_gemini_base_url!(GeminiAnalysisClient);

#[async_trait]
impl PoemAnalysisService for GeminiAnalysisClient {
    async fn analyze(&self, poem: &str) -> Result<PoemAnalysis> {
        tracing::debug!("Analyzing poem ({} chars) via Gemini", poem.len());

        let request = AnalysisRequest {
            contents: vec![Content::user(vec![Part::Text {
                text: prompts::render(prompts::POEM_ANALYSIS, &[("poem", poem)]),
            }])],
            generation_config: AnalysisGenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: response_schema(),
            },
        };

        let response: GenerateContentResponse = self.http.generate_content(&request).await?;

        let text = response
            .first_text()
            .ok_or_else(|| Error::AiProvider("No text in Gemini analysis response".to_string()))?;

        let analysis: PoemAnalysis = serde_json::from_str(text.trim()).map_err(|e| {
            Error::AiProvider(format!("Failed to parse Gemini poem analysis: {}", e))
        })?;

        tracing::info!(
            "Poem analysis complete: title={:?}, placement={}, style={}",
            analysis.title,
            analysis.text_placement,
            analysis.text_style
        );

        Ok(analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::gemini::test_support;
    use crate::models::{TextPlacement, TextStyle};
    use pretty_assertions::assert_eq;
    use wiremock::matchers::body_string_contains;
    use wiremock::{MockServer, ResponseTemplate};

    const DEFAULT_MODEL: &str = "gemini-2.5-flash";

    fn make_client(server: &MockServer, api_key: &str) -> GeminiAnalysisClient {
        GeminiAnalysisClient::new(api_key.to_string(), DEFAULT_MODEL.to_string())
            .with_base_url(server.uri())
    }

    fn analysis_body(analysis_json: &serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{
                "content": {
                    "parts": [{ "text": analysis_json.to_string() }]
                }
            }]
        })
    }

    #[tokio::test]
    async fn test_analyze_parses_structured_response() {
        let server = MockServer::start().await;

        let analysis_json = serde_json::json!({
            "title": "Untitled",
            "author": "Anonymous",
            "body": "Roses are red\nViolets are blue",
            "emotions": ["joyful"],
            "imagery": ["roses", "violets"],
            "atmosphere": "playful",
            "artStyle": "soft pastel",
            "textPlacement": "top-left",
            "textStyle": "overlay"
        });

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .and(body_string_contains("\"responseMimeType\":\"application/json\""))
            .and(body_string_contains("\"responseSchema\""))
            .and(body_string_contains("Roses are red"))
            .respond_with(ResponseTemplate::new(200).set_body_json(analysis_body(&analysis_json)))
            .mount(&server)
            .await;

        let client = make_client(&server, "test-key");

        let analysis = client
            .analyze("Roses are red\nViolets are blue")
            .await
            .unwrap();

        assert_eq!(
            analysis,
            PoemAnalysis {
                title: "Untitled".to_string(),
                author: "Anonymous".to_string(),
                body: "Roses are red\nViolets are blue".to_string(),
                emotions: vec!["joyful".to_string()],
                imagery: vec!["roses".to_string(), "violets".to_string()],
                atmosphere: "playful".to_string(),
                art_style: "soft pastel".to_string(),
                text_placement: TextPlacement::TopLeft,
                text_style: TextStyle::Overlay,
            }
        );
    }

    #[tokio::test]
    async fn test_analyze_rejects_response_missing_required_field() {
        let server = MockServer::start().await;

        // No "atmosphere" key.
        let analysis_json = serde_json::json!({
            "title": "Untitled",
            "author": "Anonymous",
            "body": "a poem",
            "emotions": ["calm"],
            "imagery": ["sky", "water"],
            "artStyle": "watercolor",
            "textPlacement": "center",
            "textStyle": "shadow"
        });

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(200).set_body_json(analysis_body(&analysis_json)))
            .mount(&server)
            .await;

        let client = make_client(&server, "test-key");

        let err = client.analyze("a poem").await.unwrap_err();
        assert!(matches!(err, Error::AiProvider(_)));
        assert!(err.to_string().contains("atmosphere"));
    }

    #[tokio::test]
    async fn test_analyze_folds_unknown_placement_to_center() {
        let server = MockServer::start().await;

        let analysis_json = serde_json::json!({
            "title": "Untitled",
            "author": "Anonymous",
            "body": "a poem",
            "emotions": ["calm"],
            "imagery": ["sky", "water"],
            "atmosphere": "serene",
            "artStyle": "watercolor",
            "textPlacement": "diagonal",
            "textStyle": "embossed"
        });

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(200).set_body_json(analysis_body(&analysis_json)))
            .mount(&server)
            .await;

        let client = make_client(&server, "test-key");

        let analysis = client.analyze("a poem").await.unwrap();
        assert_eq!(analysis.text_placement, TextPlacement::Center);
        assert_eq!(analysis.text_style, TextStyle::Shadow);
    }

    #[tokio::test]
    async fn test_api_error_returns_ai_provider_error() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let client = make_client(&server, "bad-key");

        let err = client.analyze("a poem").await.unwrap_err();
        assert!(matches!(err, Error::AiProvider(_)));
    }

    #[tokio::test]
    async fn test_analyze_rejects_unparseable_analysis_text() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "not json at all" }] }
                }]
            })))
            .mount(&server)
            .await;

        let client = make_client(&server, "test-key");

        let err = client.analyze("a poem").await.unwrap_err();
        assert!(matches!(err, Error::AiProvider(_)));
    }
}
