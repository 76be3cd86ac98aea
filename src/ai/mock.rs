//! In-memory service mocks for orchestrator and integration tests.
//!
//! Clones share state through `Arc`, so a cloned handle can probe call counts
//! after the original has been boxed into the app.

use super::{ImageGenerationService, PoemAnalysisService, TextExtractionService};
use crate::models::{PoemAnalysis, PoemImage, TextPlacement, TextStyle};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct MockTextExtractionClient {
    text_responses: Arc<Mutex<Vec<String>>>,
    failure: Arc<Mutex<Option<String>>>,
    call_count: Arc<Mutex<usize>>,
    seen_mime_types: Arc<Mutex<Vec<String>>>,
}

impl MockTextExtractionClient {
    pub fn new() -> Self {
        Self {
            text_responses: Arc::new(Mutex::new(Vec::new())),
            failure: Arc::new(Mutex::new(None)),
            call_count: Arc::new(Mutex::new(0)),
            seen_mime_types: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_text_response(self, response: String) -> Self {
        self.text_responses.lock().unwrap().push(response);
        self
    }

    pub fn with_failure(self, message: String) -> Self {
        *self.failure.lock().unwrap() = Some(message);
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    pub fn seen_mime_types(&self) -> Vec<String> {
        self.seen_mime_types.lock().unwrap().clone()
    }
}

impl Default for MockTextExtractionClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextExtractionService for MockTextExtractionClient {
    async fn extract_text(&self, image: &PoemImage) -> Result<String> {
        let mut count = self.call_count.lock().unwrap();
        *count += 1;

        self.seen_mime_types
            .lock()
            .unwrap()
            .push(image.mime_type.clone());

        if let Some(message) = self.failure.lock().unwrap().clone() {
            return Err(Error::AiProvider(message));
        }

        let responses = self.text_responses.lock().unwrap();
        if responses.is_empty() {
            Ok("The fog comes\non little cat feet.".to_string())
        } else {
            let index = (*count - 1) % responses.len();
            Ok(responses[index].clone())
        }
    }
}

#[derive(Clone)]
pub struct MockPoemAnalysisClient {
    analysis_responses: Arc<Mutex<Vec<PoemAnalysis>>>,
    failure: Arc<Mutex<Option<String>>>,
    call_count: Arc<Mutex<usize>>,
    analyzed_poems: Arc<Mutex<Vec<String>>>,
}

impl MockPoemAnalysisClient {
    pub fn new() -> Self {
        Self {
            analysis_responses: Arc::new(Mutex::new(Vec::new())),
            failure: Arc::new(Mutex::new(None)),
            call_count: Arc::new(Mutex::new(0)),
            analyzed_poems: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_analysis_response(self, response: PoemAnalysis) -> Self {
        self.analysis_responses.lock().unwrap().push(response);
        self
    }

    pub fn with_failure(self, message: String) -> Self {
        *self.failure.lock().unwrap() = Some(message);
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Every poem text this mock has been asked to analyze, in order.
    pub fn analyzed_poems(&self) -> Vec<String> {
        self.analyzed_poems.lock().unwrap().clone()
    }
}

impl Default for MockPoemAnalysisClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PoemAnalysisService for MockPoemAnalysisClient {
    async fn analyze(&self, poem: &str) -> Result<PoemAnalysis> {
        let mut count = self.call_count.lock().unwrap();
        *count += 1;

        self.analyzed_poems.lock().unwrap().push(poem.to_string());

        if let Some(message) = self.failure.lock().unwrap().clone() {
            return Err(Error::AiProvider(message));
        }

        let responses = self.analysis_responses.lock().unwrap();
        if responses.is_empty() {
            // Default analysis echoes the poem body back.
            Ok(PoemAnalysis {
                title: "Untitled".to_string(),
                author: "Anonymous".to_string(),
                body: poem.to_string(),
                emotions: vec!["peaceful".to_string()],
                imagery: vec!["open sky".to_string(), "still water".to_string()],
                atmosphere: "serene".to_string(),
                art_style: "soft watercolor".to_string(),
                text_placement: TextPlacement::Center,
                text_style: TextStyle::Shadow,
            })
        } else {
            let index = (*count - 1) % responses.len();
            Ok(responses[index].clone())
        }
    }
}

#[derive(Clone)]
pub struct MockImageGenerationClient {
    image_responses: Arc<Mutex<Vec<Vec<u8>>>>,
    failure: Arc<Mutex<Option<String>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockImageGenerationClient {
    pub fn new() -> Self {
        Self {
            image_responses: Arc::new(Mutex::new(Vec::new())),
            failure: Arc::new(Mutex::new(None)),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_image_response(self, response: Vec<u8>) -> Self {
        self.image_responses.lock().unwrap().push(response);
        self
    }

    pub fn with_failure(self, message: String) -> Self {
        *self.failure.lock().unwrap() = Some(message);
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

impl Default for MockImageGenerationClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageGenerationService for MockImageGenerationClient {
    async fn generate_background(&self, _analysis: &PoemAnalysis) -> Result<Vec<u8>> {
        let mut count = self.call_count.lock().unwrap();
        *count += 1;

        if let Some(message) = self.failure.lock().unwrap().clone() {
            return Err(Error::AiProvider(message));
        }

        let responses = self.image_responses.lock().unwrap();
        if responses.is_empty() {
            // JPEG SOI/APP0 header and EOI marker around an empty body.
            Ok(vec![
                0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46, 0x00, 0x01, 0xFF,
                0xD9,
            ])
        } else {
            let index = (*count - 1) % responses.len();
            Ok(responses[index].clone())
        }
    }
}
