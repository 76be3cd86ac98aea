//! AI service integration for poem extraction, analysis, and backgrounds
//!
//! Defines the capability traits the orchestrator depends on and re-exports
//! the Gemini implementations and the in-memory mocks.

pub mod gemini;
pub mod mock;

pub use gemini::{GeminiAnalysisClient, GeminiImageClient, GeminiOcrClient};
pub use mock::{MockImageGenerationClient, MockPoemAnalysisClient, MockTextExtractionClient};

use crate::models::{PoemAnalysis, PoemImage};
use crate::Result;
use async_trait::async_trait;

/// OCR: read the poem text out of a photographed or scanned page.
#[async_trait]
pub trait TextExtractionService: Send + Sync {
    /// Returns the extracted text, trimmed. An empty string means the image
    /// contained no readable text; that is not an error at this layer.
    async fn extract_text(&self, image: &PoemImage) -> Result<String>;
}

/// Structured semantic reading of a poem: reformatted text plus the visual
/// direction for its poster.
#[async_trait]
pub trait PoemAnalysisService: Send + Sync {
    async fn analyze(&self, poem: &str) -> Result<PoemAnalysis>;
}

/// Background synthesis driven by a completed analysis.
#[async_trait]
pub trait ImageGenerationService: Send + Sync {
    async fn generate_background(&self, analysis: &PoemAnalysis) -> Result<Vec<u8>>;
}
