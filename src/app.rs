//! Application orchestration for turning a poem into a poster.

use crate::ai::{
    GeminiAnalysisClient, GeminiImageClient, GeminiOcrClient, ImageGenerationService,
    PoemAnalysisService, TextExtractionService,
};
use crate::models::{Config, GenerationResult, PoemImage};
use crate::{Error, Result};
use tokio::sync::watch;
use tracing::{error, info};

pub const EXTRACTING_MESSAGE: &str = "Extracting poem from image...";
pub const ANALYZING_MESSAGE: &str = "Analyzing poem and generating background...";

pub const EMPTY_IMAGE_TEXT_ERROR: &str =
    "Could not extract any text from the image. Please try another one.";
pub const EMPTY_POEM_ERROR: &str = "Please provide a poem to analyze.";

const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred.";

/// Workflow state published to the view layer.
///
/// A single enum rather than independent flags, so states like "loading and
/// finished at once" cannot be represented. `Success` and `Failed` stand
/// until the next `generate` call restarts the cycle at `Loading`.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationState {
    Idle,
    Loading(String),
    Success(GenerationResult),
    Failed(String),
}

/// Coordinates OCR extraction, poem analysis, and background synthesis.
pub struct App {
    ocr: Box<dyn TextExtractionService>,
    analysis: Box<dyn PoemAnalysisService>,
    image_gen: Box<dyn ImageGenerationService>,
    state_tx: watch::Sender<GenerationState>,
}

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
pub struct AppServices {
    pub ocr: Box<dyn TextExtractionService>,
    pub analysis: Box<dyn PoemAnalysisService>,
    pub image_gen: Box<dyn ImageGenerationService>,
}

impl App {
    /// Build an app from concrete service dependencies.
    ///
    /// This is primarily useful for integration tests and local harnesses
    /// that need to inject mocks.
    pub fn with_services(services: AppServices) -> Self {
        let (state_tx, _) = watch::channel(GenerationState::Idle);
        Self {
            ocr: services.ocr,
            analysis: services.analysis,
            image_gen: services.image_gen,
            state_tx,
        }
    }

    /// Construct an app from environment configuration (`Config::from_env`).
    pub fn new() -> Result<Self> {
        let config = Config::from_env()?;

        // Reuse one HTTP connection pool across the service clients.
        let http_client = reqwest::Client::new();

        info!(
            "OCR model: {}, analysis model: {}, image model: {}",
            config.ocr_model, config.analysis_model, config.image_model
        );

        Ok(Self::with_services(AppServices {
            ocr: Box::new(GeminiOcrClient::new_with_client(
                config.gemini_api_key.clone(),
                config.ocr_model,
                http_client.clone(),
            )),
            analysis: Box::new(GeminiAnalysisClient::new_with_client(
                config.gemini_api_key.clone(),
                config.analysis_model,
                http_client.clone(),
            )),
            image_gen: Box::new(GeminiImageClient::new_with_client(
                config.gemini_api_key,
                config.image_model,
                http_client,
            )),
        }))
    }

    /// Current workflow state.
    pub fn state(&self) -> GenerationState {
        self.state_tx.borrow().clone()
    }

    /// Subscribe to workflow state transitions.
    pub fn subscribe(&self) -> watch::Receiver<GenerationState> {
        self.state_tx.subscribe()
    }

    fn set_state(&self, state: GenerationState) {
        self.state_tx.send_replace(state);
    }

    /// Run one poster-generation workflow.
    ///
    /// Exactly one of `poem_text` (non-empty after trimming) or `image` is
    /// expected; when an image is supplied the typed text is ignored. The
    /// returned state is also published on the watch channel and is never
    /// `Loading`.
    pub async fn generate(&self, poem_text: &str, image: Option<PoemImage>) -> GenerationState {
        // Entering Loading clears any prior result or error.
        self.set_state(GenerationState::Loading(String::new()));

        let final_state = match self.run_workflow(poem_text, image).await {
            Ok(result) => {
                info!("Poster generated: {:?} by {}", result.title, result.author);
                GenerationState::Success(result)
            }
            Err(e) => {
                error!("Poster generation failed: {}", e);
                GenerationState::Failed(failure_message(&e))
            }
        };

        self.set_state(final_state.clone());
        final_state
    }

    async fn run_workflow(
        &self,
        poem_text: &str,
        image: Option<PoemImage>,
    ) -> Result<GenerationResult> {
        let poem = match image {
            Some(image) => {
                self.set_state(GenerationState::Loading(EXTRACTING_MESSAGE.to_string()));
                let extracted = self.ocr.extract_text(&image).await?;
                if extracted.trim().is_empty() {
                    return Err(Error::InvalidInput(EMPTY_IMAGE_TEXT_ERROR.to_string()));
                }
                extracted
            }
            None => poem_text.to_string(),
        };

        if poem.trim().is_empty() {
            return Err(Error::InvalidInput(EMPTY_POEM_ERROR.to_string()));
        }

        self.set_state(GenerationState::Loading(ANALYZING_MESSAGE.to_string()));

        let analysis = self.analysis.analyze(&poem).await?;
        let background = self.image_gen.generate_background(&analysis).await?;

        Ok(GenerationResult::assemble(analysis, background))
    }
}

fn failure_message(error: &Error) -> String {
    let message = error.to_string();
    if message.trim().is_empty() {
        UNKNOWN_ERROR_MESSAGE.to_string()
    } else {
        message
    }
}
