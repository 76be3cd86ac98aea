//! Data models and structures
//!
//! Defines the core data structures for poem analysis, poster results, and
//! API interactions with the Gemini services.

use serde::{Deserialize, Serialize};

/// Fixed dark font color used on every poster. Chosen for contrast against
/// the pale backgrounds the image prompt asks for, never derived from the
/// generated image.
pub const FONT_COLOR: &str = "#1A202C";

/// Anchor position for the poem text block on the poster.
///
/// Unrecognized values from the service fold to `Center` so rendering stays
/// total even if the schema constraint is ever violated.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TextPlacement {
    #[default]
    #[serde(other)]
    Center,
    TopCenter,
    BottomCenter,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl TextPlacement {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextPlacement::Center => "center",
            TextPlacement::TopCenter => "top-center",
            TextPlacement::BottomCenter => "bottom-center",
            TextPlacement::TopLeft => "top-left",
            TextPlacement::TopRight => "top-right",
            TextPlacement::BottomLeft => "bottom-left",
            TextPlacement::BottomRight => "bottom-right",
        }
    }

    /// Human-readable region name for prose prompts ("top left" rather than
    /// "top-left").
    pub fn region_phrase(&self) -> String {
        self.as_str().replace('-', " ")
    }
}

impl std::fmt::Display for TextPlacement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Treatment applied to the poem text for legibility against the background.
///
/// Unrecognized values fold to `Shadow`, mirroring [`TextPlacement`].
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TextStyle {
    #[default]
    #[serde(other)]
    Shadow,
    Glow,
    Overlay,
}

impl TextStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextStyle::Shadow => "shadow",
            TextStyle::Glow => "glow",
            TextStyle::Overlay => "overlay",
        }
    }
}

impl std::fmt::Display for TextStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured reading of a poem returned by the analysis call.
///
/// All nine fields are required; a response missing any of them fails
/// deserialization and the whole request with it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PoemAnalysis {
    pub title: String,
    pub author: String,
    pub body: String,
    pub emotions: Vec<String>,
    pub imagery: Vec<String>,
    pub atmosphere: String,
    pub art_style: String,
    pub text_placement: TextPlacement,
    pub text_style: TextStyle,
}

/// Finished poster artifact: analysis fields plus the synthesized background.
///
/// `background_image` holds the raw bytes returned by the synthesis call and
/// serializes as base64 for transport.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub title: String,
    pub author: String,
    pub body: String,
    #[serde(with = "base64_bytes")]
    pub background_image: Vec<u8>,
    pub font_color: String,
    pub text_placement: TextPlacement,
    pub text_style: TextStyle,
}

impl GenerationResult {
    /// Combine an analysis with the synthesized image bytes. The font color
    /// is always [`FONT_COLOR`].
    pub fn assemble(analysis: PoemAnalysis, background_image: Vec<u8>) -> Self {
        Self {
            title: analysis.title,
            author: analysis.author,
            body: analysis.body,
            background_image,
            font_color: FONT_COLOR.to_string(),
            text_placement: analysis.text_placement,
            text_style: analysis.text_style,
        }
    }
}

mod base64_bytes {
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        base64::engine::general_purpose::STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

/// An uploaded photo or scan of a poem, with its MIME type.
#[derive(Debug, Clone)]
pub struct PoemImage {
    pub data: Vec<u8>,
    pub mime_type: String,
}

impl PoemImage {
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            data,
            mime_type: mime_type.into(),
        }
    }

    /// Build from raw bytes, sniffing the MIME type from magic bytes.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        let mime_type = sniff_image_mime(&data).to_string();
        Self { data, mime_type }
    }
}

/// Sniff an image MIME type from its leading magic bytes. Poem photos are
/// overwhelmingly JPEG, so that is the fallback for unknown formats.
pub fn sniff_image_mime(bytes: &[u8]) -> &'static str {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [0x89, 0x50, 0x4E, 0x47, ..] => "image/png",
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => "image/webp",
        _ => {
            tracing::warn!(
                "Unrecognized image format (first 4 bytes: {:02X?}), assuming image/jpeg",
                &bytes[..bytes.len().min(4)]
            );
            "image/jpeg"
        }
    }
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub ocr_model: String,
    pub analysis_model: String,
    pub image_model: String,
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            gemini_api_key: std::env::var("GEMINI_API_KEY")
                .map_err(|_| crate::Error::Generic("GEMINI_API_KEY not set".to_string()))?,
            ocr_model: std::env::var("OCR_MODEL")
                .unwrap_or_else(|_| "gemini-2.5-flash".to_string()),
            analysis_model: std::env::var("ANALYSIS_MODEL")
                .unwrap_or_else(|_| "gemini-2.5-flash".to_string()),
            image_model: std::env::var("IMAGE_MODEL")
                .unwrap_or_else(|_| "imagen-4.0-generate-001".to_string()),
        })
    }
}
