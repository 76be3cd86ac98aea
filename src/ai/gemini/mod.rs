pub mod analysis;
pub mod client;
pub mod image;
pub mod ocr;
pub mod types;

pub use analysis::GeminiAnalysisClient;
pub use image::GeminiImageClient;
pub use ocr::GeminiOcrClient;

/// Adds a test-only `with_base_url` to a client wrapping a `GeminiHttpClient`
/// in a field named `http`, so wiremock tests can redirect it.
#[cfg(test)]
macro_rules! impl_with_gemini_base_url {
    ($client:ty) => {
        impl $client {
            fn with_base_url(mut self, base_url: String) -> Self {
                self.http = self.http.with_base_url(base_url);
                self
            }
        }
    };
}

#[cfg(test)]
pub(crate) use impl_with_gemini_base_url;
