//! Text extraction from images.

use async_trait::async_trait;

use crate::error::Result;

/// Reads the text printed in an image.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Extract all text from encoded image bytes (JPEG, PNG, ...).
    ///
    /// Returns an empty string when the image holds no text.
    async fn img_to_str(&self, image: &[u8]) -> Result<String>;
}
