use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::SourceAdmin;
use crate::card::Card;
use crate::error::Result;
use crate::image::{ImageData, ImageSource};
use crate::ocr::TextExtractor;
use crate::writer::CardWriter;

/// Cards from the text found in images, one card per image.
#[derive(Debug)]
pub struct ImageSourceAdmin<I, W, E> {
    source: I,
    writer: W,
    extractor: E,
    written: Vec<ImageData>,
}

impl<I, W, E> ImageSourceAdmin<I, W, E>
where
    I: ImageSource,
    W: CardWriter,
    E: TextExtractor,
{
    /// Combine an image source, a card writer and an OCR backend.
    pub fn new(source: I, writer: W, extractor: E) -> Self {
        Self {
            source,
            writer,
            extractor,
            written: Vec::new(),
        }
    }
}

#[async_trait]
impl<I, W, E> SourceAdmin for ImageSourceAdmin<I, W, E>
where
    I: ImageSource,
    W: CardWriter,
    E: TextExtractor,
{
    async fn return_sources(&mut self) -> Result<Vec<Card>> {
        self.written.clear();
        let images = self.source.get_images().await?;

        for image in images {
            let text = match self.extractor.img_to_str(&image.bytes).await {
                Ok(text) => text,
                Err(e) => {
                    warn!(source = %image.source, "could not read text from image: {}", e);
                    continue;
                }
            };
            let phrase = normalize(&text);
            if phrase.is_empty() {
                warn!(source = %image.source, "no text found in image, leaving it in place");
                continue;
            }
            debug!(source = %image.source, %phrase, "extracted phrase");
            self.writer.update_contents(&phrase, &image.source);
            self.written.push(image);
        }

        let cards = self.writer.return_written_cards();
        info!(count = cards.len(), "wrote cards from images");
        Ok(cards)
    }

    async fn update_sources(&mut self) -> Result<()> {
        if self.written.is_empty() {
            return Ok(());
        }
        self.source.remove_images(&self.written).await?;
        self.written.clear();
        Ok(())
    }
}

/// Collapse OCR output (line breaks, runs of spaces) into a single phrase.
pub(crate) fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_joins_lines() {
        assert_eq!(
            normalize("  Tell me you're not\npeddling   influence\n"),
            "Tell me you're not peddling influence"
        );
        assert_eq!(normalize("\n \t"), "");
    }
}
