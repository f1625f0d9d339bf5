use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info};

use super::SourceAdmin;
use crate::card::Card;
use crate::error::Result;
use crate::text::{read_phrases, write_phrases};
use crate::writer::CardWriter;

/// Cards from a text file with one phrase per line.
#[derive(Debug)]
pub struct TextSourceAdmin<W> {
    path: PathBuf,
    writer: W,
    written: Vec<String>,
}

impl<W: CardWriter> TextSourceAdmin<W> {
    /// Read phrases from `path` and write them with `writer`.
    pub fn new(path: impl Into<PathBuf>, writer: W) -> Self {
        Self {
            path: path.into(),
            writer,
            written: Vec::new(),
        }
    }

    /// The phrase file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl<W: CardWriter> SourceAdmin for TextSourceAdmin<W> {
    async fn return_sources(&mut self) -> Result<Vec<Card>> {
        let phrases = read_phrases(&self.path)?;
        if phrases.is_empty() {
            info!(path = %self.path.display(), "no phrases to fill cards");
            self.written.clear();
            return Ok(Vec::new());
        }

        let source = self.path.display().to_string();
        for phrase in &phrases {
            self.writer.update_contents(phrase, &source);
        }
        let cards = self.writer.return_written_cards();
        debug!(path = %source, count = cards.len(), "wrote cards from text");
        self.written = phrases;
        Ok(cards)
    }

    /// Remove the written phrases from the file.
    ///
    /// Lines added to the file after [`return_sources`](Self::return_sources)
    /// read it are kept for the next run.
    async fn update_sources(&mut self) -> Result<()> {
        if self.written.is_empty() {
            return Ok(());
        }

        let remaining: Vec<String> = read_phrases(&self.path)?
            .into_iter()
            .filter(|p| !self.written.contains(p))
            .collect();
        write_phrases(&self.path, &remaining)?;

        info!(
            path = %self.path.display(),
            removed = self.written.len(),
            remaining = remaining.len(),
            "updated phrase file"
        );
        self.written.clear();
        Ok(())
    }
}
