//! Card writers turn raw phrases into [`Card`]s.

use crate::card::{Card, DEFAULT_BACK};

/// A phrase waiting to become a card, with the source it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content {
    /// The phrase for the front of the card.
    pub phrase: String,
    /// File path, image path or Drive id the phrase came from.
    pub source: String,
}

/// Collects phrases and writes them as cards.
pub trait CardWriter: Send {
    /// Record one phrase and where it came from.
    fn update_contents(&mut self, phrase: &str, source: &str);

    /// Phrases recorded since the last [`return_written_cards`](Self::return_written_cards).
    fn contents(&self) -> &[Content];

    /// Turn every recorded phrase into a card and forget the phrases.
    fn return_written_cards(&mut self) -> Vec<Card>;
}

/// The default writer: one card per recorded phrase, fixed back text.
#[derive(Debug, Clone)]
pub struct PhraseWriter {
    contents: Vec<Content>,
    back: String,
}

impl PhraseWriter {
    /// Create a writer that uses [`DEFAULT_BACK`].
    pub fn new() -> Self {
        Self::with_back(DEFAULT_BACK)
    }

    /// Create a writer with a custom back text.
    pub fn with_back(back: impl Into<String>) -> Self {
        Self {
            contents: Vec::new(),
            back: back.into(),
        }
    }
}

impl Default for PhraseWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl CardWriter for PhraseWriter {
    fn update_contents(&mut self, phrase: &str, source: &str) {
        self.contents.push(Content {
            phrase: phrase.to_string(),
            source: source.to_string(),
        });
    }

    fn contents(&self) -> &[Content] {
        &self.contents
    }

    fn return_written_cards(&mut self) -> Vec<Card> {
        self.contents
            .drain(..)
            .map(|c| Card::new(c.phrase, c.source).with_back(self.back.clone()))
            .collect()
    }
}
