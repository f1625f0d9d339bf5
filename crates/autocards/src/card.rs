//! The flashcard type that flows from sources to deliverers.

use serde::{Deserialize, Serialize};

/// Placeholder for the back of generated cards.
///
/// Cards are created from raw phrases only; the learner looks the meaning up
/// in whatever dictionary or translator they use.
pub const DEFAULT_BACK: &str = "*CHECK THE CONFIGURED DICTIONARY OR TRANSLATION TOOL*";

/// A spaced-repetition card with the studied phrase on the front.
///
/// # Example
///
/// ```
/// use autocards::Card;
///
/// let card = Card::new("The Russian research vessel.", "phrases.txt");
/// assert!(!card.inserted);
/// assert_eq!(card.representation(), "The Russian research vessel.|phrases.txt");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// The phrase being studied.
    pub front: String,
    /// The answer side.
    pub back: String,
    /// Where the phrase came from (file path, image path or Drive file id).
    pub source: String,
    /// Whether the card has been inserted into the flashcard service.
    #[serde(default)]
    pub inserted: bool,
}

impl Card {
    /// Create a card with the default back text.
    pub fn new(front: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            front: front.into(),
            back: DEFAULT_BACK.to_string(),
            source: source.into(),
            inserted: false,
        }
    }

    /// Replace the back text.
    pub fn with_back(mut self, back: impl Into<String>) -> Self {
        self.back = back.into();
        self
    }

    /// Identity used to match cards across the store, the deliverer and runs.
    ///
    /// Two cards with the same front and source are the same card, whatever
    /// their back text or delivery state.
    pub fn representation(&self) -> String {
        format!("{}|{}", self.front, self.source)
    }
}
