//! Deliverers insert cards into the flashcard service.
//!
//! A deliverer receives the whole batch, tries each card once, and hands the
//! batch back with [`Card::inserted`] set on every card that made it. One
//! failing card never stops the rest of the batch.

mod connect;
mod web;

pub use connect::{AnkiConnectDeliverer, AnkiConnectOptions};
pub use web::{ANKIWEB_LOGIN_URL, AnkiWebDeliverer, AnkiWebOptions};

use async_trait::async_trait;

use crate::card::Card;
use crate::error::Result;

/// Inserts cards somewhere and reports which ones went in.
#[async_trait]
pub trait CardDeliverer: Send {
    /// Deliver `cards`, returning them with `inserted` flags updated.
    ///
    /// An `Err` means nothing could be attempted (no connection, missing
    /// deck, failed login); per-card failures are not errors.
    async fn deliver(&mut self, cards: Vec<Card>) -> Result<Vec<Card>>;
}

#[async_trait]
impl<T: CardDeliverer + ?Sized> CardDeliverer for Box<T> {
    async fn deliver(&mut self, cards: Vec<Card>) -> Result<Vec<Card>> {
        (**self).deliver(cards).await
    }
}

/// The working list a deliverer updates while inserting.
#[derive(Debug, Clone, Default)]
pub struct CardList {
    cards: Vec<Card>,
}

impl CardList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append cards to the list.
    pub fn extend(&mut self, cards: impl IntoIterator<Item = Card>) {
        self.cards.extend(cards);
    }

    /// Flag the first card matching `card`'s representation as inserted.
    ///
    /// Returns `false` if no card matched.
    pub fn mark_inserted(&mut self, card: &Card) -> bool {
        let key = card.representation();
        match self.cards.iter_mut().find(|c| c.representation() == key) {
            Some(found) => {
                found.inserted = true;
                true
            }
            None => false,
        }
    }

    /// A copy of the list.
    pub fn cards(&self) -> Vec<Card> {
        self.cards.clone()
    }

    /// Number of cards flagged as inserted.
    pub fn inserted_count(&self) -> usize {
        self.cards.iter().filter(|c| c.inserted).count()
    }
}
