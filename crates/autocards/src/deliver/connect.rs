use std::collections::HashMap;

use async_trait::async_trait;
use tracing::{info, warn};

use super::{CardDeliverer, CardList};
use crate::anki::{AnkiClient, Note};
use crate::card::Card;
use crate::error::{Error, Result};

/// Deck used when none is configured.
const DEFAULT_DECK: &str = "Default";

/// How cards are mapped onto Anki notes.
#[derive(Debug, Clone)]
pub struct AnkiConnectOptions {
    /// Target deck. `None` means Anki's `Default` deck.
    pub deck: Option<String>,
    /// Create the deck when it does not exist yet.
    pub create_deck: bool,
    /// Note type used for new notes.
    pub model: String,
    /// Field receiving [`Card::front`].
    pub front_field: String,
    /// Field receiving [`Card::back`].
    pub back_field: String,
    /// Tags added to every note.
    pub tags: Vec<String>,
    /// Sync with AnkiWeb after delivering.
    pub sync: bool,
}

impl Default for AnkiConnectOptions {
    fn default() -> Self {
        Self {
            deck: None,
            create_deck: false,
            model: "Basic".to_string(),
            front_field: "Front".to_string(),
            back_field: "Back".to_string(),
            tags: Vec::new(),
            sync: false,
        }
    }
}

/// Delivers cards to a local Anki through AnkiConnect.
#[derive(Debug, Clone)]
pub struct AnkiConnectDeliverer {
    client: AnkiClient,
    options: AnkiConnectOptions,
    card_list: CardList,
}

impl AnkiConnectDeliverer {
    /// Create a deliverer from a client and note options.
    pub fn new(client: AnkiClient, options: AnkiConnectOptions) -> Self {
        Self {
            client,
            options,
            card_list: CardList::new(),
        }
    }

    /// The cards handed to the last delivery, with their current state.
    pub fn card_list(&self) -> Vec<Card> {
        self.card_list.cards()
    }

    async fn ensure_deck(&self) -> Result<String> {
        let Some(deck) = &self.options.deck else {
            return Ok(DEFAULT_DECK.to_string());
        };

        let existing = self.client.deck_names().await?;
        if !existing.contains(deck) {
            if !self.options.create_deck {
                return Err(Error::DeckNotFound(deck.clone()));
            }
            self.client.create_deck(deck).await?;
            info!(deck = %deck, "created deck");
        }
        Ok(deck.clone())
    }

    fn note_for(&self, deck: &str, card: &Card) -> Note {
        Note {
            deck_name: deck.to_string(),
            model_name: self.options.model.clone(),
            fields: HashMap::from([
                (self.options.front_field.clone(), card.front.clone()),
                (self.options.back_field.clone(), card.back.clone()),
            ]),
            tags: self.options.tags.clone(),
        }
    }

    async fn insert_card(&mut self, deck: &str, card: &Card) {
        let note = self.note_for(deck, card);
        match self.client.add_note(&note).await {
            Ok(id) => {
                info!(note_id = id, front = %card.front, "inserted card");
                self.card_list.mark_inserted(card);
            }
            Err(e) => warn!(front = %card.front, "could not insert card: {}", e),
        }
    }
}

#[async_trait]
impl CardDeliverer for AnkiConnectDeliverer {
    async fn deliver(&mut self, cards: Vec<Card>) -> Result<Vec<Card>> {
        self.card_list = CardList::new();
        self.card_list.extend(cards.iter().cloned());

        let deck = self.ensure_deck().await?;
        for card in &cards {
            self.insert_card(&deck, card).await;
        }

        if self.options.sync && self.card_list.inserted_count() > 0 {
            if let Err(e) = self.client.sync().await {
                warn!("sync with AnkiWeb failed: {}", e);
            }
        }

        Ok(self.card_list.cards())
    }
}
