//! The orchestration loop: collect pending and new cards, deliver them,
//! remember what went in.
//!
//! # Example
//!
//! ```no_run
//! use autocards::{
//!     AnkiClient, AnkiConnectDeliverer, AnkiConnectOptions, AutoCards, CardStore, KvStore,
//!     PhraseWriter, TextSourceAdmin,
//! };
//!
//! # async fn example() -> autocards::Result<()> {
//! let deliverer = AnkiConnectDeliverer::new(AnkiClient::new(), AnkiConnectOptions::default());
//! let source = TextSourceAdmin::new("phrases.txt", PhraseWriter::new());
//! let store = CardStore::new(KvStore::new("autocards.json"));
//!
//! let mut automaton = AutoCards::new(deliverer, source, store);
//! let report = automaton.run_task().await?;
//! println!("{} inserted, {} still pending", report.inserted, report.failed);
//! # Ok(())
//! # }
//! ```

use tracing::info;

use crate::card::Card;
use crate::deliver::CardDeliverer;
use crate::error::Result;
use crate::source::SourceAdmin;
use crate::store::CardStore;

/// Outcome of one [`AutoCards::run_task`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Cards left over from earlier runs.
    pub pending: usize,
    /// Cards created from the source in this run.
    pub created: usize,
    /// Cards inserted in this run.
    pub inserted: usize,
    /// Cards handed to the deliverer but not inserted; they stay stored.
    pub failed: usize,
}

impl RunReport {
    /// Whether the run had nothing to deliver.
    pub fn is_empty(&self) -> bool {
        self.pending == 0 && self.created == 0
    }
}

/// Drives a source admin and a deliverer, with a store in between.
#[derive(Debug)]
pub struct AutoCards<D, S> {
    deliverer: D,
    source: S,
    store: CardStore,
    card_list: Vec<Card>,
}

impl<D, S> AutoCards<D, S>
where
    D: CardDeliverer,
    S: SourceAdmin,
{
    /// Wire a deliverer, a source admin and a card store together.
    pub fn new(deliverer: D, source: S, store: CardStore) -> Self {
        Self {
            deliverer,
            source,
            store,
            card_list: Vec::new(),
        }
    }

    /// A copy of the cards queued for delivery.
    pub fn card_list(&self) -> Vec<Card> {
        self.card_list.clone()
    }

    /// Queue cards that earlier runs created but did not insert.
    ///
    /// Returns how many were queued.
    pub fn verify_cards(&mut self) -> Result<usize> {
        let mut count = 0;
        for card in self.store.return_sources()? {
            if !self.is_queued(&card) {
                self.card_list.push(card);
                count += 1;
            }
        }
        Ok(count)
    }

    /// Create cards from the source and queue them.
    ///
    /// New cards are stored before the source is consumed, so an
    /// interrupted run never loses a phrase. Cards already queued (same
    /// representation) are not queued twice. Returns how many were queued.
    pub async fn create_cards(&mut self) -> Result<usize> {
        let cards = self.source.return_sources().await?;
        if cards.is_empty() {
            return Ok(0);
        }

        self.store.update_sources(&cards)?;
        self.source.update_sources().await?;

        let mut count = 0;
        for card in cards {
            if !self.is_queued(&card) {
                self.card_list.push(card);
                count += 1;
            }
        }
        Ok(count)
    }

    fn is_queued(&self, card: &Card) -> bool {
        let key = card.representation();
        self.card_list.iter().any(|c| c.representation() == key)
    }

    /// Run one full cycle: pending cards, new cards, delivery, bookkeeping.
    ///
    /// The deliverer is called once with every queued card, or not at all
    /// when there is nothing to deliver. After the run, [`card_list`](Self::card_list)
    /// holds the delivered batch with its `inserted` flags.
    pub async fn run_task(&mut self) -> Result<RunReport> {
        self.card_list.clear();
        let mut report = RunReport {
            pending: self.verify_cards()?,
            ..RunReport::default()
        };
        report.created = self.create_cards().await?;

        if self.card_list.is_empty() {
            info!("no cards to deliver");
            return Ok(report);
        }

        info!(
            pending = report.pending,
            created = report.created,
            "delivering cards"
        );
        let delivered = self.deliverer.deliver(self.card_list.clone()).await?;
        self.store.update_sources(&delivered)?;

        report.inserted = delivered.iter().filter(|c| c.inserted).count();
        report.failed = delivered.len() - report.inserted;
        self.card_list = delivered;

        info!(
            inserted = report.inserted,
            failed = report.failed,
            "delivery finished"
        );
        Ok(report)
    }
}
