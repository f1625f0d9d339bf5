//! Source admins: turn raw material into cards and consume it afterwards.
//!
//! # Example
//!
//! ```no_run
//! use autocards::{PhraseWriter, SourceAdmin, TextSourceAdmin};
//!
//! # async fn example() -> autocards::Result<()> {
//! let mut admin = TextSourceAdmin::new("phrases.txt", PhraseWriter::new());
//! let cards = admin.return_sources().await?;
//! println!("{} new cards", cards.len());
//!
//! // Once the cards are safely stored, empty the phrase file.
//! admin.update_sources().await?;
//! # Ok(())
//! # }
//! ```

mod image;
mod text;

pub use image::ImageSourceAdmin;
pub use text::TextSourceAdmin;

use async_trait::async_trait;

use crate::card::Card;
use crate::error::Result;

/// Produces cards from a content source.
#[async_trait]
pub trait SourceAdmin: Send {
    /// Read the source and return freshly written cards.
    async fn return_sources(&mut self) -> Result<Vec<Card>>;

    /// Consume the material behind the cards returned last.
    ///
    /// Callers persist the cards before calling this.
    async fn update_sources(&mut self) -> Result<()>;
}

#[async_trait]
impl<T: SourceAdmin + ?Sized> SourceAdmin for Box<T> {
    async fn return_sources(&mut self) -> Result<Vec<Card>> {
        (**self).return_sources().await
    }

    async fn update_sources(&mut self) -> Result<()> {
        (**self).update_sources().await
    }
}
