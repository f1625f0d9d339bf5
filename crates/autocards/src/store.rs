//! Persistent bookkeeping of created cards and consumed Drive files.
//!
//! All state lives in a single JSON object file with one entry per key,
//! so several stores can share a file:
//!
//! ```json
//! {
//!   "cards": [{"front": "...", "back": "...", "source": "...", "inserted": false}],
//!   "drive_file_id": ["1AbC..."]
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use tracing::debug;

use crate::card::Card;
use crate::error::Result;

/// Default key for stored cards.
pub const CARDS_KEY: &str = "cards";

/// Default key for consumed Drive file ids.
pub const DRIVE_IDS_KEY: &str = "drive_file_id";

/// A JSON-file backed key-value store.
#[derive(Debug, Clone)]
pub struct KvStore {
    path: PathBuf,
}

impl KvStore {
    /// Open a store at `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read a value. Returns `None` if the file or the key does not exist.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let mut map = self.load()?;
        match map.remove(key) {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Write a value, keeping every other key.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let mut map = self.load()?;
        map.insert(key.to_string(), serde_json::to_value(value)?);
        self.save(&map)
    }

    fn load(&self) -> Result<Map<String, Value>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(Map::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, map: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        std::fs::write(&tmp, serde_json::to_string_pretty(map)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Cards that were created but not yet inserted.
#[derive(Debug, Clone)]
pub struct CardStore {
    kv: KvStore,
    key: String,
}

impl CardStore {
    /// Create a card store under [`CARDS_KEY`].
    pub fn new(kv: KvStore) -> Self {
        Self::with_key(kv, CARDS_KEY)
    }

    /// Create a card store under a custom key.
    pub fn with_key(kv: KvStore, key: impl Into<String>) -> Self {
        Self {
            kv,
            key: key.into(),
        }
    }

    /// Cards waiting for delivery.
    pub fn return_sources(&self) -> Result<Vec<Card>> {
        Ok(self.kv.get(&self.key)?.unwrap_or_default())
    }

    /// Merge delivery state into the store.
    ///
    /// Inserted cards are dropped, pending ones are added or refreshed, and
    /// stored cards not present in `cards` are left alone. An empty slice is
    /// a no-op.
    pub fn update_sources(&self, cards: &[Card]) -> Result<()> {
        if cards.is_empty() {
            return Ok(());
        }

        let stored = self.return_sources()?;
        let merged = merge(stored, cards);
        debug!(key = %self.key, pending = merged.len(), "updating card store");
        self.kv.set(&self.key, &merged)
    }
}

fn merge(mut stored: Vec<Card>, cards: &[Card]) -> Vec<Card> {
    for card in cards {
        let position = stored
            .iter()
            .position(|c| c.representation() == card.representation());

        match (position, card.inserted) {
            (Some(i), true) => {
                stored.remove(i);
            }
            (Some(i), false) => stored[i] = card.clone(),
            (None, false) => stored.push(card.clone()),
            (None, true) => {}
        }
    }
    stored
}

/// Ids that have already been consumed, e.g. Drive files already OCR'd.
#[derive(Debug, Clone)]
pub struct IdStore {
    kv: KvStore,
    key: String,
}

impl IdStore {
    /// Create an id store under [`DRIVE_IDS_KEY`].
    pub fn new(kv: KvStore) -> Self {
        Self::with_key(kv, DRIVE_IDS_KEY)
    }

    /// Create an id store under a custom key.
    pub fn with_key(kv: KvStore, key: impl Into<String>) -> Self {
        Self {
            kv,
            key: key.into(),
        }
    }

    /// All recorded ids.
    pub fn ids(&self) -> Result<Vec<String>> {
        Ok(self.kv.get(&self.key)?.unwrap_or_default())
    }

    /// Whether `id` has been recorded.
    pub fn contains(&self, id: &str) -> Result<bool> {
        Ok(self.ids()?.iter().any(|i| i == id))
    }

    /// Record ids, ignoring ones already present.
    pub fn insert_many<'a>(&self, ids: impl IntoIterator<Item = &'a str>) -> Result<()> {
        let mut stored = self.ids()?;
        for id in ids {
            if !stored.iter().any(|i| i == id) {
                stored.push(id.to_string());
            }
        }
        self.kv.set(&self.key, &stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cards() -> Vec<Card> {
        ["Take this time.", "The Russian research vessel.", "Let's reconvene."]
            .iter()
            .map(|p| Card::new(*p, "phrases.txt"))
            .collect()
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = CardStore::new(KvStore::new(dir.path().join("db.json")));
        assert!(store.return_sources().unwrap().is_empty());
    }

    #[test]
    fn stores_created_cards() {
        let dir = tempfile::tempdir().unwrap();
        let store = CardStore::new(KvStore::new(dir.path().join("db.json")));
        let created = cards();
        store.update_sources(&created).unwrap();
        assert_eq!(store.return_sources().unwrap(), created);
    }

    #[test]
    fn all_inserted_empties_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = CardStore::new(KvStore::new(dir.path().join("db.json")));
        let mut list = cards();
        store.update_sources(&list).unwrap();
        for card in &mut list {
            card.inserted = true;
        }
        store.update_sources(&list).unwrap();
        assert!(store.return_sources().unwrap().is_empty());
    }

    #[test]
    fn only_failed_card_remains() {
        let dir = tempfile::tempdir().unwrap();
        let store = CardStore::new(KvStore::new(dir.path().join("db.json")));
        let mut list = cards();
        store.update_sources(&list).unwrap();
        let last = list.len() - 1;
        for card in &mut list[..last] {
            card.inserted = true;
        }
        store.update_sources(&list).unwrap();

        let remaining = store.return_sources().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].representation(), list[last].representation());
    }

    #[test]
    fn empty_update_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        let store = CardStore::new(KvStore::new(&path));
        store.update_sources(&[]).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn unmentioned_cards_are_kept() {
        let stored = cards();
        let extra = vec![Card::new("New one", "other.txt")];
        let merged = merge(stored.clone(), &extra);
        assert_eq!(merged.len(), stored.len() + 1);
    }

    #[test]
    fn keys_share_one_file() {
        let dir = tempfile::tempdir().unwrap();
        let kv = KvStore::new(dir.path().join("db.json"));
        let cards_store = CardStore::new(kv.clone());
        let ids = IdStore::new(kv);

        cards_store.update_sources(&cards()).unwrap();
        ids.insert_many(["a", "b", "a"]).unwrap();

        assert_eq!(cards_store.return_sources().unwrap().len(), 3);
        assert_eq!(ids.ids().unwrap(), vec!["a", "b"]);
        assert!(ids.contains("b").unwrap());
        assert!(!ids.contains("c").unwrap());
    }
}
