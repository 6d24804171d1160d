//! Read-only view of the file-backed mention store.
//!
//! The ingestion service owns writing `store.json`; this module only loads it and cuts
//! immutable per-drug snapshots for the diagnostic engine.

use std::collections::{HashMap, HashSet};
use std::io::ErrorKind;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::PharmaSignalError;
use crate::types::{Drug, Mention, PerceptionSignal};

/// On-disk layout. Sections other than these three are ignored.
#[derive(Debug, Default, Deserialize)]
struct StoreFile {
    #[serde(default)]
    drugs: Vec<Drug>,
    #[serde(default)]
    mentions: Vec<Mention>,
    #[serde(default)]
    perceptions: Vec<PerceptionSignal>,
}

#[derive(Debug, Clone, Default)]
pub struct MentionStore {
    drugs: HashMap<i64, Drug>,
    /// Kept in file order so snapshots (and therefore diagnostics) are reproducible.
    mentions: Vec<Mention>,
    perceptions: HashMap<i64, PerceptionSignal>,
}

impl MentionStore {
    /// Load the store from disk. A missing file yields an empty store.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, PharmaSignalError> {
        let path = path.as_ref();
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(path = %path.display(), "Store file not found, starting empty");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        let store = Self::from_json(&raw)?;
        info!(
            path = %path.display(),
            drugs = store.drugs.len(),
            mentions = store.mentions.len(),
            perceptions = store.perceptions.len(),
            "Loaded mention store"
        );
        Ok(store)
    }

    pub fn from_json(raw: &str) -> Result<Self, PharmaSignalError> {
        let file: StoreFile = serde_json::from_str(raw)?;
        Self::from_parts(file.drugs, file.mentions, file.perceptions)
    }

    /// Build a store from already-parsed records. Duplicate mention ids are rejected.
    pub fn from_parts(
        drugs: Vec<Drug>,
        mentions: Vec<Mention>,
        perceptions: Vec<PerceptionSignal>,
    ) -> Result<Self, PharmaSignalError> {
        let mut seen = HashSet::with_capacity(mentions.len());
        for m in &mentions {
            if !seen.insert(m.mention_id) {
                return Err(PharmaSignalError::Store(format!(
                    "duplicate mention_id {}",
                    m.mention_id
                )));
            }
        }

        Ok(Self {
            drugs: drugs.into_iter().map(|d| (d.drug_id, d)).collect(),
            mentions,
            perceptions: perceptions.into_iter().map(|p| (p.mention_id, p)).collect(),
        })
    }

    pub fn drug_name(&self, drug_id: i64) -> Option<&str> {
        self.drugs.get(&drug_id).map(|d| d.drug_name.as_str())
    }

    pub fn mention_count(&self) -> usize {
        self.mentions.len()
    }

    /// Owned copy of everything one diagnostic run for `drug_id` needs.
    pub fn snapshot(&self, drug_id: i64) -> DrugSnapshot {
        let mentions: Vec<Mention> = self
            .mentions
            .iter()
            .filter(|m| m.drug_id == drug_id)
            .cloned()
            .collect();
        let perceptions = mentions
            .iter()
            .filter_map(|m| self.perceptions.get(&m.mention_id).cloned())
            .collect::<Vec<_>>();

        DrugSnapshot::new(
            drug_id,
            self.drug_name(drug_id).map(str::to_string),
            mentions,
            perceptions,
        )
    }
}

/// Immutable per-drug input to the diagnostic engine.
#[derive(Debug, Clone, Default)]
pub struct DrugSnapshot {
    pub drug_id: i64,
    pub drug_name: Option<String>,
    pub mentions: Vec<Mention>,
    perceptions: HashMap<i64, PerceptionSignal>,
}

impl DrugSnapshot {
    pub fn new(
        drug_id: i64,
        drug_name: Option<String>,
        mentions: Vec<Mention>,
        perceptions: impl IntoIterator<Item = PerceptionSignal>,
    ) -> Self {
        Self {
            drug_id,
            drug_name,
            mentions,
            perceptions: perceptions.into_iter().map(|p| (p.mention_id, p)).collect(),
        }
    }

    /// Registry name, falling back to the raw identifier.
    pub fn display_name(&self) -> String {
        self.drug_name
            .clone()
            .unwrap_or_else(|| self.drug_id.to_string())
    }

    pub fn perception(&self, mention_id: i64) -> Option<&PerceptionSignal> {
        self.perceptions.get(&mention_id)
    }

    /// Perceptions of this snapshot's mentions, in mention order.
    pub fn perceptions(&self) -> impl Iterator<Item = &PerceptionSignal> {
        self.mentions
            .iter()
            .filter_map(|m| self.perceptions.get(&m.mention_id))
    }

    pub fn is_empty(&self) -> bool {
        self.mentions.is_empty()
    }
}
