//! The story history: the most recent generations, per modality.
//!
//! Each category keeps at most [`HISTORY_CAP`] records, newest first. Every
//! append writes the complete log back to the key-value store under
//! [`HISTORY_KEY`], so the history survives across sessions.

use crate::store::{KeyValueStore, StoreError};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, warn};

/// Maximum number of records kept per category.
pub const HISTORY_CAP: usize = 10;

/// Store key the log is persisted under.
pub const HISTORY_KEY: &str = "touieStoryHistory";

/// Errors from history operations.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Stored history is corrupt: {0}")]
    Corrupt(#[source] serde_json::Error),

    #[error("Failed to serialize history: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Unknown category '{0}' (expected pictogram, audio or text)")]
    UnknownCategory(String),
}

/// Output modality of a generated story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Pictogram,
    Audio,
    Text,
}

impl Category {
    /// All categories, in display order.
    pub const ALL: [Category; 3] = [Category::Pictogram, Category::Audio, Category::Text];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Pictogram => "pictogram",
            Category::Audio => "audio",
            Category::Text => "text",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = HistoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pictogram" | "pictograms" | "pictograma" | "pictogramas" => Ok(Category::Pictogram),
            "audio" | "voice" | "voz" => Ok(Category::Audio),
            "text" | "texto" => Ok(Category::Text),
            _ => Err(HistoryError::UnknownCategory(s.to_string())),
        }
    }
}

/// One saved generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Creation time in milliseconds since the Unix epoch.
    pub id: i64,
    /// Localized creation date.
    pub date: String,
    /// The idea the user typed.
    pub input: String,
}

impl HistoryRecord {
    pub fn new(id: i64, date: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            id,
            date: date.into(),
            input: input.into(),
        }
    }
}

/// What to do when the stored history cannot be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPolicy {
    /// Refuse to start; the stored value is left untouched.
    #[default]
    Strict,
    /// Start with an empty history; the stored value is replaced on the
    /// next append.
    Reset,
}

impl FromStr for LoadPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(LoadPolicy::Strict),
            "reset" => Ok(LoadPolicy::Reset),
            other => Err(format!("unknown history policy '{other}'")),
        }
    }
}

/// The persisted shape of the log. Categories missing from a stored value,
/// or stored as `null`, deserialize as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySnapshot {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub pictogram: Vec<HistoryRecord>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub audio: Vec<HistoryRecord>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub text: Vec<HistoryRecord>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<HistoryRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<HistoryRecord>>::deserialize(deserializer)?.unwrap_or_default())
}

impl HistorySnapshot {
    /// Records of one category, newest first.
    pub fn all_of(&self, category: Category) -> &[HistoryRecord] {
        match category {
            Category::Pictogram => &self.pictogram,
            Category::Audio => &self.audio,
            Category::Text => &self.text,
        }
    }

    fn records_mut(&mut self, category: Category) -> &mut Vec<HistoryRecord> {
        match category {
            Category::Pictogram => &mut self.pictogram,
            Category::Audio => &mut self.audio,
            Category::Text => &mut self.text,
        }
    }
}

/// Bounded, categorized, persisted history of generated stories.
#[derive(Debug)]
pub struct HistoryLog<S> {
    records: HistorySnapshot,
    store: S,
}

impl<S: KeyValueStore> HistoryLog<S> {
    /// Hydrate the log from `store`.
    ///
    /// A missing value gives an empty log. A corrupt value is handled
    /// according to `policy`. Stored categories longer than the cap keep
    /// only their newest records.
    pub fn load(store: S, policy: LoadPolicy) -> Result<Self, HistoryError> {
        let mut records = match store.get(HISTORY_KEY)? {
            None => HistorySnapshot::default(),
            Some(raw) => match serde_json::from_str::<HistorySnapshot>(&raw) {
                Ok(snapshot) => snapshot,
                Err(e) => match policy {
                    LoadPolicy::Strict => return Err(HistoryError::Corrupt(e)),
                    LoadPolicy::Reset => {
                        warn!(error = %e, "stored history is corrupt, starting empty");
                        HistorySnapshot::default()
                    }
                },
            },
        };

        for category in Category::ALL {
            let list = records.records_mut(category);
            if list.len() > HISTORY_CAP {
                warn!(%category, stored = list.len(), "truncating stored history to cap");
                list.truncate(HISTORY_CAP);
            }
        }

        debug!(
            pictogram = records.pictogram.len(),
            audio = records.audio.len(),
            text = records.text.len(),
            "loaded history"
        );
        Ok(Self { records, store })
    }

    /// Record a generation at the head of its category, drop the oldest
    /// record past the cap, and persist the whole log.
    pub fn append(&mut self, category: Category, record: HistoryRecord) -> Result<(), HistoryError> {
        let list = self.records.records_mut(category);
        list.insert(0, record);
        if list.len() > HISTORY_CAP {
            list.pop();
        }

        self.persist()
    }

    /// Records of `category`, newest first.
    pub fn all_of(&self, category: Category) -> &[HistoryRecord] {
        self.records.all_of(category)
    }

    pub fn len(&self, category: Category) -> usize {
        self.records.all_of(category).len()
    }

    /// True when no category holds any record.
    pub fn is_empty(&self) -> bool {
        Category::ALL.iter().all(|c| self.len(*c) == 0)
    }

    /// The complete log in its persisted shape.
    pub fn snapshot(&self) -> &HistorySnapshot {
        &self.records
    }

    /// Most recent id across all categories.
    pub fn latest_id(&self) -> Option<i64> {
        Category::ALL
            .iter()
            .filter_map(|c| self.all_of(*c).first().map(|r| r.id))
            .max()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Give back the underlying store.
    pub fn into_store(self) -> S {
        self.store
    }

    fn persist(&mut self) -> Result<(), HistoryError> {
        let serialized = serde_json::to_string(&self.records).map_err(HistoryError::Serialize)?;
        self.store.set(HISTORY_KEY, &serialized)?;
        Ok(())
    }
}
