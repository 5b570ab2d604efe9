//! Typed records over the key-value store.
//!
//! Key names carry the format revision (`_v1`); a new layout gets a new key.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::kv::KeyValueStore;
use crate::error::StorageError;

pub const KEY_HISTORY: &str = "cf_history_v1";
pub const KEY_BEST: &str = "cf_best_v1";
pub const KEY_THEME: &str = "cf_theme";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub level: String,
    pub score: u32,
    pub total: u32,
    pub percent: u32,
}

fn read_json<T, K>(store: &K, key: &str) -> Result<Option<T>, StorageError>
where
    T: DeserializeOwned,
    K: KeyValueStore + ?Sized,
{
    match store.get(key)? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| StorageError::CorruptRecord {
                key: key.to_string(),
                message: e.to_string(),
            }),
        None => Ok(None),
    }
}

fn write_json<T, K>(store: &K, key: &str, value: &T) -> Result<(), StorageError>
where
    T: Serialize,
    K: KeyValueStore + ?Sized,
{
    let raw = serde_json::to_string(value).map_err(|e| StorageError::CorruptRecord {
        key: key.to_string(),
        message: e.to_string(),
    })?;
    store.set(key, &raw)
}

/// Most-recent-first log of completed sessions.
pub struct HistoryLog<'a, K: KeyValueStore + ?Sized> {
    store: &'a K,
}

impl<'a, K: KeyValueStore + ?Sized> HistoryLog<'a, K> {
    pub fn new(store: &'a K) -> Self {
        Self { store }
    }

    pub fn entries(&self) -> Result<Vec<HistoryEntry>, StorageError> {
        Ok(read_json(self.store, KEY_HISTORY)?.unwrap_or_default())
    }

    pub fn prepend(&self, entry: HistoryEntry) -> Result<(), StorageError> {
        let mut entries = self.entries()?;
        entries.insert(0, entry);
        write_json(self.store, KEY_HISTORY, &entries)
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(KEY_HISTORY)
    }
}

/// Highest score per level.
pub struct BestScores<'a, K: KeyValueStore + ?Sized> {
    store: &'a K,
}

impl<'a, K: KeyValueStore + ?Sized> BestScores<'a, K> {
    pub fn new(store: &'a K) -> Self {
        Self { store }
    }

    pub fn all(&self) -> Result<IndexMap<String, u32>, StorageError> {
        Ok(read_json(self.store, KEY_BEST)?.unwrap_or_default())
    }

    /// Stored best for `level`, zero when never played.
    pub fn get(&self, level: &str) -> Result<u32, StorageError> {
        Ok(self.all()?.get(level).copied().unwrap_or(0))
    }

    /// Store `score` if it beats the current best. Returns whether it did.
    pub fn update(&self, level: &str, score: u32) -> Result<bool, StorageError> {
        let mut table = self.all()?;
        let current = table.get(level).copied().unwrap_or(0);
        if score > current {
            table.insert(level.to_string(), score);
            write_json(self.store, KEY_BEST, &table)?;
            return Ok(true);
        }
        Ok(false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme: {other}")),
        }
    }
}

/// Light/dark preference, stored as a bare string.
pub struct ThemePreference<'a, K: KeyValueStore + ?Sized> {
    store: &'a K,
}

impl<'a, K: KeyValueStore + ?Sized> ThemePreference<'a, K> {
    pub fn new(store: &'a K) -> Self {
        Self { store }
    }

    /// Stored theme; anything other than `dark` reads as light.
    pub fn get(&self) -> Result<Theme, StorageError> {
        Ok(match self.store.get(KEY_THEME)?.as_deref() {
            Some("dark") => Theme::Dark,
            _ => Theme::Light,
        })
    }

    pub fn set(&self, theme: Theme) -> Result<(), StorageError> {
        self.store.set(KEY_THEME, theme.as_str())
    }

    pub fn toggle(&self) -> Result<Theme, StorageError> {
        let next = self.get()?.toggled();
        self.set(next)?;
        Ok(next)
    }
}
