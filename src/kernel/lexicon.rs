use std::collections::HashMap;

use serde::{Deserialize, Serialize};

const MONTHS: [(&str, &str); 12] = [
    ("january", "01"),
    ("february", "02"),
    ("march", "03"),
    ("april", "04"),
    ("may", "05"),
    ("june", "06"),
    ("july", "07"),
    ("august", "08"),
    ("september", "09"),
    ("october", "10"),
    ("november", "11"),
    ("december", "12"),
];

/// Lowercase month name -> two-digit month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthTable {
    months: HashMap<String, String>,
}

impl MonthTable {
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.months.get(&name.to_lowercase()).map(String::as_str)
    }
}

impl Default for MonthTable {
    fn default() -> Self {
        Self {
            months: MONTHS
                .iter()
                .map(|(name, num)| (name.to_string(), num.to_string()))
                .collect(),
        }
    }
}

/// Song name -> audio asset path served to the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SongTable {
    songs: HashMap<String, String>,
}

impl SongTable {
    pub fn new(songs: HashMap<String, String>) -> Self {
        Self {
            songs: songs
                .into_iter()
                .map(|(name, path)| (name.trim().to_lowercase(), path))
                .collect(),
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.songs.get(name).map(String::as_str)
    }

    /// Entries from `other` win over existing ones.
    pub fn merge(&mut self, other: SongTable) {
        for (name, path) in other.songs {
            self.songs.insert(name.trim().to_lowercase(), path);
        }
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }
}

impl Default for SongTable {
    fn default() -> Self {
        let mut songs = HashMap::new();
        songs.insert("lover".to_string(), "games/assets/audio/Lover.mp3".to_string());
        Self { songs }
    }
}

/// Read-only lookup tables shared by every dispatch.
/// Built once at startup and handed to the matcher and compiler behind an `Arc`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lexicon {
    pub months: MonthTable,
    pub songs: SongTable,
}
