//! Storage collaborator.
//!
//! The interpreter only ever talks to the [`Storage`] trait. Three tables exist and every
//! column is text; ids are assigned by the backend.

pub mod memory;
pub mod sqlite;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

pub use memory::InMemoryStorage;
pub use sqlite::SqliteStorage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Table {
    MoodLog,
    CalendarEvent,
    Medicine,
}

impl Table {
    pub const ALL: [Table; 3] = [Table::MoodLog, Table::CalendarEvent, Table::Medicine];

    pub fn name(&self) -> &'static str {
        match self {
            Table::MoodLog => "mood_log",
            Table::CalendarEvent => "calendar_event",
            Table::Medicine => "medicine",
        }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Table::MoodLog => &["mood", "date"],
            Table::CalendarEvent => &["title", "date"],
            Table::Medicine => &["name", "dosage", "time", "date"],
        }
    }

    /// Maps a column name onto the table's own static name, rejecting anything else.
    pub fn column(&self, name: &str) -> Result<&'static str, StorageError> {
        self.columns()
            .iter()
            .find(|c| **c == name)
            .copied()
            .ok_or_else(|| StorageError::UnknownColumn {
                table: self.name(),
                column: name.to_string(),
            })
    }

    /// Every column present, nothing extra.
    pub fn check(&self, record: &Record) -> Result<(), StorageError> {
        for key in record.keys() {
            self.column(key)?;
        }
        for column in self.columns() {
            if !record.contains_key(column) {
                return Err(StorageError::MissingColumn {
                    table: self.name(),
                    column: *column,
                });
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Column -> value for one row, without its id.
pub type Record = BTreeMap<&'static str, String>;

/// Builds a [`Record`] from `(column, value)` pairs.
pub fn record<const N: usize>(pairs: [(&'static str, String); N]) -> Record {
    pairs.into_iter().collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    pub id: i64,
    pub fields: Record,
}

impl Row {
    /// Column value, or empty when the backend returned none.
    pub fn get(&self, column: &str) -> &str {
        self.fields.get(column).map(String::as_str).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Eq {
        column: &'static str,
        value: String,
    },
    /// Inclusive on both ends.
    Between {
        column: &'static str,
        low: String,
        high: String,
    },
}

impl Predicate {
    pub fn equals(column: &'static str, value: impl Into<String>) -> Self {
        Predicate::Eq { column, value: value.into() }
    }

    pub fn between(column: &'static str, low: impl Into<String>, high: impl Into<String>) -> Self {
        Predicate::Between {
            column,
            low: low.into(),
            high: high.into(),
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            Predicate::Eq { column, .. } | Predicate::Between { column, .. } => *column,
        }
    }

    pub fn matches(&self, record: &Record) -> bool {
        let Some(value) = record.get(self.column()) else {
            return false;
        };
        match self {
            Predicate::Eq { value: want, .. } => value == want,
            Predicate::Between { low, high, .. } => value >= low && value <= high,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub column: &'static str,
    pub descending: bool,
}

impl OrderBy {
    pub fn asc(column: &'static str) -> Self {
        Self { column, descending: false }
    }

    pub fn desc(column: &'static str) -> Self {
        Self { column, descending: true }
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("table `{table}` has no column `{column}`")]
    UnknownColumn { table: &'static str, column: String },

    #[error("table `{table}` requires column `{column}`")]
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait Storage: Send + Sync {
    /// Returns the new row id.
    async fn insert(&self, table: Table, fields: Record) -> Result<i64, StorageError>;

    /// Returns how many rows were removed.
    async fn delete(&self, table: Table, predicate: Predicate) -> Result<usize, StorageError>;

    async fn select_all(
        &self,
        table: Table,
        predicate: Option<Predicate>,
        order: Option<OrderBy>,
    ) -> Result<Vec<Row>, StorageError>;
}
