use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params_from_iter, Connection};
use tracing::debug;

use super::{OrderBy, Predicate, Record, Row, Storage, StorageError, Table};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS mood_log (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        mood TEXT NOT NULL,
        date TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS calendar_event (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        date TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_calendar_event_date ON calendar_event(date);

    CREATE TABLE IF NOT EXISTS medicine (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        dosage TEXT NOT NULL DEFAULT '',
        time TEXT NOT NULL,
        date TEXT NOT NULL
    );
"#;

/// SQLite-backed storage. Blocking calls run on the tokio blocking pool.
#[derive(Clone)]
pub struct SqliteStorage {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStorage {
    /// Open (or create) the database at `path`. `:memory:` gives a private in-memory db.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    pub fn in_memory() -> Result<Self, StorageError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn run<T, F>(&self, f: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StorageError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| StorageError::Unavailable("connection lock poisoned".into()))?;
            f(&*guard)
        })
        .await
        .map_err(|e| StorageError::Unavailable(format!("storage task failed: {}", e)))?
    }
}

fn where_clause(predicate: &Predicate) -> (String, Vec<String>) {
    match predicate {
        Predicate::Eq { column, value } => (format!(" WHERE {} = ?", column), vec![value.clone()]),
        Predicate::Between { column, low, high } => (
            format!(" WHERE {} BETWEEN ? AND ?", column),
            vec![low.clone(), high.clone()],
        ),
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn insert(&self, table: Table, fields: Record) -> Result<i64, StorageError> {
        table.check(&fields)?;
        self.run(move |conn| {
            // Column names come from the table's own whitelist, values are bound.
            let columns: Vec<&str> = fields.keys().copied().collect();
            let marks = vec!["?"; columns.len()].join(", ");
            let sql = format!(
                "INSERT INTO {} ({}) VALUES ({})",
                table.name(),
                columns.join(", "),
                marks
            );
            conn.execute(&sql, params_from_iter(fields.values()))?;
            let id = conn.last_insert_rowid();
            debug!(table = table.name(), id, "row inserted");
            Ok(id)
        })
        .await
    }

    async fn delete(&self, table: Table, predicate: Predicate) -> Result<usize, StorageError> {
        table.column(predicate.column())?;
        self.run(move |conn| {
            let (clause, values) = where_clause(&predicate);
            let sql = format!("DELETE FROM {}{}", table.name(), clause);
            let removed = conn.execute(&sql, params_from_iter(values.iter()))?;
            Ok(removed)
        })
        .await
    }

    async fn select_all(
        &self,
        table: Table,
        predicate: Option<Predicate>,
        order: Option<OrderBy>,
    ) -> Result<Vec<Row>, StorageError> {
        if let Some(p) = &predicate {
            table.column(p.column())?;
        }
        if let Some(o) = &order {
            table.column(o.column)?;
        }

        self.run(move |conn| {
            let columns = table.columns();
            let (clause, values) = predicate.as_ref().map(where_clause).unwrap_or_default();
            let order_sql = match order {
                Some(o) => {
                    let dir = if o.descending { "DESC" } else { "ASC" };
                    format!(" ORDER BY {} {}, id {}", o.column, dir, dir)
                }
                None => " ORDER BY id ASC".to_string(),
            };
            let sql = format!(
                "SELECT id, {} FROM {}{}{}",
                columns.join(", "),
                table.name(),
                clause,
                order_sql
            );

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(values.iter()), |row| {
                let mut fields = Record::new();
                for (i, column) in columns.iter().enumerate() {
                    let value: Option<String> = row.get(i + 1)?;
                    fields.insert(*column, value.unwrap_or_default());
                }
                Ok(Row {
                    id: row.get(0)?,
                    fields,
                })
            })?;

            let mut out = Vec::new();
            for row in rows {
                out.push(row?);
            }
            Ok(out)
        })
        .await
    }
}
