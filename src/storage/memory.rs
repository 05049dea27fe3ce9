use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{OrderBy, Predicate, Record, Row, Storage, StorageError, Table};

#[derive(Debug, Default)]
struct TableData {
    next_id: i64,
    rows: Vec<Row>,
}

#[derive(Debug, Default)]
struct Inner {
    tables: HashMap<Table, TableData>,
    // Tables whose every call fails. Test hook.
    failing: HashSet<Table>,
}

/// Process-local storage. Rows live only as long as the value.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    inner: RwLock<Inner>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call against `table` fail until cleared.
    pub async fn set_failing(&self, table: Table, failing: bool) {
        let mut inner = self.inner.write().await;
        if failing {
            inner.failing.insert(table);
        } else {
            inner.failing.remove(&table);
        }
    }

    pub async fn len(&self, table: Table) -> usize {
        let inner = self.inner.read().await;
        inner.tables.get(&table).map(|t| t.rows.len()).unwrap_or(0)
    }

    fn guard(inner: &Inner, table: Table) -> Result<(), StorageError> {
        if inner.failing.contains(&table) {
            return Err(StorageError::Unavailable(format!("{} is failing", table)));
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn insert(&self, table: Table, fields: Record) -> Result<i64, StorageError> {
        table.check(&fields)?;
        let mut inner = self.inner.write().await;
        Self::guard(&inner, table)?;

        let data = inner.tables.entry(table).or_default();
        data.next_id += 1;
        let id = data.next_id;
        data.rows.push(Row { id, fields });
        Ok(id)
    }

    async fn delete(&self, table: Table, predicate: Predicate) -> Result<usize, StorageError> {
        table.column(predicate.column())?;
        let mut inner = self.inner.write().await;
        Self::guard(&inner, table)?;

        let Some(data) = inner.tables.get_mut(&table) else {
            return Ok(0);
        };
        let before = data.rows.len();
        data.rows.retain(|row| !predicate.matches(&row.fields));
        Ok(before - data.rows.len())
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
        let inner = self.inner.read().await;
        Self::guard(&inner, table)?;

        let mut rows: Vec<Row> = inner
            .tables
            .get(&table)
            .map(|data| {
                data.rows
                    .iter()
                    .filter(|row| predicate.as_ref().map_or(true, |p| p.matches(&row.fields)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = order {
            // Ties on the column follow id in the same direction, so "newest first"
            // holds within a day too.
            rows.sort_by(|a, b| {
                let ord = a
                    .get(order.column)
                    .cmp(b.get(order.column))
                    .then(a.id.cmp(&b.id));
                if order.descending {
                    ord.reverse()
                } else {
                    ord
                }
            });
        }
        Ok(rows)
    }
}
