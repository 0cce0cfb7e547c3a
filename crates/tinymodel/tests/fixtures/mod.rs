//! In-memory connection used by the integration tests.
//!
//! Rows live in per-table vectors, every statement is recorded, and the
//! generated key, column listing and date format are configurable.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tinymodel::prelude::*;

/// A statement the connection received.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Select(Query),
    Insert {
        table: String,
        values: Vec<AttributeItem>,
    },
    InsertGetId {
        table: String,
        values: Vec<AttributeItem>,
        key: String,
    },
    Update {
        query: Query,
        values: Vec<AttributeItem>,
    },
    Delete(Query),
}

#[derive(Debug, Default)]
struct MockState {
    tables: HashMap<String, Vec<Row>>,
    calls: Vec<Call>,
    next_id: u64,
    column_listings: usize,
}

#[derive(Debug)]
pub struct MockConnection {
    name: String,
    date_format: String,
    columns: HashMap<String, Vec<String>>,
    generated_id: Option<u64>,
    state: Mutex<MockState>,
}

impl MockConnection {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            date_format: tinymodel::DEFAULT_DATE_FORMAT.to_owned(),
            columns: HashMap::new(),
            generated_id: None,
            state: Mutex::new(MockState {
                next_id: 1,
                ..MockState::default()
            }),
        }
    }

    pub fn with_date_format(mut self, format: &str) -> Self {
        self.date_format = format.to_owned();
        self
    }

    pub fn with_columns(mut self, table: &str, columns: &[&str]) -> Self {
        self.columns.insert(
            table.to_owned(),
            columns.iter().map(|c| (*c).to_owned()).collect(),
        );
        self
    }

    /// Always report `id` from `insert_get_id`.
    pub fn with_generated_id(mut self, id: u64) -> Self {
        self.generated_id = Some(id);
        self
    }

    pub fn with_row(self, table: &str, row: Row) -> Self {
        self.state()
            .tables
            .entry(table.to_owned())
            .or_default()
            .push(row);
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.state().tables.get(table).cloned().unwrap_or_default()
    }

    pub fn column_listing_calls(&self) -> usize {
        self.state().column_listings
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl QueryExecutor for MockConnection {
    fn select(&self, query: &Query) -> Result<Vec<Row>> {
        let mut state = self.state();
        state.calls.push(Call::Select(query.clone()));
        let rows = state
            .tables
            .get(&query.table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| query.matches(row))
                    .take(query.limit.unwrap_or(usize::MAX))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(rows)
    }

    fn insert(&self, table: &str, values: &[AttributeItem]) -> Result<()> {
        let mut state = self.state();
        state.calls.push(Call::Insert {
            table: table.to_owned(),
            values: values.to_vec(),
        });
        state
            .tables
            .entry(table.to_owned())
            .or_default()
            .push(values.to_vec());
        Ok(())
    }

    fn insert_get_id(&self, table: &str, values: &[AttributeItem], key_name: &str) -> Result<u64> {
        let mut state = self.state();
        state.calls.push(Call::InsertGetId {
            table: table.to_owned(),
            values: values.to_vec(),
            key: key_name.to_owned(),
        });

        let id = match self.generated_id {
            Some(id) => id,
            None => {
                let id = state.next_id;
                state.next_id += 1;
                id
            }
        };

        let mut row = values.to_vec();
        if id != 0 {
            row.retain(|item| item.key != key_name);
            row.push(AttributeItem::new(key_name, Value::BigInt(i64::try_from(id).unwrap())));
        }
        state.tables.entry(table.to_owned()).or_default().push(row);
        Ok(id)
    }

    fn update(&self, query: &Query, values: &[AttributeItem]) -> Result<u64> {
        let mut state = self.state();
        state.calls.push(Call::Update {
            query: query.clone(),
            values: values.to_vec(),
        });

        let mut affected = 0;
        if let Some(rows) = state.tables.get_mut(&query.table) {
            for row in rows.iter_mut().filter(|row| query.matches(row)) {
                for value in values {
                    match row.iter_mut().find(|item| item.key == value.key) {
                        Some(item) => item.value = value.value.clone(),
                        None => row.push(value.clone()),
                    }
                }
                affected += 1;
            }
        }
        Ok(affected)
    }

    fn delete(&self, query: &Query) -> Result<u64> {
        let mut state = self.state();
        state.calls.push(Call::Delete(query.clone()));

        let mut affected = 0;
        if let Some(rows) = state.tables.get_mut(&query.table) {
            let before = rows.len();
            rows.retain(|row| !query.matches(row));
            affected = (before - rows.len()) as u64;
        }
        Ok(affected)
    }
}

impl SchemaIntrospector for MockConnection {
    fn column_listing(&self, table: &str) -> Result<Vec<String>> {
        self.state().column_listings += 1;
        Ok(self.columns.get(table).cloned().unwrap_or_default())
    }
}

impl DateFormatProvider for MockConnection {
    fn date_format(&self) -> &str {
        &self.date_format
    }
}

impl Connection for MockConnection {
    fn name(&self) -> &str {
        &self.name
    }
}

/// A resolver whose only (and default) connection is `connection`.
pub fn resolver(connection: &Arc<MockConnection>) -> Arc<dyn ConnectionResolver> {
    let connection: Arc<dyn Connection> = Arc::clone(connection) as Arc<dyn Connection>;
    ConnectionRegistry::new()
        .with_connection(connection)
        .into_shared()
}

/// Build attribute items from `(key, value)` pairs.
pub fn attrs<const N: usize>(pairs: [(&str, Value); N]) -> Vec<AttributeItem> {
    pairs
        .into_iter()
        .map(|(key, value)| AttributeItem::new(key, value))
        .collect()
}
