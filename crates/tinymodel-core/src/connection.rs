//! Database collaborator traits.
//!
//! A model talks to its database through three narrow capabilities: running
//! statements ([`QueryExecutor`]), listing a table's columns
//! ([`SchemaIntrospector`]) and reporting the storage date format
//! ([`DateFormatProvider`]). A [`Connection`] bundles them under a name, and a
//! [`ConnectionResolver`] maps names to connections.

use crate::attributes::AttributeItem;
use crate::dates::DEFAULT_DATE_FORMAT;
use crate::error::{ConnectionError, ConnectionErrorKind, Error, Result};
use crate::query::Query;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A result row: column name/value pairs in select order.
pub type Row = Vec<AttributeItem>;

/// Executes statements against the backend.
pub trait QueryExecutor {
    fn select(&self, query: &Query) -> Result<Vec<Row>>;

    fn insert(&self, table: &str, values: &[AttributeItem]) -> Result<()>;

    /// Insert a row and return the generated key, or `0` when none was produced.
    fn insert_get_id(&self, table: &str, values: &[AttributeItem], key_name: &str)
    -> Result<u64>;

    /// Update every row matched by `query`. Returns the affected row count.
    fn update(&self, query: &Query, values: &[AttributeItem]) -> Result<u64>;

    /// Delete every row matched by `query`. Returns the affected row count.
    fn delete(&self, query: &Query) -> Result<u64>;
}

pub trait SchemaIntrospector {
    /// Column names of `table`.
    fn column_listing(&self, table: &str) -> Result<Vec<String>>;
}

pub trait DateFormatProvider {
    fn date_format(&self) -> &str {
        DEFAULT_DATE_FORMAT
    }
}

/// A named database connection.
pub trait Connection: QueryExecutor + SchemaIntrospector + DateFormatProvider + Send + Sync {
    fn name(&self) -> &str;
}

/// Maps connection names to connections.
pub trait ConnectionResolver: Send + Sync {
    /// Resolve `name`, or the default connection for `None` / an empty name.
    fn connection(&self, name: Option<&str>) -> Result<Arc<dyn Connection>>;

    fn default_connection(&self) -> &str;
}

/// In-process [`ConnectionResolver`] over a fixed set of connections.
#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    connections: HashMap<String, Arc<dyn Connection>>,
    default: String,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection under its own name.
    ///
    /// The first registered connection becomes the default.
    pub fn with_connection(mut self, connection: Arc<dyn Connection>) -> Self {
        let name = connection.name().to_owned();
        if self.default.is_empty() {
            self.default.clone_from(&name);
        }
        self.connections.insert(name, connection);
        self
    }

    pub fn with_default(mut self, name: impl Into<String>) -> Self {
        self.default = name.into();
        self
    }

    pub fn connection_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.connections.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Wrap the registry for sharing between models.
    pub fn into_shared(self) -> Arc<dyn ConnectionResolver> {
        Arc::new(self)
    }
}

impl ConnectionResolver for ConnectionRegistry {
    fn connection(&self, name: Option<&str>) -> Result<Arc<dyn Connection>> {
        let name = match name {
            Some(name) if !name.is_empty() => name,
            _ => self.default.as_str(),
        };

        self.connections.get(name).cloned().ok_or_else(|| {
            Error::Connection(ConnectionError {
                kind: ConnectionErrorKind::NotConfigured,
                message: format!("Database connection '{name}' is not configured."),
            })
        })
    }

    fn default_connection(&self) -> &str {
        &self.default
    }
}

impl fmt::Debug for ConnectionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionRegistry")
            .field("connections", &self.connection_names())
            .field("default", &self.default)
            .finish()
    }
}
