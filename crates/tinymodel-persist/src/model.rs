//! The model instance: attribute state plus its persistence context.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tinymodel_core::entity::snake_case;
use tinymodel_core::{
    AttributeItem, AttributeStore, Connection, ConnectionResolver, Entity, Relation, Result,
    Value, ValueTransformer,
};

/// One row of an entity's table, tracked in memory.
///
/// A model is either transient (`exists() == false`, never saved or deleted)
/// or persisted. It keeps three attribute stores: the current attributes, the
/// "original" snapshot taken at the last sync point, and the "changes" made
/// by the last update.
pub struct Model<E: Entity> {
    pub(crate) resolver: Arc<dyn ConnectionResolver>,
    pub(crate) connection: Arc<dyn Connection>,
    pub(crate) connection_name: Option<String>,
    pub(crate) table: String,
    pub(crate) date_format: Option<String>,
    pub(crate) transformer: ValueTransformer,
    pub(crate) timestamps: bool,
    pub(crate) incrementing: bool,
    pub(crate) attributes: AttributeStore,
    pub(crate) original: AttributeStore,
    pub(crate) changes: AttributeStore,
    pub(crate) relations: BTreeMap<String, Relation>,
    pub(crate) exists: bool,
    entity: PhantomData<fn() -> E>,
}

// ============================================================================
// Construction
// ============================================================================

impl<E: Entity> Model<E> {
    /// Create a transient model holding the entity's default attributes.
    ///
    /// Fails with [`Error::InvalidFormat`](tinymodel_core::Error::InvalidFormat)
    /// when the entity's or the connection's date format cannot be written.
    pub fn new(resolver: Arc<dyn ConnectionResolver>) -> Result<Self> {
        let config = E::config();
        let connection = resolver.connection(config.connection)?;
        let transformer = ValueTransformer::new(
            config.date_attributes(config.timestamps),
            config.date_format.unwrap_or_else(|| connection.date_format()),
        )?;

        let mut model = Self {
            resolver,
            connection,
            connection_name: config.connection.map(str::to_owned),
            table: E::TABLE_NAME.to_owned(),
            date_format: None,
            transformer,
            timestamps: config.timestamps,
            incrementing: config.incrementing,
            attributes: AttributeStore::new(),
            original: AttributeStore::new(),
            changes: AttributeStore::new(),
            relations: BTreeMap::new(),
            exists: false,
            entity: PhantomData,
        };

        model.fill(E::default_attributes())?;
        model.sync_original();
        Ok(model)
    }

    /// Create a transient model and mass assign `attributes` on top of the
    /// defaults.
    pub fn instance(
        resolver: Arc<dyn ConnectionResolver>,
        attributes: impl IntoIterator<Item = AttributeItem>,
    ) -> Result<Self> {
        let mut model = Self::new(resolver)?;
        model.fill(attributes)?;
        Ok(model)
    }

    /// Create a sibling model on the same connection and table.
    pub fn new_instance(
        &self,
        attributes: impl IntoIterator<Item = AttributeItem>,
        exists: bool,
    ) -> Result<Self> {
        let mut model = Self::new(Arc::clone(&self.resolver))?;
        model.connection = Arc::clone(&self.connection);
        model.connection_name.clone_from(&self.connection_name);
        model.table.clone_from(&self.table);
        model.date_format.clone_from(&self.date_format);
        model.transformer = self.transformer.clone().with_dates(model.get_dates());
        model.incrementing = self.incrementing;
        model.fill(attributes)?;
        model.exists = exists;
        Ok(model)
    }

    /// Create a persisted model from a fetched row, bypassing mass assignment.
    pub fn new_from_builder(&self, row: impl IntoIterator<Item = AttributeItem>) -> Result<Self> {
        let mut model = self.new_instance(Vec::new(), true)?;
        model.set_raw_attributes(row, true);
        Ok(model)
    }

    // ========================================================================
    // Identity
    // ========================================================================

    /// Whether the model is persisted.
    pub fn exists(&self) -> bool {
        self.exists
    }

    pub fn get_table(&self) -> &str {
        &self.table
    }

    pub fn set_table(&mut self, table: impl Into<String>) -> &mut Self {
        self.table = table.into();
        self
    }

    pub fn get_key_name(&self) -> &'static str {
        E::PRIMARY_KEY
    }

    /// The primary key, table-qualified.
    pub fn get_qualified_key_name(&self) -> String {
        self.qualify_column(E::PRIMARY_KEY)
    }

    /// Current primary key value, `Null` when unset.
    pub fn get_key(&self) -> Value {
        self.attributes
            .get(E::PRIMARY_KEY)
            .cloned()
            .unwrap_or_default()
    }

    /// Whether inserts take the primary key from the database.
    pub fn get_incrementing(&self) -> bool {
        self.incrementing
    }

    /// Turn key generation on or off for this instance.
    pub fn set_incrementing(&mut self, value: bool) -> &mut Self {
        self.incrementing = value;
        self
    }

    /// Prefix `column` with the table name unless it is already qualified.
    pub fn qualify_column(&self, column: &str) -> String {
        if column.contains('.') {
            return column.to_owned();
        }
        format!("{}.{}", self.table, column)
    }

    /// Default foreign key name other tables use to reference this entity.
    pub fn get_foreign_key(&self) -> String {
        format!("{}_{}", snake_case(E::model_name()), E::PRIMARY_KEY)
    }

    /// Connection name as configured, `None` for the default connection.
    pub fn get_connection_name(&self) -> Option<&str> {
        self.connection_name.as_deref()
    }

    pub fn get_connection(&self) -> &Arc<dyn Connection> {
        &self.connection
    }

    /// Switch the model to another named connection.
    ///
    /// Without a model or entity date format, the new connection's format must
    /// be writable.
    pub fn set_connection(&mut self, name: impl Into<String>) -> Result<&mut Self> {
        let name = name.into();
        let connection = self.resolver.connection(Some(&name))?;
        let format = self
            .date_format
            .as_deref()
            .or(E::config().date_format)
            .unwrap_or_else(|| connection.date_format());
        self.transformer = ValueTransformer::new(self.get_dates(), format)?;
        self.connection = connection;
        self.connection_name = Some(name);
        Ok(self)
    }

    /// Same primary key, table and connection.
    ///
    /// Keys of different integer widths name the same row.
    pub fn is<R: Entity>(&self, other: &Model<R>) -> bool {
        let key = self.get_key();
        !key.is_null()
            && key.same_key(&other.get_key())
            && self.table == other.table
            && self.connection.name() == other.connection.name()
    }

    pub fn is_not<R: Entity>(&self, other: &Model<R>) -> bool {
        !self.is(other)
    }

    // ========================================================================
    // Casting Context
    // ========================================================================

    /// Storage format of date attributes.
    ///
    /// Falls back to the entity's configured format, then to the connection's.
    pub fn get_date_format(&self) -> &str {
        self.transformer.format()
    }

    /// Override the storage format for this instance.
    ///
    /// An unwritable format is rejected and the previous one kept.
    pub fn set_date_format(&mut self, format: impl Into<String>) -> Result<&mut Self> {
        let format = format.into();
        self.transformer = ValueTransformer::new(self.get_dates(), format.as_str())?;
        self.date_format = Some(format);
        Ok(self)
    }

    /// Attributes cast to date/time.
    pub fn get_dates(&self) -> Vec<String> {
        E::config().date_attributes(self.timestamps)
    }

    pub(crate) fn transformer(&self) -> &ValueTransformer {
        &self.transformer
    }

    // ========================================================================
    // Serialization
    // ========================================================================

    /// Current attributes as a JSON object, in insertion order.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(&self.attributes)
            .map_err(|e| tinymodel_core::Error::Custom(format!("JSON serialization failed: {e}")))
    }
}

impl<E: Entity> Clone for Model<E> {
    fn clone(&self) -> Self {
        Self {
            resolver: Arc::clone(&self.resolver),
            connection: Arc::clone(&self.connection),
            connection_name: self.connection_name.clone(),
            table: self.table.clone(),
            date_format: self.date_format.clone(),
            transformer: self.transformer.clone(),
            timestamps: self.timestamps,
            incrementing: self.incrementing,
            attributes: self.attributes.clone(),
            original: self.original.clone(),
            changes: self.changes.clone(),
            relations: self.relations.clone(),
            exists: self.exists,
            entity: PhantomData,
        }
    }
}

impl<E: Entity> fmt::Debug for Model<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(E::model_name())
            .field("table", &self.table)
            .field("connection", &self.connection.name())
            .field("exists", &self.exists)
            .field("attributes", &self.attributes)
            .field("relations", &self.relations.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl<E: Entity> Serialize for Model<E> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.attributes.serialize(serializer)
    }
}
