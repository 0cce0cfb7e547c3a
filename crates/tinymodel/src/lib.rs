//! TinyModel Rust: active-record models with tracked attributes.
//!
//! A model is one row of a table held in memory. It remembers the attributes
//! it was loaded (or last saved) with, so it can tell which ones changed and
//! write only those back. Mass assignment is filtered through per-entity
//! fillable / guarded lists, and date attributes are stored as formatted text
//! but read back as [`chrono::NaiveDateTime`] values.
//!
//! # Quick Start
//!
//! ```ignore
//! use tinymodel::prelude::*;
//!
//! #[derive(Entity)]
//! #[tinymodel(table = "torrents", fillable = ["name", "size"], dates = ["added_on"])]
//! struct Torrent;
//!
//! let resolver = ConnectionRegistry::new()
//!     .with_connection(my_connection)
//!     .into_shared();
//!
//! let mut torrent = Model::<Torrent>::instance(resolver.clone(), vec![
//!     AttributeItem::new("name", "test1"),
//!     AttributeItem::new("size", 11),
//! ])?;
//! torrent.save(SaveOptions::default())?;
//!
//! let found = Model::<Torrent>::find_or_fail(&resolver, torrent.get_key())?;
//! assert!(found.is(&torrent));
//! ```
//!
//! # Crates
//!
//! - `tinymodel-core`: values, attribute stores, guards, date casting, the
//!   connection traits
//! - `tinymodel-persist`: [`Model`] and its save / delete / refresh lifecycle
//! - `tinymodel-macros`: `#[derive(Entity)]`

pub use tinymodel_core::error::{
    ConnectionError, ConnectionErrorKind, InvalidFormatError, MassAssignmentError,
    MultipleRecordsFoundError, PreconditionError, QueryError, QueryErrorKind,
    RecordsNotFoundError, RelationNotLoadedError, RelationShape, RelationTypeError,
};
pub use tinymodel_core::{
    AttributeItem, AttributeStore, CREATED_AT, Connection, ConnectionRegistry,
    ConnectionResolver, DEFAULT_DATE_FORMAT, DateFormatProvider, DirtyTracker, Entity, Error, GuardPolicy,
    ModelConfig, Operator, Query, QueryExecutor, RelatedModel, Relation, Result, Row,
    SchemaIntrospector, UPDATED_AT, Value, ValueTransformer, guard,
};
pub use tinymodel_macros::Entity;
pub use tinymodel_persist::{Model, SaveOptions};

pub use chrono;

/// Everything a typical application needs.
pub mod prelude {
    pub use tinymodel_core::guard::{reguard, unguard, unguarded};
    pub use tinymodel_core::{
        AttributeItem, AttributeStore, Connection, ConnectionRegistry, ConnectionResolver,
        DateFormatProvider, Entity, Error, ModelConfig, Query, QueryExecutor, Relation, Result,
        Row, SchemaIntrospector, Value,
    };
    pub use tinymodel_macros::Entity;
    pub use tinymodel_persist::{Model, SaveOptions};
}
