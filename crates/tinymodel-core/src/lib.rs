//! Core types and traits for TinyModel Rust.
//!
//! `tinymodel-core` holds everything a model instance is built from, without the
//! model itself. The persistence state machine lives in `tinymodel-persist`.
//!
//! # Role In The Architecture
//!
//! - **Contract layer**: `Entity` is implemented by user types (usually through
//!   `#[derive(Entity)]`); `Connection` and `ConnectionResolver` are implemented by
//!   database adapters.
//! - **Attribute state**: `AttributeStore` is the ordered, indexed attribute set;
//!   `DirtyTracker` diffs two stores.
//! - **Policies**: the `guard` module decides what a mass assignment may touch;
//!   `ValueTransformer` casts date attributes between storage text and
//!   `NaiveDateTime`.
//! - **Data model**: `Value`, `Query` and `Relation` are shared by every other crate.
//!
//! Most applications should use the `tinymodel` facade.

pub mod attributes;
pub mod connection;
pub mod dates;
pub mod dirty;
pub mod entity;
pub mod error;
pub mod guard;
pub mod query;
pub mod relationship;
pub mod value;

pub use attributes::{AttributeItem, AttributeStore};
pub use connection::{
    Connection, ConnectionRegistry, ConnectionResolver, DateFormatProvider, QueryExecutor, Row,
    SchemaIntrospector,
};
pub use dates::{DEFAULT_DATE_FORMAT, ValueTransformer, check_format};
pub use dirty::{DirtyTracker, has_changes};
pub use entity::{CREATED_AT, Entity, ModelConfig, UPDATED_AT, snake_case};
pub use error::{
    ConnectionError, ConnectionErrorKind, Error, InvalidFormatError, MassAssignmentError,
    MultipleRecordsFoundError, PreconditionError, QueryError, QueryErrorKind,
    RecordsNotFoundError, RelationNotLoadedError, RelationShape, RelationTypeError, Result,
};
pub use guard::{GuardPolicy, MassAssignmentGuard, UnguardedScope, unguarded};
pub use query::{Operator, Query, Where};
pub use relationship::{RelatedModel, Relation};
pub use value::Value;
