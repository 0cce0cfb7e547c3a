//! Error types for TinyModel operations.

use std::fmt;

/// The error type for every fallible model operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A mass assignment hit a totally guarded model.
    MassAssignment(MassAssignmentError),
    /// A value could not be interpreted as a date/time.
    InvalidFormat(InvalidFormatError),
    /// An operation was called on a model in a state that cannot support it.
    Precondition(PreconditionError),
    /// A relation slot holds a different shape or type than requested.
    RelationType(RelationTypeError),
    /// A relation was read before it was loaded.
    RelationNotLoaded(RelationNotLoadedError),
    /// A lookup expected at least one row.
    NotFound(RecordsNotFoundError),
    /// A lookup expected exactly one row.
    MultipleFound(MultipleRecordsFoundError),
    /// The query executor reported a failure.
    Query(QueryError),
    /// The connection could not be resolved or used.
    Connection(ConnectionError),
    /// Anything else.
    Custom(String),
}

impl Error {
    /// Shorthand for a [`PreconditionError`].
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition(PreconditionError {
            message: message.into(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MassAssignmentError {
    pub key: String,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidFormatError {
    /// The offending value rendered as text.
    pub value: String,
    /// The strftime format the value was parsed with.
    pub format: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreconditionError {
    pub message: String,
}

/// Shape of a relation slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationShape {
    One,
    Many,
}

impl fmt::Display for RelationShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::One => f.write_str("one"),
            Self::Many => f.write_str("many"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationTypeError {
    pub relation: String,
    pub expected: RelationShape,
    pub found: RelationShape,
    /// Set when the shape matched but the related entity type did not.
    pub type_mismatch: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationNotLoadedError {
    pub model: String,
    pub relation: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordsNotFoundError {
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipleRecordsFoundError {
    pub model: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryError {
    pub kind: QueryErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryErrorKind {
    /// The backend rejected the statement.
    Database,
    /// A constraint (unique, foreign key, not null) was violated.
    Constraint,
    /// The statement referenced an unknown table or column.
    Schema,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionError {
    pub kind: ConnectionErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionErrorKind {
    /// No connection registered under the requested name.
    NotConfigured,
    /// The connection exists but cannot be used.
    Disconnected,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MassAssignment(e) => write!(
                f,
                "Add '{}' to fillable attributes to allow mass assignment on '{}'.",
                e.key, e.model
            ),
            Self::InvalidFormat(e) => write!(
                f,
                "Could not parse the datetime '{}' using the given format '{}'.",
                e.value, e.format
            ),
            Self::Precondition(e) => f.write_str(&e.message),
            Self::RelationType(e) => match &e.type_mismatch {
                Some(found) => write!(
                    f,
                    "The relation '{}' holds models of type '{}'.",
                    e.relation, found
                ),
                None => write!(
                    f,
                    "The relation '{}' is a {} relation, but it was accessed as a {} relation.",
                    e.relation, e.found, e.expected
                ),
            },
            Self::RelationNotLoaded(e) => write!(
                f,
                "Undefined relation key (in the relations map) '{}' on model '{}'.",
                e.relation, e.model
            ),
            Self::NotFound(e) => write!(f, "No query results for model '{}'.", e.model),
            Self::MultipleFound(e) => write!(
                f,
                "{} records were found for model '{}', exactly one was expected.",
                e.count, e.model
            ),
            Self::Query(e) => write!(f, "Query error ({:?}): {}", e.kind, e.message),
            Self::Connection(e) => write!(f, "Connection error ({:?}): {}", e.kind, e.message),
            Self::Custom(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for Error {}

/// Result alias used across the workspace.
pub type Result<T> = std::result::Result<T, Error>;
