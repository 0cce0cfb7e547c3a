//! Loading models by key or constraint.

use crate::model::Model;
use std::sync::Arc;
use tinymodel_core::{
    ConnectionResolver, Entity, Error, MultipleRecordsFoundError, Query, RecordsNotFoundError,
    Result, Row, Value,
};

impl<E: Entity> Model<E> {
    /// A query targeting this entity's table.
    pub fn query(&self) -> Query {
        Query::table(&self.table)
    }

    /// Turn fetched rows into persisted models.
    pub fn hydrate(&self, rows: Vec<Row>) -> Result<Vec<Self>> {
        rows.into_iter()
            .map(|row| self.new_from_builder(row))
            .collect()
    }

    /// Run `build(query)` against the entity's table and hydrate the result.
    #[tracing::instrument(level = "debug", skip(resolver, build), fields(model = E::model_name()))]
    pub fn select(
        resolver: &Arc<dyn ConnectionResolver>,
        build: impl FnOnce(Query) -> Query,
    ) -> Result<Vec<Self>> {
        let prototype = Self::new(Arc::clone(resolver))?;
        let query = build(prototype.query());
        let rows = prototype.connection.select(&query)?;

        tracing::debug!(
            model = E::model_name(),
            table = %query.table,
            rows = rows.len(),
            "Selected models"
        );

        prototype.hydrate(rows)
    }

    pub fn all(resolver: &Arc<dyn ConnectionResolver>) -> Result<Vec<Self>> {
        Self::select(resolver, |query| query)
    }

    pub fn find(resolver: &Arc<dyn ConnectionResolver>, id: impl Into<Value>) -> Result<Option<Self>> {
        let id = id.into();
        let models = Self::select(resolver, |query| query.where_eq(E::PRIMARY_KEY, id).limit(1))?;
        Ok(models.into_iter().next())
    }

    pub fn find_or_fail(resolver: &Arc<dyn ConnectionResolver>, id: impl Into<Value>) -> Result<Self> {
        Self::find(resolver, id)?.ok_or_else(not_found::<E>)
    }

    pub fn first_where(
        resolver: &Arc<dyn ConnectionResolver>,
        column: &str,
        value: impl Into<Value>,
    ) -> Result<Option<Self>> {
        let value = value.into();
        let models = Self::select(resolver, |query| query.where_eq(column, value).limit(1))?;
        Ok(models.into_iter().next())
    }

    /// The only model matching `build(query)`.
    pub fn sole(
        resolver: &Arc<dyn ConnectionResolver>,
        build: impl FnOnce(Query) -> Query,
    ) -> Result<Self> {
        let mut models = Self::select(resolver, |query| build(query).limit(2))?;
        match models.len() {
            0 => Err(not_found::<E>()),
            1 => Ok(models.remove(0)),
            count => Err(Error::MultipleFound(MultipleRecordsFoundError {
                model: E::model_name().to_owned(),
                count,
            })),
        }
    }
}

fn not_found<E: Entity>() -> Error {
    Error::NotFound(RecordsNotFoundError {
        model: E::model_name().to_owned(),
    })
}
