//! The save / update / delete / refresh lifecycle.
//!
//! A transient model is INSERTed on save and becomes persisted. A persisted
//! model UPDATEs exactly its dirty attributes, keyed by the primary key value
//! it was loaded or last saved with. Every successful save re-syncs the
//! original snapshot.

use crate::model::Model;
use tinymodel_core::{Entity, Error, Query, RecordsNotFoundError, Result, Value};

/// Options for [`Model::save`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOptions {
    /// Touch the owners listed in the entity's `touches` after a dirty save.
    pub touch: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self { touch: true }
    }
}

impl SaveOptions {
    pub const fn without_touch() -> Self {
        Self { touch: false }
    }
}

impl<E: Entity> Model<E> {
    // ========================================================================
    // Save
    // ========================================================================

    /// Insert or update the model.
    #[tracing::instrument(level = "debug", skip(self), fields(model = E::model_name(), table = %self.table))]
    pub fn save(&mut self, options: SaveOptions) -> Result<bool> {
        let saved = if self.exists {
            if self.is_dirty() {
                self.perform_update()?
            } else {
                true
            }
        } else {
            let saved = self.perform_insert()?;
            if self.connection_name.is_none() {
                self.connection_name = Some(self.connection.name().to_owned());
            }
            saved
        };

        if saved {
            self.finish_save(options)?;
        }
        Ok(saved)
    }

    /// Fill and save a persisted model. Transient models are left alone.
    pub fn update(
        &mut self,
        attributes: impl IntoIterator<Item = tinymodel_core::AttributeItem>,
        options: SaveOptions,
    ) -> Result<bool> {
        if !self.exists {
            return Ok(false);
        }
        self.fill(attributes)?;
        self.save(options)
    }

    /// Save the model and then every loaded relation, depth first.
    ///
    /// Stops at the first model that fails to save.
    #[tracing::instrument(level = "debug", skip(self), fields(model = E::model_name()))]
    pub fn push(&mut self) -> Result<bool> {
        if !self.save(SaveOptions::default())? {
            return Ok(false);
        }

        for (name, relation) in &mut self.relations {
            for related in relation.models_mut() {
                if !related.push()? {
                    tracing::debug!(
                        model = E::model_name(),
                        relation = %name,
                        "Push stopped at a related model that failed to save"
                    );
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    fn finish_save(&mut self, options: SaveOptions) -> Result<()> {
        if options.touch && self.is_dirty() {
            self.touch_owners()?;
        }
        self.sync_original();
        Ok(())
    }

    fn perform_insert(&mut self) -> Result<bool> {
        if self.uses_timestamps() {
            self.update_timestamps();
        }

        if self.get_incrementing() {
            self.insert_and_set_id()?;
        } else {
            if self.attributes.is_empty() {
                return Ok(true);
            }
            self.connection.insert(&self.table, self.attributes.items())?;
        }

        tracing::info!(
            model = E::model_name(),
            table = %self.table,
            "Inserted model"
        );

        self.exists = true;
        Ok(true)
    }

    fn insert_and_set_id(&mut self) -> Result<()> {
        let key_name = self.get_key_name();
        let id = self
            .connection
            .insert_get_id(&self.table, self.attributes.items(), key_name)?;

        // Some drivers report 0 when no id could be obtained.
        if id == 0 {
            tracing::warn!(
                model = E::model_name(),
                table = %self.table,
                "Insert returned no generated key; primary key left unset"
            );
            return Ok(());
        }

        let id = i64::try_from(id).map_err(|_| {
            Error::Custom(format!("Generated key {id} does not fit a BIGINT column."))
        })?;
        self.set_attribute(key_name, Value::BigInt(id));
        Ok(())
    }

    fn perform_update(&mut self) -> Result<bool> {
        if self.uses_timestamps() {
            self.update_timestamps();
        }

        let dirty = self.get_dirty();
        if !dirty.is_empty() {
            let query = self.set_keys_for_save_query(Query::table(&self.table))?;
            let affected = self.connection.update(&query, dirty.items())?;

            tracing::info!(
                model = E::model_name(),
                table = %self.table,
                columns = dirty.len(),
                affected,
                "Updated model"
            );

            self.sync_changes();
        }
        Ok(true)
    }

    /// Primary key value the row is stored under.
    ///
    /// The original value wins so a model whose key was changed still updates
    /// the right row.
    pub fn get_key_for_save_query(&self) -> Value {
        match self.original.get(self.get_key_name()) {
            Some(value) => value.clone(),
            None => self.get_key(),
        }
    }

    fn set_keys_for_save_query(&self, query: Query) -> Result<Query> {
        let key = self.get_key_for_save_query();
        if key.is_null() {
            return Err(Error::precondition(format!(
                "Model '{}' has no primary key value to build a save query.",
                E::model_name()
            )));
        }
        Ok(query.where_eq(self.get_key_name(), key))
    }

    // ========================================================================
    // Delete
    // ========================================================================

    /// Delete the model's row.
    ///
    /// Returns `false` for transient models.
    #[tracing::instrument(level = "debug", skip(self), fields(model = E::model_name(), table = %self.table))]
    pub fn remove(&mut self) -> Result<bool> {
        if self.get_key_name().is_empty() {
            return Err(Error::precondition("No primary key defined on model."));
        }
        if !self.exists {
            return Ok(false);
        }

        self.touch_owners()?;
        self.perform_delete_on_model()?;
        Ok(true)
    }

    /// Alias of [`Self::remove`].
    pub fn delete_model(&mut self) -> Result<bool> {
        self.remove()
    }

    fn perform_delete_on_model(&mut self) -> Result<()> {
        let query = self.set_keys_for_save_query(Query::table(&self.table))?;
        let affected = self.connection.delete(&query)?;

        tracing::info!(
            model = E::model_name(),
            table = %self.table,
            affected,
            "Deleted model"
        );

        self.exists = false;
        Ok(())
    }

    // ========================================================================
    // Reload
    // ========================================================================

    /// A newly hydrated copy of the model's row, `None` for transient models or
    /// when the row is gone.
    #[tracing::instrument(level = "debug", skip(self), fields(model = E::model_name()))]
    pub fn fresh(&self) -> Result<Option<Self>> {
        if !self.exists {
            return Ok(None);
        }

        let query = Query::table(&self.table)
            .where_eq(self.get_key_name(), self.get_key())
            .limit(1);
        match self.connection.select(&query)?.into_iter().next() {
            Some(row) => self.new_from_builder(row).map(Some),
            None => Ok(None),
        }
    }

    /// Reload the model's attributes from its row.
    #[tracing::instrument(level = "debug", skip(self), fields(model = E::model_name()))]
    pub fn refresh(&mut self) -> Result<&mut Self> {
        if !self.exists {
            return Ok(self);
        }

        let key = self.get_key();
        if key.is_null() {
            return Err(Error::precondition(format!(
                "Model '{}' has no primary key value to refresh from.",
                E::model_name()
            )));
        }

        let query = Query::table(&self.table)
            .where_eq(self.get_key_name(), key)
            .limit(1);
        let row = self
            .connection
            .select(&query)?
            .into_iter()
            .next()
            .ok_or_else(|| {
                Error::NotFound(RecordsNotFoundError {
                    model: E::model_name().to_owned(),
                })
            })?;

        self.set_raw_attributes(row, true);
        Ok(self)
    }
}
