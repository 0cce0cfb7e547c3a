//! Attribute access and dirty tracking on a model.

use crate::model::Model;
use tinymodel_core::{
    AttributeItem, AttributeStore, DirtyTracker, Entity, Result, Value, has_changes,
};

impl<E: Entity> Model<E> {
    // ========================================================================
    // Reading
    // ========================================================================

    /// Attribute value as callers see it: date attributes come back as
    /// [`Value::DateTime`], absent attributes as `Null`.
    pub fn get_attribute(&self, key: &str) -> Result<Value> {
        if key.is_empty() {
            return Ok(Value::Null);
        }
        match self.attributes.get(key) {
            Some(value) => self.transformer().to_rich(key, value),
            None => Ok(Value::Null),
        }
    }

    /// Stored attribute value, without casting.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn get_attributes(&self) -> &[AttributeItem] {
        self.attributes.items()
    }

    pub fn attribute_store(&self) -> &AttributeStore {
        &self.attributes
    }

    // ========================================================================
    // Writing
    // ========================================================================

    /// Set an attribute, converting calendar values to storage text.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let key = key.into();
        let mut value = value.into();

        let transformer = self.transformer();
        if transformer.casts_on_write(&key, &value) {
            value = transformer.to_storage(&value);
        }

        self.attributes.set(key, value);
        self
    }

    /// Remove an attribute. Unknown keys are ignored.
    pub fn unset_attribute(&mut self, key: &str) -> &mut Self {
        self.attributes.unset(key);
        self
    }

    /// Replace every attribute without mass assignment checks or casting.
    pub fn set_raw_attributes(
        &mut self,
        attributes: impl IntoIterator<Item = AttributeItem>,
        sync: bool,
    ) -> &mut Self {
        self.attributes.replace_all(attributes);
        if sync {
            self.sync_original();
        }
        self
    }

    // ========================================================================
    // Original Snapshot
    // ========================================================================

    /// Make the current attributes the new original snapshot.
    pub fn sync_original(&mut self) -> &mut Self {
        self.original = self.attributes.snapshot();
        self
    }

    /// Copy a single current attribute into the original snapshot.
    pub fn sync_original_attribute(&mut self, key: &str) -> &mut Self {
        match self.attributes.get(key) {
            Some(value) => {
                self.original.set(key, value.clone());
            }
            None => {
                self.original.unset(key);
            }
        }
        self
    }

    /// Original value of `key`, cast like [`Self::get_attribute`].
    pub fn get_original(&self, key: &str) -> Result<Value> {
        match self.original.get(key) {
            Some(value) => self.transformer().to_rich(key, value),
            None => Ok(Value::Null),
        }
    }

    /// Every original attribute, cast.
    pub fn get_originals(&self) -> Result<Vec<AttributeItem>> {
        let transformer = self.transformer();
        self.original
            .iter()
            .map(|item| {
                Ok(AttributeItem {
                    key: item.key.clone(),
                    value: transformer.to_rich(&item.key, &item.value)?,
                })
            })
            .collect()
    }

    /// Stored original value of `key`, or `default` when it has none.
    pub fn get_raw_original(&self, key: &str, default: Value) -> Value {
        self.original.get(key).cloned().unwrap_or(default)
    }

    pub fn get_raw_originals(&self) -> &[AttributeItem] {
        self.original.items()
    }

    // ========================================================================
    // Dirty Tracking
    // ========================================================================

    /// Whether `key` still holds a value equivalent to its original.
    pub fn original_is_equivalent(&self, key: &str) -> bool {
        let transformer = self.transformer();
        DirtyTracker::new(&self.attributes, &self.original, transformer).is_equivalent(key)
    }

    /// Attributes changed since the last sync, in insertion order.
    pub fn get_dirty(&self) -> AttributeStore {
        let transformer = self.transformer();
        DirtyTracker::new(&self.attributes, &self.original, transformer).dirty()
    }

    /// Whether anything changed since the last sync.
    pub fn is_dirty(&self) -> bool {
        !self.get_dirty().is_empty()
    }

    /// Whether any of `keys` changed since the last sync. An empty `keys`
    /// behaves like [`Self::is_dirty`].
    pub fn is_dirty_any<S: AsRef<str>>(&self, keys: &[S]) -> bool {
        has_changes(&self.get_dirty(), keys)
    }

    pub fn is_clean(&self) -> bool {
        !self.is_dirty()
    }

    /// None of `keys` changed since the last sync.
    pub fn is_clean_all<S: AsRef<str>>(&self, keys: &[S]) -> bool {
        !self.is_dirty_any(keys)
    }

    /// Record the current dirty set as the changes of the last update.
    pub fn sync_changes(&mut self) -> &mut Self {
        self.changes = self.get_dirty();
        self
    }

    /// Attributes written by the last update.
    pub fn get_changes(&self) -> &AttributeStore {
        &self.changes
    }

    pub fn was_changed(&self) -> bool {
        !self.changes.is_empty()
    }

    pub fn was_changed_any<S: AsRef<str>>(&self, keys: &[S]) -> bool {
        has_changes(&self.changes, keys)
    }
}
