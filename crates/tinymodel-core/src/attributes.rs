//! Ordered attribute storage with positional hash lookup.
//!
//! An [`AttributeStore`] keeps attributes in insertion order (that order is what
//! gets serialized and handed to the query executor) and a `key -> position`
//! index next to it so lookups stay O(1). The index is re-derived from the
//! affected position onward after every structural change.

use crate::value::Value;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::{HashMap, HashSet};

/// A single named attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeItem {
    pub key: String,
    pub value: Value,
}

impl AttributeItem {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> From<(K, V)> for AttributeItem {
    fn from((key, value): (K, V)) -> Self {
        Self::new(key, value)
    }
}

/// Ordered, indexed set of attributes.
///
/// Used for the current attributes of a model as well as its "original" and
/// "changes" snapshots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeStore {
    items: Vec<AttributeItem>,
    index: HashMap<String, usize>,
}

impl AttributeStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from items, keeping the last occurrence of duplicate keys.
    pub fn from_items(items: impl IntoIterator<Item = AttributeItem>) -> Self {
        let mut store = Self::new();
        store.replace_all(items);
        store
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Position of `key` in insertion order.
    pub fn position(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.index.get(key).map(|&pos| &self.items[pos].value)
    }

    /// Set `key` to `value`.
    ///
    /// An existing key is overwritten in place and keeps its position; a new key
    /// is appended. Returns the previous value, if any.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();

        if let Some(&pos) = self.index.get(&key) {
            return Some(std::mem::replace(&mut self.items[pos].value, value));
        }

        self.index.insert(key.clone(), self.items.len());
        self.items.push(AttributeItem { key, value });
        None
    }

    /// Remove `key`. Returns `false` when it was not present.
    pub fn unset(&mut self, key: &str) -> bool {
        let Some(pos) = self.index.remove(key) else {
            return false;
        };
        self.items.remove(pos);
        self.rehash_from(pos);
        true
    }

    /// Replace every attribute at once.
    ///
    /// Duplicate keys collapse onto their last occurrence, which also decides the
    /// surviving item's position.
    pub fn replace_all(&mut self, items: impl IntoIterator<Item = AttributeItem>) {
        let items: Vec<AttributeItem> = items.into_iter().collect();

        let mut seen = HashSet::with_capacity(items.len());
        let mut deduped: Vec<AttributeItem> = items
            .into_iter()
            .rev()
            .filter(|item| seen.insert(item.key.clone()))
            .collect();
        deduped.reverse();

        self.items = deduped;
        self.index.clear();
        self.rehash_from(0);
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.index.clear();
    }

    /// Attributes in insertion order.
    pub fn items(&self) -> &[AttributeItem] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AttributeItem> {
        self.items.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|item| item.key.as_str())
    }

    pub fn into_items(self) -> Vec<AttributeItem> {
        self.items
    }

    /// Value copy of the whole store.
    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    fn rehash_from(&mut self, from: usize) {
        for (pos, item) in self.items.iter().enumerate().skip(from) {
            self.index.insert(item.key.clone(), pos);
        }
    }
}

impl<'a> IntoIterator for &'a AttributeStore {
    type Item = &'a AttributeItem;
    type IntoIter = std::slice::Iter<'a, AttributeItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl FromIterator<AttributeItem> for AttributeStore {
    fn from_iter<I: IntoIterator<Item = AttributeItem>>(iter: I) -> Self {
        Self::from_items(iter)
    }
}

impl Serialize for AttributeStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.items.len()))?;
        for item in &self.items {
            map.serialize_entry(&item.key, &item.value)?;
        }
        map.end()
    }
}
