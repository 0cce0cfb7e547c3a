//! Dirty tracking against the original snapshot.

use crate::attributes::AttributeStore;
use crate::dates::ValueTransformer;
use crate::value::Value;

/// Compares a model's current attributes with its last synced snapshot.
#[derive(Debug, Clone, Copy)]
pub struct DirtyTracker<'a> {
    current: &'a AttributeStore,
    original: &'a AttributeStore,
    transformer: &'a ValueTransformer,
}

impl<'a> DirtyTracker<'a> {
    pub fn new(
        current: &'a AttributeStore,
        original: &'a AttributeStore,
        transformer: &'a ValueTransformer,
    ) -> Self {
        Self {
            current,
            original,
            transformer,
        }
    }

    /// Whether the current value of `key` is equivalent to its original.
    ///
    /// Only date attributes are compared by their storage text; every other
    /// attribute must be exactly equal.
    pub fn is_equivalent(&self, key: &str) -> bool {
        let Some(original) = self.original.get(key) else {
            return false;
        };
        let current = self.current.get(key).unwrap_or(&Value::Null);

        if current == original {
            return true;
        }
        if current.is_null() {
            return false;
        }
        if self.transformer.is_date_attribute(key) {
            return self.transformer.equivalent(current, original);
        }
        false
    }

    /// Current attributes that differ from the original, in insertion order.
    pub fn dirty(&self) -> AttributeStore {
        self.current
            .iter()
            .filter(|item| !self.is_equivalent(&item.key))
            .cloned()
            .collect()
    }

    /// Any of `keys` dirty, or anything dirty when `keys` is empty.
    pub fn is_dirty<S: AsRef<str>>(&self, keys: &[S]) -> bool {
        has_changes(&self.dirty(), keys)
    }

    pub fn is_clean<S: AsRef<str>>(&self, keys: &[S]) -> bool {
        !self.is_dirty(keys)
    }
}

/// Whether `changes` touches any of `keys`, or anything when `keys` is empty.
pub fn has_changes<S: AsRef<str>>(changes: &AttributeStore, keys: &[S]) -> bool {
    if keys.is_empty() {
        return !changes.is_empty();
    }
    keys.iter().any(|key| changes.contains_key(key.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::AttributeItem;
    use crate::dates::DEFAULT_DATE_FORMAT;

    const NONE: &[&str] = &[];

    fn transformer() -> ValueTransformer {
        ValueTransformer::new(vec!["added_on".to_owned()], DEFAULT_DATE_FORMAT).unwrap()
    }

    fn store(items: &[(&str, Value)]) -> AttributeStore {
        items
            .iter()
            .map(|(k, v)| AttributeItem::new(*k, v.clone()))
            .collect()
    }

    #[test]
    fn test_clean_after_sync() {
        let current = store(&[("id", Value::BigInt(1)), ("name", "a".into())]);
        let original = current.snapshot();
        let t = transformer();
        let tracker = DirtyTracker::new(&current, &original, &t);

        assert!(tracker.dirty().is_empty());
        assert!(tracker.is_clean(NONE));
        assert!(!tracker.is_dirty(&["name"]));
    }

    #[test]
    fn test_dirty_preserves_current_order() {
        let original = store(&[("id", Value::BigInt(1)), ("name", "a".into())]);
        let current = store(&[
            ("size", Value::Int(5)),
            ("id", Value::BigInt(1)),
            ("name", "b".into()),
        ]);
        let t = transformer();
        let tracker = DirtyTracker::new(&current, &original, &t);

        let dirty = tracker.dirty();
        assert_eq!(dirty.keys().collect::<Vec<_>>(), ["size", "name"]);
        assert!(tracker.is_dirty(&["id", "name"]));
        assert!(tracker.is_clean(&["id"]));
    }

    #[test]
    fn test_no_numeric_tolerance() {
        let original = store(&[("size", Value::BigInt(5))]);
        let current = store(&[("size", Value::Int(5))]);
        let t = transformer();
        let tracker = DirtyTracker::new(&current, &original, &t);

        assert!(tracker.is_dirty(&["size"]));
    }

    #[test]
    fn test_null_against_value_is_dirty() {
        let original = store(&[("name", "a".into())]);
        let current = store(&[("name", Value::Null)]);
        let t = transformer();
        assert!(DirtyTracker::new(&current, &original, &t).is_dirty(&["name"]));
    }

    #[test]
    fn test_dates_compare_by_storage_text() {
        let original = store(&[("added_on", "2021-04-01 15:10:10".into())]);
        let current = store(&[("added_on", "1617289810".into())]);
        let t = transformer();
        let tracker = DirtyTracker::new(&current, &original, &t);

        assert!(tracker.is_clean(&["added_on"]));
    }

    #[test]
    fn test_has_changes() {
        let changes = store(&[("name", "b".into())]);
        assert!(has_changes(&changes, NONE));
        assert!(has_changes(&changes, &["name", "size"]));
        assert!(!has_changes(&changes, &["size"]));
        assert!(!has_changes(&AttributeStore::new(), NONE));
    }
}
