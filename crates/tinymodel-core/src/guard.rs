//! Mass-assignment protection.
//!
//! Each entity type owns a [`GuardPolicy`] (its fillable and guarded attribute
//! lists). Policies live in a process-wide registry keyed by type, seeded from
//! [`Entity::config`] on first use and adjustable afterwards. Guarded lists
//! other than `["*"]` are checked against the table's real columns, which are
//! fetched once per connection and entity type and cached for the process.
//!
//! Guarding can be switched off for the current thread with [`unguarded`].

use crate::attributes::AttributeItem;
use crate::connection::SchemaIntrospector;
use crate::entity::{Entity, ModelConfig};
use crate::error::{Error, MassAssignmentError, Result};
use std::any::TypeId;
use std::cell::Cell;
use std::collections::HashMap;
use std::sync::{OnceLock, PoisonError, RwLock};

// ============================================================================
// Policy Registry
// ============================================================================

/// Fillable / guarded attribute lists of one entity type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuardPolicy {
    pub fillable: Vec<String>,
    pub guarded: Vec<String>,
}

impl GuardPolicy {
    pub fn from_config(config: &ModelConfig) -> Self {
        Self {
            fillable: config.fillable.iter().map(|&s| s.to_owned()).collect(),
            guarded: config.guarded.iter().map(|&s| s.to_owned()).collect(),
        }
    }

    /// `guarded == ["*"]`.
    pub fn guards_everything(&self) -> bool {
        matches!(self.guarded.as_slice(), [only] if only == "*")
    }

    /// Nothing is fillable and everything is guarded.
    pub fn totally_guarded(&self) -> bool {
        self.fillable.is_empty() && self.guards_everything()
    }

    /// Append the fillable attributes not already listed.
    pub fn merge_fillable<S: AsRef<str>>(&mut self, fillable: &[S]) {
        merge_into(&mut self.fillable, fillable);
    }

    /// Append the guarded attributes not already listed.
    pub fn merge_guarded<S: AsRef<str>>(&mut self, guarded: &[S]) {
        merge_into(&mut self.guarded, guarded);
    }
}

fn merge_into<S: AsRef<str>>(target: &mut Vec<String>, values: &[S]) {
    for value in values {
        let value = value.as_ref();
        if !target.iter().any(|v| v == value) {
            target.push(value.to_owned());
        }
    }
}

fn policies() -> &'static RwLock<HashMap<TypeId, GuardPolicy>> {
    static POLICIES: OnceLock<RwLock<HashMap<TypeId, GuardPolicy>>> = OnceLock::new();
    POLICIES.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Current policy of `E`.
pub fn policy<E: Entity>() -> GuardPolicy {
    {
        let registry = policies().read().unwrap_or_else(PoisonError::into_inner);
        if let Some(policy) = registry.get(&TypeId::of::<E>()) {
            return policy.clone();
        }
    }
    let mut registry = policies().write().unwrap_or_else(PoisonError::into_inner);
    registry
        .entry(TypeId::of::<E>())
        .or_insert_with(|| GuardPolicy::from_config(&E::config()))
        .clone()
}

/// Modify the policy of `E` in place.
pub fn update_policy<E: Entity>(f: impl FnOnce(&mut GuardPolicy)) {
    let mut registry = policies().write().unwrap_or_else(PoisonError::into_inner);
    let policy = registry
        .entry(TypeId::of::<E>())
        .or_insert_with(|| GuardPolicy::from_config(&E::config()));
    f(policy);
}

/// Restore the policy `E` declares in its configuration.
pub fn reset_policy<E: Entity>() {
    let mut registry = policies().write().unwrap_or_else(PoisonError::into_inner);
    registry.insert(TypeId::of::<E>(), GuardPolicy::from_config(&E::config()));
}

// ============================================================================
// Unguarded Scope
// ============================================================================

thread_local! {
    static UNGUARDED: Cell<bool> = const { Cell::new(false) };
}

/// Whether guarding is disabled on this thread.
pub fn is_unguarded() -> bool {
    UNGUARDED.with(Cell::get)
}

/// Disable (or re-enable) guarding on this thread until changed again.
pub fn unguard(state: bool) {
    UNGUARDED.with(|flag| flag.set(state));
}

pub fn reguard() {
    unguard(false);
}

/// Restores the previous unguarded state when dropped.
#[derive(Debug)]
pub struct UnguardedScope {
    previous: bool,
}

impl UnguardedScope {
    pub fn enter() -> Self {
        let previous = is_unguarded();
        unguard(true);
        Self { previous }
    }
}

impl Drop for UnguardedScope {
    fn drop(&mut self) {
        unguard(self.previous);
    }
}

/// Run `f` with guarding disabled on this thread.
pub fn unguarded<T>(f: impl FnOnce() -> T) -> T {
    let _scope = UnguardedScope::enter();
    f()
}

// ============================================================================
// Guardable Columns
// ============================================================================

type ColumnCache = HashMap<(String, TypeId), Vec<String>>;

fn column_cache() -> &'static RwLock<ColumnCache> {
    static COLUMNS: OnceLock<RwLock<ColumnCache>> = OnceLock::new();
    COLUMNS.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Drop every cached column listing.
pub fn forget_guardable_columns() {
    column_cache()
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .clear();
}

// ============================================================================
// Guard
// ============================================================================

/// Evaluates a [`GuardPolicy`] for one model.
pub struct MassAssignmentGuard<'a, S: SchemaIntrospector + ?Sized> {
    policy: GuardPolicy,
    entity: TypeId,
    model: &'a str,
    connection: &'a str,
    table: &'a str,
    schema: &'a S,
}

impl<'a, S: SchemaIntrospector + ?Sized> MassAssignmentGuard<'a, S> {
    /// Guard for the entity type `entity`, named `model` in errors and logs.
    ///
    /// Column listings are cached per `(connection, entity)`.
    pub fn new(
        policy: GuardPolicy,
        entity: TypeId,
        model: &'a str,
        connection: &'a str,
        table: &'a str,
        schema: &'a S,
    ) -> Self {
        Self {
            policy,
            entity,
            model,
            connection,
            table,
            schema,
        }
    }

    /// Guard evaluating the registered policy of `E`.
    pub fn for_entity<E: Entity>(connection: &'a str, table: &'a str, schema: &'a S) -> Self {
        Self::new(
            policy::<E>(),
            TypeId::of::<E>(),
            E::model_name(),
            connection,
            table,
            schema,
        )
    }

    pub fn policy(&self) -> &GuardPolicy {
        &self.policy
    }

    pub fn totally_guarded(&self) -> bool {
        self.policy.totally_guarded()
    }

    pub fn is_fillable(&self, key: &str) -> Result<bool> {
        if is_unguarded() {
            return Ok(true);
        }
        if self.policy.fillable.iter().any(|f| f == key) {
            return Ok(true);
        }
        if self.is_guarded(key)? {
            return Ok(false);
        }
        Ok(self.policy.fillable.is_empty() && !key.contains('.'))
    }

    pub fn is_guarded(&self, key: &str) -> Result<bool> {
        if self.policy.guarded.is_empty() {
            return Ok(false);
        }
        if self.policy.guards_everything() || self.policy.guarded.iter().any(|g| g == key) {
            return Ok(true);
        }
        Ok(!self.is_guardable_column(key)?)
    }

    /// Keep only explicitly fillable attributes, unless no fillable list is set
    /// or guarding is off.
    pub fn fillable_from_array(&self, attributes: Vec<AttributeItem>) -> Vec<AttributeItem> {
        if self.policy.fillable.is_empty() || is_unguarded() {
            return attributes;
        }
        attributes
            .into_iter()
            .filter(|item| self.policy.fillable.iter().any(|f| *f == item.key))
            .collect()
    }

    /// Attributes of `attributes` a fill may assign.
    ///
    /// Non-fillable attributes are dropped, except on a totally guarded model
    /// where the first one fails the whole fill.
    pub fn filter(&self, attributes: Vec<AttributeItem>) -> Result<Vec<AttributeItem>> {
        let totally_guarded = self.totally_guarded();
        let mut accepted = Vec::with_capacity(attributes.len());

        for item in self.fillable_from_array(attributes) {
            if self.is_fillable(&item.key)? {
                accepted.push(item);
            } else if totally_guarded {
                return Err(Error::MassAssignment(MassAssignmentError {
                    key: item.key,
                    model: self.model.to_owned(),
                }));
            } else {
                tracing::debug!(
                    model = self.model,
                    key = %item.key,
                    "Dropping guarded attribute from mass assignment"
                );
            }
        }

        Ok(accepted)
    }

    fn is_guardable_column(&self, key: &str) -> Result<bool> {
        let cache_key = (self.connection.to_owned(), self.entity);

        {
            let cache = column_cache().read().unwrap_or_else(PoisonError::into_inner);
            if let Some(columns) = cache.get(&cache_key) {
                return Ok(columns.iter().any(|c| c == key));
            }
        }

        let columns = self.schema.column_listing(self.table)?;
        tracing::debug!(
            model = self.model,
            table = self.table,
            columns = columns.len(),
            "Caching guardable columns"
        );
        let guardable = columns.iter().any(|c| c == key);
        column_cache()
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(cache_key, columns);
        Ok(guardable)
    }
}
