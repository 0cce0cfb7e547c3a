//! Mass assignment on a model.
//!
//! Fillable and guarded lists are class-level: changing them through one model
//! type's associated functions affects every instance of that type.

use crate::model::Model;
use tinymodel_core::guard::{self, GuardPolicy, MassAssignmentGuard};
use tinymodel_core::{AttributeItem, Connection, Entity, Result};

impl<E: Entity> Model<E> {
    fn mass_assignment_guard(&self) -> MassAssignmentGuard<'_, dyn Connection> {
        MassAssignmentGuard::for_entity::<E>(
            self.connection.name(),
            &self.table,
            self.connection.as_ref(),
        )
    }

    /// Mass assign `attributes`, honouring the fillable/guarded policy.
    ///
    /// Guarded attributes are dropped silently, unless the model is totally
    /// guarded, in which case the fill fails with a mass assignment error.
    pub fn fill(&mut self, attributes: impl IntoIterator<Item = AttributeItem>) -> Result<&mut Self> {
        let attributes: Vec<AttributeItem> = attributes.into_iter().collect();
        if attributes.is_empty() {
            return Ok(self);
        }

        let accepted = self.mass_assignment_guard().filter(attributes)?;
        tracing::debug!(
            model = E::model_name(),
            table = %self.table,
            count = accepted.len(),
            "Filling attributes"
        );

        for item in accepted {
            self.set_attribute(item.key, item.value);
        }
        Ok(self)
    }

    /// Mass assign `attributes` with guarding disabled.
    pub fn force_fill(
        &mut self,
        attributes: impl IntoIterator<Item = AttributeItem>,
    ) -> Result<&mut Self> {
        let attributes: Vec<AttributeItem> = attributes.into_iter().collect();
        if attributes.is_empty() {
            return Ok(self);
        }
        guard::unguarded(|| self.fill(attributes).map(|_| ()))?;
        Ok(self)
    }

    pub fn is_fillable(&self, key: &str) -> Result<bool> {
        self.mass_assignment_guard().is_fillable(key)
    }

    pub fn is_guarded(&self, key: &str) -> Result<bool> {
        self.mass_assignment_guard().is_guarded(key)
    }

    pub fn totally_guarded(&self) -> bool {
        guard::policy::<E>().totally_guarded()
    }

    // ========================================================================
    // Class-Level Policy
    // ========================================================================

    pub fn get_fillable() -> Vec<String> {
        guard::policy::<E>().fillable
    }

    pub fn fillable<S: AsRef<str>>(fillable: &[S]) {
        guard::update_policy::<E>(|policy| {
            policy.fillable = fillable.iter().map(|s| s.as_ref().to_owned()).collect();
        });
    }

    pub fn merge_fillable<S: AsRef<str>>(fillable: &[S]) {
        guard::update_policy::<E>(|policy| policy.merge_fillable(fillable));
    }

    pub fn get_guarded() -> Vec<String> {
        guard::policy::<E>().guarded
    }

    pub fn guard<S: AsRef<str>>(guarded: &[S]) {
        guard::update_policy::<E>(|policy| {
            policy.guarded = guarded.iter().map(|s| s.as_ref().to_owned()).collect();
        });
    }

    pub fn merge_guarded<S: AsRef<str>>(guarded: &[S]) {
        guard::update_policy::<E>(|policy| policy.merge_guarded(guarded));
    }

    /// Restore the policy the entity declares.
    pub fn reset_guards() {
        guard::reset_policy::<E>();
    }

    pub fn guard_policy() -> GuardPolicy {
        guard::policy::<E>()
    }
}
