//! Relation slots on a model.
//!
//! A slot is filled by whoever loads the relation; the model only stores it,
//! hands it out with a checked downcast, and walks it for `push` and owner
//! touching.

use crate::model::Model;
use std::any::Any;
use std::collections::BTreeMap;
use tinymodel_core::{
    Entity, Error, RelatedModel, Relation, RelationNotLoadedError, Result, Value,
};

impl<E: Entity> Model<E> {
    pub fn relation_loaded(&self, relation: &str) -> bool {
        self.relations.contains_key(relation)
    }

    pub fn set_relation(&mut self, relation: impl Into<String>, value: Relation) -> &mut Self {
        self.relations.insert(relation.into(), value);
        self
    }

    /// Store a single related model (or an empty one-shaped slot for `None`).
    pub fn set_relation_one<R: Entity>(
        &mut self,
        relation: impl Into<String>,
        model: Option<Model<R>>,
    ) -> &mut Self {
        let value = match model {
            Some(model) => Relation::One(Box::new(model)),
            None => Relation::None,
        };
        self.set_relation(relation, value)
    }

    pub fn set_relation_many<R: Entity>(
        &mut self,
        relation: impl Into<String>,
        models: Vec<Model<R>>,
    ) -> &mut Self {
        let models = models
            .into_iter()
            .map(|m| Box::new(m) as Box<dyn RelatedModel>)
            .collect();
        self.set_relation(relation, Relation::Many(models))
    }

    pub fn unset_relation(&mut self, relation: &str) -> &mut Self {
        self.relations.remove(relation);
        self
    }

    pub fn unset_relations(&mut self) -> &mut Self {
        self.relations.clear();
        self
    }

    pub fn get_relations(&self) -> &BTreeMap<String, Relation> {
        &self.relations
    }

    pub fn get_relation_slot(&self, relation: &str) -> Result<&Relation> {
        self.relations.get(relation).ok_or_else(|| self.not_loaded(relation))
    }

    /// The related model of a one-shaped relation.
    pub fn get_relation_one<R: Entity>(&self, relation: &str) -> Result<Option<&Model<R>>> {
        self.get_relation_slot(relation)?.one::<Model<R>>(relation)
    }

    pub fn get_relation_one_mut<R: Entity>(
        &mut self,
        relation: &str,
    ) -> Result<Option<&mut Model<R>>> {
        if !self.relations.contains_key(relation) {
            return Err(self.not_loaded(relation));
        }
        match self.relations.get_mut(relation) {
            Some(slot) => slot.one_mut::<Model<R>>(relation),
            None => Ok(None),
        }
    }

    /// The related models of a many-shaped relation.
    pub fn get_relation_many<R: Entity>(&self, relation: &str) -> Result<Vec<&Model<R>>> {
        self.get_relation_slot(relation)?.many::<Model<R>>(relation)
    }

    /// Whether saving this model touches `relation`.
    pub fn touches(&self, relation: &str) -> bool {
        E::config().touches.iter().any(|&t| t == relation)
    }

    /// Relations touched on save, as the entity declares them.
    pub fn get_touched_relations(&self) -> &'static [&'static str] {
        E::config().touches
    }

    /// Touch every loaded relation named in the entity's `touches` list.
    pub fn touch_owners(&mut self) -> Result<()> {
        for &relation in E::config().touches {
            let Some(slot) = self.relations.get_mut(relation) else {
                continue;
            };
            for related in slot.models_mut() {
                related.touch()?;
            }
        }
        Ok(())
    }

    fn not_loaded(&self, relation: &str) -> Error {
        Error::RelationNotLoaded(RelationNotLoadedError {
            model: E::model_name().to_owned(),
            relation: relation.to_owned(),
        })
    }
}

impl<E: Entity> RelatedModel for Model<E> {
    fn table_name(&self) -> &str {
        &self.table
    }

    fn model_name(&self) -> &'static str {
        E::model_name()
    }

    fn key(&self) -> Option<Value> {
        Some(self.get_key()).filter(|key| !key.is_null())
    }

    fn push(&mut self) -> Result<bool> {
        Model::push(self)
    }

    fn touch(&mut self) -> Result<bool> {
        Model::touch(self)
    }

    fn clone_boxed(&self) -> Box<dyn RelatedModel> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
