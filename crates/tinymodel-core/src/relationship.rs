//! Relation slots held by a model instance.
//!
//! Loading related rows is someone else's job. A model only stores what was
//! loaded for each relation name: nothing, one related model, or many. Related
//! models are type-erased behind [`RelatedModel`] so a single map can hold
//! relations to different entity types; typed access goes through a checked
//! downcast.

use crate::error::{Error, RelationShape, RelationTypeError, Result};
use crate::value::Value;
use std::any::Any;
use std::fmt;

/// Object-safe view of a model stored in a relation slot.
pub trait RelatedModel: Any + fmt::Debug {
    fn table_name(&self) -> &str;

    fn model_name(&self) -> &'static str;

    /// Primary key value, if set.
    fn key(&self) -> Option<Value>;

    /// Save the model and then everything it has loaded.
    fn push(&mut self) -> Result<bool>;

    /// Stamp the update timestamp and save.
    fn touch(&mut self) -> Result<bool>;

    fn clone_boxed(&self) -> Box<dyn RelatedModel>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Content of one relation slot.
#[derive(Debug, Default)]
pub enum Relation {
    /// Loaded, but the one-to-one/belongs-to side had no row.
    #[default]
    None,
    One(Box<dyn RelatedModel>),
    Many(Vec<Box<dyn RelatedModel>>),
}

impl Clone for Relation {
    fn clone(&self) -> Self {
        match self {
            Self::None => Self::None,
            Self::One(model) => Self::One(model.clone_boxed()),
            Self::Many(models) => Self::Many(models.iter().map(|m| m.clone_boxed()).collect()),
        }
    }
}

impl Relation {
    /// Shape of the slot. An empty slot counts as one-shaped.
    pub fn shape(&self) -> RelationShape {
        match self {
            Self::None | Self::One(_) => RelationShape::One,
            Self::Many(_) => RelationShape::Many,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn len(&self) -> usize {
        match self {
            Self::None => 0,
            Self::One(_) => 1,
            Self::Many(models) => models.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn models(&self) -> Vec<&dyn RelatedModel> {
        match self {
            Self::None => Vec::new(),
            Self::One(model) => vec![model.as_ref()],
            Self::Many(models) => models.iter().map(|m| m.as_ref()).collect(),
        }
    }

    pub fn models_mut(&mut self) -> Vec<&mut Box<dyn RelatedModel>> {
        match self {
            Self::None => Vec::new(),
            Self::One(model) => vec![model],
            Self::Many(models) => models.iter_mut().collect(),
        }
    }

    /// The related model of a one-shaped slot, downcast to `T`.
    pub fn one<T: Any>(&self, relation: &str) -> Result<Option<&T>> {
        match self {
            Self::None => Ok(None),
            Self::One(model) => downcast(model.as_ref(), relation, RelationShape::One).map(Some),
            Self::Many(_) => Err(shape_error(relation, RelationShape::One, RelationShape::Many)),
        }
    }

    pub fn one_mut<T: Any>(&mut self, relation: &str) -> Result<Option<&mut T>> {
        match self {
            Self::None => Ok(None),
            Self::One(model) => {
                let name = model.model_name();
                model
                    .as_any_mut()
                    .downcast_mut::<T>()
                    .map(Some)
                    .ok_or_else(|| type_error(relation, RelationShape::One, name))
            }
            Self::Many(_) => Err(shape_error(relation, RelationShape::One, RelationShape::Many)),
        }
    }

    /// The related models of a many-shaped slot, downcast to `T`.
    pub fn many<T: Any>(&self, relation: &str) -> Result<Vec<&T>> {
        match self {
            Self::Many(models) => models
                .iter()
                .map(|m| downcast(m.as_ref(), relation, RelationShape::Many))
                .collect(),
            _ => Err(shape_error(relation, RelationShape::Many, RelationShape::One)),
        }
    }
}

fn downcast<'a, T: Any>(
    model: &'a dyn RelatedModel,
    relation: &str,
    shape: RelationShape,
) -> Result<&'a T> {
    model
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| type_error(relation, shape, model.model_name()))
}

fn shape_error(relation: &str, expected: RelationShape, found: RelationShape) -> Error {
    Error::RelationType(RelationTypeError {
        relation: relation.to_owned(),
        expected,
        found,
        type_mismatch: None,
    })
}

fn type_error(relation: &str, shape: RelationShape, found: &str) -> Error {
    Error::RelationType(RelationTypeError {
        relation: relation.to_owned(),
        expected: shape,
        found: shape,
        type_mismatch: Some(found.to_owned()),
    })
}
