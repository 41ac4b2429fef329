//! Classification of system types by their base chain.
//!
//! A type is a system when its base chain reaches one of four recognized
//! generic base templates. The walk starts at the most-derived type and
//! follows `base` declarations through the model until a template matches
//! or the chain ends.

use crate::model::{Model, TypeDecl, TypeRef};

/// The recognized system shapes, with the generic arguments extracted from
/// the matched base template.
///
/// Argument 0 is always the update state; argument 1 is the grouping key
/// and exists only for the `Entities…` pair.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// `EntitySystem<S>`: per-entity immediate update.
    Entity { state: TypeRef },

    /// `EntitiesSystem<S, K>`: keyed-group immediate update.
    Entities { state: TypeRef, key: TypeRef },

    /// `EntityBufferedSystem<S>`: per-entity buffered update.
    EntityBuffered { state: TypeRef },

    /// `EntitiesBufferedSystem<S, K>`: keyed-group buffered update.
    EntitiesBuffered { state: TypeRef, key: TypeRef },
}

impl Shape {
    /// The update-state type argument.
    pub fn state(&self) -> &TypeRef {
        match self {
            Shape::Entity { state }
            | Shape::Entities { state, .. }
            | Shape::EntityBuffered { state }
            | Shape::EntitiesBuffered { state, .. } => state,
        }
    }

    /// The grouping-key type argument, for the keyed shapes.
    pub fn key(&self) -> Option<&TypeRef> {
        match self {
            Shape::Entities { key, .. } | Shape::EntitiesBuffered { key, .. } => Some(key),
            Shape::Entity { .. } | Shape::EntityBuffered { .. } => None,
        }
    }

    /// Buffered shapes construct from a world handle alone.
    pub fn is_buffered(&self) -> bool {
        matches!(
            self,
            Shape::EntityBuffered { .. } | Shape::EntitiesBuffered { .. }
        )
    }
}

/// The base templates in fixed priority order; the first match on each
/// ancestor wins.
const TEMPLATES: [&str; 4] = [
    "EntitySystem",
    "EntitiesSystem",
    "EntityBufferedSystem",
    "EntitiesBufferedSystem",
];

/// Classify a type by walking its base chain. Returns `None` when no
/// ancestor matches a template; that is a normal outcome, not an error.
pub fn classify(model: &Model, decl: &TypeDecl) -> Option<Shape> {
    let mut seen = vec![decl.name.clone()];
    let mut base = decl.base.clone();

    while let Some(current) = base {
        if let Some(shape) = match_template(&current) {
            return Some(shape);
        }

        let name = current.head()?.to_string();
        if seen.contains(&name) {
            // Cyclic base declarations never reach a template.
            return None;
        }
        seen.push(name.clone());
        base = model.type_named(&name)?.base.clone();
    }

    None
}

fn match_template(ty: &TypeRef) -> Option<Shape> {
    let head = ty.head()?;
    let template = TEMPLATES.iter().find(|template| head == **template)?;
    let args = ty.generic_args();

    match (*template, args.as_slice()) {
        ("EntitySystem", [state]) => Some(Shape::Entity {
            state: state.clone(),
        }),
        ("EntitiesSystem", [state, key]) => Some(Shape::Entities {
            state: state.clone(),
            key: key.clone(),
        }),
        ("EntityBufferedSystem", [state]) => Some(Shape::EntityBuffered {
            state: state.clone(),
        }),
        ("EntitiesBufferedSystem", [state, key]) => Some(Shape::EntitiesBuffered {
            state: state.clone(),
            key: key.clone(),
        }),
        _ => None,
    }
}
