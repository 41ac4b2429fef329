//! Parameter binding for selected candidates.
//!
//! Binding decides, for each parameter of the marked method, which value
//! the synthesized dispatch passes in. The rules apply in a fixed order
//! and the last one is a catch-all, so binding is total: every candidate
//! the selector admits binds.

use crate::model::{Param, PassMode, TypeRef};
use crate::select::Candidate;

/// What the dispatch passes for one parameter, in declaration order.
///
/// Bundle and component roles keep the parameter's full pass mode so the
/// emitter can render the value, shared, and mutable argument forms
/// distinctly.
#[derive(Debug, Clone, PartialEq)]
pub enum Role {
    /// The entity currently being visited, by value or behind a shared
    /// reference.
    Entity { by_ref: bool },

    /// The update state handed to the dispatch.
    State,

    /// The grouping key of the current batch.
    Key,

    /// A whole component store, fetched once before the loop.
    Bundle { component: TypeRef, mode: PassMode },

    /// The visited entity's component, indexed out of a fetched store.
    Component { component: TypeRef, mode: PassMode },
}

/// One store fetch the dispatch performs before its entity loop.
///
/// Fetches are per occurrence: a component type named twice is fetched
/// twice, each landing in its own local.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetch {
    pub component: TypeRef,
    pub by_ref: bool,
}

/// The complete binding decision for one candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct Bindings {
    /// One role per method parameter, in declaration order.
    pub roles: Vec<Role>,

    /// Store fetches, in the order the bundle and component roles appear.
    pub fetches: Vec<Fetch>,

    /// Component types required of matched entities, deduplicated in
    /// first-occurrence order. Bundles do not constrain the filter.
    pub filter: Vec<TypeRef>,
}

/// Bind every parameter of the candidate's marked method.
pub fn bind(candidate: &Candidate<'_>) -> Bindings {
    let mut bindings = Bindings {
        roles: Vec::new(),
        fetches: Vec::new(),
        filter: Vec::new(),
    };

    for param in &candidate.method.params {
        let role = bind_param(candidate, param, &mut bindings);
        bindings.roles.push(role);
    }

    bindings
}

fn bind_param(candidate: &Candidate<'_>, param: &Param, bindings: &mut Bindings) -> Role {
    let shape = &candidate.shape;

    if param.ty.is_named("Entity") && param.mode != PassMode::Mut {
        return Role::Entity {
            by_ref: param.mode == PassMode::In,
        };
    }
    if param.mode == PassMode::In && param.ty == *shape.state() {
        return Role::State;
    }
    if param.mode == PassMode::In && Some(&param.ty) == shape.key() {
        return Role::Key;
    }
    if param.ty.is_named("Components") {
        if let [component] = param.ty.generic_args().as_slice() {
            bindings.fetches.push(Fetch {
                component: component.clone(),
                by_ref: param.mode == PassMode::Mut,
            });
            return Role::Bundle {
                component: component.clone(),
                mode: param.mode,
            };
        }
    }

    // Catch-all: any remaining parameter is the entity's own component.
    bindings.fetches.push(Fetch {
        component: param.ty.clone(),
        by_ref: param.mode == PassMode::Mut,
    });
    if !bindings.filter.contains(&param.ty) {
        bindings.filter.push(param.ty.clone());
    }
    Role::Component {
        component: param.ty.clone(),
        mode: param.mode,
    }
}
