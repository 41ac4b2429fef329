//! Candidate selection for dispatch generation.
//!
//! A container contributes at most one candidate. Failing any condition
//! is a silent non-match by design: a manual `update` override is the
//! escape hatch for opting out of generation, and structural problems are
//! the validators' concern, not the selector's.

use log::debug;

use crate::model::{MarkerKind, MethodDecl, Model, PassMode, TypeDecl};
use crate::shape::{self, Shape};

/// A declaration selected for code generation, together with its
/// container's classified shape.
#[derive(Debug, Clone)]
pub struct Candidate<'m> {
    pub container: &'m TypeDecl,
    pub method: &'m MethodDecl,
    pub shape: Shape,
}

/// Select every eligible (container, method, shape) triple in the model.
///
/// Eligibility requires all of: the `#[update]` marker, a `#[partial]`
/// container, a recognized shape, exactly one marked method in the
/// container, no manual `update` override, and no write-only parameter.
/// The result does not depend on the order of sibling declarations.
pub fn select(model: &Model) -> Vec<Candidate<'_>> {
    let mut candidates = Vec::new();

    for container in model.types() {
        let mut marked = container
            .methods
            .iter()
            .filter(|method| method.has_marker(MarkerKind::Update));

        // Uniqueness is strict: two or more marked methods select nothing.
        let (Some(method), None) = (marked.next(), marked.next()) else {
            continue;
        };

        if !container.is_partial {
            continue;
        }
        let Some(shape) = shape::classify(model, container) else {
            continue;
        };
        if container.methods.iter().any(is_manual_override) {
            debug!(
                "skipping '{}': manual update override wins",
                container.qualified_name()
            );
            continue;
        }
        if method
            .params
            .iter()
            .any(|param| param.mode == PassMode::Out)
        {
            continue;
        }

        candidates.push(Candidate {
            container,
            method,
            shape,
        });
    }

    candidates
}

/// A hand-written dispatch override: an `update` method that does not
/// itself carry the marker.
fn is_manual_override(method: &MethodDecl) -> bool {
    method.name == "update" && !method.has_marker(MarkerKind::Update)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Param, TypeRef};
    use crate::parse::parse_source;

    fn select_names(source: &str) -> Vec<(String, String)> {
        let model = parse_source(source).unwrap();
        select(&model)
            .into_iter()
            .map(|candidate| (candidate.container.name.clone(), candidate.method.name.clone()))
            .collect()
    }

    const ELIGIBLE: &str = r#"
        #[partial]
        struct MoveSystem {
            base: EntitySystem<GameTime>,
        }

        impl MoveSystem {
            #[update]
            fn advance(&mut self, entity: Entity, speed: &mut Speed) {}
        }
    "#;

    #[test]
    fn eligible_container_selects_its_marked_method() {
        // When
        let selected = select_names(ELIGIBLE);

        // Then
        assert_eq!(selected, vec![("MoveSystem".to_string(), "advance".to_string())]);
    }

    #[test]
    fn missing_partial_is_a_silent_non_match() {
        let source = r#"
            struct MoveSystem {
                base: EntitySystem<GameTime>,
            }

            impl MoveSystem {
                #[update]
                fn advance(&mut self, entity: Entity) {}
            }
        "#;

        assert!(select_names(source).is_empty());
    }

    #[test]
    fn shapeless_container_is_a_silent_non_match() {
        let source = r#"
            #[partial]
            struct Plain;

            impl Plain {
                #[update]
                fn advance(&mut self, entity: Entity) {}
            }
        "#;

        assert!(select_names(source).is_empty());
    }

    #[test]
    fn two_marked_methods_select_nothing() {
        // Uniqueness is strict: no candidate and no diagnostic.
        let source = r#"
            #[partial]
            struct MoveSystem {
                base: EntitySystem<GameTime>,
            }

            impl MoveSystem {
                #[update]
                fn advance(&mut self, entity: Entity) {}

                #[update]
                fn advance_again(&mut self, entity: Entity) {}
            }
        "#;

        assert!(select_names(source).is_empty());
    }

    #[test]
    fn manual_override_wins_silently() {
        let source = r#"
            #[partial]
            struct MoveSystem {
                base: EntitySystem<GameTime>,
            }

            impl MoveSystem {
                #[update]
                fn advance(&mut self, entity: Entity) {}

                fn update(&mut self, state: &GameTime, entities: &[Entity]) {}
            }
        "#;

        assert!(select_names(source).is_empty());
    }

    #[test]
    fn marked_method_named_update_does_not_shadow_itself() {
        let source = r#"
            #[partial]
            struct MoveSystem {
                base: EntitySystem<GameTime>,
            }

            impl MoveSystem {
                #[update]
                fn update(&mut self, entity: Entity) {}
            }
        "#;

        assert_eq!(select_names(source).len(), 1);
    }

    #[test]
    fn selection_is_order_independent() {
        // Given: the same container with sibling declarations permuted.
        let forward = r#"
            #[partial]
            struct MoveSystem {
                base: EntitySystem<GameTime>,
            }

            impl MoveSystem {
                #[update]
                fn advance(&mut self, entity: Entity) {}

                fn helper(&self) {}

                #[with_predicate]
                fn keep(&self, health: &Health) -> bool { true }
            }
        "#;
        let permuted = r#"
            #[partial]
            struct MoveSystem {
                base: EntitySystem<GameTime>,
            }

            impl MoveSystem {
                #[with_predicate]
                fn keep(&self, health: &Health) -> bool { true }

                fn helper(&self) {}

                #[update]
                fn advance(&mut self, entity: Entity) {}
            }
        "#;

        // Then
        assert_eq!(select_names(forward), select_names(permuted));
    }

    #[test]
    fn write_only_parameter_rejects_the_candidate() {
        // The parsed dialect cannot express write-only passing, so build
        // the declaration directly.
        let model = parse_source(ELIGIBLE).unwrap();
        assert_eq!(select(&model).len(), 1);

        let mut out_model = Model::new();
        let mut decl = model.types()[0].clone();
        decl.methods[0].params.push(Param {
            name: "result".to_string(),
            mode: PassMode::Out,
            ty: TypeRef::parse("Summary").unwrap(),
        });
        out_model.push(decl);

        assert!(select(&out_model).is_empty());
    }
}
