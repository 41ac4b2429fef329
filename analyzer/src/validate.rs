//! Marker validators.
//!
//! Each validator checks one marker kind against its structural contract
//! and reports at most one diagnostic per violation. Validation never
//! aborts the pass and never fixes anything; a malformed declaration does
//! not block its siblings.

use crate::diagnostic::{Diagnostic, Rule, Severity};
use crate::model::{MarkerKind, MethodDecl, Model, PassMode, TypeDecl};
use crate::shape;

/// `#[subscribe]` on a method whose signature does not match the handler
/// contract: unit return and exactly one shared-reference parameter.
pub static SUBSCRIBE_INVALID_SIGNATURE: Rule = Rule {
    id: "SWA0001",
    title: "subscribe marker used on an invalid method",
    message: "Remove the #[subscribe] attribute from the '{0}' method or change the method signature.",
    severity: Severity::Error,
    description: "#[subscribe] should only be used on methods with the message-handler signature: \
                  no return value and a single shared-reference parameter.",
};

/// `#[with_predicate]` on a method whose signature does not match the
/// predicate contract: `bool` return and exactly one shared-reference
/// parameter.
pub static PREDICATE_INVALID_SIGNATURE: Rule = Rule {
    id: "SWA0002",
    title: "with_predicate marker used on an invalid method",
    message: "Remove the #[with_predicate] attribute from the '{0}' method or change the method signature.",
    severity: Severity::Error,
    description: "#[with_predicate] should only be used on methods returning bool with a single \
                  shared-reference parameter.",
};

/// `#[with_predicate]` on a method whose type is not a system.
pub static PREDICATE_INVALID_BASE_TYPE: Rule = Rule {
    id: "SWA0003",
    title: "with_predicate marker used outside a system type",
    message: "The '{0}' method cannot use the #[with_predicate] attribute because its type does \
              not derive from a system base type.",
    severity: Severity::Error,
    description: "#[with_predicate] should only be used on methods of types deriving from one of \
                  the system base types.",
};

/// `#[with]` on a type that is not a system.
pub static WITH_INVALID_BASE_TYPE: Rule = Rule {
    id: "SWA0004",
    title: "component filter marker used on an invalid type",
    message: "The '{0}' type cannot use the '{1}' attribute because it does not derive from a \
              system base type.",
    severity: Severity::Error,
    description: "Component filter attributes should only be used on types deriving from one of \
                  the system base types.",
};

/// Run every validator over the model and collect the diagnostics.
pub fn validate(model: &Model) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for decl in model.types() {
        let has_shape = shape::classify(model, decl).is_some();

        validate_with(decl, has_shape, &mut diagnostics);
        for method in &decl.methods {
            validate_predicate(method, has_shape, &mut diagnostics);
            validate_subscribe(method, &mut diagnostics);
        }
    }

    diagnostics
}

fn validate_with(decl: &TypeDecl, has_shape: bool, out: &mut Vec<Diagnostic>) {
    if decl.has_marker(MarkerKind::With) && !has_shape {
        out.push(WITH_INVALID_BASE_TYPE.report(
            decl.span,
            &[&decl.name, MarkerKind::With.name()],
        ));
    }
}

fn validate_predicate(method: &MethodDecl, has_shape: bool, out: &mut Vec<Diagnostic>) {
    if !method.has_marker(MarkerKind::WithPredicate) {
        return;
    }

    // The base-type check takes precedence; never report both.
    if !has_shape {
        out.push(PREDICATE_INVALID_BASE_TYPE.report(method.span, &[&method.name]));
        return;
    }

    if !has_handler_signature(method, |m| m.returns_bool()) {
        out.push(PREDICATE_INVALID_SIGNATURE.report(method.span, &[&method.name]));
    }
}

fn validate_subscribe(method: &MethodDecl, out: &mut Vec<Diagnostic>) {
    if method.has_marker(MarkerKind::Subscribe)
        && !has_handler_signature(method, |m| m.returns_unit())
    {
        out.push(SUBSCRIBE_INVALID_SIGNATURE.report(method.span, &[&method.name]));
    }
}

/// Shared shape of both handler contracts: the given return check plus a
/// single shared-reference parameter.
fn has_handler_signature(method: &MethodDecl, returns: impl Fn(&MethodDecl) -> bool) -> bool {
    returns(method) && method.params.len() == 1 && method.params[0].mode == PassMode::In
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_source;

    fn diagnostics_for(source: &str) -> Vec<Diagnostic> {
        validate(&parse_source(source).unwrap())
    }

    #[test]
    fn with_on_system_type_is_accepted() {
        // Given
        let source = r#"
            #[with(Health)]
            struct DummySystem {
                base: EntitySystem<f32>,
            }
        "#;

        // Then
        assert!(diagnostics_for(source).is_empty());
    }

    #[test]
    fn with_on_shapeless_type_reports_base_type_rule() {
        // Given
        let source = r#"
            #[with(Health)]
            struct Dummy;
        "#;

        // When
        let diagnostics = diagnostics_for(source);

        // Then: exactly the base-type diagnostic, regardless of content.
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].id(), "SWA0004");
        assert_eq!(
            diagnostics[0].message,
            "The 'Dummy' type cannot use the 'with' attribute because it does not derive from a \
             system base type."
        );
    }

    #[test]
    fn predicate_with_valid_signature_is_accepted() {
        let source = r#"
            struct DummySystem {
                base: EntitySystem<f32>,
            }

            struct BufferedSystem {
                base: EntityBufferedSystem<f32>,
            }

            impl DummySystem {
                #[with_predicate]
                fn keep(&self, health: &Health) -> bool {
                    true
                }
            }

            impl BufferedSystem {
                #[with_predicate]
                fn keep(&self, health: &Health) -> bool {
                    true
                }
            }
        "#;

        assert!(diagnostics_for(source).is_empty());
    }

    #[test]
    fn predicate_signature_violations_report_signature_rule() {
        // Every row violates exactly one signature requirement.
        let cases = [
            // wrong return type
            r#"
                struct S { base: EntitySystem<f32> }
                impl S {
                    #[with_predicate]
                    fn keep(&self, health: &Health) {}
                }
            "#,
            // wrong parameter count
            r#"
                struct S { base: EntitySystem<f32> }
                impl S {
                    #[with_predicate]
                    fn keep(&self) -> bool { true }
                }
            "#,
            // wrong pass mode
            r#"
                struct S { base: EntitySystem<f32> }
                impl S {
                    #[with_predicate]
                    fn keep(&self, health: Health) -> bool { true }
                }
            "#,
        ];

        for source in cases {
            let diagnostics = diagnostics_for(source);
            assert_eq!(diagnostics.len(), 1);
            assert_eq!(diagnostics[0].id(), "SWA0002");
            assert!(diagnostics[0].message.contains("'keep'"));
        }
    }

    #[test]
    fn predicate_outside_system_reports_only_base_type_rule() {
        // Given: both the base type and the signature are wrong.
        let source = r#"
            struct Dummy;

            impl Dummy {
                #[with_predicate]
                fn keep(&self) {}
            }
        "#;

        // When
        let diagnostics = diagnostics_for(source);

        // Then: the base-type check takes precedence, never both.
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].id(), "SWA0003");
        assert!(diagnostics[0].message.contains("'keep'"));
    }

    #[test]
    fn subscribe_with_valid_signature_is_accepted() {
        let source = r#"
            struct Handler;

            impl Handler {
                #[subscribe]
                fn on_paused(&mut self, message: &Paused) {}
            }
        "#;

        assert!(diagnostics_for(source).is_empty());
    }

    #[test]
    fn subscribe_violations_report_exactly_one_diagnostic() {
        let cases = [
            // non-unit return
            r#"
                struct H;
                impl H {
                    #[subscribe]
                    fn on_message(&mut self, message: &Paused) -> bool { true }
                }
            "#,
            // wrong parameter count
            r#"
                struct H;
                impl H {
                    #[subscribe]
                    fn on_message(&mut self) {}
                }
            "#,
            // wrong pass mode
            r#"
                struct H;
                impl H {
                    #[subscribe]
                    fn on_message(&mut self, message: Paused) {}
                }
            "#,
        ];

        for source in cases {
            let diagnostics = diagnostics_for(source);
            assert_eq!(diagnostics.len(), 1);
            assert_eq!(diagnostics[0].id(), "SWA0001");
            assert_eq!(
                diagnostics[0].message,
                "Remove the #[subscribe] attribute from the 'on_message' method or change the \
                 method signature."
            );
        }
    }

    #[test]
    fn subscribe_is_not_tied_to_a_shape() {
        // A handler on a system type follows the same single rule.
        let source = r#"
            struct S { base: EntitySystem<f32> }
            impl S {
                #[subscribe]
                fn on_message(&mut self, message: Paused) {}
            }
        "#;

        let diagnostics = diagnostics_for(source);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].id(), "SWA0001");
    }

    #[test]
    fn diagnostics_locate_the_method_identifier() {
        let source = r#"
struct H;
impl H {
    #[subscribe]
    fn on_message(&mut self) {}
}
"#;

        let model = parse_source(source).unwrap();
        let expected = model.type_named("H").unwrap().methods[0].span;

        let diagnostics = validate(&model);
        assert_eq!(diagnostics[0].span, expected);
    }
}
