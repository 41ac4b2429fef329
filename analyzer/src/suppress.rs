//! Suppression of foreign diagnostics on subscription handlers.
//!
//! Handlers have their signature dictated by the message bus: the method
//! may look unused and its single shared-reference parameter trips
//! pass-by-value lints. When a diagnostic from one of those foreign rules
//! lands on a `#[subscribe]` method, this policy reports a suppression.
//! It never alters the diagnostic itself, only its visibility.

use crate::model::{MarkerKind, Model, Span};

/// Static descriptor for one suppression rule.
#[derive(Debug, PartialEq, Eq)]
pub struct SuppressionDescriptor {
    /// Stable identifier of the suppression itself, e.g. `SWS0001`.
    pub id: &'static str,

    /// The foreign rule this suppression applies to, treated as an opaque
    /// string.
    pub suppressed_id: &'static str,
    pub justification: &'static str,
}

/// Suppresses unused-member reports on handlers: the method is invoked
/// through the message bus, not by direct calls.
pub static UNUSED_HANDLER: SuppressionDescriptor = SuppressionDescriptor {
    id: "SWS0001",
    suppressed_id: "dead_code",
    justification: "Handler is invoked through the message bus.",
};

/// Suppresses pass-by-value suggestions on handler parameters: the
/// shared-reference signature is part of the publisher contract.
pub static HANDLER_SIGNATURE: SuppressionDescriptor = SuppressionDescriptor {
    id: "SWS0002",
    suppressed_id: "trivially_copy_pass_by_ref",
    justification: "Signature is dictated by the publisher contract.",
};

/// Every suppression this policy can report.
pub static ALL: &[&SuppressionDescriptor] = &[&UNUSED_HANDLER, &HANDLER_SIGNATURE];

/// A diagnostic produced by an unrelated rule, as handed in by the host.
///
/// `span` must be the identifier span of the method the diagnostic is
/// attached to; a host whose lints point inside a declaration (at a
/// parameter, say) resolves them to the declaring method before handing
/// them in. Resolution is an exact-span lookup, see
/// [`Model::method_at`](crate::model::Model::method_at).
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignDiagnostic {
    pub id: String,
    pub span: Span,
}

impl ForeignDiagnostic {
    pub fn new(id: impl Into<String>, span: Span) -> Self {
        Self {
            id: id.into(),
            span,
        }
    }
}

/// One suppression decision: which descriptor applies to which diagnostic.
#[derive(Debug, Clone, PartialEq)]
pub struct Suppression<'a> {
    pub descriptor: &'static SuppressionDescriptor,
    pub diagnostic: &'a ForeignDiagnostic,
}

/// Decide suppressions for a batch of foreign diagnostics.
///
/// Pure over (rule id, whether the diagnosed node is a `#[subscribe]`
/// method); diagnostics that resolve to nothing in the model pass through
/// unsuppressed.
pub fn suppressions<'a>(
    model: &Model,
    reported: &'a [ForeignDiagnostic],
) -> Vec<Suppression<'a>> {
    reported
        .iter()
        .filter_map(|diagnostic| {
            let (_, method) = model.method_at(diagnostic.span)?;
            if !method.has_marker(MarkerKind::Subscribe) {
                return None;
            }
            let descriptor = ALL
                .iter()
                .find(|descriptor| descriptor.suppressed_id == diagnostic.id)
                .copied()?;
            Some(Suppression {
                descriptor,
                diagnostic,
            })
        })
        .collect()
}
