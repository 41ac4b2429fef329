//! The analysis pass: one run over a model.
//!
//! A pass validates every declaration, then selects, binds, and emits
//! generated units. Diagnostics never block emission; a malformed marker
//! on one type does not stop a well-formed sibling from generating.

use log::debug;

use crate::bind;
use crate::diagnostic::{Diagnostic, Severity};
use crate::emit::{self, GeneratedUnit};
use crate::model::Model;
use crate::select;
use crate::validate;

/// Everything one pass produces.
#[derive(Debug)]
pub struct Output {
    pub diagnostics: Vec<Diagnostic>,
    pub units: Vec<GeneratedUnit>,
}

impl Output {
    /// Whether any diagnostic is an error.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diagnostic| diagnostic.severity() == Severity::Error)
    }
}

/// Run one full pass over the model. The unit counter is scoped to the
/// pass, so repeated runs over the same model name units identically.
pub fn run(model: &Model) -> Output {
    let diagnostics = validate::validate(model);
    debug!("validation reported {} diagnostic(s)", diagnostics.len());

    let candidates = select::select(model);
    debug!("selected {} candidate(s)", candidates.len());

    let mut counter = 0;
    let units = candidates
        .iter()
        .map(|candidate| {
            let bindings = bind::bind(candidate);
            let unit = emit::emit(candidate, &bindings, &mut counter);
            debug!(
                "emitted '{}' for '{}'",
                unit.name,
                candidate.container.qualified_name()
            );
            unit
        })
        .collect();

    Output { diagnostics, units }
}
