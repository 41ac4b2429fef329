//! Diagnostic records and the rule descriptors that produce them.
//!
//! A [`Rule`] is static metadata: stable identifier, message template with
//! positional `{0}`/`{1}` slots, severity, and a longer description for
//! documentation surfaces. A [`Diagnostic`] is one immutable report tied
//! to a source span. Diagnostics are never retracted within a pass;
//! visibility decisions happen later in the suppression stage.

use std::fmt;

use crate::model::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Static descriptor for one diagnostic rule.
#[derive(Debug, PartialEq, Eq)]
pub struct Rule {
    /// Stable identifier, e.g. `SWA0004`.
    pub id: &'static str,
    pub title: &'static str,

    /// Message template with positional `{0}`/`{1}` slots.
    pub message: &'static str,
    pub severity: Severity,
    pub description: &'static str,
}

impl Rule {
    /// Render the message template with positional arguments.
    pub fn format(&self, args: &[&str]) -> String {
        let mut message = self.message.to_string();
        for (index, arg) in args.iter().enumerate() {
            message = message.replace(&format!("{{{index}}}"), arg);
        }
        message
    }

    /// Produce a diagnostic for this rule at the given span.
    pub fn report(&'static self, span: Span, args: &[&str]) -> Diagnostic {
        Diagnostic {
            rule: self,
            message: self.format(args),
            span,
        }
    }
}

/// One reported violation.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub rule: &'static Rule,
    pub message: String,
    pub span: Span,
}

impl Diagnostic {
    #[inline]
    pub fn id(&self) -> &'static str {
        self.rule.id
    }

    #[inline]
    pub fn severity(&self) -> Severity {
        self.rule.severity
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}]: {} ({})",
            self.severity(),
            self.id(),
            self.message,
            self.span
        )
    }
}
