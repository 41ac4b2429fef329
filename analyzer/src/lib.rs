//! Marker-driven analysis and code generation for swarm systems.
//!
//! Source is lowered into a parser-agnostic [`model`](crate::model), then a
//! [`pass`](crate::pass) validates marker usage, selects update candidates,
//! binds their parameters, and emits companion impl blocks as generated
//! units. A separate [`suppress`](crate::suppress) policy decides which
//! foreign diagnostics to hide on subscription handlers.

pub mod bind;
pub mod diagnostic;
pub mod emit;
pub mod model;
pub mod parse;
pub mod pass;
pub mod select;
pub mod shape;
pub mod suppress;
pub mod validate;

pub use diagnostic::{Diagnostic, Severity};
pub use emit::GeneratedUnit;
pub use model::Model;
pub use pass::{run, Output};
