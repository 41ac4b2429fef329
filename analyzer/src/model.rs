//! The semantic model the analysis pipeline runs over.
//!
//! The pipeline never inspects syntax directly; the frontend (see
//! [`parse`](crate::parse)) lowers source into this small set of read-only
//! declaration records, and every later stage (classifier, validators,
//! selector, binder, emitter) only queries them. Keeping the model
//! parser-agnostic means hosts with their own declaration source can feed
//! the pipeline directly.

use std::fmt;

use quote::ToTokens;

/// Source position of a declaration, used to locate diagnostics.
///
/// Lines are 1-based and columns 0-based, matching what the parser reports.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub line: usize,
    pub column: usize,
}

impl Span {
    /// A span for declarations with no known source position.
    pub const NONE: Self = Span { line: 0, column: 0 };

    #[inline]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl From<proc_macro2::Span> for Span {
    fn from(span: proc_macro2::Span) -> Self {
        let start = span.start();
        Self {
            line: start.line,
            column: start.column,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The marker attributes recognized by the pipeline.
///
/// Markers are resolved through a single lookup table keyed by the
/// attribute path as written, optionally `swarm::`-qualified. Nothing else
/// in the pipeline compares attribute names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    /// `#[with(..)]` on a type: declares a required-component filter.
    With,

    /// `#[with_predicate]` on a method: per-entity inclusion test.
    WithPredicate,

    /// `#[subscribe]` on a method: message-handler registration.
    Subscribe,

    /// `#[update]` on a method: opts into dispatch generation.
    Update,
}

/// The marker table. Order is irrelevant; names are unique.
const MARKERS: [(&str, MarkerKind); 4] = [
    ("with", MarkerKind::With),
    ("with_predicate", MarkerKind::WithPredicate),
    ("subscribe", MarkerKind::Subscribe),
    ("update", MarkerKind::Update),
];

impl MarkerKind {
    /// Resolve an attribute path to a marker kind, accepting both the bare
    /// name and the `swarm::`-qualified form.
    pub fn resolve(path: &str) -> Option<Self> {
        let name = path.strip_prefix("swarm::").unwrap_or(path);
        MARKERS
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, kind)| *kind)
    }

    /// The attribute name of this marker, as written in source.
    pub fn name(&self) -> &'static str {
        MARKERS
            .iter()
            .find(|(_, kind)| kind == self)
            .map(|(name, _)| *name)
            .unwrap_or_default()
    }
}

/// How a parameter is passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassMode {
    /// By value.
    Value,

    /// By shared reference (`&T`), read-only.
    In,

    /// By mutable reference (`&mut T`).
    Mut,

    /// Write-only. Not expressible in the parsed dialect, but hosts with
    /// richer models can report it and the selector rejects it.
    Out,
}

/// A reference to a type as written in a declaration.
///
/// Wraps the parsed type so the classifier and binder can compare types
/// structurally and extract generic arguments positionally.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeRef(syn::Type);

impl TypeRef {
    pub fn new(ty: syn::Type) -> Self {
        Self(ty)
    }

    /// Parse a type reference from source text.
    pub fn parse(source: &str) -> Result<Self, syn::Error> {
        syn::parse_str(source).map(Self)
    }

    #[inline]
    pub fn ty(&self) -> &syn::Type {
        &self.0
    }

    /// The last path segment identifier, if this is a plain path type.
    pub fn head(&self) -> Option<&syn::Ident> {
        match &self.0 {
            syn::Type::Path(path) => path.path.segments.last().map(|segment| &segment.ident),
            _ => None,
        }
    }

    /// Whether the type's head identifier matches `name`, ignoring any
    /// qualifying path.
    pub fn is_named(&self, name: &str) -> bool {
        self.head().is_some_and(|ident| ident == name)
    }

    /// The angle-bracketed type arguments of the last path segment, in
    /// declaration order.
    pub fn generic_args(&self) -> Vec<TypeRef> {
        let syn::Type::Path(path) = &self.0 else {
            return Vec::new();
        };
        let Some(segment) = path.path.segments.last() else {
            return Vec::new();
        };
        let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
            return Vec::new();
        };
        args.args
            .iter()
            .filter_map(|arg| match arg {
                syn::GenericArgument::Type(ty) => Some(TypeRef::new(ty.clone())),
                _ => None,
            })
            .collect()
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_token_stream())
    }
}

/// A method parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub mode: PassMode,

    /// The parameter type with any reference stripped; `mode` carries it.
    pub ty: TypeRef,
}

/// A method declaration inside a type.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub name: String,

    /// Span of the method's identifier.
    pub span: Span,
    pub markers: Vec<MarkerKind>,
    pub params: Vec<Param>,

    /// Declared return type; `None` is the unit type.
    pub ret: Option<TypeRef>,
    pub has_receiver: bool,
}

impl MethodDecl {
    pub fn has_marker(&self, kind: MarkerKind) -> bool {
        self.markers.contains(&kind)
    }

    #[inline]
    pub fn returns_unit(&self) -> bool {
        self.ret.is_none()
    }

    #[inline]
    pub fn returns_bool(&self) -> bool {
        self.ret.as_ref().is_some_and(|ty| ty.is_named("bool"))
    }

    /// An explicit constructor: a receiver-less associated function
    /// returning `Self`. Its presence disables constructor synthesis.
    pub fn is_constructor(&self) -> bool {
        !self.has_receiver && self.ret.as_ref().is_some_and(|ty| ty.is_named("Self"))
    }
}

/// A type declaration and the methods declared on it.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDecl {
    pub name: String,

    /// Enclosing module path, outermost first. Empty for root-level types.
    pub module_path: Vec<String>,

    /// Span of the type's identifier.
    pub span: Span,

    /// Whether the type opted into companion generation via `#[partial]`.
    pub is_partial: bool,
    pub is_public: bool,

    /// The declared base, if any. The classifier walks this chain.
    pub base: Option<TypeRef>,

    /// Whether the base was declared as the named field `base` rather than
    /// the sole tuple field. Drives how synthesized constructors build `Self`.
    pub base_is_named: bool,
    pub markers: Vec<MarkerKind>,
    pub methods: Vec<MethodDecl>,
}

impl TypeDecl {
    pub fn has_marker(&self, kind: MarkerKind) -> bool {
        self.markers.contains(&kind)
    }

    pub fn has_explicit_constructor(&self) -> bool {
        self.methods.iter().any(MethodDecl::is_constructor)
    }

    /// The type name qualified by its module path, for messages and logs.
    pub fn qualified_name(&self) -> String {
        if self.module_path.is_empty() {
            self.name.clone()
        } else {
            format!("{}::{}", self.module_path.join("::"), self.name)
        }
    }
}

/// One analysis pass's view of all declarations.
///
/// Immutable once built; every pipeline stage only reads it.
#[derive(Debug, Default, Clone)]
pub struct Model {
    types: Vec<TypeDecl>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, decl: TypeDecl) {
        self.types.push(decl);
    }

    #[inline]
    pub fn types(&self) -> &[TypeDecl] {
        &self.types
    }

    /// Look a type up by its unqualified name.
    pub fn type_named(&self, name: &str) -> Option<&TypeDecl> {
        self.types.iter().find(|decl| decl.name == name)
    }

    /// Resolve a source span to the method declared there, if any. The
    /// lookup matches the method's identifier span exactly; callers with a
    /// position inside a declaration resolve it to the identifier first.
    /// Used by the suppression policy to tie a foreign diagnostic back to
    /// a handler.
    pub fn method_at(&self, span: Span) -> Option<(&TypeDecl, &MethodDecl)> {
        self.types.iter().find_map(|decl| {
            decl.methods
                .iter()
                .find(|method| method.span == span)
                .map(|method| (decl, method))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_table_resolves_bare_and_qualified_names() {
        // Given / When / Then
        assert_eq!(MarkerKind::resolve("with"), Some(MarkerKind::With));
        assert_eq!(MarkerKind::resolve("swarm::update"), Some(MarkerKind::Update));
        assert_eq!(
            MarkerKind::resolve("with_predicate"),
            Some(MarkerKind::WithPredicate)
        );
        assert_eq!(MarkerKind::resolve("swarm::subscribe"), Some(MarkerKind::Subscribe));
        assert_eq!(MarkerKind::resolve("derive"), None);
        assert_eq!(MarkerKind::resolve("other::update"), None);
    }

    #[test]
    fn marker_names_round_trip() {
        for (name, kind) in MARKERS {
            assert_eq!(kind.name(), name);
            assert_eq!(MarkerKind::resolve(name), Some(kind));
        }
    }

    #[test]
    fn type_ref_head_and_generic_args() {
        // Given
        let ty = TypeRef::parse("swarm::EntitiesSystem<GameTime, Faction>").unwrap();

        // Then
        assert!(ty.is_named("EntitiesSystem"));
        let args = ty.generic_args();
        assert_eq!(args.len(), 2);
        assert!(args[0].is_named("GameTime"));
        assert!(args[1].is_named("Faction"));
    }

    #[test]
    fn type_ref_equality_is_structural() {
        let left = TypeRef::parse("Components<Speed>").unwrap();
        let right = TypeRef::parse("Components<Speed>").unwrap();
        let other = TypeRef::parse("Components<Position>").unwrap();

        assert_eq!(left, right);
        assert_ne!(left, other);
    }

    #[test]
    fn constructor_detection() {
        // Given
        let constructor = MethodDecl {
            name: "new".to_string(),
            span: Span::NONE,
            markers: Vec::new(),
            params: Vec::new(),
            ret: Some(TypeRef::parse("Self").unwrap()),
            has_receiver: false,
        };
        let helper = MethodDecl {
            name: "tick".to_string(),
            span: Span::NONE,
            markers: Vec::new(),
            params: Vec::new(),
            ret: None,
            has_receiver: true,
        };

        // Then
        assert!(constructor.is_constructor());
        assert!(!helper.is_constructor());
    }

    #[test]
    fn method_at_resolves_by_span() {
        // Given
        let method = MethodDecl {
            name: "on_message".to_string(),
            span: Span::new(4, 8),
            markers: vec![MarkerKind::Subscribe],
            params: Vec::new(),
            ret: None,
            has_receiver: true,
        };
        let mut model = Model::new();
        model.push(TypeDecl {
            name: "Handler".to_string(),
            module_path: Vec::new(),
            span: Span::new(2, 4),
            is_partial: false,
            is_public: true,
            base: None,
            base_is_named: true,
            markers: Vec::new(),
            methods: vec![method],
        });

        // When / Then
        let (decl, found) = model.method_at(Span::new(4, 8)).unwrap();
        assert_eq!(decl.name, "Handler");
        assert_eq!(found.name, "on_message");
        assert!(model.method_at(Span::new(9, 9)).is_none());
    }
}
