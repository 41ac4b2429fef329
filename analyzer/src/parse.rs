//! Frontend lowering parsed source into the semantic [`Model`].
//!
//! Struct items become [`TypeDecl`]s and inherent `impl` items attach
//! methods to them, so a [`Loader`] collects declarations across every
//! added source before resolving impl blocks to their targets.
//!
//! Dialect conventions recognized here:
//!
//! - the base of a system type is the field named `base` (or the sole
//!   tuple field) of its struct declaration
//! - `#[partial]` opts a type into companion generation
//! - marker attributes are resolved through the marker table, bare or
//!   `swarm::`-qualified
//! - `&T` parameters lower to [`PassMode::In`], `&mut T` to
//!   [`PassMode::Mut`], everything else to [`PassMode::Value`]

use log::debug;

use crate::model::{MarkerKind, MethodDecl, Model, Param, PassMode, TypeDecl, TypeRef};

/// Accumulates declarations from one or more source files, then resolves
/// method bodies to their containing types.
#[derive(Debug, Default)]
pub struct Loader {
    types: Vec<TypeDecl>,

    /// Methods from impl blocks, keyed by the target type name. Attached
    /// on `finish` so impls may precede their struct in source order.
    pending: Vec<(String, MethodDecl)>,
}

impl Loader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one source file and collect its declarations.
    pub fn add_source(&mut self, source: &str) -> Result<(), syn::Error> {
        let file = syn::parse_file(source)?;
        self.collect_items(&file.items, &mut Vec::new());
        Ok(())
    }

    /// Attach collected methods to their types and seal the model.
    pub fn finish(self) -> Model {
        let mut types = self.types;
        for (target, method) in self.pending {
            match types.iter_mut().find(|decl| decl.name == target) {
                Some(decl) => decl.methods.push(method),
                None => debug!("dropping method '{}' on unknown type '{target}'", method.name),
            }
        }

        let mut model = Model::new();
        for decl in types {
            model.push(decl);
        }
        model
    }

    fn collect_items(&mut self, items: &[syn::Item], module_path: &mut Vec<String>) {
        for item in items {
            match item {
                syn::Item::Struct(item) => self.collect_struct(item, module_path),
                syn::Item::Impl(item) => self.collect_impl(item),
                syn::Item::Mod(item) => {
                    if let Some((_, items)) = &item.content {
                        module_path.push(item.ident.to_string());
                        self.collect_items(items, module_path);
                        module_path.pop();
                    }
                }
                _ => {}
            }
        }
    }

    fn collect_struct(&mut self, item: &syn::ItemStruct, module_path: &[String]) {
        let (base, base_is_named) = base_field(&item.fields);
        self.types.push(TypeDecl {
            name: item.ident.to_string(),
            module_path: module_path.to_vec(),
            span: item.ident.span().into(),
            is_partial: has_attr(&item.attrs, "partial"),
            is_public: matches!(item.vis, syn::Visibility::Public(_)),
            base,
            base_is_named,
            markers: markers(&item.attrs),
            methods: Vec::new(),
        });
    }

    fn collect_impl(&mut self, item: &syn::ItemImpl) {
        // Trait impls are not declaration sites in the dialect.
        if item.trait_.is_some() {
            return;
        }
        let Some(target) = TypeRef::new((*item.self_ty).clone())
            .head()
            .map(ToString::to_string)
        else {
            return;
        };

        for member in &item.items {
            if let syn::ImplItem::Fn(function) = member {
                self.pending
                    .push((target.clone(), lower_method(function)));
            }
        }
    }
}

/// Parse a single source file into a model.
pub fn parse_source(source: &str) -> Result<Model, syn::Error> {
    let mut loader = Loader::new();
    loader.add_source(source)?;
    Ok(loader.finish())
}

fn lower_method(function: &syn::ImplItemFn) -> MethodDecl {
    let sig = &function.sig;
    let mut params = Vec::new();
    let mut has_receiver = false;

    for input in &sig.inputs {
        match input {
            syn::FnArg::Receiver(_) => has_receiver = true,
            syn::FnArg::Typed(typed) => params.push(lower_param(typed)),
        }
    }

    MethodDecl {
        name: sig.ident.to_string(),
        span: sig.ident.span().into(),
        markers: markers(&function.attrs),
        params,
        ret: match &sig.output {
            syn::ReturnType::Default => None,
            syn::ReturnType::Type(_, ty) => Some(TypeRef::new((**ty).clone())),
        },
        has_receiver,
    }
}

fn lower_param(typed: &syn::PatType) -> Param {
    let name = match &*typed.pat {
        syn::Pat::Ident(pat) => pat.ident.to_string(),
        _ => "_".to_string(),
    };
    let (mode, ty) = match &*typed.ty {
        syn::Type::Reference(reference) => {
            let mode = if reference.mutability.is_some() {
                PassMode::Mut
            } else {
                PassMode::In
            };
            (mode, (*reference.elem).clone())
        }
        other => (PassMode::Value, other.clone()),
    };

    Param {
        name,
        mode,
        ty: TypeRef::new(ty),
    }
}

fn base_field(fields: &syn::Fields) -> (Option<TypeRef>, bool) {
    match fields {
        syn::Fields::Named(named) => {
            let base = named.named.iter().find_map(|field| {
                field
                    .ident
                    .as_ref()
                    .filter(|ident| *ident == "base")
                    .map(|_| TypeRef::new(field.ty.clone()))
            });
            (base, true)
        }
        syn::Fields::Unnamed(unnamed) if unnamed.unnamed.len() == 1 => (
            Some(TypeRef::new(unnamed.unnamed[0].ty.clone())),
            false,
        ),
        _ => (None, true),
    }
}

fn markers(attrs: &[syn::Attribute]) -> Vec<MarkerKind> {
    attrs
        .iter()
        .filter_map(|attr| MarkerKind::resolve(&path_string(attr.path())))
        .collect()
}

fn has_attr(attrs: &[syn::Attribute], name: &str) -> bool {
    attrs.iter().any(|attr| {
        let path = path_string(attr.path());
        path == name || path.strip_prefix("swarm::") == Some(name)
    })
}

fn path_string(path: &syn::Path) -> String {
    path.segments
        .iter()
        .map(|segment| segment.ident.to_string())
        .collect::<Vec<_>>()
        .join("::")
}
