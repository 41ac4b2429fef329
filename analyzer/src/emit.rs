//! Code emission for bound candidates.
//!
//! Each candidate yields one generated unit holding three companion impl
//! blocks for the container: the component filter, the constructor set,
//! and the dispatch override. Everything is emitted with fully qualified
//! `::swarm::` paths so units compile without imports, wherever they are
//! included.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};

use crate::bind::{Bindings, Role};
use crate::model::{PassMode, TypeDecl, TypeRef};
use crate::select::Candidate;

/// One generated compilation unit.
#[derive(Debug, Clone)]
pub struct GeneratedUnit {
    /// Unit name, `System{n}` with a pass-scoped counter.
    pub name: String,
    tokens: TokenStream,
}

impl GeneratedUnit {
    #[inline]
    pub fn tokens(&self) -> &TokenStream {
        &self.tokens
    }

    /// The unit as source text, headed by a provenance comment.
    pub fn code(&self) -> String {
        format!("// Generated by swarm-analyzer. Do not edit.\n\n{}\n", self.tokens)
    }
}

/// Emit the companion unit for one candidate. The counter is shared across
/// a pass and incremented before use, so the first unit is `System1`.
pub fn emit(candidate: &Candidate<'_>, bindings: &Bindings, counter: &mut usize) -> GeneratedUnit {
    *counter += 1;
    let target = target_path(candidate.container);

    let filter = filter_impl(&target, bindings);
    let constructors = constructor_impl(candidate, &target);
    let dispatch = dispatch_impl(candidate, bindings, &target);

    GeneratedUnit {
        name: format!("System{counter}"),
        tokens: quote! {
            #filter
            #constructors
            #dispatch
        },
    }
}

/// The container's path from the crate root, e.g. `crate::systems::Move`.
fn target_path(container: &TypeDecl) -> TokenStream {
    let modules = container
        .module_path
        .iter()
        .map(|module| format_ident!("{module}"));
    let name = format_ident!("{}", container.name);
    quote!(crate::#(#modules::)*#name)
}

/// The filter impl is emitted even when empty, so the runtime sees a
/// uniform surface across generated systems.
fn filter_impl(target: &TokenStream, bindings: &Bindings) -> TokenStream {
    let components = bindings.filter.iter().map(TypeRef::ty);
    quote! {
        impl ::swarm::With for #target {
            fn with(filter: ::swarm::Filter) -> ::swarm::Filter {
                filter #(.with::<#components>())*
            }
        }
    }
}

/// Synthesized constructors delegating down to the direct base. An
/// explicit constructor on the container disables the whole set.
fn constructor_impl(candidate: &Candidate<'_>, target: &TokenStream) -> TokenStream {
    let container = candidate.container;
    if container.has_explicit_constructor() {
        return TokenStream::new();
    }
    let Some(base) = container.base.as_ref() else {
        return TokenStream::new();
    };
    let base = base.ty();
    let vis = if container.is_public {
        quote!(pub)
    } else {
        TokenStream::new()
    };

    if candidate.shape.is_buffered() {
        // Buffered systems construct from a world handle alone.
        let build = build_self(container, quote!(<#base>::new(world)));
        quote! {
            impl #target {
                #vis fn new(world: ::swarm::World) -> Self {
                    #build
                }
            }
        }
    } else {
        let build = build_self(
            container,
            quote!(<#base>::with_runner_and_threshold(world, runner, min_entities_per_worker)),
        );
        quote! {
            impl #target {
                #vis fn new(world: ::swarm::World) -> Self {
                    Self::with_runner(world, None)
                }

                #vis fn with_runner(world: ::swarm::World, runner: Option<::swarm::Runner>) -> Self {
                    Self::with_runner_and_threshold(world, runner, 0)
                }

                #vis fn with_runner_and_threshold(
                    world: ::swarm::World,
                    runner: Option<::swarm::Runner>,
                    min_entities_per_worker: usize,
                ) -> Self {
                    #build
                }
            }
        }
    }
}

fn build_self(container: &TypeDecl, base_call: TokenStream) -> TokenStream {
    if container.base_is_named {
        quote!(Self { base: #base_call })
    } else {
        quote!(Self(#base_call))
    }
}

/// The dispatch override: fetch each store once, then visit every entity
/// of the batch, forwarding to the marked method per its bound roles.
fn dispatch_impl(
    candidate: &Candidate<'_>,
    bindings: &Bindings,
    target: &TokenStream,
) -> TokenStream {
    let state = candidate.shape.state().ty();
    let method = format_ident!("{}", candidate.method.name);

    let fetches = bindings
        .fetches
        .iter()
        .enumerate()
        .map(|(index, fetch)| {
            let local = format_ident!("components{index}");
            let component = fetch.component.ty();
            if fetch.by_ref {
                quote!(let mut #local = world.components_mut::<#component>();)
            } else {
                quote!(let #local = world.components::<#component>();)
            }
        })
        .collect::<Vec<_>>();

    let mut fetch_index = 0usize;
    let mut next_local = || {
        let local = format_ident!("components{fetch_index}");
        fetch_index += 1;
        local
    };
    let args = bindings
        .roles
        .iter()
        .map(|role| match role {
            Role::Entity { by_ref } => {
                if *by_ref {
                    quote!(&entity)
                } else {
                    quote!(entity)
                }
            }
            Role::State => quote!(state),
            Role::Key => quote!(key),
            Role::Bundle { mode, .. } => {
                let local = next_local();
                match mode {
                    PassMode::Mut => quote!(&mut #local),
                    PassMode::In => quote!(&#local),
                    // A by-value store moves the fetched local in.
                    _ => quote!(#local),
                }
            }
            Role::Component { mode, .. } => {
                let local = next_local();
                match mode {
                    PassMode::Mut => quote!(&mut #local[entity]),
                    PassMode::In => quote!(&#local[entity]),
                    // A by-value component copies out of the store.
                    _ => quote!(#local[entity]),
                }
            }
        })
        .collect::<Vec<_>>();

    let (trait_path, extra_params) = match candidate.shape.key() {
        Some(key) => {
            let key = key.ty();
            (
                quote!(::swarm::KeyedUpdate<#state, #key>),
                quote!(key: &#key,),
            )
        }
        None => (quote!(::swarm::Update<#state>), TokenStream::new()),
    };

    let world = if fetches.is_empty() {
        TokenStream::new()
    } else {
        quote!(let world = ::swarm::System::world(self);)
    };

    quote! {
        impl #trait_path for #target {
            fn update(&mut self, state: &#state, #extra_params entities: &[::swarm::Entity]) {
                #world
                #(#fetches)*
                for entity in entities.iter().copied() {
                    self.#method(#(#args),*);
                }
            }
        }
    }
}
