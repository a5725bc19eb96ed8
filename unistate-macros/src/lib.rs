//! Procedural macros for unistate

use darling::{FromDeriveInput, FromVariant};
use proc_macro::TokenStream;
use proc_macro2::{Ident, TokenStream as TokenStream2};
use quote::{format_ident, quote};
use syn::{parse_macro_input, DeriveInput};

/// Container-level attributes for #[derive(Action)]
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(action), supports(enum_any))]
struct ActionOpts {
    ident: Ident,
    vis: syn::Visibility,
    generics: syn::Generics,
    data: darling::ast::Data<ActionVariant, ()>,

    /// Name of the generated kind enum (default: `{Enum}Kind`)
    #[darling(default)]
    kind: Option<Ident>,

    /// Also implement `ActionSummary` with its default `Debug` summary
    #[darling(default)]
    summary: bool,
}

/// Variant-level attributes
#[derive(Debug, FromVariant)]
#[darling(attributes(action))]
struct ActionVariant {
    ident: Ident,

    /// Override the name reported by `Action::name()`
    #[darling(default)]
    name: Option<String>,
}

/// Derive macro for the Action trait
///
/// Generates:
/// - a `{Name}Kind` enum with one unit variant per action variant, used as
///   the reducer table key
/// - `Action::kind()`, mapping each variant (whatever its payload) to its kind
/// - `Action::name()`, returning the variant name as a static string
///
/// Container attributes:
/// - `#[action(kind = "MyKind")]` renames the generated kind enum
/// - `#[action(summary)]` also implements `ActionSummary`
///
/// Variant attributes:
/// - `#[action(name = "...")]` overrides the logged name
///
/// # Example
/// ```ignore
/// #[derive(Action, Clone, Debug)]
/// #[action(summary)]
/// enum Todo {
///     Add(String),
///     Toggle { id: u64 },
///     #[action(name = "ClearAll")]
///     Clear,
/// }
///
/// assert_eq!(Todo::Add("x".into()).kind(), TodoKind::Add);
/// assert_eq!(Todo::Clear.name(), "ClearAll");
/// assert_eq!(TodoKind::all().len(), 3);
/// ```
#[proc_macro_derive(Action, attributes(action))]
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let opts = match ActionOpts::from_derive_input(&input) {
        Ok(opts) => opts,
        Err(e) => return e.write_errors().into(),
    };

    let variants = match &opts.data {
        darling::ast::Data::Enum(variants) => variants,
        _ => {
            return syn::Error::new_spanned(&input, "Action can only be derived for enums")
                .to_compile_error()
                .into();
        }
    };

    if variants.is_empty() {
        return syn::Error::new_spanned(&input, "Action cannot be derived for an empty enum")
            .to_compile_error()
            .into();
    }

    let name = &opts.ident;
    let vis = &opts.vis;
    let kind_name: Ident = opts
        .kind
        .clone()
        .unwrap_or_else(|| format_ident!("{}Kind", name));
    let (impl_generics, ty_generics, where_clause) = opts.generics.split_for_impl();

    let variant_idents: Vec<_> = variants.iter().map(|v| &v.ident).collect();
    let variant_names: Vec<_> = variants
        .iter()
        .map(|v| v.name.clone().unwrap_or_else(|| v.ident.to_string()))
        .collect();
    let kind_names: Vec<_> = variant_idents.iter().map(|v| v.to_string()).collect();

    let kind_doc = format!(
        "Action kinds for [`{}`].\n\n\
         Each variant identifies the reducers bound to the matching `{}` variant.",
        name, name
    );

    let mut expanded: TokenStream2 = quote! {
        #[doc = #kind_doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #vis enum #kind_name {
            #(#variant_idents,)*
        }

        impl #kind_name {
            /// Get all kind values, in declaration order
            pub fn all() -> &'static [Self] {
                &[#(Self::#variant_idents,)*]
            }

            /// Get the kind name as a string
            pub fn name(&self) -> &'static str {
                match self {
                    #(Self::#variant_idents => #kind_names,)*
                }
            }
        }

        impl #impl_generics unistate::Action for #name #ty_generics #where_clause {
            type Kind = #kind_name;

            fn kind(&self) -> Self::Kind {
                match self {
                    #(Self::#variant_idents { .. } => #kind_name::#variant_idents,)*
                }
            }

            fn name(&self) -> &'static str {
                match self {
                    #(Self::#variant_idents { .. } => #variant_names,)*
                }
            }
        }
    };

    if opts.summary {
        expanded = quote! {
            #expanded

            impl #impl_generics unistate::ActionSummary for #name #ty_generics #where_clause {}
        };
    }

    TokenStream::from(expanded)
}
