//! Procedural macros for state-dispatch

use darling::{FromDeriveInput, FromVariant};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, DeriveInput, GenericArgument, PathArguments, Type};

/// Container-level input for #[derive(Action)]
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(action), supports(enum_any))]
struct ActionOpts {
    ident: syn::Ident,
    generics: syn::Generics,
    data: darling::ast::Data<ActionVariant, ()>,
}

/// Variant-level attributes
#[derive(Debug, FromVariant)]
#[darling(attributes(action))]
struct ActionVariant {
    ident: syn::Ident,
    fields: darling::ast::Fields<syn::Field>,

    /// Variant wrapping `TimeTravelAction<S>`
    #[darling(default)]
    time_travel: bool,
}

/// `S` out of a `TimeTravelAction<S>` (or `path::to::TimeTravelAction<S>`) type
fn time_travel_state_type(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != "TimeTravelAction" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first() {
        Some(GenericArgument::Type(state)) if args.args.len() == 1 => Some(state),
        _ => None,
    }
}

/// Derive macro for the Action trait
///
/// Generates a `name()` method that returns the variant name as a static string.
///
/// Marking one single-field tuple variant with `#[action(time_travel)]` also
/// generates:
/// - `TimeTravelAware<S>`, so the enum can drive a `TimeTravelMiddleware<S>`
/// - `From<TimeTravelAction<S>>`
///
/// # Example
/// ```ignore
/// #[derive(Action, Clone, Debug)]
/// enum UserAction {
///     SetName(String),
///     Clear,
///     #[action(time_travel)]
///     TimeTravel(TimeTravelAction<Option<User>>),
/// }
///
/// assert_eq!(UserAction::Clear.name(), "Clear");
/// let rewind: UserAction = TimeTravelAction::travel_to(0).into();
/// ```
#[proc_macro_derive(Action, attributes(action))]
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let opts = match ActionOpts::from_derive_input(&input) {
        Ok(opts) => opts,
        Err(e) => return e.write_errors().into(),
    };

    let name = &opts.ident;
    let (impl_generics, ty_generics, where_clause) = opts.generics.split_for_impl();

    let variants = match &opts.data {
        darling::ast::Data::Enum(variants) => variants,
        _ => {
            return syn::Error::new_spanned(&input, "Action can only be derived for enums")
                .to_compile_error()
                .into();
        }
    };

    let name_arms: Vec<TokenStream2> = variants
        .iter()
        .map(|v| {
            let variant_name = &v.ident;
            let variant_str = variant_name.to_string();

            match &v.fields.style {
                darling::ast::Style::Unit => quote! {
                    #name::#variant_name => #variant_str
                },
                darling::ast::Style::Tuple => quote! {
                    #name::#variant_name(..) => #variant_str
                },
                darling::ast::Style::Struct => quote! {
                    #name::#variant_name { .. } => #variant_str
                },
            }
        })
        .collect();

    let mut expanded: TokenStream2 = quote! {
        impl #impl_generics ::state_dispatch::Action for #name #ty_generics #where_clause {
            fn name(&self) -> &'static str {
                match self {
                    #(#name_arms),*
                }
            }
        }
    };

    let time_travel: Vec<&ActionVariant> = variants.iter().filter(|v| v.time_travel).collect();

    if time_travel.len() > 1 {
        return syn::Error::new_spanned(
            &time_travel[1].ident,
            "only one variant can be marked #[action(time_travel)]",
        )
        .to_compile_error()
        .into();
    }

    if let Some(variant) = time_travel.first() {
        let variant_name = &variant.ident;

        let field_ty = match (&variant.fields.style, variant.fields.fields.as_slice()) {
            (darling::ast::Style::Tuple, [field]) => &field.ty,
            _ => {
                return syn::Error::new_spanned(
                    variant_name,
                    "#[action(time_travel)] requires a variant with exactly one unnamed field",
                )
                .to_compile_error()
                .into();
            }
        };

        let Some(state_ty) = time_travel_state_type(field_ty) else {
            return syn::Error::new_spanned(
                field_ty,
                "#[action(time_travel)] field must be a TimeTravelAction<S>",
            )
            .to_compile_error()
            .into();
        };

        expanded.extend(quote! {
            impl #impl_generics ::state_dispatch::timetravel::TimeTravelAware<#state_ty>
                for #name #ty_generics #where_clause
            {
                #[allow(unreachable_patterns)]
                fn as_time_travel(
                    &self,
                ) -> ::core::option::Option<&::state_dispatch::timetravel::TimeTravelAction<#state_ty>>
                {
                    match self {
                        #name::#variant_name(inner) => ::core::option::Option::Some(inner),
                        _ => ::core::option::Option::None,
                    }
                }
            }

            impl #impl_generics ::core::convert::From<#field_ty> for #name #ty_generics #where_clause {
                fn from(action: #field_ty) -> Self {
                    #name::#variant_name(action)
                }
            }
        });
    }

    expanded.into()
}
