//! Derive and attribute macros for the `checkers` assertion library.
//!
//! Rust has no runtime reflection, so these macros generate, at compile time, the capability impls the suite
//! engine would otherwise discover by introspection:
//! - `Inject`: where the per-test handle lives inside a suite struct
//! - `IntoValue`: how a struct lowers into a dynamically-typed `checkers::Value`
//! - `#[suite]`: which methods an `impl` block declares, with their parameter and return counts

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    Data, DeriveInput, Field, Fields, FnArg, GenericArgument, ImplItem, ItemImpl, PathArguments, ReturnType, Type,
    parse_macro_input, spanned::Spanned,
};

/// Name prefixes the engine matches test methods against; only used here to reject uncallable tests early.
const TEST_PREFIXES: [&str; 2] = ["Test", "test_"];
const SET_UPS: [&str; 2] = ["SetUpTest", "set_up_test"];

// ============================================================================
// Inject
// ============================================================================

/// Generates `checkers::Inject` for a suite struct (or any struct nested inside one).
///
/// Fields are visited in declaration order. A field takes part in the search when its type is `Test`, optionally
/// wrapped in `Option` and/or `Box`, or when it is marked `#[inject]` (for nested structs that themselves derive
/// `Inject`). The first field that accepts the handle wins.
///
/// # Example
/// ```ignore
/// #[derive(Default, Inject)]
/// struct Base {
///     test: Test,
/// }
///
/// #[derive(Default, Inject)]
/// struct MySuite {
///     #[inject]
///     base: Option<Box<Base>>,
///     counter: usize,
/// }
/// ```
#[proc_macro_derive(Inject, attributes(inject))]
pub fn derive_inject(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match struct_fields(&input, "Inject") {
        Ok(fields) => fields,
        Err(err) => return err.to_compile_error().into(),
    };

    let attempts: Vec<TokenStream2> = fields
        .iter()
        .enumerate()
        .filter(|(_, f)| has_inject_attr(f) || is_test_slot(&f.ty))
        .map(|(i, f)| {
            let member = field_member(f, i);
            quote! {
                if ::checkers::Inject::inject(&mut self.#member, handle) {
                    return true;
                }
            }
        })
        .collect();

    let expanded = quote! {
        impl #impl_generics ::checkers::Inject for #name #ty_generics #where_clause {
            fn inject(&mut self, handle: &::checkers::Handle) -> bool {
                #(#attempts)*
                let _ = handle;
                false
            }
        }
    };

    TokenStream::from(expanded)
}

fn has_inject_attr(field: &Field) -> bool {
    field.attrs.iter().any(|a| a.path().is_ident("inject"))
}

/// `Test`, `Option<Test>`, `Box<Test>`, `Option<Box<Test>>`, and paths ending in those.
fn is_test_slot(ty: &Type) -> bool {
    let Type::Path(type_path) = ty else {
        return false;
    };
    let Some(last) = type_path.path.segments.last() else {
        return false;
    };
    if last.ident == "Test" && matches!(last.arguments, PathArguments::None) {
        return true;
    }
    if last.ident != "Option" && last.ident != "Box" {
        return false;
    }
    let PathArguments::AngleBracketed(args) = &last.arguments else {
        return false;
    };
    match args.args.first() {
        Some(GenericArgument::Type(inner)) => is_test_slot(inner),
        _ => false,
    }
}

// ============================================================================
// IntoValue
// ============================================================================

/// Generates `From<Struct> for checkers::Value`, producing a `Value::Struct` whose fields appear in declaration
/// order. Every field type must itself convert into `Value`.
///
/// # Example
/// ```ignore
/// #[derive(Clone, IntoValue)]
/// struct Point {
///     x: i64,
///     y: i64,
/// }
///
/// // Generates:
/// impl From<Point> for ::checkers::Value {
///     fn from(v: Point) -> Self {
///         ::checkers::StructValue::new("Point").with_field("x", v.x).with_field("y", v.y).into()
///     }
/// }
/// ```
#[proc_macro_derive(IntoValue)]
pub fn derive_into_value(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let name_str = name.to_string();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match struct_fields(&input, "IntoValue") {
        Ok(fields) => fields,
        Err(err) => return err.to_compile_error().into(),
    };

    let mut predicates: Vec<TokenStream2> = where_clause
        .map(|w| w.predicates.iter().map(|p| quote!(#p)).collect())
        .unwrap_or_default();
    let mut pushes = Vec::new();
    for (i, field) in fields.iter().enumerate() {
        let member = field_member(field, i);
        let label = match &field.ident {
            Some(ident) => ident.to_string(),
            None => i.to_string(),
        };
        let ty = &field.ty;
        predicates.push(quote!(#ty: ::core::convert::Into<::checkers::Value>));
        pushes.push(quote!(.with_field(#label, value.#member)));
    }

    let expanded = quote! {
        impl #impl_generics ::core::convert::From<#name #ty_generics> for ::checkers::Value
        where
            #(#predicates),*
        {
            fn from(value: #name #ty_generics) -> Self {
                let _ = &value;
                ::checkers::Value::Struct(::checkers::StructValue::new(#name_str) #(#pushes)*)
            }
        }
    };

    TokenStream::from(expanded)
}

// ============================================================================
// #[suite]
// ============================================================================

/// Describes every method of an `impl` block to the suite engine by implementing `checkers::Suite`.
///
/// Methods with a `self` receiver are listed with their parameter count (receiver excluded) and return count
/// (`()` counts as none, a tuple counts its elements, `async` counts as one). Only zero-parameter, zero-return
/// methods get a callable; the engine reports the rest when it reaches them. Associated functions without a
/// receiver are not methods and are left out.
///
/// Test methods are named `TestXxx` or `test_xxx`; the setup is `SetUpTest` or `set_up_test`. Camel-case names
/// need `#[allow(non_snake_case)]` on the impl block, below `#[suite]`.
///
/// ## Limitations
///
/// - The attribute emits the whole `Suite` impl, so a type takes exactly one `#[suite]` block. Splitting tests
///   across two annotated blocks is a duplicate-impl error; put helpers in a plain `impl` instead.
/// - Only methods declared in the annotated block are seen. A setup or test defined on an `#[inject]`-ed field
///   is not inherited; forward to it from a method in this block (`fn set_up_test(&mut self) { self.base.set_up() }`).
///
/// # Example
/// ```ignore
/// #[suite]
/// impl MySuite {
///     fn set_up_test(&mut self) {
///         self.counter = 0;
///     }
///
///     fn test_counter_starts_at_zero(&mut self) {
///         self.test.check(self.counter, &Equals, &[0usize.into()]);
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn suite(attr: TokenStream, item: TokenStream) -> TokenStream {
    if !attr.is_empty() {
        let err = syn::Error::new(TokenStream2::from(attr).span(), "#[suite] takes no arguments");
        return err.to_compile_error().into();
    }
    let item_impl = parse_macro_input!(item as ItemImpl);
    match expand_suite(&item_impl) {
        Ok(expanded) => expanded.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand_suite(item_impl: &ItemImpl) -> syn::Result<TokenStream2> {
    if let Some((_, path, _)) = &item_impl.trait_ {
        return Err(syn::Error::new(
            path.span(),
            "#[suite] goes on an inherent impl block, not a trait impl",
        ));
    }

    let self_ty = &item_impl.self_ty;
    let (impl_generics, _, where_clause) = item_impl.generics.split_for_impl();

    let mut methods = Vec::new();
    for item in &item_impl.items {
        let ImplItem::Fn(method) = item else {
            continue;
        };
        let sig = &method.sig;
        let Some(FnArg::Receiver(receiver)) = sig.inputs.first() else {
            continue;
        };
        let ident = &sig.ident;
        let name = ident.to_string();
        let is_candidate = SET_UPS.contains(&name.as_str()) || TEST_PREFIXES.iter().any(|p| name.starts_with(p));

        if is_candidate && receiver.reference.is_none() {
            return Err(syn::Error::new(
                receiver.span(),
                format!("suite method `{name}` must take `&self` or `&mut self`"),
            ));
        }
        if is_candidate && !sig.generics.params.is_empty() {
            return Err(syn::Error::new(
                sig.generics.span(),
                format!("suite method `{name}` cannot be generic"),
            ));
        }

        let params = sig.inputs.len() - 1;
        let returns = if sig.asyncness.is_some() {
            1
        } else {
            match &sig.output {
                ReturnType::Default => 0,
                ReturnType::Type(_, ty) => match ty.as_ref() {
                    Type::Tuple(tuple) => tuple.elems.len(),
                    _ => 1,
                },
            }
        };

        let callable = params == 0 && returns == 0 && receiver.reference.is_some() && sig.generics.params.is_empty();
        if !callable && params == 0 && returns == 0 {
            // Generic or by-value helpers the engine could never call; only candidates are rejected above.
            continue;
        }
        let descriptor = if callable {
            quote!(::checkers::Method::<Self>::callable(#name, |suite: &mut Self| suite.#ident()))
        } else {
            quote!(::checkers::Method::malformed(#name, #params, #returns))
        };
        methods.push(descriptor);
    }

    Ok(quote! {
        #item_impl

        impl #impl_generics ::checkers::Suite for #self_ty #where_clause {
            fn methods() -> ::std::vec::Vec<::checkers::Method<Self>> {
                ::std::vec![#(#methods),*]
            }
        }
    })
}

// ============================================================================
// Helpers
// ============================================================================

fn struct_fields<'a>(input: &'a DeriveInput, derive: &str) -> syn::Result<Vec<&'a Field>> {
    match &input.data {
        Data::Struct(data) => Ok(match &data.fields {
            Fields::Named(fields) => fields.named.iter().collect(),
            Fields::Unnamed(fields) => fields.unnamed.iter().collect(),
            Fields::Unit => Vec::new(),
        }),
        _ => Err(syn::Error::new(
            input.ident.span(),
            format!("{derive} can only be derived for structs"),
        )),
    }
}

fn field_member(field: &Field, index: usize) -> TokenStream2 {
    match &field.ident {
        Some(ident) => quote!(#ident),
        None => {
            let index = syn::Index::from(index);
            quote!(#index)
        }
    }
}
