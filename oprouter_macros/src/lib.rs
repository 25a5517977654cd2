//! `#[derive(ApiModel)]` for oprouter.
//!
//! Named-field structs become object descriptors and fieldless enums become
//! string enumerations. The serde attributes that change the wire shape are
//! honored so the described schema matches what serde produces:
//!
//! - `rename` on the container, fields, and variants
//! - `rename_all` on the container
//! - `default` on fields (the field stops being required but stays non-null)
//! - `skip` on fields
//!
//! Generic models append their type arguments to the component name, so
//! `Page<Pet>` is described as `PagePet`.
//!
//! `flatten`, tuple structs, and enums with data are rejected at compile time.

use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::{
    parse_macro_input, parse_quote, Attribute, Data, DeriveInput, Fields, GenericParam, LitStr,
};

#[proc_macro_derive(ApiModel)]
pub fn derive_api_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

#[derive(Default)]
struct SerdeAttrs {
    rename: Option<String>,
    rename_all: Option<String>,
    default: bool,
    skip: bool,
    flatten: bool,
}

fn serde_attrs(attrs: &[Attribute]) -> syn::Result<SerdeAttrs> {
    let mut out = SerdeAttrs::default();
    for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                if meta.input.peek(syn::Token![=]) {
                    let lit: LitStr = meta.value()?.parse()?;
                    out.rename = Some(lit.value());
                } else {
                    // rename(serialize = "..", deserialize = "..")
                    meta.parse_nested_meta(|inner| {
                        let lit: LitStr = inner.value()?.parse()?;
                        if inner.path.is_ident("serialize") {
                            out.rename = Some(lit.value());
                        }
                        Ok(())
                    })?;
                }
            } else if meta.path.is_ident("rename_all") {
                let lit: LitStr = meta.value()?.parse()?;
                out.rename_all = Some(lit.value());
            } else if meta.path.is_ident("default") {
                if meta.input.peek(syn::Token![=]) {
                    let _: LitStr = meta.value()?.parse()?;
                }
                out.default = true;
            } else if meta.path.is_ident("skip") {
                out.skip = true;
            } else if meta.path.is_ident("flatten") {
                out.flatten = true;
            } else if meta.input.peek(syn::Token![=]) {
                // Attributes that do not change the schema, e.g. `with = ".."`.
                let _: syn::Expr = meta.value()?.parse()?;
            } else if meta.input.peek(syn::token::Paren) {
                let _content;
                syn::parenthesized!(_content in meta.input);
            }
            Ok(())
        })?;
    }
    Ok(out)
}

fn words(ident: &str, is_variant: bool) -> Vec<String> {
    if !is_variant {
        return ident
            .split('_')
            .filter(|w| !w.is_empty())
            .map(str::to_ascii_lowercase)
            .collect();
    }
    let mut out: Vec<String> = Vec::new();
    for c in ident.chars() {
        if c.is_ascii_uppercase() || out.is_empty() {
            out.push(c.to_ascii_lowercase().to_string());
        } else if let Some(last) = out.last_mut() {
            last.push(c);
        }
    }
    out
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

fn apply_rename_all(rule: &str, ident: &str, is_variant: bool, span: Span) -> syn::Result<String> {
    let w = words(ident, is_variant);
    let renamed = match rule {
        "lowercase" if is_variant => ident.to_ascii_lowercase(),
        "lowercase" => ident.to_string(),
        "UPPERCASE" => ident.to_ascii_uppercase(),
        "PascalCase" => w.iter().map(|s| capitalize(s)).collect(),
        "camelCase" => w
            .iter()
            .enumerate()
            .map(|(i, s)| if i == 0 { s.clone() } else { capitalize(s) })
            .collect(),
        "snake_case" => w.join("_"),
        "SCREAMING_SNAKE_CASE" => w.join("_").to_ascii_uppercase(),
        "kebab-case" => w.join("-"),
        "SCREAMING-KEBAB-CASE" => w.join("-").to_ascii_uppercase(),
        other => {
            return Err(syn::Error::new(
                span,
                format!("unsupported rename_all rule `{other}`"),
            ))
        }
    };
    Ok(renamed)
}

fn wire_name(
    ident: &syn::Ident,
    attrs: &SerdeAttrs,
    rename_all: Option<&str>,
    is_variant: bool,
) -> syn::Result<String> {
    let raw = ident.to_string();
    let raw = raw.strip_prefix("r#").unwrap_or(&raw).to_string();
    match (&attrs.rename, rename_all) {
        (Some(rename), _) => Ok(rename.clone()),
        (None, Some(rule)) => apply_rename_all(rule, &raw, is_variant, ident.span()),
        (None, None) => Ok(raw),
    }
}

fn expand(mut input: DeriveInput) -> syn::Result<TokenStream2> {
    let container = serde_attrs(&input.attrs)?;
    let title = container
        .rename
        .clone()
        .unwrap_or_else(|| input.ident.to_string());
    let rename_all = container.rename_all.as_deref();
    // `Page<Pet>` and `Page<User>` need distinct component names.
    let type_params: Vec<syn::Ident> = input
        .generics
        .type_params()
        .map(|p| p.ident.clone())
        .collect();
    let title = if type_params.is_empty() {
        quote!(#title)
    } else {
        quote! {{
            let mut name = ::std::string::String::from(#title);
            #(name.push_str(&<#type_params as ::oprouter::model::ApiModel>::describe().name_fragment());)*
            name
        }}
    };

    let body = match &input.data {
        Data::Struct(data) => {
            let Fields::Named(fields) = &data.fields else {
                return Err(syn::Error::new_spanned(
                    &input.ident,
                    "ApiModel can only be derived for structs with named fields",
                ));
            };
            let mut described = Vec::new();
            for field in &fields.named {
                let attrs = serde_attrs(&field.attrs)?;
                if attrs.skip {
                    continue;
                }
                if attrs.flatten {
                    return Err(syn::Error::new_spanned(
                        field,
                        "ApiModel does not support #[serde(flatten)]",
                    ));
                }
                let Some(ident) = &field.ident else {
                    continue;
                };
                let name = wire_name(ident, &attrs, rename_all, false)?;
                let ty = &field.ty;
                let optional = if attrs.default || container.default {
                    quote!(.defaulted())
                } else {
                    quote!()
                };
                described.push(quote! {
                    ::oprouter::model::FieldDescriptor::new(
                        #name,
                        <#ty as ::oprouter::model::ApiModel>::describe() #optional,
                    )
                });
            }
            quote! {
                ::oprouter::model::TypeDescriptor::object(#title, ::std::vec![#(#described),*])
            }
        }
        Data::Enum(data) => {
            let mut variants = Vec::new();
            for variant in &data.variants {
                if !matches!(variant.fields, Fields::Unit) {
                    return Err(syn::Error::new_spanned(
                        variant,
                        "ApiModel enums must be fieldless",
                    ));
                }
                let attrs = serde_attrs(&variant.attrs)?;
                if attrs.skip {
                    continue;
                }
                variants.push(wire_name(&variant.ident, &attrs, rename_all, true)?);
            }
            if variants.is_empty() {
                return Err(syn::Error::new_spanned(
                    &input.ident,
                    "ApiModel enums need at least one variant",
                ));
            }
            quote! {
                ::oprouter::model::TypeDescriptor::enumeration(#title, ::std::vec![#(#variants),*])
            }
        }
        Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "ApiModel cannot be derived for unions",
            ))
        }
    };

    for param in &mut input.generics.params {
        if let GenericParam::Type(ty) = param {
            ty.bounds.push(parse_quote!(::oprouter::model::ApiModel));
        }
    }
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::oprouter::model::ApiModel for #name #ty_generics #where_clause {
            fn describe() -> ::oprouter::model::TypeDescriptor {
                #body
            }
        }
    })
}
