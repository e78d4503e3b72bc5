// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

extern crate proc_macro;

use proc_macro::TokenStream;
use proc_macro2::{Literal, TokenStream as TokenStream2};
use quote::quote;
use syn::spanned::Spanned;
use syn::{
    parse_macro_input, Attribute, Data, DeriveInput, Expr, ExprLit, ExprUnary, Fields, Lit,
    LitInt, LitStr, Type, UnOp,
};

/// Struct-level `#[save(..)]` options.
#[derive(Default)]
struct RecordAttrs {
    base: Option<Type>,
    name: Option<String>,
}

/// Field-level `#[save(..)]` options.
#[derive(Default)]
struct FieldAttrs {
    fixed: Option<usize>,
    max_len: Option<usize>,
    default: Option<Expr>,
    rename: Option<String>,
    skip: bool,
}

/// `#[derive(SaveRecord)]`: implements `SaveRecord` and `SaveField`.
///
/// Struct attributes:
/// - `#[save(base = PrevVersion)]`: previous version of this type
/// - `#[save(name = "Name")]`: registered name (default: the struct ident)
///
/// Field attributes:
/// - `#[save(fixed = N)]`: `String` stored as exactly N bytes
/// - `#[save(max_len = N)]`: `String` rejected above N bytes
/// - `#[save(default = expr)]`: value used when migrating from a version without this field
/// - `#[save(rename = "name")]`: persisted field name
/// - `#[save(skip)]`: not persisted; restored with `Default::default()`
///
/// Example:
/// ```ignore
/// #[derive(SaveRecord)]
/// #[save(base = SaveV1)]
/// struct Save {
///     count: i32,
///     #[save(fixed = 16)]
///     slot: String,
///     #[save(default = 1.0)]
///     speed: f32,
/// }
/// ```
#[proc_macro_derive(SaveRecord, attributes(save))]
pub fn derive_save_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_record(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// `#[derive(SaveEnum)]`: implements `SaveEnum` and `SaveField` for fieldless enums.
///
/// The underlying integer follows `#[repr(..)]` (default `u32`). Discriminants
/// must be integer literals; implicit ones continue from the previous variant.
/// The enum must also be `Copy`.
#[proc_macro_derive(SaveEnum, attributes(save))]
pub fn derive_save_enum(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_enum(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand_record(input: &DeriveInput) -> syn::Result<TokenStream2> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "generic save records are not supported",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(f) => &f.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Only named fields are supported",
                ))
            }
        },
        _ => return Err(syn::Error::new_spanned(input, "Only structs are supported")),
    };

    let ident = &input.ident;
    let attrs = parse_record_attrs(&input.attrs)?;
    let type_name = attrs.name.unwrap_or_else(|| ident.to_string());

    let mut reflected = Vec::new();
    let mut stores = Vec::new();
    let mut loads = Vec::new();
    let mut field_types = Vec::new();

    for field in fields {
        let Some(field_ident) = field.ident.as_ref() else {
            return Err(syn::Error::new_spanned(field, "Field must have a name"));
        };
        let ty = &field.ty;
        let field_attrs = parse_field_attrs(&field.attrs)?;

        if field_attrs.skip {
            loads.push(quote! { #field_ident: ::core::default::Default::default() });
            continue;
        }
        if field_attrs.fixed.is_some() && field_attrs.max_len.is_some() {
            return Err(syn::Error::new_spanned(
                field,
                "`fixed` and `max_len` cannot be combined",
            ));
        }

        let field_name = field_attrs
            .rename
            .clone()
            .unwrap_or_else(|| field_ident.to_string());

        let reflected_type = match field_attrs.fixed {
            Some(width) => quote! { ::savepipe::ReflectedType::FixedString(#width) },
            None => quote! { <#ty as ::savepipe::SaveField>::reflected_type() },
        };
        let max_len = field_attrs.max_len.map(|max| {
            quote! { field.max_length = ::core::option::Option::Some(#max); }
        });
        let default = field_attrs.default.as_ref().map(|expr| {
            let expr = match expr {
                Expr::Lit(ExprLit {
                    lit: Lit::Str(s), ..
                }) => quote! { ::std::string::String::from(#s) },
                other => quote! { #other },
            };
            quote! {
                let literal: #ty = #expr;
                field.default = ::savepipe::SaveField::default_literal(&literal);
            }
        });

        reflected.push(quote! {
            {
                #[allow(unused_mut)]
                let mut field = ::savepipe::ReflectedField::new(#field_name, #reflected_type);
                #max_len
                #default
                field
            }
        });
        stores.push(quote! { value.store(#field_name, &self.#field_ident)?; });
        loads.push(quote! { #field_ident: value.load(#field_name)? });
        field_types.push(ty.clone());
    }

    let base_name = match &attrs.base {
        Some(base) => quote! {
            ::core::option::Option::Some(<#base as ::savepipe::SaveRecord>::TYPE_NAME)
        },
        None => quote! { ::core::option::Option::None },
    };
    let register_base = attrs.base.as_ref().map(|base| {
        quote! { <#base as ::savepipe::SaveRecord>::register(catalog); }
    });

    Ok(quote! {
        impl ::savepipe::SaveRecord for #ident {
            const TYPE_NAME: &'static str = #type_name;

            fn base_type() -> ::core::option::Option<&'static str> {
                #base_name
            }

            fn reflect() -> ::savepipe::ReflectedStruct {
                ::savepipe::ReflectedStruct {
                    name: ::std::string::ToString::to_string(Self::TYPE_NAME),
                    base: Self::base_type().map(::std::string::ToString::to_string),
                    fields: ::std::vec![#(#reflected),*],
                }
            }

            fn register(catalog: &mut ::savepipe::TypeCatalog) {
                if catalog.contains_struct(Self::TYPE_NAME) {
                    return;
                }
                catalog.add_struct(<Self as ::savepipe::SaveRecord>::reflect());
                #register_base
                #(<#field_types as ::savepipe::SaveField>::register(catalog);)*
            }

            fn to_versioned(
                &self,
                schema: &::std::sync::Arc<::savepipe::SchemaVersion>,
            ) -> ::core::result::Result<::savepipe::VersionedValue, ::savepipe::ValueError> {
                #[allow(unused_mut)]
                let mut value = ::savepipe::VersionedValue::new(schema);
                #(#stores)*
                ::core::result::Result::Ok(value)
            }

            fn from_versioned(
                value: &::savepipe::VersionedValue,
            ) -> ::core::result::Result<Self, ::savepipe::ValueError> {
                ::core::result::Result::Ok(Self {
                    #(#loads),*
                })
            }
        }

        impl ::savepipe::SaveField for #ident {
            fn reflected_type() -> ::savepipe::ReflectedType {
                ::savepipe::ReflectedType::Struct(::std::string::ToString::to_string(
                    <Self as ::savepipe::SaveRecord>::TYPE_NAME,
                ))
            }

            fn register(catalog: &mut ::savepipe::TypeCatalog) {
                <Self as ::savepipe::SaveRecord>::register(catalog);
            }

            fn to_value(
                &self,
                field_type: &::savepipe::FieldType,
            ) -> ::core::result::Result<::savepipe::Value, ::savepipe::ValueError> {
                ::savepipe::record::record_to_value(self, field_type)
            }

            fn from_value(
                value: &::savepipe::Value,
            ) -> ::core::result::Result<Self, ::savepipe::ValueError> {
                ::savepipe::record::record_from_value(value)
            }

            fn default_literal(&self) -> ::core::option::Option<::savepipe::Value> {
                ::core::option::Option::None
            }
        }
    })
}

fn expand_enum(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let Data::Enum(data) = &input.data else {
        return Err(syn::Error::new_spanned(input, "Only enums are supported"));
    };
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "generic save enums are not supported",
        ));
    }

    let ident = &input.ident;
    let attrs = parse_record_attrs(&input.attrs)?;
    if let Some(base) = &attrs.base {
        return Err(syn::Error::new_spanned(base, "enums have no base type"));
    }
    let enum_name = attrs.name.unwrap_or_else(|| ident.to_string());
    let underlying = parse_repr(&input.attrs)?;

    let mut names = Vec::new();
    let mut variants = Vec::new();
    let mut values = Vec::new();
    let mut next: i64 = 0;

    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "SaveEnum variants cannot carry data",
            ));
        }
        let value = match &variant.discriminant {
            Some((_, expr)) => parse_discriminant(expr)?,
            None => next,
        };
        next = value.wrapping_add(1);

        names.push(variant.ident.to_string());
        variants.push(variant.ident.clone());
        values.push(int_tokens(value));
    }

    Ok(quote! {
        impl ::savepipe::SaveEnum for #ident {
            const ENUM_NAME: &'static str = #enum_name;
            const UNDERLYING: ::savepipe::PrimitiveKind = ::savepipe::PrimitiveKind::#underlying;

            fn variants() -> ::std::vec::Vec<(&'static str, i64)> {
                ::std::vec![#((#names, #values)),*]
            }

            fn to_raw(self) -> i64 {
                match self {
                    #(Self::#variants => #values,)*
                }
            }

            fn from_raw(raw: i64) -> ::core::option::Option<Self> {
                match raw {
                    #(#values => ::core::option::Option::Some(Self::#variants),)*
                    _ => ::core::option::Option::None,
                }
            }
        }

        impl ::savepipe::SaveField for #ident {
            fn reflected_type() -> ::savepipe::ReflectedType {
                ::savepipe::ReflectedType::Enum(::std::string::ToString::to_string(
                    <Self as ::savepipe::SaveEnum>::ENUM_NAME,
                ))
            }

            fn register(catalog: &mut ::savepipe::TypeCatalog) {
                ::savepipe::record::register_enum::<Self>(catalog);
            }

            fn to_value(
                &self,
                _field_type: &::savepipe::FieldType,
            ) -> ::core::result::Result<::savepipe::Value, ::savepipe::ValueError> {
                ::core::result::Result::Ok(::savepipe::Value::Enum(
                    <Self as ::savepipe::SaveEnum>::to_raw(*self),
                ))
            }

            fn from_value(
                value: &::savepipe::Value,
            ) -> ::core::result::Result<Self, ::savepipe::ValueError> {
                ::savepipe::record::enum_from_value(value)
            }

            fn default_literal(&self) -> ::core::option::Option<::savepipe::Value> {
                ::core::option::Option::Some(::savepipe::Value::Enum(
                    <Self as ::savepipe::SaveEnum>::to_raw(*self),
                ))
            }
        }
    })
}

fn parse_record_attrs(attrs: &[Attribute]) -> syn::Result<RecordAttrs> {
    let mut out = RecordAttrs::default();
    for attr in attrs.iter().filter(|a| a.path().is_ident("save")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("base") {
                out.base = Some(meta.value()?.parse()?);
                Ok(())
            } else if meta.path.is_ident("name") {
                let name: LitStr = meta.value()?.parse()?;
                out.name = Some(name.value());
                Ok(())
            } else {
                Err(meta.error("expected `base` or `name`"))
            }
        })?;
    }
    Ok(out)
}

fn parse_field_attrs(attrs: &[Attribute]) -> syn::Result<FieldAttrs> {
    let mut out = FieldAttrs::default();
    for attr in attrs.iter().filter(|a| a.path().is_ident("save")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("fixed") {
                let width: LitInt = meta.value()?.parse()?;
                out.fixed = Some(width.base10_parse()?);
            } else if meta.path.is_ident("max_len") {
                let max: LitInt = meta.value()?.parse()?;
                out.max_len = Some(max.base10_parse()?);
            } else if meta.path.is_ident("default") {
                out.default = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("rename") {
                let name: LitStr = meta.value()?.parse()?;
                out.rename = Some(name.value());
            } else if meta.path.is_ident("skip") {
                out.skip = true;
            } else {
                return Err(meta.error(
                    "expected `fixed`, `max_len`, `default`, `rename` or `skip`",
                ));
            }
            Ok(())
        })?;
    }
    Ok(out)
}

/// Underlying kind from `#[repr(..)]`; `u32` when absent.
fn parse_repr(attrs: &[Attribute]) -> syn::Result<syn::Ident> {
    let mut kind = syn::Ident::new("U32", proc_macro2::Span::call_site());
    for attr in attrs.iter().filter(|a| a.path().is_ident("repr")) {
        attr.parse_nested_meta(|meta| {
            let variant = match meta.path.get_ident().map(ToString::to_string).as_deref() {
                Some("u8") => "U8",
                Some("u16") => "U16",
                Some("u32") => "U32",
                Some("u64") => "U64",
                Some("i8") => "I8",
                Some("i16") => "I16",
                Some("i32") => "I32",
                Some("i64") => "I64",
                Some("C") => return Ok(()),
                _ => return Err(meta.error("unsupported repr for SaveEnum")),
            };
            kind = syn::Ident::new(variant, meta.path.span());
            Ok(())
        })?;
    }
    Ok(kind)
}

fn parse_discriminant(expr: &Expr) -> syn::Result<i64> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Int(int), ..
        }) => int.base10_parse(),
        Expr::Unary(ExprUnary {
            op: UnOp::Neg(_),
            expr: inner,
            ..
        }) => match inner.as_ref() {
            Expr::Lit(ExprLit {
                lit: Lit::Int(int), ..
            }) => {
                let magnitude: i128 = int.base10_parse()?;
                i64::try_from(-magnitude)
                    .map_err(|_| syn::Error::new_spanned(expr, "discriminant out of range"))
            }
            _ => Err(syn::Error::new_spanned(
                expr,
                "discriminants must be integer literals",
            )),
        },
        _ => Err(syn::Error::new_spanned(
            expr,
            "discriminants must be integer literals",
        )),
    }
}

/// Integer tokens usable as both expression and pattern.
fn int_tokens(value: i64) -> TokenStream2 {
    let magnitude = Literal::u64_unsuffixed(value.unsigned_abs());
    if value < 0 {
        quote! { -#magnitude }
    } else {
        quote! { #magnitude }
    }
}
