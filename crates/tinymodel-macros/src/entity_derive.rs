//! Implementation of the Entity derive macro.
//!
//! Reads the struct-level `#[tinymodel(...)]` attribute and generates an
//! `Entity` impl whose `config()` mirrors it.

use proc_macro2::TokenStream;
use quote::{ToTokens, quote};
use syn::meta::ParseNestedMeta;
use syn::{Data, DeriveInput, Error, Expr, ExprArray, ExprLit, Ident, Lit, LitBool, LitStr, Path, Result};

/// Parsed entity definition from a struct with `#[derive(Entity)]`.
#[derive(Debug)]
pub struct EntityDef {
    pub name: Ident,
    pub generics: syn::Generics,
    pub table: String,
    pub primary_key: Option<String>,
    pub connection: Option<String>,
    pub incrementing: Option<bool>,
    pub timestamps: Option<bool>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub date_format: Option<String>,
    pub dates: Option<Vec<String>>,
    pub fillable: Option<Vec<String>>,
    pub guarded: Option<Vec<String>>,
    pub touches: Option<Vec<String>>,
    /// Function returning the default attributes of new instances.
    pub default_attributes: Option<Path>,
}

/// Parse a `DeriveInput` into an `EntityDef`.
pub fn parse_entity(input: &DeriveInput) -> Result<EntityDef> {
    match &input.data {
        Data::Struct(_) => {}
        Data::Enum(_) => {
            return Err(Error::new_spanned(
                input,
                "Entity can only be derived for structs, not enums",
            ));
        }
        Data::Union(_) => {
            return Err(Error::new_spanned(
                input,
                "Entity can only be derived for structs, not unions",
            ));
        }
    }

    let name = input.ident.clone();
    let mut def = EntityDef {
        table: format!("{}s", snake_case(&name.to_string())),
        name,
        generics: input.generics.clone(),
        primary_key: None,
        connection: None,
        incrementing: None,
        timestamps: None,
        created_at: None,
        updated_at: None,
        date_format: None,
        dates: None,
        fillable: None,
        guarded: None,
        touches: None,
        default_attributes: None,
    };

    for attr in &input.attrs {
        if !attr.path().is_ident("tinymodel") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            let path = &meta.path;

            if path.is_ident("table") {
                def.table = parse_str(&meta)?;
            } else if path.is_ident("primary_key") {
                def.primary_key = Some(parse_str(&meta)?);
            } else if path.is_ident("connection") {
                def.connection = Some(parse_str(&meta)?);
            } else if path.is_ident("incrementing") {
                def.incrementing = Some(parse_bool(&meta)?);
            } else if path.is_ident("timestamps") {
                def.timestamps = Some(parse_bool(&meta)?);
            } else if path.is_ident("created_at") {
                def.created_at = Some(parse_str(&meta)?);
            } else if path.is_ident("updated_at") {
                def.updated_at = Some(parse_str(&meta)?);
            } else if path.is_ident("date_format") {
                def.date_format = Some(parse_str(&meta)?);
            } else if path.is_ident("dates") {
                def.dates = Some(parse_str_list(&meta)?);
            } else if path.is_ident("fillable") {
                def.fillable = Some(parse_str_list(&meta)?);
            } else if path.is_ident("guarded") {
                def.guarded = Some(parse_str_list(&meta)?);
            } else if path.is_ident("touches") {
                def.touches = Some(parse_str_list(&meta)?);
            } else if path.is_ident("default_attributes") {
                let value: LitStr = meta.value()?.parse()?;
                def.default_attributes = Some(value.parse()?);
            } else {
                let attr_name = path.to_token_stream().to_string();
                return Err(Error::new_spanned(
                    path,
                    format!(
                        "unknown tinymodel attribute `{attr_name}`. \
                         Valid attributes are: table, primary_key, connection, incrementing, \
                         timestamps, created_at, updated_at, date_format, dates, fillable, \
                         guarded, touches, default_attributes"
                    ),
                ));
            }

            Ok(())
        })?;
    }

    if def.table.is_empty() {
        return Err(Error::new_spanned(&def.name, "table name must not be empty"));
    }

    Ok(def)
}

fn parse_str(meta: &ParseNestedMeta<'_>) -> Result<String> {
    let value: LitStr = meta.value()?.parse()?;
    Ok(value.value())
}

fn parse_bool(meta: &ParseNestedMeta<'_>) -> Result<bool> {
    let value: LitBool = meta.value()?.parse()?;
    Ok(value.value)
}

/// Parse `key = ["a", "b"]`.
fn parse_str_list(meta: &ParseNestedMeta<'_>) -> Result<Vec<String>> {
    let array: ExprArray = meta.value()?.parse()?;
    array
        .elems
        .iter()
        .map(|elem| match elem {
            Expr::Lit(ExprLit {
                lit: Lit::Str(lit), ..
            }) => Ok(lit.value()),
            other => Err(Error::new_spanned(other, "expected string literal")),
        })
        .collect()
}

fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.char_indices() {
        if ch.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Generate the Entity trait implementation.
pub fn generate_entity_impl(def: &EntityDef) -> TokenStream {
    let name = &def.name;
    let model_name = name.to_string();
    let table = &def.table;
    let (impl_generics, ty_generics, where_clause) = def.generics.split_for_impl();

    let primary_key = def.primary_key.as_ref().map(|pk| {
        quote! { const PRIMARY_KEY: &'static str = #pk; }
    });

    let mut setters = Vec::new();
    if let Some(connection) = &def.connection {
        setters.push(quote! { .connection(#connection) });
    }
    if let Some(incrementing) = def.incrementing {
        setters.push(quote! { .incrementing(#incrementing) });
    }
    if let Some(timestamps) = def.timestamps {
        setters.push(quote! { .timestamps(#timestamps) });
    }
    if let Some(created_at) = &def.created_at {
        setters.push(quote! { .created_at(#created_at) });
    }
    if let Some(updated_at) = &def.updated_at {
        setters.push(quote! { .updated_at(#updated_at) });
    }
    if let Some(format) = &def.date_format {
        setters.push(quote! { .date_format(#format) });
    }
    for (method, list) in [
        ("dates", &def.dates),
        ("fillable", &def.fillable),
        ("guarded", &def.guarded),
        ("touches", &def.touches),
    ] {
        if let Some(list) = list {
            let method = Ident::new(method, proc_macro2::Span::call_site());
            setters.push(quote! { .#method(&[#(#list),*]) });
        }
    }

    let default_attributes = def.default_attributes.as_ref().map(|path| {
        quote! {
            fn default_attributes() -> ::std::vec::Vec<::tinymodel_core::AttributeItem> {
                #path()
            }
        }
    });

    quote! {
        impl #impl_generics ::tinymodel_core::Entity for #name #ty_generics #where_clause {
            const TABLE_NAME: &'static str = #table;
            #primary_key

            fn config() -> ::tinymodel_core::ModelConfig {
                ::tinymodel_core::ModelConfig::new()
                    #(#setters)*
            }

            #default_attributes

            fn model_name() -> &'static str {
                #model_name
            }
        }
    }
}
