//! Procedural macros for TinyModel Rust.
//!
//! - `#[derive(Entity)]` implements `tinymodel_core::Entity` from a struct-level
//!   `#[tinymodel(...)]` attribute.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod entity_derive;

/// Derive the `Entity` trait.
///
/// # Attributes
///
/// - `table = "torrents"`: table name (default: snake_case struct name plus `s`)
/// - `primary_key = "id"`: primary key column
/// - `connection = "mysql"`: connection name (default: the resolver's default)
/// - `incrementing = false`: the key is not generated by the database
/// - `timestamps = false`: do not maintain `created_at` / `updated_at`
/// - `created_at = "..."`, `updated_at = "..."`: timestamp column names
/// - `date_format = "%Y-%m-%d %H:%M:%S"`: storage format of date attributes
/// - `dates = ["added_on"]`: attributes cast to date/time
/// - `fillable = ["name"]`, `guarded = ["*"]`: mass assignment policy
/// - `touches = ["torrent"]`: relations touched when the model is saved
/// - `default_attributes = "path::to::fn"`: attributes of new instances
///
/// # Example
///
/// ```ignore
/// #[derive(Entity)]
/// #[tinymodel(table = "torrents", fillable = ["name", "size"], dates = ["added_on"])]
/// struct Torrent;
/// ```
#[proc_macro_derive(Entity, attributes(tinymodel))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match entity_derive::parse_entity(&input) {
        Ok(def) => entity_derive::generate_entity_impl(&def).into(),
        Err(err) => err.to_compile_error().into(),
    }
}
