//! Derive macros for sqlkit
//!
//! Provides `#[derive(Entity)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod common;
mod entity;

/// Derive the `Entity` capability for a struct.
///
/// # Example
///
/// ```ignore
/// use sqlkit::{ChangeTracker, Entity};
///
/// #[derive(Entity)]
/// struct Audit {
///     #[orm(read_only)]
///     created_at: chrono::NaiveDateTime,
/// }
///
/// #[derive(Entity)]
/// #[orm(table = "user_account")]
/// struct User {
///     #[orm(id)]
///     user_id: i64,
///     #[orm(column = "mail")]
///     email: String,
///     #[orm(flatten)]
///     audit: Audit,
///     #[orm(changes)]
///     changes: ChangeTracker,
/// }
/// ```
///
/// # Generated
///
/// - a static `EntityDescriptor` (fields, tags, table, parent)
/// - `value_of` reading each property as a `sqlkit::Value`
/// - `changed_properties` when a `#[orm(changes)]` field exists
///
/// Property names are the field names in lowerCamel form (`user_id` is the
/// property `userId`). `value_of`, `ChangeTracker::mark` and conditions use
/// that form.
///
/// # Attributes
///
/// - `#[orm(table = "name")]` - Use a fixed table name under every naming policy
/// - `#[orm(id)]` - Mark field as an identity property
/// - `#[orm(column = "name")]` - Map field to a fixed column name
/// - `#[orm(read_only)]` - Exclude from INSERT and UPDATE
/// - `#[orm(non_updatable)]` - Exclude from UPDATE
/// - `#[orm(transient)]` - Not a persisted property
/// - `#[orm(skip)]` - No accessor; the field is not a property
/// - `#[orm(flatten)]` - Parent entity whose properties come first
/// - `#[orm(changes)]` - `ChangeTracker` supplying the changed properties
#[proc_macro_derive(Entity, attributes(orm))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    entity::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
