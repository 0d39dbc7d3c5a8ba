mod schema;

use proc_macro::TokenStream;

// ============================================================================
// #[derive(Schema)] derive macro
// ============================================================================

/// Derive macro for the `Schema` trait.
///
/// # Usage
///
/// ```ignore
/// #[derive(Clone, Serialize, Deserialize, Schema)]
/// #[schema(profile = "workspace-1", store = "notes")]
/// struct Note {
///     #[schema(id)]
///     pub key: Option<u64>,
///     pub title: String,
/// }
/// ```
///
/// - `#[schema(profile = "...")]` sets the profile (logical database).
///   If omitted, defaults to `"default"`.
/// - `#[schema(store = "...")]` sets the store name.
///   If omitted, defaults to snake_case struct name + "s".
/// - `#[schema(id)]` marks the identifying field.
///   If omitted, defaults to a field named `id`. The emitted id attribute is
///   the serialized name, so `#[serde(rename)]` and `#[serde(rename_all)]` apply.
/// - `#[schema(keyless)]` on the struct declares no identifying field at all.
#[proc_macro_derive(Schema, attributes(schema))]
pub fn derive_schema(input: TokenStream) -> TokenStream {
    schema::derive_schema(input)
}
