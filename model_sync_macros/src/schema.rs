use proc_macro::TokenStream;
use quote::quote;
use syn::meta::ParseNestedMeta;
use syn::{Attribute, Data, DeriveInput, Fields, LitStr, Token};

#[derive(Default)]
struct StructAttrs {
    profile: Option<String>,
    store: Option<String>,
    keyless: bool,
}

pub fn derive_schema(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let attrs = match extract_struct_attrs(&input) {
        Ok(attrs) => attrs,
        Err(err) => return err.to_compile_error().into(),
    };

    let profile = attrs.profile.unwrap_or_else(|| "default".to_string());
    let store = attrs
        .store
        .unwrap_or_else(|| format!("{}s", to_snake_case(&name.to_string())));

    let id_attribute = if attrs.keyless {
        quote! { ::core::option::Option::None }
    } else {
        match extract_id_field(&input) {
            Ok(field) => quote! { ::core::option::Option::Some(#field) },
            Err(err) => return err.to_compile_error().into(),
        }
    };

    let expanded = quote! {
        impl model_sync::Schema for #name {
            const PROFILE: &'static str = #profile;
            const STORE: &'static str = #store;
            const ID_ATTRIBUTE: ::core::option::Option<&'static str> = #id_attribute;
        }
    };

    TokenStream::from(expanded)
}

fn extract_struct_attrs(input: &DeriveInput) -> syn::Result<StructAttrs> {
    let mut attrs = StructAttrs::default();

    for attr in &input.attrs {
        if !attr.path().is_ident("schema") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("profile") {
                let value: LitStr = meta.value()?.parse()?;
                attrs.profile = Some(value.value());
            } else if meta.path.is_ident("store") {
                let value: LitStr = meta.value()?.parse()?;
                attrs.store = Some(value.value());
            } else if meta.path.is_ident("keyless") {
                attrs.keyless = true;
            } else {
                return Err(meta.error("expected `profile`, `store` or `keyless`"));
            }
            Ok(())
        })?;
    }

    Ok(attrs)
}

/// Serialized name of the identifying field, honoring serde renames.
fn extract_id_field(input: &DeriveInput) -> syn::Result<String> {
    let fields = match &input.data {
        Data::Struct(data_struct) => match &data_struct.fields {
            Fields::Named(fields) => fields,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input.ident,
                    "Schema derive requires a struct with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "Schema derive only supports structs",
            ))
        }
    };

    let mut id_field = None;
    for field in &fields.named {
        for attr in &field.attrs {
            if !attr.path().is_ident("schema") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("id") {
                    id_field = Some(field);
                    Ok(())
                } else {
                    Err(meta.error("expected `id`"))
                }
            })?;
        }
        if id_field.is_some() {
            break;
        }
    }

    // Default: look for a field named "id"
    let field = id_field
        .or_else(|| {
            fields
                .named
                .iter()
                .find(|field| field.ident.as_ref().is_some_and(|ident| ident == "id"))
        })
        .ok_or_else(|| {
            syn::Error::new_spanned(
                &input.ident,
                "Schema derive: no field marked with #[schema(id)], no field named `id`, \
                 and the struct is not #[schema(keyless)]",
            )
        })?;

    if let Some(renamed) = serde_rename(&field.attrs, "rename")? {
        return Ok(renamed);
    }

    let ident = field
        .ident
        .as_ref()
        .map(|ident| ident.to_string())
        .unwrap_or_default();
    let name = ident.strip_prefix("r#").unwrap_or(&ident).to_string();

    match serde_rename(&input.attrs, "rename_all")? {
        Some(rule) => apply_rename_rule(&rule, &name).ok_or_else(|| {
            syn::Error::new_spanned(
                &input.ident,
                format!("Schema derive: unknown serde rename_all rule `{}`", rule),
            )
        }),
        None => Ok(name),
    }
}

/// Serialize-side value of `#[serde(<key> = "...")]` or
/// `#[serde(<key>(serialize = "..."))]`.
fn serde_rename(attrs: &[Attribute], key: &str) -> syn::Result<Option<String>> {
    let mut found = None;

    for attr in attrs {
        if !attr.path().is_ident("serde") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if !meta.path.is_ident(key) {
                return skip_meta(&meta);
            }

            if meta.input.peek(Token![=]) {
                let value: LitStr = meta.value()?.parse()?;
                found = Some(value.value());
                return Ok(());
            }

            meta.parse_nested_meta(|inner| {
                if inner.path.is_ident("serialize") {
                    let value: LitStr = inner.value()?.parse()?;
                    found = Some(value.value());
                    Ok(())
                } else {
                    skip_meta(&inner)
                }
            })
        })?;
    }

    Ok(found)
}

/// Consume an unrelated serde option such as `default`, `skip_serializing_if = "..."`
/// or `bound(...)`.
fn skip_meta(meta: &ParseNestedMeta) -> syn::Result<()> {
    if meta.input.peek(Token![=]) {
        let _: syn::Expr = meta.value()?.parse()?;
    } else if meta.input.peek(syn::token::Paren) {
        let content;
        syn::parenthesized!(content in meta.input);
        let _: proc_macro2::TokenStream = content.parse()?;
    }
    Ok(())
}

/// serde's `rename_all` rules applied to a snake_case field name.
fn apply_rename_rule(rule: &str, field: &str) -> Option<String> {
    let pascal = || {
        let mut result = String::new();
        let mut capitalize = true;
        for ch in field.chars() {
            if ch == '_' {
                capitalize = true;
            } else if capitalize {
                result.extend(ch.to_uppercase());
                capitalize = false;
            } else {
                result.push(ch);
            }
        }
        result
    };

    let renamed = match rule {
        "lowercase" | "snake_case" => field.to_string(),
        "UPPERCASE" | "SCREAMING_SNAKE_CASE" => field.to_ascii_uppercase(),
        "PascalCase" => pascal(),
        "camelCase" => {
            let pascal = pascal();
            let mut chars = pascal.chars();
            match chars.next() {
                Some(first) => first.to_lowercase().chain(chars).collect(),
                None => String::new(),
            }
        }
        "kebab-case" => field.replace('_', "-"),
        "SCREAMING-KEBAB-CASE" => field.to_ascii_uppercase().replace('_', "-"),
        _ => return None,
    };
    Some(renamed)
}

fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, ch) in s.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
        } else {
            result.push(ch);
        }
    }
    result
}
