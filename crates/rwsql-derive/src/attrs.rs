//! Attribute parsing shared by both derives.

use syn::{Data, DeriveInput, Field, Fields, LitStr, Result, punctuated::Punctuated, token::Comma};

/// Named fields of a struct, or an error naming the derive.
pub fn named_fields<'a>(input: &'a DeriveInput, derive: &str) -> Result<&'a Punctuated<Field, Comma>> {
    match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => Ok(&fields.named),
            _ => Err(syn::Error::new_spanned(
                input,
                format!("{derive} can only be derived for structs with named fields"),
            )),
        },
        _ => Err(syn::Error::new_spanned(
            input,
            format!("{derive} can only be derived for structs"),
        )),
    }
}

/// `#[rwsql(table = "...")]`, if present.
pub fn table_name(input: &DeriveInput) -> Result<Option<String>> {
    let mut table = None;
    for attr in &input.attrs {
        if !attr.path().is_ident("rwsql") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("table") {
                let lit: LitStr = meta.value()?.parse()?;
                if lit.value().trim().is_empty() {
                    return Err(meta.error("table name cannot be empty"));
                }
                table = Some(lit.value());
                Ok(())
            } else {
                Err(meta.error("unsupported rwsql attribute, expected `table = \"...\"`"))
            }
        })?;
    }
    Ok(table)
}

/// The string argument of `#[<name>("...")]` on a field.
pub fn field_str(field: &Field, name: &str) -> Result<Option<LitStr>> {
    let mut found = None;
    for attr in &field.attrs {
        if !attr.path().is_ident(name) {
            continue;
        }
        if found.is_some() {
            return Err(syn::Error::new_spanned(attr, format!("duplicate #[{name}] attribute")));
        }
        found = Some(attr.parse_args::<LitStr>()?);
    }
    Ok(found)
}

const OPS: [&str; 6] = ["=", "IN", "NOTIN", ">=", "%{}%", "{}%"];

/// Check a filter tag against the `col:<column>[;op:<op>]` grammar.
pub fn validate_tag(tag: &str) -> std::result::Result<(), String> {
    let mut col = None;
    let mut op = None;
    for part in tag.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        let mut kv = part.split(':');
        let (Some(key), Some(value), None) = (kv.next(), kv.next(), kv.next()) else {
            return Err(format!("`{part}` must be a single `key:value` pair"));
        };
        let (key, value) = (key.trim(), value.trim());
        let slot = match key {
            "col" => &mut col,
            "op" => &mut op,
            _ => return Err(format!("unknown key `{key}`")),
        };
        if slot.replace(value).is_some() {
            return Err(format!("duplicate key `{key}`"));
        }
    }
    match col {
        Some(c) if !c.is_empty() => {}
        _ => return Err("missing `col`".to_string()),
    }
    if let Some(op) = op {
        if !OPS.iter().any(|known| known.eq_ignore_ascii_case(op)) {
            return Err(format!("unknown operator `{op}`"));
        }
    }
    Ok(())
}
