//! Attribute parsing for the Entity derive macro.
//!
//! Handles struct-level and field-level `#[orm(...)]` attributes.

use syn::{DeriveInput, Result};

/// Parsed field-level `#[orm(...)]` flags.
#[derive(Default)]
pub(super) struct FieldAttr {
    pub is_id: bool,
    pub column: Option<String>,
    pub read_only: bool,
    pub non_updatable: bool,
    pub transient: bool,
    pub skip: bool,
    pub flatten: bool,
    pub changes: bool,
}

impl FieldAttr {
    fn merge(&mut self, other: FieldAttr) {
        self.is_id |= other.is_id;
        self.read_only |= other.read_only;
        self.non_updatable |= other.non_updatable;
        self.transient |= other.transient;
        self.skip |= other.skip;
        self.flatten |= other.flatten;
        self.changes |= other.changes;
        if other.column.is_some() {
            self.column = other.column;
        }
    }
}

impl syn::parse::Parse for FieldAttr {
    fn parse(input: syn::parse::ParseStream) -> Result<Self> {
        let mut attr = FieldAttr::default();

        // Comma-separated flags or key = "value" pairs
        while !input.is_empty() {
            let ident: syn::Ident = input.parse()?;
            match ident.to_string().as_str() {
                "id" => attr.is_id = true,
                "read_only" => attr.read_only = true,
                "non_updatable" => attr.non_updatable = true,
                "transient" => attr.transient = true,
                "skip" => attr.skip = true,
                "flatten" => attr.flatten = true,
                "changes" => attr.changes = true,
                "column" => {
                    let _: syn::Token![=] = input.parse()?;
                    let value: syn::LitStr = input.parse()?;
                    attr.column = Some(value.value());
                }
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown orm field attribute `{other}`"),
                    ));
                }
            }

            if input.peek(syn::Token![,]) {
                let _: syn::Token![,] = input.parse()?;
            } else {
                break;
            }
        }

        if !input.is_empty() {
            return Err(input.error("expected `,`"));
        }
        Ok(attr)
    }
}

/// Collect every `#[orm(...)]` attribute on a field.
pub(super) fn field_attr(field: &syn::Field) -> Result<FieldAttr> {
    let mut attr = FieldAttr::default();
    for a in &field.attrs {
        if a.path().is_ident("orm") {
            attr.merge(a.parse_args::<FieldAttr>()?);
        }
    }

    let exclusive = [attr.flatten, attr.changes, attr.skip]
        .iter()
        .filter(|f| **f)
        .count();
    if exclusive > 1 {
        return Err(syn::Error::new_spanned(
            field,
            "`flatten`, `changes` and `skip` cannot be combined",
        ));
    }
    Ok(attr)
}

/// Extract the table name from a struct-level `#[orm(table = "...")]` attribute.
pub(super) fn table_name(input: &DeriveInput) -> Result<Option<String>> {
    for attr in &input.attrs {
        if !attr.path().is_ident("orm") {
            continue;
        }
        let nested = attr.parse_args::<syn::MetaNameValue>()?;
        if !nested.path.is_ident("table") {
            return Err(syn::Error::new_spanned(
                &nested.path,
                "unknown orm struct attribute, expected `table`",
            ));
        }
        if let syn::Expr::Lit(syn::ExprLit {
            lit: syn::Lit::Str(lit),
            ..
        }) = &nested.value
        {
            return Ok(Some(lit.value()));
        }
        return Err(syn::Error::new_spanned(
            &nested.value,
            "expected a string literal: #[orm(table = \"name\")]",
        ));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags_and_column() {
        let attr: FieldAttr = syn::parse_str(r#"id, column = "mail", read_only"#).unwrap();
        assert!(attr.is_id);
        assert!(attr.read_only);
        assert_eq!(attr.column.as_deref(), Some("mail"));
        assert!(!attr.transient);
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(syn::parse_str::<FieldAttr>("primary").is_err());
    }

    #[test]
    fn reads_struct_table() {
        let input: DeriveInput = syn::parse_str(
            r#"#[orm(table = "account")] struct Account { id: i64 }"#,
        )
        .unwrap();
        assert_eq!(table_name(&input).unwrap().as_deref(), Some("account"));
    }
}
