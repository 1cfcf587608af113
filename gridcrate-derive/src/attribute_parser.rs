use syn::parse::Parser;
use syn::{Lit, LitStr, Meta, punctuated::Punctuated, token::Comma};

/// Options read from `#[grid(...)]` on a struct field or enum variant.
#[derive(Debug, Default)]
pub(crate) struct GridAttrs {
    /// External name used by requests
    pub rename: Option<String>,
    /// Database column used for push-down
    pub column: Option<String>,
    pub skip: bool,
}

/// Parses every `#[grid(...)]` attribute in `attrs`.
///
/// Supported keys: `rename = "..."`, `column = "..."` and the flag `skip`.
/// `allow_column` is false for enum variants, which have no column.
pub(crate) fn parse_grid_attrs(
    attrs: &[syn::Attribute],
    allow_column: bool,
) -> Result<GridAttrs, syn::Error> {
    let mut parsed = GridAttrs::default();

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("grid")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                let value: LitStr = meta.value()?.parse()?;
                if value.value().trim().is_empty() {
                    return Err(syn::Error::new_spanned(value, "grid(rename) must not be empty"));
                }
                parsed.rename = Some(value.value());
            } else if meta.path.is_ident("column") && allow_column {
                let value: LitStr = meta.value()?.parse()?;
                parsed.column = Some(value.value());
            } else if meta.path.is_ident("skip") && allow_column {
                parsed.skip = true;
            } else {
                return Err(meta.error("unsupported grid attribute"));
            }
            Ok(())
        })?;
    }

    Ok(parsed)
}

/// `column_name` from a field's `#[sea_orm(...)]` attribute, so entity models
/// push filters down to the renamed column without repeating it.
pub(crate) fn extract_sea_orm_column_name(attrs: &[syn::Attribute]) -> Option<String> {
    for attr in attrs {
        if attr.path().is_ident("sea_orm")
            && let Meta::List(meta_list) = &attr.meta
            && let Ok(metas) =
                Punctuated::<Meta, Comma>::parse_terminated.parse2(meta_list.tokens.clone())
        {
            for meta in metas {
                if let Meta::NameValue(nv) = meta
                    && nv.path.is_ident("column_name")
                    && let syn::Expr::Lit(expr_lit) = &nv.value
                    && let Lit::Str(s) = &expr_lit.lit
                {
                    return Some(s.value());
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_parse_rename_column_skip() {
        let field: syn::Field = parse_quote! {
            #[grid(rename = "IntVal", column = "int_value")]
            pub int_val: i32
        };
        let attrs = parse_grid_attrs(&field.attrs, true).unwrap();
        assert_eq!(attrs.rename.as_deref(), Some("IntVal"));
        assert_eq!(attrs.column.as_deref(), Some("int_value"));
        assert!(!attrs.skip);

        let skipped: syn::Field = parse_quote! {
            #[grid(skip)]
            pub notes: String
        };
        assert!(parse_grid_attrs(&skipped.attrs, true).unwrap().skip);
    }

    #[test]
    fn test_unknown_key_is_an_error() {
        let field: syn::Field = parse_quote! {
            #[grid(sortable)]
            pub name: String
        };
        assert!(parse_grid_attrs(&field.attrs, true).is_err());
    }

    #[test]
    fn test_variants_reject_column() {
        let variant: syn::Variant = parse_quote! {
            #[grid(column = "x")]
            Open
        };
        assert!(parse_grid_attrs(&variant.attrs, false).is_err());
    }

    #[test]
    fn test_sea_orm_column_name() {
        let field: syn::Field = parse_quote! {
            #[sea_orm(primary_key, column_name = "row_id")]
            pub id: i32
        };
        assert_eq!(
            extract_sea_orm_column_name(&field.attrs).as_deref(),
            Some("row_id")
        );
    }
}
