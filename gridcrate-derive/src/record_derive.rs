use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields};

use crate::attribute_parser::{extract_sea_orm_column_name, parse_grid_attrs};

/// One field that takes part in grid filtering
struct GridField<'a> {
    ident: &'a syn::Ident,
    ty: &'a syn::Type,
    name: String,
    column: String,
}

fn collect_fields(input: &DeriveInput) -> Result<Vec<GridField<'_>>, syn::Error> {
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "GridRecord can only be derived for structs",
        ));
    };
    let Fields::Named(named) = &data.fields else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "GridRecord only supports structs with named fields",
        ));
    };

    let mut fields = Vec::with_capacity(named.named.len());
    for field in &named.named {
        let attrs = parse_grid_attrs(&field.attrs, true)?;
        if attrs.skip {
            continue;
        }
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let raw = ident.to_string();
        let rust_name = raw.strip_prefix("r#").unwrap_or(&raw).to_string();
        let column = attrs
            .column
            .or_else(|| extract_sea_orm_column_name(&field.attrs))
            .unwrap_or_else(|| rust_name.clone());
        fields.push(GridField {
            ident,
            ty: &field.ty,
            name: attrs.rename.unwrap_or(rust_name),
            column,
        });
    }
    Ok(fields)
}

pub(crate) fn expand(input: &DeriveInput) -> Result<TokenStream, syn::Error> {
    let fields = collect_fields(input)?;
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let descriptors = fields.iter().enumerate().map(|(index, field)| {
        let GridField {
            ty, name, column, ..
        } = field;
        quote! {
            ::gridcrate::FieldDescriptor::new(
                #index,
                #name,
                #column,
                <#ty as ::gridcrate::GridValue>::KIND,
                <#ty as ::gridcrate::GridValue>::OPTIONAL,
            )
        }
    });

    let arms = fields.iter().enumerate().map(|(index, field)| {
        let ident = field.ident;
        quote! {
            #index => ::gridcrate::GridValue::to_field_value(&self.#ident),
        }
    });

    Ok(quote! {
        impl #impl_generics ::gridcrate::GridRecord for #name #ty_generics #where_clause {
            fn field_descriptors() -> ::std::vec::Vec<::gridcrate::FieldDescriptor> {
                ::std::vec![#(#descriptors),*]
            }

            fn field_value(&self, index: usize) -> ::gridcrate::FieldValue {
                match index {
                    #(#arms)*
                    _ => ::gridcrate::FieldValue::Null,
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_names_and_columns() {
        let input: DeriveInput = parse_quote! {
            struct Row {
                id: i32,
                #[grid(rename = "IntVal")]
                int_val: i32,
                #[sea_orm(column_name = "label_text")]
                label: String,
                #[grid(skip)]
                secret: String,
                r#type: String,
            }
        };
        let fields = collect_fields(&input).unwrap();
        let names: Vec<(&str, &str)> = fields
            .iter()
            .map(|f| (f.name.as_str(), f.column.as_str()))
            .collect();
        assert_eq!(
            names,
            vec![
                ("id", "id"),
                ("IntVal", "int_val"),
                ("label", "label_text"),
                ("type", "type"),
            ]
        );
    }

    #[test]
    fn test_rejects_tuple_structs_and_enums() {
        let tuple: DeriveInput = parse_quote! { struct Pair(i32, i32); };
        assert!(expand(&tuple).is_err());

        let enumeration: DeriveInput = parse_quote! { enum E { A } };
        assert!(expand(&enumeration).is_err());
    }
}
