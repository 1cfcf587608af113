use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields};

use crate::attribute_parser::parse_grid_attrs;

pub(crate) fn expand(input: &DeriveInput) -> Result<TokenStream, syn::Error> {
    let Data::Enum(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "GridValue can only be derived for enums",
        ));
    };
    if data.variants.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "GridValue needs at least one variant",
        ));
    }

    let mut idents = Vec::with_capacity(data.variants.len());
    let mut names = Vec::with_capacity(data.variants.len());
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "GridValue only supports unit variants",
            ));
        }
        let attrs = parse_grid_attrs(&variant.attrs, false)?;
        names.push(attrs.rename.unwrap_or_else(|| variant.ident.to_string()));
        idents.push(&variant.ident);
    }

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    Ok(quote! {
        impl #impl_generics ::gridcrate::GridValue for #name #ty_generics #where_clause {
            const KIND: ::gridcrate::FieldKind = ::gridcrate::FieldKind::Enum(&[#(#names),*]);

            fn to_field_value(&self) -> ::gridcrate::FieldValue {
                ::gridcrate::FieldValue::Enum(match self {
                    #(Self::#idents => #names,)*
                })
            }
        }
    })
}
