use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Error, Fields, Path, punctuated::Punctuated, token::Comma};

use crate::field::FieldAttrs;

pub fn derive(input: TokenStream) -> TokenStream {
    let input: DeriveInput = match syn::parse2(input) {
        Ok(input) => input,
        Err(err) => return err.to_compile_error(),
    };

    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let entity = match entity_path(&input) {
        Ok(path) => path,
        Err(err) => return err.to_compile_error(),
    };

    let fields = match named_fields(&input) {
        Ok(fields) => fields,
        Err(err) => return err.to_compile_error(),
    };

    let mut specs = Vec::new();
    for field in fields {
        let attrs = match FieldAttrs::parse(field) {
            Ok(attrs) => attrs,
            Err(err) => return err.to_compile_error(),
        };
        if attrs.skip {
            continue;
        }
        let field_ident = field.ident.as_ref().expect("named field");
        match attrs.field_spec(field_ident) {
            Ok(spec) => specs.push(spec),
            Err(err) => return err.to_compile_error(),
        }
    }

    quote! {
        impl #impl_generics ::relsearch_core::dto::DtoSchema for #ident #ty_generics #where_clause {
            const ENTITY: &'static ::relsearch_core::metamodel::EntityModel = #entity;
            const FIELDS: &'static [::relsearch_core::dto::FieldSpec] = &[ #(#specs),* ];
        }
    }
}

/// `#[search(entity = some::path::MODEL)]` on the struct itself — required,
/// there is no sensible default (§4.2: every DTO binds to exactly one
/// entity).
fn entity_path(input: &DeriveInput) -> syn::Result<Path> {
    let mut found = None;
    for attr in &input.attrs {
        if !attr.path().is_ident("search") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("entity") {
                found = Some(meta.value()?.parse::<Path>()?);
                Ok(())
            } else {
                Err(meta.error("unrecognized `search` container attribute"))
            }
        })?;
    }
    found.ok_or_else(|| Error::new_spanned(&input.ident, "missing #[search(entity = ...)]"))
}

fn named_fields(input: &DeriveInput) -> syn::Result<&Punctuated<syn::Field, Comma>> {
    let Data::Struct(data) = &input.data else {
        return Err(Error::new_spanned(&input.ident, "SearchDto can only be derived for structs"));
    };
    let Fields::Named(named) = &data.fields else {
        return Err(Error::new_spanned(&input.ident, "SearchDto requires named fields"));
    };
    Ok(&named.named)
}
