use proc_macro2::TokenStream;
use quote::quote;
use syn::{Field, Ident, LitStr};

use crate::helper::{op_path, to_camel_case};

/// One field's `#[search(...)]` attribute, parsed and defaulted.
#[derive(Default)]
pub struct FieldAttrs {
    pub skip: bool,
    rename: Option<String>,
    entity_field: Option<String>,
    ops: Vec<String>,
    sortable: bool,
    sort_field: Option<String>,
}

impl FieldAttrs {
    pub fn parse(field: &Field) -> syn::Result<Self> {
        let mut out = Self::default();
        for attr in &field.attrs {
            if !attr.path().is_ident("search") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("skip") {
                    out.skip = true;
                } else if meta.path.is_ident("sortable") {
                    out.sortable = true;
                } else if meta.path.is_ident("rename") {
                    out.rename = Some(meta.value()?.parse::<LitStr>()?.value());
                } else if meta.path.is_ident("entity_field") {
                    out.entity_field = Some(meta.value()?.parse::<LitStr>()?.value());
                } else if meta.path.is_ident("sort_field") {
                    out.sort_field = Some(meta.value()?.parse::<LitStr>()?.value());
                } else if meta.path.is_ident("ops") {
                    let raw = meta.value()?.parse::<LitStr>()?.value();
                    out.ops = raw
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect();
                } else {
                    return Err(meta.error("unrecognized `search` field attribute"));
                }
                Ok(())
            })?;
        }
        Ok(out)
    }

    /// Emit this field's `FieldSpec` literal. `ident` names the struct
    /// field the attribute came from, used only for default names and
    /// diagnostic spans.
    pub fn field_spec(&self, ident: &Ident) -> syn::Result<TokenStream> {
        let dto_field = self
            .rename
            .clone()
            .unwrap_or_else(|| to_camel_case(&ident.to_string()));
        let entity_field = self.entity_field.clone().unwrap_or_else(|| dto_field.clone());
        let sort_field = self.sort_field.clone().unwrap_or_else(|| entity_field.clone());
        let sortable = self.sortable;

        let ops = self
            .ops
            .iter()
            .map(|name| op_path(name, ident.span()))
            .collect::<syn::Result<Vec<_>>>()?;
        let allowed_operators = if ops.is_empty() {
            quote!(&[])
        } else {
            quote!(&[#(#ops),*])
        };

        Ok(quote! {
            ::relsearch_core::dto::FieldSpec {
                dto_field: #dto_field,
                entity_field: #entity_field,
                allowed_operators: #allowed_operators,
                sortable: #sortable,
                sort_field: #sort_field,
            }
        })
    }
}
