use proc_macro2::{Span, TokenStream};
use quote::quote;

/// `snake_case` -> `camelCase`, the default `dto_field`/`entity_field` name
/// when no `#[search(rename = "...")]`/`#[search(entity_field = "...")]`
/// override is given.
pub fn to_camel_case(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len());
    let mut capitalize_next = false;
    for ch in ident.chars() {
        if ch == '_' {
            capitalize_next = true;
        } else if capitalize_next {
            out.extend(ch.to_uppercase());
            capitalize_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// Map one `#[search(ops = "...")]` entry to its `SearchOperator` path,
/// using the same wire names `SearchOperator::wire_name` renders.
pub fn op_path(name: &str, span: Span) -> syn::Result<TokenStream> {
    let variant = match name {
        "equals" => quote!(Equals),
        "notEquals" => quote!(NotEquals),
        "greaterThan" => quote!(GreaterThan),
        "greaterThanOrEqualTo" => quote!(GreaterThanOrEqualTo),
        "lessThan" => quote!(LessThan),
        "lessThanOrEqualTo" => quote!(LessThanOrEqualTo),
        "contains" => quote!(Contains),
        "notContains" => quote!(NotContains),
        "startsWith" => quote!(StartsWith),
        "notStartsWith" => quote!(NotStartsWith),
        "endsWith" => quote!(EndsWith),
        "notEndsWith" => quote!(NotEndsWith),
        "isNull" => quote!(IsNull),
        "isNotNull" => quote!(IsNotNull),
        "in" => quote!(In),
        "notIn" => quote!(NotIn),
        "between" => quote!(Between),
        "notBetween" => quote!(NotBetween),
        other => {
            return Err(syn::Error::new(
                span,
                format!("unrecognized search operator `{other}` in #[search(ops = \"...\")]"),
            ));
        }
    };
    Ok(quote!(::relsearch_core::condition::SearchOperator::#variant))
}
