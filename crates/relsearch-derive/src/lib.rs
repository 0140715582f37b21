//! `#[derive(SearchDto)]` — emits the `DtoSchema` impl a `relsearch_core`
//! caller would otherwise hand-write (§4.2).

mod container;
mod field;
mod helper;

use proc_macro::TokenStream;

/// Binds a struct to an `EntityModel` and a `FieldSpec` table via
/// `#[search(...)]` attributes, container- and field-level:
///
/// ```ignore
/// #[derive(SearchDto)]
/// #[search(entity = crate::models::POST_MODEL)]
/// struct PostDto {
///     #[search(sortable)]
///     id: i64,
///     #[search(ops = "equals, contains", sortable, sort_field = "title")]
///     title: String,
///     #[search(skip)]
///     internal_notes: String,
/// }
/// ```
#[proc_macro_derive(SearchDto, attributes(search))]
pub fn derive_search_dto(input: TokenStream) -> TokenStream {
    container::derive(input.into()).into()
}
