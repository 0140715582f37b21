//! relsearch
//!
//! The caller-facing crate: re-exports `relsearch-core`'s engine and
//! `relsearch-derive`'s `#[derive(SearchDto)]` behind one dependency, the
//! way a caller actually reaches for this (§6).

pub use relsearch_core::*;
pub use relsearch_derive::SearchDto;

/// Everything a caller standing up a search endpoint needs in scope.
pub mod prelude {
    pub use relsearch_core::prelude::*;
    pub use relsearch_derive::SearchDto;
}
