//! relsearch-core
//!
//! A schema-first search-condition compiler and two-phase query executor
//! for relational entity graphs. This crate is the engine: it never talks
//! to a database directly, never picks a logging framework, and never
//! constructs a caller's domain type. Callers implement `orm::Session` over
//! whatever ORM/driver they already use and declare one `metamodel::EntityModel`
//! per persistent entity; everything else — validation, path resolution,
//! join-strategy selection, two-phase execution — lives here.
//!
//! Module map mirrors the components this crate is built from:
//! - [`metamodel`] — C1, static entity/attribute descriptors and path lookups.
//! - [`value`] — C5, string → typed `Value` coercion.
//! - [`condition`] — C3/C4, the condition tree and its typestate builder.
//! - [`dto`] — C2, the compile-time field-annotation contract.
//! - [`predicate`] — C6, condition tree → a dialect-agnostic SQL-shape AST.
//! - [`relate`] — C7, relationship analysis (common ToOne detection, nested
//!   path safety).
//! - [`join`] — C8, join-strategy selection and fetch→regular degradation.
//! - [`plan`] — C10, sort/pagination normalization plus the plan shapes
//!   handed to the ORM adapter.
//! - [`orm`] — C14, the adapter trait boundary (`Session`/`Query`), plus an
//!   in-memory reference implementation behind `cfg(test)`/`test-support`.
//! - [`exec`] — C9, the two-phase executor.
//! - [`service`] — C11, the caller-facing facade (`findAll`, `count`, …).
//! - [`config`] — runtime-tunable limits (page size, batch size, …).
//! - [`error`] — the closed `SearchError` taxonomy.
//! - [`obs`] — the `TraceSink` observability boundary.

pub mod condition;
pub mod config;
pub mod dto;
pub mod error;
pub mod exec;
pub mod join;
pub mod metamodel;
pub mod obs;
pub mod orm;
pub mod plan;
pub mod predicate;
pub mod relate;
pub mod service;
pub mod value;

#[cfg(test)]
mod test_fixtures;

/// Common imports for a caller standing up a search endpoint.
pub mod prelude {
    pub use crate::condition::{
        ConditionBuilder, Direction, LogicalOp, RawGroup, RawNode, SearchCondition, SearchOperator,
        WhereBuilder, cond, group,
    };
    pub use crate::config::SearchConfig;
    pub use crate::dto::{DtoSchema, FieldSpec};
    pub use crate::error::{SearchError, Violation};
    pub use crate::metamodel::EntityModel;
    pub use crate::orm::{CancellationToken, KeyValue, Query, Row, Session};
    pub use crate::service::{Page, SearchService};
    pub use crate::value::Value;
}
