//! C14 — ORM Adapter Interface.
//!
//! The trait boundary an external collaborator must implement (§6). The
//! core never depends on a concrete driver or async runtime; it borrows
//! `&dyn Session` per call and never stores it (§5).

mod memory;

#[cfg(any(test, feature = "test-support"))]
pub use memory::{MemoryQuery, MemorySession};

use crate::error::SearchError;
use crate::plan::QueryPlan;
use crate::value::Value;
use derive_more::Deref;
use std::collections::BTreeMap;

/// One or more primary-key component values, in declared order — a
/// composite key is a `KeyValue` of length `k > 1` (§3, §4.8).
pub type KeyValue = Vec<Value>;

/// A materialized row of attribute name → value. The core treats entities
/// opaquely (§3: "Opaque record type `E`"); it never constructs the
/// caller's concrete domain type. `Deref`s to the column map so callers can
/// read columns directly without reaching through a named field.
#[derive(Clone, Debug, Default, Deref, PartialEq)]
pub struct Row {
    pub columns: BTreeMap<String, Value>,
}

impl Row {
    #[must_use]
    pub fn pk(&self, model: &'static crate::metamodel::EntityModel) -> KeyValue {
        model
            .primary_key
            .iter()
            .map(|name| self.columns.get(*name).cloned().unwrap_or(Value::Null))
            .collect()
    }
}

/// Checked between phases; the core never spins, sleeps, or polls waiting
/// on it (§5).
pub trait CancellationToken {
    fn is_cancelled(&self) -> bool;
}

pub struct NeverCancelled;

impl CancellationToken for NeverCancelled {
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// `Session` — the connection-scoped entry point (§6). Implementations own
/// nothing across calls; the core never stores a `&dyn Session` past the
/// call that received it.
pub trait Session {
    fn create_query(&self, plan: &QueryPlan) -> Box<dyn Query + '_>;

    /// Hint that a subsequent traversal of `entity.{relation}` for
    /// `owner_pks` should be serviced by one `WHERE owner_pk IN (...)`
    /// query per `batch_size` owners, not one per owner (§4.8 batch-loading).
    fn batch_load(
        &self,
        owner_pks: &[KeyValue],
        relation: &str,
        batch_size: usize,
    ) -> Result<(), SearchError>;
}

/// `Query` — a single prepared statement built from a plan (§6).
pub trait Query {
    fn get_result_list(&self) -> Result<Vec<Row>, SearchError>;
    fn get_single_result(&self) -> Result<Option<Row>, SearchError>;
    fn execute_update(&self) -> Result<u64, SearchError>;
}
