//! C11 — Searchable Service Facade (§4.10).
//!
//! Thin orchestration layer over C9: every operation takes an already-built
//! `SearchCondition<D>` and a borrowed `&dyn Session`. The facade owns
//! nothing across calls, matching the "connection owned by the caller"
//! rule in §5.

use crate::condition::SearchCondition;
use crate::config::SearchConfig;
use crate::dto::DtoSchema;
use crate::error::SearchError;
use crate::exec;
use crate::orm::{CancellationToken, NeverCancelled, Row, Session};
use crate::plan::{ModifyPlan, QueryPlan};
use crate::predicate;
use crate::value::Value;
use std::collections::BTreeMap;

/// A result page: the hydrated rows for the requested page, plus the total
/// match count across all pages unless the caller opted out of Phase 3.
#[derive(Clone, Debug, Default)]
pub struct Page {
    pub rows: Vec<Row>,
    pub total: Option<u64>,
}

pub struct SearchService<'s> {
    session: &'s dyn Session,
    config: SearchConfig,
}

impl<'s> SearchService<'s> {
    #[must_use]
    pub const fn new(session: &'s dyn Session, config: SearchConfig) -> Self {
        Self { session, config }
    }

    /// `findAll` — page of entities via C9, without a total count.
    pub fn find_all<D: DtoSchema>(&self, condition: &SearchCondition<D>) -> Result<Vec<Row>, SearchError> {
        self.find_all_cancellable(condition, &NeverCancelled)
    }

    pub fn find_all_cancellable<D: DtoSchema>(
        &self,
        condition: &SearchCondition<D>,
        cancellation: &dyn CancellationToken,
    ) -> Result<Vec<Row>, SearchError> {
        exec::execute(self.session, condition, &self.config, cancellation, false).map(|p| p.rows)
    }

    /// `findAll` with Phase 3 included — content plus total count.
    pub fn find_all_with_count<D: DtoSchema>(&self, condition: &SearchCondition<D>) -> Result<Page, SearchError> {
        let outcome = exec::execute(self.session, condition, &self.config, &NeverCancelled, true)?;
        Ok(Page {
            rows: outcome.rows,
            total: outcome.total,
        })
    }

    /// `findOne` — optional single entity; errors if more than one match.
    pub fn find_one<D: DtoSchema>(&self, condition: &SearchCondition<D>) -> Result<Option<Row>, SearchError> {
        let mut rows = self.find_all(condition)?;
        match rows.len() {
            0 => Ok(None),
            1 => Ok(Some(rows.remove(0))),
            n => Err(SearchError::Execution(format!("expected at most one match, found {n}"))),
        }
    }

    /// `findFirst` — optional single entity, first by the condition's
    /// normalized sort order; never errors on multiple matches.
    pub fn find_first<D: DtoSchema>(&self, condition: &SearchCondition<D>) -> Result<Option<Row>, SearchError> {
        Ok(self.find_all(condition)?.into_iter().next())
    }

    /// `count` — Strategy A + predicate, `DISTINCT pk` (Phase 3 standalone).
    pub fn count<D: DtoSchema>(&self, condition: &SearchCondition<D>) -> Result<u64, SearchError> {
        exec::count(self.session, condition, &self.config)
    }

    /// `exists` — `LIMIT 1` fast-path rather than `count > 0` (§4.10).
    pub fn exists<D: DtoSchema>(&self, condition: &SearchCondition<D>) -> Result<bool, SearchError> {
        exec::exists(self.session, condition, &self.config)
    }

    /// `deleteByCondition` — bulk delete matching the predicate; joins
    /// evaluate the predicate only, the delete targets the root entity.
    pub fn delete_by_condition<D: DtoSchema>(&self, condition: &SearchCondition<D>) -> Result<u64, SearchError> {
        self.modify::<D>(condition, BTreeMap::new())
    }

    /// `updateByCondition(patch)` — bulk update matching the predicate;
    /// `patch` maps attribute name to new value, unspecified attributes
    /// untouched.
    pub fn update_by_condition<D: DtoSchema>(
        &self,
        condition: &SearchCondition<D>,
        patch: BTreeMap<String, Value>,
    ) -> Result<u64, SearchError> {
        self.modify::<D>(condition, patch)
    }

    fn modify<D: DtoSchema>(
        &self,
        condition: &SearchCondition<D>,
        patch: BTreeMap<String, Value>,
    ) -> Result<u64, SearchError> {
        let join_paths = condition.condition_paths().into_iter().collect();
        let plan = ModifyPlan {
            root: D::ENTITY,
            predicate: predicate::compile(&condition.nodes),
            join_paths,
            patch,
        };
        self.session.create_query(&QueryPlan::Modify(plan)).execute_update()
    }
}
