//! C9 — Two-Phase Executor.
//!
//! Chooses single-phase vs two-phase (§4.8), runs Phase 1 (IDs + sort
//! keys), Phase 2 (hydration), Phase 3 (count). The core never issues a
//! query itself; it hands `QueryPlan`s to `&dyn Session`.

use crate::condition::SearchCondition;
use crate::config::SearchConfig;
use crate::dto::DtoSchema;
use crate::error::SearchError;
use crate::join::{self, JoinStrategy};
use crate::metamodel;
use crate::obs::{self, TraceEvent};
use crate::orm::{CancellationToken, KeyValue, Row, Session};
use crate::plan::{CountPlan, Pagination, Phase1Plan, Phase2Plan, QueryPlan, SelectPlan};
use crate::predicate;
use crate::relate::detect_common_to_one_fields;
use std::collections::BTreeSet;

/// A page of results plus the total count, unless the caller opted out.
#[derive(Clone, Debug, Default)]
pub struct Page {
    pub rows: Vec<Row>,
    pub total: Option<u64>,
}

/// `useTwoPhase = |toMany| ≥ 2 OR (|toMany| = 1 AND any condition
/// references a ToMany path)` (§4.8). The second disjunct is implied by
/// construction (`toMany` is already derived from condition paths), so
/// this reduces to "any ToMany path appears in the predicate", plus the
/// `twoPhase.alwaysOn` override (§6).
#[must_use]
pub fn decide_two_phase<D: DtoSchema>(condition: &SearchCondition<D>, config: &SearchConfig) -> bool {
    if config.two_phase_always_on {
        return true;
    }
    let to_many = condition
        .condition_paths()
        .into_iter()
        .filter(|p| metamodel::is_to_many_path(D::ENTITY, p))
        .count();
    to_many >= 1
}

pub fn execute<D: DtoSchema>(
    session: &dyn Session,
    condition: &SearchCondition<D>,
    config: &SearchConfig,
    cancellation: &dyn CancellationToken,
    want_count: bool,
) -> Result<Page, SearchError> {
    if cancellation.is_cancelled() {
        return Err(SearchError::Cancelled);
    }

    if decide_two_phase(condition, config) {
        obs::record(TraceEvent::TwoPhaseChosen {
            to_many_paths: condition
                .condition_paths()
                .iter()
                .filter(|p| metamodel::is_to_many_path(D::ENTITY, p))
                .count(),
        });
        execute_two_phase(session, condition, config, cancellation, want_count)
    } else {
        execute_single_phase(session, condition, config, want_count)
    }
}

fn execute_single_phase<D: DtoSchema>(
    session: &dyn Session,
    condition: &SearchCondition<D>,
    config: &SearchConfig,
    want_count: bool,
) -> Result<Page, SearchError> {
    let condition_paths = condition.condition_paths();
    let mut paths: BTreeSet<String> = condition_paths.iter().cloned().collect();
    paths.extend(condition.fetch_fields.iter().cloned());

    let outcome = join::apply(
        JoinStrategy::SinglePhase { is_count: false },
        D::ENTITY,
        &paths,
        &condition_paths,
        config,
    );

    let plan = SelectPlan {
        root: D::ENTITY,
        predicate: predicate::compile(&condition.nodes),
        sort: condition.sort.clone(),
        pagination: Pagination {
            page: condition.page,
            size: condition.size,
        },
        join_paths: outcome.plan().joins.iter().map(|(p, _)| p.clone()).collect(),
    };

    let query = session.create_query(&QueryPlan::Select(plan));
    let rows = query.get_result_list()?;

    let total = if want_count {
        Some(count(session, condition, config)?)
    } else {
        None
    };

    Ok(Page { rows, total })
}

fn execute_two_phase<D: DtoSchema>(
    session: &dyn Session,
    condition: &SearchCondition<D>,
    config: &SearchConfig,
    cancellation: &dyn CancellationToken,
    want_count: bool,
) -> Result<Page, SearchError> {
    let condition_paths = condition.condition_paths();

    // Phase 1 — regular joins over condition paths only, no extras.
    let phase1_join_paths: BTreeSet<String> = condition_paths.iter().cloned().collect();
    let phase1_joins = join::apply(
        JoinStrategy::RegularOnly,
        D::ENTITY,
        &phase1_join_paths,
        &condition_paths,
        config,
    );

    let extra_projection: Vec<String> = condition
        .sort
        .iter()
        .map(|o| o.entity_field.clone())
        .filter(|f| !D::ENTITY.primary_key.contains(&f.as_str()))
        .collect();

    let plan1 = Phase1Plan {
        root: D::ENTITY,
        predicate: predicate::compile(&condition.nodes),
        sort: condition.sort.clone(),
        pagination: Pagination {
            page: condition.page,
            size: condition.size,
        },
        join_paths: phase1_joins.plan().joins.iter().map(|(p, _)| p.clone()).collect(),
        extra_projection,
    };

    let query1 = session.create_query(&QueryPlan::Phase1(plan1));
    let phase1_rows = query1.get_result_list()?;
    let keys: Vec<KeyValue> = phase1_rows.iter().map(|r| r.pk(D::ENTITY)).collect();

    if cancellation.is_cancelled() {
        return Err(SearchError::Cancelled);
    }

    if keys.is_empty() {
        let total = if want_count {
            Some(count(session, condition, config)?)
        } else {
            None
        };
        return Ok(Page { rows: Vec::new(), total });
    }

    // Phase 2 — smart-fetch hydration.
    let mut join_paths: BTreeSet<String> = condition.fetch_fields.clone();
    join_paths.extend(condition_paths.iter().cloned());
    join_paths.extend(detect_common_to_one_fields(D::ENTITY).into_iter().map(str::to_string));

    let smart = join::apply(JoinStrategy::SmartFetch, D::ENTITY, &join_paths, &condition_paths, config);

    let plan2 = Phase2Plan {
        root: D::ENTITY,
        keys: keys.clone(),
        sort: condition.sort.clone(),
        join_paths: smart.plan().joins.iter().map(|(p, _)| p.clone()).collect(),
    };

    let query2 = session.create_query(&QueryPlan::Phase2(plan2));
    let mut rows = query2.get_result_list()?;
    reorder_by_keys(&mut rows, &keys, D::ENTITY);

    for path in &smart.plan().deferred_to_many {
        session.batch_load(&keys, path, config.batch_fetch_size as usize)?;
    }

    if cancellation.is_cancelled() {
        // Phase 2 itself already ran; only Phase 3 (count) is skipped (P10).
        return Ok(Page { rows, total: None });
    }

    let total = if want_count {
        Some(count(session, condition, config)?)
    } else {
        None
    };

    Ok(Page { rows, total })
}

/// Phase 2 results are explicitly reordered to match Phase 1's `ORDER BY`
/// (`IN (…)` does not preserve order) — O(n) via a lookup map keyed by
/// primary key (§5, P5).
fn reorder_by_keys(rows: &mut Vec<Row>, keys: &[KeyValue], model: &'static crate::metamodel::EntityModel) {
    let mut by_key: std::collections::HashMap<KeyValue, Row> =
        rows.drain(..).map(|r| (r.pk(model), r)).collect();
    *rows = keys.iter().filter_map(|k| by_key.remove(k)).collect();
}

/// Phase 3 — a predicate-only `DISTINCT pk` count, via `RegularOnly`
/// joins (§4.8).
pub fn count<D: DtoSchema>(
    session: &dyn Session,
    condition: &SearchCondition<D>,
    config: &SearchConfig,
) -> Result<u64, SearchError> {
    let condition_paths = condition.condition_paths();
    let join_paths: BTreeSet<String> = condition_paths.iter().cloned().collect();
    let outcome = join::apply(JoinStrategy::RegularOnly, D::ENTITY, &join_paths, &condition_paths, config);

    let plan = CountPlan {
        root: D::ENTITY,
        predicate: predicate::compile(&condition.nodes),
        join_paths: outcome.plan().joins.iter().map(|(p, _)| p.clone()).collect(),
    };

    let query = session.create_query(&QueryPlan::Count(plan));
    let rows = query.get_result_list()?;
    Ok(rows.len() as u64)
}

/// `exists` fast-path: the same query as a single-phase select, but with
/// `size` forced to 1 (§9 Open Questions: this spec prescribes `LIMIT 1`
/// as the canonical optimization over `count > 0`).
pub fn exists<D: DtoSchema>(
    session: &dyn Session,
    condition: &SearchCondition<D>,
    config: &SearchConfig,
) -> Result<bool, SearchError> {
    let condition_paths = condition.condition_paths();
    let mut paths: BTreeSet<String> = condition_paths.iter().cloned().collect();
    paths.extend(condition.fetch_fields.iter().cloned());
    let outcome = join::apply(
        JoinStrategy::SinglePhase { is_count: false },
        D::ENTITY,
        &paths,
        &condition_paths,
        config,
    );

    let plan = SelectPlan {
        root: D::ENTITY,
        predicate: predicate::compile(&condition.nodes),
        sort: condition.sort.clone(),
        pagination: Pagination { page: 0, size: 1 },
        join_paths: outcome.plan().joins.iter().map(|(p, _)| p.clone()).collect(),
    };

    let query = session.create_query(&QueryPlan::Select(plan));
    Ok(!query.get_result_list()?.is_empty())
}

#[cfg(test)]
mod tests {
    use super::{decide_two_phase, execute};
    use crate::condition::{ConditionBuilder, Direction, LogicalOp, RawGroup, SearchCondition, SearchOperator, cond};
    use crate::config::SearchConfig;
    use crate::dto::{DtoSchema, FieldSpec};
    use crate::metamodel::EntityModel;
    use crate::orm::{CancellationToken, MemorySession, NeverCancelled, Row};
    use crate::test_fixtures::{COMMENT_MODEL, POST_MODEL, TENANT_SCOPED_MODEL};
    use crate::value::Value;
    use std::cell::Cell;
    use std::collections::BTreeMap;

    #[derive(Clone)]
    struct PostDto;
    impl DtoSchema for PostDto {
        const ENTITY: &'static EntityModel = POST_MODEL;
        const FIELDS: &'static [FieldSpec] = &[
            FieldSpec {
                dto_field: "title",
                entity_field: "title",
                allowed_operators: &[],
                sortable: true,
                sort_field: "title",
            },
            FieldSpec {
                dto_field: "commentBody",
                entity_field: "comments.body",
                allowed_operators: &[],
                sortable: false,
                sort_field: "comments.body",
            },
        ];
    }

    struct TenantDto;
    impl DtoSchema for TenantDto {
        const ENTITY: &'static EntityModel = TENANT_SCOPED_MODEL;
        const FIELDS: &'static [FieldSpec] = &[FieldSpec {
            dto_field: "tenantId",
            entity_field: "tenantId",
            allowed_operators: &[],
            sortable: false,
            sort_field: "tenantId",
        }];
    }

    fn scalar_condition(title: &str) -> SearchCondition<PostDto> {
        ConditionBuilder::<PostDto>::new()
            .where_(RawGroup {
                logical_op: LogicalOp::And,
                nodes: vec![cond(LogicalOp::And, "title", SearchOperator::Equals, vec![title.into()])],
            })
            .build(&SearchConfig::default())
            .expect("should build")
    }

    fn to_many_condition(body: &str) -> SearchCondition<PostDto> {
        ConditionBuilder::<PostDto>::new()
            .where_(RawGroup {
                logical_op: LogicalOp::And,
                nodes: vec![cond(LogicalOp::And, "commentBody", SearchOperator::Equals, vec![body.into()])],
            })
            .sort(vec![("title".into(), Direction::Asc)])
            .build(&SearchConfig::default())
            .expect("should build")
    }

    fn tenant_condition(tenant: &str, page: i64, size: i64) -> SearchCondition<TenantDto> {
        ConditionBuilder::<TenantDto>::new()
            .where_(RawGroup {
                logical_op: LogicalOp::And,
                nodes: vec![cond(LogicalOp::And, "tenantId", SearchOperator::Equals, vec![tenant.into()])],
            })
            .page(page)
            .size(size)
            .build(&SearchConfig::default())
            .expect("should build")
    }

    fn post_row(id: i64, title: &str) -> Row {
        let mut columns = BTreeMap::new();
        columns.insert("id".to_string(), Value::Int(id));
        columns.insert("title".to_string(), Value::Text(title.to_string()));
        Row { columns }
    }

    fn comment_row(id: i64, post_id: i64, body: &str) -> Row {
        let mut columns = BTreeMap::new();
        columns.insert("id".to_string(), Value::Int(id));
        columns.insert("body".to_string(), Value::Text(body.to_string()));
        columns.insert("post".to_string(), Value::List(vec![Value::Int(post_id)]));
        Row { columns }
    }

    /// One post with one matching comment — enough for the in-memory
    /// adapter's back-reference traversal to produce a non-empty Phase 1
    /// key set over a `comments.body` condition.
    fn seeded_post_with_comment() -> MemorySession {
        let mut session = MemorySession::new();
        session.insert(POST_MODEL, post_row(1, "Rust"));
        session.insert(COMMENT_MODEL, comment_row(1, 1, "great read"));
        session
    }

    /// 75 rows split evenly across three tenants, composite PK
    /// `(tenantId, entityId)` (S1/S6/P9).
    fn seeded_tenant_session() -> MemorySession {
        let mut session = MemorySession::new();
        for tenant in ["tenant1", "tenant2", "tenant3"] {
            for entity_id in 0..25i64 {
                let mut columns = BTreeMap::new();
                columns.insert("tenantId".to_string(), Value::Text(tenant.to_string()));
                columns.insert("entityId".to_string(), Value::Int(entity_id));
                session.insert(TENANT_SCOPED_MODEL, Row { columns });
            }
        }
        session
    }

    #[test]
    fn decide_two_phase_is_false_for_a_scalar_only_condition() {
        assert!(!decide_two_phase(&scalar_condition("Rust"), &SearchConfig::default()));
    }

    #[test]
    fn decide_two_phase_is_true_for_a_to_many_condition_path() {
        assert!(decide_two_phase(&to_many_condition("java"), &SearchConfig::default()));
    }

    #[test]
    fn cancelled_before_execute_returns_cancelled_without_running_any_phase() {
        struct AlwaysCancelled;
        impl CancellationToken for AlwaysCancelled {
            fn is_cancelled(&self) -> bool {
                true
            }
        }
        let session = MemorySession::new();
        let err = execute(&session, &scalar_condition("Rust"), &SearchConfig::default(), &AlwaysCancelled, true)
            .expect_err("cancellation must short-circuit before any query is issued");
        assert!(matches!(err, crate::error::SearchError::Cancelled));
    }

    /// Cancels starting from the Nth `is_cancelled` probe (1-indexed).
    struct CancelFrom {
        calls: Cell<u32>,
        from: u32,
    }

    impl CancellationToken for CancelFrom {
        fn is_cancelled(&self) -> bool {
            let n = self.calls.get() + 1;
            self.calls.set(n);
            n >= self.from
        }
    }

    #[test]
    fn cancelled_after_phase1_skips_phase2_in_the_two_phase_path() {
        let session = seeded_post_with_comment();
        let token = CancelFrom { calls: Cell::new(0), from: 2 };
        let err = execute(&session, &to_many_condition("great read"), &SearchConfig::default(), &token, true)
            .expect_err("cancellation observed right after phase 1 must short-circuit phase 2");
        assert!(matches!(err, crate::error::SearchError::Cancelled));
    }

    #[test]
    fn cancelled_after_phase2_skips_phase3_count_only() {
        let session = seeded_post_with_comment();
        let token = CancelFrom { calls: Cell::new(0), from: 3 };
        let page = execute(&session, &to_many_condition("great read"), &SearchConfig::default(), &token, true)
            .expect("phase 1 and phase 2 should still complete");
        assert_eq!(page.rows.len(), 1, "phase 2 should still hydrate the matching row");
        assert!(page.total.is_none(), "phase 3 must be skipped once cancellation is observed");
    }

    #[test]
    fn pagination_partitions_duplicate_sort_values_without_overlap_or_gaps(
    ) {
        let session = seeded_tenant_session();
        let mut seen = std::collections::HashSet::new();
        let mut total = 0usize;
        for page in 0..3 {
            let outcome = execute(
                &session,
                &tenant_condition("tenant1", page, 10),
                &SearchConfig::default(),
                &NeverCancelled,
                false,
            )
            .expect("should succeed");
            for row in &outcome.rows {
                assert!(seen.insert(row.pk(TENANT_SCOPED_MODEL)), "page {page} repeated a row from an earlier page");
            }
            total += outcome.rows.len();
        }
        assert_eq!(total, 25, "three pages of 10 should exactly cover the 25 tenant1 rows");
    }

    /// Every row shares the same non-PK sort value; the PK tiebreaker
    /// `normalize_sort` appends must still make paging a bijection with the
    /// underlying set, not just stable-but-incomplete (S5).
    #[test]
    fn pk_tiebreaker_makes_paging_a_bijection_over_rows_sharing_a_sort_value() {
        let mut session = MemorySession::new();
        for id in 1..=7i64 {
            session.insert(POST_MODEL, post_row(id, "Same title"));
        }
        let condition = ConditionBuilder::<PostDto>::new()
            .where_(RawGroup {
                logical_op: LogicalOp::And,
                nodes: vec![cond(LogicalOp::And, "title", SearchOperator::Equals, vec!["Same title".into()])],
            })
            .sort(vec![("title".into(), Direction::Desc)])
            .page(0)
            .size(3)
            .build(&SearchConfig::default())
            .expect("should build");

        let mut seen = std::collections::HashSet::new();
        for page in 0..3 {
            let mut paged = condition.clone();
            paged.page = page;
            let outcome =
                execute(&session, &paged, &SearchConfig::default(), &NeverCancelled, false).expect("should succeed");
            seen.extend(outcome.rows.iter().map(|r| r.pk(POST_MODEL)));
        }
        assert_eq!(seen.len(), 7, "paging across identical sort values must still cover every row exactly once");
    }
}
