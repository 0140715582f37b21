//! Deterministic in-memory `Session`/`Query` reference adapter, used only
//! by this crate's own test suite (and re-exported behind the
//! `test-support` feature for downstream integration tests) — a fake
//! backend standing in for a live store so executor tests stay
//! deterministic and don't need a database.

use super::{KeyValue, Query, Row, Session};
use crate::error::SearchError;
use crate::metamodel::EntityModel;
use crate::plan::{ModifyPlan, Pagination, Phase1Plan, Phase2Plan, QueryPlan, SelectPlan};
use crate::predicate::{Anchor, CompareOp, SqlPredicate};
use crate::value::Value;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

/// An in-process store keyed by entity path. Tables sit behind a
/// `RefCell` so `execute_update` (delete/update-by-condition) can mutate
/// through `&self`, the same way a real `Session` mutates a connection it
/// merely borrows (§5: "the core never stores references across calls").
#[derive(Default)]
pub struct MemorySession {
    tables: RefCell<HashMap<&'static str, Vec<Row>>>,
    batch_loads: Cell<u32>,
}

impl MemorySession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, model: &'static EntityModel, row: Row) {
        self.tables.get_mut().entry(model.path).or_default().push(row);
    }

    #[must_use]
    pub fn table(&self, model: &'static EntityModel) -> Vec<Row> {
        self.tables.borrow().get(model.path).cloned().unwrap_or_default()
    }

    /// Number of `batch_load` calls observed so far — tests assert this
    /// stays low (one call per batch, not one per owner) (P-adjacent to
    /// §4.8's batch-loading requirement).
    #[must_use]
    pub fn batch_load_calls(&self) -> u32 {
        self.batch_loads.get()
    }

    fn path_values(&self, model: &'static EntityModel, row: &Row, path: &[&str]) -> Vec<Value> {
        let Some((head, rest)) = path.split_first() else {
            return Vec::new();
        };
        let Some(attr) = model.attribute(head) else {
            return Vec::new();
        };

        if rest.is_empty() {
            return row.columns.get(*head).cloned().into_iter().collect();
        }

        match attr.kind.target() {
            Some(target) if attr.kind.is_to_one() => {
                let Some(Value::List(pk)) = row.columns.get(*head) else {
                    return Vec::new();
                };
                self.find_by_pk(target, pk)
                    .map(|child| self.path_values(target, &child, rest))
                    .unwrap_or_default()
            }
            Some(target) if attr.kind.is_to_many() => {
                let owner_pk = row.pk(model);
                self.children_of(model, &owner_pk, target, head)
                    .iter()
                    .flat_map(|child| self.path_values(target, child, rest))
                    .collect()
            }
            _ => Vec::new(),
        }
    }

    fn find_by_pk(&self, model: &'static EntityModel, pk: &[Value]) -> Option<Row> {
        self.table(model)
            .iter()
            .find(|row| row.pk(model).as_slice() == pk)
            .cloned()
    }

    /// Reverse-lookup children of `owner` through `target`'s first
    /// `ManyToOne`/`OneToOne` attribute pointing back at `owner_model`.
    fn children_of(
        &self,
        owner_model: &'static EntityModel,
        owner_pk: &[Value],
        target: &'static EntityModel,
        _via_attr: &str,
    ) -> Vec<Row> {
        let Some(back_attr) = target.attributes.iter().find(|a| {
            a.kind.is_to_one() && a.kind.target().is_some_and(|t| std::ptr::eq(t, owner_model))
        }) else {
            return Vec::new();
        };
        self.table(target)
            .iter()
            .filter(|row| match row.columns.get(back_attr.name) {
                Some(Value::List(fk)) => fk.as_slice() == owner_pk,
                _ => false,
            })
            .cloned()
            .collect()
    }

    /// Walk a compiled `SqlPredicate` (C6) against one row — the in-memory
    /// counterpart of whatever `WHERE` clause a real adapter would render.
    fn matches_predicate(&self, model: &'static EntityModel, row: &Row, predicate: &SqlPredicate) -> bool {
        match predicate {
            SqlPredicate::Constant(b) => *b,
            SqlPredicate::IsNull { field } => {
                let values = self.path_values(model, row, &field.split('.').collect::<Vec<_>>());
                values.iter().all(Value::is_null) || values.is_empty()
            }
            SqlPredicate::IsNotNull { field } => {
                let values = self.path_values(model, row, &field.split('.').collect::<Vec<_>>());
                values.iter().any(|v| !v.is_null())
            }
            SqlPredicate::Compare { field, op, value } => {
                let values = self.path_values(model, row, &field.split('.').collect::<Vec<_>>());
                compare(&values, *op, value)
            }
            SqlPredicate::TextPattern {
                field,
                value,
                anchor,
                negated,
            } => {
                let values = self.path_values(model, row, &field.split('.').collect::<Vec<_>>());
                let matched = text_matches(&values, value, *anchor);
                matched != *negated
            }
            SqlPredicate::InList { field, values: operands, negated } => {
                let values = self.path_values(model, row, &field.split('.').collect::<Vec<_>>());
                let matched = values.iter().any(|v| operands.contains(v));
                matched != *negated
            }
            SqlPredicate::Between { field, low, high, negated } => {
                let values = self.path_values(model, row, &field.split('.').collect::<Vec<_>>());
                let matched = values.iter().any(|v| in_range(v, low, high));
                matched != *negated
            }
            SqlPredicate::And(parts) => parts.iter().all(|p| self.matches_predicate(model, row, p)),
            SqlPredicate::Or(parts) => parts.iter().any(|p| self.matches_predicate(model, row, p)),
        }
    }

    fn sort_key(&self, model: &'static EntityModel, row: &Row, sort: &[crate::condition::Order]) -> Vec<Value> {
        sort.iter()
            .map(|o| {
                self.path_values(model, row, &o.entity_field.split('.').collect::<Vec<_>>())
                    .into_iter()
                    .next()
                    .unwrap_or(Value::Null)
            })
            .collect()
    }
}

fn compare(values: &[Value], op: CompareOp, rhs: &Value) -> bool {
    match op {
        CompareOp::Eq => values.iter().any(|v| v == rhs),
        CompareOp::NotEq => values.iter().all(|v| v != rhs),
        CompareOp::Gt => cmp_any(values, rhs, |o| o == std::cmp::Ordering::Greater),
        CompareOp::Gte => cmp_any(values, rhs, |o| o != std::cmp::Ordering::Less),
        CompareOp::Lt => cmp_any(values, rhs, |o| o == std::cmp::Ordering::Less),
        CompareOp::Lte => cmp_any(values, rhs, |o| o != std::cmp::Ordering::Greater),
    }
}

fn cmp_any(values: &[Value], rhs: &Value, accept: impl Fn(std::cmp::Ordering) -> bool) -> bool {
    values
        .iter()
        .filter_map(|v| v.partial_cmp_natural(rhs))
        .any(accept)
}

fn in_range(v: &Value, lo: &Value, hi: &Value) -> bool {
    matches!(v.partial_cmp_natural(lo), Some(std::cmp::Ordering::Greater | std::cmp::Ordering::Equal))
        && matches!(v.partial_cmp_natural(hi), Some(std::cmp::Ordering::Less | std::cmp::Ordering::Equal))
}

fn text_matches(values: &[Value], needle: &str, anchor: Anchor) -> bool {
    let needle = needle.to_lowercase();
    values.iter().any(|v| match v {
        Value::Text(hay) => {
            let hay = hay.to_lowercase();
            match anchor {
                Anchor::Both => hay.contains(&needle),
                Anchor::Start => hay.starts_with(&needle),
                Anchor::End => hay.ends_with(&needle),
            }
        }
        _ => false,
    })
}

pub struct MemoryQuery<'s> {
    session: &'s MemorySession,
    rows: Vec<Row>,
    modify: Option<ModifyPlan>,
}

impl<'s> MemoryQuery<'s> {
    fn build(session: &'s MemorySession, plan: &QueryPlan) -> Self {
        match plan {
            QueryPlan::Select(p) => Self {
                session,
                rows: session.run_select(p),
                modify: None,
            },
            QueryPlan::Phase1(p) => Self {
                session,
                rows: session.run_phase1(p),
                modify: None,
            },
            QueryPlan::Phase2(p) => Self {
                session,
                rows: session.run_phase2(p),
                modify: None,
            },
            QueryPlan::Count(p) => {
                let matching: Vec<Row> = session
                    .table(p.root)
                    .iter()
                    .filter(|row| session.matches_predicate(p.root, row, &p.predicate))
                    .cloned()
                    .collect();
                Self { session, rows: matching, modify: None }
            }
            QueryPlan::Modify(p) => {
                let matching: Vec<Row> = session
                    .table(p.root)
                    .iter()
                    .filter(|row| session.matches_predicate(p.root, row, &p.predicate))
                    .cloned()
                    .collect();
                Self { session, rows: matching, modify: Some(p.clone()) }
            }
        }
    }
}

impl MemorySession {
    /// Full-entity select (§4.8 single-phase, `useTwoPhase = false`), and
    /// the backing query for `exists`. In this in-memory adapter every row
    /// is always fully hydrated, so the only difference from
    /// [`Self::run_phase1`] is the plan type an adapter branches on.
    fn run_select(&self, plan: &SelectPlan) -> Vec<Row> {
        let mut matching: Vec<Row> = self
            .table(plan.root)
            .iter()
            .filter(|row| self.matches_predicate(plan.root, row, &plan.predicate))
            .cloned()
            .collect();

        matching.sort_by(|a, b| {
            let ka = self.sort_key(plan.root, a, &plan.sort);
            let kb = self.sort_key(plan.root, b, &plan.sort);
            compare_sort_keys(&ka, &kb, &plan.sort)
        });
        matching.dedup_by(|a, b| a.pk(plan.root) == b.pk(plan.root));

        apply_pagination(matching, &plan.pagination)
    }

    fn run_phase1(&self, plan: &Phase1Plan) -> Vec<Row> {
        let mut matching: Vec<Row> = self
            .table(plan.root)
            .iter()
            .filter(|row| self.matches_predicate(plan.root, row, &plan.predicate))
            .cloned()
            .collect();

        matching.sort_by(|a, b| {
            let ka = self.sort_key(plan.root, a, &plan.sort);
            let kb = self.sort_key(plan.root, b, &plan.sort);
            compare_sort_keys(&ka, &kb, &plan.sort)
        });
        matching.dedup_by(|a, b| a.pk(plan.root) == b.pk(plan.root));

        apply_pagination(matching, &plan.pagination)
    }

    fn run_phase2(&self, plan: &Phase2Plan) -> Vec<Row> {
        let by_key: HashMap<KeyValue, Row> = self
            .table(plan.root)
            .iter()
            .filter(|row| plan.keys.contains(&row.pk(plan.root)))
            .map(|row| (row.pk(plan.root), row.clone()))
            .collect();

        plan.keys
            .iter()
            .filter_map(|k| by_key.get(k).cloned())
            .collect()
    }

    /// Delete (empty `patch`) or patch (non-empty `patch`) every row
    /// matching the predicate, targeting the root table only (§4.10: joins
    /// evaluate the predicate, the write never touches a joined table).
    /// The matching set is snapshotted under an immutable borrow first so
    /// `matches_predicate`'s own table reads never conflict with the
    /// `RefCell` borrow this method later takes to mutate.
    fn apply_modify(&self, plan: &ModifyPlan) -> u64 {
        let snapshot = self.table(plan.root);
        let matching_pks: Vec<KeyValue> = snapshot
            .iter()
            .filter(|row| self.matches_predicate(plan.root, row, &plan.predicate))
            .map(|row| row.pk(plan.root))
            .collect();

        let mut tables = self.tables.borrow_mut();
        let rows = tables.entry(plan.root.path).or_default();

        if plan.patch.is_empty() {
            let before = rows.len();
            rows.retain(|row| !matching_pks.contains(&row.pk(plan.root)));
            u64::try_from(before - rows.len()).unwrap_or(u64::MAX)
        } else {
            let mut count = 0u64;
            for row in rows.iter_mut() {
                if matching_pks.contains(&row.pk(plan.root)) {
                    for (attr, value) in &plan.patch {
                        row.columns.insert(attr.clone(), value.clone());
                    }
                    count += 1;
                }
            }
            count
        }
    }
}

fn compare_sort_keys(a: &[Value], b: &[Value], sort: &[crate::condition::Order]) -> std::cmp::Ordering {
    use crate::condition::Direction;
    use std::cmp::Ordering;

    for ((av, bv), order) in a.iter().zip(b.iter()).zip(sort.iter()) {
        let ord = av.partial_cmp_natural(bv).unwrap_or(Ordering::Equal);
        let ord = match order.direction {
            Direction::Asc => ord,
            Direction::Desc => ord.reverse(),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

fn apply_pagination(rows: Vec<Row>, pagination: &Pagination) -> Vec<Row> {
    let start = (pagination.page as usize) * (pagination.size as usize);
    rows.into_iter().skip(start).take(pagination.size as usize).collect()
}

impl Query for MemoryQuery<'_> {
    fn get_result_list(&self) -> Result<Vec<Row>, SearchError> {
        Ok(self.rows.clone())
    }

    fn get_single_result(&self) -> Result<Option<Row>, SearchError> {
        match self.rows.len() {
            0 => Ok(None),
            1 => Ok(Some(self.rows[0].clone())),
            _ => Err(SearchError::Execution("expected at most one result".into())),
        }
    }

    fn execute_update(&self) -> Result<u64, SearchError> {
        match &self.modify {
            Some(plan) => Ok(self.session.apply_modify(plan)),
            None => Ok(self.rows.len() as u64),
        }
    }
}

impl Session for MemorySession {
    fn create_query(&self, plan: &QueryPlan) -> Box<dyn Query + '_> {
        Box::new(MemoryQuery::build(self, plan))
    }

    fn batch_load(&self, owner_pks: &[KeyValue], _relation: &str, batch_size: usize) -> Result<(), SearchError> {
        let batches = owner_pks.len().div_ceil(batch_size.max(1));
        self.batch_loads.set(self.batch_loads.get() + u32::try_from(batches.max(1)).unwrap_or(u32::MAX));
        Ok(())
    }
}
