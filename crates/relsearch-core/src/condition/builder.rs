//! C4 — Condition Builder.
//!
//! A typestate state machine (§4.3, §9): `ConditionBuilder<D>` only exposes
//! `where_`; the returned `WhereBuilder<D>` exposes everything else,
//! enforcing the where-first rule at the type level instead of at runtime.

use super::node::{Group, Node, Order};
use super::operator::{Direction, LogicalOp, SearchOperator};
use crate::dto::{DtoSchema, RawCondition, RawOrder, resolve_condition, resolve_order};
use crate::error::{SearchError, Violation};
use crate::plan::normalize_sort;
use std::collections::BTreeSet;
use std::marker::PhantomData;

/// Unvalidated input to `where`/`and`/`or`, built with [`cond`] and
/// [`group`]. Carries either a fresh literal or an already-resolved node
/// copied from an existing `SearchCondition` (via [`WhereBuilder::from_existing`]),
/// which bypasses re-validation.
#[derive(Clone, Debug)]
pub enum RawNode {
    Condition(RawCondition),
    Group(RawGroup),
    Resolved(Node),
}

#[derive(Clone, Debug)]
pub struct RawGroup {
    pub logical_op: LogicalOp,
    pub nodes: Vec<RawNode>,
}

/// Build one leaf condition for use in `where`/`and`/`or`.
#[must_use]
pub fn cond(
    logical_op: LogicalOp,
    dto_field: impl Into<String>,
    op: SearchOperator,
    raw_values: Vec<String>,
) -> RawNode {
    RawNode::Condition(RawCondition {
        logical_op,
        dto_field: dto_field.into(),
        op,
        raw_values,
    })
}

/// Build a nested group for use in `where`/`and`/`or`.
#[must_use]
pub const fn group(logical_op: LogicalOp, nodes: Vec<RawNode>) -> RawNode {
    RawNode::Group(RawGroup { logical_op, nodes })
}

///
/// SearchCondition
///
/// Immutable once built (§3). `D` is the DTO schema it was validated
/// against; it carries no runtime data, only a compile-time binding.
///

#[derive(Clone, Debug)]
pub struct SearchCondition<D> {
    pub nodes: Vec<Node>,
    pub sort: Vec<Order>,
    pub page: u32,
    pub size: u32,
    pub fetch_fields: BTreeSet<String>,
    _marker: PhantomData<fn() -> D>,
}

impl<D: DtoSchema> SearchCondition<D> {
    /// Every dotted entity path referenced by a condition anywhere in the
    /// tree (not sort, not fetch fields) — the "condition paths" used by
    /// C7/C8/C9.
    #[must_use]
    pub fn condition_paths(&self) -> Vec<String> {
        let mut out = Vec::new();
        for node in &self.nodes {
            node.collect_entity_fields(&mut out);
        }
        out.sort();
        out.dedup();
        out
    }
}

///
/// ConditionBuilder (state INITIAL)
///

pub struct ConditionBuilder<D> {
    _marker: PhantomData<fn() -> D>,
}

impl<D: DtoSchema> Default for ConditionBuilder<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: DtoSchema> ConditionBuilder<D> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }

    /// `where(G)` — establishes the first group; its own logical operator
    /// is irrelevant at the top level.
    #[must_use]
    pub fn where_(self, first: RawGroup) -> WhereBuilder<D> {
        WhereBuilder {
            nodes: first.nodes,
            sort: Vec::new(),
            page: 0,
            size: 0,
            fetch_fields: BTreeSet::new(),
            _marker: PhantomData,
        }
    }
}

///
/// WhereBuilder (state HAVE_WHERE)
///

pub struct WhereBuilder<D> {
    nodes: Vec<RawNode>,
    sort: Vec<RawOrder>,
    page: i64,
    size: i64,
    fetch_fields: BTreeSet<String>,
    _marker: PhantomData<fn() -> D>,
}

impl<D: DtoSchema> WhereBuilder<D> {
    /// `from(existing, D)` — seeded from an existing `SearchCondition`;
    /// subsequent mutations never touch the original (deep-copy of nodes,
    /// shallow-copy of orders, fresh `fetchFields`).
    #[must_use]
    pub fn from_existing(existing: &SearchCondition<D>) -> Self {
        Self {
            nodes: existing
                .nodes
                .iter()
                .cloned()
                .map(RawNode::Resolved)
                .collect(),
            sort: existing
                .sort
                .iter()
                .map(|o| RawOrder {
                    dto_field: o.dto_field.clone(),
                    direction: o.direction,
                })
                .collect(),
            page: i64::from(existing.page),
            size: i64::from(existing.size),
            fetch_fields: BTreeSet::new(),
            _marker: PhantomData,
        }
    }

    /// Inline a flat group of conditions, or append a grouped subtree,
    /// joined to the existing top-level list with `AND` (§4.3).
    #[must_use]
    pub fn and(self, next: RawGroup) -> Self {
        self.append(next, LogicalOp::And)
    }

    /// As [`Self::and`], joined with `OR`.
    #[must_use]
    pub fn or(self, next: RawGroup) -> Self {
        self.append(next, LogicalOp::Or)
    }

    fn append(mut self, next: RawGroup, joiner: LogicalOp) -> Self {
        let is_flat = next
            .nodes
            .iter()
            .all(|n| matches!(n, RawNode::Condition(_) | RawNode::Resolved(Node::Condition(_))));

        if is_flat {
            for node in next.nodes {
                self.nodes.push(retag(node, joiner));
            }
        } else {
            self.nodes.push(RawNode::Group(RawGroup {
                logical_op: joiner,
                nodes: next.nodes,
            }));
        }
        self
    }

    #[must_use]
    pub fn sort(mut self, orders: Vec<(String, Direction)>) -> Self {
        self.sort = orders
            .into_iter()
            .map(|(dto_field, direction)| RawOrder { dto_field, direction })
            .collect();
        self
    }

    /// `page(n)` clamps to `max(0, n)`.
    #[must_use]
    pub const fn page(mut self, n: i64) -> Self {
        self.page = if n < 0 { 0 } else { n };
        self
    }

    /// `size(n)` uses the value if `>0`, else the caller's configured
    /// default is applied at `build()` time.
    #[must_use]
    pub const fn size(mut self, n: i64) -> Self {
        self.size = n;
        self
    }

    #[must_use]
    pub fn fetch_fields(mut self, paths: impl IntoIterator<Item = String>) -> Self {
        self.fetch_fields.extend(paths);
        self
    }

    /// `build()` — validates every node/order via C2, resolves paths and
    /// literals, normalizes the sort via C10, and returns an immutable
    /// `SearchCondition`. Aggregates every violation found, never just the
    /// first (P1).
    pub fn build(self, config: &crate::config::SearchConfig) -> Result<SearchCondition<D>, SearchError> {
        let mut violations: Vec<Violation> = Vec::new();

        let nodes: Vec<Node> = self
            .nodes
            .into_iter()
            .filter_map(|n| resolve_node::<D>(n, &mut violations))
            .collect();

        let orders: Vec<Order> = self
            .sort
            .iter()
            .filter_map(|raw| resolve_order::<D>(raw, &mut violations))
            .collect();

        if !violations.is_empty() {
            return Err(SearchError::validation(violations));
        }

        let sort = normalize_sort(D::ENTITY, &orders);
        let size = config.clamp_size(if self.size > 0 { self.size } else { 0 });
        let page = u32::try_from(self.page).unwrap_or(0);

        Ok(SearchCondition {
            nodes,
            sort,
            page,
            size,
            fetch_fields: self.fetch_fields,
            _marker: PhantomData,
        })
    }
}

fn retag(node: RawNode, joiner: LogicalOp) -> RawNode {
    match node {
        RawNode::Condition(mut c) => {
            c.logical_op = joiner;
            RawNode::Condition(c)
        }
        RawNode::Resolved(Node::Condition(mut c)) => {
            c.logical_op = joiner;
            RawNode::Resolved(Node::Condition(c))
        }
        other => other,
    }
}

fn resolve_node<D: DtoSchema>(node: RawNode, violations: &mut Vec<Violation>) -> Option<Node> {
    match node {
        RawNode::Resolved(node) => Some(node),
        RawNode::Condition(raw) => resolve_condition::<D>(&raw, violations),
        RawNode::Group(raw) => {
            let nodes: Vec<Node> = raw
                .nodes
                .into_iter()
                .filter_map(|n| resolve_node::<D>(n, violations))
                .collect();
            if nodes.is_empty() {
                None
            } else {
                Some(Node::Group(Group {
                    logical_op: raw.logical_op,
                    nodes,
                }))
            }
        }
    }
}
