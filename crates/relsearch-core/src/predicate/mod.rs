//! C6 — Predicate Builder.
//!
//! Maps a `Condition`/`Node` tree onto a dialect-agnostic predicate AST
//! (§4.5). The emitted SQL shapes from §4.5/§8's scenarios are produced by
//! [`render`], a reference renderer used only by this crate's own tests —
//! the concrete dialect is out of scope for the core.

mod anchor;
mod render;

pub use anchor::Anchor;
pub use render::render;

use crate::condition::{Condition, LogicalOp, Node, SearchOperator};
use crate::value::Value;

///
/// SqlPredicate
///
/// Dialect-agnostic boolean predicate expression. Tagged enum rather than
/// a class hierarchy (§9).
///

#[derive(Clone, Debug)]
pub enum SqlPredicate {
    Compare {
        field: String,
        op: CompareOp,
        value: Value,
    },
    IsNull {
        field: String,
    },
    IsNotNull {
        field: String,
    },
    TextPattern {
        field: String,
        value: String,
        anchor: Anchor,
        negated: bool,
    },
    InList {
        field: String,
        values: Vec<Value>,
        negated: bool,
    },
    Between {
        field: String,
        low: Value,
        high: Value,
        negated: bool,
    },
    And(Vec<SqlPredicate>),
    Or(Vec<SqlPredicate>),
    /// The constant `TRUE`/`FALSE` — emitted for `IN`/`NOT_IN` against an
    /// empty list (S4): the executor still runs the query rather than
    /// short-circuiting.
    Constant(bool),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Gt,
    Gte,
    Lt,
    Lte,
}

/// Compile the top-level node list of a `SearchCondition` into one
/// `SqlPredicate` — the shape a `SelectPlan`/`Phase1Plan`/`CountPlan`/
/// `ModifyPlan` hands to the ORM adapter. An empty list compiles to the
/// constant `TRUE`.
#[must_use]
pub fn compile(nodes: &[Node]) -> SqlPredicate {
    let parts: Vec<SqlPredicate> = nodes.iter().map(build_predicate).collect();
    combine(nodes, parts)
}

/// Map one resolved `Node` tree onto a `SqlPredicate`. `field` names are
/// already-resolved dotted `entity_field` paths; the Join Strategy Manager
/// (C8) is responsible for ensuring a join exists at every non-leaf
/// segment — this function only emits the leaf comparison.
#[must_use]
pub fn build_predicate(node: &Node) -> SqlPredicate {
    match node {
        Node::Condition(c) => build_condition(c),
        Node::Group(g) => {
            let parts: Vec<SqlPredicate> = g.nodes.iter().map(build_predicate).collect();
            combine(&g.nodes, parts)
        }
    }
}

fn combine(nodes: &[Node], parts: Vec<SqlPredicate>) -> SqlPredicate {
    // The first node's own logical_op is irrelevant (it has nothing to its
    // left); everything after it joins using its own logical_op.
    let mut iter = nodes.iter().zip(parts);
    let Some((_, first)) = iter.next() else {
        return SqlPredicate::Constant(true);
    };

    let mut ands = vec![first];
    let mut groups: Vec<SqlPredicate> = Vec::new();

    for (node, part) in iter {
        match node.logical_op() {
            LogicalOp::And => ands.push(part),
            LogicalOp::Or => {
                groups.push(if ands.len() == 1 {
                    ands.remove(0)
                } else {
                    SqlPredicate::And(std::mem::take(&mut ands))
                });
                ands.push(part);
            }
        }
    }

    let last = if ands.len() == 1 {
        ands.remove(0)
    } else {
        SqlPredicate::And(ands)
    };

    if groups.is_empty() {
        last
    } else {
        groups.push(last);
        SqlPredicate::Or(groups)
    }
}

fn build_condition(c: &Condition) -> SqlPredicate {
    let field = c.entity_field.clone();
    match c.op {
        SearchOperator::IsNull => SqlPredicate::IsNull { field },
        SearchOperator::IsNotNull => SqlPredicate::IsNotNull { field },
        SearchOperator::Equals => compare_or_null(field, CompareOp::Eq, &c.values[0], false),
        SearchOperator::NotEquals => compare_or_null(field, CompareOp::NotEq, &c.values[0], true),
        SearchOperator::GreaterThan => SqlPredicate::Compare {
            field,
            op: CompareOp::Gt,
            value: c.values[0].clone(),
        },
        SearchOperator::GreaterThanOrEqualTo => SqlPredicate::Compare {
            field,
            op: CompareOp::Gte,
            value: c.values[0].clone(),
        },
        SearchOperator::LessThan => SqlPredicate::Compare {
            field,
            op: CompareOp::Lt,
            value: c.values[0].clone(),
        },
        SearchOperator::LessThanOrEqualTo => SqlPredicate::Compare {
            field,
            op: CompareOp::Lte,
            value: c.values[0].clone(),
        },
        SearchOperator::Contains => text_pattern(field, &c.values[0], Anchor::Both, false),
        SearchOperator::NotContains => text_pattern(field, &c.values[0], Anchor::Both, true),
        SearchOperator::StartsWith => text_pattern(field, &c.values[0], Anchor::Start, false),
        SearchOperator::NotStartsWith => text_pattern(field, &c.values[0], Anchor::Start, true),
        SearchOperator::EndsWith => text_pattern(field, &c.values[0], Anchor::End, false),
        SearchOperator::NotEndsWith => text_pattern(field, &c.values[0], Anchor::End, true),
        SearchOperator::In => in_list(field, &c.values, false),
        SearchOperator::NotIn => in_list(field, &c.values, true),
        SearchOperator::Between => SqlPredicate::Between {
            field,
            low: c.values[0].clone(),
            high: c.values[1].clone(),
            negated: false,
        },
        SearchOperator::NotBetween => SqlPredicate::Between {
            field,
            low: c.values[0].clone(),
            high: c.values[1].clone(),
            negated: true,
        },
    }
}

/// `EQUALS`/`NOT_EQUALS` against `Value::Null` compile to `IS [NOT] NULL`
/// rather than `= NULL`/`<> NULL` (§4.5).
fn compare_or_null(field: String, op: CompareOp, value: &Value, negated_is_not_null: bool) -> SqlPredicate {
    if value.is_null() {
        if negated_is_not_null {
            SqlPredicate::IsNotNull { field }
        } else {
            SqlPredicate::IsNull { field }
        }
    } else {
        SqlPredicate::Compare {
            field,
            op,
            value: value.clone(),
        }
    }
}

fn text_pattern(field: String, value: &Value, anchor: Anchor, negated: bool) -> SqlPredicate {
    let text = match value {
        Value::Text(s) => s.clone(),
        other => format!("{other:?}"),
    };
    SqlPredicate::TextPattern {
        field,
        value: text,
        anchor,
        negated,
    }
}

/// Empty `IN`/`NOT IN` lists compile to the constant `FALSE`/`TRUE`
/// respectively (S4) rather than a zero-arity `IN ()`.
fn in_list(field: String, values: &[Value], negated: bool) -> SqlPredicate {
    if values.is_empty() {
        SqlPredicate::Constant(negated)
    } else {
        SqlPredicate::InList {
            field,
            values: values.to_vec(),
            negated,
        }
    }
}
