//! C2 — DTO Schema & Field Validator.
//!
//! Field annotations are compile-time, produced by `#[derive(SearchDto)]`
//! in the `relsearch-derive` crate rather than runtime reflection (§4.2).
//! This module owns the table shape the macro emits into and the
//! validation pass the condition builder runs against it.

use crate::condition::{Direction, LogicalOp, Node, Order, SearchOperator};
use crate::error::{SearchError, Violation};
use crate::metamodel::EntityModel;
use crate::value::{ParseOutcome, parse_value, parse_value_list};

///
/// FieldSpec
///
/// One annotated DTO field. `allowed_operators: &[]` means "all operators
/// permitted" (§4.2 default).
///

#[derive(Clone, Copy, Debug)]
pub struct FieldSpec {
    pub dto_field: &'static str,
    pub entity_field: &'static str,
    pub allowed_operators: &'static [SearchOperator],
    pub sortable: bool,
    pub sort_field: &'static str,
}

impl FieldSpec {
    #[must_use]
    pub fn permits(&self, op: SearchOperator) -> bool {
        self.allowed_operators.is_empty() || self.allowed_operators.contains(&op)
    }
}

///
/// DtoSchema
///
/// Implemented by the `#[derive(SearchDto)]` macro output: a `const
/// FIELDS` table plus the entity model it binds to.
///

pub trait DtoSchema {
    const ENTITY: &'static EntityModel;
    const FIELDS: &'static [FieldSpec];

    fn field(dto_field: &str) -> Option<&'static FieldSpec> {
        Self::FIELDS.iter().find(|f| f.dto_field == dto_field)
    }
}

/// Raw (unvalidated) builder input, resolved into a `Node::Condition` by
/// [`resolve_condition`].
#[derive(Clone, Debug)]
pub struct RawCondition {
    pub logical_op: LogicalOp,
    pub dto_field: String,
    pub op: SearchOperator,
    pub raw_values: Vec<String>,
}

pub fn resolve_condition<D: DtoSchema>(
    raw: &RawCondition,
    violations: &mut Vec<Violation>,
) -> Option<Node> {
    let Some(spec) = D::field(&raw.dto_field) else {
        violations.push(Violation::new(
            raw.dto_field.clone(),
            "not an annotated search field",
        ));
        return None;
    };

    if !spec.permits(raw.op) {
        violations.push(Violation::new(
            raw.dto_field.clone(),
            format!("operator `{}` is not permitted on this field", raw.op.wire_name()),
        ));
        return None;
    }

    if !shape_matches(raw.op, raw.raw_values.len()) {
        violations.push(Violation::new(
            raw.dto_field.clone(),
            format!(
                "operator `{}` requires {} but {} were given",
                raw.op.wire_name(),
                arity_description(raw.op),
                raw.raw_values.len()
            ),
        ));
        return None;
    }

    let Some(attr) = D::ENTITY.attribute(spec.entity_field) else {
        violations.push(Violation::new(spec.entity_field, "unknown entity attribute"));
        return None;
    };

    let scalar = match attr.kind.scalar() {
        Some(scalar) => scalar,
        None => {
            violations.push(Violation::new(
                spec.entity_field,
                "field is not a comparable scalar attribute",
            ));
            return None;
        }
    };

    let values = if raw.op.requires_no_value() {
        Vec::new()
    } else if raw.op.is_range() {
        parse_value_list(scalar, &raw.raw_values, true)
            .into_iter()
            .filter_map(|outcome| record_parse_outcome(&raw.dto_field, outcome, violations))
            .collect()
    } else {
        raw.raw_values
            .iter()
            .filter_map(|v| record_parse_outcome(&raw.dto_field, parse_value(scalar, v), violations))
            .collect()
    };

    if !raw.op.requires_no_value() && values.len() != raw.raw_values.len() {
        // a value failed to parse; the violation was already recorded
        return None;
    }

    Some(Node::Condition(crate::condition::Condition {
        logical_op: raw.logical_op,
        dto_field: raw.dto_field.clone(),
        entity_field: spec.entity_field.to_string(),
        op: raw.op,
        values,
    }))
}

fn record_parse_outcome(
    dto_field: &str,
    outcome: ParseOutcome,
    violations: &mut Vec<Violation>,
) -> Option<crate::value::Value> {
    match outcome {
        ParseOutcome::Ok(value) => Some(value),
        ParseOutcome::Invalid { reason } => {
            violations.push(Violation::new(dto_field.to_string(), reason));
            None
        }
    }
}

const fn shape_matches(op: SearchOperator, count: usize) -> bool {
    if op.requires_no_value() {
        count == 0
    } else if op.is_range() {
        count == 2
    } else if op.is_list() {
        count > 0
    } else {
        count == 1
    }
}

const fn arity_description(op: SearchOperator) -> &'static str {
    if op.requires_no_value() {
        "no value"
    } else if op.is_range() {
        "exactly two values"
    } else if op.is_list() {
        "at least one value"
    } else {
        "exactly one value"
    }
}

#[derive(Clone, Debug)]
pub struct RawOrder {
    pub dto_field: String,
    pub direction: Direction,
}

pub fn resolve_order<D: DtoSchema>(
    raw: &RawOrder,
    violations: &mut Vec<Violation>,
) -> Option<Order> {
    let Some(spec) = D::field(&raw.dto_field) else {
        violations.push(Violation::new(raw.dto_field.clone(), "not an annotated search field"));
        return None;
    };
    if !spec.sortable {
        violations.push(Violation::new(raw.dto_field.clone(), "field is not sortable"));
        return None;
    }
    Some(Order {
        dto_field: raw.dto_field.clone(),
        entity_field: spec.sort_field.to_string(),
        direction: raw.direction,
    })
}

#[must_use]
pub fn into_validation_error(violations: Vec<Violation>) -> SearchError {
    SearchError::validation(violations)
}
