use super::{Anchor, CompareOp, SqlPredicate};
use crate::value::Value;

/// Reference SQL renderer, used only by this crate's own tests to assert
/// the shapes described in §4.5/§8 — never invoked by the core pipeline,
/// which hands `SqlPredicate` to the ORM adapter instead of formatting SQL
/// itself.
#[must_use]
pub fn render(predicate: &SqlPredicate) -> String {
    match predicate {
        SqlPredicate::Compare { field, op, value } => {
            format!("{field} {} {}", render_compare_op(*op), render_value(value))
        }
        SqlPredicate::IsNull { field } => format!("{field} IS NULL"),
        SqlPredicate::IsNotNull { field } => format!("{field} IS NOT NULL"),
        SqlPredicate::TextPattern {
            field,
            value,
            anchor,
            negated,
        } => {
            let not = if *negated { "NOT " } else { "" };
            let pattern = match anchor {
                Anchor::Start => format!("{value}%"),
                Anchor::End => format!("%{value}"),
                Anchor::Both => format!("%{value}%"),
            };
            format!("LOWER({field}) {not}LIKE LOWER('{pattern}')")
        }
        SqlPredicate::InList {
            field,
            values,
            negated,
        } => {
            let not = if *negated { "NOT " } else { "" };
            let list = values.iter().map(render_value).collect::<Vec<_>>().join(", ");
            format!("{field} {not}IN ({list})")
        }
        SqlPredicate::Between {
            field,
            low,
            high,
            negated,
        } => {
            let not = if *negated { "NOT " } else { "" };
            format!("{field} {not}BETWEEN {} AND {}", render_value(low), render_value(high))
        }
        SqlPredicate::And(parts) => join_parts(parts, "AND"),
        SqlPredicate::Or(parts) => join_parts(parts, "OR"),
        SqlPredicate::Constant(true) => "TRUE".to_string(),
        SqlPredicate::Constant(false) => "FALSE".to_string(),
    }
}

fn join_parts(parts: &[SqlPredicate], joiner: &str) -> String {
    let rendered: Vec<String> = parts.iter().map(render).collect();
    format!("({})", rendered.join(&format!(" {joiner} ")))
}

const fn render_compare_op(op: CompareOp) -> &'static str {
    match op {
        CompareOp::Eq => "=",
        CompareOp::NotEq => "<>",
        CompareOp::Gt => ">",
        CompareOp::Gte => ">=",
        CompareOp::Lt => "<",
        CompareOp::Lte => "<=",
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Int(n) => n.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Text(s) => format!("'{s}'"),
        Value::Date(d) => format!("'{d}'"),
        Value::DateTime(dt) => format!("'{}'", dt.format("%Y-%m-%dT%H:%M:%S%.f")),
        Value::OffsetDateTime(dt) => format!("'{dt}'"),
        Value::Enum(name) => format!("'{name}'"),
        Value::List(items) => format!("({})", items.iter().map(render_value).collect::<Vec<_>>().join(", ")),
    }
}
