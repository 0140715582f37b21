//! The typed runtime value carried by a resolved `Condition`, and the
//! string → `Value` coercion the Value Parser performs against an
//! attribute's static type.

mod parser;

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

pub use parser::{ParseOutcome, parse_value, parse_value_list};

///
/// Value
///
/// The typed runtime value carried by a resolved `Condition`. Distinct from
/// `AttributeKind`/`ScalarKind` (the *static* type an attribute declares);
/// `Value` is the coerced literal that ends up in a predicate.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(chrono::NaiveDate),
    DateTime(chrono::NaiveDateTime),
    OffsetDateTime(chrono::DateTime<chrono::FixedOffset>),
    /// Case-insensitive enum match by name; carries the canonical (declared
    /// casing) variant name once resolved.
    Enum(String),
    List(Vec<Self>),
}

// `f64` has no total order, so `Eq`/`Hash` can't be derived. Primary-key
// values are never floats in practice (§4.1 scalar types used for joins are
// integral/text/temporal), so bit-pattern hashing is a pragmatic total
// ordering rather than a semantic one — this type is only ever used as a
// `HashMap`/`HashSet` key for primary-key tuples (`KeyValue`), never compared
// for float equality.
impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Null => {}
            Self::Bool(b) => b.hash(state),
            Self::Int(i) => i.hash(state),
            Self::Float(f) => f.to_bits().hash(state),
            Self::Text(s) | Self::Enum(s) => s.hash(state),
            Self::Date(d) => d.hash(state),
            Self::DateTime(dt) => dt.hash(state),
            Self::OffsetDateTime(dt) => dt.hash(state),
            Self::List(items) => items.hash(state),
        }
    }
}

impl Value {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Natural ordering used for `<`, `<=`, `>`, `>=` comparisons. Returns
    /// `None` for values the database's natural ordering does not define a
    /// cross-type comparison for (the predicate builder only ever compares
    /// values of the same coerced type, so this is infallible in practice).
    #[must_use]
    pub fn partial_cmp_natural(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a.partial_cmp(b),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.partial_cmp(b),
            (Self::Date(a), Self::Date(b)) => a.partial_cmp(b),
            (Self::DateTime(a), Self::DateTime(b)) => a.partial_cmp(b),
            (Self::OffsetDateTime(a), Self::OffsetDateTime(b)) => a.partial_cmp(b),
            (Self::Bool(a), Self::Bool(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}
