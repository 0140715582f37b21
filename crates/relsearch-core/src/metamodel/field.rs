///
/// ScalarKind
///
/// The value families the Value Parser must be able to coerce a string
/// into. Distinct from `Value`: this is the attribute's *static* declared
/// type, not a runtime literal.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ScalarKind {
    Text,
    Bool,
    Int,
    Long,
    Decimal,
    Float,
    Double,
    Date,
    DateTime,
    OffsetDateTime,
    Enum(&'static str),
    Uuid,
}

///
/// AttributeKind
///
/// `attribute(T, name).kind` from §3/§4.1: the closed set of persistence
/// kinds an attribute may have.
///

#[derive(Clone, Copy, Debug)]
pub enum AttributeKind {
    SingleBasic(ScalarKind),
    ManyToOne { target: &'static EntityModel },
    OneToOne { target: &'static EntityModel },
    OneToMany { target: &'static EntityModel },
    ManyToMany { target: &'static EntityModel },
    Embedded,
    ElementCollection { element: ScalarKind },
}

impl AttributeKind {
    /// True for `MANY_TO_ONE`/`ONE_TO_ONE` — a single-valued relationship
    /// (ToOne, §3/§4.6).
    #[must_use]
    pub const fn is_to_one(&self) -> bool {
        matches!(self, Self::ManyToOne { .. } | Self::OneToOne { .. })
    }

    /// True for `ONE_TO_MANY`/`MANY_TO_MANY` — a collection-valued
    /// relationship (ToMany).
    #[must_use]
    pub const fn is_to_many(&self) -> bool {
        matches!(self, Self::OneToMany { .. } | Self::ManyToMany { .. })
    }

    /// The target entity model for a relationship attribute, if any.
    #[must_use]
    pub const fn target(&self) -> Option<&'static EntityModel> {
        match self {
            Self::ManyToOne { target }
            | Self::OneToOne { target }
            | Self::OneToMany { target }
            | Self::ManyToMany { target } => Some(target),
            Self::SingleBasic(_) | Self::Embedded | Self::ElementCollection { .. } => None,
        }
    }

    /// The `ScalarKind` the Value Parser should coerce a literal to, for
    /// attributes the predicate builder can compare directly. Relationship
    /// and embedded attributes have no scalar form.
    #[must_use]
    pub const fn scalar(&self) -> Option<ScalarKind> {
        match self {
            Self::SingleBasic(kind) | Self::ElementCollection { element: kind } => Some(*kind),
            Self::ManyToOne { .. }
            | Self::OneToOne { .. }
            | Self::OneToMany { .. }
            | Self::ManyToMany { .. }
            | Self::Embedded => None,
        }
    }
}

///
/// AttributeModel
///
/// One entry in `EntityModel::attributes`. `json_encoded` backs the §4.5
/// JSON-text heuristic: a text column that is actually a serialized JSON
/// blob still compiles string-pattern operators to `LIKE`/`TextPattern`,
/// never to a structured JSON path.
///

#[derive(Clone, Copy, Debug)]
pub struct AttributeModel {
    pub name: &'static str,
    pub kind: AttributeKind,
    pub json_encoded: bool,
}

use super::entity::EntityModel;
