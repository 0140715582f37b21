///
/// SearchOperator
///
/// The closed operator set from §3. Arity and value-shape rules (I3) are
/// exposed as methods rather than re-derived at each call site.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SearchOperator {
    Equals,
    NotEquals,
    GreaterThan,
    GreaterThanOrEqualTo,
    LessThan,
    LessThanOrEqualTo,
    Contains,
    NotContains,
    StartsWith,
    NotStartsWith,
    EndsWith,
    NotEndsWith,
    IsNull,
    IsNotNull,
    In,
    NotIn,
    Between,
    NotBetween,
}

impl SearchOperator {
    pub const ALL: &'static [Self] = &[
        Self::Equals,
        Self::NotEquals,
        Self::GreaterThan,
        Self::GreaterThanOrEqualTo,
        Self::LessThan,
        Self::LessThanOrEqualTo,
        Self::Contains,
        Self::NotContains,
        Self::StartsWith,
        Self::NotStartsWith,
        Self::EndsWith,
        Self::NotEndsWith,
        Self::IsNull,
        Self::IsNotNull,
        Self::In,
        Self::NotIn,
        Self::Between,
        Self::NotBetween,
    ];

    /// `IS_NULL`/`IS_NOT_NULL` require no value (I3).
    #[must_use]
    pub const fn requires_no_value(self) -> bool {
        matches!(self, Self::IsNull | Self::IsNotNull)
    }

    /// `IN`/`NOT_IN` require a non-empty list, of any length (I3).
    #[must_use]
    pub const fn is_list(self) -> bool {
        matches!(self, Self::In | Self::NotIn)
    }

    /// `BETWEEN`/`NOT_BETWEEN` require exactly two ordered values (I3).
    #[must_use]
    pub const fn is_range(self) -> bool {
        matches!(self, Self::Between | Self::NotBetween)
    }

    /// String-pattern operators compare case-insensitively (§4.5).
    #[must_use]
    pub const fn is_text_pattern(self) -> bool {
        matches!(
            self,
            Self::Contains
                | Self::NotContains
                | Self::StartsWith
                | Self::NotStartsWith
                | Self::EndsWith
                | Self::NotEndsWith
        )
    }

    /// camelCase wire name, used by the query-string parser (§6).
    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "notEquals",
            Self::GreaterThan => "greaterThan",
            Self::GreaterThanOrEqualTo => "greaterThanOrEqualTo",
            Self::LessThan => "lessThan",
            Self::LessThanOrEqualTo => "lessThanOrEqualTo",
            Self::Contains => "contains",
            Self::NotContains => "notContains",
            Self::StartsWith => "startsWith",
            Self::NotStartsWith => "notStartsWith",
            Self::EndsWith => "endsWith",
            Self::NotEndsWith => "notEndsWith",
            Self::IsNull => "isNull",
            Self::IsNotNull => "isNotNull",
            Self::In => "in",
            Self::NotIn => "notIn",
            Self::Between => "between",
            Self::NotBetween => "notBetween",
        }
    }

    #[must_use]
    pub fn from_wire_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|op| op.wire_name() == name)
    }
}

///
/// LogicalOp
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LogicalOp {
    And,
    Or,
}

///
/// Direction
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
    Asc,
    Desc,
}
