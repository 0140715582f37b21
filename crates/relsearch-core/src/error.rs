use derive_more::Display;
use thiserror::Error as ThisError;

///
/// Violation
///
/// One aggregated validation complaint. `ValidationFailure` always carries
/// the full list, never just the first, so a caller can report every
/// problem with a request in one round trip.
///

#[derive(Clone, Debug, Display, Eq, PartialEq)]
#[display("{field}: {message}")]
pub struct Violation {
    pub field: String,
    pub message: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

///
/// SearchError
///
/// Closed error taxonomy for the search pipeline. Not a stable wire format;
/// callers match on the variants they care about and otherwise display it.
///

#[derive(Debug, ThisError)]
pub enum SearchError {
    /// DTO field unknown, operator not permitted, sort field not sortable,
    /// or a value shape mismatch (e.g. `BETWEEN` without two values).
    /// Aggregates every violation found, never just the first.
    #[error("validation failed: {}", join_violations(.0))]
    Validation(Vec<Violation>),

    /// A value could not be coerced to the attribute's static type.
    #[error("could not parse value {value:?} for field {field}")]
    Parse { field: String, value: String },

    /// A path references a non-existent attribute.
    ///
    /// `advisory` distinguishes condition-critical paths (must surface) from
    /// auto-detected paths such as common ToOne fields or nested ToOne
    /// inference (log via a `TraceSink` and skip; never abort a valid
    /// request over an advisory path).
    #[error("unknown attribute on path `{path}`")]
    Metamodel { path: String, advisory: bool },

    /// The backend refused a fetch join and no fallback degrade was
    /// possible (the common case, a fetch degrading to a regular join, is
    /// not an error at all — see `JoinOutcome::Degraded`).
    #[error("join could not be applied for path `{path}`: {reason}")]
    Join { path: String, reason: String },

    /// A database error surfaced unchanged from Phase 1, 2, or 3.
    #[error("execution failed: {0}")]
    Execution(String),

    /// The request's cancellation token fired mid-phase.
    #[error("request cancelled")]
    Cancelled,
}

impl SearchError {
    #[must_use]
    pub fn validation(violations: Vec<Violation>) -> Self {
        Self::Validation(violations)
    }

    #[must_use]
    pub const fn is_advisory(&self) -> bool {
        matches!(self, Self::Metamodel { advisory: true, .. })
    }
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
