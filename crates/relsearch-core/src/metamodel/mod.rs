//! C1 — Metamodel Adapter.
//!
//! Pure metadata lookups over a statically-declared `EntityModel`, with a
//! process-wide, read-mostly cache for path resolution (§4.1, §5).

pub mod entity;
pub mod field;
mod cache;

pub use entity::EntityModel;
pub use field::{AttributeKind, AttributeModel, ScalarKind};

use crate::error::SearchError;

/// `attribute(T, name)` — fails `NoSuchAttribute` (via `SearchError::Metamodel`)
/// if absent. `advisory` controls whether the caller treats a miss as fatal
/// or as a skip-and-log.
pub fn attribute(
    model: &'static EntityModel,
    name: &str,
    advisory: bool,
) -> Result<&'static AttributeModel, SearchError> {
    model.attribute(name).ok_or_else(|| SearchError::Metamodel {
        path: format!("{}.{name}", model.entity_name),
        advisory,
    })
}

/// `primaryKey(T)` — one or more attribute names in declared order.
#[must_use]
pub const fn primary_key(model: &'static EntityModel) -> &'static [&'static str] {
    model.primary_key
}

/// Walk a dotted path (`"comments.author.name"`) through the metamodel,
/// resolving each non-leaf segment through a relationship attribute's
/// target entity. Returns the attribute model of the final (leaf) segment
/// together with whether any segment along the way was ToMany.
fn resolve_path(
    root: &'static EntityModel,
    dotted: &str,
) -> Result<(&'static AttributeModel, bool), SearchError> {
    let mut current = root;
    let mut saw_to_many = false;
    let segments: Vec<&str> = dotted.split('.').collect();

    let Some((leaf, ancestors)) = segments.split_last() else {
        return Err(SearchError::Metamodel {
            path: dotted.to_string(),
            advisory: true,
        });
    };

    for segment in ancestors {
        let attr = attribute(current, segment, true)?;
        if attr.kind.is_to_many() {
            saw_to_many = true;
        }
        current = attr.kind.target().ok_or_else(|| SearchError::Metamodel {
            path: format!("{}.{segment}", current.entity_name),
            advisory: true,
        })?;
    }

    let leaf_attr = attribute(current, leaf, true)?;
    if leaf_attr.kind.is_to_many() {
        saw_to_many = true;
    }

    Ok((leaf_attr, saw_to_many))
}

/// `isToManyPath(root, path)` — true if any segment along the path is
/// collection-valued.
#[must_use]
pub fn is_to_many_path(root: &'static EntityModel, dotted: &str) -> bool {
    cache::get_or_compute(root.path, dotted, || {
        match resolve_path(root, dotted) {
            Ok((_, saw_to_many)) => cache::PathInfo {
                is_to_many: saw_to_many,
                is_valid: true,
            },
            Err(_) => cache::PathInfo {
                is_to_many: false,
                is_valid: false,
            },
        }
    })
    .is_to_many
}

/// `isValidPath(root, path)` — validates every segment exists; does not
/// evaluate relationship semantics beyond what is needed to walk the path.
#[must_use]
pub fn is_valid_path(root: &'static EntityModel, dotted: &str) -> bool {
    cache::get_or_compute(root.path, dotted, || match resolve_path(root, dotted) {
        Ok((_, saw_to_many)) => cache::PathInfo {
            is_to_many: saw_to_many,
            is_valid: true,
        },
        Err(_) => cache::PathInfo {
            is_to_many: false,
            is_valid: false,
        },
    })
    .is_valid
}

/// Resolve the leaf attribute model for a dotted path, surfacing a
/// non-advisory `Metamodel` failure if any segment is missing. Used by the
/// predicate builder (C6), which treats condition paths as critical.
pub fn resolve_leaf(
    root: &'static EntityModel,
    dotted: &str,
) -> Result<&'static AttributeModel, SearchError> {
    resolve_path(root, dotted).map(|(attr, _)| attr).map_err(
        |err| match err {
            SearchError::Metamodel { path, .. } => SearchError::Metamodel {
                path,
                advisory: false,
            },
            other => other,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::{is_to_many_path, is_valid_path};
    use crate::test_fixtures::{COMMENT_MODEL, POST_MODEL};

    #[test]
    fn direct_scalar_path_is_valid_and_not_to_many() {
        assert!(is_valid_path(POST_MODEL, "title"));
        assert!(!is_to_many_path(POST_MODEL, "title"));
    }

    #[test]
    fn to_many_relationship_is_detected() {
        assert!(is_valid_path(POST_MODEL, "comments"));
        assert!(is_to_many_path(POST_MODEL, "comments"));
    }

    #[test]
    fn nested_to_one_path_through_a_to_many_is_still_to_many() {
        assert!(is_valid_path(POST_MODEL, "comments.author"));
        assert!(is_to_many_path(POST_MODEL, "comments.author"));
        assert_eq!(COMMENT_MODEL.entity_name, "Comment");
    }

    #[test]
    fn unknown_attribute_is_invalid() {
        assert!(!is_valid_path(POST_MODEL, "doesNotExist"));
    }

    #[test]
    fn cache_is_idempotent_across_repeated_lookups() {
        for _ in 0..3 {
            assert!(is_to_many_path(POST_MODEL, "comments"));
        }
    }
}
