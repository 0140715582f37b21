//! C7 — Relationship Analyzer.
//!
//! Pure functions over the metamodel (§4.6), cached per entity type with
//! the same process-wide, read-mostly cache idiom as C1.

mod cache;

use crate::config::SearchConfig;
use crate::metamodel::EntityModel;

/// `detectCommonToOneFields(T)` — direct attribute names whose kind is
/// `MANY_TO_ONE` or `ONE_TO_ONE`.
#[must_use]
pub fn detect_common_to_one_fields(model: &'static EntityModel) -> Vec<&'static str> {
    cache::get_or_compute(model.path, || {
        model
            .attributes
            .iter()
            .filter(|a| a.kind.is_to_one())
            .map(|a| a.name)
            .collect()
    })
}

/// `detectNestedToOneRelationships(T)` — for every collection attribute
/// `c` with target `Tc`, adds `c.x` for each `x ∈
/// detectCommonToOneFields(Tc)`. Depth capped by `config.nested_join_depth_limit`.
#[must_use]
pub fn detect_nested_to_one_relationships(
    model: &'static EntityModel,
    config: &SearchConfig,
) -> Vec<String> {
    let mut nested = Vec::new();
    for attr in model.attributes {
        if !attr.kind.is_to_many() {
            continue;
        }
        let Some(target) = attr.kind.target() else {
            continue;
        };
        for field in detect_common_to_one_fields(target) {
            let path = format!("{}.{field}", attr.name);
            if u8::try_from(path.split('.').count()).unwrap_or(u8::MAX)
                <= config.nested_join_depth_limit
            {
                nested.push(path);
            }
        }
    }
    nested.sort();
    nested
}

/// `isNestedPathSafeForJoin(root, path)` — every segment must be ToOne;
/// the path must not cycle back to the root class.
#[must_use]
pub fn is_nested_path_safe_for_join(root: &'static EntityModel, path: &str) -> bool {
    let mut current = root;
    for segment in path.split('.') {
        let Some(attr) = current.attribute(segment) else {
            return false;
        };
        if !attr.kind.is_to_one() {
            return false;
        }
        let Some(target) = attr.kind.target() else {
            return false;
        };
        if std::ptr::eq(target, root) {
            return false;
        }
        current = target;
    }
    true
}
