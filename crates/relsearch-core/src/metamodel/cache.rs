//! Process-wide path-resolution cache; private to the metamodel boundary.
//!
//! Results are keyed by `(entity path, dotted attribute path)` and are
//! never mutated once inserted (§5: "immutable after first population;
//! lazy initialization uses double-checked publication"). The same
//! double-checked-publication idiom as [`crate::relate`]'s per-entity
//! caches — `OnceLock<Mutex<_>>` rather than an `unsafe` global.

use super::field::AttributeKind;
use std::{
    collections::HashMap,
    sync::{Mutex, OnceLock},
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) struct PathInfo {
    pub is_to_many: bool,
    pub is_valid: bool,
}

type CacheKey = (&'static str, String);

static CACHE: OnceLock<Mutex<HashMap<CacheKey, PathInfo>>> = OnceLock::new();

pub(super) fn get_or_compute(
    entity_path: &'static str,
    dotted: &str,
    compute: impl FnOnce() -> PathInfo,
) -> PathInfo {
    let cache = CACHE.get_or_init(|| Mutex::new(HashMap::new()));
    let key: CacheKey = (entity_path, dotted.to_string());

    {
        let guard = cache.lock().expect("metamodel cache lock poisoned");
        if let Some(info) = guard.get(&key) {
            crate::obs::record(crate::obs::TraceEvent::CacheHit { entity_path });
            return *info;
        }
    }

    crate::obs::record(crate::obs::TraceEvent::CacheMiss { entity_path });
    let info = compute();
    let mut guard = cache.lock().expect("metamodel cache lock poisoned");
    // Double-checked: another thread may have inserted while we computed.
    *guard.entry(key).or_insert(info)
}

#[allow(dead_code)]
pub(super) fn reset() {
    if let Some(cache) = CACHE.get()
        && let Ok(mut guard) = cache.lock()
    {
        guard.clear();
    }
}

pub(super) const fn leaf_is_to_many(kind: &AttributeKind) -> bool {
    kind.is_to_many()
}
