//! Per-entity cache for `detectCommonToOneFields`, keyed by entity path.
//! Same `OnceLock<Mutex<_>>` idiom as `metamodel::cache`.

use std::{
    collections::HashMap,
    sync::{Mutex, OnceLock},
};

static CACHE: OnceLock<Mutex<HashMap<&'static str, Vec<&'static str>>>> = OnceLock::new();

pub(super) fn get_or_compute(
    entity_path: &'static str,
    compute: impl FnOnce() -> Vec<&'static str>,
) -> Vec<&'static str> {
    let cache = CACHE.get_or_init(|| Mutex::new(HashMap::new()));

    {
        let guard = cache.lock().expect("relationship cache lock poisoned");
        if let Some(fields) = guard.get(entity_path) {
            crate::obs::record(crate::obs::TraceEvent::CacheHit { entity_path });
            return fields.clone();
        }
    }

    crate::obs::record(crate::obs::TraceEvent::CacheMiss { entity_path });
    let fields = compute();
    let mut guard = cache.lock().expect("relationship cache lock poisoned");
    guard.entry(entity_path).or_insert(fields).clone()
}
