//! C8 — Join Strategy Manager.
//!
//! Applies joins to a query root according to a strategy parameter; it
//! never issues queries (§4.7). A degraded fetch→regular fallback returns
//! `JoinOutcome::Degraded` rather than raising and immediately retrying
//! (§9 re-architecture guidance, §4.7 additions).

use crate::config::SearchConfig;
use crate::metamodel::{self, EntityModel};
use crate::relate::{detect_common_to_one_fields, detect_nested_to_one_relationships, is_nested_path_safe_for_join};
use std::collections::BTreeSet;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum JoinStrategy {
    RegularOnly,
    SinglePhase { is_count: bool },
    SmartFetch,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum JoinKind {
    Regular,
    Fetch,
}

#[derive(Clone, Debug, Default)]
pub struct JoinPlan {
    /// Alphabetically ordered so any two calls with the same input path
    /// set produce the same sequence of join operations (§4.7
    /// determinism).
    pub joins: Vec<(String, JoinKind)>,
    /// The single ToMany path fetch-joined under `SmartFetch`, if any.
    pub primary_to_many: Option<String>,
    /// ToMany paths not fetch-joined; hydrated by batch loading instead
    /// (§4.8 batch-loading, `Session::batch_load`).
    pub deferred_to_many: Vec<String>,
}

#[derive(Clone, Debug)]
pub enum JoinOutcome {
    Applied(JoinPlan),
    /// A fetch join could not be applied; `plan` already reflects the
    /// fetch→regular fallback (`reason` is advisory, logged via
    /// `TraceSink`, never a `SearchError`).
    Degraded { plan: JoinPlan, reason: String },
}

impl JoinOutcome {
    #[must_use]
    pub fn plan(&self) -> &JoinPlan {
        match self {
            Self::Applied(plan) | Self::Degraded { plan, .. } => plan,
        }
    }
}

/// Apply a join strategy over `paths`, a set of dotted entity paths
/// (typically condition paths, plus `fetch_fields` for `SmartFetch`).
/// Invalid paths are skipped with an advisory trace event, never an error
/// (§4.7: "Missing or invalid paths are skipped with a warning").
#[must_use]
pub fn apply(
    strategy: JoinStrategy,
    root: &'static EntityModel,
    paths: &BTreeSet<String>,
    condition_paths: &[String],
    config: &SearchConfig,
) -> JoinOutcome {
    let valid_paths: BTreeSet<String> = paths
        .iter()
        .filter(|p| {
            let ok = metamodel::is_valid_path(root, p);
            if !ok {
                crate::obs::record(crate::obs::TraceEvent::MetamodelAdvisorySkip { path: (*p).clone() });
            }
            ok
        })
        .cloned()
        .collect();

    match strategy {
        JoinStrategy::RegularOnly => JoinOutcome::Applied(JoinPlan {
            joins: valid_paths.into_iter().map(|p| (p, JoinKind::Regular)).collect(),
            primary_to_many: None,
            deferred_to_many: Vec::new(),
        }),
        JoinStrategy::SinglePhase { is_count } => {
            apply_single_phase(root, &valid_paths, is_count, config)
        }
        JoinStrategy::SmartFetch => apply_smart_fetch(root, &valid_paths, condition_paths),
    }
}

fn apply_single_phase(
    root: &'static EntityModel,
    paths: &BTreeSet<String>,
    is_count: bool,
    config: &SearchConfig,
) -> JoinOutcome {
    let mut joins: Vec<(String, JoinKind)> = Vec::new();

    for path in paths {
        let kind = if metamodel::is_to_many_path(root, path) {
            JoinKind::Regular
        } else if is_count {
            JoinKind::Regular
        } else {
            JoinKind::Fetch
        };
        joins.push((path.clone(), kind));
    }

    if !is_count {
        let extra_to_one: BTreeSet<String> = detect_common_to_one_fields(root)
            .into_iter()
            .map(str::to_string)
            .filter(|f| !paths.contains(f))
            .collect();
        for field in extra_to_one {
            joins.push((field, JoinKind::Fetch));
        }

        for nested in detect_nested_to_one_relationships(root, config) {
            if is_nested_path_safe_for_join(root, &nested) && !joins.iter().any(|(p, _)| *p == nested) {
                joins.push((nested, JoinKind::Fetch));
            }
        }
    }

    joins.sort_by(|a, b| a.0.cmp(&b.0));
    joins.dedup_by(|a, b| a.0 == b.0);

    JoinOutcome::Applied(JoinPlan {
        joins,
        primary_to_many: None,
        deferred_to_many: Vec::new(),
    })
}

fn apply_smart_fetch(
    root: &'static EntityModel,
    paths: &BTreeSet<String>,
    condition_paths: &[String],
) -> JoinOutcome {
    let mut to_one: BTreeSet<String> = paths
        .iter()
        .filter(|p| !metamodel::is_to_many_path(root, p))
        .cloned()
        .collect();
    to_one.extend(detect_common_to_one_fields(root).into_iter().map(str::to_string));

    let mut to_many: Vec<String> = paths
        .iter()
        .filter(|p| metamodel::is_to_many_path(root, p))
        .cloned()
        .collect();
    to_many.sort();

    let mut joins: Vec<(String, JoinKind)> =
        to_one.into_iter().map(|p| (p, JoinKind::Fetch)).collect();

    let primary = match to_many.len() {
        0 => None,
        1 => Some(to_many[0].clone()),
        _ => {
            // Condition-priority, else alphabetically first (§9 Open
            // Questions: this spec adopts option (b)).
            to_many
                .iter()
                .find(|p| condition_paths.contains(p))
                .cloned()
                .or_else(|| to_many.first().cloned())
        }
    };

    let mut deferred = Vec::new();
    for path in &to_many {
        if Some(path) == primary.as_ref() {
            joins.push((path.clone(), JoinKind::Fetch));
        } else {
            joins.push((path.clone(), JoinKind::Regular));
            deferred.push(path.clone());
        }
    }

    joins.sort_by(|a, b| a.0.cmp(&b.0));
    joins.dedup_by(|a, b| a.0 == b.0);

    JoinOutcome::Applied(JoinPlan {
        joins,
        primary_to_many: primary,
        deferred_to_many: deferred,
    })
}

/// Called by the two-phase executor when the adapter reports that a fetch
/// join was refused (e.g. multiple collection fetches in one query).
/// Degrades every `Fetch` entry to `Regular` and returns the adjusted plan
/// as `Degraded`, never as a `SearchError` — the manager's own contract
/// permits "degraded" (§4.7, §7).
#[must_use]
pub fn degrade(mut plan: JoinPlan, reason: impl Into<String>) -> JoinOutcome {
    for (_, kind) in &mut plan.joins {
        *kind = JoinKind::Regular;
    }
    plan.deferred_to_many.extend(plan.primary_to_many.take());
    plan.deferred_to_many.sort();
    plan.deferred_to_many.dedup();
    JoinOutcome::Degraded {
        plan,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::{JoinKind, JoinOutcome, JoinStrategy, apply, degrade};
    use crate::config::SearchConfig;
    use crate::test_fixtures::POST_MODEL;
    use std::collections::BTreeSet;

    #[test]
    fn regular_only_never_emits_a_fetch_join() {
        let mut paths = BTreeSet::new();
        paths.insert("author".to_string());
        paths.insert("comments".to_string());
        let outcome = apply(JoinStrategy::RegularOnly, POST_MODEL, &paths, &[], &SearchConfig::default());
        assert!(outcome.plan().joins.iter().all(|(_, kind)| *kind == JoinKind::Regular));
    }

    #[test]
    fn single_phase_count_never_fetches() {
        let mut paths = BTreeSet::new();
        paths.insert("author".to_string());
        let outcome = apply(
            JoinStrategy::SinglePhase { is_count: true },
            POST_MODEL,
            &paths,
            &[],
            &SearchConfig::default(),
        );
        assert!(outcome.plan().joins.iter().all(|(_, kind)| *kind == JoinKind::Regular));
    }

    #[test]
    fn single_phase_select_fetches_to_one_and_detects_extras() {
        let paths = BTreeSet::new();
        let outcome = apply(
            JoinStrategy::SinglePhase { is_count: false },
            POST_MODEL,
            &paths,
            &[],
            &SearchConfig::default(),
        );
        let plan = outcome.plan();
        assert!(plan.joins.iter().any(|(p, k)| p == "author" && *k == JoinKind::Fetch));
    }

    #[test]
    fn smart_fetch_picks_condition_priority_primary_among_multiple_to_many() {
        let mut paths = BTreeSet::new();
        paths.insert("comments".to_string());
        paths.insert("tags".to_string());
        let outcome = apply(
            JoinStrategy::SmartFetch,
            POST_MODEL,
            &paths,
            &["comments".to_string()],
            &SearchConfig::default(),
        );
        let plan = outcome.plan();
        assert_eq!(plan.primary_to_many.as_deref(), Some("comments"));
        assert_eq!(plan.deferred_to_many, vec!["tags".to_string()]);
    }

    #[test]
    fn smart_fetch_falls_back_to_alphabetical_primary_without_condition_priority() {
        let mut paths = BTreeSet::new();
        paths.insert("comments".to_string());
        paths.insert("tags".to_string());
        let outcome = apply(JoinStrategy::SmartFetch, POST_MODEL, &paths, &[], &SearchConfig::default());
        assert_eq!(outcome.plan().primary_to_many.as_deref(), Some("comments"));
    }

    #[test]
    fn degrade_turns_every_fetch_into_a_regular_join() {
        let mut paths = BTreeSet::new();
        paths.insert("author".to_string());
        let outcome = apply(
            JoinStrategy::SinglePhase { is_count: false },
            POST_MODEL,
            &paths,
            &[],
            &SearchConfig::default(),
        );
        let degraded = degrade(outcome.plan().clone(), "backend refused the fetch join");
        assert!(matches!(degraded, JoinOutcome::Degraded { .. }));
        assert!(degraded.plan().joins.iter().all(|(_, kind)| *kind == JoinKind::Regular));
    }
}
