//! Observability boundary: advisory diagnostics flow through `TraceSink`
//! rather than a hard-coded logging framework choice.
//!
//! Core search logic MUST NOT print or log directly. All instrumentation
//! flows through `TraceEvent` and `TraceSink`, so a caller embedding this
//! crate wires up whatever logging stack it already uses.

use std::cell::RefCell;

///
/// TraceEvent
///

#[derive(Clone, Debug)]
pub enum TraceEvent {
    /// A fetch join degraded to a regular join because the backend refused it.
    JoinDegraded { path: String, reason: String },
    /// An advisory path (auto-detected common ToOne, nested ToOne inference)
    /// referenced an attribute that does not exist and was skipped.
    MetamodelAdvisorySkip { path: String },
    /// The two-phase executor decided to split the query.
    TwoPhaseChosen { to_many_paths: usize },
    /// The metamodel/relationship cache was consulted.
    CacheHit { entity_path: &'static str },
    CacheMiss { entity_path: &'static str },
}

///
/// TraceSink
///

pub trait TraceSink {
    fn record(&self, event: TraceEvent);
}

///
/// NoopTraceSink
///

pub struct NoopTraceSink;

impl TraceSink for NoopTraceSink {
    fn record(&self, _: TraceEvent) {}
}

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<*const dyn TraceSink>> = const { RefCell::new(None) };
}

pub fn record(event: TraceEvent) {
    let ptr = SINK_OVERRIDE.with(|cell| *cell.borrow());
    if let Some(ptr) = ptr {
        // SAFETY: the override is scoped by `with_trace_sink` and only
        // dereferenced synchronously within that scope.
        unsafe { (*ptr).record(event) };
    }
}

/// Run a closure with a temporary trace sink override, for tests and callers
/// that want to observe advisory degradations.
pub fn with_trace_sink<T>(sink: &dyn TraceSink, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<*const dyn TraceSink>);

    impl Drop for Guard {
        fn drop(&mut self) {
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = self.0;
            });
        }
    }

    // SAFETY: the raw pointer only outlives this call via the guard, which
    // restores the previous override on scope exit.
    let sink_ptr = unsafe { std::mem::transmute::<&dyn TraceSink, *const dyn TraceSink>(sink) };
    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink_ptr));
    let _guard = Guard(prev);

    f()
}

#[cfg(test)]
mod tests {
    use super::{NoopTraceSink, TraceEvent, TraceSink, record, with_trace_sink};
    use std::cell::RefCell;

    struct CollectingSink {
        events: RefCell<Vec<String>>,
    }

    impl super::TraceSink for CollectingSink {
        fn record(&self, event: TraceEvent) {
            self.events.borrow_mut().push(format!("{event:?}"));
        }
    }

    #[test]
    fn noop_sink_does_not_panic() {
        NoopTraceSink.record(TraceEvent::CacheHit { entity_path: "x" });
    }

    #[test]
    fn override_is_scoped_to_the_closure() {
        let sink = CollectingSink {
            events: RefCell::new(Vec::new()),
        };
        with_trace_sink(&sink, || {
            record(TraceEvent::CacheMiss { entity_path: "Post" });
        });
        assert_eq!(sink.events.borrow().len(), 1);

        // Outside the scope, no sink is installed; this must not panic.
        record(TraceEvent::CacheMiss { entity_path: "Post" });
        assert_eq!(sink.events.borrow().len(), 1);
    }
}
