/*
 * Observability Hooks
 *
 * spec.md §9 calls the reference implementation's trytake/take/put
 * hooks out as global function pointers and suggests a safe
 * reimplementation "replace [them] with a compile-time trait or a
 * single injected trace sink". This module is that sink: `TraceSink`
 * is a single object every sync primitive reports through, installed
 * once by the embedder via `install`.
 *
 * Compiled in only under the `trace` feature. With it disabled, every
 * call site in `sync/` still compiles (same function names, same
 * signatures) but resolves to an inlined no-op — the observability
 * layer costs nothing in a build that doesn't want it, per spec.md §6's
 * "enable flag for observability hooks" toggle.
 */

use crate::object::ObjectClass;

#[cfg(feature = "trace")]
mod enabled {
    use lazy_static::lazy_static;
    use spin::Mutex;

    use super::ObjectClass;

    /// Observability sink for synchronization-object events. Every
    /// method defaults to doing nothing, so an embedder overrides only
    /// the events it cares about.
    pub trait TraceSink: Sync {
        fn on_take(&self, class: ObjectClass, name: &str) {
            let _ = (class, name);
        }
        fn on_release(&self, class: ObjectClass, name: &str) {
            let _ = (class, name);
        }
        fn on_put(&self, class: ObjectClass, name: &str) {
            let _ = (class, name);
        }
    }

    struct NullSink;
    impl TraceSink for NullSink {}
    static NULL_SINK: NullSink = NullSink;

    lazy_static! {
        static ref SINK: Mutex<&'static dyn TraceSink> = Mutex::new(&NULL_SINK);
    }

    /// Install the embedder's trace sink, replacing whatever was there
    /// before (the no-op sink, initially).
    pub fn install(sink: &'static dyn TraceSink) {
        *SINK.lock() = sink;
    }

    pub fn on_take(class: ObjectClass, name: &str) {
        SINK.lock().on_take(class, name);
    }

    pub fn on_release(class: ObjectClass, name: &str) {
        SINK.lock().on_release(class, name);
    }

    pub fn on_put(class: ObjectClass, name: &str) {
        SINK.lock().on_put(class, name);
    }
}

#[cfg(feature = "trace")]
pub use enabled::{install, on_put, on_release, on_take, TraceSink};

#[cfg(not(feature = "trace"))]
mod disabled {
    use super::ObjectClass;

    #[inline(always)]
    pub fn on_take(_class: ObjectClass, _name: &str) {}
    #[inline(always)]
    pub fn on_release(_class: ObjectClass, _name: &str) {}
    #[inline(always)]
    pub fn on_put(_class: ObjectClass, _name: &str) {}
}

#[cfg(not(feature = "trace"))]
pub use disabled::{on_put, on_release, on_take};
