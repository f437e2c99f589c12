//! The trace hook of the instrumented runtime.
//!
//! Every frame of instrumented code reports its events here. The hook is a dispatcher: any number
//! of tracers may be installed at once, keyed by [`TracerId`], and each event is forwarded to all
//! of them in installation order. Profiled code runs on a single logical thread, so the registry
//! lives in thread-local storage and events emitted on one thread are never seen by tracers
//! installed on another.
//!
//! Tracers must not install or uninstall tracers from inside [`Tracer::trace`].
use std::cell::RefCell;
use std::rc::Weak;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;

use super::{Code, FrameId};

static NEXT_TRACER_ID: AtomicU64 = AtomicU64::new(0);

thread_local! {
    static TRACE_HOOK: RefCell<IndexMap<TracerId, Weak<dyn Tracer>>> =
        RefCell::new(IndexMap::new());
}

/// An execution event reported by a frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TraceEvent {
    /// A new activation of the code started.
    Call,
    /// Execution reached the start of the given source line.
    Line(u32),
    /// The activation finished, normally or by unwinding.
    Return,
    /// A suspended generator was resumed.
    Resume,
    /// A generator suspended itself and handed a value to its caller.
    Yield,
}

/// Receives the events of the runtime while installed.
pub trait Tracer {
    fn trace(&self, code: &Code, frame: FrameId, event: TraceEvent);
}

/// Key of an installed tracer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TracerId(u64);

impl TracerId {
    pub fn new() -> Self {
        TracerId(NEXT_TRACER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for TracerId {
    fn default() -> Self {
        Self::new()
    }
}

/// Installs `tracer` under `id`. Returns `false` if a tracer with that id was already installed,
/// in which case nothing changes.
pub fn install(id: TracerId, tracer: Weak<dyn Tracer>) -> bool {
    TRACE_HOOK.with(|hook| {
        let mut hook = hook.borrow_mut();
        if hook.contains_key(&id) {
            return false;
        }
        hook.insert(id, tracer);
        true
    })
}

/// Removes the tracer installed under `id`, keeping the others in order. Returns whether a tracer
/// was removed.
pub fn uninstall(id: TracerId) -> bool {
    TRACE_HOOK
        .try_with(|hook| match hook.try_borrow_mut() {
            Ok(mut hook) => hook.shift_remove(&id).is_some(),
            Err(_) => false,
        })
        .unwrap_or(false)
}

pub fn is_installed(id: TracerId) -> bool {
    TRACE_HOOK.with(|hook| hook.borrow().contains_key(&id))
}

/// The number of tracers installed on the current thread.
pub fn installed_count() -> usize {
    TRACE_HOOK.with(|hook| hook.borrow().len())
}

/// Forwards an event to every installed tracer that is still alive.
pub(crate) fn dispatch(code: &Code, frame: FrameId, event: TraceEvent) {
    let _ = TRACE_HOOK.try_with(|hook| {
        let Ok(hook) = hook.try_borrow() else {
            return;
        };
        for tracer in hook.values() {
            if let Some(tracer) = tracer.upgrade() {
                tracer.trace(code, frame, event);
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        events: RefCell<Vec<(String, TraceEvent)>>,
    }

    impl Tracer for Recorder {
        fn trace(&self, code: &Code, _frame: FrameId, event: TraceEvent) {
            self.events
                .borrow_mut()
                .push((code.name().to_string(), event));
        }
    }

    #[test]
    fn install_is_keyed_by_id() {
        let recorder = Rc::new(Recorder::default());
        let id = TracerId::new();
        let weak: Weak<dyn Tracer> = Rc::downgrade(&recorder) as Weak<dyn Tracer>;
        assert!(install(id, weak.clone()));
        assert!(!install(id, weak));
        assert!(is_installed(id));
        assert!(uninstall(id));
        assert!(!uninstall(id));
        assert!(!is_installed(id));
    }

    #[test]
    fn dispatch_reaches_every_installed_tracer() {
        let first = Rc::new(Recorder::default());
        let second = Rc::new(Recorder::default());
        let first_id = TracerId::new();
        let second_id = TracerId::new();
        install(first_id, Rc::downgrade(&first) as Weak<dyn Tracer>);
        install(second_id, Rc::downgrade(&second) as Weak<dyn Tracer>);

        let code = Code::new("hooked", "hooked.rs", 1);
        dispatch(&code, FrameId::new(), TraceEvent::Line(2));
        uninstall(first_id);
        dispatch(&code, FrameId::new(), TraceEvent::Line(3));
        uninstall(second_id);
        dispatch(&code, FrameId::new(), TraceEvent::Line(4));

        assert_eq!(
            *first.events.borrow(),
            vec![("hooked".to_string(), TraceEvent::Line(2))]
        );
        assert_eq!(
            *second.events.borrow(),
            vec![
                ("hooked".to_string(), TraceEvent::Line(2)),
                ("hooked".to_string(), TraceEvent::Line(3)),
            ]
        );
    }

    #[test]
    fn dropped_tracers_are_skipped() {
        let recorder = Rc::new(Recorder::default());
        let id = TracerId::new();
        install(id, Rc::downgrade(&recorder) as Weak<dyn Tracer>);
        drop(recorder);
        let code = Code::new("gone", "gone.rs", 1);
        dispatch(&code, FrameId::new(), TraceEvent::Call);
        assert!(uninstall(id));
    }
}
