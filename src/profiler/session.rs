use std::rc::{Rc, Weak};

use log::trace;

use super::LineProfiler;
use crate::runtime::{hook, Tracer};

/// Keeps a profiler enabled for as long as it lives. Created by [`LineProfiler::session`].
#[must_use = "the profiler is disabled again as soon as the session is dropped"]
pub struct Session {
    profiler: LineProfiler,
}

impl Drop for Session {
    fn drop(&mut self) {
        self.profiler.disable();
    }
}

impl LineProfiler {
    /// Counts one more enable. The first one installs the profiler in the trace hook.
    pub fn enable(&self) {
        let first = {
            let mut state = self.inner.state.borrow_mut();
            state.enable_count += 1;
            if state.enable_count == 1 {
                state.last_time.clear();
            }
            state.enable_count == 1
        };
        if first {
            let tracer: Weak<dyn Tracer> = Rc::downgrade(&self.inner) as Weak<dyn Tracer>;
            hook::install(self.inner.id, tracer);
            trace!("installed line profiler {:?}", self.inner.id);
        }
    }

    /// Counts one enable off. The last one removes the profiler from the trace hook and
    /// discards every frame timer. Does nothing if the profiler is not enabled.
    pub fn disable(&self) {
        let last = {
            let mut state = self.inner.state.borrow_mut();
            if state.enable_count == 0 {
                return;
            }
            state.enable_count -= 1;
            if state.enable_count == 0 {
                state.last_time.clear();
            }
            state.enable_count == 0
        };
        if last {
            hook::uninstall(self.inner.id);
            trace!("uninstalled line profiler {:?}", self.inner.id);
        }
    }

    /// Enables the profiler until the returned guard is dropped.
    pub fn session(&self) -> Session {
        self.enable();
        Session {
            profiler: self.clone(),
        }
    }

    /// Runs `body` with the profiler enabled and returns its result untouched. A panic in
    /// `body` keeps unwinding after the profiler has been disabled again.
    pub fn run<T>(&self, body: impl FnOnce() -> T) -> T {
        let _session = self.session();
        body()
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{catch_unwind, AssertUnwindSafe};

    use super::*;
    use crate::error::LineProfError;

    #[test]
    fn enable_and_disable_are_counted() {
        let profiler = LineProfiler::new();
        assert_eq!(profiler.enable_count(), 0);
        profiler.enable();
        assert_eq!(profiler.enable_count(), 1);
        assert!(profiler.is_installed());
        profiler.enable();
        assert_eq!(profiler.enable_count(), 2);
        profiler.disable();
        assert_eq!(profiler.enable_count(), 1);
        assert!(profiler.is_installed());
        profiler.disable();
        assert_eq!(profiler.enable_count(), 0);
        assert!(profiler.last_time().is_empty());
        assert!(!profiler.is_installed());

        // Disabling a disabled profiler is a no-op.
        profiler.disable();
        assert_eq!(profiler.enable_count(), 0);
    }

    #[test]
    fn nested_sessions() {
        let profiler = LineProfiler::new();
        {
            let _outer = profiler.session();
            assert_eq!(profiler.enable_count(), 1);
            {
                let _inner = profiler.session();
                assert_eq!(profiler.enable_count(), 2);
            }
            assert_eq!(profiler.enable_count(), 1);
        }
        assert_eq!(profiler.enable_count(), 0);
        assert!(profiler.last_time().is_empty());
    }

    #[test]
    fn panicking_session_restores_the_count() {
        let profiler = LineProfiler::new();
        let result = catch_unwind(AssertUnwindSafe(|| {
            let _session = profiler.session();
            assert_eq!(profiler.enable_count(), 1);
            panic!("inside the session");
        }));
        assert!(result.is_err());
        assert_eq!(profiler.enable_count(), 0);
        assert!(profiler.last_time().is_empty());
        assert!(!profiler.is_installed());
    }

    #[test]
    fn run_returns_errors_unchanged() {
        let profiler = LineProfiler::new();
        let result: Result<(), LineProfError> = profiler.run(|| {
            profiler.run(|| Err(LineProfError::LineProfError("inner failure".to_string())))
        });
        match result {
            Err(LineProfError::LineProfError(message)) => assert_eq!(message, "inner failure"),
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(profiler.enable_count(), 0);
    }

    #[test]
    fn two_profilers_install_independently() {
        let first = LineProfiler::new();
        let second = LineProfiler::new();
        first.enable();
        second.enable();
        assert!(first.is_installed());
        assert!(second.is_installed());
        first.disable();
        assert!(!first.is_installed());
        assert!(second.is_installed());
        second.disable();
        assert!(!second.is_installed());
    }
}
