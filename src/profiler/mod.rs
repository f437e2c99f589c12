//! The line profiler.
//!
//! A [`LineProfiler`] records, for every line executed inside the functions registered with it,
//! how many times the line ran and how much wall-clock time was spent on it. It does this by
//! installing itself in the runtime's trace hook (see [`crate::runtime::hook`]) while it is
//! enabled, and charging the time between consecutive events of a frame to the line the frame
//! was on.
//!
//! ## Basic usage
//!
//! ```
//! use lineprof::runtime::Function;
//! use lineprof::LineProfiler;
//!
//! let f = Function::new(lineprof::code!("f"), |frame, x: i64| {
//!     frame.line(line!());
//!     let y = x + 10;
//!     frame.line(line!());
//!     y
//! });
//!
//! let profiler = LineProfiler::new();
//! let f_profiled = profiler.wrap(&f);
//! assert_eq!(f_profiled.call(10), 20);
//!
//! let timings = profiler.timings_for(f.code().id()).unwrap();
//! assert_eq!(timings.len(), 2);
//! assert!(timings.values().all(|timing| timing.hits == 1));
//! ```
//!
//! ## Sessions
//!
//! Enabling is counted. [`LineProfiler::enable`] and [`LineProfiler::disable`] may nest; the
//! profiler is installed in the trace hook on the first enable and removed when the count
//! returns to zero, at which point all per-frame timers are discarded. Disabling a disabled
//! profiler does nothing. [`LineProfiler::session`] returns a guard that enables now and
//! disables when dropped, including while unwinding from a panic.
//!
//! ## Threads
//!
//! A profiler is a cheap, reference-counted handle and cannot leave the thread that created it.
//! It only sees events emitted on that thread.
#![allow(clippy::module_name_repetitions)]

mod data;
mod interceptor;
mod session;
mod wrap;

use std::cell::RefCell;
use std::fmt::{self, Display};
use std::rc::Rc;

use log::{debug, warn};

pub use data::{CodeMap, LastTime, LastTimeMap, Timing, TimingTable};
pub use session::Session;

use crate::runtime::{hook, CodeId, FunctionInfo, Profilable, TracerId};

/// A non-fatal problem with how the profiler is being used.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UsageWarning {
    /// A transparent wrapper was registered. Only the wrapper's own lines get profiled, not the
    /// lines of the function it forwards to.
    WrappedFunction { name: String },
}

impl Display for UsageWarning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            UsageWarning::WrappedFunction { name } => write!(
                f,
                "Adding a function with a `wrapped` attribute ({name}). You may want to profile \
                 the wrapped function by adding `{name}.wrapped()` instead."
            ),
        }
    }
}

#[derive(Default)]
pub(crate) struct ProfilerState {
    pub(crate) functions: Vec<FunctionInfo>,
    pub(crate) code_map: CodeMap,
    pub(crate) enable_count: usize,
    pub(crate) last_time: LastTimeMap,
    pub(crate) warnings: Vec<UsageWarning>,
}

pub(crate) struct ProfilerInner {
    pub(crate) id: TracerId,
    pub(crate) state: RefCell<ProfilerState>,
}

impl Drop for ProfilerInner {
    fn drop(&mut self) {
        hook::uninstall(self.id);
    }
}

/// Records per-line hit counts and times for registered functions. Cloning gives another handle
/// to the same profiler.
#[derive(Clone)]
pub struct LineProfiler {
    inner: Rc<ProfilerInner>,
}

impl Default for LineProfiler {
    fn default() -> Self {
        Self::new()
    }
}

impl LineProfiler {
    pub fn new() -> Self {
        LineProfiler {
            inner: Rc::new(ProfilerInner {
                id: TracerId::new(),
                state: RefCell::new(ProfilerState::default()),
            }),
        }
    }

    /// A profiler with `functions` already registered, in order.
    pub fn with_functions(functions: &[&dyn Profilable]) -> Self {
        let profiler = Self::new();
        for function in functions {
            profiler.add_function(*function);
        }
        profiler
    }

    /// Registers `function` and returns the identity its timings are kept under. Registering the
    /// same code again changes nothing. Registering a transparent wrapper emits a
    /// [`UsageWarning::WrappedFunction`] but still registers it.
    pub fn add_function(&self, function: &(impl Profilable + ?Sized)) -> CodeId {
        let info = function.info();
        let code = info.code_id();
        let mut state = self.inner.state.borrow_mut();

        if info.wrapped().is_some() {
            let warning = UsageWarning::WrappedFunction {
                name: info.name().to_string(),
            };
            warn!("{warning}");
            state.warnings.push(warning);
        }

        if state.code_map.contains(code) {
            return code;
        }
        debug!(
            "registering {} ({}:{}) as {code}",
            info.name(),
            info.code().filename(),
            info.code().first_line()
        );
        state.code_map.get_or_create(code);
        state.functions.push(info.clone());
        code
    }

    /// The registered functions, in registration order.
    pub fn functions(&self) -> Vec<FunctionInfo> {
        self.inner.state.borrow().functions.clone()
    }

    /// A snapshot of every timing table.
    pub fn code_map(&self) -> CodeMap {
        self.inner.state.borrow().code_map.clone()
    }

    /// A snapshot of the timings of one registered code.
    pub fn timings_for(&self, code: CodeId) -> Option<TimingTable> {
        self.inner.state.borrow().code_map.get(code).cloned()
    }

    /// How many enables are currently outstanding.
    pub fn enable_count(&self) -> usize {
        self.inner.state.borrow().enable_count
    }

    /// A snapshot of the per-frame timers. Empty whenever the profiler is disabled.
    pub fn last_time(&self) -> LastTimeMap {
        self.inner.state.borrow().last_time.clone()
    }

    /// Usage warnings emitted so far.
    pub fn warnings(&self) -> Vec<UsageWarning> {
        self.inner.state.borrow().warnings.clone()
    }

    /// Whether this profiler is currently installed in the thread's trace hook.
    pub fn is_installed(&self) -> bool {
        hook::is_installed(self.inner.id)
    }

    /// Discards all recorded timings. Registrations are kept.
    pub fn reset(&self) {
        let mut state = self.inner.state.borrow_mut();
        state.code_map.clear_timings();
        state.last_time.clear();
    }
}

impl fmt::Debug for LineProfiler {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("LineProfiler")
            .field("id", &self.inner.id)
            .field("functions", &state.functions.len())
            .field("enable_count", &state.enable_count)
            .finish()
    }
}
