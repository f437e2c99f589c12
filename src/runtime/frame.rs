use std::cell::Cell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::hook::{dispatch, TraceEvent};
use super::Code;

static NEXT_FRAME_ID: AtomicU64 = AtomicU64::new(0);

/// Identity of one live activation. A generator keeps the same `FrameId` across all of its
/// resumptions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(u64);

impl FrameId {
    pub fn new() -> Self {
        FrameId(NEXT_FRAME_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for FrameId {
    fn default() -> Self {
        Self::new()
    }
}

/// A running activation of some [`Code`]. Creating a frame reports a call (or resume) to the
/// trace hook, [`Frame::line`] reports each line as it starts, and dropping the frame reports the
/// exit. The exit is reported during unwinding too.
///
/// ```
/// use lineprof::runtime::Frame;
///
/// let code = lineprof::code!("add_ten");
/// let add_ten = |x: i64| {
///     let frame = Frame::enter(&code);
///     frame.line(line!());
///     let y = x + 10;
///     frame.line(line!());
///     y
/// };
/// assert_eq!(add_ten(10), 20);
/// ```
pub struct Frame {
    code: Rc<Code>,
    id: FrameId,
    exit: Cell<TraceEvent>,
}

impl Frame {
    /// Starts a new activation of `code`.
    pub fn enter(code: &Rc<Code>) -> Self {
        let frame = Frame {
            code: Rc::clone(code),
            id: FrameId::new(),
            exit: Cell::new(TraceEvent::Return),
        };
        dispatch(code, frame.id, TraceEvent::Call);
        frame
    }

    /// Continues the suspended activation `id` of `code`.
    pub(crate) fn resume(code: &Rc<Code>, id: FrameId) -> Self {
        dispatch(code, id, TraceEvent::Resume);
        Frame {
            code: Rc::clone(code),
            id,
            exit: Cell::new(TraceEvent::Return),
        }
    }

    /// Reports that execution has reached `line`.
    #[inline]
    pub fn line(&self, line: u32) {
        dispatch(&self.code, self.id, TraceEvent::Line(line));
    }

    pub fn id(&self) -> FrameId {
        self.id
    }

    pub fn code(&self) -> &Rc<Code> {
        &self.code
    }

    /// Marks this activation as suspended rather than finished.
    pub(crate) fn suspend(&self) {
        self.exit.set(TraceEvent::Yield);
    }
}

impl Drop for Frame {
    fn drop(&mut self) {
        dispatch(&self.code, self.id, self.exit.get());
    }
}
