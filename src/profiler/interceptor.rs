use std::time::Instant;

use super::data::LastTime;
use super::{ProfilerInner, ProfilerState};
use crate::runtime::{Code, CodeId, FrameId, TraceEvent, Tracer};

impl Tracer for ProfilerInner {
    fn trace(&self, code: &Code, frame: FrameId, event: TraceEvent) {
        // Read the clock before anything else so bookkeeping is not charged to the line.
        let now = Instant::now();
        if let Ok(mut state) = self.state.try_borrow_mut() {
            state.on_event(code.id(), frame, event, now);
        }
    }
}

impl ProfilerState {
    /// Charges the time since the frame's previous event to the line it was on.
    ///
    /// A `Line` event closes the pending line and opens the new one. `Return` and `Yield` close
    /// the pending line and forget the frame, so time spent while a generator is suspended is
    /// never charged. `Call` and `Resume` start the frame with no pending line.
    pub(super) fn on_event(&mut self, code: CodeId, frame: FrameId, event: TraceEvent, now: Instant) {
        if self.enable_count == 0 || !self.code_map.contains(code) {
            return;
        }
        match event {
            TraceEvent::Call | TraceEvent::Resume => {
                self.last_time.remove(&frame);
            }
            TraceEvent::Line(line) => {
                if let Some(last) = self.last_time.insert(frame, LastTime { line, at: now }) {
                    self.code_map
                        .record_hit(code, last.line, now.saturating_duration_since(last.at));
                }
            }
            TraceEvent::Return | TraceEvent::Yield => {
                if let Some(last) = self.last_time.remove(&frame) {
                    self.code_map
                        .record_hit(code, last.line, now.saturating_duration_since(last.at));
                }
            }
        }
    }
}
