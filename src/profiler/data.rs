use std::time::{Duration, Instant};

use indexmap::IndexMap;

use crate::runtime::{CodeId, FrameId};
use crate::HashMap;

/// Accumulated cost of one line of one function.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Timing {
    pub hits: u64,
    pub total_time: Duration,
}

impl Timing {
    fn hit(&mut self, elapsed: Duration) {
        self.hits += 1;
        self.total_time += elapsed;
    }
}

/// Line number to [`Timing`], in the order the lines first ran.
pub type TimingTable = IndexMap<u32, Timing>;

/// The line a frame is currently on and when it got there.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LastTime {
    pub line: u32,
    pub at: Instant,
}

/// Timing tables of every registered code, in registration order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CodeMap {
    tables: IndexMap<CodeId, TimingTable>,
}

impl CodeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the table for `code`, creating an empty one if needed.
    pub fn get_or_create(&mut self, code: CodeId) -> &mut TimingTable {
        self.tables.entry(code).or_default()
    }

    /// Charges `elapsed` to one execution of `line`. Unknown code is ignored.
    pub fn record_hit(&mut self, code: CodeId, line: u32, elapsed: Duration) {
        if let Some(table) = self.tables.get_mut(&code) {
            table.entry(line).or_default().hit(elapsed);
        }
    }

    pub fn contains(&self, code: CodeId) -> bool {
        self.tables.contains_key(&code)
    }

    pub fn get(&self, code: CodeId) -> Option<&TimingTable> {
        self.tables.get(&code)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CodeId, &TimingTable)> {
        self.tables.iter()
    }

    /// Forgets every recorded line but keeps the registered codes.
    pub fn clear_timings(&mut self) {
        for table in self.tables.values_mut() {
            table.clear();
        }
    }
}

/// Per-frame timers of a profiler. Empty whenever the profiler is disabled.
pub type LastTimeMap = HashMap<FrameId, LastTime>;
