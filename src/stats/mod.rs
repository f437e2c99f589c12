//! Snapshots of recorded timings, and the ways to present and persist them.
//!
//! [`LineProfiler::get_stats`] turns the live timing tables into a [`LineStats`] value that no
//! longer refers to the runtime: each registered function is described by its file, first line
//! and name, and each executed line by its hit count and total time in integer ticks of
//! [`LineStats::unit`] seconds. A `LineStats` can be printed as an annotated listing
//! ([`show_text`]) and written to or read from a JSON file ([`dump_stats`], [`load_stats`]).
//!
//! ## Example console output
//! ```text
//! Timer unit: 1e-6 s
//!
//! Total time: 0.000213 s
//! File: src/lib.rs
//! Function: f at line 12
//!
//!  Line #  Hits  Time  Per Hit  % Time  Line Contents
//! ===================================================
//!      12                               let f = Function::new(code!("f"), |frame, x: i64| {
//!      13     1 201.0    201.0    94.4      frame.line(line!());
//!      14     1  12.0     12.0     5.6      frame.line(line!());
//! ```
mod display;
mod file;

use std::io::{self, Write};
use std::path::Path;

use serde_derive::{Deserialize, Serialize};

pub use display::{format_with_commas, show_text, ReportOptions};
pub use file::{dump_stats, load_stats};

use crate::error::LineProfError;
use crate::LineProfiler;

/// Seconds per tick of recorded time.
pub const TIMER_UNIT: f64 = 1e-9;

/// The recorded cost of one line.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRecord {
    pub line: u32,
    pub hits: u64,
    /// Total time in ticks of [`LineStats::unit`].
    pub time: u64,
}

/// The recorded lines of one function, sorted by line number.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FunctionStats {
    pub filename: String,
    pub first_line: u32,
    pub name: String,
    pub lines: Vec<LineRecord>,
}

impl FunctionStats {
    /// Total ticks over all lines.
    pub fn total_time(&self) -> u64 {
        self.lines.iter().map(|record| record.time).sum()
    }

    pub fn total_hits(&self) -> u64 {
        self.lines.iter().map(|record| record.hits).sum()
    }
}

/// A self-contained copy of everything a profiler recorded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineStats {
    /// Seconds per tick of `time` in every [`LineRecord`].
    pub unit: f64,
    /// One entry per registered function, in registration order.
    pub functions: Vec<FunctionStats>,
}

impl LineStats {
    /// Looks a function up by name. The first match wins.
    pub fn function(&self, name: &str) -> Option<&FunctionStats> {
        self.functions.iter().find(|function| function.name == name)
    }
}

impl LineProfiler {
    /// Takes a snapshot of all recorded timings.
    pub fn get_stats(&self) -> LineStats {
        let code_map = self.code_map();
        let functions = self
            .functions()
            .iter()
            .map(|info| {
                let mut lines: Vec<LineRecord> = code_map
                    .get(info.code_id())
                    .map(|table| {
                        table
                            .iter()
                            .map(|(&line, timing)| LineRecord {
                                line,
                                hits: timing.hits,
                                time: u64::try_from(timing.total_time.as_nanos())
                                    .unwrap_or(u64::MAX),
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                lines.sort_by_key(|record| record.line);
                FunctionStats {
                    filename: info.code().filename().to_string(),
                    first_line: info.code().first_line(),
                    name: info.name().to_string(),
                    lines,
                }
            })
            .collect();
        LineStats {
            unit: TIMER_UNIT,
            functions,
        }
    }

    /// Writes the annotated listing of all recorded timings to `out`.
    ///
    /// # Errors
    ///
    /// Returns any error from writing to `out`.
    pub fn show_text<W: Write>(&self, out: &mut W, options: &ReportOptions) -> io::Result<()> {
        show_text(&self.get_stats(), out, options)
    }

    /// Prints the annotated listing of all recorded timings to stdout.
    pub fn print_stats(&self) {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        if let Err(error) = self.show_text(&mut out, &ReportOptions::default()) {
            log::error!("could not print line profile: {error}");
        }
    }

    /// Writes all recorded timings to `path` as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    pub fn dump_stats<P: AsRef<Path>>(&self, path: P) -> Result<(), LineProfError> {
        dump_stats(&self.get_stats(), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{Code, Function};

    #[test]
    fn stats_follow_registration_and_line_order() {
        let a = Function::new(Code::new("a", "a.rs", 10), |frame, (): ()| {
            frame.line(12);
            frame.line(11);
        });
        let b = Function::new(Code::new("b", "b.rs", 20), |frame, (): ()| frame.line(21));
        let profiler = LineProfiler::with_functions(&[&a, &b]);
        profiler.run(|| a.call(()));

        let stats = profiler.get_stats();
        assert_eq!(stats.unit, TIMER_UNIT);
        let names: Vec<&str> = stats.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);

        let a_stats = stats.function("a").unwrap();
        assert_eq!(a_stats.filename, "a.rs");
        assert_eq!(a_stats.first_line, 10);
        let lines: Vec<u32> = a_stats.lines.iter().map(|record| record.line).collect();
        assert_eq!(lines, vec![11, 12]);
        assert_eq!(a_stats.total_hits(), 2);
        assert!(stats.function("b").unwrap().lines.is_empty());
    }
}
