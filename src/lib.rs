//! A line-by-line execution profiler
//!
//! lineprof records, for each line of the functions you register with it, how many times the
//! line executed and how much wall-clock time was spent on it. Programs take part by running
//! their code through the small instrumented runtime in [`runtime`]: a [`runtime::Function`] or
//! [`runtime::GeneratorFunction`] opens a [`runtime::Frame`] per activation and reports each line
//! it reaches through the thread's trace hook. A [`LineProfiler`] attaches to that hook while it
//! is enabled and turns the stream of events into per-line timing tables.
//!
//! The main pieces are:
//! * [`runtime`]: code objects, frames, functions, generators and the trace hook
//! * [`profiler`]: the profiler itself, its timing tables, counted enable/disable with scoped
//!   [`Session`]s, and wrapping of functions and generators so every call is profiled
//! * [`stats`]: self-contained snapshots of the recorded timings, rendered as an annotated
//!   listing and persisted as JSON; the `lprof` binary prints saved snapshots
//! * [`log`]: the crate's internal logging, off by default
pub mod error;
pub mod hashing;
pub mod log;
pub mod profiler;
pub mod runtime;
pub mod stats;

pub use error::LineProfError;
pub use hashing::{HashMap, HashSet};
pub use profiler::{LineProfiler, Session, Timing, TimingTable, UsageWarning};
pub use stats::{dump_stats, load_stats, show_text, LineStats, ReportOptions};
