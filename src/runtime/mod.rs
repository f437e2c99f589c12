//! The instrumented runtime that profiled code runs on.
//!
//! Rust code does not announce which source line it is executing, so code that should be
//! profiled is written against this small runtime instead:
//!
//! - a [`Code`] describes one function body and gives it a stable [`CodeId`];
//! - a [`Function`] pairs a `Code` with a body and the metadata introspection sees
//!   ([`FunctionInfo`]);
//! - every activation runs in a [`Frame`] that reports `Call`, `Line(n)` and `Return` events;
//! - a [`GeneratorFunction`] produces [`Generator`]s whose resumptions report `Resume` and
//!   `Yield` events against one frame that lives as long as the generator.
//!
//! All events go to the thread's trace hook ([`hook`]), which forwards them to every installed
//! [`Tracer`]. The line profiler is one such tracer.
//!
//! ```
//! use lineprof::runtime::Function;
//!
//! let f = Function::new(lineprof::code!("f"), |frame, x: i64| {
//!     frame.line(line!());
//!     let y = x + 10;
//!     frame.line(line!());
//!     y
//! });
//! assert_eq!(f.call(10), 20);
//! ```
mod code;
mod frame;
mod function;
mod generator;
pub mod hook;

pub use code::{Code, CodeId};
pub use frame::{Frame, FrameId};
pub use function::{Function, FunctionInfo, Profilable};
pub use generator::{
    Generator, GeneratorFunction, GeneratorState, Resume, ResumeGuard, Thrown,
};
pub use hook::{TraceEvent, Tracer, TracerId};
