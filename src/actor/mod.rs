//! The single-threaded arrangement actor and its trace-replay harness.

pub mod arranger;
pub mod replay;

pub use arranger::{Arranger, Command, Event, StackDirection};
pub use replay::{Player, TraceStep};
