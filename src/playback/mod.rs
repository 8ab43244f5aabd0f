//! Live playback.
//!
//! The scheduler is clock-agnostic; `driver` connects it to wall time and a terminal.

pub mod driver;
pub mod scheduler;
pub mod timer;
