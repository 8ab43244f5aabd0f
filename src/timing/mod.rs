/// Per-word intervals and the reading schedule.
pub mod engine;
