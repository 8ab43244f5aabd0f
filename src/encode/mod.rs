//! Recording sinks.
//!
//! Sinks consume rendered frames in presentation order and finalize an encoded artifact.

/// `ffmpeg`-based sink (MP4/WebM via system `ffmpeg`).
pub mod ffmpeg;
/// Sink trait and the in-memory sink.
pub mod sink;
