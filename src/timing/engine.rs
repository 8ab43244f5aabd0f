//! Reading schedule math shared by live playback and video export.
//!
//! Every on-screen duration in the crate comes from [`interval_for`]; the scheduler and
//! the exporter never compute intervals on their own.

use std::time::Duration;

use crate::{foundation::core::Fps, settings::ReaderSettings, text::segment::WordUnit};

/// Speed in effect while the word at `position` is displayed.
///
/// With the gradual ramp enabled this interpolates linearly from `initial_wpm` at the
/// first word to `target_wpm` at the last, stepped per word.
pub fn effective_wpm(position: usize, word_count: usize, settings: &ReaderSettings) -> f64 {
    if !settings.enable_gradual_increase {
        return f64::from(settings.wpm);
    }
    let r = if word_count <= 1 {
        0.0
    } else {
        position as f64 / (word_count - 1) as f64
    };
    let initial = f64::from(settings.initial_wpm);
    let target = f64::from(settings.target_wpm);
    initial + (target - initial) * r
}

/// Milliseconds the word at `position` stays on screen.
///
/// Inputs are trusted: speeds outside `[100, 1000]` are not clamped here.
pub fn interval_ms(
    position: usize,
    word_count: usize,
    unit: &WordUnit,
    settings: &ReaderSettings,
) -> f64 {
    let base = 60_000.0 / effective_wpm(position, word_count, settings);
    base * unit.pause_weight
}

/// On-screen duration of the word at `position`.
pub fn interval_for(
    position: usize,
    word_count: usize,
    unit: &WordUnit,
    settings: &ReaderSettings,
) -> Duration {
    ms_to_duration(interval_ms(position, word_count, unit, settings))
}

/// Convert fractional milliseconds to a duration, rounded to the nanosecond.
pub fn ms_to_duration(ms: f64) -> Duration {
    Duration::from_nanos((ms.max(0.0) * 1_000_000.0).round() as u64)
}

/// Number of video frames that cover `interval` at `fps`, never fewer than one.
pub fn frames_for_interval(interval: Duration, fps: Fps) -> u32 {
    let ms = interval.as_nanos() as f64 / 1_000_000.0;
    let frames = (ms / fps.frame_ms()).round();
    if frames < 1.0 { 1 } else { frames as u32 }
}

/// Progress shown while the word at `index` is displayed: `(index + 1) / word_count`.
pub fn progress_fraction(index: usize, word_count: usize) -> f64 {
    if word_count == 0 {
        return 0.0;
    }
    ((index + 1) as f64 / word_count as f64).clamp(0.0, 1.0)
}

/// One scheduled word.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ScheduledWord {
    pub index: usize,
    pub text: String,
    pub wpm: f64,
    pub interval_ms: f64,
    /// Offset from the start of reading at which the word appears.
    pub start_ms: f64,
}

/// The complete reading schedule of a word sequence.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct ReadingSchedule {
    pub words: Vec<ScheduledWord>,
    pub total_ms: f64,
}

impl ReadingSchedule {
    pub fn build(words: &[WordUnit], settings: &ReaderSettings) -> Self {
        let n = words.len();
        let mut out = Vec::with_capacity(n);
        let mut start_ms = 0.0;
        for (index, unit) in words.iter().enumerate() {
            let interval = interval_ms(index, n, unit, settings);
            out.push(ScheduledWord {
                index,
                text: unit.text.clone(),
                wpm: effective_wpm(index, n, settings),
                interval_ms: interval,
                start_ms,
            });
            start_ms += interval;
        }
        Self {
            words: out,
            total_ms: start_ms,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timing/engine.rs"]
mod tests;
