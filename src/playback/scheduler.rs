use crate::{
    playback::timer::{DeferredTimer, TimerId},
    settings::ReaderSettings,
    text::segment::{WordUnit, segment},
    timing::engine::{interval_for, progress_fraction},
};

/// Playback state machine states.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum PlaybackState {
    /// Not playing, any index.
    Idle,
    /// Playing; exactly one deferred advance is armed.
    Scheduled,
    /// Stopped on the last word after it ran its full interval.
    Finished,
}

/// Current reading position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct PlaybackPosition {
    pub index: usize,
    pub is_playing: bool,
}

/// Live playback controller.
///
/// Owns the position and at most one armed deferred advance. Every transition that
/// interrupts playback cancels the armed advance before touching the position, so a
/// stale callback can never move the index.
pub struct PlaybackScheduler<T: DeferredTimer> {
    words: Vec<WordUnit>,
    settings: ReaderSettings,
    index: usize,
    state: PlaybackState,
    pending: Option<TimerId>,
    timer: T,
}

impl<T: DeferredTimer> PlaybackScheduler<T> {
    pub fn new(timer: T, settings: ReaderSettings) -> Self {
        Self {
            words: Vec::new(),
            settings,
            index: 0,
            state: PlaybackState::Idle,
            pending: None,
            timer,
        }
    }

    /// Replace the source text; the sequence is rebuilt and the position reset.
    pub fn set_text(&mut self, text: &str) {
        self.set_words(segment(text));
    }

    pub fn set_words(&mut self, words: Vec<WordUnit>) {
        self.cancel_pending();
        self.words = words;
        self.index = 0;
        self.state = PlaybackState::Idle;
        tracing::debug!(words = self.words.len(), "playback text replaced");
    }

    /// Swap settings; a playing scheduler re-arms with the new interval.
    pub fn set_settings(&mut self, settings: ReaderSettings) {
        self.settings = settings;
        if self.state == PlaybackState::Scheduled {
            self.cancel_pending();
            self.arm();
        }
    }

    /// Jump `wpm` by `steps` of the configured jump step.
    pub fn step_wpm(&mut self, steps: i32) -> u32 {
        let wpm = self.settings.stepped_wpm(steps);
        let settings = ReaderSettings {
            wpm,
            ..self.settings.clone()
        };
        self.set_settings(settings);
        wpm
    }

    pub fn play(&mut self) {
        if self.words.is_empty() || self.state == PlaybackState::Scheduled {
            return;
        }
        if self.index + 1 >= self.words.len() {
            self.index = 0;
        }
        self.state = PlaybackState::Scheduled;
        self.arm();
    }

    pub fn pause(&mut self) {
        self.cancel_pending();
        self.state = PlaybackState::Idle;
    }

    pub fn toggle(&mut self) {
        if self.state == PlaybackState::Scheduled {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Move by `delta` words, clamped into the sequence. Play state is kept.
    pub fn seek(&mut self, delta: i64) -> usize {
        if self.words.is_empty() {
            return 0;
        }
        let last = (self.words.len() - 1) as i64;
        let target = (self.index as i64).saturating_add(delta).clamp(0, last) as usize;

        let playing = self.state == PlaybackState::Scheduled;
        self.cancel_pending();
        self.index = target;
        if playing {
            self.arm();
        } else {
            self.state = PlaybackState::Idle;
        }
        self.index
    }

    pub fn reset(&mut self) {
        self.pause();
        self.index = 0;
    }

    /// Deliver a fired deferred callback. Returns `true` if it advanced playback.
    ///
    /// Ids other than the armed one are stale and ignored.
    pub fn on_timer(&mut self, id: TimerId) -> bool {
        if self.pending != Some(id) {
            tracing::trace!(?id, "ignoring stale playback timer");
            return false;
        }
        self.pending = None;

        if self.index + 1 >= self.words.len() {
            self.state = PlaybackState::Finished;
            tracing::debug!(index = self.index, "playback finished");
            return true;
        }
        self.index += 1;
        self.arm();
        true
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn position(&self) -> PlaybackPosition {
        PlaybackPosition {
            index: self.index,
            is_playing: self.state == PlaybackState::Scheduled,
        }
    }

    pub fn words(&self) -> &[WordUnit] {
        &self.words
    }

    pub fn current_word(&self) -> Option<&WordUnit> {
        self.words.get(self.index)
    }

    /// Fraction shown by the progress indicator, identical to the exported video's.
    pub fn progress(&self) -> f64 {
        progress_fraction(self.index, self.words.len())
    }

    pub fn settings(&self) -> &ReaderSettings {
        &self.settings
    }

    /// The armed deferred callback, if any.
    pub fn pending_timer(&self) -> Option<TimerId> {
        self.pending
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }

    fn arm(&mut self) {
        debug_assert!(self.pending.is_none());
        let Some(unit) = self.words.get(self.index) else {
            self.state = PlaybackState::Idle;
            return;
        };
        let delay = interval_for(self.index, self.words.len(), unit, &self.settings);
        self.pending = Some(self.timer.schedule_once(delay));
        self.state = PlaybackState::Scheduled;
    }

    fn cancel_pending(&mut self) {
        if let Some(id) = self.pending.take() {
            self.timer.cancel(id);
        }
    }
}

impl<T: DeferredTimer> Drop for PlaybackScheduler<T> {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/scheduler.rs"]
mod tests;
