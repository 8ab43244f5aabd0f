use std::time::Duration;

use super::*;
use crate::playback::timer::TimerQueue;

fn scheduler(text: &str, wpm: u32) -> PlaybackScheduler<TimerQueue> {
    let mut s = PlaybackScheduler::new(
        TimerQueue::new(),
        ReaderSettings {
            wpm,
            ..ReaderSettings::default()
        },
    );
    s.set_text(text);
    s
}

/// Fire the next armed callback on the virtual clock.
fn fire_next(s: &mut PlaybackScheduler<TimerQueue>) -> bool {
    match s.timer_mut().advance_to_next() {
        Some(id) => s.on_timer(id),
        None => false,
    }
}

fn assert_invariants(s: &PlaybackScheduler<TimerQueue>) {
    assert!(s.timer().pending_count() <= 1);
    assert_eq!(s.timer().pending_count(), usize::from(s.pending_timer().is_some()));
    if !s.words().is_empty() {
        assert!(s.position().index < s.words().len());
    }
}

#[test]
fn plays_one_two_three_in_400ms() {
    let mut s = scheduler("One two three.", 600);
    s.play();
    assert_eq!(s.state(), PlaybackState::Scheduled);

    let mut shown = vec![(s.timer().now(), s.position().index)];
    while s.state() == PlaybackState::Scheduled {
        assert!(fire_next(&mut s));
        shown.push((s.timer().now(), s.position().index));
        assert_invariants(&s);
    }

    assert_eq!(s.state(), PlaybackState::Finished);
    assert_eq!(s.position().index, 2);
    assert!(!s.position().is_playing);
    assert_eq!(
        shown,
        vec![
            (Duration::ZERO, 0),
            (Duration::from_millis(100), 1),
            (Duration::from_millis(200), 2),
            (Duration::from_millis(400), 2),
        ]
    );
}

#[test]
fn play_on_empty_text_stays_idle() {
    let mut s = scheduler("   ", 300);
    s.play();
    assert_eq!(s.state(), PlaybackState::Idle);
    assert_eq!(s.timer().pending_count(), 0);
    assert!(s.current_word().is_none());
    assert_eq!(s.seek(5), 0);
    assert_eq!(s.progress(), 0.0);
}

#[test]
fn play_from_last_word_restarts() {
    let mut s = scheduler("a b c", 300);
    s.seek(10);
    assert_eq!(s.position().index, 2);
    s.play();
    assert_eq!(s.position().index, 0);
    assert_eq!(s.state(), PlaybackState::Scheduled);
}

#[test]
fn pause_cancels_pending_advance() {
    let mut s = scheduler("a b c", 300);
    s.play();
    let armed = s.pending_timer().unwrap();
    s.pause();
    assert_eq!(s.state(), PlaybackState::Idle);
    assert_eq!(s.timer().pending_count(), 0);

    assert!(!s.on_timer(armed));
    assert_eq!(s.position().index, 0);
}

#[test]
fn seek_while_playing_rearms_for_new_position() {
    let mut s = scheduler("a b c d. e", 600);
    s.play();
    let stale = s.pending_timer().unwrap();

    assert_eq!(s.seek(3), 3);
    let fresh = s.pending_timer().unwrap();
    assert_ne!(stale, fresh);
    assert!(!s.on_timer(stale));
    assert_eq!(s.position().index, 3);

    // "d." carries a 2x pause: 200ms at 600 wpm.
    assert_eq!(
        s.timer().next_due().map(|(_, due)| due),
        Some(Duration::from_millis(200))
    );
    assert!(fire_next(&mut s));
    assert_eq!(s.position().index, 4);
    assert_invariants(&s);
}

#[test]
fn seek_clamps_and_keeps_pause_state() {
    let mut s = scheduler("a b c", 300);
    assert_eq!(s.seek(-4), 0);
    assert_eq!(s.seek(1), 1);
    assert_eq!(s.seek(99), 2);
    assert_eq!(s.state(), PlaybackState::Idle);
    assert_eq!(s.timer().pending_count(), 0);
}

#[test]
fn reset_pauses_and_rewinds() {
    let mut s = scheduler("a b c", 300);
    s.play();
    fire_next(&mut s);
    s.reset();
    assert_eq!(s.position(), PlaybackPosition::default());
    assert_eq!(s.state(), PlaybackState::Idle);
    assert_eq!(s.timer().pending_count(), 0);
}

#[test]
fn text_change_cancels_and_resets() {
    let mut s = scheduler("a b c", 300);
    s.play();
    fire_next(&mut s);
    s.set_text("fresh words here");
    assert_eq!(s.position(), PlaybackPosition::default());
    assert_eq!(s.timer().pending_count(), 0);
    assert_eq!(s.current_word().unwrap().text, "fresh");
}

#[test]
fn interval_is_recomputed_every_tick_under_ramp() {
    let mut s = PlaybackScheduler::new(
        TimerQueue::new(),
        ReaderSettings {
            enable_gradual_increase: true,
            initial_wpm: 100,
            target_wpm: 1000,
            ..ReaderSettings::default()
        },
    );
    s.set_text("w w w w w w w w w w");
    s.play();

    let mut last_now = Duration::ZERO;
    let mut gaps = Vec::new();
    while s.state() == PlaybackState::Scheduled {
        fire_next(&mut s);
        gaps.push(s.timer().now() - last_now);
        last_now = s.timer().now();
    }
    assert_eq!(gaps.len(), 10);
    assert_eq!(gaps[0], Duration::from_millis(600));
    assert_eq!(gaps[9], Duration::from_millis(60));
    assert!(gaps.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn wpm_step_while_playing_rearms_with_new_speed() {
    let mut s = scheduler("a b c", 300);
    s.play();
    assert_eq!(s.step_wpm(6), 600);
    assert_eq!(s.timer().pending_count(), 1);
    assert_eq!(
        s.timer().next_due().map(|(_, due)| due),
        Some(Duration::from_millis(100))
    );
}

#[test]
fn random_command_sequences_keep_invariants() {
    let mut s = scheduler("one two three four five six seven. eight, nine ten", 500);
    // Deterministic pseudo-random walk over the command surface.
    let mut state = 0x2545_f491_u64;
    for _ in 0..2_000 {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        match state % 7 {
            0 => s.play(),
            1 => s.pause(),
            2 => {
                s.seek((state % 9) as i64 - 4);
            }
            3 => s.toggle(),
            4 => {
                fire_next(&mut s);
            }
            5 => s.reset(),
            _ => {
                s.step_wpm(if state % 2 == 0 { 1 } else { -1 });
            }
        }
        assert_invariants(&s);
        assert_eq!(
            s.position().is_playing,
            s.state() == PlaybackState::Scheduled
        );
    }
}

#[test]
fn drop_cancels_pending_timer() {
    struct Counting<'a>(&'a std::cell::Cell<i32>, u64);
    impl DeferredTimer for Counting<'_> {
        fn schedule_once(&mut self, _delay: Duration) -> TimerId {
            self.0.set(self.0.get() + 1);
            self.1 += 1;
            TimerId(self.1)
        }
        fn cancel(&mut self, _id: TimerId) {
            self.0.set(self.0.get() - 1);
        }
    }

    let outstanding = std::cell::Cell::new(0);
    {
        let mut s = PlaybackScheduler::new(Counting(&outstanding, 0), ReaderSettings::default());
        s.set_text("a b");
        s.play();
        assert_eq!(outstanding.get(), 1);
    }
    assert_eq!(outstanding.get(), 0);
}
