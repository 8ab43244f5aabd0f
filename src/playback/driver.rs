//! Real-time terminal playback loop.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use anyhow::Context as _;
use crossterm::{
    cursor::{Hide, Show},
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};

use crate::{
    foundation::error::RsvpResult,
    playback::scheduler::PlaybackScheduler,
    playback::timer::TimerQueue,
    render::terminal::{StatusLine, TerminalPresenter},
    settings::ReaderSettings,
    text::segment::WordUnit,
    timing::engine::effective_wpm,
};

/// Words skipped by one seek key press.
pub const SEEK_STEP: i64 = 10;

/// Longest wait between redraws when nothing is scheduled.
const IDLE_POLL: Duration = Duration::from_millis(250);

/// A user action on the live view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Toggle,
    Seek(i64),
    StepWpm(i32),
    Reset,
    Quit,
}

impl Command {
    pub fn from_key(key: &KeyEvent) -> Option<Self> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        match key.code {
            KeyCode::Char(' ') => Some(Self::Toggle),
            KeyCode::Left => Some(Self::Seek(-SEEK_STEP)),
            KeyCode::Right => Some(Self::Seek(SEEK_STEP)),
            KeyCode::Up => Some(Self::StepWpm(1)),
            KeyCode::Down => Some(Self::StepWpm(-1)),
            KeyCode::Char('r') | KeyCode::Char('R') => Some(Self::Reset),
            KeyCode::Char('q') | KeyCode::Esc => Some(Self::Quit),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Self::Quit)
            }
            _ => None,
        }
    }
}

/// Apply `cmd`. Returns `false` when playback should end.
pub fn apply(scheduler: &mut PlaybackScheduler<TimerQueue>, cmd: Command) -> bool {
    match cmd {
        Command::Toggle => scheduler.toggle(),
        Command::Seek(delta) => {
            scheduler.seek(delta);
        }
        Command::StepWpm(steps) => {
            let wpm = scheduler.step_wpm(steps);
            tracing::debug!(wpm, "speed changed");
        }
        Command::Reset => scheduler.reset(),
        Command::Quit => return false,
    }
    true
}

/// Fire every callback due at `now`. Returns whether anything advanced.
pub fn fire_due(scheduler: &mut PlaybackScheduler<TimerQueue>, now: Duration) -> bool {
    scheduler.timer_mut().set_now(now);
    let mut advanced = false;
    while let Some(id) = scheduler.timer_mut().pop_due() {
        advanced |= scheduler.on_timer(id);
    }
    advanced
}

fn status_line(scheduler: &PlaybackScheduler<TimerQueue>) -> StatusLine {
    let position = scheduler.position();
    let count = scheduler.words().len();
    StatusLine {
        index: position.index,
        word_count: count,
        wpm: effective_wpm(position.index, count, scheduler.settings()),
        state: scheduler.state(),
    }
}

/// Restores the terminal on every exit path.
struct TerminalGuard;

impl TerminalGuard {
    fn enter(out: &mut impl Write) -> RsvpResult<Self> {
        terminal::enable_raw_mode().context("enable raw mode")?;
        let guard = Self;
        execute!(out, EnterAlternateScreen, Hide).context("enter alternate screen")?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

/// Run interactive playback until the user quits.
///
/// Starts playing immediately when `autoplay` is set.
pub fn run_terminal(
    words: Vec<WordUnit>,
    settings: ReaderSettings,
    autoplay: bool,
) -> RsvpResult<()> {
    let presenter = TerminalPresenter {
        zen: settings.zen_mode,
    };
    let mut scheduler = PlaybackScheduler::new(TimerQueue::new(), settings);
    scheduler.set_words(words);
    if autoplay {
        scheduler.play();
    }

    let mut out = io::stdout();
    let _guard = TerminalGuard::enter(&mut out)?;
    let origin = Instant::now();
    tracing::info!(words = scheduler.words().len(), "live playback started");

    loop {
        fire_due(&mut scheduler, origin.elapsed());
        let size = terminal::size().context("query terminal size")?;
        presenter
            .draw(
                &mut out,
                size,
                scheduler.current_word(),
                scheduler.progress(),
                &status_line(&scheduler),
            )
            .context("draw frame")?;

        let wait = match scheduler.timer().next_due() {
            Some((_, due)) => due.saturating_sub(origin.elapsed()).min(IDLE_POLL),
            None => IDLE_POLL,
        };
        if !event::poll(wait).context("poll terminal events")? {
            continue;
        }
        if let Event::Key(key) = event::read().context("read terminal event")?
            && let Some(cmd) = Command::from_key(&key)
        {
            // Deadlines that passed while waiting fire before the command applies.
            fire_due(&mut scheduler, origin.elapsed());
            if !apply(&mut scheduler, cmd) {
                break;
            }
        }
    }

    tracing::info!(index = scheduler.position().index, "live playback stopped");
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/playback/driver.rs"]
mod tests;
