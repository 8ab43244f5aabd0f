//! Live word display in a terminal.

use std::io::{self, Write};

use crossterm::{
    cursor::MoveTo,
    queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use unicode_width::UnicodeWidthStr;

use crate::{
    playback::scheduler::PlaybackState,
    render::layout::{PartWidths, TextMeasure, word_geometry},
    text::segment::{WordUnit, split_word},
};

use super::cpu::PLACEHOLDER_TEXT;

/// Terminal cells as the measuring unit.
#[derive(Clone, Copy, Debug, Default)]
pub struct CellMeasure;

impl TextMeasure for CellMeasure {
    fn advance(&mut self, text: &str) -> f64 {
        UnicodeWidthStr::width(text) as f64
    }
}

/// One word placed on a terminal row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WordRow<'a> {
    /// Column where the prefix starts.
    pub column: u16,
    pub prefix: &'a str,
    pub focal: &'a str,
    pub suffix: &'a str,
}

/// Place `word` so its focal cell sits in the middle column of a `cols`-wide row.
///
/// Uses the same geometry as the pixel renderer with a zero gap; text left of column 0
/// is trimmed.
pub fn word_row(word: &WordUnit, cols: u16) -> WordRow<'_> {
    let parts = split_word(word);
    let widths = PartWidths::measure(&mut CellMeasure, &parts);
    let center = f64::from(cols / 2) + widths.focal.max(1.0) / 2.0;
    let geometry = word_geometry(center, widths, 0.0);

    let mut prefix = parts.prefix;
    let mut column = geometry.prefix_x.round();
    while column < 0.0 && !prefix.is_empty() {
        let mut chars = prefix.chars();
        let dropped = chars.next().map(|c| c.to_string()).unwrap_or_default();
        prefix = chars.as_str();
        column += CellMeasure.advance(&dropped);
    }

    WordRow {
        column: column.max(0.0) as u16,
        prefix,
        focal: parts.focal,
        suffix: parts.suffix,
    }
}

/// Text-mode progress bar of `width` cells.
pub fn progress_bar(width: usize, fraction: f64) -> String {
    let fraction = if fraction.is_finite() {
        fraction.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let filled = (width as f64 * fraction).round() as usize;
    let mut bar = String::with_capacity(width * 3);
    bar.extend(std::iter::repeat_n('━', filled));
    bar.extend(std::iter::repeat_n('─', width - filled));
    bar
}

/// Values shown on the status row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatusLine {
    pub index: usize,
    pub word_count: usize,
    pub wpm: f64,
    pub state: PlaybackState,
}

/// Redraws the word, progress and status rows of the live view.
#[derive(Clone, Copy, Debug)]
pub struct TerminalPresenter {
    pub zen: bool,
}

impl TerminalPresenter {
    pub fn draw<W: Write>(
        &self,
        out: &mut W,
        size: (u16, u16),
        word: Option<&WordUnit>,
        progress: f64,
        status: &StatusLine,
    ) -> io::Result<()> {
        let (cols, rows) = size;
        let mid = rows / 2;
        queue!(out, Clear(ClearType::All))?;

        if mid >= 2 {
            queue!(
                out,
                MoveTo(cols / 2, mid - 2),
                SetForegroundColor(Color::DarkGrey),
                Print("│"),
                ResetColor
            )?;
        }

        match word {
            None => {
                let w = UnicodeWidthStr::width(PLACEHOLDER_TEXT) as u16;
                queue!(
                    out,
                    MoveTo((cols / 2).saturating_sub(w / 2), mid),
                    SetForegroundColor(Color::DarkGrey),
                    Print(PLACEHOLDER_TEXT),
                    ResetColor
                )?;
            }
            Some(unit) => {
                let row = word_row(unit, cols);
                queue!(
                    out,
                    MoveTo(row.column, mid),
                    SetAttribute(Attribute::Bold),
                    Print(row.prefix),
                    SetForegroundColor(Color::Red),
                    Print(row.focal),
                    ResetColor,
                    SetAttribute(Attribute::Bold),
                    Print(row.suffix),
                    SetAttribute(Attribute::Reset)
                )?;
            }
        }

        if mid + 2 < rows {
            queue!(
                out,
                MoveTo(cols / 2, mid + 2),
                SetForegroundColor(Color::DarkGrey),
                Print("│"),
                ResetColor
            )?;
        }

        let bar_width = usize::from(cols.saturating_sub(4));
        let bar_color = if self.zen { Color::DarkGrey } else { Color::Red };
        queue!(
            out,
            MoveTo(2, rows.saturating_sub(3)),
            SetForegroundColor(bar_color),
            Print(progress_bar(bar_width, progress)),
            ResetColor
        )?;

        if !self.zen {
            let state = match status.state {
                PlaybackState::Idle => "paused",
                PlaybackState::Scheduled => "playing",
                PlaybackState::Finished => "finished",
            };
            let line = format!(
                "{:>4.0} wpm  {}/{}  {state}  [space] play/pause  [←/→] ±10  [↑/↓] speed  [r] reset  [q] quit",
                status.wpm,
                (status.index + 1).min(status.word_count),
                status.word_count,
            );
            queue!(
                out,
                MoveTo(2, rows.saturating_sub(1)),
                SetForegroundColor(Color::DarkGrey),
                Print(line),
                ResetColor
            )?;
        }

        out.flush()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/terminal.rs"]
mod tests;
