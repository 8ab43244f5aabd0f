//! Word-frame geometry shared by the pixel renderer and the terminal presenter.
//!
//! Positions depend only on measured advances, never on colors or opacity, so the focal
//! character lands on the same x coordinate for every word.

use crate::{
    foundation::core::{Canvas, Rect},
    text::segment::WordParts,
};

/// Text measurement injected into layout.
pub trait TextMeasure {
    /// Horizontal advance of `text` in layout units.
    fn advance(&mut self, text: &str) -> f64;
}

/// Measured advances of the three zones of a word.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PartWidths {
    pub prefix: f64,
    pub focal: f64,
    pub suffix: f64,
}

impl PartWidths {
    pub fn measure<M: TextMeasure + ?Sized>(measure: &mut M, parts: &WordParts<'_>) -> Self {
        let mut advance = |s: &str| if s.is_empty() { 0.0 } else { measure.advance(s) };
        Self {
            prefix: advance(parts.prefix),
            focal: advance(parts.focal),
            suffix: advance(parts.suffix),
        }
    }
}

/// Horizontal placement of a word around a fixed focal x.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WordGeometry {
    /// Left edge of the prefix; the prefix ends at `slot_left - gap`.
    pub prefix_x: f64,
    /// Left edge of the focal slot.
    pub slot_left: f64,
    pub slot_width: f64,
    /// Left edge of the suffix.
    pub suffix_x: f64,
}

impl WordGeometry {
    pub fn slot_center(&self) -> f64 {
        self.slot_left + self.slot_width / 2.0
    }

    pub fn slot_right(&self) -> f64 {
        self.slot_left + self.slot_width
    }
}

/// Place prefix, focal slot and suffix so that the slot is centered on `center_x`.
pub fn word_geometry(center_x: f64, widths: PartWidths, gap: f64) -> WordGeometry {
    let slot_left = center_x - widths.focal / 2.0;
    let slot_right = slot_left + widths.focal;
    WordGeometry {
        prefix_x: slot_left - gap - widths.prefix,
        slot_left,
        slot_width: widths.focal,
        suffix_x: slot_right + gap,
    }
}

/// Sizes of the word-frame decorations, in pixels at the frame's canvas size.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FrameStyle {
    pub canvas: Canvas,
    pub font_size_px: f32,
    /// Distance from the focal slot to prefix and suffix.
    pub focal_gap_px: f64,
    pub progress_margin_px: f64,
    /// Distance from the bottom edge to the top of the progress bar.
    pub progress_bottom_px: f64,
    pub progress_height_px: f64,
    /// Vertical guide ticks above and below the focal slot.
    pub show_guides: bool,
    pub guide_length_px: f64,
    pub zen: bool,
}

impl FrameStyle {
    /// Reference 1280x720 layout, scaled to `canvas`.
    pub fn for_canvas(canvas: Canvas, zen: bool) -> Self {
        let scale = f64::from(canvas.height) / 720.0;
        let font_size = if zen { 144.0 } else { 120.0 } * scale;
        Self {
            canvas,
            font_size_px: font_size as f32,
            focal_gap_px: font_size / 30.0,
            progress_margin_px: 100.0 * scale,
            progress_bottom_px: 40.0 * scale,
            progress_height_px: if zen { 2.0 } else { 4.0 } * scale,
            show_guides: !zen,
            guide_length_px: 24.0 * scale,
            zen,
        }
    }
}

impl Default for FrameStyle {
    fn default() -> Self {
        Self::for_canvas(Canvas::HD, false)
    }
}

/// Track and fill rectangles of the progress indicator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProgressGeometry {
    pub track: Rect,
    pub fill: Rect,
}

pub fn progress_geometry(style: &FrameStyle, fraction: f64) -> ProgressGeometry {
    let w = f64::from(style.canvas.width);
    let h = f64::from(style.canvas.height);
    let x0 = style.progress_margin_px.min(w / 2.0);
    let x1 = (w - style.progress_margin_px).max(x0);
    let y0 = h - style.progress_bottom_px;
    let y1 = y0 + style.progress_height_px;
    let fraction = if fraction.is_finite() {
        fraction.clamp(0.0, 1.0)
    } else {
        0.0
    };
    ProgressGeometry {
        track: Rect::new(x0, y0, x1, y1),
        fill: Rect::new(x0, y0, x0 + (x1 - x0) * fraction, y1),
    }
}

/// Guide tick rectangles above and below the focal slot, centered on `center_x`.
pub fn guide_geometry(style: &FrameStyle, center_x: f64, text_height: f64) -> [Rect; 2] {
    let cy = style.canvas.center().y;
    let half = text_height / 2.0 + style.guide_length_px / 2.0;
    let top_y1 = cy - half;
    let bottom_y0 = cy + half;
    [
        Rect::new(center_x - 0.5, top_y1 - style.guide_length_px, center_x + 0.5, top_y1),
        Rect::new(
            center_x - 0.5,
            bottom_y0,
            center_x + 0.5,
            bottom_y0 + style.guide_length_px,
        ),
    ]
}

#[cfg(test)]
#[path = "../../tests/unit/render/layout.rs"]
mod tests;
