use std::time::Duration;

use crate::foundation::error::{RsvpError, RsvpResult};

pub use kurbo::{Point, Rect};

/// Output frame rate in whole frames per second.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps(pub u32);

impl Fps {
    /// Frame rate used by video export unless configured otherwise.
    pub const DEFAULT: Fps = Fps(60);

    /// Validate and build a frame rate.
    pub fn new(fps: u32) -> RsvpResult<Self> {
        if fps == 0 {
            return Err(RsvpError::config("frame rate must be > 0"));
        }
        Ok(Self(fps))
    }

    /// Duration of one frame in milliseconds (`1000 / fps`).
    pub fn frame_ms(self) -> f64 {
        1000.0 / f64::from(self.0)
    }

    /// Presentation time of frame `n` counted from the start of the stream.
    pub fn frames_to_duration(self, frames: u64) -> Duration {
        let nanos = u128::from(frames) * 1_000_000_000 / u128::from(self.0.max(1));
        Duration::from_nanos(nanos.min(u128::from(u64::MAX)) as u64)
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Pixel dimensions of a render target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    /// 720p, the default export size.
    pub const HD: Canvas = Canvas {
        width: 1280,
        height: 720,
    };

    pub fn center(self) -> Point {
        Point::new(f64::from(self.width) / 2.0, f64::from(self.height) / 2.0)
    }
}

/// Straight-alpha RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Same color with alpha scaled by `opacity` (clamped to `[0, 1]`).
    pub fn with_opacity(self, opacity: f32) -> Self {
        let o = opacity.clamp(0.0, 1.0);
        Self {
            a: (f32::from(self.a) * o).round() as u8,
            ..self
        }
    }
}

/// A rendered frame in row-major RGBA8.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    /// Whether `data` carries premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// RGBA bytes of the pixel at `(x, y)`, if inside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 4) as usize;
        self.data.get(i..i + 4).map(|p| [p[0], p[1], p[2], p[3]])
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
