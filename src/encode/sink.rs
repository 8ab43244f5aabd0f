use crate::foundation::core::{Fps, FrameRGBA};
use crate::foundation::error::{RsvpError, RsvpResult};

/// Container/codec pair of an exported video.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoFormat {
    /// H.264 in MP4.
    #[default]
    Mp4,
    /// VP9 in WebM.
    Webm,
}

impl VideoFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Webm => "webm",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Mp4 => "video/mp4",
            Self::Webm => "video/webm",
        }
    }
}

impl std::str::FromStr for VideoFormat {
    type Err = RsvpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mp4" => Ok(Self::Mp4),
            "webm" => Ok(Self::Webm),
            other => Err(RsvpError::unavailable(format!(
                "unsupported video format '{other}' (expected mp4 or webm)"
            ))),
        }
    }
}

/// Configuration provided to a [`RecordingSink`] before the first frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SinkConfig {
    pub width: u32,
    pub height: u32,
    pub fps: Fps,
}

/// Consumer of rendered frames during export.
///
/// Ordering contract: `push_frame` is called in presentation order, once per output frame.
/// After `begin` succeeds exactly one of `finish` or `abort` follows.
pub trait RecordingSink: Send {
    /// Prepare for capture. A host that cannot record returns
    /// [`RsvpError::ExportUnavailable`].
    fn begin(&mut self, cfg: &SinkConfig) -> RsvpResult<()>;
    /// Capture one frame.
    fn push_frame(&mut self, frame: &FrameRGBA) -> RsvpResult<()>;
    /// Finalize and return the encoded artifact bytes. Blocks until the encoder is done.
    fn finish(&mut self) -> RsvpResult<Vec<u8>>;
    /// Stop capturing and release resources; no artifact is produced.
    fn abort(&mut self);
    /// Whether the sink samples frames against wall-clock time, so the exporter must pace.
    fn is_live(&self) -> bool {
        false
    }
    fn format(&self) -> VideoFormat;
}

/// In-memory sink for dry runs and tests.
///
/// Keeps frame counts and, optionally, the distinct frames in order of arrival. The
/// artifact it produces is a small JSON summary.
#[derive(Debug, Default)]
pub struct CollectingSink {
    cfg: Option<SinkConfig>,
    live: bool,
    keep_frames: bool,
    frames_pushed: u64,
    frames: Vec<FrameRGBA>,
    aborted: bool,
    finished: bool,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report the sink as live so the exporter paces frames.
    pub fn live(mut self) -> Self {
        self.live = true;
        self
    }

    /// Also store frames whose content differs from the previous one.
    pub fn keeping_frames(mut self) -> Self {
        self.keep_frames = true;
        self
    }

    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    pub fn frames_pushed(&self) -> u64 {
        self.frames_pushed
    }

    /// Distinct consecutive frames, when [`CollectingSink::keeping_frames`] is set.
    pub fn frames(&self) -> &[FrameRGBA] {
        &self.frames
    }

    pub fn was_aborted(&self) -> bool {
        self.aborted
    }

    pub fn was_finished(&self) -> bool {
        self.finished
    }
}

impl RecordingSink for CollectingSink {
    fn begin(&mut self, cfg: &SinkConfig) -> RsvpResult<()> {
        self.cfg = Some(*cfg);
        self.frames_pushed = 0;
        self.frames.clear();
        self.aborted = false;
        self.finished = false;
        Ok(())
    }

    fn push_frame(&mut self, frame: &FrameRGBA) -> RsvpResult<()> {
        let cfg = self
            .cfg
            .ok_or_else(|| RsvpError::sink("collecting sink not started"))?;
        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(RsvpError::sink(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        self.frames_pushed += 1;
        if self.keep_frames && self.frames.last() != Some(frame) {
            self.frames.push(frame.clone());
        }
        Ok(())
    }

    fn finish(&mut self) -> RsvpResult<Vec<u8>> {
        let cfg = self
            .cfg
            .take()
            .ok_or_else(|| RsvpError::sink("collecting sink not started"))?;
        self.finished = true;
        let summary = serde_json::json!({
            "width": cfg.width,
            "height": cfg.height,
            "fps": cfg.fps.0,
            "frames": self.frames_pushed,
        });
        Ok(summary.to_string().into_bytes())
    }

    fn abort(&mut self) {
        self.cfg = None;
        self.aborted = true;
    }

    fn is_live(&self) -> bool {
        self.live
    }

    fn format(&self) -> VideoFormat {
        VideoFormat::Mp4
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
