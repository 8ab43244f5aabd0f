use std::io::{Read, Write as _};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use crate::encode::sink::{RecordingSink, SinkConfig, VideoFormat};
use crate::foundation::core::FrameRGBA;
use crate::foundation::error::{RsvpError, RsvpResult};

/// Options for [`FfmpegSink`].
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    pub format: VideoFormat,
    /// Background color used to flatten alpha (RGBA8, straight alpha).
    pub bg_rgba: [u8; 4],
    /// Directory for the intermediate encoded file.
    pub scratch_dir: PathBuf,
    /// Target bitrate for WebM output, in bits per second.
    pub webm_bitrate: u32,
}

impl FfmpegSinkOpts {
    pub fn new(format: VideoFormat) -> Self {
        Self {
            format,
            bg_rgba: [0, 0, 0, 255],
            scratch_dir: std::env::temp_dir(),
            webm_bitrate: 5_000_000,
        }
    }
}

/// Sink that spawns the system `ffmpeg` and streams raw frames to its stdin.
///
/// ffmpeg writes into a scratch file that `finish` reads back and removes. Frame timing
/// comes from the input frame count, so the sink is not live.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,
    out: TempFileGuard,

    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
}

impl FfmpegSink {
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            out: TempFileGuard(None),
            scratch: Vec::new(),
            cfg: None,
        }
    }

    fn scratch_path(&self) -> PathBuf {
        self.opts.scratch_dir.join(format!(
            "focus_rsvp_export_{}_{}.{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or(0),
            self.opts.format.extension()
        ))
    }

    fn join_stderr(&mut self) -> RsvpResult<Vec<u8>> {
        match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| RsvpError::sink("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| RsvpError::sink(format!("ffmpeg stderr read failed: {e}"))),
            None => Ok(Vec::new()),
        }
    }
}

impl RecordingSink for FfmpegSink {
    fn begin(&mut self, cfg: &SinkConfig) -> RsvpResult<()> {
        if cfg.fps.0 == 0 {
            return Err(RsvpError::unavailable("fps must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(RsvpError::unavailable(
                "ffmpeg sink width/height must be non-zero",
            ));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(RsvpError::unavailable(
                "ffmpeg sink width/height must be even (required for yuv420p output)",
            ));
        }
        if !is_ffmpeg_on_path() {
            return Err(RsvpError::unavailable(
                "ffmpeg is required for video export, but was not found on PATH",
            ));
        }

        ensure_dir(&self.opts.scratch_dir)?;
        let out_path = self.scratch_path();

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd.args([
            "-y",
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
            "-r",
            &cfg.fps.0.to_string(),
            "-i",
            "pipe:0",
            "-an",
        ]);
        match self.opts.format {
            VideoFormat::Mp4 => {
                cmd.args([
                    "-c:v",
                    "libx264",
                    "-pix_fmt",
                    "yuv420p",
                    "-movflags",
                    "+faststart",
                ]);
            }
            VideoFormat::Webm => {
                cmd.args([
                    "-c:v",
                    "libvpx-vp9",
                    "-b:v",
                    &self.opts.webm_bitrate.to_string(),
                    "-pix_fmt",
                    "yuv420p",
                ]);
            }
        }
        cmd.arg(&out_path);

        let mut child = cmd.spawn().map_err(|e| {
            RsvpError::unavailable(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;
        // From here on the guard owns whatever ffmpeg writes.
        self.out = TempFileGuard(Some(out_path));

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| RsvpError::sink("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| RsvpError::sink("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        tracing::debug!(
            width = cfg.width,
            height = cfg.height,
            fps = cfg.fps.0,
            format = ?self.opts.format,
            "ffmpeg sink started"
        );

        self.scratch = vec![0u8; (cfg.width * cfg.height * 4) as usize];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(*cfg);
        Ok(())
    }

    fn push_frame(&mut self, frame: &FrameRGBA) -> RsvpResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| RsvpError::sink("ffmpeg sink not started"))?;
        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(RsvpError::sink(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        if frame.data.len() != self.scratch.len() {
            return Err(RsvpError::sink(
                "frame.data size mismatch with width*height*4",
            ));
        }

        if frame.premultiplied {
            flatten_premul_over_bg_to_opaque_rgba8(&mut self.scratch, &frame.data, self.opts.bg_rgba)?;
        } else {
            flatten_straight_over_bg_to_opaque_rgba8(
                &mut self.scratch,
                &frame.data,
                self.opts.bg_rgba,
            )?;
        }

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(RsvpError::sink("ffmpeg sink is already finalized"));
        };
        stdin
            .write_all(&self.scratch)
            .map_err(|e| RsvpError::sink(format!("failed to write frame to ffmpeg stdin: {e}")))?;
        Ok(())
    }

    fn finish(&mut self) -> RsvpResult<Vec<u8>> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| RsvpError::sink("ffmpeg sink not started"))?;

        let status = child
            .wait()
            .map_err(|e| RsvpError::sink(format!("failed to wait for ffmpeg to finish: {e}")))?;
        let stderr_bytes = self.join_stderr()?;
        self.cfg = None;

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(RsvpError::sink(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        let path = self
            .out
            .0
            .as_deref()
            .ok_or_else(|| RsvpError::sink("ffmpeg output path missing"))?;
        let bytes = std::fs::read(path).map_err(|e| {
            RsvpError::sink(format!("failed to read encoded output '{}': {e}", path.display()))
        })?;
        self.out.release();
        tracing::debug!(bytes = bytes.len(), "ffmpeg sink finished");
        Ok(bytes)
    }

    fn abort(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        let _ = self.join_stderr();
        self.cfg = None;
        self.out.release();
        tracing::debug!("ffmpeg sink aborted");
    }

    fn format(&self) -> VideoFormat {
        self.opts.format
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        if self.child.is_some() {
            self.abort();
        }
    }
}

/// Removes the wrapped file when dropped.
struct TempFileGuard(Option<PathBuf>);

impl TempFileGuard {
    fn release(&mut self) {
        if let Some(path) = self.0.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        self.release();
    }
}

fn flatten_premul_over_bg_to_opaque_rgba8(
    dst: &mut [u8],
    src_premul: &[u8],
    bg_rgba: [u8; 4],
) -> RsvpResult<()> {
    if dst.len() != src_premul.len() || !dst.len().is_multiple_of(4) {
        return Err(RsvpError::sink(
            "flatten_premul_over_bg_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    let bg_r = bg_rgba[0] as u16;
    let bg_g = bg_rgba[1] as u16;
    let bg_b = bg_rgba[2] as u16;

    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        let a = s[3] as u16;
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }

        let inv = 255u16 - a;
        d[0] = (s[0] as u16 + mul_div255(bg_r, inv)).min(255) as u8;
        d[1] = (s[1] as u16 + mul_div255(bg_g, inv)).min(255) as u8;
        d[2] = (s[2] as u16 + mul_div255(bg_b, inv)).min(255) as u8;
        d[3] = 255;
    }

    Ok(())
}

fn flatten_straight_over_bg_to_opaque_rgba8(
    dst: &mut [u8],
    src: &[u8],
    bg_rgba: [u8; 4],
) -> RsvpResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(RsvpError::sink(
            "flatten_straight_over_bg_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = s[3] as u16;
        let inv = 255u16 - a;
        for c in 0..3 {
            d[c] = (mul_div255(s[c] as u16, a) + mul_div255(bg_rgba[c] as u16, inv)).min(255) as u8;
        }
        d[3] = 255;
    }

    Ok(())
}

fn mul_div255(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

fn ensure_dir(dir: &Path) -> RsvpResult<()> {
    use anyhow::Context as _;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create directory '{}'", dir.display()))?;
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    std::process::Command::new("ffmpeg")
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
