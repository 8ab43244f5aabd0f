use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
    mpsc::{Receiver, SyncSender, sync_channel},
};
use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::{
    encode::sink::{RecordingSink, SinkConfig, VideoFormat},
    foundation::core::{Canvas, Fps, FrameRGBA},
    foundation::error::{RsvpError, RsvpResult},
    render::backend::{BackendFactory, BackendSpec, FrameBackend},
    render::layout::FrameStyle,
    settings::ReaderSettings,
    text::segment::WordUnit,
    timing::engine::{frames_for_interval, interval_for, progress_fraction},
};

/// Whether the consumer waits on wall-clock deadlines between frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Pacing {
    /// Pace only when the sink reports itself live.
    #[default]
    Auto,
    RealTime,
    Unpaced,
}

#[derive(Clone, Debug)]
pub struct RenderThreading {
    /// Render words of a chunk in parallel on a rayon pool.
    pub parallel: bool,
    /// Words per parallel chunk.
    pub chunk_size: usize,
    pub threads: Option<usize>,
}

impl Default for RenderThreading {
    fn default() -> Self {
        Self {
            parallel: false,
            chunk_size: 16,
            threads: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ExportOptions {
    pub canvas: Canvas,
    pub fps: Fps,
    /// Hold after the last frame of a paced export before finalizing.
    pub flush_margin: Duration,
    pub pacing: Pacing,
    /// Capacity of the renderer-to-sink channel, in words.
    pub queue_depth: usize,
    pub threading: RenderThreading,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            canvas: Canvas::HD,
            fps: Fps::DEFAULT,
            flush_margin: Duration::from_millis(500),
            pacing: Pacing::Auto,
            queue_depth: 4,
            threading: RenderThreading::default(),
        }
    }
}

/// Immutable view of a running export.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExportProgress {
    /// Index of the word whose frames were just pushed.
    pub word_index: usize,
    pub word_count: usize,
    pub frames_pushed: u64,
    /// Frames the current word occupied.
    pub word_frames: u32,
    /// `round(100 * (word_index + 1) / word_count)`.
    pub percent: u8,
}

/// Cooperative cancellation flag shared with an export.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A finished video.
#[derive(Clone, Debug)]
pub struct ExportArtifact {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
    pub format: VideoFormat,
    pub frames: u64,
    /// Presentation length of the pushed frames.
    pub duration: Duration,
}

/// `focus-rsvp-<wpm>wpm-<YYYY-MM-DD>-<HH-MM-SS>.<ext>`
pub fn artifact_filename(
    settings: &ReaderSettings,
    format: VideoFormat,
    timestamp: chrono::NaiveDateTime,
) -> String {
    format!(
        "focus-rsvp-{}wpm-{}.{}",
        settings.display_wpm(),
        timestamp.format("%Y-%m-%d-%H-%M-%S"),
        format.extension()
    )
}

/// Frames each word occupies at `fps`.
pub fn plan_frames(words: &[WordUnit], settings: &ReaderSettings, fps: Fps) -> Vec<u32> {
    let n = words.len();
    words
        .iter()
        .enumerate()
        .map(|(i, unit)| frames_for_interval(interval_for(i, n, unit, settings), fps))
        .collect()
}

/// Rendered frame of one word plus how often it repeats.
struct WordFrame {
    index: usize,
    frame: FrameRGBA,
    repeats: u32,
}

/// Per-export bookkeeping; only snapshots leave the exporter.
struct ExportJob {
    word_count: usize,
    word_index: usize,
    frame_in_word: u32,
    frames_pushed: u64,
}

impl ExportJob {
    fn snapshot(&self) -> ExportProgress {
        let percent = (100.0 * (self.word_index + 1) as f64 / self.word_count as f64).round();
        ExportProgress {
            word_index: self.word_index,
            word_count: self.word_count,
            frames_pushed: self.frames_pushed,
            word_frames: self.frame_in_word,
            percent: percent.clamp(0.0, 100.0) as u8,
        }
    }
}

/// Clears the exporter's active flag on every exit path.
struct ActiveGuard<'a>(&'a AtomicBool);

impl<'a> ActiveGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> RsvpResult<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| RsvpError::ExportBusy)?;
        Ok(Self(flag))
    }
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Renders a word sequence to video through a [`RecordingSink`].
///
/// Each word is rendered once by a producer thread and pushed `frames_for_interval`
/// times by the calling thread, so the video holds every word exactly as long as live
/// playback does (up to frame quantization). At most one export runs per exporter.
pub struct VideoExporter {
    backends: Box<dyn BackendFactory>,
    active: AtomicBool,
}

impl VideoExporter {
    pub fn new(backends: impl BackendFactory + 'static) -> Self {
        Self {
            backends: Box::new(backends),
            active: AtomicBool::new(false),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    #[tracing::instrument(
        skip_all,
        fields(words = words.len(), fps = opts.fps.0, format = ?sink.format())
    )]
    pub fn export<S, P>(
        &self,
        words: &[WordUnit],
        settings: &ReaderSettings,
        opts: &ExportOptions,
        sink: &mut S,
        mut on_progress: P,
        cancel: &CancelToken,
    ) -> RsvpResult<ExportArtifact>
    where
        S: RecordingSink + ?Sized,
        P: FnMut(ExportProgress),
    {
        if words.is_empty() {
            return Err(RsvpError::NothingToExport);
        }
        let _active = ActiveGuard::acquire(&self.active)?;

        let spec = BackendSpec {
            style: FrameStyle::for_canvas(opts.canvas, settings.zen_mode),
            side_opacity: settings.side_opacity,
        };
        let plan = plan_frames(words, settings, opts.fps);
        let total_frames: u64 = plan.iter().map(|&f| u64::from(f)).sum();

        sink.begin(&SinkConfig {
            width: opts.canvas.width,
            height: opts.canvas.height,
            fps: opts.fps,
        })?;
        let paced = match opts.pacing {
            Pacing::Auto => sink.is_live(),
            Pacing::RealTime => true,
            Pacing::Unpaced => false,
        };
        tracing::info!(total_frames, paced, "export started");

        let (tx, rx) = sync_channel::<RsvpResult<WordFrame>>(opts.queue_depth.max(1));
        let captured = std::thread::scope(|scope| {
            let producer = scope.spawn(|| {
                produce_frames(
                    self.backends.as_ref(),
                    &spec,
                    words,
                    &plan,
                    &opts.threading,
                    cancel,
                    tx,
                )
            });
            let consumed = consume_frames(
                rx,
                sink,
                words.len(),
                opts.fps,
                paced,
                cancel,
                &mut on_progress,
            );
            let produced = producer
                .join()
                .map_err(|_| RsvpError::render("frame producer thread panicked"))?;
            // The producer only fails before sending anything.
            produced.and(consumed)
        });

        let frames = match captured {
            Ok(frames) => frames,
            Err(err) => {
                tracing::warn!(error = %err, "export failed, aborting sink");
                sink.abort();
                return Err(err);
            }
        };

        if paced && !opts.flush_margin.is_zero() {
            std::thread::sleep(opts.flush_margin);
        }
        if cancel.is_cancelled() {
            sink.abort();
            return Err(RsvpError::ExportCancelled);
        }

        let bytes = sink.finish().map_err(into_sink_failure)?;
        let format = sink.format();
        let artifact = ExportArtifact {
            filename: artifact_filename(settings, format, chrono::Local::now().naive_local()),
            bytes,
            mime_type: format.mime_type(),
            format,
            frames,
            duration: opts.fps.frames_to_duration(frames),
        };
        debug_assert_eq!(frames, total_frames);
        tracing::info!(
            filename = %artifact.filename,
            frames,
            bytes = artifact.bytes.len(),
            "export finished"
        );
        Ok(artifact)
    }
}

fn into_sink_failure(err: RsvpError) -> RsvpError {
    match err {
        RsvpError::SinkFailure(_) => err,
        other => RsvpError::sink(other.to_string()),
    }
}

/// Render every word in order and send it down `tx`.
///
/// Errors are sent in-band so the consumer sees them at the right position. Returns
/// early when the receiver hangs up or the export is cancelled.
fn produce_frames(
    backends: &dyn BackendFactory,
    spec: &BackendSpec,
    words: &[WordUnit],
    plan: &[u32],
    threading: &RenderThreading,
    cancel: &CancelToken,
    tx: SyncSender<RsvpResult<WordFrame>>,
) -> RsvpResult<()> {
    let n = words.len();

    if !threading.parallel {
        let mut backend: Box<dyn FrameBackend> = match backends.create(spec) {
            Ok(backend) => backend,
            Err(err) => {
                let _ = tx.send(Err(err));
                return Ok(());
            }
        };
        for (index, unit) in words.iter().enumerate() {
            if cancel.is_cancelled() {
                return Ok(());
            }
            let item = backend
                .render_word(Some(unit), progress_fraction(index, n))
                .map(|frame| WordFrame {
                    index,
                    frame,
                    repeats: plan[index],
                });
            if tx.send(item).is_err() {
                return Ok(());
            }
        }
        return Ok(());
    }

    let pool = build_thread_pool(threading.threads)?;
    let chunk_size = threading.chunk_size.max(1);
    let mut chunk_start = 0;
    while chunk_start < n {
        if cancel.is_cancelled() {
            return Ok(());
        }
        let chunk_end = (chunk_start + chunk_size).min(n);
        let rendered = pool.install(|| {
            (chunk_start..chunk_end)
                .into_par_iter()
                .map_init(
                    || backends.create(spec),
                    |backend, index| -> RsvpResult<FrameRGBA> {
                        let backend = backend
                            .as_mut()
                            .map_err(|e| RsvpError::render(e.to_string()))?;
                        backend.render_word(Some(&words[index]), progress_fraction(index, n))
                    },
                )
                .collect::<Vec<_>>()
        });
        for (index, frame) in (chunk_start..chunk_end).zip(rendered) {
            let item = frame.map(|frame| WordFrame {
                index,
                frame,
                repeats: plan[index],
            });
            if tx.send(item).is_err() {
                return Ok(());
            }
        }
        chunk_start = chunk_end;
    }
    Ok(())
}

/// Push frames in arrival order, pacing on `fps` deadlines when `paced`.
///
/// Returns the number of frames pushed.
fn consume_frames<S, P>(
    rx: Receiver<RsvpResult<WordFrame>>,
    sink: &mut S,
    word_count: usize,
    fps: Fps,
    paced: bool,
    cancel: &CancelToken,
    on_progress: &mut P,
) -> RsvpResult<u64>
where
    S: RecordingSink + ?Sized,
    P: FnMut(ExportProgress),
{
    let mut job = ExportJob {
        word_count,
        word_index: 0,
        frame_in_word: 0,
        frames_pushed: 0,
    };
    let start = Instant::now();

    for expected in 0..word_count {
        if cancel.is_cancelled() {
            return Err(RsvpError::ExportCancelled);
        }
        let Ok(item) = rx.recv() else {
            if cancel.is_cancelled() {
                return Err(RsvpError::ExportCancelled);
            }
            return Err(RsvpError::render("frame producer stopped early"));
        };
        let word = item?;
        if word.index != expected {
            return Err(RsvpError::render(format!(
                "frame order violated: expected word {expected}, got {}",
                word.index
            )));
        }

        job.word_index = word.index;
        job.frame_in_word = 0;
        for _ in 0..word.repeats {
            if cancel.is_cancelled() {
                return Err(RsvpError::ExportCancelled);
            }
            if paced {
                let deadline = start + fps.frames_to_duration(job.frames_pushed);
                let now = Instant::now();
                if deadline > now {
                    std::thread::sleep(deadline - now);
                }
            }
            sink.push_frame(&word.frame).map_err(into_sink_failure)?;
            job.frame_in_word += 1;
            job.frames_pushed += 1;
        }
        let progress = job.snapshot();
        tracing::trace!(
            word = progress.word_index,
            percent = progress.percent,
            "word exported"
        );
        on_progress(progress);
    }

    Ok(job.frames_pushed)
}

fn build_thread_pool(threads: Option<usize>) -> RsvpResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(RsvpError::config(
            "render threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| RsvpError::render(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/export/exporter.rs"]
mod tests;
