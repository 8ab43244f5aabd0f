//! focus-rsvp is a Rapid Serial Visual Presentation speed reader.
//!
//! Text is split into words, each shown alone with its focal character pinned to a fixed
//! point. The same timing drives live terminal playback and video export:
//!
//! - [`segment`] a text into [`WordUnit`]s
//! - play them with a [`PlaybackScheduler`] over any [`DeferredTimer`]
//! - or render them to video with a [`VideoExporter`] and a [`RecordingSink`]
#![forbid(unsafe_code)]

mod foundation;

pub mod encode;
pub mod export;
pub mod playback;
pub mod render;
pub mod settings;
pub mod text;
pub mod timing;

pub use crate::foundation::core::{Canvas, Fps, FrameRGBA, Point, Rect, Rgba8};
pub use crate::foundation::error::{RsvpError, RsvpResult};

pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use crate::encode::sink::{CollectingSink, RecordingSink, SinkConfig, VideoFormat};
pub use crate::export::exporter::{
    CancelToken, ExportArtifact, ExportOptions, ExportProgress, Pacing, RenderThreading,
    VideoExporter, artifact_filename, plan_frames,
};
pub use crate::playback::scheduler::{PlaybackPosition, PlaybackScheduler, PlaybackState};
pub use crate::playback::timer::{DeferredTimer, TimerId, TimerQueue};
pub use crate::render::backend::{BackendFactory, BackendSpec, CpuBackendFactory, FrameBackend};
pub use crate::render::cpu::{CpuFrameRenderer, FrameTheme, Surface};
pub use crate::render::fonts::FontFace;
pub use crate::render::layout::{FrameStyle, TextMeasure, word_geometry};
pub use crate::settings::{FontFamily, FontWeight, ReaderSettings};
pub use crate::text::segment::{WordParts, WordUnit, segment, split_word};
pub use crate::timing::engine::{
    ReadingSchedule, effective_wpm, frames_for_interval, interval_for, progress_fraction,
};
