use std::{
    io::Read as _,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use sha2::Digest as _;

use focus_rsvp::{
    CancelToken, Canvas, CollectingSink, CpuBackendFactory, CpuFrameRenderer, ExportOptions,
    FfmpegSink, FfmpegSinkOpts, FontFace, FontFamily, FontWeight, Fps, FrameStyle, FrameTheme,
    Pacing, ReaderSettings, ReadingSchedule, RecordingSink, RenderThreading, VideoExporter,
    VideoFormat, WordUnit, plan_frames, progress_fraction, segment,
};

#[derive(Parser, Debug)]
#[command(name = "focus-rsvp", version, about = "RSVP speed reader")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read the text live in the terminal.
    Play(PlayArgs),
    /// Print the reading schedule as JSON.
    Plan(PlanArgs),
    /// Render a single word frame as a PNG.
    Frame(FrameArgs),
    /// Export the reading session as a video (requires `ffmpeg` on PATH unless --dry-run).
    Export(ExportArgs),
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Text to read. Falls back to --file, then stdin.
    #[arg(long, conflicts_with = "file")]
    text: Option<String>,

    /// Read the text from a file.
    #[arg(long)]
    file: Option<PathBuf>,

    /// Settings JSON; flags below override its fields.
    #[arg(long)]
    settings: Option<PathBuf>,

    #[arg(long)]
    wpm: Option<u32>,

    /// Ramp speed from --initial-wpm to --target-wpm across the text.
    #[arg(long)]
    ramp: bool,

    #[arg(long)]
    initial_wpm: Option<u32>,

    #[arg(long)]
    target_wpm: Option<u32>,

    /// Speed change per up/down key press.
    #[arg(long)]
    jump_step: Option<u32>,

    #[arg(long, value_enum)]
    font: Option<FontChoice>,

    #[arg(long, value_enum)]
    weight: Option<WeightChoice>,

    /// Opacity of the letters around the focal character.
    #[arg(long)]
    side_opacity: Option<f32>,

    /// Distraction-free layout.
    #[arg(long)]
    zen: bool,

    /// Use this font file instead of a system font.
    #[arg(long)]
    font_path: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct PlayArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Start paused.
    #[arg(long)]
    paused: bool,
}

#[derive(Args, Debug)]
struct PlanArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Frame rate used for the per-word frame counts.
    #[arg(long, default_value_t = 60)]
    fps: u32,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Word index (0-based).
    #[arg(long, default_value_t = 0)]
    index: usize,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[arg(long, default_value_t = 1280)]
    width: u32,

    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Print diagnostics about font resolution (family name + SHA-256 of font bytes).
    #[arg(long)]
    dump_fonts: bool,
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Directory the video is written into.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    #[arg(long, value_enum, default_value_t = FormatChoice::Mp4)]
    format: FormatChoice,

    #[arg(long, default_value_t = 60)]
    fps: u32,

    #[arg(long, default_value_t = 1280)]
    width: u32,

    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Render words in parallel chunks.
    #[arg(long)]
    parallel: bool,

    #[arg(long)]
    threads: Option<usize>,

    /// Render every frame into memory and report counts without encoding.
    #[arg(long)]
    dry_run: bool,

    /// Print diagnostics about font resolution (family name + SHA-256 of font bytes).
    #[arg(long)]
    dump_fonts: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FontChoice {
    Mono,
    Sans,
    Serif,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum WeightChoice {
    Normal,
    Bold,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatChoice {
    Mp4,
    Webm,
}

impl From<FormatChoice> for VideoFormat {
    fn from(c: FormatChoice) -> Self {
        match c {
            FormatChoice::Mp4 => VideoFormat::Mp4,
            FormatChoice::Webm => VideoFormat::Webm,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Play(args) => cmd_play(args),
        Command::Plan(args) => cmd_plan(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Export(args) => cmd_export(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

impl InputArgs {
    fn read_text(&self) -> anyhow::Result<String> {
        if let Some(text) = &self.text {
            return Ok(text.clone());
        }
        if let Some(path) = &self.file {
            return std::fs::read_to_string(path)
                .with_context(|| format!("read text '{}'", path.display()));
        }
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("read text from stdin")?;
        Ok(text)
    }

    fn words(&self) -> anyhow::Result<Vec<WordUnit>> {
        Ok(segment(&self.read_text()?))
    }

    fn reader_settings(&self) -> anyhow::Result<ReaderSettings> {
        let mut s = match &self.settings {
            Some(path) => ReaderSettings::load_json(path)?,
            None => ReaderSettings::default(),
        };
        if let Some(v) = self.wpm {
            s.wpm = v;
        }
        if self.ramp {
            s.enable_gradual_increase = true;
        }
        if let Some(v) = self.initial_wpm {
            s.initial_wpm = v;
        }
        if let Some(v) = self.target_wpm {
            s.target_wpm = v;
        }
        if let Some(v) = self.jump_step {
            s.wpm_jump_step = v;
        }
        if let Some(v) = self.font {
            s.font = match v {
                FontChoice::Mono => FontFamily::Mono,
                FontChoice::Sans => FontFamily::Sans,
                FontChoice::Serif => FontFamily::Serif,
            };
        }
        if let Some(v) = self.weight {
            s.font_weight = match v {
                WeightChoice::Normal => FontWeight::Normal,
                WeightChoice::Bold => FontWeight::Bold,
            };
        }
        if let Some(v) = self.side_opacity {
            s.side_opacity = v;
        }
        if self.zen {
            s.zen_mode = true;
        }
        s.validate()?;
        Ok(s)
    }

    fn font_face(&self, settings: &ReaderSettings) -> anyhow::Result<FontFace> {
        let face = match &self.font_path {
            Some(path) => FontFace::from_file(path, settings.font_weight)?,
            None => FontFace::system(settings.font, settings.font_weight)?,
        };
        Ok(face)
    }
}

fn cmd_play(args: PlayArgs) -> anyhow::Result<()> {
    let settings = args.input.reader_settings()?;
    let words = args.input.words()?;
    focus_rsvp::playback::driver::run_terminal(words, settings, !args.paused)?;
    Ok(())
}

#[derive(serde::Serialize)]
struct PlanEntry<'a> {
    #[serde(flatten)]
    word: &'a focus_rsvp::timing::engine::ScheduledWord,
    frames: u32,
}

#[derive(serde::Serialize)]
struct PlanReport<'a> {
    words: Vec<PlanEntry<'a>>,
    total_ms: f64,
    fps: u32,
    total_frames: u64,
}

fn cmd_plan(args: PlanArgs) -> anyhow::Result<()> {
    let settings = args.input.reader_settings()?;
    let fps = Fps::new(args.fps)?;
    let words = args.input.words()?;

    let schedule = ReadingSchedule::build(&words, &settings);
    let frames = plan_frames(&words, &settings, fps);
    let report = PlanReport {
        words: schedule
            .words
            .iter()
            .zip(&frames)
            .map(|(word, &frames)| PlanEntry { word, frames })
            .collect(),
        total_ms: schedule.total_ms,
        fps: fps.0,
        total_frames: frames.iter().map(|&f| u64::from(f)).sum(),
    };

    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("serialize plan")?
    );
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let settings = args.input.reader_settings()?;
    let words = args.input.words()?;
    let face = args.input.font_face(&settings)?;
    if args.dump_fonts {
        dump_font_diagnostics(&face);
    }

    let canvas = Canvas {
        width: args.width,
        height: args.height,
    };
    let style = FrameStyle::for_canvas(canvas, settings.zen_mode);
    let mut renderer =
        CpuFrameRenderer::new(&face, style, FrameTheme::default(), settings.side_opacity)?;

    let index = args.index.min(words.len().saturating_sub(1));
    let frame = renderer.render_frame(words.get(index), progress_fraction(index, words.len()))?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let settings = args.input.reader_settings()?;
    let words = args.input.words()?;
    let face = args.input.font_face(&settings)?;
    if args.dump_fonts {
        dump_font_diagnostics(&face);
    }

    let exporter = VideoExporter::new(CpuBackendFactory {
        face,
        theme: FrameTheme::default(),
    });
    let opts = ExportOptions {
        canvas: Canvas {
            width: args.width,
            height: args.height,
        },
        fps: Fps::new(args.fps)?,
        pacing: Pacing::Auto,
        threading: RenderThreading {
            parallel: args.parallel,
            threads: args.threads,
            ..RenderThreading::default()
        },
        ..ExportOptions::default()
    };

    let mut sink: Box<dyn RecordingSink> = if args.dry_run {
        Box::new(CollectingSink::new())
    } else {
        Box::new(FfmpegSink::new(FfmpegSinkOpts::new(args.format.into())))
    };

    let mut last_percent = None;
    let artifact = exporter.export(
        &words,
        &settings,
        &opts,
        sink.as_mut(),
        |p| {
            if last_percent != Some(p.percent) {
                last_percent = Some(p.percent);
                eprint!("\rexporting: {:>3}%", p.percent);
            }
        },
        &CancelToken::new(),
    )?;
    eprintln!();

    if args.dry_run {
        eprintln!(
            "dry run: {} frames, {:.3}s, would write {}",
            artifact.frames,
            artifact.duration.as_secs_f64(),
            artifact.filename
        );
        return Ok(());
    }

    let out = write_artifact(&args.out_dir, &artifact.filename, &artifact.bytes)?;
    eprintln!(
        "wrote {} ({}, {} frames, {:.3}s)",
        out.display(),
        artifact.mime_type,
        artifact.frames,
        artifact.duration.as_secs_f64()
    );
    Ok(())
}

fn write_artifact(dir: &Path, filename: &str, bytes: &[u8]) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("create output dir '{}'", dir.display()))?;
    let path = dir.join(filename);
    std::fs::write(&path, bytes).with_context(|| format!("write video '{}'", path.display()))?;
    Ok(path)
}

fn dump_font_diagnostics(face: &FontFace) {
    eprintln!("font diagnostics:");
    eprintln!("  family:  {}", face.family_name);
    eprintln!("  weight:  {}", face.weight.value());
    eprintln!("  index:   {}", face.index);
    eprintln!("  sha256:  {}", sha256_hex(&face.bytes));
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{:02x}", b));
    }
    out
}
