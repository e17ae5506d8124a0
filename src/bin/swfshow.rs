use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "swfshow", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a show container from a JSON show description.
    Render(RenderArgs),
    /// Write an audio-only container from an MP3 file or `.m3u` playlist.
    Audio(AudioArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input show description JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output container path.
    #[arg(long)]
    out: PathBuf,

    /// Force quality mode (lossless sources, rasterized pan/zoom).
    #[arg(long)]
    quality: bool,

    /// Longest show or soundtrack in frames [default: the run configuration's, else 16000].
    #[arg(long)]
    max_frames: Option<u32>,

    /// Optional run configuration JSON; command line flags take precedence.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct AudioArgs {
    /// MP3 file or `.m3u` playlist.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output container path.
    #[arg(long)]
    out: PathBuf,

    /// Frame rate the audio blocks are aligned to.
    #[arg(long, default_value_t = 12.0)]
    fps: f32,

    /// Longest soundtrack in frames.
    #[arg(long, default_value_t = swfshow::DEFAULT_MAX_FRAMES)]
    max_frames: u32,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Audio(args) => cmd_audio(args),
    };
    let purged = swfshow::purge_deferred_deletes();
    if purged > 0 {
        tracing::debug!(purged, "removed leftover scratch files");
    }
    result
}

/// Attach the message key and formatted arguments to a generation error.
fn describe(err: swfshow::ShowError) -> anyhow::Error {
    let key = err.message_key();
    let args = err.message_args();
    if args.is_empty() {
        anyhow::Error::new(err).context(key)
    } else {
        anyhow::Error::new(err).context(format!("{key} [{}]", args.join(", ")))
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> anyhow::Result<T> {
    let text =
        fs::read_to_string(path).with_context(|| format!("open {what} '{}'", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parse {what} JSON"))
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut show: swfshow::ShowModel = read_json(&args.in_path, "show description")?;
    let base = args.in_path.parent().unwrap_or_else(|| Path::new("."));
    show.resolve_paths(base);

    let mut config = match &args.config {
        Some(path) => read_json(path, "run configuration")?,
        None => swfshow::RunConfig::default(),
    };
    if args.quality {
        config.quality = Some(true);
    }
    if let Some(max_frames) = args.max_frames {
        config.max_frames = max_frames;
    }

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    let report = swfshow::generate(&show, &args.out, &config, None).map_err(describe)?;
    eprintln!(
        "wrote {} ({} frames, {} bitmaps, {} bytes)",
        args.out.display(),
        report.frames,
        report.bitmaps,
        report.bytes_written
    );
    if let Some(sidecar) = &report.audio_sidecar {
        eprintln!("wrote {}", sidecar.display());
    }
    Ok(())
}

fn cmd_audio(args: AudioArgs) -> anyhow::Result<()> {
    let fps = swfshow::Fps::new(args.fps).map_err(describe)?;
    let locator = swfshow::AudioLocator::File(args.in_path.clone());
    let track = swfshow::AudioTrack::load(&locator, fps, args.max_frames).map_err(describe)?;
    track.write_standalone(&args.out).map_err(describe)?;
    eprintln!(
        "wrote {} ({})",
        args.out.display(),
        swfshow::format_duration(track.duration_secs())
    );
    Ok(())
}
