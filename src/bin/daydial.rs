use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "daydial", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the dial at one time of day as a PNG.
    Frame(FrameArgs),
    /// Render a numbered PNG sequence, advancing the clock between frames.
    Frames(FramesArgs),
}

#[derive(Args, Debug)]
struct DialArgs {
    /// Dial config JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Font file for labels and the time readout (overrides the config).
    #[arg(long)]
    font: Option<PathBuf>,

    /// Output width and height in pixels (overrides the config).
    #[arg(long)]
    size: Option<u32>,
}

#[derive(Args, Debug)]
struct FrameArgs {
    /// Time of day, `HH:MM` or `HH:MM:SS`.
    #[arg(long)]
    at: daydial::ClockTime,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    dial: DialArgs,
}

#[derive(Args, Debug)]
struct FramesArgs {
    /// Time of the first frame.
    #[arg(long)]
    from: daydial::ClockTime,

    /// Number of frames to render.
    #[arg(long)]
    count: u32,

    /// Directory receiving `frame_00000.png`, `frame_00001.png`, ...
    #[arg(long)]
    out_dir: PathBuf,

    /// Simulated seconds between frames (overrides the config).
    #[arg(long)]
    step_secs: Option<u64>,

    #[command(flatten)]
    dial: DialArgs,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Frames(args) => cmd_frames(args),
    }
}

fn load_config(args: &DialArgs) -> anyhow::Result<daydial::DialConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("read config '{}'", path.display()))?;
            let mut config = daydial::DialConfig::from_json_str(&text)
                .with_context(|| format!("parse config '{}'", path.display()))?;
            // Font paths in a config file are relative to that file.
            if let (Some(font), Some(parent)) = (&config.font, path.parent())
                && font.is_relative()
            {
                config.font = Some(parent.join(font));
            }
            config
        }
        None => daydial::DialConfig::default(),
    };

    if let Some(font) = &args.font {
        config.font = Some(font.clone());
    }
    if let Some(size) = args.size {
        config.size = size;
    }
    config.validate()?;
    Ok(config)
}

fn make_renderer(config: &daydial::DialConfig) -> anyhow::Result<daydial::Renderer> {
    let mut renderer = daydial::Renderer::default();
    match &config.font {
        Some(path) => {
            let bytes =
                std::fs::read(path).with_context(|| format!("read font '{}'", path.display()))?;
            let family = renderer
                .register_font(bytes)
                .with_context(|| format!("register font '{}'", path.display()))?;
            tracing::info!(family = %family, "registered font");
        }
        None => tracing::warn!("no font given, text will be skipped"),
    }
    Ok(renderer)
}

fn write_png(frame: &daydial::FrameRGBA, out: &Path) -> anyhow::Result<()> {
    if let Some(parent) = out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        out,
        &frame.to_straight_rgba8(),
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", out.display()))?;
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let config = load_config(&args.dial)?;
    let dial = daydial::Dial::new(&config)?;
    let mut renderer = make_renderer(&config)?;
    let mut surface = daydial::Surface::new(config.size, config.size)?;

    dial.render_frame(&mut renderer, &mut surface, args.at)?;
    let frame = surface.frame()?;
    write_png(&frame, &args.out)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_frames(args: FramesArgs) -> anyhow::Result<()> {
    let mut config = load_config(&args.dial)?;
    if let Some(step) = args.step_secs {
        config.step_secs = step;
        config.validate()?;
    }

    let dial = daydial::Dial::new(&config)?;
    let mut renderer = make_renderer(&config)?;
    let mut surface = daydial::Surface::new(config.size, config.size)?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    let mut now = args.from;
    for i in 0..args.count {
        dial.render_frame(&mut renderer, &mut surface, now)?;
        let frame = surface.frame()?;
        write_png(&frame, &args.out_dir.join(format!("frame_{i:05}.png")))?;
        now = now.advance(config.step_secs);
    }

    let stats = renderer.pool_stats();
    tracing::info!(
        alloc_surfaces = stats.alloc_surfaces,
        reused_surfaces = stats.reused_surfaces,
        "pool"
    );
    eprintln!("wrote {} frames to {}", args.count, args.out_dir.display());
    Ok(())
}
