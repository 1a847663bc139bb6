use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::filter::LevelFilter;

use gridtile::session::studio::output_file_name;
use gridtile::{
    CANVAS_SIZES, FfmpegSink, FfmpegSinkOpts, FrameSink, FsImageLoader, PRESETS, PngSequenceSink,
    ShapeMode, Studio, StudioConfig,
};

#[derive(Parser, Debug)]
#[command(name = "gridtile", version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one composition as a PNG at the selected canvas size.
    Still(StillArgs),
    /// Record the 10 s animation as MP4 (requires `ffmpeg` on PATH) or a PNG sequence.
    Record(RecordArgs),
    /// List presets and canvas sizes.
    Presets,
}

#[derive(Args, Debug)]
struct StudioArgs {
    /// Studio config JSON; flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Preset index (see `gridtile presets`).
    #[arg(long)]
    preset: Option<usize>,

    /// Canvas size index (see `gridtile presets`).
    #[arg(long)]
    size: Option<usize>,

    #[arg(long)]
    columns: Option<f64>,

    #[arg(long)]
    rows: Option<f64>,

    /// Padding as a percentage of the cell size.
    #[arg(long)]
    padding: Option<f64>,

    /// Probability that a cell stays empty.
    #[arg(long)]
    empty: Option<f64>,

    #[arg(long, value_enum)]
    shape: Option<ShapeChoice>,

    /// Comma-separated colors, e.g. `#fff,ff0000,0f0`.
    #[arg(long)]
    palette: Option<String>,

    /// Background color.
    #[arg(long)]
    background: Option<String>,

    /// Background image file (cover-scaled).
    #[arg(long)]
    background_image: Option<PathBuf>,

    /// Directory holding preset backgrounds (defaults to $GRIDTILE_ASSETS_DIR or ./assets).
    #[arg(long)]
    assets_dir: Option<PathBuf>,

    /// Seed for reproducible layouts.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Parser, Debug)]
struct StillArgs {
    #[command(flatten)]
    studio: StudioArgs,

    /// Output directory.
    #[arg(long, default_value = ".")]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct RecordArgs {
    #[command(flatten)]
    studio: StudioArgs,

    /// Output directory for the MP4.
    #[arg(long, default_value = ".")]
    out: PathBuf,

    /// Write numbered PNG frames into this directory instead of an MP4.
    #[arg(long)]
    frames_dir: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ShapeChoice {
    Circle,
    Square,
    Triangle,
    Any,
}

impl From<ShapeChoice> for ShapeMode {
    fn from(c: ShapeChoice) -> Self {
        match c {
            ShapeChoice::Circle => ShapeMode::Circle,
            ShapeChoice::Square => ShapeMode::Square,
            ShapeChoice::Triangle => ShapeMode::Triangle,
            ShapeChoice::Any => ShapeMode::Any,
        }
    }
}

impl StudioArgs {
    fn to_config(&self) -> StudioConfig {
        StudioConfig {
            preset: self.preset,
            canvas_size: self.size,
            columns: self.columns,
            rows: self.rows,
            padding_percent: self.padding,
            empty_probability: self.empty,
            shape: self.shape.map(ShapeMode::from),
            palette: self
                .palette
                .as_ref()
                .map(|s| s.split(',').map(str::to_owned).collect()),
            background_color: self.background.clone(),
            background_image: self.background_image.clone(),
            assets_dir: self.assets_dir.clone(),
            seed: self.seed,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Still(args) => cmd_still(args),
        Command::Record(args) => cmd_record(args),
        Command::Presets => cmd_presets(),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn build_studio(args: &StudioArgs) -> anyhow::Result<Studio> {
    let file = match &args.config {
        Some(path) => StudioConfig::from_path(path)?,
        None => StudioConfig::default(),
    };
    let cfg = file.merged(args.to_config());
    let assets_dir = cfg.resolved_assets_dir();
    tracing::debug!(assets = %assets_dir.display(), "assets directory");

    let mut studio = Studio::new(Arc::new(FsImageLoader::new(assets_dir)), cfg.seed)?;
    cfg.apply(&mut studio).context("apply studio config")?;
    studio.wait_for_background(Duration::from_secs(30));
    Ok(studio)
}

fn create_out_dir(dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("create output dir '{}'", dir.display()))
}

fn cmd_still(args: StillArgs) -> anyhow::Result<()> {
    let mut studio = build_studio(&args.studio)?;
    let still = studio.export_still()?;

    create_out_dir(&args.out)?;
    let path = args.out.join(&still.file_name);
    std::fs::write(&path, &still.png).with_context(|| format!("write png '{}'", path.display()))?;

    eprintln!("wrote {}", path.display());
    Ok(())
}

fn cmd_record(args: RecordArgs) -> anyhow::Result<()> {
    let mut studio = build_studio(&args.studio)?;

    let target;
    let sink: Box<dyn FrameSink> = match &args.frames_dir {
        Some(dir) => {
            target = dir.clone();
            Box::new(PngSequenceSink::new(dir))
        }
        None => {
            create_out_dir(&args.out)?;
            let name = output_file_name(studio.params().canvas_size(), chrono::Utc::now(), "mp4");
            target = args.out.join(name);
            Box::new(FfmpegSink::new(FfmpegSinkOpts::new(&target)))
        }
    };

    studio
        .start_recording(sink)
        .context("start recording")?;
    while studio.is_recording() {
        studio.tick()?;
    }

    eprintln!("wrote {}", target.display());
    Ok(())
}

fn cmd_presets() -> anyhow::Result<()> {
    println!("presets:");
    for (i, p) in PRESETS.iter().enumerate() {
        let fill = p
            .fill
            .map_or_else(|| "palette".to_owned(), |c| c.to_string());
        println!(
            "  {i}  {:<14} shape={:<8} padding={:<4} empty={:<5} fill={fill}",
            p.name,
            format!("{:?}", p.shape).to_lowercase(),
            p.padding_percent,
            p.empty_probability,
        );
    }
    println!("canvas sizes:");
    for (i, s) in CANVAS_SIZES.iter().enumerate() {
        println!("  {i}  {:<13} {}x{}", s.name, s.width, s.height);
    }
    Ok(())
}
