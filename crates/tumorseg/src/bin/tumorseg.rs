//! tumorseg CLI: segment scans, generate synthetic frames, convert images
//! and evaluate the energy model.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use serde::Serialize;
use tumorseg::core::{synthetic, GrayImage, IMG_HEIGHT, IMG_WIDTH};
use tumorseg::{
    dice, io, iou, BackendKind, PerformanceReport, PipelineParams, PowerProfile, ProcessingMode,
    SegmentationPipeline, SegmentationSummary,
};

#[cfg(feature = "tracing")]
use tracing_log::LogTracer;

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "tumorseg")]
#[command(about = "Adaptive Otsu segmentation of grayscale scans with an energy comparison")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Segment an image or a raw `.bin` buffer.
    Segment(SegmentArgs),

    /// Write a synthetic test frame and optionally its ground truth.
    Generate {
        #[arg(value_enum)]
        kind: SyntheticKind,
        /// Output path; `.bin` writes raw bytes, anything else an image.
        out: PathBuf,
        #[arg(long)]
        truth_out: Option<PathBuf>,
    },

    /// Evaluate the time and energy model for two cycle counts.
    Energy(EnergyArgs),

    /// Convert an image file to a raw 256x256 `.bin` buffer.
    Convert {
        input: PathBuf,
        out: PathBuf,
        /// Keep the native size instead of resizing to 256x256.
        #[arg(long)]
        keep_size: bool,
    },
}

#[derive(Debug, Clone, Args)]
struct SegmentArgs {
    /// Input image; `.bin` files are read as raw row-major bytes.
    input: PathBuf,

    /// Force a processing mode (fast, normal, careful).
    #[arg(long)]
    mode: Option<ProcessingMode>,

    /// Execution backend for the threshold stage (host, offload).
    #[arg(long)]
    backend: Option<BackendKind>,

    /// JSON configuration; command-line options override it.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value_t = IMG_WIDTH)]
    raw_width: usize,

    #[arg(long, default_value_t = IMG_HEIGHT)]
    raw_height: usize,

    /// Keep the native size of decoded images instead of resizing to 256x256.
    #[arg(long)]
    keep_size: bool,

    /// Skip the host baseline run and the energy report.
    #[arg(long)]
    no_baseline: bool,

    #[arg(long)]
    mask_out: Option<PathBuf>,

    #[arg(long)]
    overlay_out: Option<PathBuf>,

    #[arg(long)]
    labels_out: Option<PathBuf>,

    /// Ground-truth mask for Dice and IoU scores.
    #[arg(long)]
    truth: Option<PathBuf>,

    /// Print the result as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Args)]
struct EnergyArgs {
    #[arg(long)]
    accel_cycles: u64,

    #[arg(long)]
    baseline_cycles: u64,

    #[arg(long, default_value_t = 100_000_000.0)]
    clock_hz: f64,

    #[arg(long, default_value_t = 50.0)]
    accel_mw: f64,

    #[arg(long, default_value_t = 200.0)]
    baseline_mw: f64,

    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SyntheticKind {
    BrightCircle,
    TwoBlobs,
    LowContrast,
}

impl SyntheticKind {
    fn render(self) -> (GrayImage, GrayImage) {
        match self {
            Self::BrightCircle => synthetic::bright_circle(),
            Self::TwoBlobs => synthetic::two_blobs(),
            Self::LowContrast => synthetic::low_contrast(),
        }
    }
}

#[derive(Serialize)]
struct Quality {
    dice: f64,
    iou: f64,
}

#[derive(Serialize)]
struct SegmentReport {
    input: String,
    #[serde(flatten)]
    summary: SegmentationSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    quality: Option<Quality>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> CliResult<()> {
    match command {
        Commands::Segment(args) => run_segment(&args),
        Commands::Generate {
            kind,
            out,
            truth_out,
        } => run_generate(kind, &out, truth_out.as_deref()),
        Commands::Energy(args) => run_energy(&args),
        Commands::Convert {
            input,
            out,
            keep_size,
        } => run_convert(&input, &out, keep_size),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    #[cfg(feature = "tracing")]
    {
        let _ = LogTracer::init();
        tumorseg::core::init_tracing(false, level);
    }
    #[cfg(not(feature = "tracing"))]
    {
        let _ = tumorseg::core::init_with_level(level);
    }
}

fn is_raw(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("bin"))
}

fn load_input(path: &Path, args: &SegmentArgs) -> CliResult<GrayImage> {
    let img = if is_raw(path) {
        io::read_raw(path, args.raw_width, args.raw_height)?
    } else {
        io::load_gray(path, !args.keep_size)?
    };
    Ok(img)
}

fn write_gray(path: &Path, img: &GrayImage) -> CliResult<()> {
    if is_raw(path) {
        io::write_raw(path, img)?;
    } else {
        io::save_gray(path, img)?;
    }
    Ok(())
}

// ── segment ────────────────────────────────────────────────────────────

fn run_segment(args: &SegmentArgs) -> CliResult<()> {
    let mut params = match &args.config {
        Some(path) => PipelineParams::from_json_file(path)?,
        None => PipelineParams::default(),
    };
    if let Some(mode) = args.mode {
        params.mode = Some(mode);
    }
    if let Some(backend) = args.backend {
        params.backend = backend;
    }
    if args.no_baseline {
        params.compare_baseline = false;
    }

    log::info!("loading {}", args.input.display());
    let img = load_input(&args.input, args)?;
    log::info!("image size: {}x{}", img.width, img.height);

    let mut pipeline = SegmentationPipeline::new(params);
    let result = pipeline.segment(&img.view())?;

    if let Some(path) = &args.mask_out {
        write_gray(path, &result.mask)?;
    }
    if let Some(path) = &args.overlay_out {
        io::save_overlay(path, &img, &result.mask)?;
    }
    if let Some(path) = &args.labels_out {
        io::save_label_map(path, &result.label_map)?;
    }

    let quality = match &args.truth {
        Some(path) => {
            let truth = load_input(path, args)?;
            if (truth.width, truth.height) != (result.mask.width, result.mask.height) {
                return Err(format!(
                    "ground truth is {}x{}, mask is {}x{}",
                    truth.width, truth.height, result.mask.width, result.mask.height
                )
                .into());
            }
            Some(Quality {
                dice: dice(&result.mask, &truth),
                iou: iou(&result.mask, &truth),
            })
        }
        None => None,
    };

    let report = SegmentReport {
        input: args.input.display().to_string(),
        summary: result.summary(),
        quality,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_segment_report(&report);
    }
    Ok(())
}

fn print_segment_report(report: &SegmentReport) {
    let s = &report.summary;
    println!("input:      {} ({}x{})", report.input, s.width, s.height);
    println!(
        "stats:      mean={} std={} contrast={} min={} max={}",
        s.stats.mean, s.stats.std_dev, s.stats.contrast, s.stats.min, s.stats.max
    );
    println!(
        "mode:       {}{}",
        s.mode,
        if s.mode_auto_selected { "" } else { " (forced)" }
    );
    println!(
        "threshold:  {} (otsu {}{})",
        s.threshold,
        s.otsu_threshold,
        if s.fallback_applied {
            ", strict fallback"
        } else {
            ""
        }
    );
    println!("foreground: {} px", s.foreground_pixels);
    println!(
        "regions:    {}{}",
        s.region_count,
        if s.regions_saturated {
            " (cap reached)"
        } else {
            ""
        }
    );
    for r in &s.regions {
        println!(
            "  #{:<2} area={:<6} centroid=({}, {}) bbox=({}, {})-({}, {})",
            r.label, r.area, r.centroid.0, r.centroid.1, r.bbox.x0, r.bbox.y0, r.bbox.x1, r.bbox.y1
        );
    }
    println!("backend:    {} ({} cycles)", s.backend, s.accelerated_cycles);
    if let Some(p) = &s.performance {
        print_performance(p);
    }
    if let Some(agree) = s.backends_agree {
        println!("conformance: {}", if agree { "match" } else { "MISMATCH" });
    }
    if let Some(q) = &report.quality {
        println!("dice:       {:.4}", q.dice);
        println!("iou:        {:.4}", q.iou);
    }
}

fn print_performance(p: &PerformanceReport) {
    println!(
        "time:       accelerated {:.3} ms, baseline {:.3} ms, speedup {:.2}x",
        p.accelerated_time_ms, p.baseline_time_ms, p.speedup
    );
    println!(
        "energy:     accelerated {:.2} uJ, baseline {:.2} uJ, savings {:.2}%",
        p.accelerated_energy_uj, p.baseline_energy_uj, p.energy_savings_pct
    );
}

// ── generate ───────────────────────────────────────────────────────────

fn run_generate(kind: SyntheticKind, out: &Path, truth_out: Option<&Path>) -> CliResult<()> {
    let (img, truth) = kind.render();
    write_gray(out, &img)?;
    println!("wrote {:?} frame to {}", kind, out.display());
    if let Some(path) = truth_out {
        write_gray(path, &truth)?;
        println!("wrote ground truth to {}", path.display());
    }
    Ok(())
}

// ── energy ─────────────────────────────────────────────────────────────

fn run_energy(args: &EnergyArgs) -> CliResult<()> {
    let profile = PowerProfile {
        accelerated_power_mw: args.accel_mw,
        baseline_power_mw: args.baseline_mw,
        clock_hz: args.clock_hz,
    };
    let report = PerformanceReport::compute(args.accel_cycles, args.baseline_cycles, &profile);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_performance(&report);
    }
    Ok(())
}

// ── convert ────────────────────────────────────────────────────────────

fn run_convert(input: &Path, out: &Path, keep_size: bool) -> CliResult<()> {
    let img = io::load_gray(input, !keep_size)?;
    io::write_raw(out, &img)?;
    println!(
        "wrote {}x{} raw buffer to {}",
        img.width,
        img.height,
        out.display()
    );
    Ok(())
}
