//! apngify CLI - turn an image into a size-bounded single-frame APNG
//!
//! Reads JPEG, PNG, WebP, GIF, BMP or TIFF input and writes an APNG that is
//! no larger than the requested budget.

use std::fs;
use std::path::PathBuf;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use log::debug;

use apngify::{
    ConvertOptions, Converter, DownscaleOptions, FilterStrategy, ImageFormat, PngOptions,
    ResampleFilter, StandardCodec, DEFAULT_BUDGET,
};

/// Convert an image into a single-frame APNG under a byte budget.
#[derive(Parser, Debug)]
#[command(name = "apngify")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input image file (JPEG, PNG, WebP, GIF, BMP, or TIFF).
    /// The format comes from the extension, or from the content if there is none
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file path [default: converted-<unix-millis>.png]
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Maximum output size in bytes
    #[arg(long, value_name = "BYTES", conflicts_with = "budget_mb")]
    budget: Option<u64>,

    /// Maximum output size in MiB
    #[arg(long, value_name = "MB")]
    budget_mb: Option<f64>,

    /// MIME type of the input (overrides extension and content detection)
    #[arg(long, value_name = "TYPE")]
    mime: Option<String>,

    /// PNG compression level (1-9, higher = smaller file)
    #[arg(short = 'c', long, default_value = "6", value_parser = clap::value_parser!(u8).range(1..=9))]
    compression: u8,

    /// PNG filter strategy
    #[arg(long, value_enum, default_value = "adaptive")]
    filter: FilterArg,

    /// Resampling filter used when shrinking
    #[arg(long, value_enum, default_value = "bilinear")]
    resample: ResampleArg,

    /// Maximum number of downscale steps
    #[arg(long, default_value_t = apngify::downscale::DEFAULT_MAX_ITERATIONS)]
    max_iterations: u32,

    /// Show verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FilterArg {
    /// No filter (fastest)
    None,
    /// Sub filter
    Sub,
    /// Up filter
    Up,
    /// Average filter
    Average,
    /// Paeth filter
    Paeth,
    /// Adaptive filter selection (best compression)
    Adaptive,
}

impl From<FilterArg> for FilterStrategy {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::None => FilterStrategy::None,
            FilterArg::Sub => FilterStrategy::Sub,
            FilterArg::Up => FilterStrategy::Up,
            FilterArg::Average => FilterStrategy::Average,
            FilterArg::Paeth => FilterStrategy::Paeth,
            FilterArg::Adaptive => FilterStrategy::Adaptive,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ResampleArg {
    /// Bilinear interpolation (fast)
    Bilinear,
    /// Lanczos3 (sharper, slower)
    Lanczos3,
}

impl From<ResampleArg> for ResampleFilter {
    fn from(arg: ResampleArg) -> Self {
        match arg {
            ResampleArg::Bilinear => ResampleFilter::Bilinear,
            ResampleArg::Lanczos3 => ResampleFilter::Lanczos3,
        }
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let start = Instant::now();
    let input = fs::read(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let format = resolve_format(&args, &input)?;
    debug!("Loaded {} as {format} in {:.2?}", args.input.display(), start.elapsed());

    let options = ConvertOptions {
        budget: resolve_budget(&args)?,
        downscale: DownscaleOptions {
            max_iterations: args.max_iterations,
            ..DownscaleOptions::default()
        },
        png: PngOptions {
            compression_level: args.compression,
            filter_strategy: args.filter.into(),
        },
    };

    let convert_start = Instant::now();
    let converter = Converter::with_codec(StandardCodec::new(args.resample.into()))
        .with_options(options);
    let conversion = converter
        .run(&input, format)
        .with_context(|| format!("failed to convert {}", args.input.display()))?;
    debug!("Converted in {:.2?}", convert_start.elapsed());

    let output_path = args.output.clone().unwrap_or_else(default_output_path);
    fs::write(&output_path, &conversion.apng)
        .with_context(|| format!("failed to write {}", output_path.display()))?;

    if args.verbose {
        eprintln!("Output: {}", output_path.display());
        eprintln!(
            "  Source: {}x{} {format}",
            conversion.source_width, conversion.source_height
        );
        eprintln!("  Budget: {}", format_size(options.budget));
        eprintln!("  Downscale steps: {}", conversion.steps);
    }
    println!(
        "{} -> {} ({}x{})",
        format_size(input.len() as u64),
        format_size(conversion.apng.len() as u64),
        conversion.width,
        conversion.height
    );

    Ok(())
}

/// Pick the input format: `--mime`, then the file extension, then the
/// file's magic bytes. Content is only sniffed when the file has no
/// extension; an extension outside the supported set is an error.
fn resolve_format(args: &Args, input: &[u8]) -> Result<ImageFormat> {
    if let Some(mime) = &args.mime {
        return Ok(ImageFormat::from_mime(mime)?);
    }
    if let Some(ext) = args.input.extension() {
        let ext = ext.to_string_lossy();
        return ImageFormat::from_extension(&ext).with_context(|| {
            format!(
                "unsupported extension on {}; pass --mime to override",
                args.input.display()
            )
        });
    }
    match ImageFormat::sniff(input) {
        Some(format) => Ok(format),
        None => bail!(
            "cannot determine the format of {}; pass --mime",
            args.input.display()
        ),
    }
}

fn resolve_budget(args: &Args) -> Result<u64> {
    match (args.budget, args.budget_mb) {
        (Some(bytes), _) => Ok(bytes),
        (None, Some(mb)) => {
            if !(mb.is_finite() && mb > 0.0) {
                bail!("--budget-mb must be a positive number, got {mb}");
            }
            Ok((mb * 1024.0 * 1024.0).floor() as u64)
        }
        (None, None) => Ok(DEFAULT_BUDGET),
    }
}

fn default_output_path() -> PathBuf {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    PathBuf::from(format!("converted-{millis}.png"))
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
