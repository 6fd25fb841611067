use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use hough_shapes::core::{default_rng, seeded_rng, Origin, Polarity, Termination, UniformSource};
use hough_shapes::detect::{self, FrameDumpObserver};
use hough_shapes::{CircleDetection, DetectedLine, DetectionConfig};
use log::info;
use serde::Serialize;

/// Detect straight lines or circles in an image with Hough transforms.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Input image (any format the `image` crate decodes).
    image: PathBuf,

    /// JSON `DetectionConfig`; defaults are used for missing fields.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for the randomized detectors (clock-seeded if omitted).
    #[arg(long)]
    seed: Option<u64>,

    /// Foreground side of the binarization threshold.
    #[arg(long, value_enum)]
    polarity: Option<PolarityArg>,

    /// Binarization threshold.
    #[arg(long)]
    threshold: Option<u8>,

    /// Coordinate frame: top_left, center_y_up or center_y_down.
    #[arg(long)]
    origin: Option<Origin>,

    /// Write the remaining points after every peak as PNG files here.
    #[arg(long)]
    dump_dir: Option<PathBuf>,

    /// Log to stderr (repeat for more detail).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    shape: Shape,
}

#[derive(Debug, Subcommand)]
enum Shape {
    /// Straight lines.
    Lines {
        #[arg(long, value_enum, default_value_t = Method::Randomized)]
        method: Method,
        /// Votes needed for a line.
        #[arg(long, default_value_t = 50)]
        votes: u32,
        /// Stop after this many lines (randomized methods).
        #[arg(long, default_value_t = 10)]
        max_shapes: usize,
        /// Line thickness for the standard transform.
        #[arg(long, default_value_t = 1.0)]
        thickness: f64,
        /// Save the standard-transform accumulator as an image.
        #[arg(long)]
        accumulator_png: Option<PathBuf>,
    },
    /// Circles.
    Circles {
        /// Votes needed for a circle.
        #[arg(long, default_value_t = 10)]
        votes: u32,
        /// Overrides `circles.max_shapes` from the config.
        #[arg(long)]
        max_shapes: Option<usize>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
enum Method {
    Standard,
    Randomized,
    Probabilistic,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PolarityArg {
    Dark,
    Bright,
}

#[derive(Debug, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
enum Report {
    Lines {
        method: Method,
        lines: Vec<DetectedLine>,
        #[serde(skip_serializing_if = "Option::is_none")]
        iterations: Option<usize>,
        #[serde(skip_serializing_if = "Option::is_none")]
        termination: Option<Termination>,
    },
    Circles(CircleDetection),
}

fn load_config(args: &Args) -> Result<DetectionConfig, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => DetectionConfig::from_json_file(path)?,
        None => DetectionConfig::default(),
    };
    if let Some(p) = args.polarity {
        config.binarize.polarity = match p {
            PolarityArg::Dark => Polarity::Dark,
            PolarityArg::Bright => Polarity::Bright,
        };
    }
    if let Some(t) = args.threshold {
        config.binarize.threshold = t;
    }
    if let Some(o) = args.origin {
        config.binarize.origin = o;
    }
    Ok(config)
}

fn rng(seed: Option<u64>) -> impl UniformSource {
    seed.map_or_else(default_rng, seeded_rng)
}

fn frame_dump(
    dir: Option<&Path>,
    prefix: &str,
) -> Result<Option<FrameDumpObserver>, Box<dyn Error>> {
    let Some(dir) = dir else {
        return Ok(None);
    };
    std::fs::create_dir_all(dir)?;
    Ok(Some(FrameDumpObserver::new(dir, prefix)))
}

fn run(args: &Args) -> Result<Report, Box<dyn Error>> {
    let config = load_config(args)?;
    let img = image::open(&args.image)?.to_luma8();
    info!("{}: {}x{}", args.image.display(), img.width(), img.height());
    let dump = args.dump_dir.as_deref();

    match &args.shape {
        Shape::Lines {
            method,
            votes,
            max_shapes,
            thickness,
            accumulator_png,
        } => match method {
            Method::Standard => {
                let (lines, det) =
                    detect::detect_lines_standard(&img, &config, *thickness, *votes)?;
                if let Some(path) = accumulator_png {
                    if let Some(acc) = detect::accumulator_image(&det)? {
                        acc.save(path)?;
                        info!("accumulator written to {}", path.display());
                    }
                }
                Ok(Report::Lines {
                    method: *method,
                    lines,
                    iterations: None,
                    termination: None,
                })
            }
            Method::Randomized | Method::Probabilistic => {
                let observer = frame_dump(dump, "lines")?
                    .map(|o| Box::new(o) as hough_shapes::lines::LineObserver);
                let found = if *method == Method::Randomized {
                    detect::detect_lines_randomized(
                        &img,
                        &config,
                        *votes,
                        *max_shapes,
                        rng(args.seed),
                        observer,
                    )?
                } else {
                    detect::detect_lines_probabilistic(
                        &img,
                        &config,
                        *votes,
                        *max_shapes,
                        rng(args.seed),
                        observer,
                    )?
                };
                Ok(Report::Lines {
                    method: *method,
                    lines: found.lines,
                    iterations: Some(found.iterations),
                    termination: Some(found.termination),
                })
            }
        },
        Shape::Circles { votes, max_shapes } => {
            let mut config = config;
            if let Some(n) = max_shapes {
                config.circles.max_shapes = *n;
            }
            let observer = frame_dump(dump, "circles")?
                .map(|o| Box::new(o) as hough_shapes::circles::CircleObserver);
            let found = detect::detect_circles(&img, &config, *votes, rng(args.seed), observer)?;
            Ok(Report::Circles(found))
        }
    }
}

fn main() {
    if let Err(err) = try_main() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

#[cfg(not(feature = "tracing"))]
fn init_logging(verbose: u8) -> Result<(), Box<dyn Error>> {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    hough_shapes::core::init_with_level(level)?;
    Ok(())
}

/// With `tracing`, verbosity comes from `RUST_LOG`.
#[cfg(feature = "tracing")]
fn init_logging(_verbose: u8) -> Result<(), Box<dyn Error>> {
    hough_shapes::core::init_tracing(false);
    Ok(())
}

fn try_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    let report = run(&args)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
