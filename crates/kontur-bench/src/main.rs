//! kontur-bench: parameter experimentation and diagnostics for the
//! contouring engine.
//!
//! Builds a synthetic binary raster, runs contour extraction and ring
//! simplification with configurable parameters, and prints per-stage
//! timings and counts. Useful for:
//!
//! - Measuring extraction and simplification throughput at various sizes
//! - Comparing saddle policies and joining modes on saddle-rich inputs
//! - Tuning the simplification tolerance against vertex counts
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin kontur-bench -- [OPTIONS]
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::fmt;
use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, ValueEnum};
use serde::Serialize;

use kontur::{
    find_contour, simplify, BitGrid, Contour, ContourConfig, FindContour, SaddlePolicy,
};

/// Timing and counting diagnostics for the kontur contouring engine.
///
/// Generates a synthetic raster, extracts its contour, simplifies the
/// rings, and reports per-stage durations and counts.
#[derive(Parser)]
#[command(name = "kontur-bench", version)]
struct Cli {
    /// Synthetic raster pattern.
    #[arg(long, value_enum, default_value_t = Shape::Disk)]
    shape: Shape,

    /// Raster width in pixels.
    #[arg(long, default_value_t = 512)]
    width: u32,

    /// Raster height in pixels.
    #[arg(long, default_value_t = 512)]
    height: u32,

    /// Simplification tolerance in triangle-area units.
    #[arg(long, default_value_t = kontur::DEFAULT_SIMPLIFY_TOLERANCE)]
    tolerance: f64,

    /// Keep collinear ring vertices instead of joining straight runs.
    #[arg(long)]
    no_join: bool,

    /// Resolve saddle cells by flipping instead of keeping.
    #[arg(long)]
    flip_saddles: bool,

    /// Number of runs for averaging.
    #[arg(long, default_value_t = 1)]
    runs: usize,

    /// Output diagnostics as JSON instead of a human-readable report.
    #[arg(long)]
    json: bool,
}

/// Synthetic raster patterns.
#[derive(Clone, Copy, ValueEnum)]
enum Shape {
    /// A filled disk centered in the raster.
    Disk,
    /// An 8x8-pixel checkerboard; tiles meet at saddle cells.
    Checker,
    /// Horizontal stripes four pixels tall.
    Stripes,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Shape {
    fn name(self) -> &'static str {
        match self {
            Self::Disk => "disk",
            Self::Checker => "checker",
            Self::Stripes => "stripes",
        }
    }

    fn raster(self, width: u32, height: u32) -> BitGrid {
        match self {
            Self::Disk => {
                let cx = f64::from(width) / 2.0;
                let cy = f64::from(height) / 2.0;
                let r = (cx.min(cy) - 2.0).max(1.0);
                BitGrid::from_fn(width, height, |x, y| {
                    let dx = f64::from(x) + 0.5 - cx;
                    let dy = f64::from(y) + 0.5 - cy;
                    dx * dx + dy * dy <= r * r
                })
            }
            Self::Checker => BitGrid::from_fn(width, height, |x, y| (x / 8 + y / 8) % 2 == 0),
            Self::Stripes => BitGrid::from_fn(width, height, |_, y| (y / 4) % 2 == 0),
        }
    }
}

/// Aggregated diagnostics for one benchmark invocation.
#[derive(Serialize)]
struct Report {
    shape: &'static str,
    width: u32,
    height: u32,
    runs: usize,
    /// Mean extraction duration in seconds.
    extract_seconds: f64,
    /// Mean simplification duration in seconds.
    simplify_seconds: f64,
    rings: usize,
    vertices: usize,
    simplified_vertices: usize,
    border_pixels: usize,
}

fn vertex_count(contour: &Contour) -> usize {
    contour.rings.iter().map(kontur::Ring::len).sum()
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.runs == 0 {
        eprintln!("Error: --runs must be at least 1");
        return ExitCode::FAILURE;
    }

    let raster = cli.shape.raster(cli.width, cli.height);
    let config = ContourConfig {
        join_straight_segments: !cli.no_join,
        ..ContourConfig::default()
    };

    let mut extract_total = 0.0;
    let mut simplify_total = 0.0;
    let mut outcome = None;

    for _ in 0..cli.runs {
        let start = Instant::now();
        let extracted = if cli.flip_saddles {
            FindContour::with_oracle(config, SaddlePolicy::Flip).find(&raster)
        } else {
            find_contour(&raster, &config)
        };
        let contour = match extracted {
            Ok(contour) => contour,
            Err(err) => {
                eprintln!("Error: contour extraction failed: {err}");
                return ExitCode::FAILURE;
            }
        };
        extract_total += start.elapsed().as_secs_f64();

        let start = Instant::now();
        let simplified = simplify(std::slice::from_ref(&contour), cli.tolerance);
        simplify_total += start.elapsed().as_secs_f64();

        outcome = Some((contour, simplified));
    }

    let Some((contour, simplified)) = outcome else {
        unreachable!("runs is validated to be at least 1");
    };

    let runs = cli.runs;
    #[allow(clippy::cast_precision_loss)]
    let report = Report {
        shape: cli.shape.name(),
        width: cli.width,
        height: cli.height,
        runs,
        extract_seconds: extract_total / runs as f64,
        simplify_seconds: simplify_total / runs as f64,
        rings: contour.rings.len(),
        vertices: vertex_count(&contour),
        simplified_vertices: simplified.iter().map(vertex_count).sum(),
        border_pixels: contour.border.count_set(),
    };

    if cli.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(err) => {
                eprintln!("Error: failed to serialize report: {err}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        print_report(&report);
    }

    ExitCode::SUCCESS
}

fn print_report(report: &Report) {
    println!(
        "kontur-bench: {} {}x{} ({} run{})",
        report.shape,
        report.width,
        report.height,
        report.runs,
        if report.runs == 1 { "" } else { "s" },
    );
    println!();
    println!("  Stage durations (mean)");
    println!("    extraction        {:>10.3} ms", report.extract_seconds * 1e3);
    println!("    simplification    {:>10.3} ms", report.simplify_seconds * 1e3);
    println!();
    println!("  Counts");
    println!("    rings             {:>10}", report.rings);
    println!("    vertices          {:>10}", report.vertices);
    println!("    after simplify    {:>10}", report.simplified_vertices);
    println!("    border pixels     {:>10}", report.border_pixels);
}
