//! Barnes CLI - objective analysis of scattered samples onto regular grids

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use barnes_algorithms::analysis::{
    analyze_with_first_guess, analyze_with_observer, point_residuals, recommend_parameters, rmse,
    AnalysisParameters, BarnesConfig, BarnesResult,
};
use barnes_core::io::{
    read_geotiff, read_json, read_samples_csv, write_geotiff, write_json,
    write_residuals_csv,
};
use barnes_core::{BoundingBox, Grid, GridAxes, GridAxis, SampleSet};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "barnes")]
#[command(author, version, about = "Barnes objective analysis of scattered samples", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend grid spacing and scale length from sample density
    Recommend {
        /// Input samples (CSV with lon,lat,value columns)
        input: PathBuf,
        /// Analysis box: lon_min,lat_min,lon_max,lat_max (default: sample extent)
        #[arg(short, long)]
        bbox: Option<String>,
        /// Print the parameters as JSON
        #[arg(long)]
        json: bool,
        /// Also save the parameters as JSON to this file
        #[arg(short, long)]
        save: Option<PathBuf>,
    },
    /// Analyse samples onto a grid and write a GeoTIFF
    Analyze {
        /// Input samples (CSV with lon,lat,value columns)
        input: PathBuf,
        /// Output GeoTIFF
        output: PathBuf,
        /// Analysis box: lon_min,lat_min,lon_max,lat_max (default: sample extent)
        #[arg(short, long, conflicts_with = "grid")]
        bbox: Option<String>,
        /// Number of passes
        #[arg(short, long, default_value = "3")]
        passes: usize,
        /// Scale length factor for passes 2 and later, in (0, 1]
        #[arg(short, long, default_value = "1.0")]
        gain: f64,
        /// Explicit grid: lon0,dlon,nx,lat0,dlat,ny
        #[arg(long, requires = "scale_length")]
        grid: Option<String>,
        /// Background GeoTIFF to correct instead of the first pass; its grid is used
        #[arg(short = 'f', long, conflicts_with_all = ["grid", "bbox"], requires = "scale_length")]
        first_guess: Option<PathBuf>,
        /// Gaussian scale length in grid units (with --grid or --first-guess)
        #[arg(short = 'l', long)]
        scale_length: Option<f64>,
        /// Ignore samples whose weight at a cell is below this value
        #[arg(long)]
        cutoff: Option<f64>,
        /// Report residual RMSE after every pass
        #[arg(long)]
        report_rms: bool,
        /// Log every sample residual at TRACE level
        #[arg(long)]
        trace: bool,
        /// JSON file with analysis settings (trace, report_rms, influence_cutoff)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Write per-sample residuals against the final grid to this CSV
        #[arg(short, long)]
        residuals: Option<PathBuf>,
    },
    /// Show information about an analysed grid
    Info {
        /// Input GeoTIFF
        input: PathBuf,
    },
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool, trace: bool) -> Result<()> {
    let level = if trace {
        Level::TRACE
    } else if verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set default subscriber")?;
    Ok(())
}

fn spinner(msg: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    Ok(pb)
}

fn pass_bar(passes: usize) -> Result<ProgressBar> {
    let pb = ProgressBar::new(passes as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} pass {pos}/{len} [{bar:30.cyan/blue}] {msg}")?
            .progress_chars("=> "),
    );
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    Ok(pb)
}

fn read_samples(path: &PathBuf) -> Result<SampleSet> {
    let pb = spinner("Reading samples...")?;
    let samples = read_samples_csv(path)
        .with_context(|| format!("Failed to read samples from {}", path.display()))?;
    pb.finish_and_clear();
    info!("Input: {} samples", samples.len());
    Ok(samples)
}

fn write_result(grid: &Grid, path: &PathBuf) -> Result<()> {
    let pb = spinner("Writing output...")?;
    write_geotiff(grid, path).context("Failed to write output")?;
    pb.finish_and_clear();
    Ok(())
}

fn load_config(path: &PathBuf) -> Result<BarnesConfig> {
    read_json(path).with_context(|| format!("Failed to load config {}", path.display()))
}

fn done(name: &str, path: &PathBuf, elapsed: std::time::Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

fn parse_values(s: &str, expected: usize, what: &str) -> Result<Vec<f64>> {
    let values: Vec<f64> = s
        .split(',')
        .map(|v| v.trim().parse::<f64>())
        .collect::<std::result::Result<_, _>>()
        .with_context(|| format!("Invalid {}: {}", what, s))?;
    if values.len() != expected {
        anyhow::bail!("{} needs {} comma-separated values, got {}", what, expected, values.len());
    }
    Ok(values)
}

fn parse_bbox(s: &str) -> Result<BoundingBox> {
    let v = parse_values(s, 4, "bbox")?;
    let bbox = BoundingBox::new(v[0], v[1], v[2], v[3]);
    bbox.validate().context("Invalid bbox")?;
    Ok(bbox)
}

fn parse_count(v: f64, what: &str) -> Result<usize> {
    if v.fract() != 0.0 || v < 1.0 {
        anyhow::bail!("{} must be a positive integer, got {}", what, v);
    }
    Ok(v as usize)
}

fn parse_grid(s: &str) -> Result<GridAxes> {
    let v = parse_values(s, 6, "grid")?;
    let x = GridAxis::new(v[0], v[1], parse_count(v[2], "nx")?).context("Invalid x axis")?;
    let y = GridAxis::new(v[3], v[4], parse_count(v[5], "ny")?).context("Invalid y axis")?;
    Ok(GridAxes::new(x, y))
}

fn resolve_bbox(bbox: Option<&str>, samples: &SampleSet) -> Result<BoundingBox> {
    match bbox {
        Some(s) => parse_bbox(s),
        None => samples
            .bounding_box()
            .context("Cannot derive a bbox from an empty sample set"),
    }
}

fn print_parameters(ap: &AnalysisParameters) {
    println!("Grid spacing: {} x {} degrees", ap.grid_spacing_x, ap.grid_spacing_y);
    println!("Scale length: {:.4} grid units", ap.scale_length);
    println!("Random data spacing: {:.2} km", ap.random_data_spacing_km);
    println!(
        "Grid: {} x {} from ({}, {}) to ({}, {})",
        ap.axes.x.len(),
        ap.axes.y.len(),
        ap.axes.x.origin(),
        ap.axes.y.origin(),
        ap.axes.x.last(),
        ap.axes.y.last()
    );
}

fn run_with_progress(
    samples: &SampleSet,
    axes: &GridAxes,
    scale: f64,
    gain: f64,
    passes: usize,
    cfg: BarnesConfig,
) -> Result<(BarnesResult, std::time::Duration)> {
    let pb = pass_bar(passes)?;
    let start = Instant::now();
    let result = analyze_with_observer(samples, axes, scale, gain, passes, cfg, |report| {
        pb.set_position(report.pass as u64);
        if let Some(r) = report.rmse {
            pb.set_message(format!("RMSE {:.4}", r));
        }
        ControlFlow::Continue(())
    })
    .context("Failed to analyse samples")?;
    let elapsed = start.elapsed();
    pb.finish_and_clear();
    Ok((result, elapsed))
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    let trace = matches!(cli.command, Commands::Analyze { trace: true, .. });
    setup_logging(cli.verbose, trace)?;

    match cli.command {
        // ── Recommend ────────────────────────────────────────────────
        Commands::Recommend {
            input,
            bbox,
            json,
            save,
        } => {
            let samples = read_samples(&input)?;
            let bbox = resolve_bbox(bbox.as_deref(), &samples)?;
            let ap = recommend_parameters(&bbox, &samples)
                .context("Failed to recommend parameters")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&ap)?);
            } else {
                print_parameters(&ap);
            }
            if let Some(path) = &save {
                write_json(&ap, path).context("Failed to save parameters")?;
                println!("Parameters saved to: {}", path.display());
            }
        }

        // ── Analyze ──────────────────────────────────────────────────
        Commands::Analyze {
            input,
            output,
            bbox,
            passes,
            gain,
            grid,
            first_guess,
            scale_length,
            cutoff,
            report_rms,
            trace,
            config,
            residuals,
        } => {
            let mut cfg = match &config {
                Some(path) => load_config(path)?,
                None => BarnesConfig::default(),
            };
            cfg.report_rms |= report_rms;
            cfg.trace |= trace;
            if cutoff.is_some() {
                cfg.influence_cutoff = cutoff;
            }

            let samples = read_samples(&input)?;

            let (result, elapsed) = match (&first_guess, scale_length) {
                (Some(path), Some(scale)) => {
                    let pb = spinner("Reading first guess...")?;
                    let background = read_geotiff(path).with_context(|| {
                        format!("Failed to read first guess from {}", path.display())
                    })?;
                    pb.finish_and_clear();
                    let (nx, ny) = background.shape();
                    info!(
                        "First guess: {} x {}, scale length {:.4}, gain {}, {} passes",
                        nx, ny, scale, gain, passes
                    );
                    let start = Instant::now();
                    let result =
                        analyze_with_first_guess(&samples, &background, scale, gain, passes, cfg)
                            .context("Failed to analyse samples")?;
                    (result, start.elapsed())
                }
                (Some(_), None) => anyhow::bail!("--first-guess requires --scale-length"),
                (None, _) => {
                    let (axes, scale) = match (grid.as_deref(), scale_length) {
                        (Some(g), Some(l)) => (parse_grid(g)?, l),
                        (Some(_), None) => anyhow::bail!("--grid requires --scale-length"),
                        _ => {
                            let bbox = resolve_bbox(bbox.as_deref(), &samples)?;
                            let ap = recommend_parameters(&bbox, &samples)
                                .context("Failed to recommend parameters")?;
                            if cli.verbose {
                                print_parameters(&ap);
                            }
                            (ap.axes, ap.scale_length)
                        }
                    };
                    info!(
                        "Grid: {} x {}, scale length {:.4}, gain {}, {} passes",
                        axes.x.len(),
                        axes.y.len(),
                        scale,
                        gain,
                        passes
                    );
                    run_with_progress(&samples, &axes, scale, gain, passes, cfg)?
                }
            };

            for (pass, r) in &result.pass_rmse {
                println!("  Pass {} RMSE: {:.6}", pass, r);
            }

            write_result(&result.grid, &output)?;

            if let Some(path) = &residuals {
                let diffs = match result.residuals {
                    Some(d) => d,
                    None => point_residuals(&samples, &result.grid)
                        .context("Failed to compute residuals")?,
                };
                write_residuals_csv(path, &samples, &diffs)
                    .context("Failed to write residuals")?;
                println!("Residuals saved to: {} (RMSE {:.6})", path.display(), rmse(&diffs));
            }

            done("Barnes analysis", &output, elapsed);
        }

        // ── Info ─────────────────────────────────────────────────────
        Commands::Info { input } => {
            let pb = spinner("Reading grid...")?;
            let grid = read_geotiff(&input).context("Failed to read grid")?;
            pb.finish_and_clear();

            let (nx, ny) = grid.shape();
            let axes = grid.axes();
            let stats = grid.statistics();

            println!("File: {}", input.display());
            println!("Dimensions: {} x {} ({} cells)", nx, ny, grid.len());
            println!(
                "Longitude: {:.6} .. {:.6} step {:.6}",
                axes.x.origin(),
                axes.x.last(),
                axes.x.step()
            );
            println!(
                "Latitude: {:.6} .. {:.6} step {:.6}",
                axes.y.origin(),
                axes.y.last(),
                axes.y.step()
            );
            println!("\nStatistics:");
            println!("  Min: {:.4}", stats.min);
            println!("  Max: {:.4}", stats.max);
            println!("  Mean: {:.4}", stats.mean);
        }
    }

    Ok(())
}
