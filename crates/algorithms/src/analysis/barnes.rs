//! Multi-pass Barnes objective analysis
//!
//! Pass 1 sets every grid cell to the Gaussian-weighted mean of all samples,
//! or to a supplied first-guess field such as model output.
//! Each later pass interpolates the current grid back to the sample
//! locations (see [`scinex`](super::scinex)), takes the residuals
//! `value - estimate`, and adds their Gaussian-weighted mean to every cell.
//!
//! Cells are independent within a pass and are computed in parallel (x rows
//! are distributed across threads). Each cell sums its samples in index
//! order, so the result does not depend on the thread count. Passes run
//! strictly in sequence and every completed pass leaves a valid grid.

use std::ops::ControlFlow;
use std::time::Instant;

use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use barnes_core::{Algorithm, BoundingBox, Error, Grid, GridAxes, Result, SampleSet};

use super::recommend::{recommend_parameters, AnalysisParameters};
use super::scinex::scinex_unchecked;
use crate::maybe_rayon::*;

/// Accumulated weight below which a cell counts as out of reach of all samples
pub const WEIGHT_EPSILON: f64 = 1e-9;

/// Diagnostics and tuning that do not change the scheme itself.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BarnesConfig {
    /// Log every sample's grid position and residual at TRACE level
    pub trace: bool,
    /// Compute residual RMSE after every pass, including the last
    pub report_rms: bool,
    /// Ignore samples whose weight at a cell would be below this value.
    /// `None` uses every sample for every cell.
    pub influence_cutoff: Option<f64>,
}

/// How the analysis grid is chosen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GridSpec {
    /// Derive axes and scale length from sample density over `bbox`
    /// (the samples' own extent when `None`)
    Recommended { bbox: Option<BoundingBox> },
    /// Caller-supplied axes and Gaussian scale length in grid units
    Explicit { axes: GridAxes, scale_length: f64 },
}

impl Default for GridSpec {
    fn default() -> Self {
        GridSpec::Recommended { bbox: None }
    }
}

/// Parameters for Barnes analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarnesParams {
    /// Grid and scale length selection
    pub grid: GridSpec,
    /// Factor applied to the scale length once, before pass 2 (0 < gain <= 1)
    pub gain: f64,
    /// Number of passes: 3 for general use, 4 when derivatives matter,
    /// 2 for a quick look
    pub passes: usize,
    pub config: BarnesConfig,
}

impl Default for BarnesParams {
    fn default() -> Self {
        Self {
            grid: GridSpec::default(),
            gain: 1.0,
            passes: 3,
            config: BarnesConfig::default(),
        }
    }
}

/// Progress after one completed pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassReport {
    pub pass: usize,
    pub passes: usize,
    /// Scale length (grid units) used by this pass
    pub scale_length: f64,
    /// Residual RMSE against this pass's grid, when it was computed
    pub rmse: Option<f64>,
}

/// Output of a Barnes analysis
#[derive(Debug, Clone)]
pub struct BarnesResult {
    pub grid: Grid,
    /// Residuals against the returned grid, when they were computed
    pub residuals: Option<Vec<f64>>,
    /// (pass, RMSE) for every pass whose residuals were reported
    pub pass_rmse: Vec<(usize, f64)>,
    pub passes_completed: usize,
    /// Scale length used by the last completed pass
    pub final_scale_length: f64,
    /// Recommended parameters, when the grid was derived from sample density
    pub parameters: Option<AnalysisParameters>,
}

/// Barnes objective analysis
#[derive(Debug, Clone, Default)]
pub struct BarnesAnalysis;

impl Algorithm for BarnesAnalysis {
    type Input = SampleSet;
    type Output = BarnesResult;
    type Params = BarnesParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Barnes"
    }

    fn description(&self) -> &'static str {
        "Multi-pass Gaussian-weighted objective analysis of scattered samples onto a regular grid"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        barnes(&input, params)
    }
}

/// Run an analysis described by `params`.
///
/// With [`GridSpec::Recommended`], axes and scale length come from
/// [`recommend_parameters`] and need at least two samples.
pub fn barnes(samples: &SampleSet, params: BarnesParams) -> Result<BarnesResult> {
    match params.grid {
        GridSpec::Explicit { axes, scale_length } => analyze_with_config(
            samples,
            &axes,
            scale_length,
            params.gain,
            params.passes,
            params.config,
        ),
        GridSpec::Recommended { bbox } => {
            samples.validate()?;
            let bbox = match bbox {
                Some(b) => b,
                None => samples
                    .bounding_box()
                    .ok_or_else(|| Error::InvalidInput {
                        what: "sample set is empty".into(),
                    })?,
            };
            let ap = recommend_parameters(&bbox, samples)?;
            let mut result = analyze_with_config(
                samples,
                &ap.axes,
                ap.scale_length,
                params.gain,
                params.passes,
                params.config,
            )?;
            result.parameters = Some(ap);
            Ok(result)
        }
    }
}

/// Analyse `samples` over `bbox` with recommended parameters and gain 1.
pub fn analyze_with_defaults(
    bbox: &BoundingBox,
    samples: &SampleSet,
    passes: usize,
) -> Result<Grid> {
    let params = BarnesParams {
        grid: GridSpec::Recommended { bbox: Some(*bbox) },
        passes,
        ..Default::default()
    };
    Ok(barnes(samples, params)?.grid)
}

/// Analyse `samples` onto `axes`.
///
/// # Arguments
/// * `scale_length` - Gaussian length scale in grid units, roughly the
///   average data spacing
/// * `gain` - Scale length factor for passes 2 and later, in (0, 1]. Smaller
///   values fit the data more closely at the expense of overall accuracy.
/// * `passes` - Number of passes, at least 1
pub fn analyze(
    samples: &SampleSet,
    axes: &GridAxes,
    scale_length: f64,
    gain: f64,
    passes: usize,
) -> Result<Grid> {
    Ok(analyze_with_config(samples, axes, scale_length, gain, passes, BarnesConfig::default())?.grid)
}

/// [`analyze`] with explicit diagnostics configuration and a detailed result
pub fn analyze_with_config(
    samples: &SampleSet,
    axes: &GridAxes,
    scale_length: f64,
    gain: f64,
    passes: usize,
    config: BarnesConfig,
) -> Result<BarnesResult> {
    analyze_with_observer(samples, axes, scale_length, gain, passes, config, |_| {
        ControlFlow::Continue(())
    })
}

/// [`analyze_with_config`] calling `observer` after every completed pass.
///
/// Returning `ControlFlow::Break(())` stops the analysis; the grid of the
/// last completed pass is returned and `passes_completed` says how many ran.
///
/// # Algorithm
///
/// ```text
/// w_k(i, j) = exp(-r_k² / L²)                 r in grid units
/// pass 1:  g(i, j)  = Σ w_k v_k / Σ w_k         (sample mean if Σ w_k <= ε)
/// pass p:  g(i, j) += Σ w_k d_k / Σ w_k         (unchanged if Σ w_k <= ε)
///          d_k = v_k - scinex(g, x_k, y_k) from the previous pass
/// L *= gain once, before pass 2
/// ```
pub fn analyze_with_observer<F>(
    samples: &SampleSet,
    axes: &GridAxes,
    scale_length: f64,
    gain: f64,
    passes: usize,
    config: BarnesConfig,
    observer: F,
) -> Result<BarnesResult>
where
    F: FnMut(&PassReport) -> ControlFlow<()>,
{
    let plan = PassPlan {
        scale_length,
        gain,
        passes,
        config,
    };
    run_passes(samples, axes, Start::Gaussian, plan, observer)
}

/// Analyse `samples` starting from a background field instead of pass 1.
///
/// `first_guess` (for example model output on the analysis grid) becomes the
/// pass-1 grid: its non-finite cells take the sample mean, residuals are taken
/// against it, and passes 2..=`passes` correct it exactly as in [`analyze`],
/// with the scale length multiplied by `gain` before pass 2. The analysis
/// runs on `first_guess`'s own axes. With `passes == 1` the filled first
/// guess is returned unchanged.
pub fn analyze_with_first_guess(
    samples: &SampleSet,
    first_guess: &Grid,
    scale_length: f64,
    gain: f64,
    passes: usize,
    config: BarnesConfig,
) -> Result<BarnesResult> {
    let plan = PassPlan {
        scale_length,
        gain,
        passes,
        config,
    };
    run_passes(
        samples,
        first_guess.axes(),
        Start::FirstGuess(first_guess.values()),
        plan,
        |_| ControlFlow::Continue(()),
    )
}

/// How pass 1 fills the grid
enum Start<'a> {
    /// Gaussian-weighted mean of the sample values
    Gaussian,
    /// Supplied background field, non-finite cells replaced by the sample mean
    FirstGuess(&'a Array2<f64>),
}

#[derive(Debug, Clone, Copy)]
struct PassPlan {
    scale_length: f64,
    gain: f64,
    passes: usize,
    config: BarnesConfig,
}

fn run_passes<F>(
    samples: &SampleSet,
    axes: &GridAxes,
    start: Start<'_>,
    plan: PassPlan,
    mut observer: F,
) -> Result<BarnesResult>
where
    F: FnMut(&PassReport) -> ControlFlow<()>,
{
    let PassPlan {
        scale_length,
        gain,
        passes,
        config,
    } = plan;
    validate(samples, scale_length, gain, passes, &config)?;

    let (nx, ny) = axes.shape();
    let positions: Vec<(f64, f64)> = samples
        .points()
        .map(|p| axes.to_grid_units(p.lon, p.lat))
        .collect();
    let values = samples.value();
    let mean = samples.mean().unwrap_or(0.0);

    debug!(
        "Barnes analysis: {} samples onto {} x {} grid, L = {}, gain = {}, {} passes",
        samples.len(),
        nx,
        ny,
        scale_length,
        gain,
        passes
    );

    let mut grid = Array2::<f64>::zeros((nx, ny));
    let mut scale = scale_length;
    let mut differences: Vec<f64> = Vec::new();
    let mut residuals_current = false;
    let mut pass_rmse = Vec::new();
    let mut completed = 0;

    for pass in 1..=passes {
        let started = Instant::now();

        if pass == 1 {
            match start {
                Start::Gaussian => {
                    let sums =
                        weighted_sums(&positions, values, (nx, ny), scale, config.influence_cutoff);
                    for (cell, (w, c)) in grid.iter_mut().zip(sums) {
                        *cell = if w > WEIGHT_EPSILON { c / w } else { mean };
                    }
                }
                Start::FirstGuess(background) => {
                    let mut filled = 0usize;
                    for (cell, &b) in grid.iter_mut().zip(background.iter()) {
                        *cell = if b.is_finite() {
                            b
                        } else {
                            filled += 1;
                            mean
                        };
                    }
                    if filled > 0 {
                        debug!("First guess: {} non-finite cells set to the sample mean", filled);
                    }
                }
            }
        } else {
            if pass == 2 {
                scale *= gain;
            }
            let sums =
                weighted_sums(&positions, &differences, (nx, ny), scale, config.influence_cutoff);
            for (cell, (w, c)) in grid.iter_mut().zip(sums) {
                if w > WEIGHT_EPSILON {
                    *cell += c / w;
                }
            }
        }
        completed = pass;

        let mut rmse_now = None;
        if pass < passes || config.report_rms {
            differences = residuals_at(&positions, values, &grid.view());
            residuals_current = true;

            if config.trace {
                for (k, (&(gx, gy), d)) in positions.iter().zip(&differences).enumerate() {
                    trace!("pass {} sample {} at ({:.4}, {:.4}) residual {}", pass, k, gx, gy, d);
                }
            }
            if config.report_rms {
                let r = rmse(&differences);
                info!("Pass {} RMSE (at data points) = {}", pass, r);
                pass_rmse.push((pass, r));
                rmse_now = Some(r);
            }
        } else {
            residuals_current = false;
        }

        debug!(
            "Pass {}/{} done in {:.2?} (L = {})",
            pass,
            passes,
            started.elapsed(),
            scale
        );

        let report = PassReport {
            pass,
            passes,
            scale_length: scale,
            rmse: rmse_now,
        };
        if observer(&report).is_break() && pass < passes {
            debug!("Analysis stopped after pass {} of {}", pass, passes);
            break;
        }
    }

    Ok(BarnesResult {
        grid: Grid::new(grid, *axes)?,
        residuals: residuals_current.then_some(differences),
        pass_rmse,
        passes_completed: completed,
        final_scale_length: scale,
        parameters: None,
    })
}

/// Residual `value - grid estimate` at every sample location.
///
/// The grid is resampled with [`scinex`](super::scinex) at each sample's
/// fractional position on the grid's own axes.
pub fn point_residuals(samples: &SampleSet, grid: &Grid) -> Result<Vec<f64>> {
    samples.validate()?;
    let axes = grid.axes();
    let positions: Vec<(f64, f64)> = samples
        .points()
        .map(|p| axes.to_grid_units(p.lon, p.lat))
        .collect();
    Ok(residuals_at(&positions, samples.value(), &grid.view()))
}

/// Root mean square of `residuals`
pub fn rmse(residuals: &[f64]) -> f64 {
    let sum_sq: f64 = residuals.iter().map(|d| d * d).sum();
    (sum_sq / residuals.len() as f64).sqrt()
}

fn validate(
    samples: &SampleSet,
    scale_length: f64,
    gain: f64,
    passes: usize,
    config: &BarnesConfig,
) -> Result<()> {
    samples.validate()?;
    if !(scale_length.is_finite() && scale_length > 0.0) {
        return Err(Error::InvalidParameter {
            name: "scale_length",
            value: scale_length.to_string(),
            reason: "must be finite and > 0".into(),
        });
    }
    if !(gain > 0.0 && gain <= 1.0) {
        return Err(Error::InvalidParameter {
            name: "gain",
            value: gain.to_string(),
            reason: "must be in (0, 1]".into(),
        });
    }
    if passes == 0 {
        return Err(Error::InvalidParameter {
            name: "passes",
            value: passes.to_string(),
            reason: "at least one pass is required".into(),
        });
    }
    if let Some(w0) = config.influence_cutoff {
        if !(w0 > 0.0 && w0 < 1.0) {
            return Err(Error::InvalidParameter {
                name: "influence_cutoff",
                value: w0.to_string(),
                reason: "must be in (0, 1)".into(),
            });
        }
    }
    Ok(())
}

/// (Σw, Σw·q) for every cell in x-major order, with w = exp(-r²/L²).
fn weighted_sums(
    positions: &[(f64, f64)],
    quantities: &[f64],
    (nx, ny): (usize, usize),
    scale_length: f64,
    influence_cutoff: Option<f64>,
) -> Vec<(f64, f64)> {
    let l2 = scale_length * scale_length;
    // w >= w0  <=>  r² <= -L² ln(w0)
    let reach2 = influence_cutoff.map_or(f64::INFINITY, |w0| -l2 * w0.ln());

    (0..nx)
        .into_par_iter()
        .flat_map(|i| {
            let x = i as f64;
            let mut row = Vec::with_capacity(ny);
            for j in 0..ny {
                let y = j as f64;
                let mut sum_w = 0.0;
                let mut sum_c = 0.0;
                for (&(gx, gy), &q) in positions.iter().zip(quantities) {
                    let dx = gx - x;
                    let dy = gy - y;
                    let r2 = dx * dx + dy * dy;
                    if r2 >= reach2 {
                        continue;
                    }
                    let w = (-r2 / l2).exp();
                    sum_w += w;
                    sum_c += w * q;
                }
                row.push((sum_w, sum_c));
            }
            row
        })
        .collect()
}

fn residuals_at(positions: &[(f64, f64)], values: &[f64], grid: &ArrayView2<'_, f64>) -> Vec<f64> {
    positions
        .par_iter()
        .zip(values.par_iter())
        .map(|(&(gx, gy), &v)| v - scinex_unchecked(grid, gx, gy))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use barnes_core::{GridAxis, SamplePoint};

    fn axes(nx: usize, ny: usize) -> GridAxes {
        GridAxes::new(
            GridAxis::new(0.0, 1.0, nx).unwrap(),
            GridAxis::new(0.0, 1.0, ny).unwrap(),
        )
    }

    fn scattered() -> SampleSet {
        SampleSet::from_points(&[
            SamplePoint::new(1.5, 2.0, 10.0),
            SamplePoint::new(7.0, 1.0, 4.0),
            SamplePoint::new(4.2, 6.5, -3.0),
            SamplePoint::new(8.5, 8.0, 6.0),
            SamplePoint::new(2.0, 8.5, 1.0),
        ])
    }

    #[test]
    fn test_single_sample_gives_constant_grid() {
        let samples = SampleSet::from_points(&[SamplePoint::new(3.3, 4.4, 42.0)]);
        let grid = analyze(&samples, &axes(10, 12), 2.0, 1.0, 3).unwrap();
        for &v in grid.values().iter() {
            assert!((v - 42.0).abs() < 1e-9, "expected 42.0, got {}", v);
        }
    }

    #[test]
    fn test_far_cells_fall_back_to_mean() {
        // Tiny scale length: only the cells at the samples receive weight
        let samples = SampleSet::from_points(&[
            SamplePoint::new(0.0, 0.0, 2.0),
            SamplePoint::new(9.0, 9.0, 4.0),
        ]);
        let result = analyze_with_config(&samples, &axes(10, 10), 0.1, 1.0, 1, BarnesConfig::default())
            .unwrap();
        let g = result.grid.values();
        assert!((g[[0, 0]] - 2.0).abs() < 1e-12);
        assert!((g[[9, 9]] - 4.0).abs() < 1e-12);
        assert_eq!(g[[5, 5]], 3.0);
    }

    #[test]
    fn test_later_passes_leave_unreached_cells_alone() {
        let samples = SampleSet::from_points(&[
            SamplePoint::new(0.0, 0.0, 2.0),
            SamplePoint::new(9.0, 9.0, 4.0),
        ]);
        let one = analyze(&samples, &axes(10, 10), 0.1, 1.0, 1).unwrap();
        let three = analyze(&samples, &axes(10, 10), 0.1, 1.0, 3).unwrap();
        assert_eq!(one.values()[[5, 5]], three.values()[[5, 5]]);
    }

    #[test]
    fn test_passes_reduce_residuals() {
        let samples = scattered();
        let config = BarnesConfig {
            report_rms: true,
            ..Default::default()
        };
        let result = analyze_with_config(&samples, &axes(11, 11), 2.0, 1.0, 4, config).unwrap();

        assert_eq!(result.pass_rmse.len(), 4);
        let first = result.pass_rmse[0].1;
        let last = result.pass_rmse[3].1;
        assert!(last < first, "RMSE should fall across passes: {} -> {}", first, last);

        let residuals = result.residuals.expect("residuals reported for the final grid");
        let recomputed = point_residuals(&samples, &result.grid).unwrap();
        assert_eq!(residuals, recomputed);
    }

    #[test]
    fn test_residuals_absent_for_final_pass_by_default() {
        let result =
            analyze_with_config(&scattered(), &axes(11, 11), 2.0, 1.0, 3, BarnesConfig::default())
                .unwrap();
        assert!(result.residuals.is_none());
        assert!(result.pass_rmse.is_empty());
        assert_eq!(result.passes_completed, 3);
    }

    #[test]
    fn test_gain_applied_once() {
        let result =
            analyze_with_config(&scattered(), &axes(11, 11), 4.0, 0.5, 4, BarnesConfig::default())
                .unwrap();
        assert_eq!(result.final_scale_length, 2.0);

        let mut seen = Vec::new();
        analyze_with_observer(&scattered(), &axes(11, 11), 4.0, 0.5, 4, BarnesConfig::default(), |r| {
            seen.push(r.scale_length);
            ControlFlow::Continue(())
        })
        .unwrap();
        assert_eq!(seen, vec![4.0, 2.0, 2.0, 2.0]);
    }

    #[test]
    fn test_observer_can_stop_early() {
        let samples = scattered();
        let stopped = analyze_with_observer(
            &samples,
            &axes(11, 11),
            2.0,
            1.0,
            4,
            BarnesConfig::default(),
            |r| {
                if r.pass == 2 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            },
        )
        .unwrap();
        assert_eq!(stopped.passes_completed, 2);

        let two = analyze(&samples, &axes(11, 11), 2.0, 1.0, 2).unwrap();
        assert_eq!(stopped.grid, two);
        // Residuals were computed against the pass-2 grid for the next pass
        assert_eq!(stopped.residuals.unwrap(), point_residuals(&samples, &two).unwrap());
    }

    #[test]
    fn test_deterministic() {
        let a = analyze(&scattered(), &axes(15, 13), 3.0, 0.7, 3).unwrap();
        let b = analyze(&scattered(), &axes(15, 13), 3.0, 0.7, 3).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_influence_cutoff_matches_full_sum_closely() {
        let samples = scattered();
        let full = analyze(&samples, &axes(11, 11), 2.0, 1.0, 3).unwrap();
        let config = BarnesConfig {
            influence_cutoff: Some(1e-11),
            ..Default::default()
        };
        let cut = analyze_with_config(&samples, &axes(11, 11), 2.0, 1.0, 3, config).unwrap();
        for (a, b) in full.values().iter().zip(cut.grid.values().iter()) {
            assert!((a - b).abs() < 1e-6, "cutoff changed {} to {}", a, b);
        }
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let s = scattered();
        let a = axes(5, 5);
        assert!(matches!(
            analyze(&s, &a, 0.0, 1.0, 3),
            Err(Error::InvalidParameter { name: "scale_length", .. })
        ));
        assert!(matches!(
            analyze(&s, &a, 2.0, 1.5, 3),
            Err(Error::InvalidParameter { name: "gain", .. })
        ));
        assert!(matches!(
            analyze(&s, &a, 2.0, 0.0, 3),
            Err(Error::InvalidParameter { name: "gain", .. })
        ));
        assert!(matches!(
            analyze(&s, &a, 2.0, 1.0, 0),
            Err(Error::InvalidParameter { name: "passes", .. })
        ));
        assert!(matches!(
            analyze(&SampleSet::default(), &a, 2.0, 1.0, 3),
            Err(Error::InvalidInput { .. })
        ));

        let nan = SampleSet::new(vec![1.0], vec![f64::INFINITY], vec![1.0]).unwrap();
        assert!(matches!(analyze(&nan, &a, 2.0, 1.0, 3), Err(Error::InvalidInput { .. })));
    }

    #[test]
    fn test_first_guess_equal_to_pass_one_reproduces_analyze() {
        let samples = scattered();
        let a = axes(11, 11);
        let pass_one = analyze(&samples, &a, 2.5, 0.6, 1).unwrap();

        let seeded =
            analyze_with_first_guess(&samples, &pass_one, 2.5, 0.6, 3, BarnesConfig::default())
                .unwrap();
        let full = analyze(&samples, &a, 2.5, 0.6, 3).unwrap();

        for (x, y) in seeded.grid.values().iter().zip(full.values().iter()) {
            assert_eq!(x.to_bits(), y.to_bits());
        }
        assert_eq!(seeded.passes_completed, 3);
        assert_eq!(seeded.final_scale_length, 1.5);
    }

    #[test]
    fn test_first_guess_non_finite_cells_take_mean() {
        let samples = scattered();
        let mut background = Array2::from_elem((11, 11), 1.25);
        background[[3, 3]] = f64::NAN;
        background[[0, 10]] = f64::INFINITY;
        let first_guess = Grid::new(background, axes(11, 11)).unwrap();

        let result =
            analyze_with_first_guess(&samples, &first_guess, 2.0, 1.0, 1, BarnesConfig::default())
                .unwrap();
        let g = result.grid.values();
        let mean = samples.mean().unwrap();
        assert_eq!(g[[3, 3]], mean);
        assert_eq!(g[[0, 10]], mean);
        assert_eq!(g[[5, 5]], 1.25);
        assert!(result.residuals.is_none());
    }

    #[test]
    fn test_first_guess_is_corrected_toward_samples() {
        let samples = scattered();
        let first_guess = Grid::new(Array2::from_elem((11, 11), 100.0), axes(11, 11)).unwrap();
        let config = BarnesConfig {
            report_rms: true,
            ..Default::default()
        };
        let result = analyze_with_first_guess(&samples, &first_guess, 2.0, 1.0, 3, config).unwrap();

        assert_eq!(result.pass_rmse.len(), 3);
        let background = result.pass_rmse[0].1;
        let last = result.pass_rmse[2].1;
        assert!(background > 90.0, "background RMSE {}", background);
        assert!(last < background / 10.0, "RMSE {} -> {}", background, last);

        let residuals = result.residuals.expect("residuals reported for the final grid");
        assert_eq!(residuals, point_residuals(&samples, &result.grid).unwrap());
    }

    #[test]
    fn test_first_guess_invalid_parameters_rejected() {
        let first_guess = Grid::new(Array2::zeros((5, 5)), axes(5, 5)).unwrap();
        let s = scattered();
        let config = BarnesConfig::default();
        assert!(matches!(
            analyze_with_first_guess(&s, &first_guess, -1.0, 1.0, 3, config),
            Err(Error::InvalidParameter { name: "scale_length", .. })
        ));
        assert!(matches!(
            analyze_with_first_guess(&s, &first_guess, 2.0, 1.0, 0, config),
            Err(Error::InvalidParameter { name: "passes", .. })
        ));
        assert!(matches!(
            analyze_with_first_guess(&SampleSet::default(), &first_guess, 2.0, 1.0, 3, config),
            Err(Error::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_recommended_needs_two_samples() {
        let single = SampleSet::from_points(&[SamplePoint::new(150.0, -50.0, 1.0)]);
        let params = BarnesParams {
            grid: GridSpec::Recommended {
                bbox: Some(BoundingBox::new(140.0, -60.0, 160.0, -40.0)),
            },
            ..Default::default()
        };
        assert!(matches!(barnes(&single, params), Err(Error::DegenerateGrid { .. })));
    }

    #[test]
    fn test_algorithm_trait() {
        let algo = BarnesAnalysis;
        assert_eq!(algo.name(), "Barnes");
        let samples = SampleSet::from_points(&[
            SamplePoint::new(140.0, -40.0, 1.0),
            SamplePoint::new(150.0, -50.0, 2.0),
            SamplePoint::new(160.0, -60.0, 3.0),
        ]);
        let result = algo.execute_default(samples).unwrap();
        assert_eq!(result.passes_completed, 3);
        let ap = result.parameters.expect("recommended parameters recorded");
        assert_eq!(result.grid.shape(), ap.axes.shape());
    }
}
