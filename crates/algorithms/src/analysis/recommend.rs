//! Analysis parameters derived from sample density
//!
//! Choosing the grid spacing and Gaussian scale length is the hardest part of
//! an objective analysis. The literature derives both from the average
//! station spacing. Here the stations are assumed to be randomly distributed,
//! so the spacing follows from the sample count and the area alone.

use serde::{Deserialize, Serialize};
use tracing::debug;

use barnes_core::{BoundingBox, Error, GridAxes, GridAxis, Result, SampleSet};

use super::distance::deg_to_km;

/// Grid spacing as a fraction of the random data spacing
const GRID_SPACING_FRACTION: f64 = 0.3;

/// Recommended settings for one analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisParameters {
    /// Length of one grid step along x, in degrees (rounded to 0.01)
    pub grid_spacing_x: f64,
    /// Length of one grid step along y, in degrees (rounded to 0.01)
    pub grid_spacing_y: f64,
    /// Gaussian scale length in grid units
    pub scale_length: f64,
    /// Expected station spacing for randomly placed samples, in km
    pub random_data_spacing_km: f64,
    /// Axes starting at the box minimum with the rounded spacings
    pub axes: GridAxes,
}

/// Expected nearest-neighbour spacing (km) of `n` randomly placed samples
/// over a `km_x` by `km_y` area: `sqrt(km_x * km_y) * (1 + sqrt(n)) / (n - 1)`.
///
/// Undefined for `n <= 1`.
pub fn random_data_spacing(km_x: f64, km_y: f64, n: usize) -> f64 {
    let n = n as f64;
    (km_x * km_y).sqrt() * ((1.0 + n.sqrt()) / (n - 1.0))
}

/// Round to the nearest 0.01 degree
fn round_hundredth(degrees: f64) -> f64 {
    (degrees * 100.0).round() / 100.0
}

/// Recommend grid spacing, scale length and axes for `samples` over `bbox`.
///
/// # Algorithm
///
/// ```text
/// (km_x, km_y) = deg_to_km(bbox)
/// r            = sqrt(km_x km_y) (1 + sqrt(N)) / (N - 1)
/// L_deg        = r * (deg_x / km_x)
/// dx, dy       = round_0.01(0.3 r * deg/km per axis)
/// L            = L_deg / dx                         (grid units)
/// ```
///
/// Each axis starts at the box minimum and has `floor(extent / step) + 1`
/// points.
///
/// # Errors
/// * `InvalidInput` for an invalid box or sample set
/// * `DegenerateGrid` when fewer than two samples are given, or when a
///   spacing rounds to zero
pub fn recommend_parameters(bbox: &BoundingBox, samples: &SampleSet) -> Result<AnalysisParameters> {
    bbox.validate()?;
    samples.validate()?;

    let n = samples.len();
    if n <= 1 {
        return Err(Error::DegenerateGrid {
            reason: format!("sample density is undefined for {} sample(s); need at least 2", n),
        });
    }

    let degrees_x = bbox.width();
    let degrees_y = bbox.height();

    let (km_x, km_y) = deg_to_km(bbox.lon_min, bbox.lat_min, bbox.lon_max, bbox.lat_max);
    let km_x = km_x.abs();
    let km_y = km_y.abs();

    let degrees_per_km_x = degrees_x / km_x;
    let degrees_per_km_y = degrees_y / km_y;

    let spacing_km = random_data_spacing(km_x, km_y, n);
    let scale_length_deg = spacing_km * degrees_per_km_x;
    let grid_space_km = spacing_km * GRID_SPACING_FRACTION;

    let grid_spacing_x = round_hundredth(grid_space_km * degrees_per_km_x);
    let grid_spacing_y = round_hundredth(grid_space_km * degrees_per_km_y);

    if grid_spacing_x <= 0.0 || grid_spacing_y <= 0.0 {
        return Err(Error::DegenerateGrid {
            reason: format!(
                "recommended spacing rounds to zero ({} x {} degrees) for {} samples",
                grid_spacing_x, grid_spacing_y, n
            ),
        });
    }

    let scale_length = scale_length_deg / grid_spacing_x;

    let axes = GridAxes::new(
        GridAxis::recommended(bbox.lon_min, bbox.lon_max, grid_spacing_x)?,
        GridAxis::recommended(bbox.lat_min, bbox.lat_max, grid_spacing_y)?,
    );

    debug!(
        "Recommended grid {} x {} (spacing {} x {} deg), scale length {:.4} grid units, random spacing {:.2} km",
        axes.x.len(),
        axes.y.len(),
        grid_spacing_x,
        grid_spacing_y,
        scale_length,
        spacing_km
    );

    Ok(AnalysisParameters {
        grid_spacing_x,
        grid_spacing_y,
        scale_length,
        random_data_spacing_km: spacing_km,
        axes,
    })
}
