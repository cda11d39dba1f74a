//! The analysed field

use ndarray::{Array2, ArrayView2};

use crate::error::{Error, Result};
use crate::grid::{GeoTransform, GridAxes};

/// A dense analysed field on a pair of uniform axes.
///
/// Values are stored as an `Array2<f64>` of shape `(nx, ny)` and indexed
/// `[i, j]` with `i` along x (longitude) and `j` along y (latitude).
/// Every cell holds a value; there is no no-data marker.
///
/// # Example
///
/// ```ignore
/// use barnes_core::{Grid, GridAxes, GridAxis};
///
/// let axes = GridAxes::new(GridAxis::new(140.0, 0.5, 41)?, GridAxis::new(-60.0, 0.5, 41)?);
/// let grid = Grid::filled(axes, 0.0);
/// let value = grid.get(10, 20)?;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    values: Array2<f64>,
    axes: GridAxes,
}

impl Grid {
    /// Wrap an existing array. Its shape must equal `axes.shape()`.
    pub fn new(values: Array2<f64>, axes: GridAxes) -> Result<Self> {
        let (nx, ny) = axes.shape();
        if values.dim() != (nx, ny) {
            let (ax, ay) = values.dim();
            return Err(Error::invalid_input(format!(
                "grid values have shape ({}, {}), axes expect ({}, {})",
                ax, ay, nx, ny
            )));
        }
        Ok(Self { values, axes })
    }

    /// A grid with every cell set to `value`
    pub fn filled(axes: GridAxes, value: f64) -> Self {
        Self {
            values: Array2::from_elem(axes.shape(), value),
            axes,
        }
    }

    /// Build from x-major flat data (`data[i * ny + j]`)
    pub fn from_vec(data: Vec<f64>, axes: GridAxes) -> Result<Self> {
        let (nx, ny) = axes.shape();
        if data.len() != nx * ny {
            return Err(Error::SizeMismatch {
                name: "grid data",
                expected: nx * ny,
                actual: data.len(),
            });
        }
        let values =
            Array2::from_shape_vec((nx, ny), data).map_err(|e| Error::Other(e.to_string()))?;
        Ok(Self { values, axes })
    }

    // Dimensions

    /// Shape as (nx, ny)
    pub fn shape(&self) -> (usize, usize) {
        self.values.dim()
    }

    pub fn nx(&self) -> usize {
        self.values.nrows()
    }

    pub fn ny(&self) -> usize {
        self.values.ncols()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    // Data access

    /// Value at cell (i, j)
    pub fn get(&self, i: usize, j: usize) -> Result<f64> {
        self.values
            .get((i, j))
            .copied()
            .ok_or(Error::IndexOutOfBounds {
                i,
                j,
                nx: self.nx(),
                ny: self.ny(),
            })
    }

    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn axes(&self) -> &GridAxes {
        &self.axes
    }

    // Coordinates

    /// Physical (lon, lat) of cell (i, j)
    pub fn coords(&self, i: usize, j: usize) -> Option<(f64, f64)> {
        if i >= self.nx() || j >= self.ny() {
            return None;
        }
        Some((self.axes.x.coord(i), self.axes.y.coord(j)))
    }

    /// Cell whose node is closest to (lon, lat), or `None` when the location
    /// lies more than half a cell outside the grid.
    pub fn nearest_cell(&self, lon: f64, lat: f64) -> Option<(usize, usize)> {
        let (gx, gy) = self.axes.to_grid_units(lon, lat);
        let i = gx.round();
        let j = gy.round();
        if !(i >= 0.0 && j >= 0.0 && i < self.nx() as f64 && j < self.ny() as f64) {
            return None;
        }
        Some((i as usize, j as usize))
    }

    /// North-up georeferencing with pixel centres on the grid nodes
    pub fn geotransform(&self) -> GeoTransform {
        GeoTransform::from_axes(&self.axes)
    }

    // Statistics

    pub fn statistics(&self) -> GridStatistics {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        for &v in self.values.iter() {
            min = min.min(v);
            max = max.max(v);
            sum += v;
        }
        let count = self.len();
        GridStatistics {
            min,
            max,
            mean: if count > 0 { sum / count as f64 } else { f64::NAN },
            count,
        }
    }

    /// Variance of all first differences along x and y.
    ///
    /// Lower values mean a smoother field. Returns 0 for a single cell.
    pub fn first_difference_variance(&self) -> f64 {
        let (nx, ny) = self.shape();
        let mut diffs = Vec::with_capacity(nx.saturating_sub(1) * ny + nx * ny.saturating_sub(1));
        for i in 0..nx {
            for j in 0..ny {
                let v = self.values[[i, j]];
                if i + 1 < nx {
                    diffs.push(self.values[[i + 1, j]] - v);
                }
                if j + 1 < ny {
                    diffs.push(self.values[[i, j + 1]] - v);
                }
            }
        }
        if diffs.is_empty() {
            return 0.0;
        }
        let n = diffs.len() as f64;
        let mean = diffs.iter().sum::<f64>() / n;
        diffs.iter().map(|d| (d - mean) * (d - mean)).sum::<f64>() / n
    }
}

/// Basic statistics for a grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridStatistics {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub count: usize,
}
