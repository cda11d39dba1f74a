//! Uniformly stepped grid axes
//!
//! An axis is fully described by its origin, its step and its length.
//! Coordinate `i` sits at `origin + i * step`, so "grid units" along the
//! axis are `(coord - origin) / step`.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Relative tolerance when checking that explicit coordinates are evenly spaced
const UNIFORM_TOLERANCE: f64 = 1e-6;

/// Slack added before flooring `extent / step`, so an exact multiple of the
/// step is not lost to floating-point error.
const COUNT_SLACK: f64 = 1e-9;

/// One axis of an analysis grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridAxis {
    origin: f64,
    step: f64,
    len: usize,
}

impl GridAxis {
    /// Create an axis from its origin, step and number of points.
    pub fn new(origin: f64, step: f64, len: usize) -> Result<Self> {
        if !origin.is_finite() {
            return Err(Error::invalid_parameter("origin", origin, "must be finite"));
        }
        if !(step.is_finite() && step > 0.0) {
            return Err(Error::invalid_parameter("step", step, "must be finite and > 0"));
        }
        if len == 0 {
            return Err(Error::invalid_parameter("len", len, "axis needs at least one point"));
        }
        Ok(Self { origin, step, len })
    }

    /// Build an axis from explicit coordinates.
    ///
    /// The origin is the smallest coordinate and the step is `|c[1] - c[0]|`.
    /// Coordinates must be finite, strictly increasing and evenly spaced.
    pub fn from_coords(coords: &[f64]) -> Result<Self> {
        if coords.len() < 2 {
            return Err(Error::invalid_input(format!(
                "axis needs at least two coordinates to define a step, got {}",
                coords.len()
            )));
        }
        if let Some(bad) = coords.iter().find(|c| !c.is_finite()) {
            return Err(Error::invalid_input(format!("axis coordinate {} is not finite", bad)));
        }

        let step = (coords[1] - coords[0]).abs();
        for (i, pair) in coords.windows(2).enumerate() {
            let delta = pair[1] - pair[0];
            if delta <= 0.0 {
                return Err(Error::invalid_input(format!(
                    "axis coordinates must be strictly increasing (index {})",
                    i + 1
                )));
            }
            if (delta - step).abs() > UNIFORM_TOLERANCE * step {
                return Err(Error::invalid_input(format!(
                    "axis coordinates must be evenly spaced: step {} at index {}, expected {}",
                    delta,
                    i + 1,
                    step
                )));
            }
        }

        let origin = coords.iter().copied().fold(f64::INFINITY, f64::min);
        Self::new(origin, step, coords.len())
    }

    /// Axis starting at `min`, stepping by `step` up to (and including) `max`
    /// when `max - min` is a whole number of steps.
    ///
    /// The axis has `floor((max - min) / step) + 1` points.
    pub fn recommended(min: f64, max: f64, step: f64) -> Result<Self> {
        let extent = max - min;
        if !(extent.is_finite() && extent >= 0.0) {
            return Err(Error::invalid_input(format!(
                "axis extent must be finite and non-negative, got {} .. {}",
                min, max
            )));
        }
        if !(step.is_finite() && step > 0.0) {
            return Err(Error::invalid_parameter("step", step, "must be finite and > 0"));
        }
        let len = (extent / step + COUNT_SLACK).floor() as usize + 1;
        Self::new(min, step, len)
    }

    pub fn origin(&self) -> f64 {
        self.origin
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false; an axis has at least one point.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Coordinate of the last point
    pub fn last(&self) -> f64 {
        self.coord(self.len - 1)
    }

    /// Coordinate of point `i` (not bounds-checked)
    #[inline]
    pub fn coord(&self, i: usize) -> f64 {
        self.origin + i as f64 * self.step
    }

    pub fn coords(&self) -> Vec<f64> {
        (0..self.len).map(|i| self.coord(i)).collect()
    }

    /// Convert a physical coordinate to fractional, 0-based grid units
    #[inline]
    pub fn to_grid_units(&self, value: f64) -> f64 {
        (value - self.origin) / self.step
    }
}

/// The x (longitude) and y (latitude) axes of an analysis grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridAxes {
    pub x: GridAxis,
    pub y: GridAxis,
}

impl GridAxes {
    pub fn new(x: GridAxis, y: GridAxis) -> Self {
        Self { x, y }
    }

    /// Build both axes from explicit coordinate arrays
    pub fn from_coords(x: &[f64], y: &[f64]) -> Result<Self> {
        Ok(Self::new(GridAxis::from_coords(x)?, GridAxis::from_coords(y)?))
    }

    /// Grid shape as (nx, ny)
    pub fn shape(&self) -> (usize, usize) {
        (self.x.len(), self.y.len())
    }

    /// Physical (lon, lat) to fractional grid units (gx, gy)
    #[inline]
    pub fn to_grid_units(&self, lon: f64, lat: f64) -> (f64, f64) {
        (self.x.to_grid_units(lon), self.y.to_grid_units(lat))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_from_coords() {
        let axis = GridAxis::from_coords(&[140.0, 140.5, 141.0, 141.5]).unwrap();
        assert_eq!(axis.len(), 4);
        assert_relative_eq!(axis.origin(), 140.0);
        assert_relative_eq!(axis.step(), 0.5);
        assert_relative_eq!(axis.last(), 141.5);
        assert_relative_eq!(axis.to_grid_units(140.75), 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_from_coords_rejects_uneven_and_decreasing() {
        assert!(GridAxis::from_coords(&[0.0, 1.0, 3.0]).is_err());
        assert!(GridAxis::from_coords(&[3.0, 2.0, 1.0]).is_err());
        assert!(GridAxis::from_coords(&[1.0]).is_err());
        assert!(GridAxis::from_coords(&[0.0, f64::NAN]).is_err());
    }

    #[test]
    fn test_new_rejects_bad_step() {
        assert!(matches!(
            GridAxis::new(0.0, 0.0, 3),
            Err(Error::InvalidParameter { name: "step", .. })
        ));
        assert!(GridAxis::new(0.0, -1.0, 3).is_err());
        assert!(GridAxis::new(0.0, 1.0, 0).is_err());
        assert!(GridAxis::new(0.0, 1.0, 1).is_ok());
    }

    #[test]
    fn test_recommended_includes_exact_boundary() {
        // 0.3 / 0.1 is 2.9999999999999996 in f64
        let axis = GridAxis::recommended(0.0, 0.3, 0.1).unwrap();
        assert_eq!(axis.len(), 4);

        let axis = GridAxis::recommended(140.0, 160.0, 0.1).unwrap();
        assert_eq!(axis.len(), 201);

        let axis = GridAxis::recommended(140.0, 160.0, 10.21).unwrap();
        assert_eq!(axis.len(), 2);
        assert!(axis.last() <= 160.0);
    }
}
