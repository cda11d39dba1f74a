//! Affine georeferencing of an analysis grid

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::grid::{GridAxes, GridAxis};

/// Affine transformation between raster pixels and geographic coordinates.
///
/// Converts pixel coordinates (col, row) to geographic coordinates (x, y):
/// ```text
/// x = origin_x + col * pixel_width
/// y = origin_y + row * pixel_height
/// ```
///
/// A grid exported as a raster is written north-up: raster row 0 holds the
/// largest latitude and `pixel_height` is negative. Pixel centres coincide
/// with grid nodes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    /// X coordinate of the upper-left corner
    pub origin_x: f64,
    /// Y coordinate of the upper-left corner
    pub origin_y: f64,
    /// Pixel width (cell size in X direction)
    pub pixel_width: f64,
    /// Pixel height (cell size in Y direction, negative for north-up)
    pub pixel_height: f64,
}

impl GeoTransform {
    pub fn new(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            pixel_width,
            pixel_height,
        }
    }

    /// North-up transform whose pixel centres sit on the nodes of `axes`
    pub fn from_axes(axes: &GridAxes) -> Self {
        let dx = axes.x.step();
        let dy = axes.y.step();
        Self::new(
            axes.x.origin() - 0.5 * dx,
            axes.y.last() + 0.5 * dy,
            dx,
            -dy,
        )
    }

    /// Recover grid axes from a north-up raster of `cols` x `rows` pixels
    pub fn to_axes(&self, cols: usize, rows: usize) -> Result<GridAxes> {
        if self.pixel_width <= 0.0 || self.pixel_height >= 0.0 {
            return Err(Error::invalid_input(format!(
                "only north-up transforms map onto grid axes (width {}, height {})",
                self.pixel_width, self.pixel_height
            )));
        }
        let dy = -self.pixel_height;
        let (lon0, _) = self.pixel_to_geo(0, 0);
        let (_, lat0) = self.pixel_to_geo(0, rows.saturating_sub(1));
        Ok(GridAxes::new(
            GridAxis::new(lon0, self.pixel_width, cols)?,
            GridAxis::new(lat0, dy, rows)?,
        ))
    }

    /// Geographic coordinates of a pixel centre
    pub fn pixel_to_geo(&self, col: usize, row: usize) -> (f64, f64) {
        let x = self.origin_x + (col as f64 + 0.5) * self.pixel_width;
        let y = self.origin_y + (row as f64 + 0.5) * self.pixel_height;
        (x, y)
    }

    /// Fractional pixel coordinates of a geographic location
    pub fn geo_to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        if self.pixel_width.abs() < 1e-15 || self.pixel_height.abs() < 1e-15 {
            return (f64::NAN, f64::NAN);
        }
        let col = (x - self.origin_x) / self.pixel_width;
        let row = (y - self.origin_y) / self.pixel_height;
        (col, row)
    }

    /// Bounding box (min_x, min_y, max_x, max_y) of a raster of the given size
    pub fn bounds(&self, width: usize, height: usize) -> (f64, f64, f64, f64) {
        let x0 = self.origin_x;
        let x1 = self.origin_x + width as f64 * self.pixel_width;
        let y0 = self.origin_y;
        let y1 = self.origin_y + height as f64 * self.pixel_height;
        (x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1))
    }
}

impl Default for GeoTransform {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0, -1.0)
    }
}
