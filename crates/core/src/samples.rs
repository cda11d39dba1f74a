//! Scattered observations and their spatial extent
//!
//! A [`SampleSet`] holds three aligned columns (`lon`, `lat`, `value`).
//! Index `k` in every column refers to the same physical observation.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A single observation with longitude, latitude and value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplePoint {
    pub lon: f64,
    pub lat: f64,
    pub value: f64,
}

impl SamplePoint {
    pub fn new(lon: f64, lat: f64, value: f64) -> Self {
        Self { lon, lat, value }
    }
}

/// Axis-aligned longitude/latitude box, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub lon_min: f64,
    pub lat_min: f64,
    pub lon_max: f64,
    pub lat_max: f64,
}

impl BoundingBox {
    pub fn new(lon_min: f64, lat_min: f64, lon_max: f64, lat_max: f64) -> Self {
        Self {
            lon_min,
            lat_min,
            lon_max,
            lat_max,
        }
    }

    /// Longitude extent in degrees
    pub fn width(&self) -> f64 {
        self.lon_max - self.lon_min
    }

    /// Latitude extent in degrees
    pub fn height(&self) -> f64 {
        self.lat_max - self.lat_min
    }

    /// Check that all corners are finite and both extents are positive
    pub fn validate(&self) -> Result<()> {
        let corners = [self.lon_min, self.lat_min, self.lon_max, self.lat_max];
        if corners.iter().any(|c| !c.is_finite()) {
            return Err(Error::invalid_input(format!(
                "bounding box has non-finite corners: {:?}",
                corners
            )));
        }
        if self.width() <= 0.0 || self.height() <= 0.0 {
            return Err(Error::invalid_input(format!(
                "bounding box must have positive extent, got {} x {} degrees",
                self.width(),
                self.height()
            )));
        }
        Ok(())
    }
}

/// Aligned columns of scattered observations.
///
/// Columns always have equal lengths: every constructor, deserialization
/// included, goes through the length check in [`SampleSet::new`]. Values are
/// not checked until [`SampleSet::validate`] (the analysis entry points call
/// it once, before any pass runs).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "SampleColumns")]
pub struct SampleSet {
    lon: Vec<f64>,
    lat: Vec<f64>,
    value: Vec<f64>,
}

/// Unchecked serialized form of a [`SampleSet`]
#[derive(Deserialize)]
struct SampleColumns {
    lon: Vec<f64>,
    lat: Vec<f64>,
    value: Vec<f64>,
}

impl TryFrom<SampleColumns> for SampleSet {
    type Error = Error;

    fn try_from(c: SampleColumns) -> Result<Self> {
        SampleSet::new(c.lon, c.lat, c.value)
    }
}

fn check_columns(lon: &[f64], lat: &[f64], value: &[f64]) -> Result<()> {
    if lat.len() != lon.len() {
        return Err(Error::SizeMismatch {
            name: "lat",
            expected: lon.len(),
            actual: lat.len(),
        });
    }
    if value.len() != lon.len() {
        return Err(Error::SizeMismatch {
            name: "value",
            expected: lon.len(),
            actual: value.len(),
        });
    }
    Ok(())
}

impl SampleSet {
    /// Build from three columns. Fails if the columns differ in length.
    pub fn new(lon: Vec<f64>, lat: Vec<f64>, value: Vec<f64>) -> Result<Self> {
        check_columns(&lon, &lat, &value)?;
        Ok(Self { lon, lat, value })
    }

    /// Build from single-precision columns; values are widened to f64.
    pub fn from_f32(lon: &[f32], lat: &[f32], value: &[f32]) -> Result<Self> {
        let widen = |s: &[f32]| s.iter().map(|&v| v as f64).collect::<Vec<_>>();
        Self::new(widen(lon), widen(lat), widen(value))
    }

    pub fn from_points(points: &[SamplePoint]) -> Self {
        Self {
            lon: points.iter().map(|p| p.lon).collect(),
            lat: points.iter().map(|p| p.lat).collect(),
            value: points.iter().map(|p| p.value).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.lon.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lon.is_empty()
    }

    pub fn lon(&self) -> &[f64] {
        &self.lon
    }

    pub fn lat(&self) -> &[f64] {
        &self.lat
    }

    pub fn value(&self) -> &[f64] {
        &self.value
    }

    pub fn point(&self, k: usize) -> Option<SamplePoint> {
        if k >= self.len() {
            return None;
        }
        Some(SamplePoint::new(self.lon[k], self.lat[k], self.value[k]))
    }

    pub fn points(&self) -> impl Iterator<Item = SamplePoint> + '_ {
        self.lon
            .iter()
            .zip(&self.lat)
            .zip(&self.value)
            .map(|((&lon, &lat), &value)| SamplePoint::new(lon, lat, value))
    }

    /// Arithmetic mean of the values, accumulated in f64
    pub fn mean(&self) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        Some(self.value.iter().sum::<f64>() / self.len() as f64)
    }

    /// Smallest box containing every sample location
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        if self.is_empty() {
            return None;
        }
        let fold = |s: &[f64]| {
            s.iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                    (lo.min(v), hi.max(v))
                })
        };
        let (lon_min, lon_max) = fold(&self.lon);
        let (lat_min, lat_max) = fold(&self.lat);
        Some(BoundingBox::new(lon_min, lat_min, lon_max, lat_max))
    }

    /// Reject empty sets, unequal columns and non-finite entries.
    pub fn validate(&self) -> Result<()> {
        check_columns(&self.lon, &self.lat, &self.value)?;
        if self.is_empty() {
            return Err(Error::invalid_input("sample set is empty"));
        }
        for (k, p) in self.points().enumerate() {
            if !(p.lon.is_finite() && p.lat.is_finite() && p.value.is_finite()) {
                return Err(Error::invalid_input(format!(
                    "sample {} is not finite: lon={}, lat={}, value={}",
                    k, p.lon, p.lat, p.value
                )));
            }
        }
        Ok(())
    }
}

impl FromIterator<SamplePoint> for SampleSet {
    fn from_iter<I: IntoIterator<Item = SamplePoint>>(iter: I) -> Self {
        let mut set = SampleSet::default();
        for p in iter {
            set.lon.push(p.lon);
            set.lat.push(p.lat);
            set.value.push(p.value);
        }
        set
    }
}
