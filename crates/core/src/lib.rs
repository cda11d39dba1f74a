//! # Barnes Core
//!
//! Core types, traits and I/O for Barnes objective analysis.
//!
//! This crate provides:
//! - `SampleSet`: scattered (lon, lat, value) observations
//! - `GridAxis` / `GridAxes`: uniformly stepped analysis axes
//! - `Grid`: the dense analysed field, indexed `[x, y]`
//! - `GeoTransform`: affine georeferencing of a grid for raster export
//! - Algorithm trait for a consistent API
//! - I/O for CSV samples and GeoTIFF grids

pub mod error;
pub mod grid;
pub mod io;
pub mod samples;

pub use error::{Error, Result};
pub use grid::{GeoTransform, Grid, GridAxes, GridAxis, GridStatistics};
pub use samples::{BoundingBox, SamplePoint, SampleSet};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::grid::{GeoTransform, Grid, GridAxes, GridAxis};
    pub use crate::samples::{BoundingBox, SamplePoint, SampleSet};
    pub use crate::Algorithm;
}

/// Core trait for analysis algorithms.
///
/// Algorithms are pure functions that transform input data according to parameters.
pub trait Algorithm {
    /// Input type for the algorithm
    type Input;
    /// Output type for the algorithm
    type Output;
    /// Parameters controlling algorithm behavior
    type Params: Default;
    /// Error type for algorithm execution
    type Error: std::error::Error;

    /// Returns the algorithm name
    fn name(&self) -> &'static str;

    /// Returns a description of what the algorithm does
    fn description(&self) -> &'static str;

    /// Execute the algorithm
    fn execute(&self, input: Self::Input, params: Self::Params) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}
