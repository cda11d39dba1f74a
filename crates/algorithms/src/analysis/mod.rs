//! Barnes objective analysis
//!
//! Converts scattered (lon, lat, value) samples into values on a regular grid:
//! - distance: latitude-corrected kilometre extents of a lon/lat box
//! - recommend: grid spacing, Gaussian scale length and axes from sample density
//! - scinex: bicubic interpolation/extrapolation of a grid at fractional positions
//! - barnes: the multi-pass Gaussian-weighted engine
//!
//! References:
//! Barnes, S.L. (1994a,b,c). Applications of the Barnes objective analysis
//! scheme, Parts I-III. J. Atmos. Oceanic Technol. 11.

mod barnes;
pub mod distance;
pub mod recommend;
pub mod scinex;

pub use barnes::{
    analyze, analyze_with_config, analyze_with_defaults, analyze_with_first_guess,
    analyze_with_observer, barnes, point_residuals, rmse, BarnesAnalysis, BarnesConfig,
    BarnesParams, BarnesResult, GridSpec, PassReport, WEIGHT_EPSILON,
};
pub use distance::deg_to_km;
pub use recommend::{random_data_spacing, recommend_parameters, AnalysisParameters};
pub use scinex::{interpolate_at, scinex};
