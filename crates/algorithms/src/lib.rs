//! # Barnes Algorithms
//!
//! Barnes objective analysis: multi-pass, Gaussian-weighted estimation of a
//! regular grid from irregularly spaced (lon, lat, value) samples.
//!
//! ## Modules
//!
//! - **analysis::distance**: degree extents to kilometres
//! - **analysis::recommend**: grid spacing and scale length from sample density
//! - **analysis::scinex**: bicubic Lagrangian resampling with edge extrapolation
//! - **analysis::barnes**: the multi-pass estimation engine

pub mod analysis;
pub(crate) mod maybe_rayon;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::analysis::{
        analyze, analyze_with_config, analyze_with_defaults, analyze_with_first_guess,
        analyze_with_observer, barnes, deg_to_km, interpolate_at, point_residuals,
        recommend_parameters, rmse, scinex,
        AnalysisParameters, BarnesAnalysis, BarnesConfig, BarnesParams, BarnesResult, GridSpec,
        PassReport,
    };
    pub use barnes_core::prelude::*;
}
