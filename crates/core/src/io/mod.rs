//! I/O for samples and analysed grids
//!
//! - CSV: scattered samples in, per-sample residuals out
//! - GeoTIFF: analysed grids out (and back in for inspection)
//! - JSON: analysis settings files

mod csv_io;
mod geotiff;
mod json;

pub use csv_io::{read_samples_csv, read_samples_from_reader, write_residuals_csv};
pub use geotiff::{read_geotiff, read_geotiff_from_buffer, write_geotiff, write_geotiff_to_buffer};
pub use json::{read_json, write_json};
