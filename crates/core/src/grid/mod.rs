//! Analysis grid data structures

mod axis;
mod field;
mod geotransform;

pub use axis::{GridAxes, GridAxis};
pub use field::{Grid, GridStatistics};
pub use geotransform::GeoTransform;
