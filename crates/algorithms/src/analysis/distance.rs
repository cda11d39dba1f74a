//! Degree extents to kilometre extents

use std::f64::consts::PI;

/// Approximate kilometres spanned by a longitude/latitude box.
///
/// Returns `(km_x, km_y)`: the east-west distance between `lon1` and `lon2`
/// and the north-south distance between `lat1` and `lat2`, both evaluated at
/// the mean latitude. Signs follow `lon2 - lon1` and `lat2 - lat1`.
///
/// Metres per degree use the empirical series
///
/// ```text
/// x: 111415.1 cos φ - 94.55 cos 3φ - 0.12 cos 5φ
/// y: 111132.1 - 566.05 cos 2φ + 1.2 cos 4φ - 0.003 cos 6φ
/// ```
///
/// with φ the mean latitude. The coefficients fix the recommended grid
/// spacings, so they must not be replaced by a spherical approximation.
pub fn deg_to_km(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> (f64, f64) {
    let phi = (lat1 + lat2) / 2.0 * PI / 180.0;

    let metres_per_deg_x =
        111_415.1 * phi.cos() - 94.54999 * (3.0 * phi).cos() - 0.12 * (5.0 * phi).cos();
    let metres_per_deg_y = 111_132.1 - 566.05 * (2.0 * phi).cos() + 1.2 * (4.0 * phi).cos()
        - 0.003 * (6.0 * phi).cos();

    let km_x = (lon2 - lon1) / 1000.0 * metres_per_deg_x;
    let km_y = (lat2 - lat1) / 1000.0 * metres_per_deg_y;
    (km_x, km_y)
}
