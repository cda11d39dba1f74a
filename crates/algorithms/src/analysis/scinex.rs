//! Bicubic Lagrangian interpolation and extrapolation of a grid
//!
//! `scinex` returns the value of a scalar field at a fractional grid position
//! by interpolating (or extrapolating) the stored cell values.
//!
//! Positions are 0-based grid units: `(0.0, 0.0)` is cell `[0, 0]` and
//! `(1.5, 2.0)` lies halfway between cells `[1, 2]` and `[2, 2]`. Internally
//! the branch tests run on 1-based coordinates (`g + 1`), where the valid
//! range of an axis of length `M` is `[1, M]`.
//!
//! Let `gm` be the 1-based x coordinate (`gn` for y):
//!
//! | region                                  | method                                     |
//! |-----------------------------------------|--------------------------------------------|
//! | `2 <= gm < M-1` and `2 <= gn < N-1`      | 4x4 Lagrange cubic                         |
//! | otherwise inside `[1, M)` x `[1, N)`     | bilinear between the enclosing cells       |
//! | `gm >= M` (or `gn >= N`)                | edge value plus offset times last difference |
//! | `gm < 1` (or `gn < 1`)                  | edge value minus offset times first difference |
//! | outside on both axes                    | both edge corrections added to the corner  |
//!
//! Past the low edge the offset is negative, so the field is mirrored about
//! the first row rather than continued.
//!
//! The cubic branch normalises the weights per axis (`/6` and `/2` on each
//! axis) instead of dividing the 16-term sum by 36 once at the end. Both are
//! the same polynomial; results may differ from the single `/36` form in the
//! last ulp, and nodes are reproduced exactly.

use ndarray::ArrayView2;

use barnes_core::{Error, Grid, Result};

/// Fractional offsets below this are treated as exactly on a node
const NODE_SNAP: f64 = 1e-6;

/// Cubic Lagrange weights on nodes -1, 0, 1, 2 for offset `f` in [0, 1).
///
/// The classic form is `{-s2 s34, 3 s1 s34, -3 s12 s4, s12 s3} / 6`; the
/// division by 6 is applied per axis so a node is reproduced exactly.
#[inline]
fn cubic_weights(f: f64) -> [f64; 4] {
    let s1 = f + 1.0;
    let s2 = f;
    let s3 = f - 1.0;
    let s4 = f - 2.0;
    let s12 = s1 * s2;
    let s34 = s3 * s4;
    [
        -s2 * s34 / 6.0,
        s1 * s34 / 2.0,
        -s12 * s4 / 2.0,
        s12 * s3 / 6.0,
    ]
}

#[inline]
fn fraction(g: f64) -> f64 {
    let f = g - g.floor();
    if f < NODE_SNAP {
        0.0
    } else {
        f
    }
}

/// Interpolate `scala` at 0-based fractional position `(gx, gy)`.
///
/// Caller guarantees a non-empty grid and finite coordinates.
pub(crate) fn scinex_unchecked(scala: &ArrayView2<'_, f64>, gx: f64, gy: f64) -> f64 {
    let (msize, nsize) = scala.dim();

    // 1-based position and bounds
    let gm = gx + 1.0;
    let gn = gy + 1.0;
    let mmax = msize;
    let nmax = nsize;
    let mmin = 1usize;
    let nmin = 1usize;
    let (fmax, fnmax) = (mmax as f64, nmax as f64);
    let (fmin, fnmin) = (mmin as f64, nmin as f64);

    // Neighbour of each edge; an axis of length 1 is its own neighbour
    let ms = mmax.saturating_sub(1).max(1);
    let ns = nmax.saturating_sub(1).max(1);
    let mr = (mmin + 1).min(mmax);
    let nr = (nmin + 1).min(nmax);

    let at = |m: usize, n: usize| scala[[m - 1, n - 1]];

    let fm = fraction(gm);
    let fn_ = fraction(gn);

    if gm >= fmax {
        let e = gm - fmax;
        if gn >= fnmax {
            let t1 = e * (at(mmax, nmax) - at(ms, nmax));
            let t2 = (gn - fnmax) * (at(mmax, nmax) - at(mmax, ns));
            at(mmax, nmax) + t1 + t2
        } else if gn < fnmin {
            let t1 = e * (at(mmax, nmin) - at(ms, nmin));
            let t2 = (gn - fnmin) * (at(mmax, nmin) - at(mmax, nr));
            at(mmax, nmin) + t1 + t2
        } else {
            let jgn = gn.floor() as usize;
            let p = at(mmax, jgn) + fn_ * (at(mmax, jgn + 1) - at(mmax, jgn));
            let h = at(ms, jgn) + fn_ * (at(ms, jgn + 1) - at(ms, jgn));
            p + e * (p - h)
        }
    } else if gm < fmin {
        let e = gm - fmin;
        if gn >= fnmax {
            let t2 = (gn - fnmax) * (at(mmin, nmax) - at(mmin, ns));
            let t1 = e * (at(mmin, nmax) - at(mr, nmax));
            at(mmin, nmax) + t1 + t2
        } else if gn < fnmin {
            let t2 = (gn - fnmin) * (at(mmin, nmin) - at(mmin, nr));
            let t1 = e * (at(mmin, nmin) - at(mr, nmin));
            at(mmin, nmin) + t1 + t2
        } else {
            let jgn = gn.floor() as usize;
            let p = at(mmin, jgn) + fn_ * (at(mmin, jgn + 1) - at(mmin, jgn));
            let h = at(mr, jgn) + fn_ * (at(mr, jgn + 1) - at(mr, jgn));
            p - e * (h - p)
        }
    } else if gn >= fnmax {
        let igm = gm.floor() as usize;
        let e = gn - fnmax;
        let p = at(igm, nmax) + fm * (at(igm + 1, nmax) - at(igm, nmax));
        let h = at(igm, ns) + fm * (at(igm + 1, ns) - at(igm, ns));
        p + e * (p - h)
    } else if gn < fnmin {
        let igm = gm.floor() as usize;
        let e = gn - fnmin;
        let p = at(igm, nmin) + fm * (at(igm + 1, nmin) - at(igm, nmin));
        let h = at(igm, nr) + fm * (at(igm + 1, nr) - at(igm, nr));
        p - e * (h - p)
    } else if gm < ms as f64 && gm >= mr as f64 && gn < ns as f64 && gn >= nr as f64 {
        let igm = gm.floor() as usize;
        let jgn = gn.floor() as usize;

        let wx = cubic_weights(fm);
        let mut rows = [0.0; 4];
        for (r, row) in rows.iter_mut().enumerate() {
            let n = jgn - 1 + r;
            *row = wx[0] * at(igm - 1, n)
                + wx[1] * at(igm, n)
                + wx[2] * at(igm + 1, n)
                + wx[3] * at(igm + 2, n);
        }

        let wy = cubic_weights(fn_);
        wy[0] * rows[0] + wy[1] * rows[1] + wy[2] * rows[2] + wy[3] * rows[3]
    } else {
        let igm = gm.floor() as usize;
        let jgn = gn.floor() as usize;
        let p = at(igm + 1, jgn) + fn_ * (at(igm + 1, jgn + 1) - at(igm + 1, jgn));
        let h = at(igm, jgn) + fn_ * (at(igm, jgn + 1) - at(igm, jgn));
        h + fm * (p - h)
    }
}

/// Interpolate or extrapolate `values` at 0-based fractional grid position
/// `(gx, gy)`, where `gx` runs along the first array axis.
///
/// Nodes are reproduced exactly. Positions outside the grid are extrapolated
/// from the nearest edge row or column (see the module table).
///
/// # Errors
/// `InvalidInput` for an empty array or non-finite coordinates.
pub fn scinex(values: ArrayView2<'_, f64>, gx: f64, gy: f64) -> Result<f64> {
    if values.is_empty() {
        return Err(Error::InvalidInput {
            what: "cannot resample an empty grid".into(),
        });
    }
    if !(gx.is_finite() && gy.is_finite()) {
        return Err(Error::InvalidInput {
            what: format!("grid position ({}, {}) is not finite", gx, gy),
        });
    }
    Ok(scinex_unchecked(&values, gx, gy))
}

/// Value of `grid` at physical location (lon, lat)
pub fn interpolate_at(grid: &Grid, lon: f64, lat: f64) -> Result<f64> {
    let (gx, gy) = grid.axes().to_grid_units(lon, lat);
    scinex(grid.view(), gx, gy)
}
