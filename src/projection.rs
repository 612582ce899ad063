//! Forward and inverse mapping between the marker plane (`z = 0`) and screen
//! pixels through a 3x4 model-view-projection transform.

use glam::DVec2;

use crate::types::Mvp;

/// Projects marker point `(mx, my, 0)` to screen coordinates.
///
/// Returns `None` when `|w| < eps`.
pub fn marker_to_screen(mvp: &Mvp, mx: f64, my: f64, eps: f64) -> Option<DVec2> {
    let ux = mvp[(0, 0)] * mx + mvp[(0, 1)] * my + mvp[(0, 3)];
    let uy = mvp[(1, 0)] * mx + mvp[(1, 1)] * my + mvp[(1, 3)];
    let uz = mvp[(2, 0)] * mx + mvp[(2, 1)] * my + mvp[(2, 3)];
    if uz.abs() < eps {
        return None;
    }
    Some(DVec2::new(ux / uz, uy / uz))
}

/// Intersects the viewing ray of screen pixel `(sx, sy)` with the marker plane.
///
/// A singular system is not special-cased: the result is non-finite and
/// callers reject it through their bounds checks.
pub fn screen_to_marker(mvp: &Mvp, sx: f64, sy: f64) -> DVec2 {
    let c11 = mvp[(2, 0)] * sx - mvp[(0, 0)];
    let c12 = mvp[(2, 1)] * sx - mvp[(0, 1)];
    let c21 = mvp[(2, 0)] * sy - mvp[(1, 0)];
    let c22 = mvp[(2, 1)] * sy - mvp[(1, 1)];
    let b1 = mvp[(0, 3)] - mvp[(2, 3)] * sx;
    let b2 = mvp[(1, 3)] - mvp[(2, 3)] * sy;

    let m = c11 * c22 - c12 * c21;
    DVec2::new((c22 * b1 - c12 * b2) / m, (c11 * b2 - c21 * b1) / m)
}

/// Round half up, matching `floor(v + 0.5)`.
#[inline]
pub fn round_half_up(v: f64) -> f64 {
    (v + 0.5).floor()
}
