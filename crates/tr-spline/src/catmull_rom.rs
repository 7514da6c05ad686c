//! Cubic Hermite interpolation with Catmull-Rom tangents.
//!
//! The [`MapCursor`][crate::MapCursor] supplies the two tangents for the
//! segment it stands on:
//!
//! ```text
//! m0 = (next - prev) / 2        (next - current) / 2 without a predecessor
//! m1 = (next2 - current) / 2    (next - current) / 2 without a next-next
//! ```
//!
//! and the agent samples the curve at `t = progress / segment_length`.

use glam::Vec3;

/// A sample on a segment curve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CatmullRomPoint {
    pub position: Vec3,
    /// Unit direction of travel.  Zero if the curve is degenerate at `t`.
    pub tangent:  Vec3,
}

/// Evaluate the Hermite curve from `p0` to `p1` with end tangents `m0`, `m1`
/// at `t ∈ [0, 1]`.
///
/// `t == 0` returns exactly `p0` and `t == 1` returns exactly `p1`.
pub fn evaluate(p0: Vec3, p1: Vec3, m0: Vec3, m1: Vec3, t: f32) -> CatmullRomPoint {
    let t2 = t * t;
    let t3 = t2 * t;

    let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
    let h10 = t3 - 2.0 * t2 + t;
    let h01 = -2.0 * t3 + 3.0 * t2;
    let h11 = t3 - t2;

    // Derivatives of the basis functions.
    let d00 = 6.0 * t2 - 6.0 * t;
    let d10 = 3.0 * t2 - 4.0 * t + 1.0;
    let d01 = -6.0 * t2 + 6.0 * t;
    let d11 = 3.0 * t2 - 2.0 * t;

    CatmullRomPoint {
        position: h00 * p0 + h10 * m0 + h01 * p1 + h11 * m1,
        tangent:  (d00 * p0 + d10 * m0 + d01 * p1 + d11 * m1).normalize_or_zero(),
    }
}
