//! # zonecodec-simplify
//!
//! Douglas–Peucker point reduction for polygon and polyline rings.
//!
//! Zone boundary rings routinely carry thousands of points; before a ring
//! is persisted it can be reduced under a distance tolerance while keeping
//! its topological shape. The first and last point of the input are always
//! preserved exactly, and no point is ever introduced that was not in the
//! input.
//!
//! Coordinates are treated as a flat Euclidean plane even though they are
//! longitude/latitude. That planar approximation is accepted as long as
//! the tolerance stays small relative to typical feature size.

use zonecodec_core::{Coord, Ring};

/// Chords shorter than this skip direction normalization and degrade to
/// plain point distance.
const DEGENERATE_CHORD: f64 = 1e-7;

/// Reduce `ring` under `tolerance` with the Douglas–Peucker algorithm.
///
/// Rings of 2 or fewer points are already minimal and come back unchanged.
/// The output is always a subsequence of the input with the same first and
/// last point.
pub fn simplify(ring: &[Coord], tolerance: f64) -> Ring {
    if ring.len() <= 2 {
        return ring.to_vec();
    }

    let mut out = Vec::with_capacity(ring.len());
    simplify_span(ring, tolerance, &mut out);
    out.push(ring[ring.len() - 1]);
    out
}

/// Emit the simplified form of `span` into `out`, excluding the span's
/// last point (the caller owns the joint so shared endpoints between
/// adjacent spans are not doubled).
fn simplify_span(span: &[Coord], tolerance: f64, out: &mut Ring) {
    let last = span.len() - 1;
    if last < 2 {
        out.push(span[0]);
        return;
    }

    let (mut d_max, mut idx) = (0.0f64, 0usize);
    for (i, p) in span.iter().enumerate().take(last).skip(1) {
        let d = perpendicular_distance(*p, span[0], span[last]);
        if d > d_max {
            d_max = d;
            idx = i;
        }
    }

    if d_max > tolerance {
        simplify_span(&span[..=idx], tolerance, out);
        simplify_span(&span[idx..], tolerance, out);
    } else {
        out.push(span[0]);
    }
}

/// Planar perpendicular distance from `p` to the chord `a → b`.
///
/// A near-zero-length chord is treated as a point, which keeps the
/// distance well-defined instead of dividing by zero.
pub fn perpendicular_distance(p: Coord, a: Coord, b: Coord) -> f64 {
    let mut dx = b.x - a.x;
    let mut dy = b.y - a.y;
    let mag = (dx * dx + dy * dy).sqrt();

    if mag > DEGENERATE_CHORD {
        dx /= mag;
        dy /= mag;
    }

    let pvx = p.x - a.x;
    let pvy = p.y - a.y;
    // Component of p-a along the chord direction
    let pv_dot = dx * pvx + dy * pvy;
    let ax = pvx - pv_dot * dx;
    let ay = pvy - pv_dot * dy;
    (ax * ax + ay * ay).sqrt()
}
