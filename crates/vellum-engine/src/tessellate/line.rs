use crate::coords::Vec2;
use crate::paint::Color;
use crate::raster::Vertex;

use super::{Geometry, LineStyle};

/// Width of the zero-alpha band on each side of a smooth line, in target pixels.
pub const FRINGE_WIDTH: f32 = 0.75;

/// Upper bound on how far a join may be pushed out relative to the half width.
const MAX_MITER: f32 = 4.0;
/// Cosine floor used when computing the miter scale.
const MIN_MITER_COS: f32 = 0.1;

/// Builds a stroked polyline.
///
/// `points` are already in target space. Consecutive duplicates are skipped;
/// fewer than two distinct points produce empty geometry. A closed line joins
/// the last point back to the first.
///
/// Smooth lines carry four vertices per point (outer fringe, core, core, outer
/// fringe) and 18 indices per segment; rough lines carry the two core vertices
/// and 6 indices per segment.
pub fn build_line(
    points: &[Vec2],
    closed: bool,
    width: f32,
    style: LineStyle,
    fringe: f32,
    color: Color,
) -> Geometry {
    let mut pts: Vec<Vec2> = Vec::with_capacity(points.len());
    for &p in points {
        if pts.last() != Some(&p) {
            pts.push(p);
        }
    }
    if closed && pts.len() > 1 && pts.first() == pts.last() {
        pts.pop();
    }
    if pts.len() < 2 {
        return Geometry::new();
    }

    let closed = closed && pts.len() > 2;
    let n = pts.len();
    let segments = if closed { n } else { n - 1 };

    let normals: Vec<Vec2> = (0..segments)
        .map(|i| (pts[(i + 1) % n] - pts[i]).normalized().perp())
        .collect();

    let half = width.max(0.0) * 0.5;
    let faded = color.with_alpha(0.0);
    let per_point = match style {
        LineStyle::Smooth => 4,
        LineStyle::Rough => 2,
    };
    let mut geo =
        Geometry::with_capacity(n * per_point, segments * per_point.saturating_sub(1) * 6);

    for (i, &p) in pts.iter().enumerate() {
        let incoming = if i > 0 {
            Some(normals[i - 1])
        } else if closed {
            Some(normals[segments - 1])
        } else {
            None
        };
        let outgoing = normals.get(i).copied();

        let (normal, miter) = join(incoming, outgoing);
        let core = normal * (half * miter);

        match style {
            LineStyle::Smooth => {
                let outer = normal * ((half + fringe) * miter);
                geo.vertices.extend([
                    Vertex::colored(p + outer, faded),
                    Vertex::colored(p + core, color),
                    Vertex::colored(p - core, color),
                    Vertex::colored(p - outer, faded),
                ]);
            }
            LineStyle::Rough => {
                geo.vertices
                    .extend([Vertex::colored(p + core, color), Vertex::colored(p - core, color)]);
            }
        }
    }

    let rows = per_point as u32;
    for s in 0..segments {
        let a = (s as u32) * rows;
        let b = (((s + 1) % n) as u32) * rows;
        for k in 0..rows - 1 {
            let (ai, aj) = (a + k, a + k + 1);
            let (bi, bj) = (b + k, b + k + 1);
            geo.indices.extend([ai, aj, bj, ai, bj, bi]);
        }
    }

    geo
}

/// Join normal and miter scale at a point from the adjacent segment normals.
fn join(incoming: Option<Vec2>, outgoing: Option<Vec2>) -> (Vec2, f32) {
    match (incoming, outgoing) {
        (Some(a), Some(b)) => {
            let n = (a + b).normalized();
            if n == Vec2::zero() {
                return (b, 1.0);
            }
            let cos = n.dot(b);
            (n, (1.0 / cos.max(MIN_MITER_COS)).min(MAX_MITER))
        }
        (Some(a), None) => (a, 1.0),
        (None, Some(b)) => (b, 1.0),
        (None, None) => (Vec2::zero(), 1.0),
    }
}
