use core::f32::consts::TAU;

use crate::coords::Vec2;

const MIN_CIRCLE_SEGMENTS: usize = 16;
const MIN_ARC_SEGMENTS: usize = 8;
const MAX_SEGMENTS: usize = 256;

/// How the ends of an arc are joined.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum ArcType {
    /// Both ends connect through the center.
    #[default]
    Pie,
    /// No closing edge.
    Open,
    /// A chord joins the first and last arc points.
    Closed,
}

/// Stroke path in local space.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outline {
    pub points: Vec<Vec2>,
    /// The last point connects back to the first.
    pub closed: bool,
}

impl Outline {
    #[inline]
    pub fn open(points: Vec<Vec2>) -> Self {
        Self { points, closed: false }
    }

    #[inline]
    pub fn closed(points: Vec<Vec2>) -> Self {
        Self { points, closed: true }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.len() < 2
    }
}

/// Default segment count for a full ellipse: `clamp(ceil(2·max(rx, ry)), 16, 256)`.
pub fn circle_segments(rx: f32, ry: f32) -> usize {
    let r = rx.abs().max(ry.abs());
    let n = (2.0 * r).ceil();
    if !n.is_finite() {
        return MIN_CIRCLE_SEGMENTS;
    }
    (n as usize).clamp(MIN_CIRCLE_SEGMENTS, MAX_SEGMENTS)
}

/// Default segment count for an arc: `clamp(ceil(|Δangle|·radius), 8, 256)`.
pub fn arc_segments(radius: f32, delta: f32) -> usize {
    let n = (delta.abs() * radius.abs()).ceil();
    if !n.is_finite() {
        return MIN_ARC_SEGMENTS;
    }
    (n as usize).clamp(MIN_ARC_SEGMENTS, MAX_SEGMENTS)
}

/// Corners of an axis-aligned rectangle: top-left, top-right, bottom-right, bottom-left.
#[inline]
pub fn rectangle(x: f32, y: f32, w: f32, h: f32) -> [Vec2; 4] {
    [
        Vec2::new(x, y),
        Vec2::new(x + w, y),
        Vec2::new(x + w, y + h),
        Vec2::new(x, y + h),
    ]
}

/// `segments` evenly spaced rim points, starting at angle 0.
pub fn ellipse_rim(center: Vec2, rx: f32, ry: f32, segments: Option<usize>) -> Vec<Vec2> {
    let n = segments.unwrap_or_else(|| circle_segments(rx, ry)).max(3);
    let step = TAU / n as f32;
    (0..n)
        .map(|i| {
            let (s, c) = (i as f32 * step).sin_cos();
            Vec2::new(center.x + rx * c, center.y + ry * s)
        })
        .collect()
}

/// Fill fan: center, every rim point, then the first rim point again.
pub fn ellipse_fan(center: Vec2, rx: f32, ry: f32, segments: Option<usize>) -> Vec<Vec2> {
    let rim = ellipse_rim(center, rx, ry, segments);
    let mut fan = Vec::with_capacity(rim.len() + 2);
    fan.push(center);
    fan.extend_from_slice(&rim);
    fan.push(rim[0]);
    fan
}

pub fn ellipse_outline(center: Vec2, rx: f32, ry: f32, segments: Option<usize>) -> Outline {
    Outline::closed(ellipse_rim(center, rx, ry, segments))
}

/// `segments + 1` points from `start` to `end` inclusive.
fn arc_points(center: Vec2, radius: f32, start: f32, end: f32, segments: usize) -> Vec<Vec2> {
    let step = (end - start) / segments as f32;
    (0..=segments)
        .map(|i| {
            let (s, c) = (start + i as f32 * step).sin_cos();
            Vec2::new(center.x + radius * c, center.y + radius * s)
        })
        .collect()
}

enum Sweep {
    Empty,
    FullTurn,
    Partial(Vec<Vec2>),
}

fn resolve_arc(center: Vec2, radius: f32, start: f32, end: f32, segments: Option<usize>) -> Sweep {
    let delta = end - start;
    if delta == 0.0 || !delta.is_finite() {
        return Sweep::Empty;
    }
    if delta.abs() >= TAU {
        return Sweep::FullTurn;
    }
    let n = segments.unwrap_or_else(|| arc_segments(radius, delta)).max(1);
    Sweep::Partial(arc_points(center, radius, start, end, n))
}

/// Fill fan for an arc. A zero sweep yields nothing; a full turn fills the circle.
///
/// `Pie` anchors the fan at the center; `Open` and `Closed` both fill the
/// chord-bounded segment by anchoring at the first arc point.
pub fn arc_fan(
    arc_type: ArcType,
    center: Vec2,
    radius: f32,
    start: f32,
    end: f32,
    segments: Option<usize>,
) -> Vec<Vec2> {
    match resolve_arc(center, radius, start, end, segments) {
        Sweep::Empty => Vec::new(),
        Sweep::FullTurn => ellipse_fan(center, radius, radius, segments),
        Sweep::Partial(points) => match arc_type {
            ArcType::Pie => {
                let mut fan = Vec::with_capacity(points.len() + 1);
                fan.push(center);
                fan.extend(points);
                fan
            }
            ArcType::Open | ArcType::Closed => points,
        },
    }
}

/// Stroke path for an arc. A full turn strokes the circle.
pub fn arc_outline(
    arc_type: ArcType,
    center: Vec2,
    radius: f32,
    start: f32,
    end: f32,
    segments: Option<usize>,
) -> Outline {
    match resolve_arc(center, radius, start, end, segments) {
        Sweep::Empty => Outline::default(),
        Sweep::FullTurn => ellipse_outline(center, radius, radius, segments),
        Sweep::Partial(points) => match arc_type {
            ArcType::Open => Outline::open(points),
            ArcType::Closed => Outline::closed(points),
            ArcType::Pie => {
                let mut loop_points = Vec::with_capacity(points.len() + 1);
                loop_points.push(center);
                loop_points.extend(points);
                Outline::closed(loop_points)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f32::consts::{FRAC_PI_2, PI};

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a.x - b.x).abs() < 1e-4 && (a.y - b.y).abs() < 1e-4
    }

    // ── segment counts ────────────────────────────────────────────────────

    #[test]
    fn circle_segments_clamped() {
        assert_eq!(circle_segments(1.0, 1.0), 16);
        assert_eq!(circle_segments(20.0, 5.0), 40);
        assert_eq!(circle_segments(1000.0, 1.0), 256);
        assert_eq!(circle_segments(f32::NAN, 1.0), 16);
    }

    #[test]
    fn arc_segments_clamped() {
        assert_eq!(arc_segments(1.0, PI), 8);
        assert_eq!(arc_segments(10.0, PI), 32);
        assert_eq!(arc_segments(10_000.0, -PI), 256);
    }

    // ── ellipse ───────────────────────────────────────────────────────────

    #[test]
    fn ellipse_fan_closes_on_first_rim_point() {
        let fan = ellipse_fan(Vec2::new(5.0, 5.0), 2.0, 1.0, Some(8));
        assert_eq!(fan.len(), 10);
        assert_eq!(fan[0], Vec2::new(5.0, 5.0));
        assert_eq!(fan[1], fan[9]);
        assert!(approx(fan[1], Vec2::new(7.0, 5.0)));
        assert!(approx(fan[3], Vec2::new(5.0, 6.0)));
    }

    #[test]
    fn ellipse_outline_is_closed_loop() {
        let o = ellipse_outline(Vec2::zero(), 3.0, 3.0, None);
        assert!(o.closed);
        assert_eq!(o.points.len(), 16);
    }

    // ── arcs ──────────────────────────────────────────────────────────────

    #[test]
    fn zero_sweep_is_empty() {
        assert!(arc_fan(ArcType::Pie, Vec2::zero(), 5.0, 1.0, 1.0, None).is_empty());
        assert!(arc_outline(ArcType::Open, Vec2::zero(), 5.0, 1.0, 1.0, None).is_empty());
    }

    #[test]
    fn full_turn_becomes_circle() {
        let fan = arc_fan(ArcType::Open, Vec2::zero(), 4.0, 0.0, 2.0 * TAU, Some(12));
        assert_eq!(fan.len(), 14);
        let o = arc_outline(ArcType::Open, Vec2::zero(), 4.0, 0.0, -TAU, Some(12));
        assert!(o.closed);
    }

    #[test]
    fn pie_fan_starts_at_center() {
        let c = Vec2::new(1.0, 1.0);
        let fan = arc_fan(ArcType::Pie, c, 2.0, 0.0, FRAC_PI_2, Some(4));
        assert_eq!(fan.len(), 6);
        assert_eq!(fan[0], c);
        assert!(approx(fan[1], Vec2::new(3.0, 1.0)));
        assert!(approx(fan[5], Vec2::new(1.0, 3.0)));
    }

    #[test]
    fn arc_outline_styles() {
        let c = Vec2::zero();
        let open = arc_outline(ArcType::Open, c, 2.0, 0.0, PI, Some(4));
        assert!(!open.closed);
        assert_eq!(open.points.len(), 5);

        let closed = arc_outline(ArcType::Closed, c, 2.0, 0.0, PI, Some(4));
        assert!(closed.closed);
        assert_eq!(closed.points.len(), 5);

        let pie = arc_outline(ArcType::Pie, c, 2.0, 0.0, PI, Some(4));
        assert!(pie.closed);
        assert_eq!(pie.points[0], c);
        assert_eq!(pie.points.len(), 6);
    }

    #[test]
    fn negative_sweep_runs_backwards() {
        let pts = arc_outline(ArcType::Open, Vec2::zero(), 1.0, 0.0, -FRAC_PI_2, Some(2)).points;
        assert!(approx(pts[2], Vec2::new(0.0, -1.0)));
    }
}
