use crate::coords::Vec2;

use super::fan_indices;

/// Vertex at which ear clipping begins its walk.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum EarClipStart {
    #[default]
    First,
    /// Begin at vertex 1. Reproduces the triangle order of engines that start there.
    Second,
}

impl EarClipStart {
    #[inline]
    fn index(self) -> usize {
        match self {
            EarClipStart::First => 0,
            EarClipStart::Second => 1,
        }
    }
}

#[inline]
fn turn(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (b - a).cross(c - a)
}

/// Shoelace area. Positive when the loop turns with positive cross products.
pub fn signed_area(points: &[Vec2]) -> f32 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0f64;
    for (i, &p) in points.iter().enumerate() {
        let q = points[(i + 1) % points.len()];
        sum += p.x as f64 * q.y as f64 - q.x as f64 * p.y as f64;
    }
    (sum * 0.5) as f32
}

/// True when every non-degenerate turn of the closed loop has the same sign.
///
/// Fewer than three points, or a loop with no non-zero turn, is not convex.
pub fn is_convex(points: &[Vec2]) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }

    let mut sign = 0.0f32;
    for i in 0..n {
        let t = turn(points[i], points[(i + 1) % n], points[(i + 2) % n]);
        if t == 0.0 {
            continue;
        }
        if sign == 0.0 {
            sign = t.signum();
        } else if t.signum() != sign {
            return false;
        }
    }
    sign != 0.0
}

/// Inclusive point-in-triangle test for a triangle with positive turn.
#[inline]
fn in_triangle(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> bool {
    turn(a, b, p) >= 0.0 && turn(b, c, p) >= 0.0 && turn(c, a, p) >= 0.0
}

/// Ear-clipping triangulation of a simple polygon.
///
/// Returns triangle indices into `points`. Winding is normalized first, so
/// either orientation works. A full pass without an ear stops the walk and the
/// triangles found so far are returned; self-intersecting input degrades this way.
pub fn triangulate(points: &[Vec2], start: EarClipStart) -> Vec<u32> {
    let n = points.len();
    if n < 3 {
        return Vec::new();
    }
    if n == 3 {
        return vec![0, 1, 2];
    }

    let mut next: Vec<usize> = (0..n).map(|i| (i + 1) % n).collect();
    let mut prev: Vec<usize> = (0..n).map(|i| (i + n - 1) % n).collect();

    let mut leftmost = 0;
    for (i, p) in points.iter().enumerate().skip(1) {
        let lm = points[leftmost];
        if p.x < lm.x || (p.x == lm.x && p.y < lm.y) {
            leftmost = i;
        }
    }
    if turn(points[prev[leftmost]], points[leftmost], points[next[leftmost]]) < 0.0 {
        std::mem::swap(&mut next, &mut prev);
    }

    let mut out = Vec::with_capacity((n - 2) * 3);
    let mut remaining = n;
    let mut skipped = 0;
    let mut current = start.index();

    while remaining > 3 {
        let p = prev[current];
        let c = next[current];

        if is_ear(points, &next, p, current, c) {
            out.extend([p as u32, current as u32, c as u32]);
            next[p] = c;
            prev[c] = p;
            remaining -= 1;
            skipped = 0;
        } else {
            skipped += 1;
            if skipped > remaining {
                log::debug!("ear clipping stalled with {remaining} vertices left");
                return out;
            }
        }
        current = c;
    }

    out.extend([prev[current] as u32, current as u32, next[current] as u32]);
    out
}

fn is_ear(points: &[Vec2], next: &[usize], p: usize, i: usize, n: usize) -> bool {
    let (a, b, c) = (points[p], points[i], points[n]);
    if turn(a, b, c) <= 0.0 {
        return false;
    }

    let mut j = next[n];
    while j != p {
        let q = points[j];
        if q != a && q != b && q != c && in_triangle(q, a, b, c) {
            return false;
        }
        j = next[j];
    }
    true
}

/// Triangle indices filling a polygon: a fan when convex, ear clipping otherwise.
pub fn fill_indices(points: &[Vec2], start: EarClipStart) -> Vec<u32> {
    if is_convex(points) {
        fan_indices(points.len()).collect()
    } else {
        triangulate(points, start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f32::consts::TAU;

    fn pts(raw: &[(f32, f32)]) -> Vec<Vec2> {
        raw.iter().map(|&(x, y)| Vec2::new(x, y)).collect()
    }

    fn regular(n: usize, r: f32) -> Vec<Vec2> {
        (0..n).map(|i| Vec2::from_angle(i as f32 * TAU / n as f32) * r).collect()
    }

    fn triangle_area_sum(points: &[Vec2], idx: &[u32]) -> f32 {
        idx.chunks(3)
            .map(|t| {
                let (a, b, c) =
                    (points[t[0] as usize], points[t[1] as usize], points[t[2] as usize]);
                turn(a, b, c).abs() * 0.5
            })
            .sum()
    }

    fn assert_conserves_area(points: &[Vec2], start: EarClipStart) {
        let idx = triangulate(points, start);
        assert_eq!(idx.len() / 3, points.len() - 2, "triangle count for {points:?}");
        let expected = signed_area(points).abs();
        let got = triangle_area_sum(points, &idx);
        assert!((expected - got).abs() < 1e-3, "area {got} != {expected}");
    }

    // ── convexity ─────────────────────────────────────────────────────────

    #[test]
    fn square_and_regular_polygons_are_convex() {
        assert!(is_convex(&pts(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)])));
        for n in 3..12 {
            assert!(is_convex(&regular(n, 10.0)), "regular {n}-gon");
        }
    }

    #[test]
    fn degenerate_inputs_are_not_convex() {
        assert!(!is_convex(&[]));
        assert!(!is_convex(&pts(&[(0.0, 0.0), (1.0, 1.0)])));
        assert!(!is_convex(&pts(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)])));
    }

    #[test]
    fn concave_is_detected() {
        let arrow = pts(&[(0.0, 0.0), (4.0, 2.0), (0.0, 4.0), (1.0, 2.0)]);
        assert!(!is_convex(&arrow));
    }

    // ── ear clipping ──────────────────────────────────────────────────────

    #[test]
    fn concave_polygon_area_is_conserved() {
        let l_shape =
            pts(&[(0.0, 0.0), (4.0, 0.0), (4.0, 1.0), (1.0, 1.0), (1.0, 4.0), (0.0, 4.0)]);
        assert_conserves_area(&l_shape, EarClipStart::First);
        assert_conserves_area(&l_shape, EarClipStart::Second);
    }

    #[test]
    fn reversed_winding_is_handled() {
        let mut star: Vec<Vec2> = (0..10)
            .map(|i| {
                let r = if i % 2 == 0 { 10.0 } else { 4.0 };
                Vec2::from_angle(i as f32 * TAU / 10.0) * r
            })
            .collect();
        assert_conserves_area(&star, EarClipStart::First);
        star.reverse();
        assert_conserves_area(&star, EarClipStart::First);
        assert_conserves_area(&star, EarClipStart::Second);
    }

    #[test]
    fn start_offset_changes_first_ear() {
        let square = pts(&[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)]);
        let a = triangulate(&square, EarClipStart::First);
        let b = triangulate(&square, EarClipStart::Second);
        assert_eq!(&a[..3], &[3, 0, 1]);
        assert_eq!(&b[..3], &[0, 1, 2]);
    }

    #[test]
    fn self_intersecting_input_does_not_hang() {
        let bowtie = pts(&[(0.0, 0.0), (2.0, 2.0), (2.0, 0.0), (0.0, 2.0), (1.0, 3.0)]);
        let idx = triangulate(&bowtie, EarClipStart::First);
        assert!(idx.len() % 3 == 0);
        assert!(idx.len() / 3 <= bowtie.len() - 2);
    }

    #[test]
    fn fill_indices_uses_fan_for_convex() {
        let square = pts(&[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)]);
        assert_eq!(fill_indices(&square, EarClipStart::First), vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn too_few_points_yield_nothing() {
        assert!(triangulate(&pts(&[(0.0, 0.0), (1.0, 0.0)]), EarClipStart::First).is_empty());
        assert_eq!(signed_area(&[]), 0.0);
    }
}
