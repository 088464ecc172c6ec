use core::f32::consts::TAU;

use rand::Rng;

use crate::coords::Vec2;

/// Shape from which spawn offsets are drawn.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum AreaDistribution {
    /// Every particle spawns at the emitter position.
    #[default]
    None,
    /// Uniform over the rectangle `[-dx, dx] × [-dy, dy]`.
    Uniform,
    /// Gaussian with standard deviations `dx`, `dy`.
    Normal,
    /// Uniform over the filled ellipse with radii `dx`, `dy`.
    Ellipse,
    /// On the ellipse outline.
    BorderEllipse,
    /// On the rectangle outline.
    BorderRectangle,
}

/// Spawn area around the emitter.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct EmissionArea {
    pub distribution: AreaDistribution,
    pub dx: f32,
    pub dy: f32,
    /// Rotation of the area, radians.
    pub angle: f32,
    /// Add the angle of the spawn offset to each particle's direction.
    pub direction_relative_to_center: bool,
}

impl EmissionArea {
    /// Draws one spawn offset relative to the emitter.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec2 {
        let (dx, dy) = (self.dx.abs(), self.dy.abs());
        let offset = match self.distribution {
            AreaDistribution::None => return Vec2::zero(),
            AreaDistribution::Uniform => {
                Vec2::new(uniform(rng, -dx, dx), uniform(rng, -dy, dy))
            }
            AreaDistribution::Normal => Vec2::new(gaussian(rng) * dx, gaussian(rng) * dy),
            AreaDistribution::Ellipse => {
                let a = uniform(rng, 0.0, TAU);
                let r = rng.r#gen::<f32>().sqrt();
                Vec2::new(dx * r * a.cos(), dy * r * a.sin())
            }
            AreaDistribution::BorderEllipse => {
                let a = uniform(rng, 0.0, TAU);
                Vec2::new(dx * a.cos(), dy * a.sin())
            }
            AreaDistribution::BorderRectangle => {
                rectangle_border(uniform(rng, 0.0, 4.0 * (dx + dy)), dx, dy)
            }
        };

        if self.angle != 0.0 { offset.rotated(self.angle) } else { offset }
    }
}

/// Uniform in `[min, max)`; either order is accepted.
#[inline]
pub(crate) fn uniform<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    if min == max {
        return min;
    }
    min + (max - min) * rng.r#gen::<f32>()
}

/// Standard normal sample (Box–Muller).
fn gaussian<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    let u1 = 1.0 - rng.r#gen::<f32>();
    let u2 = rng.r#gen::<f32>();
    (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos()
}

/// Point at distance `d` along the outline of `[-dx, dx] × [-dy, dy]`,
/// walking clockwise (y down) from the top-left corner.
fn rectangle_border(d: f32, dx: f32, dy: f32) -> Vec2 {
    let (w, h) = (2.0 * dx, 2.0 * dy);
    if d < w {
        Vec2::new(-dx + d, -dy)
    } else if d < w + h {
        Vec2::new(dx, -dy + (d - w))
    } else if d < 2.0 * w + h {
        Vec2::new(dx - (d - w - h), dy)
    } else {
        Vec2::new(-dx, dy - (d - 2.0 * w - h))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn area(distribution: AreaDistribution, dx: f32, dy: f32) -> EmissionArea {
        EmissionArea { distribution, dx, dy, ..EmissionArea::default() }
    }

    // ── distributions ─────────────────────────────────────────────────────

    #[test]
    fn none_is_origin() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(area(AreaDistribution::None, 5.0, 5.0).sample(&mut rng), Vec2::zero());
    }

    #[test]
    fn uniform_stays_in_rectangle() {
        let mut rng = StdRng::seed_from_u64(2);
        let a = area(AreaDistribution::Uniform, 4.0, 2.0);
        for _ in 0..500 {
            let p = a.sample(&mut rng);
            assert!(p.x.abs() <= 4.0 && p.y.abs() <= 2.0);
        }
    }

    #[test]
    fn ellipse_stays_inside() {
        let mut rng = StdRng::seed_from_u64(3);
        let a = area(AreaDistribution::Ellipse, 4.0, 2.0);
        for _ in 0..500 {
            let p = a.sample(&mut rng);
            assert!((p.x / 4.0).powi(2) + (p.y / 2.0).powi(2) <= 1.0 + 1e-4);
        }
    }

    #[test]
    fn border_ellipse_lies_on_outline() {
        let mut rng = StdRng::seed_from_u64(4);
        let a = area(AreaDistribution::BorderEllipse, 3.0, 3.0);
        for _ in 0..100 {
            assert!((a.sample(&mut rng).length() - 3.0).abs() < 1e-4);
        }
    }

    #[test]
    fn border_rectangle_lies_on_outline() {
        let mut rng = StdRng::seed_from_u64(5);
        let a = area(AreaDistribution::BorderRectangle, 4.0, 2.0);
        for _ in 0..500 {
            let p = a.sample(&mut rng);
            let on_vertical = (p.x.abs() - 4.0).abs() < 1e-4 && p.y.abs() <= 2.0 + 1e-4;
            let on_horizontal = (p.y.abs() - 2.0).abs() < 1e-4 && p.x.abs() <= 4.0 + 1e-4;
            assert!(on_vertical || on_horizontal, "{p:?}");
        }
    }

    #[test]
    fn rectangle_walk_corners() {
        assert_eq!(rectangle_border(0.0, 2.0, 1.0), Vec2::new(-2.0, -1.0));
        assert_eq!(rectangle_border(4.0, 2.0, 1.0), Vec2::new(2.0, -1.0));
        assert_eq!(rectangle_border(6.0, 2.0, 1.0), Vec2::new(2.0, 1.0));
        assert_eq!(rectangle_border(10.0, 2.0, 1.0), Vec2::new(-2.0, 1.0));
    }

    #[test]
    fn normal_is_roughly_centered() {
        let mut rng = StdRng::seed_from_u64(6);
        let a = area(AreaDistribution::Normal, 1.0, 1.0);
        let n = 4000;
        let mean = (0..n).map(|_| a.sample(&mut rng).x).sum::<f32>() / n as f32;
        assert!(mean.abs() < 0.1);
    }

    // ── rotation ──────────────────────────────────────────────────────────

    #[test]
    fn angle_rotates_offset() {
        let mut rng = StdRng::seed_from_u64(7);
        let a = EmissionArea {
            distribution: AreaDistribution::Uniform,
            dx: 3.0,
            dy: 0.0,
            angle: core::f32::consts::FRAC_PI_2,
            direction_relative_to_center: false,
        };
        for _ in 0..50 {
            let p = a.sample(&mut rng);
            assert!(p.x.abs() < 1e-4);
            assert!(p.y.abs() <= 3.0 + 1e-4);
        }
    }

    #[test]
    fn uniform_helper_accepts_reversed_bounds() {
        let mut rng = StdRng::seed_from_u64(8);
        for _ in 0..100 {
            let v = uniform(&mut rng, 5.0, -5.0);
            assert!((-5.0..=5.0).contains(&v));
        }
        assert_eq!(uniform(&mut rng, 2.0, 2.0), 2.0);
    }
}
