use crate::paint::Color;

/// Most stops a ramp keeps; extra stops are dropped.
pub const MAX_RAMP_STOPS: usize = 8;

/// Linear interpolation between two values of a ramp.
pub trait Lerp: Copy {
    fn lerp(self, to: Self, t: f32) -> Self;
}

impl Lerp for f32 {
    #[inline]
    fn lerp(self, to: f32, t: f32) -> f32 {
        self + (to - self) * t
    }
}

impl Lerp for Color {
    #[inline]
    fn lerp(self, to: Color, t: f32) -> Color {
        Color::lerp(self, to, t)
    }
}

/// Piecewise-linear curve over evenly spaced stops on [0, 1].
///
/// Never empty. A single stop is constant.
#[derive(Debug, Clone, PartialEq)]
pub struct Ramp<T> {
    stops: Vec<T>,
}

impl<T: Lerp> Ramp<T> {
    #[inline]
    pub fn constant(value: T) -> Self {
        Self { stops: vec![value] }
    }

    /// Builds a ramp from up to [`MAX_RAMP_STOPS`] stops. `None` when `stops` is empty.
    pub fn new(stops: &[T]) -> Option<Self> {
        if stops.is_empty() {
            return None;
        }
        if stops.len() > MAX_RAMP_STOPS {
            log::debug!("Ramp: {} stops given, keeping {MAX_RAMP_STOPS}", stops.len());
        }
        let n = stops.len().min(MAX_RAMP_STOPS);
        Some(Self { stops: stops[..n].to_vec() })
    }

    #[inline]
    pub fn stops(&self) -> &[T] {
        &self.stops
    }

    /// Value at `t`, clamped to [0, 1].
    pub fn sample(&self, t: f32) -> T {
        let last = self.stops.len() - 1;
        if last == 0 {
            return self.stops[0];
        }
        let s = t.clamp(0.0, 1.0) * last as f32;
        let i = (s as usize).min(last);
        let k = (i + 1).min(last);
        self.stops[i].lerp(self.stops[k], s - i as f32)
    }
}
