//! Exponential approach toward a target, independent of frame rate.
//!
//! Every animated quantity moves `current += (target - current) * k` with
//! `k = clamp(dt * rate, 0, 1)`, so a long frame never overshoots.

use glam::{Vec2, Vec3};
use gallery_state::Rgb;

/// Blend factor for one step of `dt` seconds at `rate` per second.
pub fn damp_factor(dt: f32, rate: f32) -> f32 {
    (dt * rate).clamp(0.0, 1.0)
}

/// Values that can be moved a fraction of the way toward a target.
pub trait Blend: Copy {
    fn blend(self, target: Self, k: f32) -> Self;

    fn approach(&mut self, target: Self, dt: f32, rate: f32) {
        *self = self.blend(target, damp_factor(dt, rate));
    }
}

impl Blend for f32 {
    fn blend(self, target: f32, k: f32) -> f32 { self + (target - self) * k }
}

impl Blend for Vec2 {
    fn blend(self, target: Vec2, k: f32) -> Vec2 { self.lerp(target, k) }
}

impl Blend for Vec3 {
    fn blend(self, target: Vec3, k: f32) -> Vec3 { self.lerp(target, k) }
}

impl Blend for Rgb {
    fn blend(self, target: Rgb, k: f32) -> Rgb { self.lerp(target, k) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factor_is_clamped() {
        assert_eq!(damp_factor(0.5, 6.0), 1.0);
        assert_eq!(damp_factor(-1.0, 2.0), 0.0);
        assert!((damp_factor(0.016, 2.0) - 0.032).abs() < 1e-6);
    }

    #[test]
    fn huge_step_lands_exactly() {
        let mut v = Vec3::ZERO;
        v.approach(Vec3::new(1.0, 2.0, 3.0), 10.0, 2.0);
        assert_eq!(v, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn approach_is_monotonic() {
        let mut x = 0.0f32;
        let mut prev = x;
        for _ in 0..200 {
            x.approach(1.0, 1.0 / 60.0, 3.0);
            assert!(x >= prev && x <= 1.0);
            prev = x;
        }
        assert!(x > 0.99);
    }

    #[test]
    fn colours_blend_per_channel() {
        let mut c = Rgb::BLACK;
        c.approach(Rgb::WHITE, 0.1, 5.0);
        assert!((c.r - 0.5).abs() < 1e-6 && (c.g - 0.5).abs() < 1e-6);
    }
}
