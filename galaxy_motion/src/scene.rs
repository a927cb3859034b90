//! Galaxy group tilt and environment colour.

use glam::{EulerRot, Quat, Vec2};
use gallery_state::{Mode, Rgb};

use crate::damp::Blend;

/// Fraction of the hand-driven rig rotation the galaxy actually tilts by.
const TILT_SCALE: f32 = 0.3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneRig {
    /// Euler x / y of the galaxy group, radians.
    pub rotation:    Vec2,
    /// Light colour, easing toward the current album's theme.
    pub environment: Rgb,
}

impl SceneRig {
    pub fn new(theme: Rgb) -> Self {
        SceneRig { rotation: Vec2::ZERO, environment: theme }
    }

    pub fn update(&mut self, mode: Mode, rig_rotation: Vec2, theme: Rgb, dt: f32) {
        self.environment.approach(theme, dt, 1.0);
        if mode == Mode::BigBang {
            self.rotation.approach(rig_rotation * TILT_SCALE, dt, 2.0);
        } else {
            self.rotation.approach(Vec2::ZERO, dt, 1.0);
        }
    }

    pub fn group_rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tilts_only_in_big_bang() {
        let mut rig = SceneRig::new(Rgb::BLACK);
        let target = Vec2::new(1.0, -2.0);
        for _ in 0..600 {
            rig.update(Mode::BigBang, target, Rgb::BLACK, 1.0 / 60.0);
        }
        assert!((rig.rotation - target * 0.3).length() < 1e-4);

        for _ in 0..900 {
            rig.update(Mode::Vortex, target, Rgb::BLACK, 1.0 / 60.0);
        }
        assert!(rig.rotation.length() < 1e-4);
    }

    #[test]
    fn environment_follows_theme() {
        let mut rig = SceneRig::new(Rgb::BLACK);
        rig.update(Mode::Warp, Vec2::ZERO, Rgb::WHITE, 0.25);
        assert!((rig.environment.r - 0.25).abs() < 1e-6);
        assert_eq!(rig.group_rotation(), Quat::IDENTITY);
    }
}
