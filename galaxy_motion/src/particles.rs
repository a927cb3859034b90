//! The background particle field.
//!
//! Every particle has two precomputed homes: a point on a flat spiral
//! (VORTEX) and a point in a thick spherical shell (BIG_BANG and
//! SINGULARITY).  Each tick the live positions ease toward whichever set is
//! active.  WARP ignores both and streams particles past the camera,
//! recycling them in place so the count never changes.

use glam::Vec3;
use gallery_state::{Mode, Rgb};
use rand::Rng;

use crate::damp::{damp_factor, Blend};

const SPIRAL_STEP:     f32 = 0.1;
const SPIRAL_R0:       f32 = 2.0;
const SPIRAL_GROWTH:   f32 = 0.005;
const SPIRAL_THICK:    f32 = 1.5;
const SHELL_MIN:       f32 = 10.0;
const SHELL_DEPTH:     f32 = 20.0;
const SPIN_RATE:       f32 = 0.2;
const WARP_SPEED:      f32 = 80.0;
const WARP_FAR_Z:      f32 = 20.0;
const WARP_RESPAWN_Z:  f32 = -50.0;
const WARP_SPREAD:     f32 = 25.0;
const SINGULARITY_DIM: f32 = 0.2;
const TINT_RATE:       f32 = 2.0;

/// Initial tint before the first theme colour arrives.
const START_TINT: u32 = 0x88ccff;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetSet {
    Vortex,
    BigBang,
}

#[derive(Debug, Clone)]
pub struct ParticleField {
    positions: Vec<Vec3>,
    vortex:    Vec<Vec3>,
    big_bang:  Vec<Vec3>,
    scales:    Vec<f32>,
    target:    TargetSet,
    tint:      Rgb,
}

impl ParticleField {
    pub fn new<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Self {
        let vortex: Vec<Vec3> = (0..count)
            .map(|i| {
                let angle = i as f32 * SPIRAL_STEP;
                let r = SPIRAL_R0 + i as f32 * SPIRAL_GROWTH;
                let y = (rng.gen::<f32>() - 0.5) * SPIRAL_THICK;
                Vec3::new(angle.cos() * r, y, angle.sin() * r)
            })
            .collect();

        let big_bang = (0..count)
            .map(|_| {
                let r = SHELL_MIN + rng.gen::<f32>() * SHELL_DEPTH;
                let theta = rng.gen::<f32>() * std::f32::consts::TAU;
                let phi = (rng.gen::<f32>() * 2.0 - 1.0).acos();
                Vec3::new(
                    r * phi.sin() * theta.cos(),
                    r * phi.sin() * theta.sin(),
                    r * phi.cos(),
                )
            })
            .collect();

        let scales = (0..count).map(|_| rng.gen::<f32>()).collect();

        ParticleField {
            positions: vortex.clone(),
            vortex,
            big_bang,
            scales,
            target:    TargetSet::Vortex,
            tint:      Rgb::from_u32(START_TINT),
        }
    }

    pub fn len(&self)                -> usize     { self.positions.len() }
    pub fn is_empty(&self)           -> bool      { self.positions.is_empty() }
    pub fn positions(&self)          -> &[Vec3]   { &self.positions }
    pub fn target(&self)             -> TargetSet { self.target }
    pub fn tint(&self)               -> Rgb       { self.tint }
    pub fn vortex_home(&self, i: usize)   -> Vec3 { self.vortex[i] }
    pub fn big_bang_home(&self, i: usize) -> Vec3 { self.big_bang[i] }

    /// Advance one frame.
    pub fn update<R: Rng + ?Sized>(&mut self, mode: Mode, theme: Rgb, dt: f32, rng: &mut R) {
        match mode {
            Mode::Vortex                     => self.target = TargetSet::Vortex,
            Mode::BigBang | Mode::Singularity => self.target = TargetSet::BigBang,
            Mode::Warp                       => {}
        }

        let tint = if mode == Mode::Singularity { theme.scale(SINGULARITY_DIM) } else { theme };
        self.tint.approach(tint, dt, TINT_RATE);

        if mode == Mode::Warp {
            self.stream(dt, rng);
        } else {
            let rate = if mode == Mode::BigBang { 3.0 } else { 2.0 };
            self.settle(damp_factor(dt, rate), mode == Mode::Vortex, dt);
        }
    }

    fn stream<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) {
        for p in &mut self.positions {
            if p.z > WARP_FAR_Z {
                p.z = WARP_RESPAWN_Z;
                p.x = rng.gen_range(-WARP_SPREAD..WARP_SPREAD);
                p.y = rng.gen_range(-WARP_SPREAD..WARP_SPREAD);
            }
            p.z += WARP_SPEED * dt;
        }
    }

    fn settle(&mut self, k: f32, spin: bool, dt: f32) {
        let homes = match self.target {
            TargetSet::Vortex  => &self.vortex,
            TargetSet::BigBang => &self.big_bang,
        };
        let (sin, cos) = (SPIN_RATE * dt).sin_cos();
        for (p, home) in self.positions.iter_mut().zip(homes) {
            *p = p.blend(*home, k);
            if spin {
                let (x, z) = (p.x, p.z);
                p.x = x * cos - z * sin;
                p.z = x * sin + z * cos;
            }
        }
    }

    /// Per-instance scale for the renderer.
    pub fn instance_scale(&self, i: usize, mode: Mode) -> Vec3 {
        match mode {
            Mode::Warp        => Vec3::new(0.1, 0.1, 8.0),
            Mode::Singularity => Vec3::splat(self.scales[i] * 0.3),
            _                 => Vec3::splat(self.scales[i]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn field(n: usize) -> (ParticleField, StdRng) {
        let mut rng = StdRng::seed_from_u64(3);
        (ParticleField::new(n, &mut rng), rng)
    }

    #[test]
    fn homes_have_expected_shape() {
        let (f, _) = field(500);
        for i in 0..f.len() {
            let v = f.vortex_home(i);
            let r = (v.x * v.x + v.z * v.z).sqrt();
            assert!((r - (2.0 + i as f32 * 0.005)).abs() < 1e-3);
            assert!(v.y.abs() <= 0.75);

            let b = f.big_bang_home(i).length();
            assert!((10.0 - 1e-3..30.0 + 1e-3).contains(&b));
        }
    }

    #[test]
    fn big_bang_converges_to_shell() {
        let white = Rgb::WHITE;
        let (mut f, mut rng) = field(100);
        for _ in 0..600 {
            f.update(Mode::BigBang, white, 1.0 / 60.0, &mut rng);
        }
        assert_eq!(f.target(), TargetSet::BigBang);
        for i in 0..f.len() {
            assert!((f.positions()[i] - f.big_bang_home(i)).length() < 1e-2);
        }
    }

    #[test]
    fn warp_keeps_target_and_count() {
        let (mut f, mut rng) = field(200);
        f.update(Mode::BigBang, Rgb::WHITE, 0.016, &mut rng);
        for _ in 0..300 {
            f.update(Mode::Warp, Rgb::WHITE, 1.0 / 60.0, &mut rng);
        }
        assert_eq!(f.target(), TargetSet::BigBang);
        assert_eq!(f.len(), 200);
        for p in f.positions() {
            // recycled before exceeding the far plane by more than one step
            assert!(p.z <= 20.0 + 80.0 / 60.0 + 1e-3);
        }
    }

    #[test]
    fn warp_recycles_past_far_plane() {
        let (mut f, mut rng) = field(1);
        f.positions[0] = Vec3::new(0.0, 0.0, 21.0);
        f.update(Mode::Warp, Rgb::WHITE, 0.01, &mut rng);
        let p = f.positions()[0];
        assert!((p.z - (-50.0 + 0.8)).abs() < 1e-4);
        assert!(p.x.abs() <= 25.0 && p.y.abs() <= 25.0);
    }

    #[test]
    fn vortex_spins_about_y() {
        let (mut f, mut rng) = field(50);
        let before: Vec<f32> = f.positions().iter().map(|p| p.y).collect();
        let r0: Vec<f32> = f.positions().iter().map(|p| (p.x * p.x + p.z * p.z).sqrt()).collect();
        f.update(Mode::Vortex, Rgb::WHITE, 0.5, &mut rng);
        for (i, p) in f.positions().iter().enumerate() {
            assert_eq!(p.y, before[i]);
            assert!(((p.x * p.x + p.z * p.z).sqrt() - r0[i]).abs() < 1e-4);
        }
        assert!((f.positions()[10] - f.vortex_home(10)).length() > 1e-3);
    }

    #[test]
    fn singularity_dims_and_shrinks() {
        let (mut f, mut rng) = field(10);
        let theme = Rgb::new(1.0, 0.5, 0.0);
        f.update(Mode::Singularity, theme, 1.0, &mut rng);
        assert!((f.tint().r - 0.2).abs() < 1e-6);
        assert!((f.tint().g - 0.1).abs() < 1e-6);
        let s = f.instance_scale(3, Mode::Singularity);
        assert!((s.x - f.instance_scale(3, Mode::BigBang).x * 0.3).abs() < 1e-6);
        assert_eq!(f.instance_scale(3, Mode::Warp), Vec3::new(0.1, 0.1, 8.0));
    }
}
