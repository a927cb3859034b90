//! `MotionEngine` — one call per rendered frame.

use gallery_state::{Command, GalleryState, Mode};
use rand::Rng;
use serde::Deserialize;
use tracing::trace;

use crate::camera::{CameraPose, CameraRig};
use crate::fragments::{FragmentAnimator, FragmentTuning, FrameContext};
use crate::particles::ParticleField;
use crate::scene::SceneRig;

// ════════════════════════════════════════════════════════════════════════════
// MotionConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// NDC radius of the pinch pick.
    pub pick_radius:    f32,
    pub particle_count: usize,
    /// Distance of the focused photo in front of the camera.
    pub focus_distance: f32,
    /// VORTEX camera orbit, rad/s.
    pub orbit_speed:    f32,
    /// WARP camera shake half-extent.
    pub shake:          f32,
    /// Longest step a single tick will integrate, seconds.
    pub max_dt:         f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        MotionConfig {
            pick_radius:    0.2,
            particle_count: 5000,
            focus_distance: 5.5,
            orbit_speed:    0.084,
            shake:          0.05,
            max_dt:         0.1,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// MotionEngine
// ════════════════════════════════════════════════════════════════════════════

/// Owns every piece of animation state.  Reads the gallery, never writes it.
#[derive(Debug)]
pub struct MotionEngine {
    config:    MotionConfig,
    particles: ParticleField,
    fragments: FragmentAnimator,
    scene:     SceneRig,
    rig:       CameraRig,
    elapsed:   f32,
}

impl MotionEngine {
    pub fn new<R: Rng + ?Sized>(config: MotionConfig, state: &GalleryState, rng: &mut R) -> Self {
        let particles = ParticleField::new(config.particle_count, rng);
        let mut fragments = FragmentAnimator::new();
        fragments.sync(state.current_index(), state.current_album(), rng);
        MotionEngine {
            rig:       CameraRig::new(config.orbit_speed, config.shake),
            scene:     SceneRig::new(state.current_album().theme_color),
            particles,
            fragments,
            config,
            elapsed:   0.0,
        }
    }

    pub fn config(&self)    -> &MotionConfig      { &self.config }
    pub fn particles(&self) -> &ParticleField     { &self.particles }
    pub fn fragments(&self) -> &FragmentAnimator  { &self.fragments }
    pub fn scene(&self)     -> &SceneRig          { &self.scene }
    pub fn elapsed(&self)   -> f32                { self.elapsed }

    /// Advance all animation by `dt` seconds (clamped to `max_dt`).
    /// Returns hover / pick commands for the caller to apply to `state`.
    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        state:  &GalleryState,
        camera: &mut CameraPose,
        dt:     f32,
        rng:    &mut R,
    ) -> Vec<Command> {
        let dt = if dt.is_finite() { dt.clamp(0.0, self.config.max_dt) } else { 0.0 };
        self.elapsed += dt;

        let mode = state.mode();
        let theme = state.current_album().theme_color;

        match mode {
            Mode::Vortex => self.rig.orbit(camera, dt),
            Mode::Warp   => self.rig.jitter(camera, rng),
            _            => {}
        }

        self.scene.update(mode, state.rig_rotation(), theme, dt);
        self.particles.update(mode, theme, dt, rng);
        self.fragments.sync(state.current_index(), state.current_album(), rng);

        let ctx = FrameContext {
            mode,
            elapsed:  self.elapsed,
            gesture:  state.gesture(),
            selected: state.selected(),
            hovered:  state.hovered(),
            group:    self.scene.group_rotation(),
            camera:   &*camera,
        };
        let tuning = FragmentTuning {
            pick_radius:    self.config.pick_radius,
            focus_distance: self.config.focus_distance,
        };
        let commands = self.fragments.update(&ctx, tuning, dt);
        if !commands.is_empty() {
            trace!(count = commands.len(), ?mode, "fragment signals");
        }
        commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Projector;
    use gallery_state::{default_albums, PhotoId};
    use glam::Vec2;
    use hand_pose::GestureSnapshot;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn setup() -> (GalleryState, MotionEngine, CameraPose, StdRng) {
        let mut rng = StdRng::seed_from_u64(21);
        let state = GalleryState::new(default_albums(&mut rng)).unwrap();
        let config = MotionConfig { particle_count: 64, ..Default::default() };
        let engine = MotionEngine::new(config, &state, &mut rng);
        (state, engine, CameraPose::default(), rng)
    }

    #[test]
    fn dt_is_clamped() {
        let (state, mut engine, mut cam, mut rng) = setup();
        engine.tick(&state, &mut cam, 5.0, &mut rng);
        assert!((engine.elapsed() - 0.1).abs() < 1e-6);
        engine.tick(&state, &mut cam, f32::NAN, &mut rng);
        assert!((engine.elapsed() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn vortex_orbits_camera() {
        let (state, mut engine, mut cam, mut rng) = setup();
        let before = cam.position;
        engine.tick(&state, &mut cam, 0.1, &mut rng);
        assert!(cam.position.x.abs() > 0.0);
        assert!((cam.position.length() - before.length()).abs() < 1e-4);
    }

    #[test]
    fn pinch_over_fragment_picks_it() {
        let (mut state, mut engine, mut cam, mut rng) = setup();
        state.begin_warp(0, Default::default());
        state.advance_timers(10_000);
        assert_eq!(state.current_index(), 1);
        state.set_mode(Mode::BigBang);

        engine.tick(&state, &mut cam, 0.0, &mut rng);
        let rec = &engine.fragments().records()[0];
        let id: PhotoId = rec.id.clone();
        let ndc = cam.project(engine.scene().group_rotation() * rec.current).unwrap();
        state.set_gesture(GestureSnapshot {
            is_pinching:   true,
            hand_position: Vec2::new(ndc.x, ndc.y),
            ..Default::default()
        });

        let cmds = engine.tick(&state, &mut cam, 0.0, &mut rng);
        assert!(cmds.contains(&Command::Pick(id.clone())));
        for cmd in cmds {
            state.apply(cmd, &mut rng).unwrap();
        }
        assert_eq!(state.mode(), Mode::Singularity);
        assert_eq!(state.selected(), Some(&id));
    }

    #[test]
    fn album_switch_rebuilds_fragments() {
        let (mut state, mut engine, mut cam, mut rng) = setup();
        assert!(engine.fragments().records().is_empty());
        state.begin_warp(0, Default::default());
        state.advance_timers(1_000);
        engine.tick(&state, &mut cam, 0.016, &mut rng);
        assert_eq!(engine.fragments().records().len(), 5);
    }
}
