//! Perspective camera, projection to normalized device coordinates, and the
//! mode-driven camera rig (auto-orbit and warp shake).

use glam::{Mat3, Mat4, Quat, Vec3};
use rand::Rng;

// ════════════════════════════════════════════════════════════════════════════
// Projector
// ════════════════════════════════════════════════════════════════════════════

/// What the animation engine needs from whoever renders the scene.
pub trait Projector {
    /// World point → NDC (`x`, `y` in `[-1, 1]`, `z` depth in `[0, 1]`).
    /// `None` when the point is behind the camera.
    fn project(&self, world: Vec3) -> Option<Vec3>;

    fn eye(&self) -> Vec3;

    /// Unit view direction.
    fn forward(&self) -> Vec3;
}

// ════════════════════════════════════════════════════════════════════════════
// CameraPose
// ════════════════════════════════════════════════════════════════════════════

/// A right-handed perspective camera looking down its local −Z.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub position:    Vec3,
    pub orientation: Quat,
    /// Vertical field of view, radians.
    pub fov_y:       f32,
    pub aspect:      f32,
    pub near:        f32,
    pub far:         f32,
}

impl Default for CameraPose {
    fn default() -> Self {
        let mut cam = CameraPose {
            position:    Vec3::new(0.0, 5.0, 15.0),
            orientation: Quat::IDENTITY,
            fov_y:       60f32.to_radians(),
            aspect:      16.0 / 9.0,
            near:        0.1,
            far:         1000.0,
        };
        cam.look_at(Vec3::ZERO);
        cam
    }
}

impl CameraPose {
    pub fn with_aspect(mut self, aspect: f32) -> Self {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
        self
    }

    /// Turn to face `target` keeping world +Y up.  A target straight above
    /// or below, or at the eye, leaves the orientation unchanged.
    pub fn look_at(&mut self, target: Vec3) {
        let Some(fwd) = (target - self.position).try_normalize() else { return };
        let Some(right) = fwd.cross(Vec3::Y).try_normalize() else { return };
        let up = right.cross(fwd);
        self.orientation = Quat::from_mat3(&Mat3::from_cols(right, up, -fwd));
    }

    pub fn view(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.position).inverse()
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }
}

impl Projector for CameraPose {
    fn project(&self, world: Vec3) -> Option<Vec3> {
        let clip = self.view_projection() * world.extend(1.0);
        if clip.w <= f32::EPSILON {
            return None;
        }
        Some(clip.truncate() / clip.w)
    }

    fn eye(&self) -> Vec3 { self.position }

    fn forward(&self) -> Vec3 { self.orientation * Vec3::NEG_Z }
}

// ════════════════════════════════════════════════════════════════════════════
// CameraRig
// ════════════════════════════════════════════════════════════════════════════

/// Moves the camera between frames: a slow orbit around the origin while
/// idle, and a random jitter during WARP.
#[derive(Clone, Copy, Debug)]
pub struct CameraRig {
    /// Orbit speed in rad/s.
    pub orbit_speed: f32,
    /// Half-extent of the per-tick WARP jitter on x and y.
    pub shake:       f32,
}

impl CameraRig {
    pub fn new(orbit_speed: f32, shake: f32) -> Self {
        CameraRig { orbit_speed, shake }
    }

    /// Orbit `camera` about the world Y axis through the origin.
    pub fn orbit(&self, camera: &mut CameraPose, dt: f32) {
        let rot = Quat::from_rotation_y(self.orbit_speed * dt);
        camera.position = rot * camera.position;
        camera.look_at(Vec3::ZERO);
    }

    pub fn jitter<R: Rng + ?Sized>(&self, camera: &mut CameraPose, rng: &mut R) {
        if self.shake <= 0.0 {
            return;
        }
        camera.position.x += rng.gen_range(-self.shake..self.shake);
        camera.position.y += rng.gen_range(-self.shake..self.shake);
    }
}
