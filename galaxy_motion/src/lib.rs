//! # galaxy_motion
//!
//! Continuous, frame-rate independent animation of the photo galaxy.
//!
//! | Module | Animates |
//! |---|---|
//! | [`damp`] | shared exponential approach |
//! | [`camera`] | perspective projection, VORTEX orbit, WARP shake |
//! | [`particles`] | 5000 background particles: spiral, shell, warp stream |
//! | [`fragments`] | one record per photo: targets, pick, glitch, tint |
//! | [`scene`] | galaxy group tilt, environment colour |
//!
//! [`MotionEngine::tick`] drives them all from a read-only
//! [`GalleryState`](gallery_state::GalleryState) and returns the pick and
//! hover [`Command`](gallery_state::Command)s raised by the hand cursor.

pub mod camera;
pub mod damp;
pub mod engine;
pub mod fragments;
pub mod particles;
pub mod scene;

pub use camera::{CameraPose, CameraRig, Projector};
pub use damp::{damp_factor, Blend};
pub use engine::{MotionConfig, MotionEngine};
pub use fragments::{FragmentAnimator, FragmentMotion};
pub use particles::{ParticleField, TargetSet};
pub use scene::SceneRig;
