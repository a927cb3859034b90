//! Per-photo motion: position targets by mode, the proximity pick, and the
//! glitch / hover / tint channels the renderer shades with.
//!
//! The animator never writes gallery state.  Hover and pick signals come
//! back as [`Command`]s for the owner of the `GalleryState` to apply.

use glam::{Mat3, Quat, Vec3};
use gallery_state::{Album, Command, Mode, PhotoId, Rgb};
use hand_pose::GestureSnapshot;
use rand::Rng;
use tracing::debug;

use crate::camera::Projector;
use crate::damp::Blend;

const GLITCH_IMPULSE:      f32 = 2.0;
const GLITCH_SELECTED:     f32 = 0.1;
const GLITCH_HOVERED:      f32 = 0.3;
const HOVER_SELECTED:      f32 = 0.2;
const HOVER_HOVERED:       f32 = 0.5;
const HOVER_RATE:          f32 = 10.0;
const COLOR_RATE:          f32 = 5.0;
const SEED_RANGE:          f32 = 100.0;
const BIG_BANG_SPREAD:     f32 = 4.0;
const SINGULARITY_EXILE:   f32 = 30.0;
const WARP_DRIFT:          f32 = 50.0;

const COLOR_SELECTED: u32 = 0xffffff;
const COLOR_HOVERED:  u32 = 0x00ff88;
const COLOR_IDLE:     u32 = 0x4fd4ff;

/// Tunables the engine passes through from its config.
#[derive(Clone, Copy, Debug)]
pub struct FragmentTuning {
    /// NDC distance within which the hand cursor hovers a photo.
    pub pick_radius:    f32,
    /// Distance in front of the camera for the focused photo.
    pub focus_distance: f32,
}

/// Everything a tick needs to know about the world, borrowed for one frame.
pub struct FrameContext<'a> {
    pub mode:     Mode,
    /// Seconds since the engine started.
    pub elapsed:  f32,
    pub gesture:  &'a GestureSnapshot,
    pub selected: Option<&'a PhotoId>,
    pub hovered:  Option<&'a PhotoId>,
    /// Rotation of the galaxy group; fragment positions are group-local.
    pub group:    Quat,
    pub camera:   &'a dyn Projector,
}

// ════════════════════════════════════════════════════════════════════════════
// FragmentMotion
// ════════════════════════════════════════════════════════════════════════════

/// Animation record for one photo.
#[derive(Clone, Debug, PartialEq)]
pub struct FragmentMotion {
    pub id:      PhotoId,
    pub initial: Vec3,
    pub current: Vec3,
    pub target:  Vec3,
    /// Per-photo phase in `[0, 100)`.
    pub seed:    f32,
    pub glitch:  f32,
    pub hover:   f32,
    pub color:   Rgb,
    /// Group-local orientation, kept facing the camera.
    pub facing:  Quat,
    was_selected: bool,
}

impl FragmentMotion {
    pub fn new<R: Rng + ?Sized>(id: PhotoId, initial: Vec3, rng: &mut R) -> Self {
        FragmentMotion {
            id,
            initial,
            current: initial,
            target:  initial,
            seed:    rng.gen::<f32>() * SEED_RANGE,
            glitch:  0.0,
            hover:   0.0,
            color:   Rgb::from_u32(COLOR_IDLE),
            facing:  Quat::IDENTITY,
            was_selected: false,
        }
    }

    /// Where this photo wants to be this frame.  WARP keeps drifting the
    /// previous target instead of replacing it.
    fn aim(&mut self, ctx: &FrameContext<'_>, selected: bool, focus_distance: f32, dt: f32) {
        let t = ctx.elapsed;
        let s = self.seed;
        match ctx.mode {
            Mode::Vortex => {
                let angle = t * 0.2 + s;
                let radius = 3.0 + (t + s).sin();
                self.target = Vec3::new(
                    angle.cos() * radius,
                    (t * 0.5 + s).sin() * 0.5,
                    angle.sin() * radius,
                );
            }
            Mode::BigBang => {
                let c = self.id.phase_code() as f32;
                self.target = Vec3::new(
                    self.initial.x * BIG_BANG_SPREAD + (t * 0.1 + c).sin(),
                    self.initial.y * BIG_BANG_SPREAD + (t * 0.1 + c).cos(),
                    self.initial.z * BIG_BANG_SPREAD,
                );
            }
            Mode::Singularity if selected => {
                let world = ctx.camera.eye() + ctx.camera.forward() * focus_distance;
                self.target = ctx.group.inverse() * world;
            }
            Mode::Singularity => self.target = self.initial * SINGULARITY_EXILE,
            Mode::Warp => self.target.z += WARP_DRIFT * dt,
        }
    }

    fn shade(&mut self, mode: Mode, selected: bool, hovered: bool, dt: f32) {
        if selected && !self.was_selected {
            self.glitch = GLITCH_IMPULSE;
        }
        self.was_selected = selected;

        if selected {
            self.glitch.approach(GLITCH_SELECTED, dt, 2.0);
        } else {
            let rest = if hovered { GLITCH_HOVERED } else { 0.0 };
            self.glitch.approach(rest, dt, 5.0);
        }

        let hover = if selected {
            HOVER_SELECTED
        } else if hovered && mode == Mode::BigBang {
            HOVER_HOVERED
        } else {
            0.0
        };
        self.hover.approach(hover, dt, HOVER_RATE);

        let color = if selected {
            COLOR_SELECTED
        } else if hovered {
            COLOR_HOVERED
        } else {
            COLOR_IDLE
        };
        self.color.approach(Rgb::from_u32(color), dt, COLOR_RATE);
    }

    fn face(&mut self, ctx: &FrameContext<'_>) {
        let eye_local = ctx.group.inverse() * ctx.camera.eye();
        if let Some(q) = billboard(self.current, eye_local) {
            self.facing = q;
        }
    }
}

/// Orientation whose +Z points from `from` toward `to`, +Y kept up.
fn billboard(from: Vec3, to: Vec3) -> Option<Quat> {
    let z = (to - from).try_normalize()?;
    let x = Vec3::Y.cross(z).try_normalize()?;
    let y = z.cross(x);
    Some(Quat::from_mat3(&Mat3::from_cols(x, y, z)))
}

// ════════════════════════════════════════════════════════════════════════════
// FragmentAnimator
// ════════════════════════════════════════════════════════════════════════════

/// Motion records for every photo in the current album.
#[derive(Debug, Default)]
pub struct FragmentAnimator {
    records: Vec<FragmentMotion>,
    album:   Option<usize>,
}

impl FragmentAnimator {
    pub fn new() -> Self { Self::default() }

    pub fn records(&self) -> &[FragmentMotion] { &self.records }

    pub fn get(&self, id: &PhotoId) -> Option<&FragmentMotion> {
        self.records.iter().find(|r| &r.id == id)
    }

    /// Match records to `album`.  An album switch rebuilds everything; within
    /// an album, deleted photos lose their record and new photos start at
    /// their initial position.
    pub fn sync<R: Rng + ?Sized>(&mut self, index: usize, album: &Album, rng: &mut R) {
        if self.album != Some(index) {
            debug!(album = %album.name, photos = album.photos.len(), "rebuilding fragment records");
            self.records.clear();
            self.album = Some(index);
        }

        self.records.retain(|r| album.contains(&r.id));
        for photo in &album.photos {
            if !self.records.iter().any(|r| r.id == photo.id) {
                self.records.push(FragmentMotion::new(photo.id.clone(), photo.position, rng));
            }
        }
    }

    /// Advance every record by `dt` seconds.  Returns the hover and pick
    /// signals raised this frame, in order.
    pub fn update(&mut self, ctx: &FrameContext<'_>, tuning: FragmentTuning, dt: f32) -> Vec<Command> {
        let mut out = Vec::new();
        let mut hovered = ctx.hovered.cloned();
        let mut picked = false;

        for rec in &mut self.records {
            if ctx.mode == Mode::BigBang {
                let near = ctx
                    .camera
                    .project(ctx.group * rec.current)
                    .map(|ndc| ndc.truncate().distance(ctx.gesture.hand_position) < tuning.pick_radius)
                    .unwrap_or(false);

                if near {
                    if hovered.as_ref() != Some(&rec.id) {
                        hovered = Some(rec.id.clone());
                        out.push(Command::Hover(hovered.clone()));
                    }
                    if ctx.gesture.is_pinching && !picked {
                        picked = true;
                        out.push(Command::Pick(rec.id.clone()));
                    }
                } else if hovered.as_ref() == Some(&rec.id) {
                    hovered = None;
                    out.push(Command::Hover(None));
                }
            }

            let selected = ctx.selected == Some(&rec.id);
            let is_hovered = ctx.hovered == Some(&rec.id);

            rec.shade(ctx.mode, selected, is_hovered, dt);
            rec.aim(ctx, selected, tuning.focus_distance, dt);

            let rate = if selected { 6.0 } else { 2.0 };
            rec.current.approach(rec.target, dt, rate);
            rec.face(ctx);
        }
        out
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
