//! Synthetic hand poses.
//!
//! Builds plausible 21-point hands for the simulation input source and for
//! tests, so the whole normalize → classify path runs even without a camera.
//! The hand is upright (fingers pointing toward the top of the frame) with a
//! wrist-to-knuckle size of [`HAND_SIZE`].

use glam::Vec2;

use crate::landmark::{HandLandmarks, Joint, Landmark, JOINT_COUNT};

/// Wrist → middle-MCP distance of a synthetic hand, in image units.
pub const HAND_SIZE: f32 = 0.1;

/// Hand shapes the simulator can produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pose {
    /// Index finger out, others curled.  Classifies as no gesture.
    Relaxed,
    Fist,
    OpenPalm,
    /// All fingers out, thumb tip touching the index tip.
    Pinch,
    Victory,
}

impl Pose {
    pub fn as_str(self) -> &'static str {
        match self {
            Pose::Relaxed  => "relaxed",
            Pose::Fist     => "fist",
            Pose::OpenPalm => "open-palm",
            Pose::Pinch    => "pinch",
            Pose::Victory  => "victory",
        }
    }

    /// Extension of index, middle, ring, pinky.
    fn extended(self) -> [bool; 4] {
        match self {
            Pose::Relaxed  => [true,  false, false, false],
            Pose::Fist     => [false, false, false, false],
            Pose::OpenPalm => [true,  true,  true,  true ],
            Pose::Pinch    => [true,  true,  true,  true ],
            Pose::Victory  => [true,  true,  false, false],
        }
    }
}

/// (mcp offset, extended tip offset) per finger, relative to the middle MCP.
const FINGERS: [(Joint, Joint, Joint, Joint, [f32; 2], [f32; 2]); 4] = [
    (Joint::IndexMcp,  Joint::IndexPip,  Joint::IndexDip,  Joint::IndexTip,  [-0.030, 0.000], [-0.040, -0.080]),
    (Joint::MiddleMcp, Joint::MiddlePip, Joint::MiddleDip, Joint::MiddleTip, [ 0.000, 0.000], [ 0.000, -0.085]),
    (Joint::RingMcp,   Joint::RingPip,   Joint::RingDip,   Joint::RingTip,   [ 0.030, 0.000], [ 0.040, -0.080]),
    (Joint::PinkyMcp,  Joint::PinkyPip,  Joint::PinkyDip,  Joint::PinkyTip,  [ 0.055, 0.010], [ 0.070, -0.060]),
];

/// Curled fingertips fold back toward the wrist by this much.
const CURL: f32 = 0.03;

/// Build a hand whose middle knuckle sits at `center` (normalized image
/// coordinates, y down).
pub fn pose(kind: Pose, center: Vec2) -> HandLandmarks {
    let at = |dx: f32, dy: f32| Landmark::new(center.x + dx, center.y + dy, 0.0);
    let mut pts = [Landmark::default(); JOINT_COUNT];
    let mut put = |j: Joint, lm: Landmark| pts[j.index()] = lm;

    put(Joint::Wrist, at(0.0, HAND_SIZE));

    let ext = kind.extended();
    let mut index_tip = at(0.0, 0.0);
    for (i, &(mcp, pip, dip, tip, base, reach)) in FINGERS.iter().enumerate() {
        let m = at(base[0], base[1]);
        let t = if ext[i] {
            at(reach[0], reach[1])
        } else {
            at(base[0], base[1] + CURL)
        };
        put(mcp, m);
        put(pip, lerp(m, t, 0.4));
        put(dip, lerp(m, t, 0.75));
        put(tip, t);
        if i == 0 {
            index_tip = t;
        }
    }

    let thumb_tip = match kind {
        Pose::Pinch => Landmark::new(index_tip.x + 0.01, index_tip.y, index_tip.z),
        _           => at(-0.090, 0.040),
    };
    let thumb_base = at(-0.040, 0.080);
    put(Joint::ThumbCmc, thumb_base);
    put(Joint::ThumbMcp, lerp(thumb_base, thumb_tip, 0.35));
    put(Joint::ThumbIp,  lerp(thumb_base, thumb_tip, 0.7));
    put(Joint::ThumbTip, thumb_tip);

    HandLandmarks::from_array(pts)
}

fn lerp(a: Landmark, b: Landmark, t: f32) -> Landmark {
    Landmark::new(
        a.x + (b.x - a.x) * t,
        a.y + (b.y - a.y) * t,
        a.z + (b.z - a.z) * t,
    )
}
