//! Raw detector output: 21 named keypoints per hand, in normalized image
//! coordinates.
//!
//! `x` and `y` are in `[0, 1]` relative to the video frame (y grows
//! downward), `z` is depth relative to the wrist as reported by the
//! detector.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::PoseError;

// ════════════════════════════════════════════════════════════════════════════
// Joint — the 21 keypoints of the MediaPipe hand model
// ════════════════════════════════════════════════════════════════════════════

/// A named hand keypoint.  Discriminants match the detector's output order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Joint {
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexMcp,
    IndexPip,
    IndexDip,
    IndexTip,
    MiddleMcp,
    MiddlePip,
    MiddleDip,
    MiddleTip,
    RingMcp,
    RingPip,
    RingDip,
    RingTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

/// Number of keypoints per detected hand.
pub const JOINT_COUNT: usize = 21;

impl Joint {
    pub const ALL: [Joint; JOINT_COUNT] = [
        Joint::Wrist,
        Joint::ThumbCmc, Joint::ThumbMcp, Joint::ThumbIp, Joint::ThumbTip,
        Joint::IndexMcp, Joint::IndexPip, Joint::IndexDip, Joint::IndexTip,
        Joint::MiddleMcp, Joint::MiddlePip, Joint::MiddleDip, Joint::MiddleTip,
        Joint::RingMcp, Joint::RingPip, Joint::RingDip, Joint::RingTip,
        Joint::PinkyMcp, Joint::PinkyPip, Joint::PinkyDip, Joint::PinkyTip,
    ];

    pub fn index(self) -> usize { self as usize }

    pub fn as_str(self) -> &'static str {
        match self {
            Joint::Wrist     => "wrist",
            Joint::ThumbCmc  => "thumb-cmc",
            Joint::ThumbMcp  => "thumb-mcp",
            Joint::ThumbIp   => "thumb-ip",
            Joint::ThumbTip  => "thumb-tip",
            Joint::IndexMcp  => "index-mcp",
            Joint::IndexPip  => "index-pip",
            Joint::IndexDip  => "index-dip",
            Joint::IndexTip  => "index-tip",
            Joint::MiddleMcp => "middle-mcp",
            Joint::MiddlePip => "middle-pip",
            Joint::MiddleDip => "middle-dip",
            Joint::MiddleTip => "middle-tip",
            Joint::RingMcp   => "ring-mcp",
            Joint::RingPip   => "ring-pip",
            Joint::RingDip   => "ring-dip",
            Joint::RingTip   => "ring-tip",
            Joint::PinkyMcp  => "pinky-mcp",
            Joint::PinkyPip  => "pinky-pip",
            Joint::PinkyDip  => "pinky-dip",
            Joint::PinkyTip  => "pinky-tip",
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Landmark
// ════════════════════════════════════════════════════════════════════════════

/// One keypoint.  `z` may be absent in detector output and defaults to 0.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Landmark { x, y, z }
    }

    /// Distance in the image plane, ignoring depth.
    pub fn planar_distance(&self, other: &Landmark) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Full 3D distance including depth.
    pub fn distance(&self, other: &Landmark) -> f32 {
        let dz = self.z - other.z;
        let p = self.planar_distance(other);
        (p * p + dz * dz).sqrt()
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HandLandmarks — one validated hand
// ════════════════════════════════════════════════════════════════════════════

/// The full keypoint set of a single detected hand.
#[derive(Clone, Debug, PartialEq)]
pub struct HandLandmarks {
    points: [Landmark; JOINT_COUNT],
}

impl HandLandmarks {
    /// Validate detector output.  Extra points beyond the 21st are ignored.
    pub fn from_points(points: &[Landmark]) -> Result<Self, PoseError> {
        if points.len() < JOINT_COUNT {
            return Err(PoseError::TooFewLandmarks { got: points.len() });
        }
        let mut out = [Landmark::default(); JOINT_COUNT];
        for (i, p) in points.iter().take(JOINT_COUNT).enumerate() {
            if !p.is_finite() {
                return Err(PoseError::NonFinite { joint: Joint::ALL[i].as_str() });
            }
            out[i] = *p;
        }
        Ok(HandLandmarks { points: out })
    }

    /// Construct from points already known to be finite.
    pub(crate) fn from_array(points: [Landmark; JOINT_COUNT]) -> Self {
        HandLandmarks { points }
    }

    pub fn get(&self, joint: Joint) -> &Landmark {
        &self.points[joint.index()]
    }

    pub fn set(&mut self, joint: Joint, lm: Landmark) {
        self.points[joint.index()] = lm;
    }

    pub fn points(&self) -> &[Landmark; JOINT_COUNT] {
        &self.points
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HandFrame — everything the detector saw in one video frame
// ════════════════════════════════════════════════════════════════════════════

/// Per-frame detector output.  May be empty (no hand in view).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HandFrame {
    pub hands: Vec<HandLandmarks>,
}

impl HandFrame {
    pub fn empty() -> Self { HandFrame::default() }

    pub fn single(hand: HandLandmarks) -> Self {
        HandFrame { hands: vec![hand] }
    }

    pub fn is_empty(&self) -> bool { self.hands.is_empty() }

    /// Only the first detected hand drives the gallery.
    pub fn primary(&self) -> Option<&HandLandmarks> { self.hands.first() }

    /// Parse one JSON line of the form `[[{"x":..,"y":..,"z":..}, ...21], ...]`.
    ///
    /// A malformed first hand rejects the frame.  Malformed extra hands are
    /// dropped with a warning, since only [`primary`](Self::primary) is used.
    pub fn from_json_line(line: &str) -> Result<Self, PoseError> {
        let raw: Vec<Vec<Landmark>> = serde_json::from_str(line)?;
        let mut raw = raw.iter();
        let Some(first) = raw.next() else {
            return Ok(HandFrame::empty());
        };

        let mut hands = vec![HandLandmarks::from_points(first)?];
        for (i, pts) in raw.enumerate() {
            match HandLandmarks::from_points(pts) {
                Ok(hand) => hands.push(hand),
                Err(e)   => warn!(hand = i + 1, error = %e, "dropping extra hand"),
            }
        }
        Ok(HandFrame { hands })
    }

    /// Serialize back into the JSON-lines wire form.
    pub fn to_json_line(&self) -> Result<String, PoseError> {
        let raw: Vec<&[Landmark]> = self.hands.iter().map(|h| &h.points[..]).collect();
        Ok(serde_json::to_string(&raw)?)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_points(n: usize) -> Vec<Landmark> {
        (0..n).map(|i| Landmark::new(i as f32 * 0.01, 0.5, 0.0)).collect()
    }

    #[test]
    fn joint_order_matches_detector() {
        assert_eq!(Joint::Wrist.index(), 0);
        assert_eq!(Joint::ThumbTip.index(), 4);
        assert_eq!(Joint::IndexTip.index(), 8);
        assert_eq!(Joint::MiddleMcp.index(), 9);
        assert_eq!(Joint::PinkyTip.index(), 20);
        for (i, j) in Joint::ALL.iter().enumerate() {
            assert_eq!(j.index(), i);
        }
    }

    #[test]
    fn rejects_short_hand() {
        let err = HandLandmarks::from_points(&flat_points(20)).unwrap_err();
        assert!(matches!(err, PoseError::TooFewLandmarks { got: 20 }));
    }

    #[test]
    fn rejects_nan_coordinate() {
        let mut pts = flat_points(21);
        pts[8].y = f32::NAN;
        let err = HandLandmarks::from_points(&pts).unwrap_err();
        assert!(matches!(err, PoseError::NonFinite { joint: "index-tip" }));
    }

    #[test]
    fn distances() {
        let a = Landmark::new(0.0, 0.0, 0.0);
        let b = Landmark::new(3.0, 4.0, 12.0);
        assert!((a.planar_distance(&b) - 5.0).abs() < 1e-5);
        assert!((a.distance(&b) - 13.0).abs() < 1e-5);
    }

    #[test]
    fn json_line_parses_missing_z() {
        let hand: Vec<String> = (0..21)
            .map(|i| format!("{{\"x\":{},\"y\":0.5}}", i as f32 * 0.01))
            .collect();
        let line = format!("[[{}]]", hand.join(","));
        let frame = HandFrame::from_json_line(&line).unwrap();
        assert_eq!(frame.hands.len(), 1);
        assert_eq!(frame.primary().unwrap().get(Joint::Wrist).z, 0.0);
    }

    #[test]
    fn json_line_empty_frame() {
        let frame = HandFrame::from_json_line("[]").unwrap();
        assert!(frame.is_empty());
        assert!(frame.primary().is_none());
    }

    fn hand_json(pts: &[Landmark]) -> String {
        serde_json::to_string(pts).unwrap()
    }

    #[test]
    fn json_line_drops_bad_extra_hand() {
        let good = hand_json(&flat_points(21));
        let short = hand_json(&flat_points(5));
        let frame = HandFrame::from_json_line(&format!("[{},{}]", good, short)).unwrap();
        assert_eq!(frame.hands.len(), 1);
        assert_eq!(frame.primary().unwrap().points()[..], flat_points(21)[..]);
    }

    #[test]
    fn json_line_rejects_bad_primary_hand() {
        let good = hand_json(&flat_points(21));
        let short = hand_json(&flat_points(5));
        let line = format!("[{},{}]", short, good);
        assert!(matches!(
            HandFrame::from_json_line(&line),
            Err(PoseError::TooFewLandmarks { .. })
        ));
    }

    #[test]
    fn json_line_rejects_garbage() {
        assert!(matches!(HandFrame::from_json_line("{oops"), Err(PoseError::Json(_))));
    }
}
