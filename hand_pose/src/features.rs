//! Scale-invariant geometric features derived from one hand's landmarks.
//!
//! Every distance is measured relative to the hand's own size (wrist to
//! middle knuckle) so classification does not depend on how far the hand
//! is from the camera.

use glam::Vec2;

use crate::landmark::{HandLandmarks, Joint};

/// Reference sizes at or below this are treated as degenerate.
const MIN_HAND_SIZE: f32 = f32::EPSILON;

// ════════════════════════════════════════════════════════════════════════════
// Fingers
// ════════════════════════════════════════════════════════════════════════════

/// Extension state of the four tracked fingers.  The thumb is not tracked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Fingers {
    pub index:  bool,
    pub middle: bool,
    pub ring:   bool,
    pub pinky:  bool,
}

impl Fingers {
    pub fn all_extended(&self) -> bool {
        self.index && self.middle && self.ring && self.pinky
    }

    pub fn none_extended(&self) -> bool {
        !self.index && !self.middle && !self.ring && !self.pinky
    }

    pub fn count(&self) -> usize {
        [self.index, self.middle, self.ring, self.pinky]
            .iter()
            .filter(|&&e| e)
            .count()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HandFeatures
// ════════════════════════════════════════════════════════════════════════════

/// Per-frame features.  Recomputed from scratch each frame; never stored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandFeatures {
    /// Wrist → middle-MCP planar distance, or 1.0 when degenerate.
    pub hand_size: f32,
    /// Thumb-tip ↔ index-tip 3D distance divided by `hand_size`.
    pub pinch_distance: f32,
    pub fingers: Fingers,
    /// Middle-MCP mapped to `[-1, 1]` on both axes, mirrored horizontally
    /// and flipped vertically so it matches screen space.
    pub raw_center: Vec2,
}

impl HandFeatures {
    /// `extension_ratio` is how much farther from the wrist a fingertip must
    /// be than its knuckle for the finger to count as extended.
    pub fn from_landmarks(hand: &HandLandmarks, extension_ratio: f32) -> Self {
        let wrist      = hand.get(Joint::Wrist);
        let middle_mcp = hand.get(Joint::MiddleMcp);

        let mut hand_size = wrist.planar_distance(middle_mcp);
        if hand_size <= MIN_HAND_SIZE {
            hand_size = 1.0;
        }

        let pinch_raw = hand.get(Joint::ThumbTip).distance(hand.get(Joint::IndexTip));

        let extended = |tip: Joint, mcp: Joint| {
            let tip_dist = hand.get(tip).planar_distance(wrist);
            let mcp_dist = hand.get(mcp).planar_distance(wrist);
            tip_dist > mcp_dist * extension_ratio
        };

        let fingers = Fingers {
            index:  extended(Joint::IndexTip,  Joint::IndexMcp),
            middle: extended(Joint::MiddleTip, Joint::MiddleMcp),
            ring:   extended(Joint::RingTip,   Joint::RingMcp),
            pinky:  extended(Joint::PinkyTip,  Joint::PinkyMcp),
        };

        let raw_center = Vec2::new(
            -(middle_mcp.x - 0.5) * 2.0,
            -(middle_mcp.y - 0.5) * 2.0,
        );

        HandFeatures {
            hand_size,
            pinch_distance: pinch_raw / hand_size,
            fingers,
            raw_center,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark::{Landmark, JOINT_COUNT};

    /// Every point stacked on the wrist, then individual joints overridden.
    fn hand_with(overrides: &[(Joint, Landmark)]) -> HandLandmarks {
        let pts = vec![Landmark::new(0.5, 0.8, 0.0); JOINT_COUNT];
        let mut hand = HandLandmarks::from_points(&pts).unwrap();
        for &(j, lm) in overrides {
            hand.set(j, lm);
        }
        hand
    }

    #[test]
    fn degenerate_hand_size_falls_back_to_one() {
        let hand = hand_with(&[
            (Joint::ThumbTip, Landmark::new(0.5, 0.8, 0.0)),
            (Joint::IndexTip, Landmark::new(0.8, 0.8, 0.4)),
        ]);
        let f = HandFeatures::from_landmarks(&hand, 1.2);
        assert_eq!(f.hand_size, 1.0);
        assert!((f.pinch_distance - 0.5).abs() < 1e-5);
        assert!(f.pinch_distance.is_finite());
    }

    #[test]
    fn pinch_normalized_by_hand_size() {
        // hand size 0.1, thumb/index tips 0.034 apart
        let hand = hand_with(&[
            (Joint::MiddleMcp, Landmark::new(0.5, 0.7, 0.0)),
            (Joint::ThumbTip,  Landmark::new(0.40, 0.60, 0.0)),
            (Joint::IndexTip,  Landmark::new(0.434, 0.60, 0.0)),
        ]);
        let f = HandFeatures::from_landmarks(&hand, 1.2);
        assert!((f.hand_size - 0.1).abs() < 1e-5);
        assert!((f.pinch_distance - 0.34).abs() < 1e-3);
    }

    #[test]
    fn curled_fingers_are_not_extended() {
        // tips closer to the wrist than 1.2× their knuckles
        let hand = hand_with(&[
            (Joint::IndexMcp,  Landmark::new(0.45, 0.70, 0.0)),
            (Joint::MiddleMcp, Landmark::new(0.50, 0.70, 0.0)),
            (Joint::RingMcp,   Landmark::new(0.55, 0.70, 0.0)),
            (Joint::PinkyMcp,  Landmark::new(0.60, 0.72, 0.0)),
            (Joint::IndexTip,  Landmark::new(0.46, 0.72, 0.0)),
            (Joint::MiddleTip, Landmark::new(0.50, 0.71, 0.0)),
            (Joint::RingTip,   Landmark::new(0.54, 0.72, 0.0)),
            (Joint::PinkyTip,  Landmark::new(0.58, 0.74, 0.0)),
        ]);
        let f = HandFeatures::from_landmarks(&hand, 1.2);
        assert!(f.fingers.none_extended());
        assert_eq!(f.fingers.count(), 0);
    }

    #[test]
    fn extension_threshold_is_relative() {
        // knuckle 0.1 from wrist; tip at 0.119 is not extended, 0.121 is
        let base = [
            (Joint::IndexMcp, Landmark::new(0.5, 0.7, 0.0)),
            (Joint::IndexTip, Landmark::new(0.5, 0.681, 0.0)),
        ];
        let f = HandFeatures::from_landmarks(&hand_with(&base), 1.2);
        assert!(!f.fingers.index);

        let base = [
            (Joint::IndexMcp, Landmark::new(0.5, 0.7, 0.0)),
            (Joint::IndexTip, Landmark::new(0.5, 0.679, 0.0)),
        ];
        let f = HandFeatures::from_landmarks(&hand_with(&base), 1.2);
        assert!(f.fingers.index);
    }

    #[test]
    fn center_is_mirrored_and_flipped() {
        let hand = hand_with(&[(Joint::MiddleMcp, Landmark::new(0.75, 0.25, 0.0))]);
        let f = HandFeatures::from_landmarks(&hand, 1.2);
        assert!((f.raw_center.x + 0.5).abs() < 1e-5);
        assert!((f.raw_center.y - 0.5).abs() < 1e-5);
    }
}
