//! # hand_pose
//!
//! Turns raw hand keypoints from an external landmark detector into a
//! per-frame [`GestureSnapshot`].
//!
//! ## Pipeline
//!
//! | Stage | Type | Notes |
//! |---|---|---|
//! | Detector output | [`HandFrame`] | 0..n hands × 21 [`Landmark`]s, normalized image coords |
//! | Normalizer | [`HandFeatures`] | hand size, relative pinch distance, finger extension, centre |
//! | Classifier | [`GestureClassifier`] | pinch / fist / open palm / victory, EMA-smoothed position |
//!
//! Only the first hand in a frame is used.  A frame with no hand produces no
//! snapshot and leaves the previous one in place.
//!
//! ## Quick start
//!
//! ```rust
//! use hand_pose::{GestureClassifier, HandFrame, synth::{pose, Pose}};
//! use glam::Vec2;
//!
//! let mut classifier = GestureClassifier::default();
//! let frame = HandFrame::single(pose(Pose::Victory, Vec2::new(0.5, 0.5)));
//! let snap = classifier.observe(&frame).unwrap();
//! assert!(snap.is_victory);
//! ```

pub mod landmark;
pub mod features;
pub mod classifier;
pub mod synth;

pub use classifier::{ClassifierConfig, Gesture, GestureClassifier, GestureSnapshot};
pub use features::{Fingers, HandFeatures};
pub use landmark::{HandFrame, HandLandmarks, Joint, Landmark, JOINT_COUNT};

/// Errors raised while validating detector output.
#[derive(Debug, thiserror::Error)]
pub enum PoseError {
    #[error("hand has {got} landmarks, need 21")]
    TooFewLandmarks { got: usize },

    #[error("non-finite coordinate at {joint}")]
    NonFinite { joint: &'static str },

    #[error("malformed landmark frame: {0}")]
    Json(#[from] serde_json::Error),
}
