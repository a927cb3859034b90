//! Per-frame gesture classification with position smoothing.
//!
//! [`GestureClassifier::observe`] turns one detector frame into a
//! [`GestureSnapshot`].  The discrete flags are recomputed from scratch every
//! frame; only the hand position carries state between frames (an
//! exponential moving average).

use glam::Vec2;
use serde::Deserialize;
use tracing::{trace, warn};

use crate::features::HandFeatures;
use crate::landmark::HandFrame;

// ════════════════════════════════════════════════════════════════════════════
// ClassifierConfig
// ════════════════════════════════════════════════════════════════════════════

/// Tunable thresholds.  The defaults are empirical, not derived.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Normalized thumb/index distance below which the hand is pinching.
    pub pinch_threshold: f32,
    /// Tip-to-wrist over knuckle-to-wrist ratio for an extended finger.
    pub extension_ratio: f32,
    /// EMA blend factor applied to the hand position each frame, in (0, 1].
    pub smoothing: f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        ClassifierConfig {
            pinch_threshold: 0.35,
            extension_ratio: 1.2,
            smoothing:       0.2,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Gesture / GestureSnapshot
// ════════════════════════════════════════════════════════════════════════════

/// The four recognised gestures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Gesture {
    Pinch,
    Fist,
    OpenPalm,
    Victory,
}

impl Gesture {
    pub fn as_str(self) -> &'static str {
        match self {
            Gesture::Pinch    => "pinch",
            Gesture::Fist     => "fist",
            Gesture::OpenPalm => "open-palm",
            Gesture::Victory  => "victory",
        }
    }
}

/// Classified hand state for one frame.
///
/// `is_fist` and `is_open_palm` can never both be set, and `is_pinching`
/// excludes `is_open_palm`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GestureSnapshot {
    pub is_fist:        bool,
    pub is_open_palm:   bool,
    pub is_pinching:    bool,
    pub is_victory:     bool,
    /// Smoothed hand position in `[-1, 1]²`.
    pub hand_position:  Vec2,
    /// Normalized thumb/index distance.
    pub pinch_distance: f32,
}

impl GestureSnapshot {
    /// Classify one frame's features.  `hand_position` is supplied by the
    /// caller because smoothing is stateful.
    pub fn from_features(f: &HandFeatures, hand_position: Vec2, cfg: &ClassifierConfig) -> Self {
        let is_pinching = f.pinch_distance < cfg.pinch_threshold;
        let fingers = f.fingers;

        GestureSnapshot {
            is_fist:      fingers.none_extended(),
            is_open_palm: fingers.all_extended() && !is_pinching,
            is_pinching,
            is_victory:   fingers.index && fingers.middle && !fingers.ring && !fingers.pinky,
            hand_position,
            pinch_distance: f.pinch_distance,
        }
    }

    /// The most salient gesture, pinch first.  Used for cursor feedback.
    pub fn dominant(&self) -> Option<Gesture> {
        if self.is_pinching {
            Some(Gesture::Pinch)
        } else if self.is_fist {
            Some(Gesture::Fist)
        } else if self.is_open_palm {
            Some(Gesture::OpenPalm)
        } else if self.is_victory {
            Some(Gesture::Victory)
        } else {
            None
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// GestureClassifier
// ════════════════════════════════════════════════════════════════════════════

/// Stateful classifier: owns the smoothed position and the last snapshot.
#[derive(Debug, Clone)]
pub struct GestureClassifier {
    config:   ClassifierConfig,
    smoothed: Vec2,
    last:     GestureSnapshot,
}

impl Default for GestureClassifier {
    fn default() -> Self { GestureClassifier::new(ClassifierConfig::default()) }
}

impl GestureClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        let mut config = config;
        if !(config.smoothing > 0.0 && config.smoothing <= 1.0) {
            warn!(smoothing = config.smoothing, "smoothing factor out of range, using 0.2");
            config.smoothing = 0.2;
        }
        GestureClassifier {
            config,
            smoothed: Vec2::ZERO,
            last:     GestureSnapshot::default(),
        }
    }

    pub fn config(&self) -> &ClassifierConfig { &self.config }

    /// Most recent snapshot.  Survives frames with no hand.
    pub fn snapshot(&self) -> &GestureSnapshot { &self.last }

    /// Process one detector frame.  Returns `None` when no hand is present;
    /// the previous snapshot and smoothed position are kept untouched.
    pub fn observe(&mut self, frame: &HandFrame) -> Option<GestureSnapshot> {
        let hand = frame.primary()?;
        let features = HandFeatures::from_landmarks(hand, self.config.extension_ratio);
        Some(self.observe_features(&features))
    }

    /// Feed pre-computed features; advances the smoothing filter.
    pub fn observe_features(&mut self, features: &HandFeatures) -> GestureSnapshot {
        self.smoothed = self.smoothed.lerp(features.raw_center, self.config.smoothing);
        let snap = GestureSnapshot::from_features(features, self.smoothed, &self.config);
        trace!(
            fist = snap.is_fist,
            palm = snap.is_open_palm,
            pinch = snap.is_pinching,
            victory = snap.is_victory,
            x = snap.hand_position.x,
            y = snap.hand_position.y,
            "gesture snapshot"
        );
        self.last = snap;
        snap
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
