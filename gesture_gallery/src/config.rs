//! Application configuration, optionally loaded from a RON file.
//!
//! Every field has a default, so a config file only needs the values it
//! changes:
//!
//! ```ron
//! (
//!     seed: Some(7),
//!     intent: (cooldown_ms: 1200),
//!     albums: [
//!         (name: "DEEP FIELD", theme: "#3355ff", placeholders: 8),
//!     ],
//! )
//! ```

use std::fs;
use std::path::Path;

use anyhow::Context;
use gallery_state::{default_albums, Album, IntentConfig, Rgb};
use galaxy_motion::MotionConfig;
use hand_pose::ClassifierConfig;
use rand::Rng;
use serde::Deserialize;

/// Smallest window the HUD layout fits in.
const MIN_WIDTH:  usize = 320;
const MIN_HEIGHT: usize = 180;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width:  usize,
    pub height: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig { width: 960, height: 540 }
    }
}

impl WindowConfig {
    /// Grow either dimension up to the minimum layout size.
    pub fn clamped(&self) -> Self {
        WindowConfig {
            width:  self.width.max(MIN_WIDTH),
            height: self.height.max(MIN_HEIGHT),
        }
    }
}

/// One album to create at startup instead of the built-in three.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct AlbumSpec {
    pub name:  String,
    pub theme: Rgb,
    /// Placeholder photos to generate.
    #[serde(default)]
    pub placeholders: usize,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub classifier: ClassifierConfig,
    pub intent:     IntentConfig,
    pub motion:     MotionConfig,
    pub window:     WindowConfig,
    /// Fixed RNG seed for reproducible layouts.
    pub seed:       Option<u64>,
    /// How long a mode banner stays up.
    pub status_ms:  u64,
    /// Empty means the built-in albums.
    pub albums:     Vec<AlbumSpec>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            classifier: ClassifierConfig::default(),
            intent:     IntentConfig::default(),
            motion:     MotionConfig::default(),
            window:     WindowConfig::default(),
            seed:       None,
            status_ms:  2500,
            albums:     Vec::new(),
        }
    }
}

impl AppConfig {
    pub fn from_ron(text: &str) -> Result<Self, ron::error::SpannedError> {
        let mut cfg: Self = ron::from_str(text)?;
        cfg.window = cfg.window.clamped();
        Ok(cfg)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_ron(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Albums to start with.
    pub fn build_albums<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Album> {
        if self.albums.is_empty() {
            return default_albums(rng);
        }
        self.albums
            .iter()
            .enumerate()
            .map(|(i, spec)| {
                Album::new(&format!("galaxy-{}", i + 1), &spec.name, spec.theme)
                    .with_placeholders(spec.placeholders, rng)
            })
            .collect()
    }
}
