//! The four interaction modes.

/// Exactly one mode is active at a time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Idle browse: photos orbit the core.
    #[default]
    Vortex,
    /// Expanded: photos spread out and can be picked with a pinch.
    BigBang,
    /// One photo focused in front of the camera.
    Singularity,
    /// Album transition.  Gesture input is locked.
    Warp,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Vortex      => "VORTEX",
            Mode::BigBang     => "BIG_BANG",
            Mode::Singularity => "SINGULARITY",
            Mode::Warp        => "WARP",
        }
    }

    /// Banner text shown when the mode is entered.
    pub fn status_message(self) -> &'static str {
        match self {
            Mode::Vortex      => "GRAVITY WELL FORMED",
            Mode::BigBang     => "EXPANSION DETECTED",
            Mode::Singularity => "QUANTUM FOCUS LOCKED",
            Mode::Warp        => "WARP DRIVE ENGAGED",
        }
    }

    /// Modes in which selection and hover may be set.
    pub fn allows_selection(self) -> bool {
        matches!(self, Mode::BigBang | Mode::Singularity)
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
