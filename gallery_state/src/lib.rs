//! # gallery_state
//!
//! The gallery store and the gesture-driven mode state machine.
//!
//! ```text
//!   GestureSnapshot ──► IntentDebouncer ──┐
//!                                         ▼
//!   UI / render picks ──► Command ──► GalleryState ──► StatusTrigger
//!                                         │
//!                          now_ms ──► advance_timers (WARP)
//! ```
//!
//! [`GalleryState`] is an ordinary owned value.  The app holds one and
//! passes `&mut` to whoever needs to write; the animation engine only ever
//! reads it and hands back [`Command`]s.
//!
//! ## Mode transitions
//!
//! | Gesture | From | To |
//! |---|---|---|
//! | victory | any but WARP | WARP, album +1 after 1s, VORTEX after 2.5s |
//! | fist | BIG_BANG, SINGULARITY | VORTEX |
//! | open palm (not pinching) | VORTEX, SINGULARITY | BIG_BANG |
//! | pinch near a photo | BIG_BANG | SINGULARITY |

pub mod album;
pub mod intent;
pub mod mode;
pub mod store;

pub use album::{default_albums, Album, Photo, PhotoId, Rgb};
pub use intent::{Intent, IntentConfig, IntentDebouncer};
pub use mode::Mode;
pub use store::{Command, GalleryState, StatusTrigger, TimerAction, WarpTiming};

#[derive(Debug, thiserror::Error)]
pub enum GalleryError {
    #[error("no photo with id {0} in the current album")]
    UnknownPhoto(PhotoId),

    #[error("gallery needs at least one album")]
    NoAlbums,

    #[error("invalid colour {0:?}, expected #rrggbb")]
    BadColor(String),

    #[error("selection is locked in {0}")]
    SelectionLocked(Mode),
}
