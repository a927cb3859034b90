//! # gesture_gallery
//!
//! A 3-D photo galaxy steered by hand gestures.  Landmark frames from a
//! hand source are classified, debounced into mode transitions, and drive
//! a particle field and a set of floating photo fragments rendered into a
//! software framebuffer.
//!
//! ## Gesture → Mode mapping
//!
//! | Gesture | Mode | Effect |
//! |---|---|---|
//! | Victory (index + middle) | WARP | Stream particles past the camera, then jump to the next album |
//! | Fist | VORTEX | Collapse everything into a rotating spiral |
//! | Open palm | BIG_BANG | Scatter photos into a shell; hand position tilts the galaxy |
//! | Pinch on a photo (BIG_BANG) | SINGULARITY | Bring the photo in front of the camera |
//!
//! Transitions are debounced: after one is accepted, further gesture
//! transitions are ignored for `intent.cooldown_ms`.
//!
//! ## Feature flags
//!
//! * (default) — **Simulation mode**: keyboard and mouse synthesize a hand.
//! * `leap` — **Hardware mode**: polls a LeapMotion controller via LeapC.
//!
//! A recorded or live landmark stream (JSON lines) can be fed with
//! `--landmarks <file|->` in either build.
//!
//! ### Simulation controls
//!
//! | Input | Meaning |
//! |---|---|
//! | Mouse | Hand position (leaving the window hides the hand) |
//! | hold `F` / `P` / `C` / `V` | Fist / open palm / pinch / victory |
//! | Left click | Select the photo under the pointer |
//! | `U` | Upload a photo into the current album |
//! | `Delete` / `X` | Delete the focused photo |
//! | `Escape` | Close the focused photo |
//! | `Q` | Quit |

pub mod config;
pub mod source;
pub mod visualizer;
pub mod app;
