//! Gesture → mode transitions with a shared cooldown.
//!
//! Rules are checked in priority order and the first one that fires wins.
//! Every discrete transition shares one cooldown window so a gesture held
//! across many frames produces a single transition.  Continuous effects
//! (rig rotation) and proximity picks are not gated.

use glam::Vec2;
use hand_pose::GestureSnapshot;
use serde::Deserialize;
use tracing::{debug, trace};

use crate::mode::Mode;
use crate::store::{GalleryState, WarpTiming};

// ════════════════════════════════════════════════════════════════════════════
// IntentConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct IntentConfig {
    /// Minimum gap between two discrete transitions.
    pub cooldown_ms:  u64,
    /// Hand position → galaxy tilt multiplier in BIG_BANG.
    pub rig_gain:     f32,
    /// WARP: album swap delay.
    pub warp_swap_ms: u64,
    /// WARP: return to VORTEX delay.
    pub warp_end_ms:  u64,
}

impl Default for IntentConfig {
    fn default() -> Self {
        IntentConfig {
            cooldown_ms:  1500,
            rig_gain:     1.5,
            warp_swap_ms: 1000,
            warp_end_ms:  2500,
        }
    }
}

impl IntentConfig {
    pub fn warp_timing(&self) -> WarpTiming {
        WarpTiming { swap_after_ms: self.warp_swap_ms, end_after_ms: self.warp_end_ms }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Intent
// ════════════════════════════════════════════════════════════════════════════

/// A discrete transition that was accepted this frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intent {
    /// Victory: switch album through WARP.
    Warp,
    /// Fist: back to VORTEX.
    Reset,
    /// Open palm: into BIG_BANG.
    Expand,
}

impl Intent {
    pub fn as_str(self) -> &'static str {
        match self {
            Intent::Warp   => "warp",
            Intent::Reset  => "reset",
            Intent::Expand => "expand",
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// IntentDebouncer
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default)]
pub struct IntentDebouncer {
    config:          IntentConfig,
    last_transition: Option<u64>,
}

impl IntentDebouncer {
    pub fn new(config: IntentConfig) -> Self {
        IntentDebouncer { config, last_transition: None }
    }

    pub fn config(&self) -> &IntentConfig { &self.config }

    /// Timestamp of the last accepted transition, if any.
    pub fn last_transition_ms(&self) -> Option<u64> { self.last_transition }

    fn cooled_down(&self, now_ms: u64) -> bool {
        match self.last_transition {
            None => true,
            Some(last) => now_ms.saturating_sub(last) > self.config.cooldown_ms,
        }
    }

    /// Apply one frame's snapshot to the gallery.
    pub fn process(
        &mut self,
        snap:   &GestureSnapshot,
        state:  &mut GalleryState,
        now_ms: u64,
    ) -> Option<Intent> {
        state.set_gesture(*snap);

        let mode = state.mode();
        if mode == Mode::Warp {
            return None;
        }

        let mut accepted = None;
        if let Some(intent) = self.transition(snap, mode) {
            if self.cooled_down(now_ms) {
                self.last_transition = Some(now_ms);
                debug!(intent = intent.as_str(), now_ms, "gesture intent accepted");
                match intent {
                    Intent::Warp   => state.begin_warp(now_ms, self.config.warp_timing()),
                    Intent::Reset  => state.reset_to_vortex(),
                    Intent::Expand => state.expand(),
                }
                accepted = Some(intent);
            } else {
                trace!(intent = intent.as_str(), now_ms, "suppressed by cooldown");
            }
        }

        if mode == Mode::BigBang {
            let p = snap.hand_position;
            let gain = self.config.rig_gain;
            state.set_rig_rotation(Vec2::new(p.y * gain, p.x * gain));
        }

        accepted
    }

    /// First matching rule for `mode`, ignoring cooldown.
    fn transition(&self, snap: &GestureSnapshot, mode: Mode) -> Option<Intent> {
        if snap.is_victory {
            Some(Intent::Warp)
        } else if snap.is_fist && mode != Mode::Vortex {
            Some(Intent::Reset)
        } else if snap.is_open_palm
            && !snap.is_pinching
            && matches!(mode, Mode::Vortex | Mode::Singularity)
        {
            Some(Intent::Expand)
        } else {
            None
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::album::default_albums;
    use crate::store::TimerAction;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn state() -> GalleryState {
        let mut rng = StdRng::seed_from_u64(11);
        GalleryState::new(default_albums(&mut rng)).unwrap()
    }

    fn fist() -> GestureSnapshot {
        GestureSnapshot { is_fist: true, ..Default::default() }
    }

    fn palm() -> GestureSnapshot {
        GestureSnapshot { is_open_palm: true, ..Default::default() }
    }

    fn victory() -> GestureSnapshot {
        GestureSnapshot { is_victory: true, ..Default::default() }
    }

    #[test]
    fn victory_runs_full_warp_timeline() {
        let mut s = state();
        let mut d = IntentDebouncer::default();
        assert_eq!(d.process(&victory(), &mut s, 10_000), Some(Intent::Warp));
        assert_eq!(s.mode(), Mode::Warp);
        assert_eq!(s.current_index(), 0);

        s.advance_timers(11_000);
        assert_eq!(s.current_index(), 1);
        assert_eq!(s.mode(), Mode::Warp);

        s.advance_timers(12_500);
        assert_eq!(s.mode(), Mode::Vortex);
    }

    #[test]
    fn warp_ignores_all_gestures() {
        let mut s = state();
        let mut d = IntentDebouncer::default();
        d.process(&victory(), &mut s, 0);
        for (t, snap) in [(2_000, fist()), (2_100, palm()), (2_200, victory())] {
            assert_eq!(d.process(&snap, &mut s, t), None);
            assert_eq!(s.mode(), Mode::Warp);
        }
        assert_eq!(d.last_transition_ms(), Some(0));
    }

    #[test]
    fn cooldown_blocks_second_transition() {
        let mut s = state();
        let mut d = IntentDebouncer::default();
        assert_eq!(d.process(&palm(), &mut s, 1_000), Some(Intent::Expand));
        assert_eq!(s.mode(), Mode::BigBang);

        // fist 500ms later is swallowed
        assert_eq!(d.process(&fist(), &mut s, 1_500), None);
        assert_eq!(s.mode(), Mode::BigBang);

        // exactly at the boundary is still inside the window
        assert_eq!(d.process(&fist(), &mut s, 2_500), None);
        assert_eq!(d.process(&fist(), &mut s, 2_501), Some(Intent::Reset));
        assert_eq!(s.mode(), Mode::Vortex);
    }

    #[test]
    fn held_fist_transitions_once() {
        let mut s = state();
        s.set_mode(Mode::BigBang);
        let mut d = IntentDebouncer::default();
        let accepted = (0..120u64)
            .filter_map(|f| d.process(&fist(), &mut s, f * 16))
            .count();
        assert_eq!(accepted, 1);
        assert_eq!(s.mode(), Mode::Vortex);
    }

    #[test]
    fn fist_in_vortex_is_noop() {
        let mut s = state();
        let mut d = IntentDebouncer::default();
        assert_eq!(d.process(&fist(), &mut s, 0), None);
        assert_eq!(d.last_transition_ms(), None);
    }

    #[test]
    fn palm_while_pinching_does_not_expand() {
        let mut s = state();
        let mut d = IntentDebouncer::default();
        let snap = GestureSnapshot { is_open_palm: true, is_pinching: true, ..Default::default() };
        assert_eq!(d.process(&snap, &mut s, 0), None);
        assert_eq!(s.mode(), Mode::Vortex);
    }

    #[test]
    fn palm_in_big_bang_keeps_mode() {
        let mut s = state();
        s.set_mode(Mode::BigBang);
        let mut d = IntentDebouncer::default();
        assert_eq!(d.process(&palm(), &mut s, 0), None);
        assert_eq!(d.last_transition_ms(), None);
    }

    #[test]
    fn victory_outranks_fist() {
        let mut s = state();
        s.set_mode(Mode::Singularity);
        let mut d = IntentDebouncer::default();
        let snap = GestureSnapshot { is_victory: true, is_fist: true, ..Default::default() };
        assert_eq!(d.process(&snap, &mut s, 0), Some(Intent::Warp));
    }

    #[test]
    fn palm_from_singularity_clears_selection() {
        let mut s = state();
        let mut d = IntentDebouncer::default();
        d.process(&victory(), &mut s, 0);
        assert_eq!(s.advance_timers(2_500).len(), 2);
        s.set_mode(Mode::BigBang);
        let id = s.current_album().photos[0].id.clone();
        s.select_photo(id).unwrap();

        assert_eq!(d.process(&palm(), &mut s, 5_000), Some(Intent::Expand));
        assert_eq!(s.mode(), Mode::BigBang);
        assert!(s.selected().is_none());
    }

    #[test]
    fn rig_follows_hand_only_in_big_bang() {
        let mut s = state();
        let mut d = IntentDebouncer::default();
        let snap = GestureSnapshot { hand_position: Vec2::new(0.4, -0.2), ..Default::default() };

        d.process(&snap, &mut s, 0);
        assert_eq!(s.rig_rotation(), Vec2::ZERO);

        s.set_mode(Mode::BigBang);
        d.process(&snap, &mut s, 16);
        let r = s.rig_rotation();
        assert!((r.x - (-0.3)).abs() < 1e-6);
        assert!((r.y - 0.6).abs() < 1e-6);
    }

    #[test]
    fn rig_uses_mode_at_frame_start() {
        // palm in VORTEX expands but the tilt starts next frame
        let mut s = state();
        let mut d = IntentDebouncer::default();
        let snap = GestureSnapshot { is_open_palm: true, hand_position: Vec2::ONE, ..Default::default() };
        d.process(&snap, &mut s, 0);
        assert_eq!(s.mode(), Mode::BigBang);
        assert_eq!(s.rig_rotation(), Vec2::ZERO);
    }

    #[test]
    fn snapshot_is_stored() {
        let mut s = state();
        let mut d = IntentDebouncer::default();
        let snap = GestureSnapshot { is_pinching: true, pinch_distance: 0.1, ..Default::default() };
        d.process(&snap, &mut s, 0);
        assert_eq!(*s.gesture(), snap);
    }

    #[test]
    fn custom_timing_drives_timers() {
        let mut s = state();
        let mut d = IntentDebouncer::new(IntentConfig { warp_swap_ms: 10, warp_end_ms: 20, ..Default::default() });
        d.process(&victory(), &mut s, 100);
        assert_eq!(s.advance_timers(110), vec![TimerAction::SwapAlbum { to: 1 }]);
        assert_eq!(s.advance_timers(120), vec![TimerAction::EndWarp]);
    }
}
