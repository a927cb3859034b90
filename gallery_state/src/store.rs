//! `GalleryState` — the single owner of mode, albums and selection.
//!
//! Both loops talk to the gallery through this object: the detection side
//! through [`IntentDebouncer`](crate::IntentDebouncer), the render side and
//! the UI through [`Command`]s.  Nothing here blocks or reads a clock; every
//! time-dependent call takes `now_ms` explicitly.

use std::collections::VecDeque;

use glam::Vec2;
use hand_pose::GestureSnapshot;
use rand::Rng;
use tracing::{debug, info};

use crate::album::{Album, Photo, PhotoId};
use crate::mode::Mode;
use crate::GalleryError;

// ════════════════════════════════════════════════════════════════════════════
// WARP timers
// ════════════════════════════════════════════════════════════════════════════

/// Offsets of the two WARP phases, relative to the moment WARP is entered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WarpTiming {
    pub swap_after_ms: u64,
    pub end_after_ms:  u64,
}

impl Default for WarpTiming {
    fn default() -> Self {
        WarpTiming { swap_after_ms: 1000, end_after_ms: 2500 }
    }
}

/// Deferred action scheduled by a WARP transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerAction {
    /// Make album `to` current.
    SwapAlbum { to: usize },
    /// Leave WARP for VORTEX.
    EndWarp,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Timer {
    due_ms: u64,
    action: TimerAction,
}

// ════════════════════════════════════════════════════════════════════════════
// StatusTrigger / Command
// ════════════════════════════════════════════════════════════════════════════

/// Emitted once per mode change for the HUD.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusTrigger {
    pub mode:    Mode,
    pub message: &'static str,
}

/// UI- and render-side mutations.  Gesture transitions go through the
/// debouncer instead.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Append an image to the current album.
    AddPhoto { url: String },
    /// Remove a photo from the current album.
    DeletePhoto(PhotoId),
    /// Select a photo (focusing it) or clear the selection.
    SelectPhoto(Option<PhotoId>),
    /// Leave the focused view.
    ExitFocus,
    /// Hand cursor entered / left a photo's pick radius.
    Hover(Option<PhotoId>),
    /// Pinch inside a photo's pick radius.
    Pick(PhotoId),
}

// ════════════════════════════════════════════════════════════════════════════
// GalleryState
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
pub struct GalleryState {
    mode:         Mode,
    albums:       Vec<Album>,
    current:      usize,
    selected:     Option<PhotoId>,
    hovered:      Option<PhotoId>,
    gesture:      GestureSnapshot,
    rig_rotation: Vec2,
    timers:       Vec<Timer>,
    status:       VecDeque<StatusTrigger>,
}

impl GalleryState {
    /// Start in VORTEX on the first album.
    pub fn new(albums: Vec<Album>) -> Result<Self, GalleryError> {
        if albums.is_empty() {
            return Err(GalleryError::NoAlbums);
        }
        Ok(GalleryState {
            mode:         Mode::Vortex,
            albums,
            current:      0,
            selected:     None,
            hovered:      None,
            gesture:      GestureSnapshot::default(),
            rig_rotation: Vec2::ZERO,
            timers:       Vec::new(),
            status:       VecDeque::new(),
        })
    }

    // ── accessors ─────────────────────────────────────────────────────────

    pub fn mode(&self)            -> Mode                { self.mode }
    pub fn albums(&self)          -> &[Album]            { &self.albums }
    pub fn current_index(&self)   -> usize               { self.current }
    pub fn current_album(&self)   -> &Album              { &self.albums[self.current] }
    pub fn selected(&self)        -> Option<&PhotoId>    { self.selected.as_ref() }
    pub fn hovered(&self)         -> Option<&PhotoId>    { self.hovered.as_ref() }
    pub fn gesture(&self)         -> &GestureSnapshot    { &self.gesture }
    pub fn rig_rotation(&self)    -> Vec2                { self.rig_rotation }
    pub fn has_pending_timers(&self) -> bool             { !self.timers.is_empty() }

    pub fn selected_photo(&self) -> Option<&Photo> {
        self.selected.as_ref().and_then(|id| self.current_album().photo(id))
    }

    /// Status triggers accumulated since the last call.
    pub fn drain_status(&mut self) -> Vec<StatusTrigger> {
        self.status.drain(..).collect()
    }

    // ── mode ──────────────────────────────────────────────────────────────

    /// Switch mode.  Entering VORTEX always clears selection and hover.
    pub fn set_mode(&mut self, mode: Mode) {
        if mode == Mode::Vortex {
            self.selected = None;
            self.hovered = None;
        }
        if mode == self.mode {
            return;
        }
        info!(from = %self.mode, to = %mode, "mode change");
        self.mode = mode;
        self.status.push_back(StatusTrigger { mode, message: mode.status_message() });
    }

    /// Fist: back to the idle vortex.
    pub fn reset_to_vortex(&mut self) {
        self.set_mode(Mode::Vortex);
    }

    /// Open palm: expand, dropping any focused photo.
    pub fn expand(&mut self) {
        self.selected = None;
        self.set_mode(Mode::BigBang);
    }

    /// Leave the focused view.  Always clears hover, even when nothing
    /// else changes.
    pub fn exit_focus(&mut self) {
        self.selected = None;
        self.hovered = None;
        self.set_mode(Mode::BigBang);
    }

    // ── WARP ──────────────────────────────────────────────────────────────

    /// Enter WARP and schedule the album swap and the return to VORTEX.
    /// Timers from an earlier WARP are replaced, never stacked.
    pub fn begin_warp(&mut self, now_ms: u64, timing: WarpTiming) {
        let to = (self.current + 1) % self.albums.len();
        if !self.timers.is_empty() {
            debug!(pending = self.timers.len(), "replacing pending warp timers");
        }
        self.timers.clear();
        self.timers.push(Timer { due_ms: now_ms + timing.swap_after_ms, action: TimerAction::SwapAlbum { to } });
        self.timers.push(Timer { due_ms: now_ms + timing.end_after_ms,  action: TimerAction::EndWarp });
        self.timers.sort_by_key(|t| t.due_ms);
        self.set_mode(Mode::Warp);
    }

    /// Fire every timer due at or before `now_ms`, in due order.
    pub fn advance_timers(&mut self, now_ms: u64) -> Vec<TimerAction> {
        let mut fired = Vec::new();
        while let Some(t) = self.timers.first().copied() {
            if t.due_ms > now_ms {
                break;
            }
            self.timers.remove(0);
            self.fire(t.action);
            fired.push(t.action);
        }
        fired
    }

    /// Drop all pending timers.  Called on shutdown.
    pub fn cancel_timers(&mut self) {
        if !self.timers.is_empty() {
            debug!(pending = self.timers.len(), "cancelling warp timers");
        }
        self.timers.clear();
    }

    fn fire(&mut self, action: TimerAction) {
        match action {
            TimerAction::SwapAlbum { to } => {
                self.current = to % self.albums.len();
                self.selected = None;
                self.hovered = None;
                info!(album = %self.albums[self.current].name, index = self.current, "album switched");
            }
            TimerAction::EndWarp => self.set_mode(Mode::Vortex),
        }
    }

    // ── gesture-side writes ───────────────────────────────────────────────

    pub fn set_gesture(&mut self, snapshot: GestureSnapshot) {
        self.gesture = snapshot;
    }

    pub fn set_rig_rotation(&mut self, rotation: Vec2) {
        self.rig_rotation = rotation;
    }

    // ── photos & selection ────────────────────────────────────────────────

    /// Append an uploaded image to the current album.
    pub fn add_photo<R: Rng + ?Sized>(&mut self, url: &str, rng: &mut R) -> PhotoId {
        let photo = Photo::uploaded(url, rng);
        let id = photo.id.clone();
        let album = &mut self.albums[self.current];
        album.photos.push(photo);
        info!(%id, album = %album.name, "photo added");
        id
    }

    /// Remove a photo from the current album.  Deleting the selected photo
    /// clears the selection and forces BIG_BANG.
    pub fn delete_photo(&mut self, id: &PhotoId) -> Result<Photo, GalleryError> {
        let album = &mut self.albums[self.current];
        let pos = album
            .photos
            .iter()
            .position(|p| &p.id == id)
            .ok_or_else(|| GalleryError::UnknownPhoto(id.clone()))?;
        let removed = album.photos.remove(pos);
        info!(%id, album = %album.name, "photo deleted");

        if self.hovered.as_ref() == Some(id) {
            self.hovered = None;
        }
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
            self.set_mode(Mode::BigBang);
        }
        Ok(removed)
    }

    /// Focus a photo of the current album.  Only possible while expanded or
    /// already focused.
    pub fn select_photo(&mut self, id: PhotoId) -> Result<(), GalleryError> {
        if !self.mode.allows_selection() {
            return Err(GalleryError::SelectionLocked(self.mode));
        }
        if !self.current_album().contains(&id) {
            return Err(GalleryError::UnknownPhoto(id));
        }
        debug!(%id, "photo selected");
        self.selected = Some(id);
        self.set_mode(Mode::Singularity);
        Ok(())
    }

    /// Pinch pick from the expanded view.  Ignored in any other mode.
    pub fn pick_photo(&mut self, id: PhotoId) -> Result<bool, GalleryError> {
        if self.mode != Mode::BigBang {
            return Ok(false);
        }
        self.select_photo(id)?;
        Ok(true)
    }

    /// Hover only sticks while selection is allowed; clearing always works.
    pub fn set_hovered(&mut self, id: Option<PhotoId>) {
        match id {
            Some(id) if self.mode.allows_selection() => self.hovered = Some(id),
            Some(_) => {}
            None => self.hovered = None,
        }
    }

    /// Apply one UI or render-side command.  Returns whether anything was
    /// eligible to change.
    pub fn apply<R: Rng + ?Sized>(&mut self, cmd: Command, rng: &mut R) -> Result<bool, GalleryError> {
        match cmd {
            Command::AddPhoto { url } => {
                self.add_photo(&url, rng);
                Ok(true)
            }
            Command::DeletePhoto(id) => self.delete_photo(&id).map(|_| true),
            Command::SelectPhoto(Some(id)) => self.select_photo(id).map(|_| true),
            Command::SelectPhoto(None) => {
                if self.mode == Mode::Singularity {
                    self.exit_focus();
                } else {
                    self.selected = None;
                }
                Ok(true)
            }
            Command::ExitFocus => {
                self.exit_focus();
                Ok(true)
            }
            Command::Hover(id) => {
                self.set_hovered(id);
                Ok(true)
            }
            Command::Pick(id) => self.pick_photo(id),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::album::{default_albums, Album, Rgb};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn make_state() -> (GalleryState, StdRng) {
        let mut rng = StdRng::seed_from_u64(42);
        let albums = default_albums(&mut rng);
        (GalleryState::new(albums).unwrap(), rng)
    }

    /// State on the second album (which has photos), expanded.
    fn expanded() -> (GalleryState, StdRng) {
        let (mut s, rng) = make_state();
        s.fire(TimerAction::SwapAlbum { to: 1 });
        s.set_mode(Mode::BigBang);
        s.drain_status();
        (s, rng)
    }

    fn first_id(s: &GalleryState) -> PhotoId {
        s.current_album().photos[0].id.clone()
    }

    #[test]
    fn empty_album_list_rejected() {
        assert!(matches!(GalleryState::new(Vec::new()), Err(GalleryError::NoAlbums)));
    }

    #[test]
    fn starts_in_vortex() {
        let (s, _) = make_state();
        assert_eq!(s.mode(), Mode::Vortex);
        assert_eq!(s.current_index(), 0);
        assert!(s.selected().is_none());
    }

    #[test]
    fn mode_change_emits_status_once() {
        let (mut s, _) = make_state();
        s.set_mode(Mode::BigBang);
        s.set_mode(Mode::BigBang);
        let st = s.drain_status();
        assert_eq!(st.len(), 1);
        assert_eq!(st[0].message, "EXPANSION DETECTED");
        assert!(s.drain_status().is_empty());
    }

    #[test]
    fn warp_schedule() {
        let (mut s, _) = make_state();
        s.begin_warp(5_000, WarpTiming::default());
        assert_eq!(s.mode(), Mode::Warp);

        assert!(s.advance_timers(5_999).is_empty());
        assert_eq!(s.current_index(), 0);

        assert_eq!(s.advance_timers(6_000), vec![TimerAction::SwapAlbum { to: 1 }]);
        assert_eq!(s.current_index(), 1);
        assert_eq!(s.mode(), Mode::Warp);

        assert!(s.advance_timers(7_499).is_empty());
        assert_eq!(s.advance_timers(7_500), vec![TimerAction::EndWarp]);
        assert_eq!(s.mode(), Mode::Vortex);
        assert!(!s.has_pending_timers());
    }

    #[test]
    fn late_tick_fires_both_in_order() {
        let (mut s, _) = make_state();
        s.begin_warp(0, WarpTiming::default());
        let fired = s.advance_timers(10_000);
        assert_eq!(fired, vec![TimerAction::SwapAlbum { to: 1 }, TimerAction::EndWarp]);
        assert_eq!(s.mode(), Mode::Vortex);
    }

    #[test]
    fn warp_wraps_album_index() {
        let (mut s, _) = make_state();
        for expected in [1, 2, 0, 1] {
            s.begin_warp(0, WarpTiming::default());
            s.advance_timers(u64::MAX);
            assert_eq!(s.current_index(), expected);
        }
    }

    #[test]
    fn rewarp_replaces_timers() {
        let (mut s, _) = make_state();
        s.begin_warp(0, WarpTiming::default());
        s.begin_warp(500, WarpTiming::default());
        let fired = s.advance_timers(u64::MAX);
        assert_eq!(fired.len(), 2);
        assert_eq!(s.current_index(), 1);
    }

    #[test]
    fn cancelled_timers_never_fire() {
        let (mut s, _) = make_state();
        s.begin_warp(0, WarpTiming::default());
        s.cancel_timers();
        assert!(s.advance_timers(u64::MAX).is_empty());
        assert_eq!(s.current_index(), 0);
        assert_eq!(s.mode(), Mode::Warp);
    }

    #[test]
    fn album_swap_clears_selection() {
        let (mut s, _) = expanded();
        let id = first_id(&s);
        s.select_photo(id.clone()).unwrap();
        s.set_hovered(Some(id));
        s.begin_warp(0, WarpTiming::default());
        s.advance_timers(1_000);
        assert!(s.selected().is_none());
        assert!(s.hovered().is_none());
    }

    #[test]
    fn delete_selected_forces_big_bang() {
        let (mut s, _) = expanded();
        let id = first_id(&s);
        s.select_photo(id.clone()).unwrap();
        assert_eq!(s.mode(), Mode::Singularity);

        let removed = s.delete_photo(&id).unwrap();
        assert_eq!(removed.id, id);
        assert_eq!(s.mode(), Mode::BigBang);
        assert!(s.selected().is_none());
        assert_eq!(s.current_album().photos.len(), 4);
    }

    #[test]
    fn delete_other_photo_keeps_focus() {
        let (mut s, _) = expanded();
        let keep = first_id(&s);
        let other = s.current_album().photos[1].id.clone();
        s.select_photo(keep.clone()).unwrap();
        s.delete_photo(&other).unwrap();
        assert_eq!(s.mode(), Mode::Singularity);
        assert_eq!(s.selected(), Some(&keep));
    }

    #[test]
    fn delete_unknown_is_error() {
        let (mut s, _) = expanded();
        let err = s.delete_photo(&PhotoId::from("nope")).unwrap_err();
        assert!(matches!(err, GalleryError::UnknownPhoto(_)));
        assert_eq!(s.current_album().photos.len(), 5);
    }

    #[test]
    fn exit_focus_idempotent_but_clears_hover() {
        let (mut s, _) = expanded();
        let id = first_id(&s);
        s.set_hovered(Some(id));
        s.exit_focus();
        assert_eq!(s.mode(), Mode::BigBang);
        assert!(s.selected().is_none());
        assert!(s.hovered().is_none());
        assert!(s.drain_status().is_empty());
    }

    #[test]
    fn hover_ignored_in_vortex() {
        let (mut s, _) = make_state();
        s.set_hovered(Some(PhotoId::from("x")));
        assert!(s.hovered().is_none());
    }

    #[test]
    fn select_locked_outside_expanded_modes() {
        let (mut s, _) = make_state();
        s.fire(TimerAction::SwapAlbum { to: 1 });
        let id = first_id(&s);
        assert!(matches!(s.select_photo(id), Err(GalleryError::SelectionLocked(Mode::Vortex))));
    }

    #[test]
    fn pick_only_from_big_bang() {
        let (mut s, _) = expanded();
        let id = first_id(&s);
        assert!(s.pick_photo(id.clone()).unwrap());
        assert_eq!(s.mode(), Mode::Singularity);
        let other = s.current_album().photos[1].id.clone();
        assert!(!s.pick_photo(other).unwrap());
        assert_eq!(s.selected(), Some(&id));
    }

    #[test]
    fn vortex_clears_selection() {
        let (mut s, _) = expanded();
        let id = first_id(&s);
        s.select_photo(id).unwrap();
        s.reset_to_vortex();
        assert!(s.selected().is_none());
        assert_eq!(s.mode(), Mode::Vortex);
    }

    #[test]
    fn commands_round_through_apply() {
        let (mut s, mut rng) = expanded();
        s.apply(Command::AddPhoto { url: "blob:a".into() }, &mut rng).unwrap();
        assert_eq!(s.current_album().photos.len(), 6);
        let id = s.current_album().photos[5].id.clone();

        s.apply(Command::Pick(id.clone()), &mut rng).unwrap();
        assert_eq!(s.selected_photo().map(|p| p.url.as_str()), Some("blob:a"));

        s.apply(Command::SelectPhoto(None), &mut rng).unwrap();
        assert_eq!(s.mode(), Mode::BigBang);

        s.apply(Command::DeletePhoto(id), &mut rng).unwrap();
        assert_eq!(s.current_album().photos.len(), 5);
    }

    #[test]
    fn add_photo_goes_to_current_album() {
        let mut rng = StdRng::seed_from_u64(9);
        let albums = vec![
            Album::new("a", "A", Rgb::from_u32(0x112233)),
            Album::new("b", "B", Rgb::from_u32(0x445566)),
        ];
        let mut s = GalleryState::new(albums).unwrap();
        s.fire(TimerAction::SwapAlbum { to: 1 });
        s.add_photo("blob:x", &mut rng);
        assert!(s.albums()[0].photos.is_empty());
        assert_eq!(s.albums()[1].photos.len(), 1);
    }
}
