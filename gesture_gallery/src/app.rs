//! Top-level application state and the main loop.
//!
//! `Gallery` owns the `GalleryState`, the classifier and debouncer that feed
//! it, the `MotionEngine` that animates it, and the camera.  Hand frames and
//! UI actions go in; the visualizer reads everything back out each frame.

use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Instant;

use anyhow::Context;
use galaxy_motion::{CameraPose, MotionEngine, Projector};
use gallery_state::{
    Command, GalleryError, GalleryState, Intent, IntentDebouncer, Mode, PhotoId, StatusTrigger,
};
use glam::Vec2;
use hand_pose::{GestureClassifier, HandFrame};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, error, info, warn};

use crate::config::AppConfig;
use crate::source::{spawn_hand_source, SimHandSource, SourceEvent, SourceHandle, StreamHandSource};
use crate::visualizer::{UiAction, Visualizer};

// ════════════════════════════════════════════════════════════════════════════
// StatusBanner
// ════════════════════════════════════════════════════════════════════════════

/// The centre-screen message shown for a while after each mode change.
#[derive(Debug, Clone)]
pub struct StatusBanner {
    duration_ms: u64,
    current:     Option<(&'static str, u64)>,
}

impl StatusBanner {
    pub fn new(duration_ms: u64) -> Self {
        StatusBanner { duration_ms, current: None }
    }

    /// A newer trigger replaces the one on screen and restarts the timer.
    pub fn show(&mut self, trigger: StatusTrigger, now_ms: u64) {
        self.current = Some((trigger.message, now_ms));
    }

    pub fn message(&self, now_ms: u64) -> Option<&'static str> {
        match self.current {
            Some((msg, at)) if now_ms.saturating_sub(at) < self.duration_ms => Some(msg),
            _ => None,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Gallery
// ════════════════════════════════════════════════════════════════════════════

pub struct Gallery {
    state:      GalleryState,
    classifier: GestureClassifier,
    debouncer:  IntentDebouncer,
    engine:     MotionEngine,
    camera:     CameraPose,
    banner:     StatusBanner,
    rng:        StdRng,
    /// False once the hand source has failed; the UI keeps working.
    detection:  bool,
    uploads:    usize,
}

impl Gallery {
    pub fn new(cfg: &AppConfig) -> Result<Self, GalleryError> {
        let mut rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None       => StdRng::from_entropy(),
        };
        let state = GalleryState::new(cfg.build_albums(&mut rng))?;
        let engine = MotionEngine::new(cfg.motion.clone(), &state, &mut rng);
        let aspect = cfg.window.width as f32 / cfg.window.height.max(1) as f32;

        info!(
            albums = state.albums().len(),
            album = %state.current_album().name,
            particles = engine.particles().len(),
            "gallery ready"
        );

        Ok(Gallery {
            state,
            classifier: GestureClassifier::new(cfg.classifier.clone()),
            debouncer:  IntentDebouncer::new(cfg.intent.clone()),
            engine,
            camera:     CameraPose::default().with_aspect(aspect),
            banner:     StatusBanner::new(cfg.status_ms),
            rng,
            detection:  true,
            uploads:    0,
        })
    }

    // ── input ─────────────────────────────────────────────────────────────

    /// Classify one detector frame and run the mode rules on it.
    pub fn handle_frame(&mut self, frame: &HandFrame, now_ms: u64) -> Option<Intent> {
        let snap = self.classifier.observe(frame)?;
        let intent = self.debouncer.process(&snap, &mut self.state, now_ms);
        if let Some(i) = intent {
            debug!(intent = i.as_str(), mode = %self.state.mode(), "gesture");
        }
        intent
    }

    pub fn handle_source_event(&mut self, event: SourceEvent, now_ms: u64) {
        match event {
            SourceEvent::Frame(frame) if self.detection => {
                self.handle_frame(&frame, now_ms);
            }
            SourceEvent::Frame(_) => {}
            SourceEvent::Failed(reason) => {
                error!(%reason, "hand detection unavailable, continuing without gestures");
                self.detection = false;
            }
        }
    }

    /// Apply a command; failures are logged and otherwise ignored.
    pub fn handle_command(&mut self, cmd: Command) -> bool {
        match self.state.apply(cmd, &mut self.rng) {
            Ok(changed) => changed,
            Err(GalleryError::SelectionLocked(mode)) => {
                debug!(%mode, "selection ignored");
                false
            }
            Err(e) => {
                warn!(error = %e, "command rejected");
                false
            }
        }
    }

    pub fn handle_ui(&mut self, action: UiAction) {
        match action {
            UiAction::AddPhoto => {
                self.uploads += 1;
                let url = format!("local://upload/{}", self.uploads);
                self.handle_command(Command::AddPhoto { url });
            }
            // only the focused photo can be deleted
            UiAction::DeleteSelected if self.state.mode() == Mode::Singularity => {
                if let Some(id) = self.state.selected().cloned() {
                    self.handle_command(Command::DeletePhoto(id));
                }
            }
            UiAction::DeleteSelected => {}
            // the close control only exists in the focused view
            UiAction::ExitFocus if self.state.mode() == Mode::Singularity => {
                self.handle_command(Command::ExitFocus);
            }
            UiAction::ExitFocus => {}
            UiAction::Click(ndc) => {
                if let Some(id) = self.fragment_at(ndc) {
                    self.handle_command(Command::SelectPhoto(Some(id)));
                }
            }
            UiAction::Quit => {}
        }
    }

    /// Closest fragment to an NDC point, within the pick radius.
    pub fn fragment_at(&self, ndc: Vec2) -> Option<PhotoId> {
        let group = self.engine.scene().group_rotation();
        let radius = self.engine.config().pick_radius;
        self.engine
            .fragments()
            .records()
            .iter()
            .filter_map(|r| {
                let p = self.camera.project(group * r.current)?;
                let d = p.truncate().distance(ndc);
                (d < radius).then_some((d, &r.id))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, id)| id.clone())
    }

    // ── per-frame ─────────────────────────────────────────────────────────

    /// Fire due WARP timers, animate, and apply the animator's pick signals.
    pub fn tick(&mut self, dt: f32, now_ms: u64) {
        for action in self.state.advance_timers(now_ms) {
            debug!(?action, now_ms, "warp timer fired");
        }

        let signals = self.engine.tick(&self.state, &mut self.camera, dt, &mut self.rng);
        for cmd in signals {
            self.handle_command(cmd);
        }

        for trigger in self.state.drain_status() {
            self.banner.show(trigger, now_ms);
        }
    }

    pub fn shutdown(&mut self) {
        self.state.cancel_timers();
    }

    // ── accessors for the render loop ─────────────────────────────────────

    pub fn state(&self)       -> &GalleryState  { &self.state }
    pub fn engine(&self)      -> &MotionEngine  { &self.engine }
    pub fn camera(&self)      -> &CameraPose    { &self.camera }
    pub fn banner(&self)      -> &StatusBanner  { &self.banner }
    pub fn detecting(&self)   -> bool           { self.detection }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the full application.
///
/// Creates the viewer window and the hand source (simulation by default, a
/// landmark stream with `landmarks`, hardware with `--features leap`) and
/// drives the event/render loop at ~60 fps.
pub fn run(cfg: AppConfig, landmarks: Option<PathBuf>) -> anyhow::Result<()> {
    let (sim_tx, sim_rx) = mpsc::channel();

    let source: SourceHandle = match landmarks {
        Some(path) => {
            let path = path.to_string_lossy().into_owned();
            let src = StreamHandSource::open(&path)
                .with_context(|| format!("opening landmark stream {}", path))?;
            spawn_hand_source(src)
        }
        None => default_source(sim_rx),
    };

    let mut vis = Visualizer::new(cfg.window.width, cfg.window.height, sim_tx)
        .context("creating viewer window")?;
    let mut app = Gallery::new(&cfg)?;

    let start = Instant::now();
    let mut last = start;

    while vis.is_open() {
        let now = Instant::now();
        let dt = now.duration_since(last).as_secs_f32();
        last = now;
        let now_ms = now.duration_since(start).as_millis() as u64;

        let mut quit = false;
        for action in vis.poll_input() {
            if action == UiAction::Quit {
                quit = true;
            }
            app.handle_ui(action);
        }
        if quit {
            break;
        }

        while let Some(event) = source.poll() {
            app.handle_source_event(event, now_ms);
        }

        app.tick(dt, now_ms);
        vis.render(&app, now_ms);
    }

    info!("shutting down");
    app.shutdown();
    source.shutdown();
    Ok(())
}

#[cfg(not(feature = "leap"))]
fn default_source(sim_rx: mpsc::Receiver<crate::source::SimInput>) -> SourceHandle {
    info!("hand source: keyboard + mouse simulation");
    spawn_hand_source(SimHandSource { rx: sim_rx })
}

#[cfg(feature = "leap")]
fn default_source(sim_rx: mpsc::Receiver<crate::source::SimInput>) -> SourceHandle {
    info!("hand source: LeapMotion");
    drop(sim_rx);
    spawn_hand_source(crate::source::LeapHandSource)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
