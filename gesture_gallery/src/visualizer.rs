//! Software-rendered viewer using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │ MULTIVERSE GALLERY                                  MODE: VORTEX │
//! │ SYSTEM: CYBER NEBULA                                             │
//! │ [████░░░░░░] album progress                                      │
//! │                                                                  │
//! │          particles + photo fragments         ┌──────────────────┐│
//! │                                              │ PHOTO TITLE      ││
//! │               STATUS BANNER                  │ ARCHIVE ID: ...  ││
//! │                     ◦ cursor                 └──────────────────┘│
//! │                                           RESET EXPAND VIEW WARP │
//! │ key legend                                                       │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::mpsc::Sender;
use std::time::Duration;

use galaxy_motion::Projector;
use gallery_state::{Mode, Rgb};
use glam::{Mat4, Vec2, Vec3};
use hand_pose::synth::Pose;
use hand_pose::{Gesture, GestureSnapshot};
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use crate::app::Gallery;
use crate::source::SimInput;

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

const BG_COLOR:       u32 = 0xFF050510;
const HUD_TEXT:       u32 = 0xFFEEEEEE;
const HUD_DIM:        u32 = 0xFF888888;
const PANEL_BG:       u32 = 0xFF0F1428;
const ALERT_COLOR:    u32 = 0xFFFF5566;

const COLOR_FIST:     u32 = 0xFFA855F7;  // purple
const COLOR_PALM:     u32 = 0xFFFACC15;  // yellow
const COLOR_PINCH:    u32 = 0xFF22C55E;  // green
const COLOR_VICTORY:  u32 = 0xFF22D3EE;  // cyan

/// Base fragment half-height in pixels at unit distance, before perspective.
const FRAGMENT_SCALE: f32 = 40.0;
/// Base particle radius at unit distance.
const PARTICLE_SCALE: f32 = 6.0;
/// Warp streak length in world units.
const STREAK_LEN:     f32 = 3.0;

const PROGRESS_W:     usize = 120;
const PANEL_W:        usize = 220;
const PANEL_H:        usize = 48;
const GLYPH_ADVANCE:  usize = 4;

// ════════════════════════════════════════════════════════════════════════════
// UiAction
// ════════════════════════════════════════════════════════════════════════════

/// Viewer input that maps directly to app operations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UiAction {
    Quit,
    AddPhoto,
    DeleteSelected,
    ExitFocus,
    /// Left click at a point in NDC.
    Click(Vec2),
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window:     Window,
    buf:        Vec<u32>,
    width:      usize,
    height:     usize,
    sim_tx:     Sender<SimInput>,
    last_pose:  Pose,
    last_mouse: Option<(f32, f32)>,
    mouse_was_down: bool,
}

impl Visualizer {
    pub fn new(width: usize, height: usize, sim_tx: Sender<SimInput>) -> Result<Self, minifb::Error> {
        let mut window = Window::new(
            "Multiverse Gallery",
            width, height,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )?;

        window.limit_update_rate(Some(Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            buf: vec![BG_COLOR; width * height],
            width,
            height,
            sim_tx,
            last_pose: Pose::Relaxed,
            last_mouse: None,
            mouse_was_down: false,
        })
    }

    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Poll keyboard and mouse.  Held pose keys and the pointer become
    /// [`SimInput`] for the simulated hand; everything else is returned.
    pub fn poll_input(&mut self) -> Vec<UiAction> {
        if !self.window.is_open() {
            return vec![UiAction::Quit];
        }
        let mut actions = Vec::new();

        // ── simulated hand ────────────────────────────────────────────────
        let down = |k: Key| self.window.is_key_down(k);
        let pose = if down(Key::F) {
            Pose::Fist
        } else if down(Key::P) {
            Pose::OpenPalm
        } else if down(Key::C) {
            Pose::Pinch
        } else if down(Key::V) {
            Pose::Victory
        } else {
            Pose::Relaxed
        };
        if pose != self.last_pose {
            self.last_pose = pose;
            let _ = self.sim_tx.send(SimInput::Pose(pose));
        }

        let mouse = self.window.get_mouse_pos(MouseMode::Discard);
        if mouse != self.last_mouse {
            self.last_mouse = mouse;
            let input = match mouse {
                Some((x, y)) => SimInput::Pointer(Vec2::new(
                    x / self.width as f32,
                    y / self.height as f32,
                )),
                None => SimInput::PointerLeft,
            };
            let _ = self.sim_tx.send(input);
        }

        // ── direct actions ────────────────────────────────────────────────
        let one_shot = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);

        if one_shot(Key::Q) {
            actions.push(UiAction::Quit);
        }
        if one_shot(Key::U) {
            actions.push(UiAction::AddPhoto);
        }
        if one_shot(Key::Delete) || one_shot(Key::X) {
            actions.push(UiAction::DeleteSelected);
        }
        if one_shot(Key::Escape) {
            actions.push(UiAction::ExitFocus);
        }

        let mouse_down = self.window.get_mouse_down(MouseButton::Left);
        if mouse_down && !self.mouse_was_down {
            if let Some((x, y)) = mouse {
                actions.push(UiAction::Click(pixel_to_ndc(x, y, self.width, self.height)));
            }
        }
        self.mouse_was_down = mouse_down;

        actions
    }

    /// Render one frame.
    pub fn render(&mut self, app: &Gallery, now_ms: u64) {
        let state = app.state();
        let engine = app.engine();
        let mode = state.mode();

        let background = blend(BG_COLOR, engine.scene().environment.to_argb(), 0.06);
        self.buf.fill(background);

        // ── world ─────────────────────────────────────────────────────────
        let vp = app.camera().view_projection();
        let group = Mat4::from_quat(engine.scene().group_rotation());
        let eye = app.camera().eye();

        self.draw_particles(app, vp * group, eye);
        self.draw_fragments(app, vp * group, eye);

        // ── HUD: album ────────────────────────────────────────────────────
        let album = state.current_album();
        let theme = album.theme_color.to_argb();
        self.draw_label("MULTIVERSE GALLERY", 10, 10, HUD_TEXT);
        self.draw_label(&format!("SYSTEM: {}", album.name), 10, 20, theme);

        let total = state.albums().len().max(1);
        let filled = PROGRESS_W * (state.current_index() + 1) / total;
        self.fill_rect(10, 30, PROGRESS_W, 3, 0xFF333344);
        self.fill_rect(10, 30, filled, 3, theme);

        let mode_label = format!("MODE: {}", mode);
        let mx = self.width.saturating_sub(text_width(&mode_label) + 10);
        self.draw_label(&mode_label, mx, 10, HUD_DIM);

        if !app.detecting() {
            self.draw_label("HAND TRACKING OFFLINE", 10, 40, ALERT_COLOR);
        }

        // ── HUD: status banner ────────────────────────────────────────────
        if let Some(msg) = app.banner().message(now_ms) {
            let x = self.width.saturating_sub(text_width(msg)) / 2;
            let y = (self.height / 2).saturating_sub(40);
            self.fill_rect(x.saturating_sub(8), y.saturating_sub(6), text_width(msg) + 16, 17, PANEL_BG);
            self.draw_label(msg, x, y, theme);
        }

        // ── HUD: focused photo ────────────────────────────────────────────
        if mode == Mode::Singularity {
            if let Some(photo) = state.selected_photo() {
                let x = self.width.saturating_sub(PANEL_W + 10);
                let y = (self.height / 2).saturating_sub(PANEL_H / 2);
                self.fill_rect(x, y, PANEL_W, PANEL_H, PANEL_BG);
                self.draw_border(x, y, PANEL_W, PANEL_H, theme);
                let title = photo.title.as_deref().unwrap_or("MEMORY FRAGMENT");
                self.draw_label(title, x + 8, y + 8, HUD_TEXT);
                self.draw_label(&format!("ARCHIVE ID: {}", photo.id), x + 8, y + 20, HUD_DIM);
                self.draw_label("ESC=CLOSE  DEL=DELETE MEMORY", x + 8, y + 34, ALERT_COLOR);
            }
        }

        // ── HUD: gesture indicators + cursor ──────────────────────────────
        let gesture = state.gesture();
        self.draw_indicators(gesture);
        self.draw_cursor(gesture);

        // ── Key legend ────────────────────────────────────────────────────
        self.draw_label(
            "HOLD F=FIST P=PALM C=PINCH V=VICTORY  MOUSE=HAND  CLICK=SELECT  U=UPLOAD  Q=QUIT",
            10, self.height.saturating_sub(12), HUD_DIM,
        );

        self.window
            .update_with_buffer(&self.buf, self.width, self.height)
            .ok();
    }

    // ── Particles ─────────────────────────────────────────────────────────

    fn draw_particles(&mut self, app: &Gallery, mvp: Mat4, eye: Vec3) {
        let state = app.state();
        let mode = state.mode();
        let field = app.engine().particles();
        let tint = field.tint().to_argb();
        let group = app.engine().scene().group_rotation();

        for (i, &p) in field.positions().iter().enumerate() {
            let Some(ndc) = project(mvp, p) else { continue };
            let (sx, sy) = ndc_to_pixel(ndc.truncate(), self.width, self.height);

            if mode == Mode::Warp {
                let tail = p - Vec3::Z * STREAK_LEN;
                if let Some(t) = project(mvp, tail) {
                    let (tx, ty) = ndc_to_pixel(t.truncate(), self.width, self.height);
                    self.draw_line(sx, sy, tx, ty, tint);
                }
                continue;
            }

            let dist = (group * p - eye).length().max(0.5);
            let r = (PARTICLE_SCALE * field.instance_scale(i, mode).x / dist).max(0.5);
            if r < 1.0 {
                self.blend_pixel(sx as isize, sy as isize, tint, r);
            } else {
                self.fill_disc(sx, sy, r, tint);
            }
        }
    }

    // ── Fragments ─────────────────────────────────────────────────────────

    fn draw_fragments(&mut self, app: &Gallery, mvp: Mat4, eye: Vec3) {
        let state = app.state();
        let group = app.engine().scene().group_rotation();
        let theme = state.current_album().theme_color;

        // far to near
        let mut visible: Vec<_> = app
            .engine()
            .fragments()
            .records()
            .iter()
            .filter_map(|r| {
                let ndc = project(mvp, r.current)?;
                let dist = (group * r.current - eye).length().max(0.5);
                Some((dist, ndc, r))
            })
            .collect();
        visible.sort_by(|a, b| b.0.total_cmp(&a.0));

        for (dist, ndc, rec) in visible {
            let (cx, cy) = ndc_to_pixel(ndc.truncate(), self.width, self.height);
            let half_h = FRAGMENT_SCALE * 1.5 / dist * (1.0 + 0.2 * rec.hover);
            let half_w = half_h * 2.0 / 3.0;
            let shift = rec.glitch * (rec.seed * 37.0).sin() * half_w;

            let x = (cx - half_w + shift).max(0.0) as usize;
            let y = (cy - half_h).max(0.0) as usize;
            let (w, h) = ((half_w * 2.0) as usize, (half_h * 2.0) as usize);
            if w == 0 || h == 0 {
                continue;
            }

            let fill = rec.color.lerp(Rgb::WHITE, rec.hover * 0.3);
            self.fill_rect(x, y, w, h, fill.to_argb());
            let edge = if state.selected() == Some(&rec.id) { Rgb::WHITE } else { theme };
            self.draw_border(x, y, w, h, edge.to_argb());
            if rec.glitch > 0.1 {
                self.fill_rect(x, y + h / 3, w, 2, ALERT_COLOR);
            }
        }
    }

    // ── Gesture HUD ───────────────────────────────────────────────────────

    fn draw_indicators(&mut self, g: &GestureSnapshot) {
        let items = [
            ("RESET",  g.is_fist,      COLOR_FIST),
            ("EXPAND", g.is_open_palm, COLOR_PALM),
            ("VIEW",   g.is_pinching,  COLOR_PINCH),
            ("WARP",   g.is_victory,   COLOR_VICTORY),
        ];
        let y = self.height.saturating_sub(28);
        let mut x = self.width.saturating_sub(items.len() * 48 + 10);
        for (label, on, color) in items {
            let c = if on { color } else { blend(color, BG_COLOR, 0.75) };
            self.fill_rect(x, y, 6, 6, c);
            self.draw_label(label, x + 9, y + 1, c);
            x += 48;
        }
    }

    fn draw_cursor(&mut self, g: &GestureSnapshot) {
        // exactly zero means no hand has been seen yet
        if g.hand_position == Vec2::ZERO {
            return;
        }
        let (x, y) = ndc_to_pixel(g.hand_position, self.width, self.height);
        let color = gesture_color(g.dominant());
        self.draw_ring(x, y, 10.0, color);
        if g.is_pinching {
            self.fill_disc(x, y, 3.0, color);
        }
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(self.height) {
            for col in x..(x + w).min(self.width) {
                self.buf[row * self.width + col] = color;
            }
        }
    }

    fn draw_border(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        if w == 0 || h == 0 {
            return;
        }
        for col in x..(x + w).min(self.width) {
            self.set_pixel(col, y, color);
            self.set_pixel(col, y + h - 1, color);
        }
        for row in y..(y + h).min(self.height) {
            self.set_pixel(x, row, color);
            self.set_pixel(x + w - 1, row, color);
        }
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < self.width && y < self.height {
            self.buf[y * self.width + x] = color;
        }
    }

    fn blend_pixel(&mut self, x: isize, y: isize, color: u32, t: f32) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            let i = y as usize * self.width + x as usize;
            self.buf[i] = blend(self.buf[i], color, t);
        }
    }

    fn fill_disc(&mut self, cx: f32, cy: f32, r: f32, color: u32) {
        let ri = r.ceil() as isize;
        for dy in -ri..=ri {
            for dx in -ri..=ri {
                if ((dx * dx + dy * dy) as f32) <= r * r {
                    self.blend_pixel(cx as isize + dx, cy as isize + dy, color, 0.8);
                }
            }
        }
    }

    fn draw_ring(&mut self, cx: f32, cy: f32, r: f32, color: u32) {
        let steps = (r * 8.0) as usize;
        for i in 0..steps {
            let a = i as f32 / steps as f32 * std::f32::consts::TAU;
            self.blend_pixel((cx + a.cos() * r) as isize, (cy + a.sin() * r) as isize, color, 1.0);
        }
    }

    fn draw_line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: u32) {
        let steps = (x1 - x0).abs().max((y1 - y0).abs()).min(200.0) as usize + 1;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let x = x0 + (x1 - x0) * t;
            let y = y0 + (y1 - y0) * t;
            self.blend_pixel(x as isize, y as isize, color, 1.0 - t * 0.8);
        }
    }

    /// Minimal bitmap font: 3×5 glyphs, one pixel gap.
    fn draw_label(&mut self, text: &str, x: usize, y: usize, color: u32) {
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.set_pixel(cx + col, y + row, color);
                    }
                }
            }
            cx += GLYPH_ADVANCE;
            if cx + GLYPH_ADVANCE > self.width { break; }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pure helpers
// ────────────────────────────────────────────────────────────────────────────

fn project(mvp: Mat4, p: Vec3) -> Option<Vec3> {
    let clip = mvp * p.extend(1.0);
    if clip.w <= f32::EPSILON {
        return None;
    }
    let ndc = clip.truncate() / clip.w;
    (ndc.x.abs() <= 1.2 && ndc.y.abs() <= 1.2 && ndc.z <= 1.0).then_some(ndc)
}

/// NDC (y up) to pixel coordinates (y down).
pub fn ndc_to_pixel(ndc: Vec2, width: usize, height: usize) -> (f32, f32) {
    (
        (ndc.x + 1.0) * 0.5 * width as f32,
        (1.0 - ndc.y) * 0.5 * height as f32,
    )
}

pub fn pixel_to_ndc(x: f32, y: f32, width: usize, height: usize) -> Vec2 {
    Vec2::new(
        x / width as f32 * 2.0 - 1.0,
        1.0 - y / height as f32 * 2.0,
    )
}

/// Cursor colour for the dominant gesture.
pub fn gesture_color(g: Option<Gesture>) -> u32 {
    match g {
        Some(Gesture::Pinch)    => COLOR_PINCH,
        Some(Gesture::Fist)     => COLOR_FIST,
        Some(Gesture::OpenPalm) => COLOR_PALM,
        Some(Gesture::Victory)  => COLOR_VICTORY,
        None                    => 0xFFFFFFFF,
    }
}

fn text_width(text: &str) -> usize {
    text.chars().count() * GLYPH_ADVANCE
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '_' => [0b000, 0b000, 0b000, 0b000, 0b111],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '#' => [0b101, 0b111, 0b101, 0b111, 0b101],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

/// Alpha-blend two ARGB colors. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |ca: u32, cb: u32| (ca as f32 * (1.0 - t) + cb as f32 * t) as u32;
    let (ar, br) = ((a >> 16) & 0xFF, (b >> 16) & 0xFF);
    let (ag, bg) = ((a >> 8) & 0xFF, (b >> 8) & 0xFF);
    let (ab, bb) = (a & 0xFF, b & 0xFF);
    0xFF000000 | (lerp(ar, br) << 16) | (lerp(ag, bg) << 8) | lerp(ab, bb)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
