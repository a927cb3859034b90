//! Hand landmark sources — simulation, a JSON-lines stream, or LeapMotion.
//!
//! Every source runs on its own thread and delivers [`SourceEvent`]s over an
//! `mpsc` channel, so the render loop never waits on the detector.  The app
//! does not care which source is producing frames.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use glam::Vec2;
use hand_pose::synth::{self, Pose};
use hand_pose::{HandFrame, Landmark};
use tracing::{debug, error, info, warn};

/// Nominal detector frame period.
pub const FRAME_PERIOD: Duration = Duration::from_millis(16);

/// Frame periods `shutdown` waits for a source thread to notice the stop flag.
const SHUTDOWN_POLLS: usize = 20;

// ════════════════════════════════════════════════════════════════════════════
// SourceEvent / HandSource
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub enum SourceEvent {
    /// One detector frame, possibly with no hands.
    Frame(HandFrame),
    /// The detector or camera is gone.  No more frames will follow.
    Failed(String),
}

/// Anything that can deliver hand frames over a channel.
pub trait HandSource: Send + 'static {
    /// Produce events until `stop` is set, the receiver hangs up, or the
    /// source runs dry.
    fn run(self: Box<Self>, tx: Sender<SourceEvent>, stop: Arc<AtomicBool>);
}

// ════════════════════════════════════════════════════════════════════════════
// Spawn helper
// ════════════════════════════════════════════════════════════════════════════

/// Receiving end of a running source plus the means to stop it.
pub struct SourceHandle {
    rx:     Receiver<SourceEvent>,
    stop:   Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl SourceHandle {
    /// Next pending event, if any.  `None` also once the source has exited
    /// and the queue is drained.
    pub fn poll(&self) -> Option<SourceEvent> {
        match self.rx.try_recv() {
            Ok(evt) => Some(evt),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Signal the source to stop and wait briefly for its thread.  A source
    /// stuck in a blocking read (stdin) is left to die with the process.
    pub fn shutdown(mut self) {
        self.stop.store(true, Ordering::Relaxed);
        let Some(handle) = self.thread.take() else { return };
        for _ in 0..SHUTDOWN_POLLS {
            if handle.is_finished() {
                if handle.join().is_err() {
                    error!("hand source thread panicked");
                }
                return;
            }
            thread::sleep(FRAME_PERIOD);
        }
        debug!("hand source still blocked, detaching");
    }
}

/// Spawn a hand source on its own thread.
pub fn spawn_hand_source<S: HandSource>(source: S) -> SourceHandle {
    let (tx, rx) = mpsc::channel();
    let stop = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stop);
    let thread = thread::spawn(move || Box::new(source).run(tx, flag));
    SourceHandle { rx, stop, thread: Some(thread) }
}

// ════════════════════════════════════════════════════════════════════════════
// SimHandSource — keyboard/mouse simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Raw input from the viewer window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimInput {
    /// Pose currently held on the keyboard.
    Pose(Pose),
    /// Pointer position in window coordinates normalized to `[0, 1]²`,
    /// origin top-left.
    Pointer(Vec2),
    /// Pointer left the window: the hand is out of view.
    PointerLeft,
}

/// Turns [`SimInput`] into synthetic hands, one frame per period, like a
/// camera would.
pub struct SimHandSource {
    pub rx: Receiver<SimInput>,
}

impl SimHandSource {
    /// Landmark-space knuckle position for a pointer position.  Detector
    /// images are mirrored, so x is flipped here and flipped back by the
    /// normalizer, leaving the cursor under the pointer.
    pub fn knuckle_for_pointer(pointer: Vec2) -> Vec2 {
        Vec2::new(1.0 - pointer.x, pointer.y)
    }
}

impl HandSource for SimHandSource {
    fn run(self: Box<Self>, tx: Sender<SourceEvent>, stop: Arc<AtomicBool>) {
        let mut pose = Pose::Relaxed;
        let mut pointer: Option<Vec2> = None;
        let mut next = Instant::now();

        while !stop.load(Ordering::Relaxed) {
            if Instant::now() >= next {
                let frame = match pointer {
                    Some(p) => HandFrame::single(synth::pose(pose, Self::knuckle_for_pointer(p))),
                    None    => HandFrame::empty(),
                };
                if tx.send(SourceEvent::Frame(frame)).is_err() {
                    return;
                }
                next = Instant::now() + FRAME_PERIOD;
            }

            match self.rx.recv_timeout(next.saturating_duration_since(Instant::now())) {
                Ok(SimInput::Pose(p))               => pose = p,
                Ok(SimInput::Pointer(p))            => pointer = Some(p),
                Ok(SimInput::PointerLeft)           => pointer = None,
                Err(RecvTimeoutError::Timeout)      => {}
                Err(RecvTimeoutError::Disconnected) => return,
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// StreamHandSource — JSON lines from an external detector
// ════════════════════════════════════════════════════════════════════════════

/// Reads one JSON [`HandFrame`] per line, e.g. piped from a MediaPipe
/// script.  Malformed lines are skipped.
pub struct StreamHandSource {
    reader: Box<dyn BufRead + Send>,
    label:  String,
    /// Delay between frames.  Files replay at detector speed; live pipes
    /// are paced by the writer.
    pace:   Option<Duration>,
}

impl StreamHandSource {
    /// `"-"` reads stdin, anything else is a file path.
    pub fn open(path: &str) -> io::Result<Self> {
        if path == "-" {
            return Ok(Self::from_reader(BufReader::new(io::stdin()), "stdin", None));
        }
        let file = File::open(path)?;
        Ok(Self::from_reader(BufReader::new(file), path, Some(FRAME_PERIOD)))
    }

    pub fn from_reader<R: BufRead + Send + 'static>(reader: R, label: &str, pace: Option<Duration>) -> Self {
        StreamHandSource { reader: Box::new(reader), label: label.to_string(), pace }
    }
}

impl HandSource for StreamHandSource {
    fn run(self: Box<Self>, tx: Sender<SourceEvent>, stop: Arc<AtomicBool>) {
        let StreamHandSource { reader, label, pace } = *self;
        info!(source = %label, "reading landmark stream");

        for (n, line) in reader.lines().enumerate() {
            if stop.load(Ordering::Relaxed) {
                return;
            }
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    error!(source = %label, error = %e, "landmark stream failed");
                    let _ = tx.send(SourceEvent::Failed(format!("{}: {}", label, e)));
                    return;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match HandFrame::from_json_line(&line) {
                Ok(frame) => {
                    if tx.send(SourceEvent::Frame(frame)).is_err() {
                        return;
                    }
                }
                Err(e) => warn!(source = %label, line = n + 1, error = %e, "skipping landmark frame"),
            }
            if let Some(d) = pace {
                thread::sleep(d);
            }
        }
        debug!(source = %label, "landmark stream ended");
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LeapHandSource — real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Leap tracking volume mapped onto the unit image square, in mm.
const LEAP_SPAN_MM:   f32 = 400.0;
/// Typical hover height above the device, mm.
const LEAP_CENTRE_Y:  f32 = 200.0;

/// Leap millimetres (x right, y up from the device) → normalized image
/// coordinates as a mirrored webcam would report them.
pub fn leap_to_landmark(x: f32, y: f32, z: f32) -> Landmark {
    Landmark::new(
        0.5 - x / LEAP_SPAN_MM,
        0.5 - (y - LEAP_CENTRE_Y) / LEAP_SPAN_MM,
        z / LEAP_SPAN_MM,
    )
}

/// Hand source backed by a real LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library installed.
/// The first tracked hand is converted to the 21-point layout: the middle
/// metacarpal base stands in for the wrist, then per digit the bases of the
/// proximal, intermediate and distal bones and the distal tip.
#[cfg(feature = "leap")]
pub struct LeapHandSource;

#[cfg(feature = "leap")]
impl HandSource for LeapHandSource {
    fn run(self: Box<Self>, tx: Sender<SourceEvent>, stop: Arc<AtomicBool>) {
        use leaprs::*;

        let mut connection = match Connection::create(ConnectionConfig::default()) {
            Ok(c) => c,
            Err(e) => {
                let _ = tx.send(SourceEvent::Failed(format!("LeapC connection: {:?}", e)));
                return;
            }
        };
        if let Err(e) = connection.open() {
            let _ = tx.send(SourceEvent::Failed(format!("LeapMotion device: {:?}", e)));
            return;
        }
        info!("LeapMotion connected");

        while !stop.load(Ordering::Relaxed) {
            let msg = match connection.poll(100) {
                Ok(m)  => m,
                Err(_) => continue,
            };

            if let Event::Tracking(frame) = msg.event() {
                let hands = frame
                    .hands()
                    .filter_map(|hand| {
                        let digits: Vec<_> = hand.digits().collect();
                        if digits.len() < 5 {
                            return None;
                        }
                        macro_rules! lm {
                            ($v:expr) => {{ let v = $v; leap_to_landmark(v.x, v.y, v.z) }};
                        }
                        let mut pts = vec![lm!(digits[2].metacarpal().prev_joint())];
                        for d in &digits {
                            pts.push(lm!(d.proximal().prev_joint()));
                            pts.push(lm!(d.intermediate().prev_joint()));
                            pts.push(lm!(d.distal().prev_joint()));
                            pts.push(lm!(d.distal().next_joint()));
                        }
                        hand_pose::HandLandmarks::from_points(&pts)
                            .map_err(|e| warn!(error = %e, "dropping leap hand"))
                            .ok()
                    })
                    .collect();

                if tx.send(SourceEvent::Frame(HandFrame { hands })).is_err() {
                    return;
                }
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
