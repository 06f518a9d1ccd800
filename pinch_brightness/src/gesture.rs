//! Hand detection — from a MediaPipe helper process or mouse simulation.
//!
//! The public interface is [`HandDetector`], which turns a [`Frame`] into an
//! optional [`TrackedHand`].  Consumers don't need to know whether the hand
//! came from a real landmark model or from the mouse in the window.

use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::mpsc::{Receiver, TryRecvError};

use serde::Deserialize;

use pinch_map::{FingerPair, Point};

use crate::capture::Frame;
use crate::error::DetectorError;

// ════════════════════════════════════════════════════════════════════════════
// Landmark indices (MediaPipe hand model)
// ════════════════════════════════════════════════════════════════════════════

/// Hand landmark indices in the MediaPipe 21-point convention.
pub mod landmarks {
    pub const COUNT:      usize = 21;
    pub const THUMB_TIP:  usize = 4;
    pub const INDEX_TIP:  usize = 8;

    /// Bones of the hand skeleton, as landmark index pairs.
    pub const HAND_CONNECTIONS: [(usize, usize); 21] = [
        (0, 1), (1, 2), (2, 3), (3, 4),            // thumb
        (0, 5), (5, 6), (6, 7), (7, 8),            // index
        (5, 9), (9, 10), (10, 11), (11, 12),       // middle
        (9, 13), (13, 14), (14, 15), (15, 16),     // ring
        (13, 17), (0, 17), (17, 18), (18, 19), (19, 20), // pinky + palm
    ];
}

// ════════════════════════════════════════════════════════════════════════════
// TrackedHand
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Handedness { Left, Right, Unknown }

impl Handedness {
    fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "left"  => Handedness::Left,
            "right" => Handedness::Right,
            _       => Handedness::Unknown,
        }
    }
}

/// The one hand used this frame.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackedHand {
    pub handedness: Handedness,
    /// Detector confidence, 0.0–1.0.
    pub score:      f32,
    pub fingers:    FingerPair,
    /// Full skeleton in frame pixels when the detector provides it; empty in
    /// simulation mode.
    pub landmarks:  Vec<Point>,
}

// ════════════════════════════════════════════════════════════════════════════
// HandDetector trait — unified interface for hw and sim
// ════════════════════════════════════════════════════════════════════════════

/// Finds at most one hand in a frame.
///
/// `Ok(None)` is the normal "no hand this frame" answer; an `Err` means the
/// detector itself is broken.
pub trait HandDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Option<TrackedHand>, DetectorError>;
}

// ════════════════════════════════════════════════════════════════════════════
// SimHandDetector — mouse simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Raw input event from the simulation window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimInput {
    /// Cursor position in window pixels plus button state.
    Pointer { x: f32, y: f32, left: bool, right: bool },
    /// Cursor left the window.
    PointerLost,
}

/// Hand detector driven by [`SimInput`] events from the visualizer window.
///
/// * Left button held — a hand is present; the index tip follows the cursor.
/// * Right button — moves the thumb anchor to the cursor.
/// * No button — no hand.
///
/// The visualizer sends into the channel on the same thread; this end just
/// drains whatever has arrived before each detection.
pub struct SimHandDetector {
    rx:        Receiver<SimInput>,
    window:    (usize, usize),
    thumb:     Option<Point>,
    pointer:   Option<(f32, f32)>,
    pressed:   bool,
}

impl SimHandDetector {
    /// `window` is the size of the window the pointer coordinates refer to.
    pub fn new(rx: Receiver<SimInput>, window: (usize, usize)) -> Self {
        SimHandDetector { rx, window, thumb: None, pointer: None, pressed: false }
    }

    fn drain(&mut self) {
        loop {
            match self.rx.try_recv() {
                Ok(SimInput::Pointer { x, y, left, right }) => {
                    self.pointer = Some((x, y));
                    self.pressed = left;
                    if right {
                        self.thumb = Some(Point::new(f64::from(x), f64::from(y)));
                    }
                }
                Ok(SimInput::PointerLost) => {
                    self.pointer = None;
                    self.pressed = false;
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
    }

    /// Window → frame pixel scale.
    fn scale(&self, frame: &Frame) -> (f64, f64) {
        let (ww, wh) = self.window;
        (
            frame.width as f64 / ww.max(1) as f64,
            frame.height as f64 / wh.max(1) as f64,
        )
    }
}

impl HandDetector for SimHandDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Option<TrackedHand>, DetectorError> {
        self.drain();

        let (x, y) = match (self.pressed, self.pointer) {
            (true, Some(p)) => p,
            _ => return Ok(None),
        };

        let (sx, sy) = self.scale(frame);
        let centre = Point::new(self.window.0 as f64 / 2.0, self.window.1 as f64 / 2.0);
        let thumb  = self.thumb.unwrap_or(centre).scaled(sx, sy);
        let index  = Point::new(f64::from(x), f64::from(y)).scaled(sx, sy);

        Ok(Some(TrackedHand {
            handedness: Handedness::Right,
            score:      1.0,
            fingers:    FingerPair::new(thumb, index),
            landmarks:  Vec::new(),
        }))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// MediaPipe helper protocol
// ════════════════════════════════════════════════════════════════════════════
//
// Request : width u32 LE, height u32 LE, channels u32 LE (=3), then RGB bytes.
// Response: one JSON line, landmarks normalised to 0..1:
//   {"hands":[{"handedness":"Right","score":0.93,
//              "landmarks":[{"x":0.41,"y":0.52,"z":-0.01}, … ×21]}],
//    "error":null}

// `z` (relative depth) is sent too but unused.
#[derive(Deserialize, Debug)]
struct LandmarkJson {
    x: f64,
    y: f64,
}

#[derive(Deserialize, Debug)]
struct HandJson {
    #[serde(default)]
    handedness: String,
    score:      f32,
    landmarks:  Vec<LandmarkJson>,
}

#[derive(Deserialize, Debug)]
struct DetectionJson {
    #[serde(default)]
    hands: Vec<HandJson>,
    #[serde(default)]
    error: Option<String>,
}

/// Parse one response line from the helper.
///
/// Picks the first hand scoring at least `min_score` with a full 21-point
/// skeleton and converts its landmarks to pixels (truncated toward zero).
pub fn parse_detection(
    line:      &str,
    width:     usize,
    height:    usize,
    min_score: f32,
) -> Result<Option<TrackedHand>, DetectorError> {
    let result: DetectionJson = serde_json::from_str(line.trim()).map_err(|source| {
        DetectorError::Protocol { line: line.trim().to_string(), source }
    })?;

    if let Some(error) = result.error {
        tracing::warn!("hand detector reported: {error}");
        return Ok(None);
    }

    for hand in result.hands {
        if hand.score < min_score {
            tracing::trace!(score = hand.score, "hand below confidence threshold");
            continue;
        }
        if hand.landmarks.len() != landmarks::COUNT {
            tracing::warn!(
                "expected {} landmarks, got {}",
                landmarks::COUNT,
                hand.landmarks.len()
            );
            continue;
        }

        let points: Vec<Point> = hand
            .landmarks
            .iter()
            .map(|lm| Point::new((lm.x * width as f64).trunc(), (lm.y * height as f64).trunc()))
            .collect();

        return Ok(Some(TrackedHand {
            handedness: Handedness::parse(&hand.handedness),
            score:      hand.score,
            fingers:    FingerPair::new(points[landmarks::THUMB_TIP], points[landmarks::INDEX_TIP]),
            landmarks:  points,
        }));
    }

    Ok(None)
}

// ════════════════════════════════════════════════════════════════════════════
// MediaPipeDetector — helper subprocess (used by camera mode)
// ════════════════════════════════════════════════════════════════════════════

/// Hand detector backed by a MediaPipe Hands helper process.
///
/// The helper (`scripts/hand_detect.py`) reads frames on stdin and answers
/// each with one JSON line on stdout.
pub struct MediaPipeDetector {
    child:     Child,
    stdin:     ChildStdin,
    stdout:    BufReader<ChildStdout>,
    min_score: f32,
}

impl MediaPipeDetector {
    /// Start `python script` and wait for its `READY` line.
    pub fn spawn(python: &str, script: &Path, min_score: f32) -> Result<Self, DetectorError> {
        if !script.exists() {
            return Err(DetectorError::ScriptMissing(script.to_path_buf()));
        }

        tracing::info!(script = %script.display(), "starting MediaPipe hand detector");

        let mut child = Command::new(python)
            .arg(script)
            .arg("--min-confidence")
            .arg(min_score.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| DetectorError::Spawn { command: python.to_string(), source })?;

        let (stdin, stdout) = match (child.stdin.take(), child.stdout.take()) {
            (Some(i), Some(o)) => (i, o),
            _ => {
                let _ = child.kill();
                return Err(DetectorError::NotReady("helper pipes unavailable".into()));
            }
        };
        let mut stdout = BufReader::new(stdout);

        let mut ready = String::new();
        stdout.read_line(&mut ready)?;
        if ready.trim() != "READY" {
            let _ = child.kill();
            return Err(DetectorError::NotReady(ready.trim().to_string()));
        }

        tracing::info!("MediaPipe hand detector ready");
        Ok(MediaPipeDetector { child, stdin, stdout, min_score })
    }
}

impl HandDetector for MediaPipeDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Option<TrackedHand>, DetectorError> {
        if frame.is_empty() {
            return Ok(None);
        }

        write_request(&mut self.stdin, frame)?;

        let mut line = String::new();
        if self.stdout.read_line(&mut line)? == 0 {
            return Err(DetectorError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "hand detector exited",
            )));
        }

        parse_detection(&line, frame.width, frame.height, self.min_score)
    }
}

impl Drop for MediaPipeDetector {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Write one frame request in the helper's wire format.
fn write_request<W: Write>(out: &mut W, frame: &Frame) -> std::io::Result<()> {
    let header = |v: usize| (v as u32).to_le_bytes();
    out.write_all(&header(frame.width))?;
    out.write_all(&header(frame.height))?;
    out.write_all(&3u32.to_le_bytes())?;
    out.write_all(&frame.to_rgb_bytes())?;
    out.flush()
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
