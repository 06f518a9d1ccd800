//! Window front-end using `minifb`.
//!
//! Shows each frame scaled to the window with the debug overlay on top,
//! turns the mouse into [`SimInput`] for the simulated detector, and watches
//! for the quit keys.

use std::sync::mpsc::Sender;
use std::time::Duration;

use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use crate::app::FrameReport;
use crate::error::{AppError, Result};
use crate::gesture::SimInput;
use crate::overlay::{render_overlay, Canvas, OverlayState};

const TITLE:    &str = "Pinch Brightness";
const BG_COLOR: u32  = 0x1A1A2E;

#[cfg(feature = "camera")]
const LEGEND: &str = "Pinch thumb + index  Q/Esc=quit";
#[cfg(not(feature = "camera"))]
const LEGEND: &str = "LMB=index  RMB=thumb  Q/Esc=quit";

// ════════════════════════════════════════════════════════════════════════════
// PointerForward — mouse state → SimInput
// ════════════════════════════════════════════════════════════════════════════

/// Forwards the mouse to the simulated detector.  Sends `PointerLost` once
/// when the cursor leaves the window, and goes quiet for good once the
/// receiving end has been dropped (camera mode).
struct PointerForward {
    tx:        Sender<SimInput>,
    seen:      bool,
    listening: bool,
}

impl PointerForward {
    fn new(tx: Sender<SimInput>) -> Self {
        PointerForward { tx, seen: false, listening: true }
    }

    /// Returns false once nothing is listening.
    fn forward(&mut self, pos: Option<(f32, f32)>, left: bool, right: bool) -> bool {
        if !self.listening {
            return false;
        }
        let event = match pos {
            Some((x, y)) => {
                self.seen = true;
                SimInput::Pointer { x, y, left, right }
            }
            None if self.seen => {
                self.seen = false;
                SimInput::PointerLost
            }
            None => return true,
        };
        if self.tx.send(event).is_err() {
            tracing::debug!("no simulated detector; mouse forwarding off");
            self.listening = false;
        }
        self.listening
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window:  Window,
    canvas:  Canvas,
    pointer: PointerForward,
}

impl Visualizer {
    pub fn new(width: usize, height: usize, sim_tx: Sender<SimInput>) -> Result<Self> {
        let mut window = Window::new(
            TITLE,
            width,
            height,
            WindowOptions { resize: false, ..WindowOptions::default() },
        )
        .map_err(|e| AppError::Window(e.to_string()))?;

        window.limit_update_rate(Some(Duration::from_millis(16))); // ~60fps

        let mut canvas = Canvas::new(width, height);
        canvas.clear(BG_COLOR);

        Ok(Visualizer { window, canvas, pointer: PointerForward::new(sim_tx) })
    }

    /// Window size in pixels; pointer coordinates are in this space.
    pub fn size(&self) -> (usize, usize) {
        (self.canvas.width, self.canvas.height)
    }

    /// Forward mouse state and check the quit keys.  Returns false when the
    /// window should close.
    pub fn poll_input(&mut self) -> bool {
        if !self.window.is_open() {
            return false;
        }
        if self.window.is_key_pressed(Key::Q, KeyRepeat::No)
            || self.window.is_key_pressed(Key::Escape, KeyRepeat::No)
        {
            tracing::info!("quit requested");
            return false;
        }

        if self.pointer.listening {
            let pos   = self.window.get_mouse_pos(MouseMode::Discard);
            let left  = self.window.get_mouse_down(MouseButton::Left);
            let right = self.window.get_mouse_down(MouseButton::Right);
            self.pointer.forward(pos, left, right);
        }

        true
    }

    /// Draw `report` and present it.
    pub fn render(&mut self, report: &FrameReport) -> Result<()> {
        let frame = &report.frame;
        if frame.is_empty() {
            self.canvas.clear(BG_COLOR);
        } else {
            self.canvas.blit_scaled(frame);
        }

        let scale = if frame.is_empty() {
            (1.0, 1.0)
        } else {
            (
                self.canvas.width as f64 / frame.width as f64,
                self.canvas.height as f64 / frame.height as f64,
            )
        };
        let state = OverlayState::from_report(report, scale, LEGEND);
        render_overlay(&mut self.canvas, &state);

        self.window
            .update_with_buffer(self.canvas.buffer(), self.canvas.width, self.canvas.height)
            .map_err(|e| AppError::Window(e.to_string()))
    }
}
