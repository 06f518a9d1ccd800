//! # pinch_brightness
//!
//! Hand-gesture display brightness controller.  Each frame the distance
//! between the thumb tip and the index fingertip is mapped onto 0–100 % and
//! applied to the display backlight, while a window shows the frame with
//! the tracked tips, the pinch line, and the current level.
//!
//! ## Pipeline
//!
//! | Stage | Module | Source |
//! |---|---|---|
//! | Capture | [`capture`] | webcam (`nokhwa`) or synthetic backdrop |
//! | Detect | [`gesture`] | MediaPipe helper process or the mouse |
//! | Map | [`pinch_map`] | linear, clamped, rounded to whole percent |
//! | Apply | [`backlight`] | `brightness` crate, or dry-run logging |
//! | Show | [`overlay`], [`visualizer`] | `minifb` window |
//!
//! ## Feature flags
//!
//! * (default) — **Simulation mode**: the mouse plays the hand.
//! * `camera` — **Hardware mode**: real webcam frames, landmarks from
//!   `scripts/hand_detect.py` (needs Python with `mediapipe` and `numpy`).
//!
//! ### Simulation controls
//!
//! | Input | Effect |
//! |---|---|
//! | Left button held | index tip follows the cursor (hand in view) |
//! | Right button | move the thumb tip to the cursor |
//! | Left button released | no hand; brightness stays where it was |
//! | `Q` / `Escape` | Quit |
//!
//! Set `PINCH_DRY_RUN=1` to log levels instead of changing the backlight.
//! See [`config`] for the other environment variables.

pub mod app;
pub mod backlight;
pub mod capture;
pub mod config;
pub mod error;
pub mod gesture;
pub mod logging;
pub mod overlay;
pub mod visualizer;
