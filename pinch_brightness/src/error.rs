//! Error types for the brightness controller.
//!
//! Each external seam (camera, hand detector, display backlight, config) has
//! its own enum so the frame loop can tell fatal failures (capture, detector)
//! from per-frame ones (backlight).  Underlying errors are kept as `#[source]`.

use std::path::PathBuf;

use thiserror::Error;

use pinch_map::DomainError;

/// Frame capture failed. Fatal to the run.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The camera could not be opened or its stream could not be started.
    #[error("failed to open camera {index}: {reason}")]
    Open { index: u32, reason: String },

    /// Reading a frame from an open camera failed.
    #[error("failed to read frame: {0}")]
    Read(String),

    /// A frame was read but could not be decoded to RGB.
    #[error("failed to decode frame: {0}")]
    Decode(String),
}

/// The hand-landmark detector could not be started or talked to.
#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("failed to start hand detector `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("hand detector script not found at {}", .0.display())]
    ScriptMissing(PathBuf),

    /// The helper did not announce itself with `READY`.
    #[error("hand detector did not signal ready, got: {0:?}")]
    NotReady(String),

    #[error("hand detector I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed hand detector response {line:?}: {source}")]
    Protocol {
        line: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Setting the display brightness failed.  Reported per frame; the loop
/// keeps running.
#[derive(Debug, Error)]
pub enum BrightnessError {
    #[error("no controllable display found")]
    NoDisplay,

    #[error("display {device} rejected brightness change: {source}")]
    Device {
        device: String,
        #[source]
        source: brightness::Error,
    },

    #[error("failed to enumerate displays: {0}")]
    Enumerate(#[source] brightness::Error),
}

/// Invalid configuration value.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var:    &'static str,
        value:  String,
        reason: String,
    },

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Anything that ends the run.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("capture failed: {0}")]
    Capture(#[from] CaptureError),

    #[error("hand detection failed: {0}")]
    Detector(#[from] DetectorError),

    #[error("window error: {0}")]
    Window(String),

    #[error("logging setup failed: {0}")]
    Logging(String),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result alias for the frame loop.
pub type Result<T> = std::result::Result<T, AppError>;
