//! Display brightness output.
//!
//! [`OsBrightness`] drives every controllable display through the
//! `brightness` crate; [`DryRunBrightness`] only logs.  [`Backlight`] picks
//! one at startup so the frame loop has a single concrete setter type.

use brightness::blocking::{brightness_devices, Brightness, BrightnessDevice};
use pinch_map::{BrightnessLevel, BrightnessSetter};

use crate::error::BrightnessError;

// ════════════════════════════════════════════════════════════════════════════
// OsBrightness — brightness crate backend
// ════════════════════════════════════════════════════════════════════════════

struct Display {
    name:   String,
    device: BrightnessDevice,
}

/// Sets the same percentage on every display found at startup.
pub struct OsBrightness {
    displays: Vec<Display>,
}

impl OsBrightness {
    /// Enumerate displays.  Devices that fail to enumerate are logged and
    /// skipped; finding none is not an error here, but every later
    /// [`set_brightness`](BrightnessSetter::set_brightness) will report
    /// [`BrightnessError::NoDisplay`].
    pub fn open() -> Self {
        let mut displays = Vec::new();

        for dev in brightness_devices() {
            let device = match dev {
                Ok(d)  => d,
                Err(e) => {
                    tracing::warn!("skipping display: {}", BrightnessError::Enumerate(e));
                    continue;
                }
            };
            let name = device
                .device_name()
                .unwrap_or_else(|_| format!("display{}", displays.len()));
            match device.get() {
                Ok(pct) => tracing::info!(display = %name, current = pct, "found display"),
                Err(e)  => tracing::info!(display = %name, "found display (brightness unreadable: {e})"),
            }
            displays.push(Display { name, device });
        }

        if displays.is_empty() {
            tracing::warn!("no controllable display found; brightness changes will fail");
        }
        OsBrightness { displays }
    }

    pub fn display_count(&self) -> usize {
        self.displays.len()
    }
}

impl BrightnessSetter for OsBrightness {
    type Error = BrightnessError;

    /// Applies to all displays.  Displays that accept the value keep it even
    /// if another one fails; the first failure is returned.
    fn set_brightness(&mut self, level: BrightnessLevel) -> Result<(), BrightnessError> {
        if self.displays.is_empty() {
            return Err(BrightnessError::NoDisplay);
        }

        let mut first_err = None;
        for d in &self.displays {
            if let Err(source) = d.device.set(u32::from(level)) {
                if first_err.is_none() {
                    first_err = Some(BrightnessError::Device { device: d.name.clone(), source });
                }
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// DryRunBrightness — logging-only backend
// ════════════════════════════════════════════════════════════════════════════

/// Logs each level instead of touching the hardware.  Never fails.
#[derive(Debug, Default)]
pub struct DryRunBrightness {
    last: Option<BrightnessLevel>,
}

impl DryRunBrightness {
    pub fn last(&self) -> Option<BrightnessLevel> {
        self.last
    }
}

impl BrightnessSetter for DryRunBrightness {
    type Error = BrightnessError;

    fn set_brightness(&mut self, level: BrightnessLevel) -> Result<(), BrightnessError> {
        if self.last != Some(level) {
            tracing::info!(%level, "dry run: would set brightness");
        }
        self.last = Some(level);
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Backlight — selected at startup
// ════════════════════════════════════════════════════════════════════════════

pub enum Backlight {
    Os(OsBrightness),
    DryRun(DryRunBrightness),
}

impl Backlight {
    pub fn open(dry_run: bool) -> Self {
        if dry_run {
            tracing::info!("dry run: display brightness will not be changed");
            Backlight::DryRun(DryRunBrightness::default())
        } else {
            Backlight::Os(OsBrightness::open())
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Backlight::Os(os)   => format!("{} display(s)", os.display_count()),
            Backlight::DryRun(_) => "dry run".to_string(),
        }
    }
}

impl BrightnessSetter for Backlight {
    type Error = BrightnessError;

    fn set_brightness(&mut self, level: BrightnessLevel) -> Result<(), BrightnessError> {
        match self {
            Backlight::Os(os)     => os.set_brightness(level),
            Backlight::DryRun(dr) => dr.set_brightness(level),
        }
    }
}
