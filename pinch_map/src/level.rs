//! Integer brightness percentage.

use std::fmt;

/// Display brightness as an integer percentage, always within `0..=100`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BrightnessLevel(u8);

impl BrightnessLevel {
    pub const MIN: BrightnessLevel = BrightnessLevel(0);
    pub const MAX: BrightnessLevel = BrightnessLevel(100);

    /// `None` if `percent` is above 100.
    pub const fn new(percent: u8) -> Option<Self> {
        if percent <= 100 { Some(BrightnessLevel(percent)) } else { None }
    }

    /// Clamp a real-valued percentage into `0..=100` and round to the nearest
    /// integer (halves away from zero).  NaN maps to 0.
    pub fn from_percent(value: f64) -> Self {
        if value.is_nan() {
            return BrightnessLevel::MIN;
        }
        let clamped = value.clamp(0.0, 100.0).round();
        // In range after the clamp, so the cast cannot truncate.
        BrightnessLevel(clamped as u8)
    }

    pub const fn percent(self) -> u8 {
        self.0
    }

    /// Fraction of full brightness, `0.0..=1.0`.
    pub fn fraction(self) -> f32 {
        f32::from(self.0) / 100.0
    }
}

impl fmt::Display for BrightnessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl From<BrightnessLevel> for u32 {
    fn from(level: BrightnessLevel) -> u32 {
        u32::from(level.0)
    }
}
