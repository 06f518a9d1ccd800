//! Distance domain, the pinch → brightness mapper, and the setter seam.

use thiserror::Error;

use crate::geometry::{pinch_distance, FingerPair};
use crate::level::BrightnessLevel;

// ════════════════════════════════════════════════════════════════════════════
// DistanceDomain
// ════════════════════════════════════════════════════════════════════════════

/// Rejected `[d_min, d_max]` pair.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum DomainError {
    #[error("distance domain bounds must be finite")]
    NonFinite,

    #[error("distance domain is empty: d_min ({d_min}) must be below d_max ({d_max})")]
    Empty { d_min: f64, d_max: f64 },
}

/// Pixel-distance range mapped onto `0..=100` %.
///
/// `d_min` is the distance of a closed pinch and `d_max` of a fully open one,
/// both as seen by a typical webcam at arm's length.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DistanceDomain {
    d_min: f64,
    d_max: f64,
}

impl DistanceDomain {
    /// Empirically tuned for a 640×480 webcam frame.
    pub const DEFAULT_MIN: f64 = 15.0;
    pub const DEFAULT_MAX: f64 = 220.0;

    pub fn new(d_min: f64, d_max: f64) -> Result<Self, DomainError> {
        if !d_min.is_finite() || !d_max.is_finite() {
            return Err(DomainError::NonFinite);
        }
        if d_min >= d_max {
            return Err(DomainError::Empty { d_min, d_max });
        }
        Ok(DistanceDomain { d_min, d_max })
    }

    pub fn d_min(&self) -> f64 { self.d_min }
    pub fn d_max(&self) -> f64 { self.d_max }

    /// Linear remap of `distance` from `[d_min, d_max]` into `[0, 100]`,
    /// clamped at both ends.  NaN yields 0; infinities clamp like any
    /// other out-of-range distance.
    pub fn interpolate(&self, distance: f64) -> f64 {
        if distance.is_nan() {
            return 0.0;
        }
        let t = (distance - self.d_min) / (self.d_max - self.d_min);
        (t * 100.0).clamp(0.0, 100.0)
    }
}

impl Default for DistanceDomain {
    fn default() -> Self {
        DistanceDomain { d_min: Self::DEFAULT_MIN, d_max: Self::DEFAULT_MAX }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// BrightnessSetter — seam to the OS brightness API
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can push a brightness percentage to a display.
pub trait BrightnessSetter {
    type Error;

    fn set_brightness(&mut self, level: BrightnessLevel) -> Result<(), Self::Error>;
}

impl<S: BrightnessSetter + ?Sized> BrightnessSetter for &mut S {
    type Error = S::Error;

    fn set_brightness(&mut self, level: BrightnessLevel) -> Result<(), Self::Error> {
        (**self).set_brightness(level)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// BrightnessMapper
// ════════════════════════════════════════════════════════════════════════════

/// Distance and level computed for one finger pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Measurement {
    pub distance: f64,
    pub level:    BrightnessLevel,
}

/// Stateless pinch → brightness transform.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BrightnessMapper {
    domain: DistanceDomain,
}

impl BrightnessMapper {
    pub fn new(domain: DistanceDomain) -> Self {
        BrightnessMapper { domain }
    }

    pub fn domain(&self) -> &DistanceDomain {
        &self.domain
    }

    /// Distance, remap, clamp, round.
    pub fn measure(&self, pair: &FingerPair) -> Measurement {
        let distance = pinch_distance(pair);
        let level    = BrightnessLevel::from_percent(self.domain.interpolate(distance));
        Measurement { distance, level }
    }

    pub fn map(&self, pair: &FingerPair) -> BrightnessLevel {
        self.measure(pair).level
    }

    /// Compute the level for `pair` and hand it to `setter` exactly once.
    ///
    /// The setter's error is returned untouched; nothing is retried.
    pub fn apply<S: BrightnessSetter>(
        &self,
        pair:   &FingerPair,
        setter: &mut S,
    ) -> Result<Measurement, S::Error> {
        let m = self.measure(pair);
        setter.set_brightness(m.level)?;
        Ok(m)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    fn mapper_20_200() -> BrightnessMapper {
        BrightnessMapper::new(DistanceDomain::new(20.0, 200.0).unwrap())
    }

    fn horizontal(len: f64) -> FingerPair {
        FingerPair::new(Point::new(0.0, 0.0), Point::new(len, 0.0))
    }

    /// Records every level it receives; optionally fails.
    #[derive(Default)]
    struct Recorder {
        seen: Vec<BrightnessLevel>,
        fail: bool,
    }

    impl BrightnessSetter for Recorder {
        type Error = &'static str;

        fn set_brightness(&mut self, level: BrightnessLevel) -> Result<(), Self::Error> {
            self.seen.push(level);
            if self.fail { Err("permission denied") } else { Ok(()) }
        }
    }

    #[test]
    fn domain_rejects_inverted_bounds() {
        assert_eq!(
            DistanceDomain::new(200.0, 20.0),
            Err(DomainError::Empty { d_min: 200.0, d_max: 20.0 })
        );
        assert!(DistanceDomain::new(50.0, 50.0).is_err());
    }

    #[test]
    fn domain_rejects_non_finite() {
        assert_eq!(DistanceDomain::new(f64::NAN, 10.0), Err(DomainError::NonFinite));
        assert_eq!(DistanceDomain::new(0.0, f64::INFINITY), Err(DomainError::NonFinite));
    }

    #[test]
    fn default_domain() {
        let d = DistanceDomain::default();
        assert_eq!(d.d_min(), 15.0);
        assert_eq!(d.d_max(), 220.0);
    }

    #[test]
    fn coincident_tips_give_zero() {
        let p = Point::new(100.0, 100.0);
        let m = BrightnessMapper::default().measure(&FingerPair::new(p, p));
        assert_eq!(m.distance, 0.0);
        assert_eq!(m.level, BrightnessLevel::MIN);
    }

    #[test]
    fn full_pinch_gives_100() {
        let m = mapper_20_200().measure(&horizontal(200.0));
        assert_eq!(m.distance, 200.0);
        assert_eq!(m.level, BrightnessLevel::MAX);
    }

    #[test]
    fn midpoint_gives_50() {
        assert_eq!(mapper_20_200().map(&horizontal(110.0)).percent(), 50);
    }

    #[test]
    fn beyond_domain_is_clamped() {
        let m = mapper_20_200();
        assert_eq!(m.map(&horizontal(5.0)), BrightnessLevel::MIN);
        assert_eq!(m.map(&horizontal(20.0)), BrightnessLevel::MIN);
        assert_eq!(m.map(&horizontal(900.0)), BrightnessLevel::MAX);
    }

    #[test]
    fn interpolate_nan_is_zero() {
        let d = DistanceDomain::default();
        assert_eq!(d.interpolate(f64::NAN), 0.0);
    }

    #[test]
    fn interpolate_infinities_clamp() {
        let d = DistanceDomain::new(20.0, 200.0).unwrap();
        assert_eq!(d.interpolate(1e300), 100.0);
        assert_eq!(d.interpolate(f64::INFINITY), 100.0);
        assert_eq!(d.interpolate(f64::NEG_INFINITY), 0.0);
    }

    #[test]
    fn overflowing_pair_is_full_brightness() {
        let pair = FingerPair::new(Point::new(-1e308, 0.0), Point::new(1e308, 0.0));
        let m = mapper_20_200().measure(&pair);
        assert_eq!(m.distance, f64::INFINITY);
        assert_eq!(m.level, BrightnessLevel::MAX);
    }

    #[test]
    fn apply_calls_setter_once() {
        let mut rec = Recorder::default();
        let m = mapper_20_200().apply(&horizontal(110.0), &mut rec).unwrap();
        assert_eq!(m.level.percent(), 50);
        assert_eq!(rec.seen, vec![m.level]);
    }

    #[test]
    fn apply_surfaces_setter_failure() {
        let mut rec = Recorder { fail: true, ..Recorder::default() };
        let err = mapper_20_200().apply(&horizontal(200.0), &mut rec).unwrap_err();
        assert_eq!(err, "permission denied");
        // The value was still attempted.
        assert_eq!(rec.seen, vec![BrightnessLevel::MAX]);
    }

    #[test]
    fn apply_through_mut_ref() {
        let mut rec = Recorder::default();
        {
            let mut by_ref = &mut rec;
            mapper_20_200().apply(&horizontal(0.0), &mut by_ref).unwrap();
        }
        assert_eq!(rec.seen.len(), 1);
    }
}
