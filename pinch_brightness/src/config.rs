//! Run-time configuration.
//!
//! Everything has a sensible default; the environment may override any of
//! it.  There are no command-line flags.
//!
//! | Variable | Meaning | Default |
//! |---|---|---|
//! | `PINCH_CAMERA_INDEX` | webcam index | `0` |
//! | `PINCH_FRAME_WIDTH` / `PINCH_FRAME_HEIGHT` | requested frame size | `640` / `480` |
//! | `PINCH_D_MIN` / `PINCH_D_MAX` | pinch distance (px) for 0 % / 100 % | `15` / `220` |
//! | `PINCH_MIN_CONFIDENCE` | detector score threshold, 0–1 | `0.7` |
//! | `PINCH_DETECTOR_PYTHON` | interpreter for the MediaPipe helper | `python3` |
//! | `PINCH_DETECTOR_SCRIPT` | path of the MediaPipe helper | `scripts/hand_detect.py` |
//! | `PINCH_DRY_RUN` | log brightness instead of setting it | `false` |

use std::path::PathBuf;
use std::str::FromStr;

use pinch_map::DistanceDomain;

use crate::error::ConfigError;

/// Configuration for the full application.
#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub camera_index:     u32,
    pub frame_width:      usize,
    pub frame_height:     usize,
    pub domain:           DistanceDomain,
    /// Hands scoring below this are ignored.
    pub min_confidence:   f32,
    pub detector_python:  String,
    pub detector_script:  PathBuf,
    /// Use the logging backend instead of touching the real backlight.
    pub dry_run:          bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            camera_index:    0,
            frame_width:     640,
            frame_height:    480,
            domain:          DistanceDomain::default(),
            min_confidence:  0.7,
            detector_python: "python3".to_string(),
            detector_script: PathBuf::from("scripts/hand_detect.py"),
            dry_run:         false,
        }
    }
}

impl AppConfig {
    /// Defaults overlaid with `PINCH_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with whatever `lookup` returns for each variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = AppConfig::default();

        if let Some(v) = parse_var(&lookup, "PINCH_CAMERA_INDEX")? {
            cfg.camera_index = v;
        }
        if let Some(v) = parse_dimension(&lookup, "PINCH_FRAME_WIDTH")? {
            cfg.frame_width = v;
        }
        if let Some(v) = parse_dimension(&lookup, "PINCH_FRAME_HEIGHT")? {
            cfg.frame_height = v;
        }

        let d_min = parse_var(&lookup, "PINCH_D_MIN")?.unwrap_or(cfg.domain.d_min());
        let d_max = parse_var(&lookup, "PINCH_D_MAX")?.unwrap_or(cfg.domain.d_max());
        cfg.domain = DistanceDomain::new(d_min, d_max)?;

        if let Some(raw) = lookup("PINCH_MIN_CONFIDENCE") {
            let v: f32 = parse_value("PINCH_MIN_CONFIDENCE", &raw)?;
            if !(0.0..=1.0).contains(&v) {
                return Err(invalid("PINCH_MIN_CONFIDENCE", &raw, "must be between 0 and 1"));
            }
            cfg.min_confidence = v;
        }

        if let Some(v) = lookup("PINCH_DETECTOR_PYTHON").filter(|s| !s.trim().is_empty()) {
            cfg.detector_python = v.trim().to_string();
        }
        if let Some(v) = lookup("PINCH_DETECTOR_SCRIPT").filter(|s| !s.trim().is_empty()) {
            cfg.detector_script = PathBuf::from(v.trim());
        }
        if let Some(raw) = lookup("PINCH_DRY_RUN") {
            cfg.dry_run = parse_flag("PINCH_DRY_RUN", &raw)?;
        }

        Ok(cfg)
    }
}

// ── parsing helpers ───────────────────────────────────────────────────────

fn invalid(var: &'static str, value: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { var, value: value.to_string(), reason: reason.into() }
}

fn parse_value<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| invalid(var, raw, e.to_string()))
}

fn parse_var<T, F>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    lookup(var).map(|raw| parse_value(var, &raw)).transpose()
}

fn parse_dimension<F>(lookup: &F, var: &'static str) -> Result<Option<usize>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(raw) => {
            let v: usize = parse_value(var, &raw)?;
            if !(16..=4096).contains(&v) {
                return Err(invalid(var, &raw, "must be between 16 and 4096"));
            }
            Ok(Some(v))
        }
    }
}

fn parse_flag(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on"  => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(invalid(var, raw, "expected a boolean (1/0, true/false, yes/no, on/off)")),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.domain.d_min(), 15.0);
        assert_eq!(cfg.domain.d_max(), 220.0);
        assert!(!cfg.dry_run);
    }

    #[test]
    fn overrides_apply() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("PINCH_CAMERA_INDEX", "2"),
            ("PINCH_D_MIN", "20"),
            ("PINCH_D_MAX", " 200 "),
            ("PINCH_MIN_CONFIDENCE", "0.5"),
            ("PINCH_DRY_RUN", "yes"),
            ("PINCH_DETECTOR_SCRIPT", "/opt/hand.py"),
        ]))
        .unwrap();
        assert_eq!(cfg.camera_index, 2);
        assert_eq!(cfg.domain, DistanceDomain::new(20.0, 200.0).unwrap());
        assert_eq!(cfg.min_confidence, 0.5);
        assert!(cfg.dry_run);
        assert_eq!(cfg.detector_script, PathBuf::from("/opt/hand.py"));
    }

    #[test]
    fn malformed_number_is_invalid() {
        let err = AppConfig::from_lookup(lookup(&[("PINCH_CAMERA_INDEX", "front")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "PINCH_CAMERA_INDEX", .. }));
    }

    #[test]
    fn inverted_domain_is_rejected() {
        let err = AppConfig::from_lookup(lookup(&[("PINCH_D_MIN", "300")])).unwrap_err();
        assert!(matches!(err, ConfigError::Domain(_)));
    }

    #[test]
    fn confidence_out_of_range() {
        let err = AppConfig::from_lookup(lookup(&[("PINCH_MIN_CONFIDENCE", "1.5")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "PINCH_MIN_CONFIDENCE", .. }));
    }

    #[test]
    fn bad_flag_is_invalid() {
        let err = AppConfig::from_lookup(lookup(&[("PINCH_DRY_RUN", "maybe")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "PINCH_DRY_RUN", .. }));
    }

    #[test]
    fn tiny_frame_is_rejected() {
        let err = AppConfig::from_lookup(lookup(&[("PINCH_FRAME_WIDTH", "4")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "PINCH_FRAME_WIDTH", .. }));
    }
}
