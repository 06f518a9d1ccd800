//! # pinch_map
//!
//! Maps a thumb/index "pinch" to a display-brightness percentage.
//!
//! ```text
//!   thumb tip ●─────────● index tip
//!             └─ distance (px) ─┘
//!                      │
//!        [d_min, d_max] → [0, 100]   (linear, clamped, rounded)
//!                      │
//!              BrightnessLevel (0–100 %)
//! ```
//!
//! The transform is stateless: the same [`FingerPair`] always yields the same
//! [`BrightnessLevel`].  Applying the level goes through the
//! [`BrightnessSetter`] trait so the OS backend (or a test double) can be
//! plugged in, and any failure it reports is handed straight back to the
//! caller.
//!
//! ## Example
//!
//! ```
//! use pinch_map::{BrightnessMapper, DistanceDomain, FingerPair, Point};
//!
//! let mapper = BrightnessMapper::new(DistanceDomain::new(20.0, 200.0).unwrap());
//! let pair   = FingerPair::new(Point::new(0.0, 0.0), Point::new(110.0, 0.0));
//! assert_eq!(mapper.map(&pair).percent(), 50);
//! ```

pub mod geometry;
pub mod level;
pub mod mapper;

pub use geometry::{pinch_distance, FingerPair, Point};
pub use level::BrightnessLevel;
pub use mapper::{BrightnessMapper, BrightnessSetter, DistanceDomain, DomainError, Measurement};
