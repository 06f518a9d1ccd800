//! Top-level frame loop.
//!
//! `FrameLoop` owns the frame source (the camera handle), the hand detector,
//! the brightness setter, and the last brightness that was actually applied.
//! Nothing else reads or writes any of them.  `run()` wires a loop to the
//! visualizer and drives it until the user quits or capture fails.

use std::sync::mpsc;

use pinch_map::{BrightnessLevel, BrightnessMapper, BrightnessSetter};

use crate::backlight::Backlight;
use crate::capture::{Frame, FrameSource};
use crate::config::AppConfig;
use crate::error::{BrightnessError, Result};
use crate::gesture::{HandDetector, SimInput, TrackedHand};
use crate::visualizer::Visualizer;

// ════════════════════════════════════════════════════════════════════════════
// FrameReport — what happened this frame
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
pub enum FrameOutcome {
    /// No hand in view; the setter was not called.  `retained` is the level
    /// still in effect from an earlier frame, if any.
    NoHand { retained: Option<BrightnessLevel> },

    /// Level computed and accepted by the setter.
    Applied { level: BrightnessLevel, distance: f64 },

    /// Level computed but the setter refused it.  `retained` is unchanged.
    SetterFailed {
        level:    BrightnessLevel,
        distance: f64,
        retained: Option<BrightnessLevel>,
        error:    BrightnessError,
    },
}

#[derive(Debug)]
pub struct FrameReport {
    pub frame:   Frame,
    pub hand:    Option<TrackedHand>,
    pub outcome: FrameOutcome,
}

// ════════════════════════════════════════════════════════════════════════════
// FrameLoop
// ════════════════════════════════════════════════════════════════════════════

pub struct FrameLoop<S, D, B> {
    source:   S,
    detector: D,
    setter:   B,
    mapper:   BrightnessMapper,

    // ── state carried across frames ──────────────────────────────────────
    last_applied:   Option<BrightnessLevel>,
    setter_failing: bool,
}

impl<S, D, B> FrameLoop<S, D, B>
where
    S: FrameSource,
    D: HandDetector,
    B: BrightnessSetter<Error = BrightnessError>,
{
    pub fn new(source: S, detector: D, setter: B, mapper: BrightnessMapper) -> Self {
        FrameLoop {
            source,
            detector,
            setter,
            mapper,
            last_applied:   None,
            setter_failing: false,
        }
    }

    pub fn last_applied(&self) -> Option<BrightnessLevel> {
        self.last_applied
    }

    /// Run one frame through the pipeline.
    ///
    /// Capture and detector failures end the run.  A setter failure is
    /// reported in the returned outcome and the next frame tries again.
    pub fn step(&mut self) -> Result<FrameReport> {
        let frame = self.source.next_frame()?;
        let hand  = self.detector.detect(&frame)?;

        let outcome = match &hand {
            None => FrameOutcome::NoHand { retained: self.last_applied },
            Some(h) => {
                let m = self.mapper.measure(&h.fingers);
                match self.setter.set_brightness(m.level) {
                    Ok(()) => {
                        if self.setter_failing {
                            tracing::info!(level = %m.level, "brightness control recovered");
                            self.setter_failing = false;
                        }
                        if self.last_applied != Some(m.level) {
                            tracing::info!(level = %m.level, distance = m.distance, "brightness changed");
                        } else {
                            tracing::debug!(level = %m.level, distance = m.distance, "brightness");
                        }
                        self.last_applied = Some(m.level);
                        FrameOutcome::Applied { level: m.level, distance: m.distance }
                    }
                    Err(error) => {
                        if self.setter_failing {
                            tracing::debug!(level = %m.level, "brightness still not applied: {error}");
                        } else {
                            tracing::warn!(level = %m.level, "brightness not applied: {error}");
                            self.setter_failing = true;
                        }
                        FrameOutcome::SetterFailed {
                            level:    m.level,
                            distance: m.distance,
                            retained: self.last_applied,
                            error,
                        }
                    }
                }
            }
        };

        Ok(FrameReport { frame, hand, outcome })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the full application.
///
/// Builds the frame source and detector (simulation by default, webcam +
/// MediaPipe with `--features camera`), the configured backlight, and the
/// visualizer, then loops at ~60 fps until `Q`/`Escape` or window close.
pub fn run(cfg: AppConfig) -> Result<()> {
    // ── Sim input channel (window → simulated detector) ──────────────────
    let (sim_tx, sim_rx) = mpsc::channel::<SimInput>();

    // ── Visualizer (owns the window and the sim input sender) ────────────
    let mut vis = Visualizer::new(cfg.frame_width, cfg.frame_height, sim_tx)?;

    let backlight = Backlight::open(cfg.dry_run);
    tracing::info!(output = %backlight.describe(), "brightness output ready");

    let mapper = BrightnessMapper::new(cfg.domain);
    tracing::info!(
        d_min = cfg.domain.d_min(),
        d_max = cfg.domain.d_max(),
        "pinch distance domain"
    );

    #[cfg(feature = "camera")]
    let mut frames = {
        use crate::capture::CameraSource;
        use crate::gesture::MediaPipeDetector;

        drop(sim_rx);
        let source = CameraSource::open(cfg.camera_index, cfg.frame_width, cfg.frame_height)?;
        let detector = MediaPipeDetector::spawn(
            &cfg.detector_python,
            &cfg.detector_script,
            cfg.min_confidence,
        )?;
        FrameLoop::new(source, detector, backlight, mapper)
    };

    #[cfg(not(feature = "camera"))]
    let mut frames = {
        use crate::capture::SimFrameSource;
        use crate::gesture::SimHandDetector;

        let source = SimFrameSource::new(cfg.frame_width, cfg.frame_height);
        let detector = SimHandDetector::new(sim_rx, vis.size());
        FrameLoop::new(source, detector, backlight, mapper)
    };

    // ── Main loop ─────────────────────────────────────────────────────────
    while vis.poll_input() {
        let report = frames.step()?;
        vis.render(&report)?;
    }

    tracing::info!(last = ?frames.last_applied().map(BrightnessLevel::percent), "quit");
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    use pinch_map::{DistanceDomain, FingerPair, Point};

    use crate::error::{AppError, CaptureError, DetectorError};
    use crate::gesture::Handedness;

    // ── test doubles ──────────────────────────────────────────────────────

    /// Yields `left` blank frames, then fails.
    struct CountedFrames { left: usize }

    impl FrameSource for CountedFrames {
        fn next_frame(&mut self) -> std::result::Result<Frame, CaptureError> {
            if self.left == 0 {
                return Err(CaptureError::Read("camera unplugged".into()));
            }
            self.left -= 1;
            Ok(Frame::filled(320, 240, 0))
        }
    }

    /// Plays back a script of hands, one per frame; `None` = no hand.
    struct Scripted(VecDeque<Option<FingerPair>>);

    impl HandDetector for Scripted {
        fn detect(&mut self, _: &Frame) -> std::result::Result<Option<TrackedHand>, DetectorError> {
            Ok(self.0.pop_front().flatten().map(|fingers| TrackedHand {
                handedness: Handedness::Right,
                score:      1.0,
                fingers,
                landmarks:  Vec::new(),
            }))
        }
    }

    struct BrokenDetector;

    impl HandDetector for BrokenDetector {
        fn detect(&mut self, _: &Frame) -> std::result::Result<Option<TrackedHand>, DetectorError> {
            Err(DetectorError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "helper died",
            )))
        }
    }

    /// Records calls; fails while `fail` is set.  Shared so tests can flip it
    /// and inspect calls while the loop owns the setter.
    #[derive(Default)]
    struct SetterLog {
        calls: Vec<BrightnessLevel>,
        fail:  bool,
    }

    #[derive(Clone, Default)]
    struct SharedSetter(Rc<RefCell<SetterLog>>);

    impl BrightnessSetter for SharedSetter {
        type Error = BrightnessError;

        fn set_brightness(&mut self, level: BrightnessLevel) -> std::result::Result<(), BrightnessError> {
            let mut p = self.0.borrow_mut();
            p.calls.push(level);
            if p.fail { Err(BrightnessError::NoDisplay) } else { Ok(()) }
        }
    }

    fn pair(len: f64) -> Option<FingerPair> {
        Some(FingerPair::new(Point::new(0.0, 0.0), Point::new(len, 0.0)))
    }

    fn mapper() -> BrightnessMapper {
        BrightnessMapper::new(DistanceDomain::new(20.0, 200.0).unwrap())
    }

    fn make_loop(
        script: Vec<Option<FingerPair>>,
    ) -> (FrameLoop<CountedFrames, Scripted, SharedSetter>, SharedSetter) {
        let setter = SharedSetter::default();
        let lp = FrameLoop::new(
            CountedFrames { left: script.len() },
            Scripted(script.into()),
            setter.clone(),
            mapper(),
        );
        (lp, setter)
    }

    // ── tests ─────────────────────────────────────────────────────────────

    #[test]
    fn hand_applies_brightness() {
        let (mut lp, setter) = make_loop(vec![pair(110.0)]);
        let r = lp.step().unwrap();
        assert!(matches!(r.outcome, FrameOutcome::Applied { distance, .. } if distance == 110.0));
        assert_eq!(lp.last_applied().map(BrightnessLevel::percent), Some(50));
        assert_eq!(setter.0.borrow().calls.len(), 1);
    }

    #[test]
    fn no_hand_does_not_call_setter() {
        let (mut lp, setter) = make_loop(vec![pair(200.0), None, None]);
        lp.step().unwrap();
        let r = lp.step().unwrap();
        assert!(matches!(r.outcome, FrameOutcome::NoHand { retained: Some(l) } if l == BrightnessLevel::MAX));
        lp.step().unwrap();
        assert_eq!(setter.0.borrow().calls, vec![BrightnessLevel::MAX]);
        assert_eq!(lp.last_applied(), Some(BrightnessLevel::MAX));
    }

    #[test]
    fn no_hand_on_first_frame_retains_nothing() {
        let (mut lp, _setter) = make_loop(vec![None]);
        let r = lp.step().unwrap();
        assert!(matches!(r.outcome, FrameOutcome::NoHand { retained: None }));
        assert!(r.hand.is_none());
    }

    #[test]
    fn setter_failure_is_reported_and_loop_continues() {
        let (mut lp, setter) = make_loop(vec![pair(200.0), pair(20.0), pair(110.0)]);
        lp.step().unwrap();

        setter.0.borrow_mut().fail = true;
        let r = lp.step().unwrap();
        match r.outcome {
            FrameOutcome::SetterFailed { level, retained, error, .. } => {
                assert_eq!(level, BrightnessLevel::MIN);
                assert_eq!(retained, Some(BrightnessLevel::MAX));
                assert!(matches!(error, BrightnessError::NoDisplay));
            }
            other => panic!("expected SetterFailed, got {other:?}"),
        }
        assert_eq!(lp.last_applied(), Some(BrightnessLevel::MAX));

        setter.0.borrow_mut().fail = false;
        let r = lp.step().unwrap();
        assert!(matches!(r.outcome, FrameOutcome::Applied { .. }));
        assert_eq!(lp.last_applied().map(BrightnessLevel::percent), Some(50));
        assert_eq!(setter.0.borrow().calls.len(), 3);
    }

    #[test]
    fn capture_failure_ends_the_run() {
        let (mut lp, _setter) = make_loop(vec![None]);
        lp.step().unwrap();
        let err = lp.step().unwrap_err();
        assert!(matches!(err, AppError::Capture(CaptureError::Read(_))));
    }

    #[test]
    fn detector_failure_ends_the_run() {
        let mut lp = FrameLoop::new(
            CountedFrames { left: 5 },
            BrokenDetector,
            SharedSetter::default(),
            mapper(),
        );
        assert!(matches!(lp.step().unwrap_err(), AppError::Detector(_)));
    }

    #[test]
    fn same_pair_same_level() {
        let (mut lp, setter) = make_loop(vec![pair(137.0), pair(137.0)]);
        lp.step().unwrap();
        lp.step().unwrap();
        let calls = &setter.0.borrow().calls;
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], calls[1]);
    }

    #[test]
    fn failed_frame_reports_its_measurement() {
        let (mut lp, setter) = make_loop(vec![pair(110.0)]);
        setter.0.borrow_mut().fail = true;
        let r = lp.step().unwrap();
        match r.outcome {
            FrameOutcome::SetterFailed { level, distance, retained, .. } => {
                assert_eq!(distance, 110.0);
                assert_eq!(level.percent(), 50);
                assert_eq!(retained, None);
            }
            other => panic!("expected SetterFailed, got {other:?}"),
        }
        // One attempt per frame, with the level that was reported.
        assert_eq!(setter.0.borrow().calls.iter().map(|l| l.percent()).collect::<Vec<_>>(), vec![50]);
    }

    #[test]
    fn report_carries_frame_and_hand() {
        let (mut lp, _setter) = make_loop(vec![pair(50.0)]);
        let r = lp.step().unwrap();
        assert_eq!((r.frame.width, r.frame.height), (320, 240));
        assert_eq!(r.hand.map(|h| h.fingers.index_tip), Some(Point::new(50.0, 0.0)));
    }
}
