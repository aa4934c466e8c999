//! Real-time impact trigger.
//!
//! A deliberately coarse global-motion detector that runs on every
//! captured frame and decides when the batch pipeline should be handed a
//! recording. It is not the object detector: it only watches the mean
//! frame-difference magnitude through a short smoothing window.
//!
//! The caller invokes [`RealtimeDetector::ingest_frame`] serially from
//! its capture loop, waits out its own post-roll delay after a hit, runs
//! the batch analysis, and then calls [`RealtimeDetector::reset`] to
//! re-arm the trigger.

use log::{debug, info};
use std::collections::VecDeque;

use crate::config::RealtimeConfig;

/// Grayscale-and-blurred frame as produced by the caller's
/// frame-differencing primitive.
///
/// Frames are owned by the detector for exactly one comparison: the
/// previous frame is dropped immediately after diffing, which is where a
/// frame type with an explicit release obligation should put it.
pub trait FrameDelta {
    /// Mean absolute pixel-intensity difference against `prev`.
    fn mean_abs_diff(&self, prev: &Self) -> f64;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RealtimeState {
    /// Watching for motion.
    Ready,
    /// A hit has fired; all input is ignored until an explicit reset.
    Analyzing,
}

/// Edge-triggered "ball hit" detector.
pub struct RealtimeDetector<F> {
    cfg: RealtimeConfig,
    state: RealtimeState,
    previous: Option<F>,
    movements: VecDeque<f64>,
    frame_counter: u64,
    on_ball_hit: Option<Box<dyn FnMut()>>,
}

impl<F: FrameDelta> RealtimeDetector<F> {
    pub fn new(cfg: RealtimeConfig) -> Self {
        Self {
            movements: VecDeque::with_capacity(cfg.smoothing_window),
            cfg,
            state: RealtimeState::Ready,
            previous: None,
            frame_counter: 0,
            on_ball_hit: None,
        }
    }

    /// Register the one-shot hit callback.
    pub fn on_ball_hit(&mut self, f: impl FnMut() + 'static) {
        self.on_ball_hit = Some(Box::new(f));
    }

    pub fn state(&self) -> RealtimeState {
        self.state
    }

    /// Feed one captured frame. Must be called serially, one frame at a
    /// time, from a single call site.
    pub fn ingest_frame(&mut self, frame: F, frame_number: u64) {
        if self.state == RealtimeState::Analyzing {
            // Already waiting for the caller to collect the recording.
            return;
        }
        self.frame_counter = frame_number;
        if let Some(previous) = self.previous.take() {
            let movement = frame.mean_abs_diff(&previous);
            self.push_movement(movement);
            drop(previous);
        }
        self.previous = Some(frame);
        self.check_for_movement();
    }

    /// Feed a precomputed motion magnitude instead of a frame, for
    /// collaborators that do their own differencing.
    pub fn observe_magnitude(&mut self, movement: f64, frame_number: u64) {
        if self.state == RealtimeState::Analyzing {
            return;
        }
        self.frame_counter = frame_number;
        self.push_movement(movement);
        self.check_for_movement();
    }

    /// Re-arm the trigger. Idempotent; safe to call while no hit is
    /// pending.
    pub fn reset(&mut self) {
        self.state = RealtimeState::Ready;
        self.movements.clear();
        self.previous = None;
        debug!("realtime detector re-armed");
    }

    fn push_movement(&mut self, movement: f64) {
        self.movements.push_back(movement);
        while self.movements.len() > self.cfg.smoothing_window {
            self.movements.pop_front();
        }
    }

    fn check_for_movement(&mut self) {
        if self.frame_counter < self.cfg.warmup_frames || self.movements.is_empty() {
            return;
        }
        let mean: f64 = self.movements.iter().sum::<f64>() / self.movements.len() as f64;
        if mean > self.cfg.movement_threshold {
            self.state = RealtimeState::Analyzing;
            info!(
                "ball hit at frame {} (smoothed movement {:.2})",
                self.frame_counter, mean
            );
            if let Some(callback) = self.on_ball_hit.as_mut() {
                callback();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Constant-intensity stand-in for a grayscale frame.
    struct Gray(f64);

    impl FrameDelta for Gray {
        fn mean_abs_diff(&self, prev: &Self) -> f64 {
            (self.0 - prev.0).abs()
        }
    }

    fn detector() -> (RealtimeDetector<Gray>, Rc<Cell<u32>>) {
        let mut d = RealtimeDetector::new(RealtimeConfig {
            movement_threshold: 5.0,
            smoothing_window: 10,
            warmup_frames: 100,
        });
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        d.on_ball_hit(move || counter.set(counter.get() + 1));
        (d, hits)
    }

    #[test]
    fn warmup_frames_never_trigger() {
        let (mut d, hits) = detector();
        for f in 0..100 {
            d.ingest_frame(Gray(if f % 2 == 0 { 0.0 } else { 200.0 }), f);
        }
        assert_eq!(hits.get(), 0);
        assert_eq!(d.state(), RealtimeState::Ready);
    }

    #[test]
    fn hit_fires_once_and_input_is_ignored_until_reset() {
        let (mut d, hits) = detector();
        for f in 0..100 {
            d.ingest_frame(Gray(0.0), f);
        }
        for f in 100..110 {
            d.ingest_frame(Gray(if f % 2 == 0 { 0.0 } else { 200.0 }), f);
        }
        assert_eq!(d.state(), RealtimeState::Analyzing);
        assert_eq!(hits.get(), 1);

        // Further motion is ignored while analyzing.
        for f in 110..130 {
            d.ingest_frame(Gray(if f % 2 == 0 { 0.0 } else { 200.0 }), f);
        }
        assert_eq!(hits.get(), 1);

        d.reset();
        assert_eq!(d.state(), RealtimeState::Ready);

        // A new cycle can fire again.
        for f in 130..145 {
            d.ingest_frame(Gray(if f % 2 == 0 { 0.0 } else { 200.0 }), f);
        }
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn reset_is_idempotent() {
        let (mut d, hits) = detector();
        d.reset();
        d.reset();
        assert_eq!(d.state(), RealtimeState::Ready);
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn magnitude_path_matches_frame_path() {
        let (mut d, hits) = detector();
        for f in 0..100 {
            d.observe_magnitude(0.0, f);
        }
        for f in 100..105 {
            d.observe_magnitude(80.0, f);
        }
        assert_eq!(d.state(), RealtimeState::Analyzing);
        assert_eq!(hits.get(), 1);
    }
}
