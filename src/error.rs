//! Failure taxonomy for the batch pipeline.
//!
//! Calibration and impact failures are terminal: no meaningful estimate
//! exists without a scale or an impact frame, so they surface as errors.
//! Stroke-segmentation and straightness failures are partial and ride
//! inside a valid [`crate::PhysicsEstimate`] instead.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum AnalysisError {
    /// Fewer usable stationary-ball frames than the trimmed mean needs.
    #[error("insufficient calibration evidence: {candidates} stationary ball frame(s)")]
    InsufficientCalibrationEvidence { candidates: usize },

    /// No delta in the ball's trajectory ever exceeded the motion threshold.
    #[error("no impact detected: no displacement exceeded {threshold_mm} mm")]
    NoImpactDetected { threshold_mm: f64 },
}

/// Why stroke segmentation gave up. Carried on a non-inferred
/// [`crate::Stroke`]; tempo and distance are meaningless when set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrokeFailure {
    /// No velocity reversal found in the pre-impact putter track.
    PeakBackswingNotFound,
    /// No stable near-ball address run before the backswing peak.
    StrokeStartNotFound,
    /// The putter track has a gap between address and impact.
    TrackingDiscontinuous,
}

impl std::fmt::Display for StrokeFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            StrokeFailure::PeakBackswingNotFound => "peak backswing not found",
            StrokeFailure::StrokeStartNotFound => "start stroke not found",
            StrokeFailure::TrackingDiscontinuous => "putter tracking is not contiguous",
        };
        f.write_str(msg)
    }
}
