//! Self-calibration of the pixel-to-millimeter scale, and the world
//! transform that applies it.
//!
//! The ball is the only object in frame with a known physical size, so
//! the scale is derived from its apparent diameter in frames where it is
//! sitting still. Stationary frames are recognized by their near-square
//! bounding boxes; motion blur and foreshortening stretch the box and
//! disqualify it as evidence.

use log::debug;

use crate::config::AnalysisConfig;
use crate::detect::{Detection, ObjectClass, Scale, WorldDetection, WorldSize};
use crate::error::AnalysisError;
use crate::geom;

/// Estimate millimeters-per-pixel from stationary-ball frames.
///
/// Diameters are trimmed-mean averaged so a handful of bad detections
/// cannot skew the scale. Fails with
/// [`AnalysisError::InsufficientCalibrationEvidence`] when the trimmed
/// evidence set is empty.
pub fn estimate_scale(
    detections: &[Detection],
    cfg: &AnalysisConfig,
) -> Result<Scale, AnalysisError> {
    let diameters: Vec<f64> = detections
        .iter()
        .filter(|d| d.class == ObjectClass::Ball)
        .filter(|d| d.bbox.is_square(cfg.square_aspect_tolerance))
        .map(|d| d.bbox.diameter())
        .collect();

    let mean_px = geom::trimmed_mean(&diameters, cfg.trim_fraction).ok_or(
        AnalysisError::InsufficientCalibrationEvidence {
            candidates: diameters.len(),
        },
    )?;

    let scale = Scale(cfg.ball_diameter_mm / mean_px);
    debug!(
        "calibrated {:.4} mm/px from {} stationary ball frame(s), mean diameter {:.2} px",
        scale.0,
        diameters.len(),
        mean_px
    );
    Ok(scale)
}

/// Convert pixel-space detections to world space (millimeters).
pub fn to_world(detections: &[Detection], scale: Scale) -> Vec<WorldDetection> {
    detections
        .iter()
        .map(|d| WorldDetection {
            frame: d.frame,
            time_s: d.time_s,
            class: d.class,
            bbox: d.bbox.scaled(scale.0),
            confidence: d.confidence,
        })
        .collect()
}

/// Physical size of the camera frame at the calibrated scale.
pub fn world_size(scale: Scale, video_width_px: u32, video_height_px: u32) -> WorldSize {
    WorldSize {
        width_mm: scale.0 * video_width_px as f64,
        height_mm: scale.0 * video_height_px as f64,
    }
}
