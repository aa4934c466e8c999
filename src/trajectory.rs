//! Per-class trajectory deltas and impact/speed estimation.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::detect::WorldDetection;
use crate::error::AnalysisError;
use crate::geom::{self, Vec2};

/// Displacement between two consecutive same-class world detections.
///
/// Anchored on the top-left corner, which is the corner chosen
/// consistently for comparability across frames. `frame` is the frame
/// number of the later detection.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Delta {
    pub start: Vec2,
    pub end: Vec2,
    pub displacement: Vec2,
    pub distance_mm: f64,
    pub frame: u64,
}

/// Build the delta series for one class track, ordered by frame number.
pub fn deltas(track: &[WorldDetection]) -> Vec<Delta> {
    track
        .windows(2)
        .map(|pair| {
            let start = pair[0].bbox.top_left();
            let end = pair[1].bbox.top_left();
            let displacement = geom::sub(end, start);
            Delta {
                start,
                end,
                displacement,
                distance_mm: geom::magnitude(displacement),
                frame: pair[1].frame,
            }
        })
        .collect()
}

/// Impact frame and the speed derived from the peak displacement.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ImpactEstimate {
    pub frame: u64,
    pub speed_mps: f64,
    pub peak_displacement_mm: f64,
}

/// Find the impact in a delta series.
///
/// A first-exceeds-threshold scan marks motion onset; full peak detection
/// would be fooled by detector jitter before the real strike. The peak
/// displacement within the short window after onset is the collision
/// itself, and its frame is the impact frame.
pub fn find_impact(
    series: &[Delta],
    frame_rate: f64,
    cfg: &AnalysisConfig,
) -> Result<ImpactEstimate, AnalysisError> {
    let onset = series
        .iter()
        .position(|d| d.distance_mm > cfg.motion_onset_threshold_mm)
        .ok_or(AnalysisError::NoImpactDetected {
            threshold_mm: cfg.motion_onset_threshold_mm,
        })?;

    let window_end = (onset + 1 + cfg.impact_window).min(series.len());
    let window = &series[onset + 1..window_end];
    // Motion can end right at onset; the onset delta is then the peak.
    let peak = window
        .iter()
        .fold(&series[onset], |best, d| {
            if d.distance_mm > best.distance_mm {
                d
            } else {
                best
            }
        });

    let speed_mps = peak.distance_mm * frame_rate / 1000.0;
    debug!(
        "impact at frame {} ({:.1} mm peak displacement, {:.2} m/s)",
        peak.frame, peak.distance_mm, speed_mps
    );
    Ok(ImpactEstimate {
        frame: peak.frame,
        speed_mps,
        peak_displacement_mm: peak.distance_mm,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{BBox, ObjectClass};

    fn world(frame: u64, x: f64, y: f64) -> WorldDetection {
        WorldDetection {
            frame,
            time_s: frame as f64 / 30.0,
            class: ObjectClass::Ball,
            bbox: BBox {
                x1: x,
                y1: y,
                x2: x + 42.0,
                y2: y + 42.0,
            },
            confidence: 0.9,
        }
    }

    #[test]
    fn deltas_anchor_on_top_left() {
        let track = vec![world(0, 0.0, 0.0), world(1, 3.0, 4.0)];
        let series = deltas(&track);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].displacement, (3.0, 4.0));
        assert!((series[0].distance_mm - 5.0).abs() < 1e-12);
        assert_eq!(series[0].frame, 1);
    }

    #[test]
    fn impact_peak_within_window() {
        // Stationary, then 20/60/30 mm displacements: peak is the 60 mm one.
        let track = vec![
            world(0, 0.0, 0.0),
            world(1, 0.0, 0.0),
            world(2, 20.0, 0.0),
            world(3, 80.0, 0.0),
            world(4, 110.0, 0.0),
        ];
        let series = deltas(&track);
        let impact = find_impact(&series, 30.0, &AnalysisConfig::default()).unwrap();
        assert_eq!(impact.frame, 3);
        assert!((impact.speed_mps - 60.0 * 30.0 / 1000.0).abs() < 1e-9);
    }

    #[test]
    fn no_motion_means_no_impact() {
        let track: Vec<WorldDetection> = (0..5).map(|f| world(f, 0.0, 0.0)).collect();
        let series = deltas(&track);
        let err = find_impact(&series, 30.0, &AnalysisConfig::default()).unwrap_err();
        assert!(matches!(err, AnalysisError::NoImpactDetected { .. }));
    }

    #[test]
    fn motion_ending_at_onset_uses_onset_delta() {
        let track = vec![world(0, 0.0, 0.0), world(1, 50.0, 0.0)];
        let series = deltas(&track);
        let impact = find_impact(&series, 30.0, &AnalysisConfig::default()).unwrap();
        assert_eq!(impact.frame, 1);
        assert!((impact.peak_displacement_mm - 50.0).abs() < 1e-12);
    }
}
