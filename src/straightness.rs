//! Shot straightness: the angle between the ball's departure line and
//! the configured reference axis.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::config::{AnalysisConfig, ReferenceAxis};
use crate::geom;
use crate::trajectory::Delta;

/// Angle of the ball's departure line, in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PuttStraightness {
    pub degrees: f64,
}

impl PuttStraightness {
    /// UI-facing angle, folded so a near-axis putt reads near zero
    /// whichever side of the axis it departed on.
    pub fn display_degrees(&self) -> f64 {
        self.degrees.min((90.0 - self.degrees).abs())
    }
}

/// Estimate straightness from the ball's delta series.
///
/// The reference position is the average of the ball's stationary
/// pre-onset positions rather than a single frame, which damps
/// single-frame detector jitter. Samples too close to the reference
/// cannot reliably carry direction and are filtered out; if none
/// survive, the angle is undefined and `None` is returned.
pub fn estimate(series: &[Delta], cfg: &AnalysisConfig) -> Option<PuttStraightness> {
    let onset = series
        .iter()
        .position(|d| d.distance_mm > cfg.motion_onset_threshold_mm)?;

    let address_xs: Vec<f64> = series[..onset]
        .iter()
        .filter(|d| d.distance_mm < cfg.stationary_delta_mm)
        .map(|d| d.start.0)
        .collect();
    let address_ys: Vec<f64> = series[..onset]
        .iter()
        .filter(|d| d.distance_mm < cfg.stationary_delta_mm)
        .map(|d| d.start.1)
        .collect();
    let reference = match (geom::average(&address_xs), geom::average(&address_ys)) {
        (Some(x), Some(y)) => (x, y),
        // No stationary pre-roll at all; fall back to where motion began.
        _ => series[onset].start,
    };

    // The moving window ends where the ball leaves frame, the detector
    // drops it, or it decelerates below the onset threshold.
    let moving_end = series[onset + 1..]
        .iter()
        .position(|d| d.distance_mm < cfg.motion_onset_threshold_mm)
        .map(|i| onset + 1 + i)
        .unwrap_or(series.len());

    let angles: Vec<f64> = series[onset..moving_end]
        .iter()
        .filter(|d| geom::distance(reference, d.end) > cfg.direction_min_distance_mm)
        .map(|d| {
            let (dx, dy) = geom::sub(d.end, reference);
            match cfg.reference_axis {
                ReferenceAxis::X => (dy / dx).atan(),
                ReferenceAxis::Y => (dx / dy).atan(),
            }
        })
        .collect();

    match geom::average(&angles) {
        Some(mean) => {
            let degrees = geom::radians_to_degrees(mean);
            debug!(
                "straightness {:.2} degrees from {} direction sample(s)",
                degrees,
                angles.len()
            );
            Some(PuttStraightness { degrees })
        }
        None => {
            warn!(
                "straightness undefined: no sample farther than {:.0} mm from address",
                cfg.direction_min_distance_mm
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Vec2;

    fn delta(frame: u64, start: Vec2, end: Vec2) -> Delta {
        let displacement = geom::sub(end, start);
        Delta {
            start,
            end,
            displacement,
            distance_mm: geom::magnitude(displacement),
            frame,
        }
    }

    fn rolling(per_frame: Vec2, frames: u64) -> Vec<Delta> {
        let mut series = Vec::new();
        // Five stationary pre-roll deltas.
        for f in 1..=5 {
            series.push(delta(f, (100.0, 100.0), (100.0, 100.0)));
        }
        let mut pos = (100.0, 100.0);
        for f in 6..6 + frames {
            let next = geom::add(pos, per_frame);
            series.push(delta(f, pos, next));
            pos = next;
        }
        series
    }

    #[test]
    fn straight_roll_is_zero_degrees() {
        let series = rolling((60.0, 0.0), 8);
        let s = estimate(&series, &AnalysisConfig::default()).unwrap();
        assert!(s.degrees.abs() < 1e-9);
        assert!(s.display_degrees().abs() < 1e-9);
    }

    #[test]
    fn angled_roll_reports_departure_angle() {
        // dy/dx = 1 everywhere: 45 degrees off the reference axis.
        let series = rolling((50.0, 50.0), 8);
        let s = estimate(&series, &AnalysisConfig::default()).unwrap();
        assert!((s.degrees - 45.0).abs() < 1e-9);
        assert!((s.display_degrees() - 45.0).abs() < 1e-9);
    }

    #[test]
    fn y_axis_reference_swaps_components() {
        let mut cfg = AnalysisConfig::default();
        cfg.reference_axis = ReferenceAxis::Y;
        let series = rolling((0.0, 60.0), 8);
        let s = estimate(&series, &cfg).unwrap();
        assert!(s.degrees.abs() < 1e-9);
    }

    #[test]
    fn too_short_a_roll_is_undefined() {
        // One 12 mm hop: over onset threshold, never 50 mm from address.
        let series = rolling((12.0, 0.0), 1);
        assert_eq!(estimate(&series, &AnalysisConfig::default()), None);
    }

    #[test]
    fn no_onset_is_undefined() {
        let series = rolling((0.0, 0.0), 4);
        assert_eq!(estimate(&series, &AnalysisConfig::default()), None);
    }
}
