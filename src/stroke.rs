//! Stroke-phase segmentation: recover the backswing from a noisy
//! putter-head track, given an already-established impact frame.
//!
//! Three checks run in order, and any of them failing marks the whole
//! stroke as not inferred: a velocity-reversal scan for the top of the
//! backswing, a stability scan for the address position, and a
//! contiguity check over the putter track between address and impact.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::config::AnalysisConfig;
use crate::detect::{ObjectClass, WorldDetection};
use crate::error::StrokeFailure;
use crate::geom::{self, Vec2};
use crate::trajectory::{self, Delta};

/// Backswing measurements. When `inferred` is false, `tempo` and
/// `backswing_mm` are meaningless and must not be displayed.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Stroke {
    pub inferred: bool,
    /// Backswing frames divided by downswing frames.
    pub tempo: f64,
    /// Putter-head travel from address to the top of the backswing.
    pub backswing_mm: f64,
    pub failure: Option<StrokeFailure>,
}

impl Stroke {
    fn inferred(tempo: f64, backswing_mm: f64) -> Self {
        Self {
            inferred: true,
            tempo,
            backswing_mm,
            failure: None,
        }
    }

    fn not_inferred(reason: StrokeFailure) -> Self {
        Self {
            inferred: false,
            tempo: 0.0,
            backswing_mm: 0.0,
            failure: Some(reason),
        }
    }
}

/// Segment the stroke from world-space detections.
///
/// `world` is the full detection list; the putter and ball tracks are
/// filtered here. Never fails the analysis: segmentation trouble yields
/// a not-inferred [`Stroke`] carrying its reason.
pub fn segment(world: &[WorldDetection], impact_frame: u64, cfg: &AnalysisConfig) -> Stroke {
    let putter: Vec<WorldDetection> = world
        .iter()
        .filter(|d| d.class == ObjectClass::Putter && d.frame <= impact_frame)
        .copied()
        .collect();

    let ball_centers: HashMap<u64, Vec2> = world
        .iter()
        .filter(|d| d.class == ObjectClass::Ball)
        .map(|d| (d.frame, d.bbox.center()))
        .collect();

    let series = trajectory::deltas(&putter);
    let peak_frame = match find_peak_backswing(&series) {
        Some(frame) => frame,
        None => {
            warn!("stroke not inferred: peak backswing not found");
            return Stroke::not_inferred(StrokeFailure::PeakBackswingNotFound);
        }
    };

    let start_frame = match find_stroke_start(&putter, &ball_centers, peak_frame, cfg) {
        Some(frame) => frame,
        None => {
            warn!("stroke not inferred: start stroke not found");
            return Stroke::not_inferred(StrokeFailure::StrokeStartNotFound);
        }
    };

    // A swing reconstructed across a tracking gap is not trustworthy.
    let tracked: HashSet<u64> = putter.iter().map(|d| d.frame).collect();
    if (start_frame..=impact_frame).any(|f| !tracked.contains(&f)) {
        warn!(
            "stroke not inferred: putter tracking is not contiguous between frames {} and {}",
            start_frame, impact_frame
        );
        return Stroke::not_inferred(StrokeFailure::TrackingDiscontinuous);
    }

    let backswing_frames = peak_frame - start_frame;
    let downswing_frames = impact_frame - peak_frame;
    if downswing_frames == 0 {
        warn!("stroke not inferred: backswing peak coincides with impact");
        return Stroke::not_inferred(StrokeFailure::PeakBackswingNotFound);
    }
    let tempo = backswing_frames as f64 / downswing_frames as f64;

    let backswing_mm = match (center_at(&putter, peak_frame), center_at(&putter, start_frame)) {
        (Some(peak), Some(start)) => geom::distance(peak, start),
        _ => {
            warn!("stroke not inferred: start stroke not found");
            return Stroke::not_inferred(StrokeFailure::StrokeStartNotFound);
        }
    };

    debug!(
        "stroke: address frame {}, peak backswing frame {}, impact frame {}, tempo {:.3}, backswing {:.1} mm",
        start_frame, peak_frame, impact_frame, tempo, backswing_mm
    );
    Stroke::inferred(tempo, backswing_mm)
}

/// Walk the pre-impact delta series backward looking for the frame where
/// the putter reversed direction from backswing to downswing.
///
/// Two consecutive displacement vectors point in substantially opposing
/// directions exactly when the magnitude of their difference exceeds the
/// magnitude of their sum. This comparison rule is load-bearing:
/// changing it changes which frame is chosen as the peak, and with it
/// tempo and backswing distance.
fn find_peak_backswing(series: &[Delta]) -> Option<u64> {
    if series.len() < 2 {
        return None;
    }
    let mut prev = series[series.len() - 1].displacement;
    for delta in series[..series.len() - 1].iter().rev() {
        let v = delta.displacement;
        if geom::magnitude(geom::sub(prev, v)) > geom::magnitude(geom::add(prev, v)) {
            return Some(delta.frame);
        }
        prev = v;
    }
    None
}

/// Scan backward from the backswing peak for the stationary address
/// position: a run of `stable_frame_run` consecutive frames whose
/// putter-to-ball distance stays within the tolerance band of the run's
/// anchor frame, with the anchor close enough to the ball to count as
/// addressing it. Returns the earliest frame of the first such run.
fn find_stroke_start(
    putter: &[WorldDetection],
    ball_centers: &HashMap<u64, Vec2>,
    peak_frame: u64,
    cfg: &AnalysisConfig,
) -> Option<u64> {
    let mut candidates: Vec<(u64, f64)> = Vec::new();
    for d in putter.iter().filter(|d| d.frame <= peak_frame) {
        if let Some(ball) = ball_centers.get(&d.frame) {
            candidates.push((d.frame, geom::distance(d.bbox.center(), *ball)));
        }
    }
    candidates.sort_by_key(|(frame, _)| *frame);
    candidates.dedup_by_key(|(frame, _)| *frame);

    let mut anchor_dist = f64::INFINITY;
    let mut run = 0usize;
    let mut run_start = None;
    for &(frame, dist) in candidates.iter().rev() {
        let stable = run > 0
            && geom::within(dist, anchor_dist, cfg.stationary_tolerance_mm)
            && anchor_dist < cfg.address_proximity_threshold_mm;
        if stable {
            run += 1;
            run_start = Some(frame);
        } else {
            if run >= cfg.stable_frame_run && anchor_dist < cfg.address_proximity_threshold_mm {
                return run_start;
            }
            anchor_dist = dist;
            run = 1;
            run_start = Some(frame);
        }
    }
    if run >= cfg.stable_frame_run && anchor_dist < cfg.address_proximity_threshold_mm {
        return run_start;
    }
    None
}

fn center_at(putter: &[WorldDetection], frame: u64) -> Option<Vec2> {
    putter
        .iter()
        .find(|d| d.frame == frame)
        .map(|d| d.bbox.center())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::BBox;

    fn det(class: ObjectClass, frame: u64, cx: f64, cy: f64, size: f64) -> WorldDetection {
        WorldDetection {
            frame,
            time_s: frame as f64 / 30.0,
            class,
            bbox: BBox {
                x1: cx - size / 2.0,
                y1: cy - size / 2.0,
                x2: cx + size / 2.0,
                y2: cy + size / 2.0,
            },
            confidence: 0.9,
        }
    }

    /// Ball sitting at (200, 200); putter addressing 60 mm below it for
    /// frames 2..=6, swinging back through frame 15, then down to impact
    /// at frame 30.
    fn swing() -> Vec<WorldDetection> {
        let mut world: Vec<WorldDetection> = (0..=30)
            .map(|f| det(ObjectClass::Ball, f, 200.0, 200.0, 42.672))
            .collect();
        for f in 2..=6u64 {
            world.push(det(ObjectClass::Putter, f, 200.0, 260.0, 80.0));
        }
        for f in 7..=15u64 {
            let y = 260.0 + (f - 6) as f64 * 12.0;
            world.push(det(ObjectClass::Putter, f, 200.0, y, 80.0));
        }
        for f in 16..=30u64 {
            let y = 368.0 - (f - 15) as f64 * 10.0;
            world.push(det(ObjectClass::Putter, f, 200.0, y, 80.0));
        }
        world
    }

    #[test]
    fn clean_swing_is_inferred() {
        let stroke = segment(&swing(), 30, &AnalysisConfig::default());
        assert!(stroke.inferred);
        assert!((stroke.tempo - 13.0 / 15.0).abs() < 1e-9);
        assert!((stroke.backswing_mm - 108.0).abs() < 1e-9);
        assert_eq!(stroke.failure, None);
    }

    #[test]
    fn missing_mid_swing_frame_is_discontinuous() {
        let world: Vec<WorldDetection> = swing()
            .into_iter()
            .filter(|d| !(d.class == ObjectClass::Putter && d.frame == 20))
            .collect();
        let stroke = segment(&world, 30, &AnalysisConfig::default());
        assert!(!stroke.inferred);
        assert_eq!(stroke.failure, Some(StrokeFailure::TrackingDiscontinuous));
        assert_eq!(stroke.tempo, 0.0);
        assert_eq!(stroke.backswing_mm, 0.0);
    }

    #[test]
    fn no_reversal_fails_peak_detection() {
        // Putter moves monotonically toward the ball: no backswing at all.
        let mut world: Vec<WorldDetection> = (0..=10)
            .map(|f| det(ObjectClass::Ball, f, 200.0, 200.0, 42.672))
            .collect();
        for f in 0..=10u64 {
            world.push(det(ObjectClass::Putter, f, 200.0, 400.0 - f as f64 * 15.0, 80.0));
        }
        let stroke = segment(&world, 10, &AnalysisConfig::default());
        assert!(!stroke.inferred);
        assert_eq!(stroke.failure, Some(StrokeFailure::PeakBackswingNotFound));
    }

    #[test]
    fn no_stable_address_fails_start_detection() {
        // Reversal exists, but the putter never settles near the ball.
        let mut world: Vec<WorldDetection> = (0..=20)
            .map(|f| det(ObjectClass::Ball, f, 200.0, 200.0, 42.672))
            .collect();
        for f in 0..=10u64 {
            world.push(det(ObjectClass::Putter, f, 200.0, 260.0 + f as f64 * 12.0, 80.0));
        }
        for f in 11..=20u64 {
            world.push(det(ObjectClass::Putter, f, 200.0, 380.0 - (f - 10) as f64 * 12.0, 80.0));
        }
        let stroke = segment(&world, 20, &AnalysisConfig::default());
        assert!(!stroke.inferred);
        assert_eq!(stroke.failure, Some(StrokeFailure::StrokeStartNotFound));
    }
}
