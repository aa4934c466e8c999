//! Result assembly: runs the batch pipeline over one recording's
//! detections and produces the full [`PhysicsEstimate`].

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::calibrate;
use crate::config::AnalysisConfig;
use crate::detect::{Detection, ObjectClass, WorldDetection, WorldSize};
use crate::error::AnalysisError;
use crate::straightness::{self, PuttStraightness};
use crate::stroke::{self, Stroke};
use crate::trajectory;

/// Stimpmeter ball release speed in m/s.
const STIMPMETER_SPEED_MPS: f64 = 1.83;
const FEET_TO_METERS: f64 = 0.3048;

/// Green-speed presets: feet a ball rolls from a Stimpmeter release.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Stimp {
    Slow,
    Average,
    Fast,
    Pga,
}

impl Stimp {
    pub fn feet(&self) -> f64 {
        match self {
            Stimp::Slow => 6.0,
            Stimp::Average => 8.0,
            Stimp::Fast => 10.0,
            Stimp::Pga => 13.0,
        }
    }
}

impl std::fmt::Display for Stimp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stimp::Slow => "slow",
            Stimp::Average => "average",
            Stimp::Fast => "fast",
            Stimp::Pga => "pga",
        };
        f.write_str(name)
    }
}

impl FromStr for Stimp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "slow" => Ok(Stimp::Slow),
            "average" => Ok(Stimp::Average),
            "fast" => Ok(Stimp::Fast),
            "pga" => Ok(Stimp::Pga),
            other => Err(format!("unknown stimp level: {}", other)),
        }
    }
}

/// Roll distance in meters for a ball leaving at `v0_mps` on a green of
/// the given stimp rating.
///
/// The rating gives distance in feet at the Stimpmeter release speed;
/// distance scales with the square of velocity (kinetic energy) under
/// constant friction.
pub fn roll_distance_m(v0_mps: f64, stimp: Stimp) -> f64 {
    let distance_feet = stimp.feet() * v0_mps.powi(2) / STIMPMETER_SPEED_MPS.powi(2);
    distance_feet * FEET_TO_METERS
}

/// Pixel dimensions and frame rate of the analyzed recording.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct VideoMeta {
    pub width_px: u32,
    pub height_px: u32,
    pub frame_rate: f64,
}

/// The full measurement result for one analyzed stroke.
///
/// `putter_speed_mps` and `smash_factor` are absent when the putter
/// track never crossed the motion threshold; `straightness` is absent
/// when no sample survived the direction filter. The rest of the
/// estimate stays valid in both cases.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PhysicsEstimate {
    /// Estimated roll distance in meters.
    pub distance_m: f64,
    pub ball_speed_mps: f64,
    pub putter_speed_mps: Option<f64>,
    /// Ball speed divided by putter speed, exactly.
    pub smash_factor: Option<f64>,
    pub world_size: WorldSize,
    pub impact_frame: u64,
    pub stroke: Stroke,
    pub straightness: Option<PuttStraightness>,
}

/// Analyze one recording's detections.
///
/// Pure function of its inputs; a fresh call is a fresh engine. Fails
/// only on the terminal conditions (no calibration evidence, no ball
/// impact); everything else degrades to not-inferred fields.
pub fn analyze(
    detections: &[Detection],
    video: &VideoMeta,
    stimp: Stimp,
    cfg: &AnalysisConfig,
) -> Result<PhysicsEstimate, AnalysisError> {
    let scale = calibrate::estimate_scale(detections, cfg)?;
    let world = calibrate::to_world(detections, scale);
    let world_size = calibrate::world_size(scale, video.width_px, video.height_px);

    let ball = class_track(&world, ObjectClass::Ball);
    let putter = class_track(&world, ObjectClass::Putter);

    let ball_deltas = trajectory::deltas(&ball);
    let impact = trajectory::find_impact(&ball_deltas, video.frame_rate, cfg)?;
    let distance_m = roll_distance_m(impact.speed_mps, stimp);

    let putter_deltas = trajectory::deltas(&putter);
    let putter_speed_mps = match trajectory::find_impact(&putter_deltas, video.frame_rate, cfg) {
        Ok(estimate) => Some(estimate.speed_mps),
        Err(e) => {
            warn!("putter speed unavailable: {}", e);
            None
        }
    };
    let smash_factor = putter_speed_mps.map(|putter| impact.speed_mps / putter);

    let stroke = stroke::segment(&world, impact.frame, cfg);
    let straightness = straightness::estimate(&ball_deltas, cfg);

    debug!(
        "estimate: {:.2} m roll at {:.2} m/s, impact frame {}",
        distance_m, impact.speed_mps, impact.frame
    );
    Ok(PhysicsEstimate {
        distance_m,
        ball_speed_mps: impact.speed_mps,
        putter_speed_mps,
        smash_factor,
        world_size,
        impact_frame: impact.frame,
        stroke,
        straightness,
    })
}

fn class_track(world: &[WorldDetection], class: ObjectClass) -> Vec<WorldDetection> {
    let mut track: Vec<WorldDetection> = world.iter().filter(|d| d.class == class).copied().collect();
    track.sort_by_key(|d| d.frame);
    track
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stimp_presets() {
        assert_eq!(Stimp::Slow.feet(), 6.0);
        assert_eq!(Stimp::Average.feet(), 8.0);
        assert_eq!(Stimp::Fast.feet(), 10.0);
        assert_eq!(Stimp::Pga.feet(), 13.0);
        assert_eq!("pga".parse::<Stimp>().unwrap(), Stimp::Pga);
        assert!("glass".parse::<Stimp>().is_err());
    }

    #[test]
    fn roll_distance_scales_with_velocity_squared() {
        let d1 = roll_distance_m(1.0, Stimp::Average);
        let d2 = roll_distance_m(2.0, Stimp::Average);
        assert!((d2 / d1 - 4.0).abs() < 1e-9);
        // At the Stimpmeter release speed the roll equals the rating.
        let at_release = roll_distance_m(STIMPMETER_SPEED_MPS, Stimp::Fast);
        assert!((at_release - 10.0 * FEET_TO_METERS).abs() < 1e-9);
    }
}
