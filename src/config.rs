//! Engine configuration.
//!
//! Every physical constant and threshold the pipeline uses is a named
//! field here rather than an embedded literal. Values come from built-in
//! defaults, optionally a JSON config file (path in `PUTT_CONFIG`), and
//! finally `PUTT_*` environment overrides.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::physics::Stimp;

const DEFAULT_BALL_DIAMETER_MM: f64 = 42.672;
const DEFAULT_SQUARE_ASPECT_TOLERANCE: f64 = 0.1;
const DEFAULT_TRIM_FRACTION: f64 = 0.1;
const DEFAULT_STATIONARY_TOLERANCE_MM: f64 = 5.0;
const DEFAULT_MOTION_ONSET_THRESHOLD_MM: f64 = 10.0;
const DEFAULT_ADDRESS_PROXIMITY_THRESHOLD_MM: f64 = 100.0;
const DEFAULT_STABLE_FRAME_RUN: usize = 3;
const DEFAULT_IMPACT_WINDOW: usize = 10;
const DEFAULT_STATIONARY_DELTA_MM: f64 = 1.0;
const DEFAULT_DIRECTION_MIN_DISTANCE_MM: f64 = 50.0;
const DEFAULT_MOVEMENT_THRESHOLD: f64 = 10.0;
const DEFAULT_SMOOTHING_WINDOW: usize = 10;
const DEFAULT_WARMUP_FRAMES: u64 = 100;

/// Axis the intended roll direction is assumed to lie on.
///
/// The straightness angle is measured against this axis. `X` reproduces
/// the historical raw `atan(dy/dx)` behavior; `Y` swaps the components.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceAxis {
    #[default]
    X,
    Y,
}

/// Thresholds and constants for the batch pipeline.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Physical golf-ball diameter used to derive the scale.
    pub ball_diameter_mm: f64,
    /// Aspect-ratio band around 1.0 for "stationary ball" boxes.
    pub square_aspect_tolerance: f64,
    /// Fraction trimmed from each tail of the diameter samples.
    pub trim_fraction: f64,
    /// Putter-to-ball distance band for the address stability run.
    pub stationary_tolerance_mm: f64,
    /// Per-frame displacement that counts as "something started moving".
    pub motion_onset_threshold_mm: f64,
    /// Putter must be this close to the ball at address.
    pub address_proximity_threshold_mm: f64,
    /// Consecutive stable frames required to accept an address position.
    pub stable_frame_run: usize,
    /// Deltas examined after motion onset for the impact peak.
    pub impact_window: usize,
    /// Deltas below this count as stationary when averaging the address position.
    pub stationary_delta_mm: f64,
    /// Samples closer to the address position than this are too near to
    /// carry direction information.
    pub direction_min_distance_mm: f64,
    pub reference_axis: ReferenceAxis,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            ball_diameter_mm: DEFAULT_BALL_DIAMETER_MM,
            square_aspect_tolerance: DEFAULT_SQUARE_ASPECT_TOLERANCE,
            trim_fraction: DEFAULT_TRIM_FRACTION,
            stationary_tolerance_mm: DEFAULT_STATIONARY_TOLERANCE_MM,
            motion_onset_threshold_mm: DEFAULT_MOTION_ONSET_THRESHOLD_MM,
            address_proximity_threshold_mm: DEFAULT_ADDRESS_PROXIMITY_THRESHOLD_MM,
            stable_frame_run: DEFAULT_STABLE_FRAME_RUN,
            impact_window: DEFAULT_IMPACT_WINDOW,
            stationary_delta_mm: DEFAULT_STATIONARY_DELTA_MM,
            direction_min_distance_mm: DEFAULT_DIRECTION_MIN_DISTANCE_MM,
            reference_axis: ReferenceAxis::default(),
        }
    }
}

/// Knobs for the real-time motion trigger.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Mean window magnitude above which a hit is declared.
    pub movement_threshold: f64,
    /// Sliding window length over recent motion magnitudes.
    pub smoothing_window: usize,
    /// Frames ignored at startup while exposure and focus settle.
    pub warmup_frames: u64,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            movement_threshold: DEFAULT_MOVEMENT_THRESHOLD,
            smoothing_window: DEFAULT_SMOOTHING_WINDOW,
            warmup_frames: DEFAULT_WARMUP_FRAMES,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct EngineConfigFile {
    analysis: Option<AnalysisConfigFile>,
    realtime: Option<RealtimeConfigFile>,
    stimp: Option<Stimp>,
}

#[derive(Debug, Deserialize, Default)]
struct AnalysisConfigFile {
    ball_diameter_mm: Option<f64>,
    square_aspect_tolerance: Option<f64>,
    trim_fraction: Option<f64>,
    stationary_tolerance_mm: Option<f64>,
    motion_onset_threshold_mm: Option<f64>,
    address_proximity_threshold_mm: Option<f64>,
    stable_frame_run: Option<usize>,
    impact_window: Option<usize>,
    stationary_delta_mm: Option<f64>,
    direction_min_distance_mm: Option<f64>,
    reference_axis: Option<ReferenceAxis>,
}

#[derive(Debug, Deserialize, Default)]
struct RealtimeConfigFile {
    movement_threshold: Option<f64>,
    smoothing_window: Option<usize>,
    warmup_frames: Option<u64>,
}

/// Full engine configuration as loaded by the tools.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub analysis: AnalysisConfig,
    pub realtime: RealtimeConfig,
    pub stimp: Stimp,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            analysis: AnalysisConfig::default(),
            realtime: RealtimeConfig::default(),
            stimp: Stimp::Average,
        }
    }
}

impl EngineConfig {
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("PUTT_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) => Some(read_config_file(Path::new(path))?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: EngineConfigFile) -> Self {
        let defaults = EngineConfig::default();
        let a = file.analysis.unwrap_or_default();
        let analysis = AnalysisConfig {
            ball_diameter_mm: a
                .ball_diameter_mm
                .unwrap_or(defaults.analysis.ball_diameter_mm),
            square_aspect_tolerance: a
                .square_aspect_tolerance
                .unwrap_or(defaults.analysis.square_aspect_tolerance),
            trim_fraction: a.trim_fraction.unwrap_or(defaults.analysis.trim_fraction),
            stationary_tolerance_mm: a
                .stationary_tolerance_mm
                .unwrap_or(defaults.analysis.stationary_tolerance_mm),
            motion_onset_threshold_mm: a
                .motion_onset_threshold_mm
                .unwrap_or(defaults.analysis.motion_onset_threshold_mm),
            address_proximity_threshold_mm: a
                .address_proximity_threshold_mm
                .unwrap_or(defaults.analysis.address_proximity_threshold_mm),
            stable_frame_run: a
                .stable_frame_run
                .unwrap_or(defaults.analysis.stable_frame_run),
            impact_window: a.impact_window.unwrap_or(defaults.analysis.impact_window),
            stationary_delta_mm: a
                .stationary_delta_mm
                .unwrap_or(defaults.analysis.stationary_delta_mm),
            direction_min_distance_mm: a
                .direction_min_distance_mm
                .unwrap_or(defaults.analysis.direction_min_distance_mm),
            reference_axis: a.reference_axis.unwrap_or(defaults.analysis.reference_axis),
        };
        let r = file.realtime.unwrap_or_default();
        let realtime = RealtimeConfig {
            movement_threshold: r
                .movement_threshold
                .unwrap_or(defaults.realtime.movement_threshold),
            smoothing_window: r
                .smoothing_window
                .unwrap_or(defaults.realtime.smoothing_window),
            warmup_frames: r.warmup_frames.unwrap_or(defaults.realtime.warmup_frames),
        };
        Self {
            analysis,
            realtime,
            stimp: file.stimp.unwrap_or(defaults.stimp),
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(stimp) = std::env::var("PUTT_STIMP") {
            if !stimp.trim().is_empty() {
                self.stimp = stimp
                    .trim()
                    .parse()
                    .map_err(|e: String| anyhow!("PUTT_STIMP: {}", e))?;
            }
        }
        if let Ok(threshold) = std::env::var("PUTT_MOVEMENT_THRESHOLD") {
            if !threshold.trim().is_empty() {
                self.realtime.movement_threshold = threshold
                    .trim()
                    .parse()
                    .map_err(|_| anyhow!("PUTT_MOVEMENT_THRESHOLD must be a number"))?;
            }
        }
        if let Ok(axis) = std::env::var("PUTT_REFERENCE_AXIS") {
            match axis.trim().to_lowercase().as_str() {
                "" => {}
                "x" => self.analysis.reference_axis = ReferenceAxis::X,
                "y" => self.analysis.reference_axis = ReferenceAxis::Y,
                other => return Err(anyhow!("PUTT_REFERENCE_AXIS must be x or y, got {}", other)),
            }
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.analysis.ball_diameter_mm <= 0.0 {
            return Err(anyhow!("ball_diameter_mm must be greater than zero"));
        }
        if !(0.0..0.5).contains(&self.analysis.trim_fraction) {
            return Err(anyhow!("trim_fraction must be in [0, 0.5)"));
        }
        if !(0.0..1.0).contains(&self.analysis.square_aspect_tolerance) {
            return Err(anyhow!("square_aspect_tolerance must be in [0, 1)"));
        }
        if self.analysis.motion_onset_threshold_mm <= 0.0 {
            return Err(anyhow!("motion_onset_threshold_mm must be greater than zero"));
        }
        if self.analysis.stable_frame_run == 0 {
            return Err(anyhow!("stable_frame_run must be at least 1"));
        }
        if self.analysis.impact_window == 0 {
            return Err(anyhow!("impact_window must be at least 1"));
        }
        if self.realtime.smoothing_window == 0 {
            return Err(anyhow!("smoothing_window must be at least 1"));
        }
        if self.realtime.movement_threshold <= 0.0 {
            return Err(anyhow!("movement_threshold must be greater than zero"));
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<EngineConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}
