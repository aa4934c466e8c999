//! Putting Stroke Kernel (PSK)
//!
//! This crate implements the measurement and event-segmentation engine
//! for a camera-based putting analyzer. It consumes per-frame object
//! detections (bounding boxes for a golf ball and a putter head) from an
//! external detector and produces physical measurements of one stroke.
//!
//! # Pipeline
//!
//! One analysis call runs a pure pipeline over a finite detection batch:
//!
//! 1. **Calibration**: millimeters-per-pixel from the apparent diameter
//!    of the stationary ball (`calibrate`).
//! 2. **World transform**: pixel boxes to millimeter boxes (`calibrate`).
//! 3. **Trajectory deltas**: per-class displacement series (`trajectory`).
//! 4. **Impact detection**: velocity spike on the ball track (`trajectory`).
//! 5. **Stroke segmentation**: address, backswing peak, and contiguity
//!    on the putter track (`stroke`).
//! 6. **Straightness**: departure-line angle on the ball track
//!    (`straightness`).
//! 7. **Assembly**: roll distance, speeds, smash factor (`physics`).
//!
//! Independently, `realtime` holds the cheap per-frame motion trigger
//! that decides when a recording is worth analyzing.
//!
//! # Failure policy
//!
//! Missing calibration evidence or a missing ball impact are terminal
//! ([`AnalysisError`]); stroke and straightness trouble degrades to
//! not-inferred fields inside a still-valid [`PhysicsEstimate`].

pub mod calibrate;
pub mod config;
pub mod detect;
pub mod error;
pub mod geom;
pub mod physics;
pub mod realtime;
pub mod straightness;
pub mod stroke;
pub mod trajectory;

pub use config::{AnalysisConfig, EngineConfig, RealtimeConfig, ReferenceAxis};
pub use detect::{BBox, Detection, ObjectClass, Scale, WorldDetection, WorldSize};
pub use error::{AnalysisError, StrokeFailure};
pub use physics::{analyze, roll_distance_m, PhysicsEstimate, Stimp, VideoMeta};
pub use realtime::{FrameDelta, RealtimeDetector, RealtimeState};
pub use straightness::PuttStraightness;
pub use stroke::Stroke;
pub use trajectory::{Delta, ImpactEstimate};
