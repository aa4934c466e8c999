//! Detection data model.
//!
//! The kernel never runs object detection itself; it consumes bounding
//! boxes produced by the surrounding application's detector and converts
//! them into world-space (millimeter) coordinates once a scale has been
//! calibrated. Everything here is an immutable value type.

use serde::{Deserialize, Serialize};

use crate::geom::Vec2;

/// Detector class of a bounding box.
///
/// Unknown classes are tolerated on input and filtered out everywhere.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectClass {
    Ball,
    Putter,
    Unknown,
}

impl ObjectClass {
    /// Map the detector's numeric class id (0 = ball, 1 = putter).
    pub fn from_class_id(id: u32) -> Self {
        match id {
            0 => ObjectClass::Ball,
            1 => ObjectClass::Putter,
            _ => ObjectClass::Unknown,
        }
    }
}

/// Axis-aligned bounding box, corner-encoded. Pixel space before the
/// world transform, millimeters after.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl BBox {
    pub fn width(&self) -> f64 {
        (self.x1 - self.x2).abs()
    }

    pub fn height(&self) -> f64 {
        (self.y1 - self.y2).abs()
    }

    pub fn top_left(&self) -> Vec2 {
        (self.x1.min(self.x2), self.y1.min(self.y2))
    }

    pub fn center(&self) -> Vec2 {
        ((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    /// Mean of width and height: the apparent diameter of a round object.
    pub fn diameter(&self) -> f64 {
        (self.width() + self.height()) / 2.0
    }

    /// Is the box square within `tolerance` of a 1.0 aspect ratio?
    ///
    /// A stationary ball projects as a near-square box; motion blur and
    /// foreshortening stretch it. Degenerate boxes are never square.
    pub fn is_square(&self, tolerance: f64) -> bool {
        let (w, h) = (self.width(), self.height());
        if w == 0.0 || h == 0.0 {
            return false;
        }
        let ratio = w / h;
        ratio > 1.0 - tolerance && ratio < 1.0 + tolerance
    }

    pub fn scaled(&self, factor: f64) -> BBox {
        BBox {
            x1: self.x1 * factor,
            y1: self.y1 * factor,
            x2: self.x2 * factor,
            y2: self.y2 * factor,
        }
    }
}

/// One object-detector output for one frame, in pixel space.
///
/// Multiple detections may share a frame number; duplicates are treated
/// as noise by the downstream thresholds.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Detection {
    pub frame: u64,
    pub time_s: f64,
    pub class: ObjectClass,
    pub bbox: BBox,
    pub confidence: f64,
}

/// A detection with its bounding box converted to millimeters.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct WorldDetection {
    pub frame: u64,
    pub time_s: f64,
    pub class: ObjectClass,
    pub bbox: BBox,
    pub confidence: f64,
}

/// Millimeters per pixel for one analysis session.
///
/// Constructed only by calibration; a `Scale` in hand implies the
/// evidence check already passed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scale(pub f64);

impl Scale {
    pub fn mm_per_px(&self) -> f64 {
        self.0
    }
}

/// Physical size of the camera frame at the calibrated scale.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldSize {
    pub width_mm: f64,
    pub height_mm: f64,
}

impl WorldSize {
    pub fn width_cm(&self) -> f64 {
        self.width_mm / 10.0
    }

    pub fn height_cm(&self) -> f64 {
        self.height_mm / 10.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_id_mapping() {
        assert_eq!(ObjectClass::from_class_id(0), ObjectClass::Ball);
        assert_eq!(ObjectClass::from_class_id(1), ObjectClass::Putter);
        assert_eq!(ObjectClass::from_class_id(7), ObjectClass::Unknown);
    }

    #[test]
    fn bbox_measures() {
        let b = BBox {
            x1: 10.0,
            y1: 20.0,
            x2: 50.0,
            y2: 60.0,
        };
        assert_eq!(b.width(), 40.0);
        assert_eq!(b.height(), 40.0);
        assert_eq!(b.center(), (30.0, 40.0));
        assert_eq!(b.top_left(), (10.0, 20.0));
        assert_eq!(b.diameter(), 40.0);
    }

    #[test]
    fn square_tolerance_band() {
        let square = BBox {
            x1: 0.0,
            y1: 0.0,
            x2: 40.0,
            y2: 41.0,
        };
        assert!(square.is_square(0.1));

        let stretched = BBox {
            x1: 0.0,
            y1: 0.0,
            x2: 40.0,
            y2: 80.0,
        };
        assert!(!stretched.is_square(0.1));

        let degenerate = BBox {
            x1: 0.0,
            y1: 0.0,
            x2: 0.0,
            y2: 40.0,
        };
        assert!(!degenerate.is_square(0.1));
    }
}
