//! Geometry and statistics primitives shared by every pipeline stage.
//!
//! Positions and displacements are plain `(x, y)` tuples in whatever space
//! the caller is working in (pixels before calibration, millimeters after).

/// 2D point or vector.
pub type Vec2 = (f64, f64);

pub fn add(a: Vec2, b: Vec2) -> Vec2 {
    (a.0 + b.0, a.1 + b.1)
}

pub fn sub(a: Vec2, b: Vec2) -> Vec2 {
    (a.0 - b.0, a.1 - b.1)
}

pub fn magnitude(v: Vec2) -> f64 {
    (v.0 * v.0 + v.1 * v.1).sqrt()
}

pub fn distance(a: Vec2, b: Vec2) -> f64 {
    magnitude(sub(a, b))
}

pub fn within(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance
}

pub fn radians_to_degrees(radians: f64) -> f64 {
    radians * (180.0 / std::f64::consts::PI)
}

/// Mean of a slice. Returns `None` for empty input instead of NaN.
pub fn average(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Mean after dropping the lowest and highest `trim_fraction` of samples.
///
/// Samples are sorted ascending first, so a single wild outlier lands in
/// the trimmed tail and never moves the result. Returns `None` when the
/// trimmed set is empty.
pub fn trimmed_mean(values: &[f64], trim_fraction: f64) -> Option<f64> {
    let mut sorted: Vec<f64> = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let start = (sorted.len() as f64 * trim_fraction).floor() as usize;
    let end = (sorted.len() as f64 * (1.0 - trim_fraction)).floor() as usize;
    if start >= end {
        return None;
    }
    average(&sorted[start..end])
}
