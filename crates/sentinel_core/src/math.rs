//! Angle geometry and order statistics shared by the detectors.
//!
//! All angles are in degrees. Yaw wraps at +-180, pitch is positive when
//! looking down, matching the replay's view-angle convention.

use serde::{Deserialize, Serialize};

/// World-space position in game units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Z coordinate (up).
    pub z: f64,
}

impl Vec3 {
    /// Create a new vector.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Component-wise difference `self - other`.
    #[must_use]
    pub fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    /// Dot product of two vectors.
    #[must_use]
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Euclidean length.
    #[must_use]
    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit vector in the same direction, or `None` for a zero-length vector.
    #[must_use]
    pub fn normalized(self) -> Option<Self> {
        let len = self.length();
        if len > f64::EPSILON && len.is_finite() {
            Some(Self::new(self.x / len, self.y / len, self.z / len))
        } else {
            None
        }
    }
}

/// A view direction expressed as yaw and pitch in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewAngles {
    /// Horizontal angle in degrees.
    pub yaw: f64,
    /// Vertical angle in degrees (positive looks down).
    pub pitch: f64,
}

impl ViewAngles {
    /// Create new view angles.
    #[must_use]
    pub const fn new(yaw: f64, pitch: f64) -> Self {
        Self { yaw, pitch }
    }

    /// Unit forward vector for these angles.
    #[must_use]
    pub fn forward(self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.to_radians().sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.to_radians().sin_cos();
        Vec3::new(cos_pitch * cos_yaw, cos_pitch * sin_yaw, -sin_pitch)
    }

    /// Combined wrap-aware angular distance to `other`, in degrees.
    #[must_use]
    pub fn distance_to(self, other: Self) -> f64 {
        angular_distance(self, other)
    }
}

/// Shortest signed difference `to - from` in degrees, wrapped into [-180, 180].
#[must_use]
pub fn angle_diff(from: f64, to: f64) -> f64 {
    let diff = (to - from + 180.0).rem_euclid(360.0) - 180.0;
    if diff < -180.0 {
        diff + 360.0
    } else {
        diff
    }
}

/// Euclidean combination of the wrap-aware yaw and pitch differences.
#[must_use]
pub fn angular_distance(a: ViewAngles, b: ViewAngles) -> f64 {
    angle_diff(a.yaw, b.yaw).hypot(angle_diff(a.pitch, b.pitch))
}

/// Clamp a value into [0, 1]. NaN maps to 0.
#[must_use]
pub fn clamp01(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Linear ramp that is 0 at `baseline` and 1 at `extreme`, clamped to [0, 1].
///
/// Works in both directions: if `extreme < baseline`, smaller inputs score higher.
#[must_use]
pub fn linear_score(value: f64, baseline: f64, extreme: f64) -> f64 {
    let span = extreme - baseline;
    if span == 0.0 {
        return if value >= extreme { 1.0 } else { 0.0 };
    }
    clamp01((value - baseline) / span)
}

/// Index of the `fraction` quantile in a sorted sample of `len` items.
///
/// `floor(fraction * len)`, clamped to the last index. `len` must be non-zero.
#[must_use]
pub fn percentile_index(len: usize, fraction: f64) -> usize {
    debug_assert!(len > 0);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let idx = (len as f64 * fraction).floor() as usize;
    idx.min(len - 1)
}

/// Order statistics over an ascending-sorted sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleSummary {
    /// Number of samples.
    pub count: usize,
    /// Median (`sorted[len / 2]`).
    pub median: f64,
    /// Arithmetic mean.
    pub mean: f64,
}

impl SampleSummary {
    /// Summarize a sorted sample; `None` when empty.
    #[must_use]
    pub fn of_sorted(sorted: &[f64]) -> Option<Self> {
        if sorted.is_empty() {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        let mean = sorted.iter().sum::<f64>() / sorted.len() as f64;
        Some(Self {
            count: sorted.len(),
            median: sorted[sorted.len() / 2],
            mean,
        })
    }

    /// Quantile of a sorted, non-empty sample using [`percentile_index`].
    #[must_use]
    pub fn quantile(sorted: &[f64], fraction: f64) -> f64 {
        sorted[percentile_index(sorted.len(), fraction)]
    }
}

/// Sort a sample ascending with a total order (NaN last).
pub fn sort_samples(samples: &mut [f64]) {
    samples.sort_by(f64::total_cmp);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_angle_diff_wraps() {
        assert!((angle_diff(170.0, -170.0) - 20.0).abs() < 1e-9);
        assert!((angle_diff(-170.0, 170.0) + 20.0).abs() < 1e-9);
        assert!((angle_diff(10.0, 30.0) - 20.0).abs() < 1e-9);
        assert!(angle_diff(0.0, 180.0).abs() <= 180.0);
    }

    #[test]
    fn test_angular_distance_combines_axes() {
        let a = ViewAngles::new(0.0, 0.0);
        let b = ViewAngles::new(3.0, 4.0);
        assert!((angular_distance(a, b) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_forward_vector_is_unit() {
        let v = ViewAngles::new(37.0, -12.0).forward();
        assert!((v.length() - 1.0).abs() < 1e-9);
        let east = ViewAngles::new(0.0, 0.0).forward();
        assert!((east.x - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_linear_score_directions() {
        assert!((linear_score(65.0, 55.0, 75.0) - 0.5).abs() < 1e-9);
        assert!((linear_score(90.0, 120.0, 60.0) - 0.5).abs() < 1e-9);
        assert_eq!(linear_score(10.0, 55.0, 75.0), 0.0);
        assert_eq!(linear_score(30.0, 120.0, 60.0), 1.0);
    }

    #[test]
    fn test_percentile_index_clamps() {
        assert_eq!(percentile_index(1, 0.95), 0);
        assert_eq!(percentile_index(20, 0.95), 19);
        assert_eq!(percentile_index(100, 0.95), 95);
        assert_eq!(percentile_index(10, 0.1), 1);
    }

    #[test]
    fn test_sample_summary() {
        let mut samples = vec![3.0, 1.0, 2.0, 4.0];
        sort_samples(&mut samples);
        let summary = SampleSummary::of_sorted(&samples).unwrap();
        assert_eq!(summary.count, 4);
        assert_eq!(summary.median, 3.0);
        assert!((summary.mean - 2.5).abs() < 1e-9);
        assert!(SampleSummary::of_sorted(&[]).is_none());
    }
}
