//! Keyframe tracks and interpolation

use glam::{Quat, Vec3};

/// Trait for types that can be interpolated between keyframes
pub trait Lerp: Clone {
    /// Interpolate between self and other
    fn lerp(&self, other: &Self, t: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

impl Lerp for Vec3 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Vec3::lerp(*self, *other, t)
    }
}

impl Lerp for Quat {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        // slerp already takes the shorter arc
        self.slerp(*other, t)
    }
}

/// How values between two keyframes are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Interpolation {
    /// Hold the earlier keyframe
    Step,
    #[default]
    Linear,
}

/// Find the index of the keyframe at or before the given time
///
/// Returns None if the track has no keyframes.
/// For interpolation, this returns the index of the earlier keyframe
/// in the bracketing pair (so we can interpolate between `[index]` and `[index+1]`).
pub fn find_keyframe_index(times: &[f32], time: f32) -> Option<usize> {
    if times.is_empty() {
        return None;
    }

    if times.len() == 1 {
        return Some(0);
    }

    let last_index = times.len() - 1;

    if time >= times[last_index] {
        return Some(last_index);
    }

    // Largest index where times[index] <= time
    let mut low = 0;
    let mut high = last_index;

    while low < high {
        let mid = (low + high).div_ceil(2);
        if times[mid] <= time {
            low = mid;
        } else {
            high = mid - 1;
        }
    }

    Some(low)
}

/// Keyframe track for one animated property of one bone
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Track<T> {
    #[cfg_attr(feature = "serde", serde(default))]
    pub interpolation: Interpolation,
    /// Keyframe times in seconds, ascending
    pub times: Vec<f32>,
    /// One value per keyframe
    pub values: Vec<T>,
}

impl<T: Lerp> Track<T> {
    pub fn new(interpolation: Interpolation, times: Vec<f32>, values: Vec<T>) -> Self {
        Self {
            interpolation,
            times,
            values,
        }
    }

    /// Linearly interpolated track
    pub fn linear(times: Vec<f32>, values: Vec<T>) -> Self {
        Self::new(Interpolation::Linear, times, values)
    }

    /// Stepped track
    pub fn step(times: Vec<f32>, values: Vec<T>) -> Self {
        Self::new(Interpolation::Step, times, values)
    }

    /// Single-keyframe track holding `value` for the whole clip
    pub fn constant(value: T) -> Self {
        Self::new(Interpolation::Step, vec![0.0], vec![value])
    }

    /// Time of the last keyframe
    pub fn end_time(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }

    /// Describe why this track cannot be sampled, if it cannot
    pub fn check(&self) -> std::result::Result<(), String> {
        if self.times.is_empty() {
            return Err("track has no keyframes".to_string());
        }
        if self.times.len() != self.values.len() {
            return Err(format!(
                "track has {} keyframe times but {} values",
                self.times.len(),
                self.values.len()
            ));
        }
        if self.times.iter().any(|t| !t.is_finite() || *t < 0.0) {
            return Err("keyframe times must be finite and non-negative".to_string());
        }
        if self.times.windows(2).any(|w| w[1] < w[0]) {
            return Err("keyframe times must be ascending".to_string());
        }
        Ok(())
    }

    /// Sample the track at `time` seconds
    ///
    /// Times before the first keyframe hold the first value, times at or
    /// past the last keyframe hold the last value.
    pub fn sample(&self, time: f32) -> Option<T> {
        let index = find_keyframe_index(&self.times, time)?;

        if time <= self.times[0] {
            return self.values.first().cloned();
        }

        if index >= self.times.len() - 1 {
            return self.values.last().cloned();
        }

        let time1 = self.times[index];
        let time2 = self.times[index + 1];
        let value1 = self.values.get(index)?;
        let value2 = self.values.get(index + 1)?;

        match self.interpolation {
            Interpolation::Step => Some(value1.clone()),
            Interpolation::Linear => {
                let t = if time2 > time1 {
                    (time - time1) / (time2 - time1)
                } else {
                    0.0
                };
                Some(value1.lerp(value2, t.clamp(0.0, 1.0)))
            }
        }
    }
}
