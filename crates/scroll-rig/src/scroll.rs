//! Scroll progress normalization and event coalescing

use log::{debug, trace, warn};

use crate::error::{Result, RigError};

/// Clamp progress into [0, 1], mapping NaN to 0
pub fn sanitize_progress(progress: f32) -> f32 {
    if progress.is_nan() {
        0.0
    } else {
        progress.clamp(0.0, 1.0)
    }
}

/// Convert raw scroll geometry into progress
///
/// `scroll_height - viewport_height` is the scrollable distance; when it is
/// zero or negative the page cannot scroll and the result is
/// `RigError::DegenerateScroll`.
pub fn progress_from_scroll(
    scroll_top: f32,
    scroll_height: f32,
    viewport_height: f32,
) -> Result<f32> {
    let scrollable = scroll_height - viewport_height;
    if !scrollable.is_finite() || scrollable <= 0.0 {
        return Err(RigError::DegenerateScroll(scrollable));
    }
    Ok(sanitize_progress(scroll_top / scrollable))
}

/// Scroll sampling settings
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScrollConfig {
    /// Minimum seconds between released progress values
    pub min_interval: f64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            min_interval: 0.016,
        }
    }
}

/// Coalesces bursts of scroll events into at most one value per interval
///
/// Only the latest value of a burst is kept; intermediate values are
/// dropped since the controller resolves any jump on its own.
#[derive(Debug, Clone)]
pub struct ScrollSampler {
    config: ScrollConfig,
    pending: Option<f32>,
    latest: f32,
    last_release: Option<f64>,
}

impl ScrollSampler {
    pub fn new(config: ScrollConfig) -> Self {
        Self {
            config,
            pending: None,
            latest: 0.0,
            last_release: None,
        }
    }

    /// Record a scroll event from raw geometry, returning the progress it maps to
    ///
    /// Degenerate geometry is logged and treated as progress 0.
    pub fn push(&mut self, scroll_top: f32, scroll_height: f32, viewport_height: f32) -> f32 {
        let progress = match progress_from_scroll(scroll_top, scroll_height, viewport_height) {
            Ok(progress) => progress,
            Err(err) => {
                warn!("{err}, using progress 0");
                0.0
            }
        };
        self.push_progress(progress);
        progress
    }

    /// Record an already-normalized progress value
    pub fn push_progress(&mut self, progress: f32) {
        let progress = sanitize_progress(progress);
        trace!("Scroll event at progress {progress:.4}");
        self.pending = Some(progress);
    }

    /// Release the pending value if the interval since the last release has passed
    ///
    /// `now` is a timestamp in seconds supplied by the host. A clock that
    /// went backwards releases immediately and restarts the interval.
    pub fn poll(&mut self, now: f64) -> Option<f32> {
        let progress = self.pending?;
        if let Some(last) = self.last_release {
            if now >= last && now - last < self.config.min_interval {
                return None;
            }
            if now < last {
                debug!("Scroll clock went backwards ({last} -> {now}), releasing");
            }
        }
        self.pending = None;
        self.latest = progress;
        self.last_release = Some(now);
        Some(progress)
    }

    /// Last released progress
    pub fn latest(&self) -> f32 {
        self.latest
    }

    /// Whether a value is waiting for release
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl Default for ScrollSampler {
    fn default() -> Self {
        Self::new(ScrollConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0.5, 0.5 ; "in range")]
    #[test_case(-0.2, 0.0 ; "negative")]
    #[test_case(1.7, 1.0 ; "above one")]
    #[test_case(f32::NAN, 0.0 ; "nan")]
    #[test_case(f32::INFINITY, 1.0 ; "infinity")]
    #[test_case(f32::NEG_INFINITY, 0.0 ; "negative infinity")]
    fn test_sanitize_progress(input: f32, expected: f32) {
        assert_eq!(sanitize_progress(input), expected);
    }

    #[test]
    fn test_progress_from_scroll() {
        assert_eq!(progress_from_scroll(500.0, 2000.0, 1000.0), Ok(0.5));
        assert_eq!(progress_from_scroll(1200.0, 2000.0, 1000.0), Ok(1.0));
    }

    #[test]
    fn test_degenerate_scroll() {
        assert_eq!(
            progress_from_scroll(0.0, 800.0, 800.0),
            Err(RigError::DegenerateScroll(0.0))
        );
        assert!(progress_from_scroll(0.0, 500.0, 800.0).is_err());
        assert!(progress_from_scroll(0.0, f32::NAN, 800.0).is_err());
    }

    #[test]
    fn test_sampler_degenerate_yields_zero() {
        let mut sampler = ScrollSampler::default();
        assert_eq!(sampler.push(300.0, 800.0, 800.0), 0.0);
        assert_eq!(sampler.poll(0.0), Some(0.0));
    }

    #[test]
    fn test_sampler_coalesces_bursts() {
        let mut sampler = ScrollSampler::default();
        sampler.push_progress(0.1);
        assert_eq!(sampler.poll(1.0), Some(0.1));

        sampler.push_progress(0.2);
        sampler.push_progress(0.3);
        assert_eq!(sampler.poll(1.005), None);
        sampler.push_progress(0.4);
        assert_eq!(sampler.poll(1.020), Some(0.4));
        assert_eq!(sampler.latest(), 0.4);
        assert!(!sampler.has_pending());
        assert_eq!(sampler.poll(2.0), None);
    }

    #[test]
    fn test_sampler_survives_clock_reset() {
        let mut sampler = ScrollSampler::default();
        sampler.push_progress(0.5);
        assert_eq!(sampler.poll(100.0), Some(0.5));

        // Host clock restarted near zero
        sampler.push_progress(0.6);
        assert_eq!(sampler.poll(0.5), Some(0.6));

        // The interval is measured from the new release
        sampler.push_progress(0.7);
        assert_eq!(sampler.poll(0.505), None);
        assert_eq!(sampler.poll(0.52), Some(0.7));
    }
}
