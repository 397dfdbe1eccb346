use std::ops::Range;
use log::debug;
use serde::{Deserialize, Serialize};
use crate::config::config::WindowConfig;
use crate::pipeline::affect::FrameAffect;
use crate::utils::utils::mean;

/// Video-level affect metrics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AggregateMetrics {
    pub confidence: f32,
    pub nervousness: f32,
    pub eye_contact: f32,
}

/// Per-frame eye contact samples of the whole video, in frame order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EyeContactSeries {
    samples: Vec<f32>,
}

impl EyeContactSeries {
    pub fn new() -> Self {
        EyeContactSeries { samples: Vec::new() }
    }

    pub fn push(&mut self, eye_contact: f32) {
        self.samples.push(eye_contact);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.samples
    }
}

impl From<Vec<f32>> for EyeContactSeries {
    fn from(samples: Vec<f32>) -> Self {
        EyeContactSeries { samples }
    }
}

/// window_partition splits `len` samples into `len / window_size` contiguous windows.
///
/// The remainder is spread one sample each over the leading windows, so window
/// lengths differ by at most one. Returns no windows when `len < window_size`.
pub fn window_partition(len: usize, window_size: usize) -> Vec<Range<usize>> {
    let window_count = len / window_size.max(1);
    if window_count == 0 {
        return vec![]
    }

    let base = len / window_count;
    let extra = len % window_count;
    let mut windows = Vec::with_capacity(window_count);
    let mut start = 0;
    for idx in 0..window_count {
        let size = if idx < extra { base + 1 } else { base };
        windows.push(start..start + size);
        start += size;
    }
    windows
}

/// eye_contact_pattern scores how consistently eye contact was held over time.
///
/// Short series return their mean. Longer series are cut into windows and
/// return `quality_span * good_windows / windows + floor`, where a window is good
/// when its mean exceeds `good_window_threshold`. The result is kept in `[floor, 1]`.
///
/// # Arguments
/// * `series` - &EyeContactSeries
/// * `config` - &WindowConfig
///
/// # Returns
/// * `Option<f32>`, None for an empty series
pub fn eye_contact_pattern(series: &EyeContactSeries, config: &WindowConfig) -> Option<f32> {
    let samples = series.as_slice();
    let overall = mean(samples)?;

    let windows = window_partition(samples.len(), config.window_size);
    let result = if windows.is_empty() {
        overall
    } else {
        let mut good_windows = 0usize;
        for window in &windows {
            let window_mean = mean(&samples[window.clone()]).unwrap_or(0.0);
            debug!("eye contact window {:?}: mean {:.3}", window, window_mean);
            if window_mean > config.good_window_threshold {
                good_windows += 1;
            }
        }
        let window_quality = good_windows as f32 / windows.len() as f32;
        window_quality * config.quality_span + config.floor
    };

    Some(result.max(config.floor).min(1.0))
}

/// TemporalAggregator collects the affect of every analyzed frame.
#[derive(Debug, Clone)]
pub struct TemporalAggregator {
    config: WindowConfig,
    confidence: Vec<f32>,
    nervousness: Vec<f32>,
    eye_contact: EyeContactSeries,
}

impl TemporalAggregator {
    pub fn new(config: WindowConfig) -> Self {
        TemporalAggregator {
            config,
            confidence: Vec::new(),
            nervousness: Vec::new(),
            eye_contact: EyeContactSeries::new(),
        }
    }

    pub fn push(&mut self, affect: &FrameAffect) {
        self.confidence.push(affect.confidence);
        self.nervousness.push(affect.nervousness);
        self.eye_contact.push(affect.eye_contact);
    }

    pub fn len(&self) -> usize {
        self.eye_contact.len()
    }

    pub fn is_empty(&self) -> bool {
        self.eye_contact.is_empty()
    }

    /// finish computes the video-level metrics, or None when no frame was analyzed.
    pub fn finish(self) -> Option<AggregateMetrics> {
        Some(AggregateMetrics {
            confidence: mean(&self.confidence)?,
            nervousness: mean(&self.nervousness)?,
            eye_contact: eye_contact_pattern(&self.eye_contact, &self.config)?,
        })
    }
}
