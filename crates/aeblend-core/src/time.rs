use serde::{Deserialize, Serialize};
use std::fmt;

/// Which span of composition time an export covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimeRangePolicy {
    /// The whole composition, from time 0 to its duration.
    WholeComp,
    /// The composition's work area.
    WorkArea,
    /// Each layer's own in/out span.
    LayerDuration,
}

impl Default for TimeRangePolicy {
    fn default() -> Self {
        TimeRangePolicy::WholeComp
    }
}

impl fmt::Display for TimeRangePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeRangePolicy::WholeComp => write!(f, "wholeComp"),
            TimeRangePolicy::WorkArea => write!(f, "workArea"),
            TimeRangePolicy::LayerDuration => write!(f, "layerDuration"),
        }
    }
}

/// A half-open range of whole frames `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRange {
    pub start: i64,
    pub end: i64,
}

impl FrameRange {
    /// Convert a `(start time, duration)` span in seconds to frame bounds.
    ///
    /// The start is floored and the duration is ceiled so that the sampled
    /// range always fully covers the requested time span, even when the
    /// products land just below a whole frame due to floating-point error.
    /// Naive rounding here causes systematic one-frame range errors.
    pub fn resolve(start_time: f64, duration: f64, frame_rate: f64) -> Self {
        let start = (start_time * frame_rate).floor() as i64;
        let end = start + (duration * frame_rate).ceil() as i64;
        Self { start, end }
    }

    /// Number of whole frames in the range.
    pub fn frame_count(&self) -> i64 {
        (self.end - self.start).max(0)
    }

    /// Number of samples the range yields at the given supersampling rate.
    pub fn sample_count(&self, supersampling: u32) -> usize {
        (self.frame_count() as usize) * supersampling.max(1) as usize
    }

    /// Iterate the (possibly fractional) frame numbers to sample, in
    /// ascending order: sample `i` lands on frame `start + i / supersampling`.
    pub fn sample_frames(&self, supersampling: u32) -> impl Iterator<Item = f64> {
        let supersampling = supersampling.max(1);
        let start = self.start;
        (0..self.sample_count(supersampling))
            .map(move |i| start as f64 + i as f64 / supersampling as f64)
    }
}

impl fmt::Display for FrameRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Select the `(start time, duration)` span for a policy and resolve it to
/// frame bounds.
///
/// `work_area` is `(start, duration)` in seconds; `layer_span` is the layer's
/// `(in point, out point)` in seconds.
pub fn resolve_frame_range(
    policy: TimeRangePolicy,
    comp_duration: f64,
    work_area: (f64, f64),
    layer_span: (f64, f64),
    frame_rate: f64,
) -> FrameRange {
    let (start_time, duration) = match policy {
        TimeRangePolicy::WholeComp => (0.0, comp_duration),
        TimeRangePolicy::WorkArea => work_area,
        TimeRangePolicy::LayerDuration => (layer_span.0, layer_span.1 - layer_span.0),
    };
    FrameRange::resolve(start_time, duration, frame_rate)
}
