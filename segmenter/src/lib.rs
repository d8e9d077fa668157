//! # Swing segmenter
//!
//! Splits a continuous inertial stream into discrete swings with a
//! dual-threshold hysteresis state machine over the raw gyro magnitude: a
//! swing opens when the magnitude reaches the start threshold and closes
//! once it has stayed below the (lower) end threshold for a minimum gap.
//! Segments shorter than the minimum swing duration are discarded.

use tempo::{ImuSample, sampling_rate};

/// Tuning knobs for the hysteresis segmenter.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SegmenterOptions {
    /// Gyro magnitude (deg/s) that opens a swing
    pub start_threshold: f64,
    /// Gyro magnitude below which the swing is considered winding down
    pub end_threshold: f64,
    /// Segments shorter than this are discarded
    pub min_swing_s: f64,
    /// How long the magnitude must stay below the end threshold to close
    pub min_gap_s: f64,
}

impl SegmenterOptions {
    pub const fn new() -> Self {
        Self {
            start_threshold: 25.0,
            end_threshold: 10.0,
            min_swing_s: 0.3,
            min_gap_s: 0.2,
        }
    }

    pub const fn set_thresholds(mut self, start_threshold: f64, end_threshold: f64) -> Self {
        self.start_threshold = start_threshold;
        self.end_threshold = end_threshold;
        self
    }

    pub const fn set_min_swing_s(mut self, min_swing_s: f64) -> Self {
        self.min_swing_s = min_swing_s;
        self
    }

    pub const fn set_min_gap_s(mut self, min_gap_s: f64) -> Self {
        self.min_gap_s = min_gap_s;
        self
    }

    fn validate(&self) -> Result<(), SegmenterError> {
        for (name, value) in [
            ("start_threshold", self.start_threshold),
            ("end_threshold", self.end_threshold),
            ("min_swing_s", self.min_swing_s),
            ("min_gap_s", self.min_gap_s),
        ] {
            if value <= 0.0 {
                return Err(SegmenterError::NonPositive { name, value });
            }
        }

        if self.start_threshold <= self.end_threshold {
            return Err(SegmenterError::ThresholdOrder {
                start: self.start_threshold,
                end: self.end_threshold,
            });
        }

        Ok(())
    }
}

impl Default for SegmenterOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Hard failures of the segmenter.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SegmenterError {
    #[error("sample stream is empty")]
    EmptyStream,
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },
    #[error("start threshold ({start}) must exceed end threshold ({end})")]
    ThresholdOrder { start: f64, end: f64 },
}

/// One detected swing, as an inclusive index range into the input stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SwingSegment {
    pub lo: usize,
    pub hi: usize,
}

impl SwingSegment {
    pub const fn sample_count(&self) -> usize {
        self.hi - self.lo + 1
    }

    /// The samples covered by this segment.
    ///
    /// # Params
    ///
    /// - `samples`: the stream this segment was produced from.
    pub fn slice<'a>(&self, samples: &'a [ImuSample]) -> &'a [ImuSample] {
        &samples[self.lo..=self.hi]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    InSwing,
}

#[derive(Debug)]
struct SegmentTracker {
    phase: Phase,
    open: usize,
    below: usize,
    gap_len: usize,
    min_len: usize,
}

impl SegmentTracker {
    const fn new(gap_len: usize, min_len: usize) -> Self {
        Self {
            phase: Phase::Idle,
            open: 0,
            below: 0,
            gap_len,
            min_len,
        }
    }

    /// Feed one magnitude; returns a segment the moment one closes.
    fn step(
        &mut self,
        i: usize,
        magnitude: f64,
        start_threshold: f64,
        end_threshold: f64,
    ) -> Option<SwingSegment> {
        match self.phase {
            Phase::Idle => {
                if magnitude >= start_threshold {
                    self.phase = Phase::InSwing;
                    self.open = i;
                    self.below = 0;
                }

                None
            }
            Phase::InSwing => match magnitude < end_threshold {
                true => {
                    self.below += 1;

                    match self.below >= self.gap_len {
                        true => {
                            self.phase = Phase::Idle;
                            self.below = 0;

                            // The swing ended where the quiet gap began.
                            self.emit(self.open.max((i + 1).saturating_sub(self.gap_len)))
                        }
                        false => None,
                    }
                }
                false => {
                    self.below = 0;

                    None
                }
            },
        }
    }

    /// Close a swing still open at the end of the stream.
    fn finish(&mut self, last: usize) -> Option<SwingSegment> {
        match self.phase {
            Phase::InSwing => {
                self.phase = Phase::Idle;
                self.emit(last)
            }
            Phase::Idle => None,
        }
    }

    fn emit(&self, hi: usize) -> Option<SwingSegment> {
        let segment = SwingSegment { lo: self.open, hi };

        match segment.sample_count() >= self.min_len {
            true => Some(segment),
            false => None,
        }
    }
}

/// Splits a continuous stream into swing segments.
///
/// Segments come out ordered and non-overlapping, each at least the minimum
/// swing duration long. A stream that never reaches the start threshold
/// yields an empty list; only an empty stream or invalid options fail.
pub fn segment_swings(
    samples: impl IntoIterator<Item = ImuSample>,
    options: &SegmenterOptions,
) -> Result<Vec<SwingSegment>, SegmenterError> {
    options.validate()?;

    let samples = samples.into_iter().collect::<Vec<_>>();
    if samples.is_empty() {
        return Err(SegmenterError::EmptyStream);
    }

    let rate_hz = sampling_rate(&samples);
    let gap_len = (options.min_gap_s * rate_hz).ceil().max(1.0) as usize;
    let min_len = (options.min_swing_s * rate_hz).ceil().max(1.0) as usize;

    let mut tracker = SegmentTracker::new(gap_len, min_len);
    let mut segments = Vec::new();

    for (i, sample) in samples.iter().enumerate() {
        if let Some(segment) = tracker.step(
            i,
            sample.gyro_magnitude(),
            options.start_threshold,
            options.end_threshold,
        ) {
            segments.push(segment);
        }
    }

    if let Some(segment) = tracker.finish(samples.len() - 1) {
        segments.push(segment);
    }

    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(gyro_magnitude: f64) -> ImuSample {
        ImuSample {
            timestamp: None,
            accel_x: 0.0,
            accel_y: 0.0,
            accel_z: 0.0,
            gyro_x: gyro_magnitude,
            gyro_y: 0.0,
            gyro_z: 0.0,
        }
    }

    fn stream(spans: impl IntoIterator<Item = (usize, f64)>) -> Vec<ImuSample> {
        spans
            .into_iter()
            .flat_map(|(count, magnitude)| std::iter::repeat_n(sample(magnitude), count))
            .collect()
    }

    #[test]
    fn quiet_stream_has_no_segments() {
        let samples = stream([(50, 1.0)]);

        assert_eq!(
            segment_swings(samples, &SegmenterOptions::new()),
            Ok(Vec::new())
        );
    }

    #[test]
    fn rectangular_pulse_becomes_one_segment() {
        // 0.4 s pulse at 100 Hz, closed by 0.2 s of quiet.
        let samples = stream([(30, 1.0), (40, 50.0), (30, 1.0)]);

        let segments =
            segment_swings(samples, &SegmenterOptions::new()).expect("stream is non-empty");

        assert_eq!(segments, [SwingSegment { lo: 30, hi: 70 }]);
    }

    #[test]
    fn short_pulse_is_discarded() {
        // 0.1 s pulse, shorter than the 0.3 s minimum.
        let samples = stream([(30, 1.0), (10, 50.0), (60, 1.0)]);

        assert_eq!(
            segment_swings(samples, &SegmenterOptions::new()),
            Ok(Vec::new())
        );
    }

    #[test]
    fn brief_dip_does_not_split_a_swing() {
        // A 0.1 s dip below the end threshold, shorter than the 0.2 s gap.
        let samples = stream([(30, 1.0), (30, 50.0), (10, 5.0), (20, 50.0), (40, 1.0)]);

        let segments =
            segment_swings(samples, &SegmenterOptions::new()).expect("stream is non-empty");

        assert_eq!(segments, [SwingSegment { lo: 30, hi: 90 }]);
    }

    #[test]
    fn swing_still_open_at_stream_end_is_closed_there() {
        let samples = stream([(30, 1.0), (40, 50.0)]);

        let segments =
            segment_swings(samples, &SegmenterOptions::new()).expect("stream is non-empty");

        assert_eq!(segments, [SwingSegment { lo: 30, hi: 69 }]);
    }

    #[test]
    fn two_swings_come_out_ordered_and_disjoint() {
        let samples = stream([(20, 1.0), (40, 50.0), (60, 1.0), (40, 50.0), (40, 1.0)]);

        let segments =
            segment_swings(samples, &SegmenterOptions::new()).expect("stream is non-empty");

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0], SwingSegment { lo: 20, hi: 60 });
        assert_eq!(segments[1], SwingSegment { lo: 120, hi: 160 });
        assert!(segments[0].hi < segments[1].lo);
    }

    #[test]
    fn slice_covers_the_inclusive_range() {
        let samples = stream([(10, 1.0), (5, 50.0), (10, 1.0)]);
        let segment = SwingSegment { lo: 10, hi: 14 };

        assert_eq!(segment.slice(&samples).len(), 5);
        assert_eq!(segment.sample_count(), 5);
    }

    #[test]
    fn empty_stream_is_rejected() {
        assert_eq!(
            segment_swings(Vec::new(), &SegmenterOptions::new()),
            Err(SegmenterError::EmptyStream)
        );
    }

    #[test]
    fn invalid_options_are_rejected() {
        let samples = stream([(10, 1.0)]);

        assert_eq!(
            segment_swings(
                samples.clone(),
                &SegmenterOptions::new().set_thresholds(10.0, 25.0)
            ),
            Err(SegmenterError::ThresholdOrder {
                start: 10.0,
                end: 25.0
            })
        );
        assert_eq!(
            segment_swings(samples, &SegmenterOptions::new().set_min_gap_s(0.0)),
            Err(SegmenterError::NonPositive {
                name: "min_gap_s",
                value: 0.0
            })
        );
    }

    #[test]
    fn tracker_reopens_after_a_close() {
        let mut tracker = SegmentTracker::new(2, 1);

        assert_eq!(tracker.step(0, 30.0, 25.0, 10.0), None);
        assert_eq!(tracker.phase, Phase::InSwing);
        assert_eq!(tracker.step(1, 5.0, 25.0, 10.0), None);
        assert_eq!(
            tracker.step(2, 5.0, 25.0, 10.0),
            Some(SwingSegment { lo: 0, hi: 1 })
        );
        assert_eq!(tracker.phase, Phase::Idle);

        assert_eq!(tracker.step(3, 30.0, 25.0, 10.0), None);
        assert_eq!(tracker.phase, Phase::InSwing);
        assert_eq!(tracker.open, 3);
    }
}
