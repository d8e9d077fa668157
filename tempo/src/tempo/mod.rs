mod impact;
mod start;
mod top;

use crate::{
    error::TempoError,
    observer::{NullObserver, TempoEvent, TempoObserver},
    sample::{ImuSample, RotationAxis, sampling_interval},
    signal::{self, VectorSource},
};

/// Floor for the downswing duration so the ratio is always defined.
const MIN_DOWNSWING_S: f64 = 1e-6;

/// Tuning knobs for the tempo pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TempoOptions {
    /// Exponential smoothing factor in (0, 1]. 1.0 disables smoothing
    pub smoothing_alpha: f64,
    /// Gyro magnitude (deg/s) that counts as motion
    pub start_threshold: f64,
    /// How long motion must sustain before it counts as the start
    pub start_dwell_s: f64,
    /// Acceleration magnitude in g that counts as an impact candidate
    pub impact_threshold_g: f64,
    /// Window after a crossing searched for the true impact peak
    pub impact_refractory_s: f64,
    /// Axis carrying the main swing rotation
    pub top_axis: RotationAxis,
    /// Replace an implausible top with the quietest interior point
    pub fallback_correction: bool,
    /// Shortest plausible downswing
    pub downswing_min_s: f64,
    /// Longest plausible downswing
    pub downswing_max_s: f64,
}

impl TempoOptions {
    pub const fn new() -> Self {
        Self {
            smoothing_alpha: 0.2,
            start_threshold: 30.0,
            start_dwell_s: 0.05,
            impact_threshold_g: 1.8,
            impact_refractory_s: 0.05,
            top_axis: RotationAxis::Z,
            fallback_correction: true,
            downswing_min_s: 0.12,
            downswing_max_s: 0.6,
        }
    }

    pub const fn set_smoothing_alpha(mut self, smoothing_alpha: f64) -> Self {
        self.smoothing_alpha = smoothing_alpha;
        self
    }

    pub const fn set_start_threshold(mut self, start_threshold: f64) -> Self {
        self.start_threshold = start_threshold;
        self
    }

    pub const fn set_start_dwell_s(mut self, start_dwell_s: f64) -> Self {
        self.start_dwell_s = start_dwell_s;
        self
    }

    pub const fn set_impact_threshold_g(mut self, impact_threshold_g: f64) -> Self {
        self.impact_threshold_g = impact_threshold_g;
        self
    }

    pub const fn set_impact_refractory_s(mut self, impact_refractory_s: f64) -> Self {
        self.impact_refractory_s = impact_refractory_s;
        self
    }

    pub const fn set_top_axis(mut self, top_axis: RotationAxis) -> Self {
        self.top_axis = top_axis;
        self
    }

    pub const fn set_fallback_correction(mut self, fallback_correction: bool) -> Self {
        self.fallback_correction = fallback_correction;
        self
    }

    pub const fn set_downswing_bounds(mut self, min_s: f64, max_s: f64) -> Self {
        self.downswing_min_s = min_s;
        self.downswing_max_s = max_s;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), TempoError> {
        if !(self.smoothing_alpha > 0.0 && self.smoothing_alpha <= 1.0) {
            return Err(TempoError::Alpha(self.smoothing_alpha));
        }

        for (name, value) in [
            ("start_threshold", self.start_threshold),
            ("start_dwell_s", self.start_dwell_s),
            ("impact_threshold_g", self.impact_threshold_g),
            ("impact_refractory_s", self.impact_refractory_s),
            ("downswing_min_s", self.downswing_min_s),
            ("downswing_max_s", self.downswing_max_s),
        ] {
            if value <= 0.0 {
                return Err(TempoError::NonPositive { name, value });
            }
        }

        Ok(())
    }
}

impl Default for TempoOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Timing landmarks of one swing, as indices and as seconds from the first
/// sample.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TempoResult {
    pub start_idx: usize,
    pub top_idx: usize,
    pub impact_idx: usize,
    pub start_s: f64,
    pub top_s: f64,
    pub impact_s: f64,
    pub backswing_s: f64,
    pub downswing_s: f64,
    /// Backswing duration over downswing duration.
    pub tempo_ratio: f64,
    pub sampling_hz: f64,
}

impl TempoResult {
    fn from_indices(start_idx: usize, top_idx: usize, impact_idx: usize, dt: f64) -> Self {
        let backswing_s = ((top_idx as f64 - start_idx as f64) * dt).max(0.0);
        let downswing_s = ((impact_idx as f64 - top_idx as f64) * dt).max(MIN_DOWNSWING_S);

        Self {
            start_idx,
            top_idx,
            impact_idx,
            start_s: start_idx as f64 * dt,
            top_s: top_idx as f64 * dt,
            impact_s: impact_idx as f64 * dt,
            backswing_s,
            downswing_s,
            tempo_ratio: backswing_s / downswing_s,
            sampling_hz: 1.0 / dt,
        }
    }
}

/// Index of the quietest point strictly between `start` and `end`, if that
/// range is non-empty.
fn interior_argmin(signal_values: &[f64], start: usize, end: usize) -> Option<usize> {
    let lo = start + 1;
    let hi = end.min(signal_values.len());

    match lo < hi {
        true => Some(lo + signal::argmin(&signal_values[lo..hi])),
        false => None,
    }
}

/// Derives the tempo landmarks of a single recorded swing.
///
/// # Params
///
/// - `samples`: the inertial stream of one bounded motion event.
/// - `options`: detector tuning, see [`TempoOptions`].
///
/// Fails only on an empty stream or invalid options; every detector carries
/// a fallback, so any non-empty stream yields indices in `[0, N)`.
pub fn swing_tempo(
    samples: impl IntoIterator<Item = ImuSample>,
    options: &TempoOptions,
) -> Result<TempoResult, TempoError> {
    swing_tempo_with_observer(samples, options, &mut NullObserver)
}

/// Same as [`swing_tempo`], reporting each settled landmark through
/// `observer` as the pipeline runs.
pub fn swing_tempo_with_observer(
    samples: impl IntoIterator<Item = ImuSample>,
    options: &TempoOptions,
    observer: &mut dyn TempoObserver,
) -> Result<TempoResult, TempoError> {
    options.validate()?;

    let samples = samples.into_iter().collect::<Vec<_>>();
    if samples.is_empty() {
        return Err(TempoError::EmptyStream);
    }

    let TempoOptions {
        smoothing_alpha,
        start_threshold,
        start_dwell_s,
        impact_threshold_g,
        impact_refractory_s,
        top_axis,
        fallback_correction,
        downswing_min_s,
        downswing_max_s,
    } = *options;

    let dt = sampling_interval(&samples);
    let rate_hz = 1.0 / dt;

    let gyro_mag = signal::smooth(
        &signal::magnitude(&samples, VectorSource::Gyro),
        smoothing_alpha,
    );
    let accel_mag = signal::smooth(
        &signal::magnitude(&samples, VectorSource::Accel),
        smoothing_alpha,
    );
    let rotation = signal::smooth(
        &samples
            .iter()
            .map(|this| this.gyro_axis(top_axis))
            .collect::<Vec<_>>(),
        smoothing_alpha,
    );

    let start_idx = start::start_index(&gyro_mag, rate_hz, start_threshold, start_dwell_s);
    observer.on_event(TempoEvent::Start { idx: start_idx });

    let mut top_idx = top::top_index(&rotation, start_idx);
    observer.on_event(TempoEvent::Top { idx: top_idx });

    let mut impact_idx = impact::impact_index(
        &accel_mag,
        rate_hz,
        impact_threshold_g,
        impact_refractory_s,
        top_idx + 1,
    );
    observer.on_event(TempoEvent::Impact { idx: impact_idx });

    if impact_idx <= start_idx {
        impact_idx = impact::impact_index(
            &accel_mag,
            rate_hz,
            impact_threshold_g,
            impact_refractory_s,
            start_idx,
        );
        observer.on_event(TempoEvent::ImpactRetry { idx: impact_idx });
    }

    let downswing_s = (impact_idx as f64 - top_idx as f64) * dt;
    if fallback_correction && !(downswing_min_s..=downswing_max_s).contains(&downswing_s) {
        if let Some(corrected) = interior_argmin(&gyro_mag, start_idx, impact_idx) {
            observer.on_event(TempoEvent::TopCorrected {
                previous: top_idx,
                idx: corrected,
            });
            top_idx = corrected;
        }
    }

    Ok(TempoResult::from_indices(start_idx, top_idx, impact_idx, dt))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(gyro_z: f64, accel: (f64, f64, f64)) -> ImuSample {
        let (accel_x, accel_y, accel_z) = accel;

        ImuSample {
            timestamp: None,
            accel_x,
            accel_y,
            accel_z,
            gyro_x: 0.0,
            gyro_y: 0.0,
            gyro_z,
        }
    }

    /// 1 s at 100 Hz: motion from index 10, a quiet dip at 40, a late sign
    /// flip at 95 and an impact spike at 98. The raw downswing of 0.03 s is
    /// implausible, so the top must move to the dip.
    fn late_flip_swing() -> Vec<ImuSample> {
        (0..100)
            .map(|i| {
                let gyro_z = match i {
                    0..10 => 0.0,
                    40 => 0.5,
                    10..95 => 20.0,
                    _ => -20.0,
                };
                let accel = match i {
                    98 => (0.0, -9.8, -18.0),
                    _ => (0.0, 0.0, 1.0),
                };

                sample(gyro_z, accel)
            })
            .collect()
    }

    /// 3 s at 100 Hz shaped like a real swing: address, a sinusoidal
    /// backswing peaking at 45 deg/s, a faster counter-rotation and a broad
    /// acceleration surge into impact.
    fn full_swing() -> Vec<ImuSample> {
        use std::f64::consts::PI;

        (0..300)
            .map(|i| {
                let gyro_z = match i {
                    50..150 => 45.0 * (PI * (i - 50) as f64 / 100.0).sin(),
                    150..210 => -60.0 * (PI * (i - 150) as f64 / 60.0).sin(),
                    _ => 0.0,
                };
                let accel = match i {
                    170..180 => (0.0, -9.8, -25.0),
                    _ => (0.0, 0.0, -9.8),
                };

                sample(gyro_z, accel)
            })
            .collect()
    }

    #[test]
    fn implausible_downswing_moves_top_to_the_quiet_dip() {
        let options = TempoOptions::new()
            .set_smoothing_alpha(1.0)
            .set_start_threshold(15.0);

        let result = swing_tempo(late_flip_swing(), &options).expect("pipeline is total");

        assert_eq!(result.start_idx, 10);
        assert_eq!(result.top_idx, 40);
        assert_eq!(result.impact_idx, 98);
        assert!((result.downswing_s - 0.58).abs() < 1e-9);
        assert!((result.backswing_s - 0.30).abs() < 1e-9);
    }

    #[test]
    fn observer_sees_landmarks_in_pipeline_order() {
        let options = TempoOptions::new()
            .set_smoothing_alpha(1.0)
            .set_start_threshold(15.0);

        let mut events = Vec::new();
        let mut observer = |event: TempoEvent| events.push(event);
        swing_tempo_with_observer(late_flip_swing(), &options, &mut observer)
            .expect("pipeline is total");

        assert_eq!(
            events,
            [
                TempoEvent::Start { idx: 10 },
                TempoEvent::Top { idx: 95 },
                TempoEvent::Impact { idx: 98 },
                TempoEvent::TopCorrected {
                    previous: 95,
                    idx: 40
                },
            ]
        );
    }

    #[test]
    fn impact_before_start_restarts_the_search() {
        // A pre-motion spike owns the global maximum; the only threshold
        // crossing after the start sits between start and top.
        let samples = (0..60)
            .map(|i| {
                let gyro_z = match i {
                    0..10 => 0.0,
                    10..40 => 20.0,
                    _ => -20.0,
                };
                let accel = match i {
                    2 => (0.0, 0.0, 30.0),
                    25 => (0.0, 0.0, 20.0),
                    _ => (0.0, 0.0, 1.0),
                };

                sample(gyro_z, accel)
            })
            .collect::<Vec<_>>();

        let options = TempoOptions::new()
            .set_smoothing_alpha(1.0)
            .set_start_threshold(15.0)
            .set_fallback_correction(false);

        let mut events = Vec::new();
        let mut observer = |event: TempoEvent| events.push(event);
        let result = swing_tempo_with_observer(samples, &options, &mut observer)
            .expect("pipeline is total");

        assert_eq!(result.impact_idx, 25);
        assert!(events.contains(&TempoEvent::ImpactRetry { idx: 25 }));
    }

    #[test]
    fn full_swing_lands_near_three_to_one() {
        let result = swing_tempo(full_swing(), &TempoOptions::new()).expect("pipeline is total");

        assert!((60..110).contains(&result.start_idx), "{result:?}");
        assert!((148..158).contains(&result.top_idx), "{result:?}");
        assert!((168..185).contains(&result.impact_idx), "{result:?}");
        assert!(
            result.tempo_ratio > 2.0 && result.tempo_ratio < 4.5,
            "{result:?}"
        );
        assert!((result.sampling_hz - 100.0).abs() < 1e-9);
    }

    #[test]
    fn identical_input_yields_identical_output() {
        let samples = full_swing();
        let options = TempoOptions::new();

        let first = swing_tempo(samples.clone(), &options).expect("pipeline is total");
        let second = swing_tempo(samples, &options).expect("pipeline is total");

        assert_eq!(first, second);
    }

    #[test]
    fn concurrent_runs_agree_bit_for_bit() {
        use rayon::prelude::*;

        let samples = full_swing();
        let options = TempoOptions::new();

        let results = (0..8)
            .into_par_iter()
            .map(|_| swing_tempo(samples.clone(), &options).expect("pipeline is total"))
            .collect::<Vec<_>>();

        for result in &results {
            assert_eq!(result, &results[0]);
        }
    }

    #[test]
    fn degenerate_streams_stay_in_bounds() {
        let quiet = vec![sample(0.0, (0.0, 0.0, 0.0)); 16];
        let constant = vec![sample(5.0, (0.0, 0.0, 1.0)); 16];
        let single = vec![sample(3.0, (0.0, 0.0, 9.8))];

        for samples in [quiet, constant, single] {
            let n = samples.len();
            let result = swing_tempo(samples, &TempoOptions::new()).expect("pipeline is total");

            assert!(result.start_idx < n);
            assert!(result.top_idx < n);
            assert!(result.impact_idx < n);
            assert!(result.downswing_s >= MIN_DOWNSWING_S);
            assert!(result.tempo_ratio.is_finite());
        }
    }

    #[test]
    fn empty_stream_is_rejected() {
        assert_eq!(
            swing_tempo(Vec::new(), &TempoOptions::new()),
            Err(TempoError::EmptyStream)
        );
    }

    #[test]
    fn invalid_options_are_rejected() {
        let samples = vec![sample(1.0, (0.0, 0.0, 1.0)); 4];

        assert_eq!(
            swing_tempo(
                samples.clone(),
                &TempoOptions::new().set_smoothing_alpha(0.0)
            ),
            Err(TempoError::Alpha(0.0))
        );
        assert_eq!(
            swing_tempo(
                samples.clone(),
                &TempoOptions::new().set_smoothing_alpha(1.5)
            ),
            Err(TempoError::Alpha(1.5))
        );
        assert_eq!(
            swing_tempo(samples, &TempoOptions::new().set_start_threshold(-1.0)),
            Err(TempoError::NonPositive {
                name: "start_threshold",
                value: -1.0
            })
        );
    }
}
