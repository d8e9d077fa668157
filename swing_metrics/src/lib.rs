//! # Swing metrics
//!
//! Derived ball-flight numbers for one recorded swing:
//!
//! - club speed from the peak gyro magnitude,
//! - attack angle and club path from the mean dynamic acceleration in a
//!   short window just before impact,
//! - launch angle and spin rate from a rough empirical model.
//!
//! Gravity is assumed along negative Y in the sensor frame; the forward
//! direction during the downswing is along negative Z.

use tempo::{ImuSample, sampling_interval};

/// Calibration from peak angular speed (deg/s) to clubhead speed (km/h).
pub const GYRO_TO_KPH: f64 = 1.5;

const MPH_PER_MPS: f64 = 2.23694;
const KPH_PER_MPS: f64 = 3.6;
const GRAVITY_Y_MPS2: f64 = 9.8;
const PRE_IMPACT_WINDOW_S: f64 = 0.06;
/// Samples right before impact carry the launch spike; the angle window
/// stops short of them.
const SPIKE_EXCLUSION_SAMPLES: usize = 2;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MetricsError {
    #[error("sample stream is empty")]
    EmptyStream,
}

/// Derived numbers for one swing.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SwingMetrics {
    pub club_speed_mps: f64,
    pub club_speed_mph: f64,
    pub club_speed_kph: f64,
    pub attack_angle_deg: f64,
    pub club_path_deg: f64,
    pub launch_angle_deg: f64,
    pub spin_rate_rpm: f64,
    /// Index of the peak-rotation sample the angles were anchored to.
    pub impact_idx: usize,
}

/// Computes every metric for one swing.
pub fn swing_metrics(
    samples: impl IntoIterator<Item = ImuSample>,
) -> Result<SwingMetrics, MetricsError> {
    let samples = samples.into_iter().collect::<Vec<_>>();
    if samples.is_empty() {
        return Err(MetricsError::EmptyStream);
    }

    let dt = sampling_interval(&samples);
    let impact_idx = peak_rotation_index(&samples);
    let (attack_angle_deg, club_path_deg) = pre_impact_angles(&samples, impact_idx, dt);
    let club_speed_mps = club_speed_mps(&samples);
    let (launch_angle_deg, spin_rate_rpm) = launch_and_spin(club_speed_mps, attack_angle_deg);

    Ok(SwingMetrics {
        club_speed_mps,
        club_speed_mph: club_speed_mps * MPH_PER_MPS,
        club_speed_kph: club_speed_mps * KPH_PER_MPS,
        attack_angle_deg,
        club_path_deg,
        launch_angle_deg,
        spin_rate_rpm,
        impact_idx,
    })
}

/// Clubhead speed in m/s from the global peak gyro magnitude.
pub fn club_speed_mps(samples: &[ImuSample]) -> f64 {
    let omega = samples
        .iter()
        .map(ImuSample::gyro_magnitude)
        .fold(0.0, f64::max);

    omega * GYRO_TO_KPH / KPH_PER_MPS
}

/// Index of the peak gyro magnitude, first occurrence on ties.
///
/// Rotation peaks right at ball contact, which makes this a robust anchor
/// for the pre-impact window even when the accelerometer clips.
pub fn peak_rotation_index(samples: &[ImuSample]) -> usize {
    let mut best_index = 0;
    let mut best_value = f64::NEG_INFINITY;

    for (i, sample) in samples.iter().enumerate() {
        let magnitude = sample.gyro_magnitude();
        if magnitude > best_value {
            best_index = i;
            best_value = magnitude;
        }
    }

    best_index
}

/// Attack angle and club path in degrees from the mean dynamic acceleration
/// in a short window ending just before `impact_idx`.
///
/// # Params
///
/// - `samples`: the swing's stream; `impact_idx` must index into it.
/// - `dt`: sampling interval in seconds.
///
/// A degenerate window (no dynamic acceleration) yields `(0.0, 0.0)`.
pub fn pre_impact_angles(samples: &[ImuSample], impact_idx: usize, dt: f64) -> (f64, f64) {
    let win_len = ((PRE_IMPACT_WINDOW_S / dt.max(1e-6)) as usize).max(3);
    let end = impact_idx.saturating_sub(SPIKE_EXCLUSION_SAMPLES);
    let start = (end + 1).saturating_sub(win_len);

    let window = &samples[start..=end.min(samples.len() - 1)];
    let count = window.len() as f64;

    let mean_ax = window.iter().map(|this| this.accel_x).sum::<f64>() / count;
    let mean_ay = window
        .iter()
        .map(|this| this.accel_y + GRAVITY_Y_MPS2)
        .sum::<f64>()
        / count;
    let mean_az = window.iter().map(|this| this.accel_z).sum::<f64>() / count;

    if (mean_ax.powi(2) + mean_ay.powi(2) + mean_az.powi(2)).sqrt() < 1e-9 {
        return (0.0, 0.0);
    }

    let horiz = (mean_ax.powi(2) + mean_az.powi(2)).sqrt();
    let attack_deg = mean_ay.atan2(horiz.max(1e-6)).to_degrees();
    let path_deg = mean_ax.atan2(-mean_az).to_degrees();

    (attack_deg, path_deg)
}

/// Launch angle (deg) and spin rate (rpm) from a rough empirical model, not
/// a physical one.
pub fn launch_and_spin(club_speed_mps: f64, attack_angle_deg: f64) -> (f64, f64) {
    let launch_angle = 10.0 + 0.4 * attack_angle_deg + 0.05 * club_speed_mps;
    let spin_rpm = 2500.0 + 40.0 * attack_angle_deg + 8.0 * club_speed_mps;

    (launch_angle, spin_rpm)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(accel: (f64, f64, f64), gyro_z: f64) -> ImuSample {
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

    #[test]
    fn club_speed_maps_peak_rotation_through_the_calibration() {
        let samples = [
            sample((0.0, -9.8, 0.0), 10.0),
            sample((0.0, -9.8, 0.0), 60.0),
            sample((0.0, -9.8, 0.0), 30.0),
        ];

        // 60 deg/s * 1.5 = 90 km/h = 25 m/s.
        assert!((club_speed_mps(&samples) - 25.0).abs() < 1e-9);
    }

    #[test]
    fn peak_rotation_takes_first_occurrence() {
        let samples = [
            sample((0.0, 0.0, 0.0), 10.0),
            sample((0.0, 0.0, 0.0), 50.0),
            sample((0.0, 0.0, 0.0), 50.0),
        ];

        assert_eq!(peak_rotation_index(&samples), 1);
    }

    #[test]
    fn angles_follow_the_mean_dynamic_acceleration() {
        // Upward dynamic acceleration of 1 m/s^2 and an equal forward pull:
        // attack = atan2(1, 1) = 45 deg, path straight down the line.
        let samples = vec![sample((0.0, -8.8, -1.0), 0.0); 30];

        let (attack, path) = pre_impact_angles(&samples, 25, 0.01);
        assert!((attack - 45.0).abs() < 1e-9);
        assert!(path.abs() < 1e-9);
    }

    #[test]
    fn gravity_only_window_is_degenerate() {
        let samples = vec![sample((0.0, -9.8, 0.0), 0.0); 30];

        assert_eq!(pre_impact_angles(&samples, 25, 0.01), (0.0, 0.0));
    }

    #[test]
    fn window_near_the_stream_head_is_clamped() {
        let samples = vec![sample((0.5, -8.8, -0.5), 0.0); 4];

        // impact at 1 leaves no room before the spike exclusion; the window
        // clamps to the head instead of panicking.
        let (attack, _path) = pre_impact_angles(&samples, 1, 0.01);
        assert!(attack.is_finite());
    }

    #[test]
    fn empirical_launch_and_spin_values() {
        let (launch, spin) = launch_and_spin(20.0, 5.0);

        assert!((launch - 13.0).abs() < 1e-9);
        assert!((spin - 2860.0).abs() < 1e-9);
    }

    #[test]
    fn metrics_come_out_consistent_on_a_constructed_swing() {
        let mut samples = vec![sample((0.0, -9.8, 0.0), 0.0); 100];
        for (i, this) in samples.iter_mut().enumerate().take(80).skip(40) {
            this.gyro_z = 40.0 + i as f64 / 10.0;
            this.accel_y = -8.8;
            this.accel_z = -1.0;
        }

        let metrics = swing_metrics(samples).expect("stream is non-empty");

        assert_eq!(metrics.impact_idx, 79);
        assert!((metrics.club_speed_kph - metrics.club_speed_mps * 3.6).abs() < 1e-9);
        assert!((metrics.club_speed_mph - metrics.club_speed_mps * 2.23694).abs() < 1e-9);
        assert!(metrics.attack_angle_deg > 0.0);
        assert!(metrics.spin_rate_rpm > 2500.0);
    }

    #[test]
    fn empty_stream_is_rejected() {
        assert_eq!(swing_metrics(Vec::new()), Err(MetricsError::EmptyStream));
    }
}
