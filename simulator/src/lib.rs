//! # Swing simulator
//!
//! Generates synthetic IMU streams shaped like a golf swing: address,
//! backswing, downswing, impact spike, follow-through. Each swing draws a
//! quality profile that controls amplitudes, noise, attack/path biases and
//! the impact spike, then the whole stream is rescaled so the estimated
//! clubhead speed hits a profile-appropriate target.
//!
//! Gravity sits along negative Y; the downswing drives forward along
//! negative Z. Speed estimation uses the same peak-gyro calibration as the
//! analysis side, so generated swings land in the ranges the metrics
//! expect.

use std::f64::consts::PI;

use rand::Rng;
use tempo::ImuSample;

const T_ADDRESS_S: f64 = 0.5;
const T_BACKSWING_END_S: f64 = 2.0;
const T_DOWNSWING_END_S: f64 = 2.5;
const T_IMPACT_S: f64 = 2.6;
const T_FINISH_S: f64 = 4.0;

const SPIKE_SIGMA_S: f64 = 0.01;
const FORWARD_PEAK_MPS2: f64 = 14.0;
const GRAVITY_Y_MPS2: f64 = 9.8;
const KPH_PER_MPS: f64 = 3.6;

/// Swing quality drawn per generated swing, weighted 40/35/25.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SwingProfile {
    Good,
    Okay,
    Bad,
}

impl SwingProfile {
    fn draw(rng: &mut impl Rng) -> Self {
        let roll = rng.random::<f64>();

        if roll < 0.4 {
            SwingProfile::Good
        } else if roll < 0.75 {
            SwingProfile::Okay
        } else {
            SwingProfile::Bad
        }
    }

    fn target_kph(self, rng: &mut impl Rng) -> f64 {
        match self {
            SwingProfile::Good => rng.random_range(121.0..137.0),
            SwingProfile::Okay => rng.random_range(116.0..132.0),
            SwingProfile::Bad => rng.random_range(100.0..128.0),
        }
    }
}

/// Per-swing shape parameters, drawn from the profile's ranges.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProfileParams {
    pub gyro_scale: f64,
    pub accel_scale: f64,
    pub noise_accel_range: f64,
    pub noise_gyro_range: f64,
    /// Mean vertical angle of the pre-impact acceleration, degrees
    pub y_attack_bias: f64,
    /// Lateral pull, sign picks in-to-out vs out-to-in
    pub path_bias: f64,
    pub accel_spike_base: f64,
    pub gyro_spike_base: f64,
    pub launch_multiplier: f64,
}

impl ProfileParams {
    fn draw(rng: &mut impl Rng, profile: SwingProfile) -> Self {
        match profile {
            SwingProfile::Good => Self {
                gyro_scale: rng.random_range(1.15..1.3),
                accel_scale: rng.random_range(1.05..1.15),
                noise_accel_range: 0.05,
                noise_gyro_range: 0.03,
                y_attack_bias: rng.random_range(-0.8..-0.4),
                path_bias: side(rng) * rng.random_range(0.5..1.2),
                accel_spike_base: rng.random_range(6.0..8.0),
                gyro_spike_base: rng.random_range(20.0..24.0),
                launch_multiplier: rng.random_range(1.0..1.2),
            },
            SwingProfile::Okay => {
                // Half shallow strikes launching high, half steep ones.
                let (y_attack_bias, launch_multiplier) = match rng.random_bool(0.5) {
                    true => (rng.random_range(-0.6..-0.2), rng.random_range(1.2..1.5)),
                    false => (rng.random_range(-1.8..-1.2), rng.random_range(0.8..1.0)),
                };

                Self {
                    gyro_scale: rng.random_range(1.0..1.15),
                    accel_scale: rng.random_range(0.95..1.05),
                    noise_accel_range: 0.10,
                    noise_gyro_range: 0.05,
                    y_attack_bias,
                    path_bias: side(rng) * rng.random_range(1.5..2.5),
                    accel_spike_base: rng.random_range(5.0..7.0),
                    gyro_spike_base: rng.random_range(15.0..22.0),
                    launch_multiplier,
                }
            }
            SwingProfile::Bad => {
                let (y_attack_bias, launch_multiplier) = match rng.random_bool(0.5) {
                    true => (rng.random_range(0.5..1.5), rng.random_range(0.7..0.9)),
                    false => (rng.random_range(-3.5..-2.5), rng.random_range(1.4..1.8)),
                };
                let (accel_spike_base, gyro_spike_base) = match rng.random_bool(0.5) {
                    true => (rng.random_range(3.0..5.0), rng.random_range(10.0..16.0)),
                    false => (rng.random_range(8.0..12.0), rng.random_range(24.0..32.0)),
                };

                Self {
                    gyro_scale: rng.random_range(0.85..1.0),
                    accel_scale: rng.random_range(0.85..0.95),
                    noise_accel_range: 0.20,
                    noise_gyro_range: 0.08,
                    y_attack_bias,
                    path_bias: side(rng) * rng.random_range(2.5..4.0),
                    accel_spike_base,
                    gyro_spike_base,
                    launch_multiplier,
                }
            }
        }
    }
}

/// Everything known about how one swing was generated.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SwingMeta {
    pub profile: SwingProfile,
    pub params: ProfileParams,
    pub speed_target_kph: f64,
    pub speed_before_kph: f64,
    pub speed_after_kph: f64,
    pub scale_applied: f64,
}

/// One generated swing and the parameters that shaped it.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedSwing {
    pub samples: Vec<ImuSample>,
    pub meta: SwingMeta,
}

/// Generates one synthetic swing.
///
/// # Params
///
/// - `rng`: seeded for reproducible swings, entropy-backed otherwise.
/// - `num_samples`: stream length; a degenerate count still yields one
///   sample at t = 0.
/// - `total_duration_s`: time of the last sample.
pub fn simulate_swing(
    rng: &mut impl Rng,
    num_samples: usize,
    total_duration_s: f64,
) -> SimulatedSwing {
    let profile = SwingProfile::draw(rng);
    let params = ProfileParams::draw(rng, profile);

    let time_stamps = match num_samples <= 1 {
        true => vec![0.0],
        false => {
            let dt = total_duration_s / (num_samples - 1) as f64;
            (0..num_samples).map(|i| i as f64 * dt).collect()
        }
    };

    let mut samples = time_stamps
        .into_iter()
        .map(|t| sample_at(rng, &params, t))
        .collect::<Vec<_>>();

    let speed_before_kph = estimated_kph(&samples);
    let speed_target_kph = profile.target_kph(rng);
    let scale_applied = match speed_before_kph > 1e-6 {
        true => speed_target_kph / speed_before_kph,
        false => 1.0,
    };
    retarget(&mut samples, scale_applied);
    let speed_after_kph = estimated_kph(&samples);

    SimulatedSwing {
        samples,
        meta: SwingMeta {
            profile,
            params,
            speed_target_kph,
            speed_before_kph,
            speed_after_kph,
            scale_applied,
        },
    }
}

fn side(rng: &mut impl Rng) -> f64 {
    match rng.random_bool(0.5) {
        true => 1.0,
        false => -1.0,
    }
}

fn phase_sine(t: f64, from: f64, to: f64) -> f64 {
    ((t - from) * PI / (to - from)).sin()
}

fn estimated_kph(samples: &[ImuSample]) -> f64 {
    swing_metrics::club_speed_mps(samples) * KPH_PER_MPS
}

fn sample_at(rng: &mut impl Rng, params: &ProfileParams, t: f64) -> ImuSample {
    let noise_accel = rng.random_range(-params.noise_accel_range..params.noise_accel_range);
    let noise_gyro = rng.random_range(-params.noise_gyro_range..params.noise_gyro_range);
    let accel_spike_amp = params.accel_spike_base * (1.0 + rng.random_range(-0.1..0.1));
    let gyro_spike_amp = params.gyro_spike_base * (1.0 + rng.random_range(-0.1..0.1));
    let impact_factor = (-(t - T_IMPACT_S).powi(2) / (2.0 * SPIKE_SIGMA_S.powi(2))).exp();

    let (drift_x, drift_y, drift_z) = (t * 0.01, t * 0.02, t * 0.015);

    let g = params.gyro_scale;
    let (gyro_x, gyro_y, gyro_z) = if t > T_ADDRESS_S && t < T_BACKSWING_END_S {
        let s = phase_sine(t, T_ADDRESS_S, T_BACKSWING_END_S);
        (-15.0 * g * s, 10.0 * g * s, 20.0 * g * s)
    } else if (T_BACKSWING_END_S..T_IMPACT_S).contains(&t) {
        // The sine is normalized to the downswing proper, so the short
        // stretch between downswing end and impact overshoots it.
        let s = phase_sine(t, T_BACKSWING_END_S, T_DOWNSWING_END_S);
        (30.0 * g * s, -40.0 * g * s, -50.0 * g * s)
    } else if (T_IMPACT_S..T_FINISH_S).contains(&t) {
        let s = phase_sine(t, T_IMPACT_S, T_FINISH_S);
        (10.0 * g * s, 15.0 * g * s, -10.0 * g * s)
    } else {
        (0.0, 0.0, 0.0)
    };

    let ((ax, ay, az), accel_factor) = if t > T_ADDRESS_S && t < T_BACKSWING_END_S {
        let s = phase_sine(t, T_ADDRESS_S, T_BACKSWING_END_S);

        (
            (
                5.0 * s + noise_accel,
                -GRAVITY_Y_MPS2 + 2.0 * s + noise_accel,
                3.0 * s + noise_accel,
            ),
            0.0,
        )
    } else if (T_BACKSWING_END_S..T_IMPACT_S).contains(&t) {
        let progress = (t - T_BACKSWING_END_S) / (T_DOWNSWING_END_S - T_BACKSWING_END_S);
        let accel_factor = (progress * PI / 2.0).sin();

        // Forward acceleration dominates the horizontal magnitude; the
        // vertical component follows the attack bias so the pre-impact
        // window reproduces it.
        let base_forward = -FORWARD_PEAK_MPS2 * accel_factor;
        let base_lateral = 0.25 * params.path_bias * accel_factor;
        let horizontal = (base_forward.powi(2) + base_lateral.powi(2)).sqrt();
        let vertical = horizontal * params.y_attack_bias.to_radians().tan();

        (
            (
                base_lateral + noise_accel,
                -GRAVITY_Y_MPS2 + vertical + noise_accel,
                base_forward + noise_accel,
            ),
            accel_factor,
        )
    } else if (T_IMPACT_S..T_FINISH_S).contains(&t) {
        let s = phase_sine(t, T_IMPACT_S, T_FINISH_S);

        (
            (
                -5.0 * s + noise_accel,
                -GRAVITY_Y_MPS2 + 3.0 * s + noise_accel,
                5.0 * s + noise_accel,
            ),
            0.0,
        )
    } else {
        (
            (
                noise_accel,
                -GRAVITY_Y_MPS2 + noise_accel,
                noise_accel,
            ),
            0.0,
        )
    };

    let mut accel_x = ax * params.accel_scale;
    let mut accel_y = ay * params.accel_scale;
    let mut accel_z = az * params.accel_scale;

    if (T_BACKSWING_END_S..T_FINISH_S).contains(&t) {
        let phase_scale = match t < T_IMPACT_S {
            true => 0.18 + 0.22 * accel_factor,
            false => 0.12,
        };
        accel_x += params.path_bias * phase_scale;
    }

    accel_x += 0.4 * accel_spike_amp * impact_factor;
    accel_y += accel_spike_amp * impact_factor * params.launch_multiplier;
    accel_z += 0.3 * accel_spike_amp * impact_factor;

    ImuSample {
        timestamp: Some(t),
        accel_x,
        accel_y,
        accel_z,
        gyro_x: gyro_x + drift_x + noise_gyro + 0.3 * gyro_spike_amp * impact_factor
            + 0.05 * params.path_bias * impact_factor,
        gyro_y: gyro_y + drift_y + noise_gyro - 0.2 * gyro_spike_amp * impact_factor,
        gyro_z: gyro_z + drift_z + noise_gyro + 0.5 * gyro_spike_amp * impact_factor,
    }
}

/// Rescales angular speed and dynamic acceleration, leaving gravity as is.
fn retarget(samples: &mut [ImuSample], scale: f64) {
    for this in samples {
        this.gyro_x *= scale;
        this.gyro_y *= scale;
        this.gyro_z *= scale;
        this.accel_x *= scale;
        this.accel_y = -GRAVITY_Y_MPS2 + (this.accel_y + GRAVITY_Y_MPS2) * scale;
        this.accel_z *= scale;
    }
}
