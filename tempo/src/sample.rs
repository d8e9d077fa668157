/// Fallback sampling rate when the stream carries no usable timestamps.
pub const DEFAULT_RATE_HZ: f64 = 100.0;

/// One inertial measurement: acceleration in m/s^2 and angular velocity in
/// deg/s, with an optional capture timestamp in seconds.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImuSample {
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub timestamp: Option<f64>,
    pub accel_x: f64,
    pub accel_y: f64,
    pub accel_z: f64,
    pub gyro_x: f64,
    pub gyro_y: f64,
    pub gyro_z: f64,
}

impl ImuSample {
    pub fn accel_magnitude(&self) -> f64 {
        (self.accel_x.powi(2) + self.accel_y.powi(2) + self.accel_z.powi(2)).sqrt()
    }

    pub fn gyro_magnitude(&self) -> f64 {
        (self.gyro_x.powi(2) + self.gyro_y.powi(2) + self.gyro_z.powi(2)).sqrt()
    }

    pub fn gyro_axis(&self, axis: RotationAxis) -> f64 {
        match axis {
            RotationAxis::X => self.gyro_x,
            RotationAxis::Y => self.gyro_y,
            RotationAxis::Z => self.gyro_z,
        }
    }
}

/// Body axis whose angular velocity carries the main swing rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RotationAxis {
    X,
    Y,
    #[default]
    Z,
}

/// Average spacing between consecutive timestamped samples, in seconds.
///
/// Samples without a timestamp are skipped; non-positive deltas are skipped
/// too, so an unordered or duplicated clock cannot produce a zero interval.
/// Streams with fewer than two usable timestamps fall back to
/// `1.0 / DEFAULT_RATE_HZ`.
pub fn sampling_interval(samples: &[ImuSample]) -> f64 {
    let stamps = samples
        .iter()
        .filter_map(|this| this.timestamp)
        .collect::<Vec<_>>();

    let deltas = stamps
        .windows(2)
        .map(|this| this[1] - this[0])
        .filter(|delta| *delta > 0.0)
        .collect::<Vec<_>>();

    match deltas.is_empty() {
        true => 1.0 / DEFAULT_RATE_HZ,
        false => deltas.iter().sum::<f64>() / deltas.len() as f64,
    }
}

/// Estimated sampling rate in Hz, the reciprocal of [`sampling_interval`].
pub fn sampling_rate(samples: &[ImuSample]) -> f64 {
    1.0 / sampling_interval(samples)
}
