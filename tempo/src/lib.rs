//! # Swing tempo
//!
//! Derives timing landmarks from a single bounded motion event ("a swing")
//! recorded as inertial samples:
//!
//! - **start of motion** - first sustained run of gyro magnitude above a
//!   threshold,
//! - **top of transition** - sign flip of the primary rotation axis,
//! - **impact** - acceleration spike refined to its local peak.
//!
//! The tempo ratio is the backswing duration divided by the downswing
//! duration.
//!
//! Every detector carries a fallback rule, so the pipeline is total: any
//! non-empty, well-formed stream produces defined indices in `[0, N)`. The
//! only hard failures are an empty stream and an invalid configuration.
//! Identical input and options always yield identical output.

mod error;
mod observer;
mod sample;
pub mod signal;
mod tempo;

pub use error::TempoError;
pub use observer::{NullObserver, TempoEvent, TempoObserver};
pub use sample::{DEFAULT_RATE_HZ, ImuSample, RotationAxis, sampling_interval, sampling_rate};
pub use tempo::{TempoOptions, TempoResult, swing_tempo, swing_tempo_with_observer};
