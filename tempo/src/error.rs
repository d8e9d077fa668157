/// Hard failures of the tempo pipeline. Everything else falls back to a
/// defined index instead of erroring.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TempoError {
    #[error("sample stream is empty")]
    EmptyStream,
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },
    #[error("smoothing alpha must be in (0, 1], got {0}")]
    Alpha(f64),
}
