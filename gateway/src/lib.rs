//! # Gateway
//!
//! Read-only query layer over stored swings. Inbound parameters are
//! translated into detector options, the container is loaded, the pipeline
//! runs, and every outcome comes back as a fixed-shape JSON envelope:
//! `{"status": "ok", "data": ...}` on success, `{"status": "error",
//! "error": {"kind": ..., "message": ...}}` on any failure. A query never
//! panics on missing, empty or malformed stored data.

use std::{collections::BTreeMap, path::Path};

use segmenter::{SegmenterError, SegmenterOptions, SwingSegment, segment_swings};
use swing_metrics::{MetricsError, SwingMetrics, swing_metrics};
use swing_store::{StoreError, SwingRecord};
use tempo::{RotationAxis, TempoError, TempoOptions, TempoResult, swing_tempo};

/// Which stored swing(s) a query addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwingSelector {
    /// The most recently appended swing.
    #[default]
    Latest,
    /// The swing at a zero-based container index.
    Index(usize),
    /// Every stored swing, oldest first.
    All,
}

/// Inbound query parameters: a swing selector plus optional overrides for
/// every detector knob. Anything left unset keeps its default.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct QueryParams {
    pub swing: SwingSelector,
    pub smoothing_alpha: Option<f64>,
    pub start_threshold: Option<f64>,
    pub start_dwell_s: Option<f64>,
    pub impact_threshold_g: Option<f64>,
    pub impact_refractory_s: Option<f64>,
    pub top_axis: Option<RotationAxis>,
    pub fallback_correction: Option<bool>,
    pub downswing_min_s: Option<f64>,
    pub downswing_max_s: Option<f64>,
    pub segment_start_threshold: Option<f64>,
    pub segment_end_threshold: Option<f64>,
    pub min_swing_s: Option<f64>,
    pub min_gap_s: Option<f64>,
}

impl QueryParams {
    /// Tempo options with this query's overrides applied.
    pub fn tempo_options(&self) -> TempoOptions {
        let defaults = TempoOptions::new();

        TempoOptions {
            smoothing_alpha: self.smoothing_alpha.unwrap_or(defaults.smoothing_alpha),
            start_threshold: self.start_threshold.unwrap_or(defaults.start_threshold),
            start_dwell_s: self.start_dwell_s.unwrap_or(defaults.start_dwell_s),
            impact_threshold_g: self
                .impact_threshold_g
                .unwrap_or(defaults.impact_threshold_g),
            impact_refractory_s: self
                .impact_refractory_s
                .unwrap_or(defaults.impact_refractory_s),
            top_axis: self.top_axis.unwrap_or(defaults.top_axis),
            fallback_correction: self
                .fallback_correction
                .unwrap_or(defaults.fallback_correction),
            downswing_min_s: self.downswing_min_s.unwrap_or(defaults.downswing_min_s),
            downswing_max_s: self.downswing_max_s.unwrap_or(defaults.downswing_max_s),
        }
    }

    /// Segmenter options with this query's overrides applied.
    pub fn segmenter_options(&self) -> SegmenterOptions {
        let defaults = SegmenterOptions::new();

        SegmenterOptions {
            start_threshold: self
                .segment_start_threshold
                .unwrap_or(defaults.start_threshold),
            end_threshold: self.segment_end_threshold.unwrap_or(defaults.end_threshold),
            min_swing_s: self.min_swing_s.unwrap_or(defaults.min_swing_s),
            min_gap_s: self.min_gap_s.unwrap_or(defaults.min_gap_s),
        }
    }
}

/// Anything a query can fail with; each variant maps to an envelope `kind`.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Tempo(#[from] TempoError),
    #[error(transparent)]
    Segmenter(#[from] SegmenterError),
    #[error(transparent)]
    Metrics(#[from] MetricsError),
    #[error("no swing at index {index}, container holds {count}")]
    IndexOutOfRange { index: usize, count: usize },
}

impl GatewayError {
    /// Stable machine-readable discriminator for the error envelope.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Store(StoreError::Read { .. }) => "store_read",
            Self::Store(StoreError::Write { .. }) => "store_write",
            Self::Store(StoreError::Malformed { .. } | StoreError::MalformedCsv { .. }) => {
                "store_malformed"
            }
            Self::Store(StoreError::Empty { .. }) => "store_empty",
            Self::Tempo(_) => "tempo",
            Self::Segmenter(_) => "segmenter",
            Self::Metrics(_) => "metrics",
            Self::IndexOutOfRange { .. } => "index_out_of_range",
        }
    }
}

/// Full analysis of one stored swing.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SwingReport {
    pub index: usize,
    pub metadata: BTreeMap<String, serde_json::Value>,
    pub tempo: TempoResult,
    pub metrics: SwingMetrics,
}

/// Segment ranges found in one flat capture.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SegmentReport {
    pub total_samples: usize,
    pub segments: Vec<SwingSegment>,
}

/// Analyzes the stored swing(s) the query selects.
///
/// `Latest` and `Index` yield a single-element list, `All` one report per
/// stored swing.
pub fn swing_reports(
    path: impl AsRef<Path>,
    params: &QueryParams,
) -> Result<Vec<SwingReport>, GatewayError> {
    let records = swing_store::load(path.as_ref())?;
    let count = records.len();

    // load() rejects empty containers, so `count - 1` is in range.
    let selected = match params.swing {
        SwingSelector::Latest => vec![(count - 1, &records[count - 1])],
        SwingSelector::Index(index) => match records.get(index) {
            Some(record) => vec![(index, record)],
            None => return Err(GatewayError::IndexOutOfRange { index, count }),
        },
        SwingSelector::All => records.iter().enumerate().collect(),
    };

    let options = params.tempo_options();
    selected
        .into_iter()
        .map(|(index, record)| {
            let tempo = swing_tempo(record.samples.iter().cloned(), &options)?;
            let metrics = swing_metrics(record.samples.iter().cloned())?;

            Ok(SwingReport {
                index,
                metadata: record.metadata.clone(),
                tempo,
                metrics,
            })
        })
        .collect()
}

/// Loads a flat capture, as CSV when the extension says so and as a JSON
/// array otherwise.
fn load_capture(path: &Path) -> Result<Vec<tempo::ImuSample>, GatewayError> {
    let is_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    let samples = match is_csv {
        true => swing_store::load_flat_csv(path)?,
        false => swing_store::load_flat(path)?,
    };

    Ok(samples)
}

/// Splits the flat capture at `path` into swing segments.
pub fn segment_report(
    path: impl AsRef<Path>,
    params: &QueryParams,
) -> Result<SegmentReport, GatewayError> {
    let samples = load_capture(path.as_ref())?;
    let segments = segment_swings(samples.iter().cloned(), &params.segmenter_options())?;

    Ok(SegmentReport {
        total_samples: samples.len(),
        segments,
    })
}

/// Splits the flat capture at `input` and appends each swing to the
/// container at `output` as its own record. Returns the number of swings
/// written.
pub fn export_segments(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    params: &QueryParams,
) -> Result<usize, GatewayError> {
    let samples = load_capture(input.as_ref())?;
    let segments = segment_swings(samples.iter().cloned(), &params.segmenter_options())?;

    for segment in &segments {
        let record = SwingRecord {
            metadata: BTreeMap::from([
                (
                    String::from("num_samples"),
                    serde_json::json!(segment.sample_count()),
                ),
                (String::from("generated_by"), serde_json::json!("segmenter")),
            ]),
            samples: segment.slice(&samples).to_vec(),
        };
        swing_store::append(output.as_ref(), &record)?;
    }

    Ok(segments.len())
}

/// Wraps a query outcome in the fixed-shape response envelope.
pub fn envelope<T: serde::Serialize>(result: Result<T, GatewayError>) -> serde_json::Value {
    match result {
        Ok(data) => match serde_json::to_value(data) {
            Ok(data) => serde_json::json!({ "status": "ok", "data": data }),
            Err(source) => error_envelope("serialize", &source.to_string()),
        },
        Err(error) => error_envelope(error.kind(), &error.to_string()),
    }
}

fn error_envelope(kind: &str, message: &str) -> serde_json::Value {
    serde_json::json!({
        "status": "error",
        "error": { "kind": kind, "message": message },
    })
}
