//! # Swing store
//!
//! On-disk persistence for recorded swings: a single JSON array of
//! `{metadata, samples}` records.
//!
//! Appending is forgiving: a missing, empty or malformed container is
//! replaced by a fresh one so a generator never loses a swing to a corrupt
//! file. Loading is strict: readers get an error instead of silently empty
//! data.
//!
//! Continuous multi-swing captures load separately, either as a flat JSON
//! array or as a CSV export with one sample per row.

use std::{collections::BTreeMap, fs, io, path::Path};

use tempo::ImuSample;

/// One stored swing: free-form metadata plus its sample stream.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct SwingRecord {
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub samples: Vec<ImuSample>,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("{path} is not a valid swing container: {source}")]
    Malformed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{path} is not a valid sample capture: {source}")]
    MalformedCsv {
        path: String,
        #[source]
        source: csv::Error,
    },
    #[error("{path} contains no swings")]
    Empty { path: String },
}

/// Appends one record to the container at `path`, creating it if needed.
///
/// An unreadable or malformed container is discarded and rebuilt around the
/// new record. Returns the number of records now stored.
pub fn append(path: impl AsRef<Path>, record: &SwingRecord) -> Result<usize, StoreError> {
    let path = path.as_ref();

    let mut records = match fs::read_to_string(path) {
        Ok(content) if !content.trim().is_empty() => {
            serde_json::from_str::<Vec<SwingRecord>>(&content).unwrap_or_default()
        }
        _ => Vec::new(),
    };

    records.push(record.clone());

    let content = serde_json::to_string_pretty(&records).map_err(|source| {
        StoreError::Malformed {
            path: path.display().to_string(),
            source,
        }
    })?;
    fs::write(path, content).map_err(|source| StoreError::Write {
        path: path.display().to_string(),
        source,
    })?;

    Ok(records.len())
}

/// Loads every stored swing from the container at `path`.
///
/// Fails on a missing or malformed container and on an empty one; an
/// analyzer pointed at nothing should hear about it.
pub fn load(path: impl AsRef<Path>) -> Result<Vec<SwingRecord>, StoreError> {
    let path = path.as_ref();

    let content = fs::read_to_string(path).map_err(|source| StoreError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let records =
        serde_json::from_str::<Vec<SwingRecord>>(&content).map_err(|source| {
            StoreError::Malformed {
                path: path.display().to_string(),
                source,
            }
        })?;

    match records.is_empty() {
        true => Err(StoreError::Empty {
            path: path.display().to_string(),
        }),
        false => Ok(records),
    }
}

/// Loads a flat JSON array of samples, the format continuous multi-swing
/// captures are stored in.
pub fn load_flat(path: impl AsRef<Path>) -> Result<Vec<ImuSample>, StoreError> {
    let path = path.as_ref();

    let content = fs::read_to_string(path).map_err(|source| StoreError::Read {
        path: path.display().to_string(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| StoreError::Malformed {
        path: path.display().to_string(),
        source,
    })
}

/// Loads a flat CSV capture with a header row and one sample per row, the
/// export format of most logging apps.
pub fn load_flat_csv(path: impl AsRef<Path>) -> Result<Vec<ImuSample>, StoreError> {
    let path = path.as_ref();

    let file = fs::File::open(path).map_err(|source| StoreError::Read {
        path: path.display().to_string(),
        source,
    })?;

    csv::Reader::from_reader(file)
        .deserialize()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| StoreError::MalformedCsv {
            path: path.display().to_string(),
            source,
        })
}
