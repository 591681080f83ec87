//! CSV ingestion: normalizes raw sample exports into [`Sample`] rows and
//! caches them per source for the rest of the session.
//!
//! Sources differ in header spelling (the raw FEMS export uses its own
//! column names, the published split files carry the canonical ones), so
//! the loader maps by name when the canonical headers are present and by
//! position otherwise. Rows with unparseable timestamps are dropped
//! silently; only a fully unreadable source is an error.

use crate::api::Client;
use crate::models::{Sample, CANONICAL_COLUMNS};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal per-source load failures. Partially-invalid sources (some rows
/// dropped) are not errors.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("fetch {origin}: {cause}")]
    Http { origin: String, cause: anyhow::Error },
    #[error("read {origin}: {source}")]
    Io {
        origin: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{origin}: expected {expected} columns, header has {found}")]
    MalformedHeader {
        origin: String,
        expected: usize,
        found: usize,
    },
    #[error("{origin}: {source}")]
    Csv {
        origin: String,
        #[source]
        source: csv::Error,
    },
}

/// One tabular input: a remote CSV endpoint or a local file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Source {
    Remote(String),
    Local(PathBuf),
}

/// Treat strings that look like URLs as remote, everything else as a
/// local path.
impl From<&str> for Source {
    fn from(s: &str) -> Source {
        if s.starts_with("http://") || s.starts_with("https://") {
            Source::Remote(s.to_string())
        } else {
            Source::Local(PathBuf::from(s))
        }
    }
}

impl std::str::FromStr for Source {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Source, Self::Err> {
        Ok(Source::from(s))
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Remote(url) => f.write_str(url),
            Source::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Try to parse a raw `Date-Time` cell. Offset-carrying forms are accepted
/// and the offset is stripped afterwards (naive wall-clock comparison, no
/// cross-zone normalization).
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%m/%d/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    for fmt in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

fn opt_field(record: &csv::StringRecord, idx: usize) -> Option<String> {
    record
        .get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Map a header row onto canonical column indices: by name when the
/// canonical headers are present, by position otherwise.
fn column_indices(origin: &str, headers: &csv::StringRecord) -> Result<[usize; 10], LoadError> {
    let by_name: HashMap<&str, usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim(), i))
        .collect();
    if CANONICAL_COLUMNS.iter().all(|c| by_name.contains_key(c)) {
        let mut idx = [0usize; 10];
        for (slot, name) in idx.iter_mut().zip(CANONICAL_COLUMNS) {
            *slot = by_name[name];
        }
        return Ok(idx);
    }
    if headers.len() < CANONICAL_COLUMNS.len() {
        return Err(LoadError::MalformedHeader {
            origin: origin.to_string(),
            expected: CANONICAL_COLUMNS.len(),
            found: headers.len(),
        });
    }
    Ok([0, 1, 2, 3, 4, 5, 6, 7, 8, 9])
}

/// Parse one CSV body into samples, dropping rows whose timestamp does not
/// parse. `origin` labels the source in error messages.
pub fn parse_csv(origin: &str, text: &str) -> Result<Vec<Sample>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers = reader.headers().map_err(|e| LoadError::Csv {
        origin: origin.to_string(),
        source: e,
    })?;
    let idx = column_indices(origin, headers)?;

    let mut out = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| LoadError::Csv {
            origin: origin.to_string(),
            source: e,
        })?;
        let Some(timestamp) = record.get(idx[1]).and_then(parse_timestamp) else {
            continue;
        };
        out.push(Sample {
            sample_id: opt_field(&record, idx[0]).unwrap_or_default(),
            timestamp,
            site_name: opt_field(&record, idx[2]),
            site_id: opt_field(&record, idx[3]),
            fuel_type: opt_field(&record, idx[4]),
            category: opt_field(&record, idx[5]),
            sub_category: opt_field(&record, idx[6]),
            method: opt_field(&record, idx[7]),
            value: opt_field(&record, idx[8]).and_then(|v| v.parse::<f64>().ok()),
            status: opt_field(&record, idx[9]),
        });
    }
    Ok(out)
}

/// Load a single source end to end (fetch or read, then normalize).
pub fn load_source(client: &Client, source: &Source) -> Result<Vec<Sample>, LoadError> {
    let origin = source.to_string();
    let text = match source {
        Source::Remote(url) => client.fetch_csv(url).map_err(|e| LoadError::Http {
            origin: origin.clone(),
            cause: e,
        })?,
        Source::Local(path) => std::fs::read_to_string(path).map_err(|e| LoadError::Io {
            origin: origin.clone(),
            source: e,
        })?,
    };
    parse_csv(&origin, &text)
}

/// Load several sources and concatenate in order. No deduplication is
/// performed across sources.
pub fn load_sources(client: &Client, sources: &[Source]) -> Result<Vec<Sample>, LoadError> {
    let mut out = Vec::new();
    for source in sources {
        out.extend(load_source(client, source)?);
    }
    Ok(out)
}

/// Session cache keyed by source identity. Loading is idempotent and
/// read-only on the underlying sources; invalidation is explicit (the
/// "reload" action), never implicit.
#[derive(Debug, Default)]
pub struct SampleStore {
    cache: HashMap<Source, Vec<Sample>>,
}

impl SampleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Concatenated samples for `sources`, fetching any source not yet
    /// cached. A fetch failure leaves previously cached sources intact.
    pub fn load(&mut self, client: &Client, sources: &[Source]) -> Result<Vec<Sample>, LoadError> {
        let mut out = Vec::new();
        for source in sources {
            if !self.cache.contains_key(source) {
                let samples = load_source(client, source)?;
                self.cache.insert(source.clone(), samples);
            }
            out.extend(self.cache[source].iter().cloned());
        }
        Ok(out)
    }

    pub fn is_cached(&self, source: &Source) -> bool {
        self.cache.contains_key(source)
    }

    /// Drop one cached source so the next `load` refetches it.
    pub fn invalidate(&mut self, source: &Source) {
        self.cache.remove(source);
    }

    pub fn invalidate_all(&mut self) {
        self.cache.clear();
    }
}
