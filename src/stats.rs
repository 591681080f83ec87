//! Current-vs-historical summarization over half-month buckets.
//!
//! Grouping is an explicit accumulator pass (count, sum, min, max with the
//! mean derived at read time) rather than a dataframe dependency, so the
//! aggregation rules stay auditable in isolation.

use crate::align::HalfMonth;
use crate::models::{GroupKey, Sample};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Running accumulator for one `(bucket, category)` group.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Accumulator {
    pub count: usize,
    pub missing: usize,
    pub sum: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Accumulator {
    pub fn add(&mut self, value: Option<f64>) {
        match value {
            Some(v) => {
                self.count += 1;
                self.sum += v;
                self.min = Some(self.min.map_or(v, |m| m.min(v)));
                self.max = Some(self.max.map_or(v, |m| m.max(v)));
            }
            None => self.missing += 1,
        }
    }

    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// One point of a mean-only series (current year or single historical year).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeriesPoint {
    pub bucket: HalfMonth,
    pub mean: f64,
}

/// One point of a pooled multi-year band.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BandPoint {
    pub bucket: HalfMonth,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

/// Shape of the historical side of a comparison.
///
/// Exactly one selected historical year yields an exact trend line; zero or
/// several selected years yield a min/avg/max band pooled across all of
/// them (empty selection gives an empty band, not an error).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum HistoricalSeries {
    SingleYear { year: i32, points: Vec<SeriesPoint> },
    Band(Vec<BandPoint>),
}

/// Comparison series for one category, ordered by bucket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryComparison {
    pub category: String,
    pub current: Vec<SeriesPoint>,
    pub historical: HistoricalSeries,
}

/// Full recomputed comparison for one filter selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comparison {
    pub current_year: i32,
    pub historical_years: Vec<i32>,
    pub categories: Vec<CategoryComparison>,
}

fn group(samples: &[Sample], years: &BTreeSet<i32>) -> BTreeMap<GroupKey, Accumulator> {
    let mut groups: BTreeMap<GroupKey, Accumulator> = BTreeMap::new();
    for s in samples.iter().filter(|s| years.contains(&s.year())) {
        // uncategorized rows take part in no summary and get no panel
        let Some(category) = s.category.as_deref() else {
            continue;
        };
        let key = GroupKey {
            bucket: s.bucket(),
            category: category.to_string(),
        };
        groups.entry(key).or_default().add(s.value);
    }
    groups
}

fn by_category<T>(rows: impl IntoIterator<Item = (String, T)>) -> BTreeMap<String, Vec<T>> {
    let mut out: BTreeMap<String, Vec<T>> = BTreeMap::new();
    for (category, row) in rows {
        out.entry(category).or_default().push(row);
    }
    out
}

/// Compare the current year against the selected historical years.
///
/// Returns `None` when `samples` is empty (the "no data matches" outcome,
/// distinct from a computation error). The reported categories are exactly
/// the distinct categories of the current-year summary; categories present
/// only in historical data get no panel.
pub fn compare(
    samples: &[Sample],
    current_year: i32,
    historical_years: &BTreeSet<i32>,
) -> Option<Comparison> {
    if samples.is_empty() {
        return None;
    }

    let current_groups = group(samples, &BTreeSet::from([current_year]));
    let historical_groups = group(samples, historical_years);

    // GroupKey orders by bucket first, so per-category series come out
    // already ordered along the half-month axis.
    let current = by_category(current_groups.iter().filter_map(|(key, acc)| {
        let mean = acc.mean()?;
        Some((
            key.category.clone(),
            SeriesPoint {
                bucket: key.bucket,
                mean,
            },
        ))
    }));

    let single_year = (historical_years.len() == 1)
        .then(|| historical_years.iter().next().copied())
        .flatten();

    let mut historical_single: BTreeMap<String, Vec<SeriesPoint>> = BTreeMap::new();
    let mut historical_band: BTreeMap<String, Vec<BandPoint>> = BTreeMap::new();
    if single_year.is_some() {
        historical_single = by_category(historical_groups.iter().filter_map(|(key, acc)| {
            let mean = acc.mean()?;
            Some((
                key.category.clone(),
                SeriesPoint {
                    bucket: key.bucket,
                    mean,
                },
            ))
        }));
    } else {
        historical_band = by_category(historical_groups.iter().filter_map(|(key, acc)| {
            let mean = acc.mean()?;
            Some((
                key.category.clone(),
                BandPoint {
                    bucket: key.bucket,
                    mean,
                    min: acc.min?,
                    max: acc.max?,
                },
            ))
        }));
    }

    let categories = current
        .into_iter()
        .map(|(category, points)| {
            let historical = match single_year {
                Some(year) => HistoricalSeries::SingleYear {
                    year,
                    points: historical_single.remove(&category).unwrap_or_default(),
                },
                None => {
                    HistoricalSeries::Band(historical_band.remove(&category).unwrap_or_default())
                }
            };
            CategoryComparison {
                category,
                current: points,
                historical,
            }
        })
        .collect();

    Some(Comparison {
        current_year,
        historical_years: historical_years.iter().copied().collect(),
        categories,
    })
}
