use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::align::{self, HalfMonth};

/// Canonical column contract shared by the FEMS download endpoint and the
/// published split files (post-normalization order).
pub const CANONICAL_COLUMNS: [&str; 10] = [
    "Sample Id",
    "Date-Time",
    "Site Name",
    "SiteId",
    "Fuel Type",
    "Category",
    "Sub-Category",
    "Method",
    "Sample Avg Value",
    "Sample Status",
];

/// Tidy structure used by this crate (one row = one field sample).
///
/// Every retained `Sample` carries a valid naive timestamp; rows whose
/// `Date-Time` could not be parsed never make it past the loader.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Sample {
    pub sample_id: String,
    pub timestamp: NaiveDateTime,
    pub site_name: Option<String>,
    pub site_id: Option<String>,
    pub fuel_type: Option<String>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub method: Option<String>,
    /// "Sample Avg Value"; missing or malformed values are kept as `None`
    /// and counted as missing by the aggregator.
    pub value: Option<f64>,
    pub status: Option<String>,
}

impl Sample {
    /// Calendar year of the observation.
    pub fn year(&self) -> i32 {
        self.timestamp.year()
    }

    /// Calendar month (1-12) of the observation.
    pub fn month(&self) -> u32 {
        self.timestamp.month()
    }

    /// Half-month bucket the observation falls into, year discarded.
    pub fn bucket(&self) -> HalfMonth {
        align::half_month(self.timestamp.date())
    }
}

/// Grouping key used in stats and plotting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKey {
    pub bucket: HalfMonth,
    pub category: String,
}

/// User-selected predicates applied to the loaded dataset.
///
/// Empty sets place no restriction on their field. Fields are ANDed
/// together; within a field, membership in the set is an OR.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    pub sites: BTreeSet<String>,
    pub categories: BTreeSet<String>,
    pub fuel_types: BTreeSet<String>,
    /// Allowed calendar months (1-12); empty = all months.
    pub months: BTreeSet<u32>,
}

/// Sorted distinct years present in a dataset, oldest first.
pub fn years_present(samples: &[Sample]) -> Vec<i32> {
    let years: BTreeSet<i32> = samples.iter().map(Sample::year).collect();
    years.into_iter().collect()
}
