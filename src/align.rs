//! Half-month alignment: maps arbitrary-year sample dates onto a common
//! 24-bucket axis so multi-year series overlay coherently.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Reference year used for chart x-positions. Any leap year works since
/// bucket anchors are always day 1 or 15.
const AXIS_YEAR: i32 = 2000;

/// A year-independent half-month bucket: `(month, half)` where `half` is 1
/// for days 1-14 and 2 for days 15 onward.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub struct HalfMonth {
    pub month: u32,
    pub half: u8,
}

impl HalfMonth {
    /// Anchor date of this bucket in the reference year, for plotting.
    pub fn axis_date(&self) -> NaiveDate {
        let day = if self.half == 1 { 1 } else { 15 };
        // month is 1-12 and day is 1 or 15 by construction
        NaiveDate::from_ymd_opt(AXIS_YEAR, self.month, day).expect("valid axis date")
    }

    /// Fractional position on a 1.0..13.0 month axis (first half at the
    /// month tick, second half at the midpoint).
    pub fn axis_pos(&self) -> f64 {
        self.month as f64 + if self.half == 1 { 0.0 } else { 0.5 }
    }

    /// All 24 buckets in calendar order.
    pub fn all() -> impl Iterator<Item = HalfMonth> {
        (1..=12u32).flat_map(|month| [1u8, 2].into_iter().map(move |half| HalfMonth { month, half }))
    }
}

impl std::fmt::Display for HalfMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}/{}", self.month, if self.half == 1 { "01" } else { "15" })
    }
}

/// Compute the half-month bucket for a date. Pure function of
/// `(month, day)`; the year is discarded.
pub fn half_month(date: NaiveDate) -> HalfMonth {
    HalfMonth {
        month: date.month(),
        half: if date.day() <= 14 { 1 } else { 2 },
    }
}
