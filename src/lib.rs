//! fems-rs
//!
//! A lightweight Rust library for retrieving, filtering, summarizing, and
//! charting fuel-moisture field samples from the USDA FEMS service. Pairs
//! with the `fems` CLI.
//!
//! ### Features
//! - Fetch the sample history as CSV (or read the published split files /
//!   local files) into a tidy, analysis-friendly schema
//! - Filter by site, category, fuel type, and month
//! - Align samples from any year onto a common half-month axis
//! - Compare a current year against one historical year (trend line) or
//!   several (min/avg/max band)
//! - Export filtered samples as CSV/JSON and per-category SVG/PNG charts
//!
//! ### Example
//! ```no_run
//! use fems_rs::{loader, stats, Client, FilterSelection, Source};
//! use std::collections::BTreeSet;
//!
//! let client = Client::default();
//! let samples = loader::load_sources(
//!     &client,
//!     &["field_samples_2015_present.csv".parse::<Source>()?],
//! )?;
//! let filtered = FilterSelection::default().apply(&samples);
//! let historical: BTreeSet<i32> = [2018, 2019].into();
//! if let Some(report) = stats::compare(&filtered, 2020, &historical) {
//!     fems_rs::viz::plot_all(&report, "charts", 1000, 600, "svg")?;
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod align;
pub mod api;
pub mod filter;
pub mod loader;
pub mod models;
pub mod stats;
pub mod storage;
pub mod viz;

pub use align::HalfMonth;
pub use api::Client;
pub use loader::{SampleStore, Source};
pub use models::{FilterSelection, GroupKey, Sample};
