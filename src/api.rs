//! Synchronous client for the **USDA FEMS fuel-sample download endpoint**
//! and the published split CSV files.
//!
//! The endpoint returns the full sample history as CSV when queried with
//! `responseFormat=csv`; this module only fetches bodies as text and leaves
//! schema normalization to [`crate::loader`].
//!
//! ### Notes
//! - Network timeouts use a sane default (30s total, 10s connect).
//! - Transient failures (5xx / network errors) get a small bounded retry.
//! - Fetching is read-only; the endpoint has no side effects.

use anyhow::{bail, Context, Result};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};
use reqwest::blocking::Client as HttpClient;
use reqwest::redirect::Policy;
use std::time::Duration;

/// Published split files (produced by `fems fetch`), used as the default
/// report sources.
pub const SPLIT_OLDER_URL: &str =
    "https://raw.githubusercontent.com/shelikes2run/AppFuelSample/main/field_samples_2005_2014.csv";
pub const SPLIT_RECENT_URL: &str =
    "https://raw.githubusercontent.com/shelikes2run/AppFuelSample/main/field_samples_2015_present.csv";

// Allow -, _, ., : unescaped in query values (common in ISO timestamps)
const SAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b':');

fn enc(value: &str) -> String {
    percent_encoding::utf8_percent_encode(value.trim(), SAFE).to_string()
}

#[derive(Debug, Clone)]
pub struct Client {
    pub base_url: String,
    http: HttpClient,
}

impl Default for Client {
    fn default() -> Self {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30)) // total request timeout
            .connect_timeout(Duration::from_secs(10)) // connect timeout
            .redirect(Policy::limited(5)) // cap redirects
            .user_agent(concat!("fems_rs/", env!("CARGO_PKG_VERSION"))) // set user agent
            .build()
            .expect("reqwest client build");
        Self {
            base_url: "https://fems.fs2c.usda.gov/fuelmodel".into(),
            http,
        }
    }
}

impl Client {
    /// Build the `sample/download` URL for the inclusive `[start, end]`
    /// window (RFC 3339 instants), requesting submitted samples as CSV
    /// sorted by fuel type.
    pub fn download_url(&self, start: &str, end: &str) -> String {
        let params = [
            ("returnAll", String::new()),
            ("responseFormat", "csv".into()),
            ("siteId", "All".into()),
            ("sampleId", String::new()),
            ("startDate", enc(start)),
            ("endDate", enc(end)),
            ("filterByFuelId", String::new()),
            ("filterByStatus", "Submitted".into()),
            ("filterByCategory", "All".into()),
            ("filterBySubCategory", "All".into()),
            ("filterByMethod", "All".into()),
            ("sortBy", "fuel_type".into()),
            ("sortOrder", "asc".into()),
        ];
        let query = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}/sample/download?{}", self.base_url, query)
    }

    /// GET a CSV body as text.
    ///
    /// Retries transient failures (5xx / network errors) with a short
    /// backoff; any other HTTP failure is surfaced immediately. A source
    /// that cannot be fetched at all is a fatal load error for the caller.
    pub fn fetch_csv(&self, url: &str) -> Result<String> {
        let mut last_err: Option<anyhow::Error> = None;
        for backoff_ms in [100u64, 300, 700] {
            match self.http.get(url).send() {
                Ok(r) if r.status().is_success() => {
                    return r.text().context("read response body");
                }
                Ok(r) if r.status().is_server_error() => { /* retry */ }
                Ok(r) => bail!("request failed with HTTP {}", r.status()),
                Err(e) => last_err = Some(e.into()),
            }
            std::thread::sleep(Duration::from_millis(backoff_ms));
        }
        bail!("network error fetching {}: {:?}", url, last_err);
    }
}
