use chrono::NaiveDate;
use fems_rs::loader::{self, parse_csv, LoadError, Source};
use fems_rs::{Client, SampleStore};
use std::io::Write;

const CANONICAL: &str = "Sample Id,Date-Time,Site Name,SiteId,Fuel Type,Category,Sub-Category,Method,Sample Avg Value,Sample Status\n";

fn canonical_body(rows: &[&str]) -> String {
    let mut text = CANONICAL.to_string();
    for r in rows {
        text.push_str(r);
        text.push('\n');
    }
    text
}

#[test]
fn canonical_header_maps_by_name() {
    let text = canonical_body(&[
        "1,2020-03-05T12:00:00Z,Ridge,10,Sagebrush,Shrub,New,Dry,87.5,Submitted",
    ]);
    let samples = parse_csv("test", &text).unwrap();
    assert_eq!(samples.len(), 1);
    let s = &samples[0];
    assert_eq!(s.sample_id, "1");
    assert_eq!(s.site_name.as_deref(), Some("Ridge"));
    assert_eq!(s.category.as_deref(), Some("Shrub"));
    assert_eq!(s.value, Some(87.5));
    assert_eq!(
        s.timestamp,
        NaiveDate::from_ymd_opt(2020, 3, 5)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    );
}

#[test]
fn reordered_canonical_header_still_maps_by_name() {
    let text = "Date-Time,Sample Id,Site Name,SiteId,Fuel Type,Category,Sub-Category,Method,Sample Avg Value,Sample Status\n\
                2020-03-05 12:00:00,9,Ridge,10,Sagebrush,Shrub,,,42.0,Submitted\n";
    let samples = parse_csv("test", text).unwrap();
    assert_eq!(samples[0].sample_id, "9");
    assert_eq!(samples[0].value, Some(42.0));
}

#[test]
fn foreign_header_maps_by_position() {
    // The raw FEMS export carries its own column names; normalization is
    // positional onto the canonical order.
    let text = "sample_id,date_time,site_name,site_id,fuel_type,category,sub_category,method,sample_avg_value,sample_status\n\
                7,2019-06-20T08:00:00Z,Basin,3,Cheatgrass,Herb,,,101.2,Submitted\n";
    let samples = parse_csv("fems", text).unwrap();
    assert_eq!(samples.len(), 1);
    assert_eq!(samples[0].site_name.as_deref(), Some("Basin"));
    assert_eq!(samples[0].fuel_type.as_deref(), Some("Cheatgrass"));
    assert_eq!(samples[0].value, Some(101.2));
}

#[test]
fn malformed_timestamps_are_dropped_without_error() {
    let text = canonical_body(&[
        "1,not-a-date,Ridge,10,Sagebrush,Shrub,,,87.5,Submitted",
        "2,,Ridge,10,Sagebrush,Shrub,,,12.0,Submitted",
        "3,2020-03-05T12:00:00Z,Ridge,10,Sagebrush,Shrub,,,15.0,Submitted",
    ]);
    let samples = parse_csv("test", &text).unwrap();
    assert_eq!(samples.len(), 1);
    assert_eq!(samples[0].sample_id, "3");
}

#[test]
fn offsets_are_stripped_to_naive_wall_clock() {
    let text = canonical_body(&[
        "1,2020-03-05T23:30:00-07:00,Ridge,10,Sagebrush,Shrub,,,87.5,Submitted",
    ]);
    let samples = parse_csv("test", &text).unwrap();
    // Wall clock preserved, offset discarded: still March 5th.
    assert_eq!(
        samples[0].timestamp,
        NaiveDate::from_ymd_opt(2020, 3, 5)
            .unwrap()
            .and_hms_opt(23, 30, 0)
            .unwrap()
    );
}

#[test]
fn malformed_value_keeps_the_row() {
    let text = canonical_body(&[
        "1,2020-03-05T12:00:00Z,Ridge,10,Sagebrush,Shrub,,,n/a,Submitted",
    ]);
    let samples = parse_csv("test", &text).unwrap();
    assert_eq!(samples.len(), 1);
    assert_eq!(samples[0].value, None);
}

#[test]
fn source_parses_from_url_or_path() {
    let remote: Source = "https://example.org/samples.csv".parse().unwrap();
    assert_eq!(
        remote,
        Source::Remote("https://example.org/samples.csv".into())
    );
    let local: Source = "data/samples.csv".parse().unwrap();
    assert_eq!(local, Source::Local("data/samples.csv".into()));
}

#[test]
fn unreadable_source_is_fatal() {
    let client = Client::default();
    let missing = Source::Local("/nonexistent/fuel_samples.csv".into());
    let err = loader::load_source(&client, &missing).unwrap_err();
    assert!(matches!(err, LoadError::Io { .. }));
}

#[test]
fn sources_concatenate_without_deduplication() {
    let row = "1,2020-03-05T12:00:00Z,Ridge,10,Sagebrush,Shrub,,,87.5,Submitted";
    let mut a = tempfile::NamedTempFile::new().unwrap();
    let mut b = tempfile::NamedTempFile::new().unwrap();
    write!(a, "{}", canonical_body(&[row])).unwrap();
    write!(b, "{}", canonical_body(&[row])).unwrap();

    let client = Client::default();
    let sources = [
        Source::Local(a.path().into()),
        Source::Local(b.path().into()),
    ];
    let samples = loader::load_sources(&client, &sources).unwrap();
    assert_eq!(samples.len(), 2);
    assert_eq!(samples[0], samples[1]);
}

#[test]
fn store_caches_until_invalidated() {
    let path = tempfile::NamedTempFile::new().unwrap().into_temp_path();
    std::fs::write(
        &path,
        canonical_body(&["1,2020-03-05T12:00:00Z,Ridge,10,Sagebrush,Shrub,,,87.5,Submitted"]),
    )
    .unwrap();

    let client = Client::default();
    let source = Source::Local(path.to_path_buf());
    let mut store = SampleStore::new();

    let first = store.load(&client, std::slice::from_ref(&source)).unwrap();
    assert_eq!(first.len(), 1);
    assert!(store.is_cached(&source));

    // The underlying file changes, but the cache answers until reload.
    std::fs::write(
        &path,
        canonical_body(&[
            "1,2020-03-05T12:00:00Z,Ridge,10,Sagebrush,Shrub,,,87.5,Submitted",
            "2,2020-03-06T12:00:00Z,Ridge,10,Sagebrush,Shrub,,,90.0,Submitted",
        ]),
    )
    .unwrap();
    let cached = store.load(&client, std::slice::from_ref(&source)).unwrap();
    assert_eq!(cached.len(), 1);

    store.invalidate(&source);
    let reloaded = store.load(&client, std::slice::from_ref(&source)).unwrap();
    assert_eq!(reloaded.len(), 2);
}
