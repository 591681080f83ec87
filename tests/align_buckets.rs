use chrono::NaiveDate;
use fems_rs::align::{half_month, HalfMonth};
use fems_rs::Sample;

fn sample_on(date: (i32, u32, u32)) -> Sample {
    Sample {
        sample_id: "s".into(),
        timestamp: NaiveDate::from_ymd_opt(date.0, date.1, date.2)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap(),
        site_name: Some("Ridge".into()),
        site_id: None,
        fuel_type: Some("Sagebrush".into()),
        category: Some("Shrub".into()),
        sub_category: None,
        method: None,
        value: Some(100.0),
        status: None,
    }
}

#[test]
fn bucket_is_year_invariant() {
    let a = sample_on((2005, 3, 10));
    let b = sample_on((2019, 3, 10));
    assert_eq!(a.bucket(), b.bucket());
    assert_eq!(a.bucket(), HalfMonth { month: 3, half: 1 });
}

#[test]
fn every_day_maps_to_exactly_one_of_24_buckets() {
    // Walk a whole leap year; each day must land in a known bucket and the
    // buckets seen must be exactly the 24-element axis.
    let mut seen = std::collections::BTreeSet::new();
    let mut day = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2020, 12, 31).unwrap();
    while day <= end {
        seen.insert(half_month(day));
        day = day.succ_opt().unwrap();
    }
    let all: Vec<HalfMonth> = HalfMonth::all().collect();
    assert_eq!(seen.into_iter().collect::<Vec<_>>(), all);
    assert_eq!(all.len(), 24);
}

#[test]
fn derived_fields_follow_the_timestamp() {
    let s = sample_on((2021, 11, 28));
    assert_eq!(s.year(), 2021);
    assert_eq!(s.month(), 11);
    assert_eq!(s.bucket(), HalfMonth { month: 11, half: 2 });
}

#[test]
fn axis_positions_preserve_bucket_order() {
    let positions: Vec<f64> = HalfMonth::all().map(|b| b.axis_pos()).collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(positions[0], 1.0);
    assert_eq!(positions[1], 1.5);
}
