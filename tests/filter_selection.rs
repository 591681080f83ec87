use chrono::NaiveDate;
use fems_rs::{FilterSelection, Sample};
use std::collections::BTreeSet;

fn sample(site: &str, category: Option<&str>, fuel: &str, month: u32) -> Sample {
    Sample {
        sample_id: "s".into(),
        timestamp: NaiveDate::from_ymd_opt(2020, month, 5)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap(),
        site_name: Some(site.into()),
        site_id: None,
        fuel_type: Some(fuel.into()),
        category: category.map(Into::into),
        sub_category: None,
        method: None,
        value: Some(50.0),
        status: None,
    }
}

fn names(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn empty_selection_is_identity() {
    let rows = vec![
        sample("Ridge", Some("Shrub"), "Sagebrush", 3),
        sample("Basin", Some("Herb"), "Cheatgrass", 7),
        sample("Basin", None, "Cheatgrass", 9),
    ];
    let out = FilterSelection::default().apply(&rows);
    assert_eq!(out, rows);
}

#[test]
fn predicates_and_across_fields_or_within() {
    let rows = vec![
        sample("Ridge", Some("Shrub"), "Sagebrush", 3),
        sample("Ridge", Some("Herb"), "Cheatgrass", 3),
        sample("Basin", Some("Shrub"), "Sagebrush", 3),
        sample("Ridge", Some("Shrub"), "Sagebrush", 8),
    ];
    let selection = FilterSelection {
        sites: names(&["Ridge"]),
        categories: names(&["Shrub", "Herb"]),
        fuel_types: BTreeSet::new(),
        months: [3u32].into(),
    };
    let out = selection.apply(&rows);
    // Basin fails the site predicate, month 8 fails the month predicate.
    assert_eq!(out.len(), 2);
    assert!(out.iter().all(|s| s.site_name.as_deref() == Some("Ridge")));
    assert!(out.iter().all(|s| s.month() == 3));
}

#[test]
fn missing_categorical_never_matches_a_nonempty_set() {
    let rows = vec![sample("Ridge", None, "Sagebrush", 3)];
    let selection = FilterSelection {
        categories: names(&["Shrub"]),
        ..Default::default()
    };
    assert!(selection.apply(&rows).is_empty());
}

#[test]
fn empty_result_is_a_valid_outcome() {
    let rows = vec![sample("Ridge", Some("Shrub"), "Sagebrush", 3)];
    let selection = FilterSelection {
        sites: names(&["Nowhere"]),
        ..Default::default()
    };
    let out = selection.apply(&rows);
    assert!(out.is_empty());
}

#[test]
fn distinct_values_skip_missing_and_sort() {
    let rows = vec![
        sample("Basin", Some("Shrub"), "Cheatgrass", 3),
        sample("Ridge", None, "Sagebrush", 4),
        sample("Basin", Some("Herb"), "Cheatgrass", 5),
    ];
    let categories = fems_rs::filter::distinct(&rows, |s| s.category.as_deref());
    assert_eq!(categories, vec!["Herb".to_string(), "Shrub".to_string()]);
    let sites = fems_rs::filter::distinct(&rows, |s| s.site_name.as_deref());
    assert_eq!(sites, vec!["Basin".to_string(), "Ridge".to_string()]);
}
