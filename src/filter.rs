//! Predicate application over the loaded dataset.

use crate::models::{FilterSelection, Sample};
use std::collections::BTreeSet;

fn field_matches(field: Option<&str>, allowed: &BTreeSet<String>) -> bool {
    if allowed.is_empty() {
        return true;
    }
    // a missing categorical never satisfies a non-empty selection
    field.map(|v| allowed.contains(v)).unwrap_or(false)
}

impl FilterSelection {
    /// True when every non-empty predicate accepts the sample.
    pub fn matches(&self, sample: &Sample) -> bool {
        field_matches(sample.site_name.as_deref(), &self.sites)
            && field_matches(sample.category.as_deref(), &self.categories)
            && field_matches(sample.fuel_type.as_deref(), &self.fuel_types)
            && (self.months.is_empty() || self.months.contains(&sample.month()))
    }

    /// Subset of `samples` satisfying the selection. An empty result is a
    /// valid outcome, signalling "no matching data" to the caller.
    pub fn apply(&self, samples: &[Sample]) -> Vec<Sample> {
        samples.iter().filter(|s| self.matches(s)).cloned().collect()
    }
}

/// Sorted distinct non-missing values of one categorical field, for
/// building selection menus.
pub fn distinct<F>(samples: &[Sample], field: F) -> Vec<String>
where
    F: Fn(&Sample) -> Option<&str>,
{
    let set: BTreeSet<&str> = samples.iter().filter_map(|s| field(s)).collect();
    set.into_iter().map(str::to_string).collect()
}
