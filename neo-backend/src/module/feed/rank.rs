//! Ordering of summary lists

use neo_common::{NearEarthObjectSummary, SortCriterion};

/// Return a new list ordered by `criterion`; the input is left untouched.
///
/// `Size` and `Velocity` put the largest value first, `Closeness` the
/// smallest miss distance first. Equal keys keep their input order.
pub fn rank(objects: &[NearEarthObjectSummary], criterion: SortCriterion) -> Vec<NearEarthObjectSummary> {
    let mut ranked = objects.to_vec();
    // `sort_by` is stable
    match criterion {
        SortCriterion::Size => ranked.sort_by(|a, b| b.size.total_cmp(&a.size)),
        SortCriterion::Velocity => ranked.sort_by(|a, b| b.velocity.total_cmp(&a.velocity)),
        SortCriterion::Closeness => {
            ranked.sort_by(|a, b| a.close_approach.total_cmp(&b.close_approach))
        }
    }
    ranked
}
