//! Candidate dedupe and ordering for the repository list.

use std::collections::HashMap;

use aidigest_core::RepoItem;

/// Collapses duplicate candidates that arrived from overlapping keyword
/// searches, keeping the occurrence with the highest star count.
pub(crate) fn dedupe_keep_highest(items: Vec<RepoItem>) -> Vec<RepoItem> {
    let mut by_name: HashMap<String, RepoItem> = HashMap::with_capacity(items.len());
    for item in items {
        match by_name.get(&item.full_name) {
            Some(existing) if existing.stars >= item.stars => {}
            _ => {
                by_name.insert(item.full_name.clone(), item);
            }
        }
    }
    by_name.into_values().collect()
}

/// Orders candidates by stars descending, then stars gained today
/// descending. Ties beyond that keep an arbitrary but stable order by
/// identifier so repeated runs produce the same list.
pub(crate) fn rank_repos(items: &mut [RepoItem]) {
    items.sort_by(|a, b| {
        b.stars
            .cmp(&a.stars)
            .then_with(|| b.stars_today.cmp(&a.stars_today))
            .then_with(|| a.full_name.cmp(&b.full_name))
    });
}
