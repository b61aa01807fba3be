//! Roll-up of matched regions into parent region names.

use std::collections::BTreeSet;
use tracing::debug;

use crate::models::{ParentTable, Region};

/// Distinct parent names of the given regions, sorted.
///
/// Regions whose parent key is missing from the table are skipped; the
/// parent mapping may be incomplete without invalidating region results.
pub fn resolve_parents<'r, I>(matched: I, parents: &ParentTable) -> Vec<String>
where
    I: IntoIterator<Item = &'r Region>,
{
    let mut names = BTreeSet::new();
    for region in matched {
        match parents.get(&region.parent_key) {
            Some(parent) => {
                names.insert(parent.name.clone());
            }
            None => debug!(
                "No parent region for key '{}' (region {})",
                region.parent_key, region.id
            ),
        }
    }
    names.into_iter().collect()
}
