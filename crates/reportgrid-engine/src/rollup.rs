//! Merge and rollup policies shared by the fetchers.

use crate::error::{DataSourceError, SourceResult};
use crate::source::RatingItem;
use reportgrid_model::RatingRollupRule;
use std::cmp::Ordering;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;

pub const CONTRIBUTOR_SEPARATOR: &str = "; ";

/// Comparator whose minimum is the rating a rule selects.
///
/// `PickHighest` orders by rank ascending (rank 0 is best); `PickLowest` by rank descending.
/// Both break ties by name ascending. `None` behaves like `PickHighest`; it never reaches the
/// summary fetcher.
pub fn cmp_for_rule(rule: RatingRollupRule, a: &RatingItem, b: &RatingItem) -> Ordering {
    let by_rank = match rule {
        RatingRollupRule::PickLowest => b.rank.cmp(&a.rank),
        RatingRollupRule::PickHighest | RatingRollupRule::None => a.rank.cmp(&b.rank),
    };
    by_rank.then_with(|| a.name.cmp(&b.name))
}

pub fn pick_rating<'a, I>(rule: RatingRollupRule, candidates: I) -> Option<&'a RatingItem>
where
    I: IntoIterator<Item = &'a RatingItem>,
{
    candidates
        .into_iter()
        .min_by(|a, b| cmp_for_rule(rule, a, b))
}

/// Fold contributor texts into one cell text: distinct values, ordinal order, `"; "`-joined.
pub fn concat_contributors<I, S>(contributors: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let distinct: BTreeSet<String> = contributors
        .into_iter()
        .map(|c| c.as_ref().to_string())
        .collect();
    distinct
        .into_iter()
        .collect::<Vec<_>>()
        .join(CONTRIBUTOR_SEPARATOR)
}

/// Index records by key, failing if a key repeats.
///
/// Fetchers that expect one record per coordinate use this instead of silently picking one.
pub fn collect_unique<K, V, I>(source_name: &str, records: I) -> SourceResult<BTreeMap<K, V>>
where
    K: Ord + Debug,
    I: IntoIterator<Item = (K, V)>,
{
    let mut out = BTreeMap::new();
    for (key, value) in records {
        match out.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(value);
            }
            Entry::Occupied(slot) => {
                return Err(DataSourceError::new(
                    source_name,
                    format!("duplicate record for {:?}", slot.key()),
                ));
            }
        }
    }
    Ok(out)
}
