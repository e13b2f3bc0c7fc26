use super::{in_scope, rating_cell};
use crate::error::GridResult;
use crate::rollup::{collect_unique, pick_rating};
use crate::source::{MeasurableRatingSource, RatingItem};
use reportgrid_model::{
    Cell, CellPayload, EntityKind, EntityRef, RatingRollupRule, RowId, RowIdSet,
};
use std::collections::{BTreeMap, BTreeSet};

/// Direct row/node ratings for columns without a rollup rule. No hierarchy expansion.
pub fn fetch_exact_measurables<S>(
    source: &S,
    rows: &RowIdSet,
    node_ids: &BTreeSet<i64>,
) -> GridResult<Vec<Cell>>
where
    S: MeasurableRatingSource + ?Sized,
{
    if node_ids.is_empty() {
        return Ok(Vec::new());
    }

    let records = source
        .direct_ratings(rows, node_ids)?
        .into_iter()
        .filter(|r| in_scope(rows, node_ids, r.row_id, r.column_id))
        .map(|r| ((r.row_id, r.column_id), r));
    let unique = collect_unique("measurable rating", records)?;

    log::debug!("exact measurable fetcher produced {} cells", unique.len());
    unique
        .into_values()
        .map(|record| rating_cell(EntityKind::Measurable, record))
        .collect()
}

/// One rolled-up rating per `(row, summary node)` from the node and all of its descendants.
///
/// A node listed under both rules is rolled up with `PickHighest`. Summary cells carry no
/// comment.
pub fn fetch_summary_measurables<S>(
    source: &S,
    rows: &RowIdSet,
    pick_highest: &BTreeSet<i64>,
    pick_lowest: &BTreeSet<i64>,
) -> GridResult<Vec<Cell>>
where
    S: MeasurableRatingSource + ?Sized,
{
    if pick_highest.is_empty() && pick_lowest.is_empty() {
        return Ok(Vec::new());
    }

    let summary_ids: BTreeSet<i64> = pick_highest.union(pick_lowest).copied().collect();

    let mut groups: BTreeMap<(RowId, i64), Vec<RatingItem>> = BTreeMap::new();
    for candidate in source.rollup_candidates(rows, &summary_ids)? {
        if !in_scope(rows, &summary_ids, candidate.row_id, candidate.summary_id) {
            continue;
        }
        groups
            .entry((candidate.row_id, candidate.summary_id))
            .or_default()
            .push(candidate.rating);
    }

    let mut cells = Vec::with_capacity(groups.len());
    for ((row_id, summary_id), ratings) in groups {
        let rule = if pick_highest.contains(&summary_id) {
            RatingRollupRule::PickHighest
        } else {
            RatingRollupRule::PickLowest
        };
        if let Some(picked) = pick_rating(rule, &ratings) {
            cells.push(Cell::try_new(
                row_id,
                EntityRef::new(EntityKind::Measurable, summary_id),
                CellPayload::rating(picked.id, None),
            )?);
        }
    }

    log::debug!("summary measurable fetcher produced {} cells", cells.len());
    Ok(cells)
}
