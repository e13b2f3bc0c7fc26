use super::in_scope;
use crate::error::GridResult;
use crate::rollup::collect_unique;
use crate::source::CostSource;
use reportgrid_model::{Cell, CellPayload, EntityKind, EntityRef, RowIdSet};
use std::collections::{BTreeMap, BTreeSet};

/// Amount cells from the latest year reported for each cost kind among the selected rows.
///
/// Rows without a record in that year get no cell, even if they have older figures.
pub fn fetch_costs<S>(source: &S, rows: &RowIdSet, kind_ids: &BTreeSet<i64>) -> GridResult<Vec<Cell>>
where
    S: CostSource + ?Sized,
{
    if kind_ids.is_empty() {
        return Ok(Vec::new());
    }

    let records: Vec<_> = source
        .costs(rows, kind_ids)?
        .into_iter()
        .filter(|r| in_scope(rows, kind_ids, r.row_id, r.kind_id))
        .collect();

    let mut latest_year: BTreeMap<i64, i32> = BTreeMap::new();
    for record in &records {
        latest_year
            .entry(record.kind_id)
            .and_modify(|year| *year = (*year).max(record.year))
            .or_insert(record.year);
    }

    let current = records
        .into_iter()
        .filter(|r| latest_year.get(&r.kind_id) == Some(&r.year))
        .map(|r| ((r.row_id, r.kind_id), r.amount));
    let amounts = collect_unique("cost", current)?;

    log::debug!(
        "cost fetcher produced {} cells across {} kinds",
        amounts.len(),
        latest_year.len()
    );
    amounts
        .into_iter()
        .map(|((row_id, kind_id), amount)| -> GridResult<Cell> {
            Ok(Cell::try_new(
                row_id,
                EntityRef::new(EntityKind::CostKind, kind_id),
                CellPayload::amount(amount),
            )?)
        })
        .collect()
}
