use super::in_scope;
use crate::error::GridResult;
use crate::rollup::concat_contributors;
use crate::source::InvolvementSource;
use reportgrid_model::{Cell, CellPayload, EntityKind, EntityRef, RowId, RowIdSet};
use std::collections::{BTreeMap, BTreeSet};

/// One text cell per `(row, involvement kind)` listing every active person involved.
pub fn fetch_involvements<S>(
    source: &S,
    rows: &RowIdSet,
    kind_ids: &BTreeSet<i64>,
) -> GridResult<Vec<Cell>>
where
    S: InvolvementSource + ?Sized,
{
    if kind_ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut groups: BTreeMap<(RowId, i64), Vec<String>> = BTreeMap::new();
    for record in source.involvements(rows, kind_ids)? {
        if record.removed || !in_scope(rows, kind_ids, record.row_id, record.kind_id) {
            continue;
        }
        groups
            .entry((record.row_id, record.kind_id))
            .or_default()
            .push(record.contributor);
    }

    log::debug!("involvement fetcher produced {} cells", groups.len());
    groups
        .into_iter()
        .map(|((row_id, kind_id), contributors)| -> GridResult<Cell> {
            Ok(Cell::try_new(
                row_id,
                EntityRef::new(EntityKind::InvolvementKind, kind_id),
                CellPayload::text(concat_contributors(contributors)),
            )?)
        })
        .collect()
}
