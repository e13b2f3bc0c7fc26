//! Per-kind fetchers.
//!
//! Every fetcher takes the selected rows and the column ids it is responsible for, returns no
//! cells without touching its source when that id set is empty, and emits at most one cell per
//! `(row, column)`.

mod assessment;
mod cost;
mod involvement;
mod measurable;

pub use assessment::fetch_assessments;
pub use cost::fetch_costs;
pub use involvement::fetch_involvements;
pub use measurable::{fetch_exact_measurables, fetch_summary_measurables};

use crate::error::GridResult;
use crate::source::RatingRecord;
use reportgrid_model::{Cell, CellPayload, EntityKind, EntityRef, RowIdSet};
use std::collections::BTreeSet;

fn in_scope(rows: &RowIdSet, ids: &BTreeSet<i64>, row_id: i64, column_id: i64) -> bool {
    rows.contains(&row_id) && ids.contains(&column_id)
}

fn rating_cell(kind: EntityKind, record: RatingRecord) -> GridResult<Cell> {
    Ok(Cell::try_new(
        record.row_id,
        EntityRef::new(kind, record.column_id),
        CellPayload::rating(record.rating_id, record.comment),
    )?)
}
