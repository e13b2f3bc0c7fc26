use crate::{Cell, EntityRef, GridDefinition, RowId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A resolved grid plus its sparse cell set.
///
/// A missing `(row, column)` pair means "no data", not zero or empty text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportGridResult {
    pub definition: GridDefinition,
    pub cells: BTreeSet<Cell>,
}

impl ReportGridResult {
    /// The cell at `(row_id, column)`, matching the column by kind and id.
    pub fn cell(&self, row_id: RowId, column: &EntityRef) -> Option<&Cell> {
        self.cells.iter().find(|cell| {
            cell.row_id == row_id
                && cell.column_ref.kind == column.kind
                && cell.column_ref.id == column.id
        })
    }

    pub fn cells_for_row(&self, row_id: RowId) -> impl Iterator<Item = &Cell> {
        self.cells.iter().filter(move |cell| cell.row_id == row_id)
    }

    /// Distinct rows that have at least one cell.
    pub fn row_ids(&self) -> BTreeSet<RowId> {
        self.cells.iter().map(|cell| cell.row_id).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
