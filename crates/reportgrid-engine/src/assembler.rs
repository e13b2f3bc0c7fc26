use reportgrid_model::{Cell, GridDefinition, ReportGridResult};
use std::collections::BTreeSet;

/// Combine a resolved definition with its aggregated cells.
pub fn assemble(definition: GridDefinition, cells: BTreeSet<Cell>) -> ReportGridResult {
    ReportGridResult { definition, cells }
}
