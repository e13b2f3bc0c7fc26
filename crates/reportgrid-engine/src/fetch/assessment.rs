use super::{in_scope, rating_cell};
use crate::error::GridResult;
use crate::rollup::collect_unique;
use crate::source::AssessmentSource;
use reportgrid_model::{Cell, EntityKind, RowIdSet};
use std::collections::BTreeSet;

/// One rating cell per `(row, assessment definition)`.
///
/// More than one assessment record for the same pair is a data source error.
pub fn fetch_assessments<S>(
    source: &S,
    rows: &RowIdSet,
    definition_ids: &BTreeSet<i64>,
) -> GridResult<Vec<Cell>>
where
    S: AssessmentSource + ?Sized,
{
    if definition_ids.is_empty() {
        return Ok(Vec::new());
    }

    let records = source
        .assessment_ratings(rows, definition_ids)?
        .into_iter()
        .filter(|r| in_scope(rows, definition_ids, r.row_id, r.column_id))
        .map(|r| ((r.row_id, r.column_id), r));
    let unique = collect_unique("assessment", records)?;

    log::debug!("assessment fetcher produced {} cells", unique.len());
    unique
        .into_values()
        .map(|record| rating_cell(EntityKind::AssessmentDefinition, record))
        .collect()
}
