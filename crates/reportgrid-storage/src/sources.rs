//! Source trait implementations over the SQLite schema.

use crate::storage::{placeholders, select_by_rows_and_ids, Result, Storage, StorageError, ROW_CHUNK};
use reportgrid_engine::{
    AssessmentSource, ColumnRow, CostRecord, CostSource, GridConfigSource, InvolvementRecord,
    InvolvementSource, MeasurableRatingSource, RatingItem, RatingRecord, RollupCandidate,
    RowSelector, SourceResult,
};
use reportgrid_model::{EntityKind, GridHeader, GridIdentifier, RowIdSet, RowScope};
use rusqlite::{params, params_from_iter, OptionalExtension, Row};
use std::collections::BTreeSet;

const GRID_HEADER_COLUMNS: &str =
    "id, name, description, external_id, provenance, last_updated_at, last_updated_by";

fn grid_header(r: &Row<'_>) -> rusqlite::Result<GridHeader> {
    Ok(GridHeader {
        id: r.get(0)?,
        name: r.get(1)?,
        description: r.get(2)?,
        external_id: r.get(3)?,
        provenance: r.get(4)?,
        last_updated_at: r.get(5)?,
        last_updated_by: r.get(6)?,
    })
}

/// Table holding the name and description of a column target.
fn column_entity_table(kind: EntityKind) -> Result<&'static str> {
    match kind {
        EntityKind::AssessmentDefinition => Ok("assessment_definition"),
        EntityKind::Measurable => Ok("measurable"),
        EntityKind::CostKind => Ok("cost_kind"),
        EntityKind::InvolvementKind => Ok("involvement_kind"),
        other => Err(StorageError::UnsupportedKind(other)),
    }
}

fn ids(set: &BTreeSet<i64>) -> Vec<i64> {
    set.iter().copied().collect()
}

impl Storage {
    fn find_header(&self, identifier: &GridIdentifier) -> Result<Option<GridHeader>> {
        let conn = self.conn()?;
        let header = match identifier {
            GridIdentifier::Id(id) => conn
                .query_row(
                    &format!("SELECT {GRID_HEADER_COLUMNS} FROM report_grid WHERE id = ?1"),
                    params![id],
                    grid_header,
                )
                .optional()?,
            GridIdentifier::ExternalId(external_id) => conn
                .query_row(
                    &format!("SELECT {GRID_HEADER_COLUMNS} FROM report_grid WHERE external_id = ?1"),
                    params![external_id],
                    grid_header,
                )
                .optional()?,
        };
        Ok(header)
    }

    fn grid_headers(&self) -> Result<Vec<GridHeader>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare(&format!("SELECT {GRID_HEADER_COLUMNS} FROM report_grid ORDER BY id"))?;
        let headers = stmt
            .query_map([], grid_header)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(headers)
    }

    fn grid_column_kinds(&self, grid_id: i64) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT DISTINCT column_entity_kind FROM report_grid_column_definition
             WHERE report_grid_id = ?1 ORDER BY column_entity_kind",
        )?;
        let kinds = stmt
            .query_map(params![grid_id], |r| r.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(kinds)
    }

    fn grid_column_rows(&self, grid_id: i64, kind: EntityKind) -> Result<Vec<ColumnRow>> {
        let table = column_entity_table(kind)?;
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT cd.column_entity_id, COALESCE(cd.display_name, e.name), e.description,
                    cd.position, cd.column_usage_kind, cd.rating_rollup_rule
             FROM report_grid_column_definition cd
             JOIN {table} e ON e.id = cd.column_entity_id
             WHERE cd.report_grid_id = ?1 AND cd.column_entity_kind = ?2"
        ))?;
        let rows = stmt
            .query_map(params![grid_id, kind.as_str()], |r| {
                Ok(ColumnRow {
                    entity_id: r.get(0)?,
                    display_name: r.get(1)?,
                    description: r.get(2)?,
                    position: r.get(3)?,
                    usage_kind: r.get(4)?,
                    rollup_rule: r.get(5)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn select_rows(&self, scope: &RowScope) -> Result<RowIdSet> {
        let conn = self.conn()?;
        let mut rows: BTreeSet<i64> = BTreeSet::new();
        match scope {
            RowScope::All => {
                let mut stmt = conn.prepare("SELECT id FROM application WHERE is_removed = 0")?;
                for id in stmt.query_map([], |r| r.get(0))? {
                    rows.insert(id?);
                }
            }
            RowScope::OrgUnit(unit_id) => {
                let mut stmt = conn.prepare(
                    "SELECT a.id FROM application a
                     JOIN entity_hierarchy eh
                       ON eh.kind = 'ORG_UNIT' AND eh.id = a.organisational_unit_id
                     WHERE eh.ancestor_id = ?1 AND a.is_removed = 0",
                )?;
                for id in stmt.query_map(params![unit_id], |r| r.get(0))? {
                    rows.insert(id?);
                }
            }
            RowScope::Applications(requested) => {
                let requested = ids(requested);
                for chunk in requested.chunks(ROW_CHUNK) {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT id FROM application WHERE is_removed = 0 AND id IN ({})",
                        placeholders(chunk.len())
                    ))?;
                    for id in stmt.query_map(params_from_iter(chunk), |r| r.get(0))? {
                        rows.insert(id?);
                    }
                }
            }
        }
        Ok(RowIdSet::new(rows))
    }

    fn select_assessment_ratings(
        &self,
        rows: &RowIdSet,
        definition_ids: &BTreeSet<i64>,
    ) -> Result<Vec<RatingRecord>> {
        let conn = self.conn()?;
        select_by_rows_and_ids(
            &conn,
            &rows.to_vec(),
            &ids(definition_ids),
            |row_marks, id_marks| {
                format!(
                    "SELECT entity_id, assessment_definition_id, rating_id, description
                     FROM assessment_rating
                     WHERE entity_id IN ({row_marks}) AND assessment_definition_id IN ({id_marks})"
                )
            },
            |r| {
                Ok(RatingRecord {
                    row_id: r.get(0)?,
                    column_id: r.get(1)?,
                    rating_id: r.get(2)?,
                    comment: r.get(3)?,
                })
            },
        )
    }

    fn select_direct_ratings(
        &self,
        rows: &RowIdSet,
        node_ids: &BTreeSet<i64>,
    ) -> Result<Vec<RatingRecord>> {
        let conn = self.conn()?;
        select_by_rows_and_ids(
            &conn,
            &rows.to_vec(),
            &ids(node_ids),
            |row_marks, id_marks| {
                format!(
                    "SELECT mr.entity_id, mr.measurable_id, rsi.id, mr.description
                     FROM measurable_rating mr
                     JOIN measurable m ON m.id = mr.measurable_id
                     JOIN measurable_category mc ON mc.id = m.measurable_category_id
                     JOIN rating_scheme_item rsi
                       ON rsi.scheme_id = mc.rating_scheme_id AND rsi.code = mr.rating
                     WHERE mr.entity_id IN ({row_marks}) AND mr.measurable_id IN ({id_marks})"
                )
            },
            |r| {
                Ok(RatingRecord {
                    row_id: r.get(0)?,
                    column_id: r.get(1)?,
                    rating_id: r.get(2)?,
                    comment: r.get(3)?,
                })
            },
        )
    }

    fn select_rollup_candidates(
        &self,
        rows: &RowIdSet,
        summary_ids: &BTreeSet<i64>,
    ) -> Result<Vec<RollupCandidate>> {
        let conn = self.conn()?;
        select_by_rows_and_ids(
            &conn,
            &rows.to_vec(),
            &ids(summary_ids),
            |row_marks, id_marks| {
                format!(
                    "SELECT mr.entity_id, eh.ancestor_id, rsi.id, rsi.position, rsi.name
                     FROM measurable_rating mr
                     JOIN entity_hierarchy eh
                       ON eh.kind = 'MEASURABLE' AND eh.id = mr.measurable_id
                     JOIN measurable m ON m.id = mr.measurable_id
                     JOIN measurable_category mc ON mc.id = m.measurable_category_id
                     JOIN rating_scheme_item rsi
                       ON rsi.scheme_id = mc.rating_scheme_id AND rsi.code = mr.rating
                     WHERE mr.entity_id IN ({row_marks}) AND eh.ancestor_id IN ({id_marks})"
                )
            },
            |r| {
                Ok(RollupCandidate {
                    row_id: r.get(0)?,
                    summary_id: r.get(1)?,
                    rating: RatingItem {
                        id: r.get(2)?,
                        rank: r.get(3)?,
                        name: r.get(4)?,
                    },
                })
            },
        )
    }

    fn select_costs(&self, rows: &RowIdSet, kind_ids: &BTreeSet<i64>) -> Result<Vec<CostRecord>> {
        let conn = self.conn()?;
        select_by_rows_and_ids(
            &conn,
            &rows.to_vec(),
            &ids(kind_ids),
            |row_marks, id_marks| {
                format!(
                    "SELECT entity_id, cost_kind_id, year, amount FROM cost
                     WHERE entity_id IN ({row_marks}) AND cost_kind_id IN ({id_marks})"
                )
            },
            |r| {
                Ok(CostRecord {
                    row_id: r.get(0)?,
                    kind_id: r.get(1)?,
                    year: r.get(2)?,
                    amount: r.get(3)?,
                })
            },
        )
    }

    fn select_involvements(
        &self,
        rows: &RowIdSet,
        kind_ids: &BTreeSet<i64>,
    ) -> Result<Vec<InvolvementRecord>> {
        let conn = self.conn()?;
        select_by_rows_and_ids(
            &conn,
            &rows.to_vec(),
            &ids(kind_ids),
            |row_marks, id_marks| {
                format!(
                    "SELECT i.entity_id, i.kind_id, p.email, p.is_removed
                     FROM involvement i
                     JOIN person p ON p.employee_id = i.employee_id
                     WHERE i.entity_id IN ({row_marks}) AND i.kind_id IN ({id_marks})"
                )
            },
            |r| {
                Ok(InvolvementRecord {
                    row_id: r.get(0)?,
                    kind_id: r.get(1)?,
                    contributor: r.get(2)?,
                    removed: r.get(3)?,
                })
            },
        )
    }
}

impl RowSelector for Storage {
    fn resolve(&self, scope: &RowScope) -> SourceResult<RowIdSet> {
        self.select_rows(scope)
            .map_err(|err| err.into_source("row selector"))
    }
}

impl GridConfigSource for Storage {
    fn find_grid(&self, identifier: &GridIdentifier) -> SourceResult<Option<GridHeader>> {
        self.find_header(identifier)
            .map_err(|err| err.into_source("grid config"))
    }

    fn list_grids(&self) -> SourceResult<Vec<GridHeader>> {
        self.grid_headers()
            .map_err(|err| err.into_source("grid config"))
    }

    fn column_kinds(&self, grid_id: i64) -> SourceResult<Vec<String>> {
        self.grid_column_kinds(grid_id)
            .map_err(|err| err.into_source("grid config"))
    }

    fn column_rows(&self, grid_id: i64, kind: EntityKind) -> SourceResult<Vec<ColumnRow>> {
        self.grid_column_rows(grid_id, kind)
            .map_err(|err| err.into_source("grid config"))
    }
}

impl AssessmentSource for Storage {
    fn assessment_ratings(
        &self,
        rows: &RowIdSet,
        definition_ids: &BTreeSet<i64>,
    ) -> SourceResult<Vec<RatingRecord>> {
        self.select_assessment_ratings(rows, definition_ids)
            .map_err(|err| err.into_source("assessment"))
    }
}

impl MeasurableRatingSource for Storage {
    fn direct_ratings(
        &self,
        rows: &RowIdSet,
        node_ids: &BTreeSet<i64>,
    ) -> SourceResult<Vec<RatingRecord>> {
        self.select_direct_ratings(rows, node_ids)
            .map_err(|err| err.into_source("measurable rating"))
    }

    fn rollup_candidates(
        &self,
        rows: &RowIdSet,
        summary_ids: &BTreeSet<i64>,
    ) -> SourceResult<Vec<RollupCandidate>> {
        self.select_rollup_candidates(rows, summary_ids)
            .map_err(|err| err.into_source("measurable rating"))
    }
}

impl CostSource for Storage {
    fn costs(&self, rows: &RowIdSet, kind_ids: &BTreeSet<i64>) -> SourceResult<Vec<CostRecord>> {
        self.select_costs(rows, kind_ids)
            .map_err(|err| err.into_source("cost"))
    }
}

impl InvolvementSource for Storage {
    fn involvements(
        &self,
        rows: &RowIdSet,
        kind_ids: &BTreeSet<i64>,
    ) -> SourceResult<Vec<InvolvementRecord>> {
        self.select_involvements(rows, kind_ids)
            .map_err(|err| err.into_source("involvement"))
    }
}
