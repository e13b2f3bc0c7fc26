//! In-memory implementation of every source trait.
//!
//! Useful for tests, benches and embedding small catalogs without a database. Hierarchy
//! expansion walks parent links at query time.

use crate::error::{DataSourceError, SourceResult};
use crate::source::{
    lineage, AssessmentSource, ColumnRow, CostRecord, CostSource, GridConfigSource,
    InvolvementRecord, InvolvementSource, MeasurableRatingSource, RatingItem, RatingRecord,
    RollupCandidate, RowSelector,
};
use reportgrid_model::{EntityKind, GridHeader, GridIdentifier, RowId, RowIdSet, RowScope};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryStoreStats {
    pub assessment_queries: u64,
    pub direct_rating_queries: u64,
    pub rollup_queries: u64,
    pub cost_queries: u64,
    pub involvement_queries: u64,
}

#[derive(Debug, Default)]
struct QueryCounters {
    assessment: AtomicU64,
    direct_rating: AtomicU64,
    rollup: AtomicU64,
    cost: AtomicU64,
    involvement: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Application {
    org_unit_id: Option<i64>,
    removed: bool,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    grids: Vec<GridHeader>,
    columns: Vec<(i64, String, ColumnRow)>,
    applications: BTreeMap<RowId, Application>,
    org_unit_parents: BTreeMap<i64, Option<i64>>,
    measurable_parents: BTreeMap<i64, Option<i64>>,
    rating_items: BTreeMap<i64, RatingItem>,
    measurable_ratings: Vec<RatingRecord>,
    assessment_ratings: Vec<RatingRecord>,
    costs: Vec<CostRecord>,
    involvements: Vec<InvolvementRecord>,
    counters: QueryCounters,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_grid(&mut self, header: GridHeader) -> &mut Self {
        self.grids.push(header);
        self
    }

    /// Configure a column; `kind` is stored unparsed, as a durable store would.
    pub fn add_column(&mut self, grid_id: i64, kind: &str, row: ColumnRow) -> &mut Self {
        self.columns.push((grid_id, kind.to_string(), row));
        self
    }

    pub fn add_application(&mut self, id: RowId, org_unit_id: Option<i64>) -> &mut Self {
        self.applications.insert(
            id,
            Application {
                org_unit_id,
                removed: false,
            },
        );
        self
    }

    pub fn remove_application(&mut self, id: RowId) -> &mut Self {
        if let Some(app) = self.applications.get_mut(&id) {
            app.removed = true;
        }
        self
    }

    pub fn add_org_unit(&mut self, id: i64, parent_id: Option<i64>) -> &mut Self {
        self.org_unit_parents.insert(id, parent_id);
        self
    }

    pub fn add_measurable(&mut self, id: i64, parent_id: Option<i64>) -> &mut Self {
        self.measurable_parents.insert(id, parent_id);
        self
    }

    pub fn add_rating_item(&mut self, item: RatingItem) -> &mut Self {
        self.rating_items.insert(item.id, item);
        self
    }

    pub fn rate_measurable(
        &mut self,
        row_id: RowId,
        measurable_id: i64,
        rating_id: i64,
        comment: Option<&str>,
    ) -> &mut Self {
        self.measurable_ratings.push(RatingRecord {
            row_id,
            column_id: measurable_id,
            rating_id,
            comment: comment.map(str::to_string),
        });
        self
    }

    pub fn add_assessment(
        &mut self,
        row_id: RowId,
        definition_id: i64,
        rating_id: i64,
        comment: Option<&str>,
    ) -> &mut Self {
        self.assessment_ratings.push(RatingRecord {
            row_id,
            column_id: definition_id,
            rating_id,
            comment: comment.map(str::to_string),
        });
        self
    }

    pub fn add_cost(&mut self, row_id: RowId, kind_id: i64, year: i32, amount: f64) -> &mut Self {
        self.costs.push(CostRecord {
            row_id,
            kind_id,
            year,
            amount,
        });
        self
    }

    pub fn add_involvement(
        &mut self,
        row_id: RowId,
        kind_id: i64,
        contributor: &str,
        removed: bool,
    ) -> &mut Self {
        self.involvements.push(InvolvementRecord {
            row_id,
            kind_id,
            contributor: contributor.to_string(),
            removed,
        });
        self
    }

    pub fn stats(&self) -> MemoryStoreStats {
        MemoryStoreStats {
            assessment_queries: self.counters.assessment.load(Ordering::Relaxed),
            direct_rating_queries: self.counters.direct_rating.load(Ordering::Relaxed),
            rollup_queries: self.counters.rollup.load(Ordering::Relaxed),
            cost_queries: self.counters.cost.load(Ordering::Relaxed),
            involvement_queries: self.counters.involvement.load(Ordering::Relaxed),
        }
    }

    /// `node` followed by its ancestors, nearest first.
    fn ancestors(
        parents: &BTreeMap<i64, Option<i64>>,
        node: i64,
        source_name: &str,
    ) -> SourceResult<Vec<i64>> {
        lineage(parents, node).ok_or_else(|| {
            DataSourceError::new(source_name, format!("hierarchy cycle through node {node}"))
        })
    }
}

impl RowSelector for MemoryStore {
    fn resolve(&self, scope: &RowScope) -> SourceResult<RowIdSet> {
        let active = self
            .applications
            .iter()
            .filter(|(_, app)| !app.removed);
        let rows = match scope {
            RowScope::All => active.map(|(id, _)| *id).collect(),
            RowScope::Applications(ids) => active
                .filter(|(id, _)| ids.contains(*id))
                .map(|(id, _)| *id)
                .collect(),
            RowScope::OrgUnit(unit_id) => {
                let mut rows = BTreeSet::new();
                for (id, app) in active {
                    let Some(owner) = app.org_unit_id else {
                        continue;
                    };
                    let lineage = Self::ancestors(&self.org_unit_parents, owner, "row selector")?;
                    if lineage.contains(unit_id) {
                        rows.insert(*id);
                    }
                }
                rows
            }
        };
        Ok(RowIdSet::new(rows))
    }
}

impl GridConfigSource for MemoryStore {
    fn find_grid(&self, identifier: &GridIdentifier) -> SourceResult<Option<GridHeader>> {
        Ok(self
            .grids
            .iter()
            .find(|grid| match identifier {
                GridIdentifier::Id(id) => grid.id == *id,
                GridIdentifier::ExternalId(external_id) => {
                    grid.external_id.as_deref() == Some(external_id.as_str())
                }
            })
            .cloned())
    }

    fn list_grids(&self) -> SourceResult<Vec<GridHeader>> {
        Ok(self.grids.clone())
    }

    fn column_kinds(&self, grid_id: i64) -> SourceResult<Vec<String>> {
        let kinds: BTreeSet<&str> = self
            .columns
            .iter()
            .filter(|(grid, _, _)| *grid == grid_id)
            .map(|(_, kind, _)| kind.as_str())
            .collect();
        Ok(kinds.into_iter().map(str::to_string).collect())
    }

    fn column_rows(&self, grid_id: i64, kind: EntityKind) -> SourceResult<Vec<ColumnRow>> {
        Ok(self
            .columns
            .iter()
            .filter(|(grid, k, _)| *grid == grid_id && k == kind.as_str())
            .map(|(_, _, row)| row.clone())
            .collect())
    }
}

impl AssessmentSource for MemoryStore {
    fn assessment_ratings(
        &self,
        rows: &RowIdSet,
        definition_ids: &BTreeSet<i64>,
    ) -> SourceResult<Vec<RatingRecord>> {
        self.counters.assessment.fetch_add(1, Ordering::Relaxed);
        Ok(self
            .assessment_ratings
            .iter()
            .filter(|r| rows.contains(&r.row_id) && definition_ids.contains(&r.column_id))
            .cloned()
            .collect())
    }
}

impl MeasurableRatingSource for MemoryStore {
    fn direct_ratings(
        &self,
        rows: &RowIdSet,
        node_ids: &BTreeSet<i64>,
    ) -> SourceResult<Vec<RatingRecord>> {
        self.counters.direct_rating.fetch_add(1, Ordering::Relaxed);
        Ok(self
            .measurable_ratings
            .iter()
            .filter(|r| rows.contains(&r.row_id) && node_ids.contains(&r.column_id))
            .cloned()
            .collect())
    }

    fn rollup_candidates(
        &self,
        rows: &RowIdSet,
        summary_ids: &BTreeSet<i64>,
    ) -> SourceResult<Vec<RollupCandidate>> {
        self.counters.rollup.fetch_add(1, Ordering::Relaxed);
        let mut out = Vec::new();
        for rating in self
            .measurable_ratings
            .iter()
            .filter(|r| rows.contains(&r.row_id))
        {
            let lineage =
                Self::ancestors(&self.measurable_parents, rating.column_id, "measurable rating")?;
            for summary_id in lineage.into_iter().filter(|id| summary_ids.contains(id)) {
                let item = self.rating_items.get(&rating.rating_id).ok_or_else(|| {
                    DataSourceError::new(
                        "measurable rating",
                        format!("unknown rating item {}", rating.rating_id),
                    )
                })?;
                out.push(RollupCandidate {
                    row_id: rating.row_id,
                    summary_id,
                    rating: item.clone(),
                });
            }
        }
        Ok(out)
    }
}

impl CostSource for MemoryStore {
    fn costs(&self, rows: &RowIdSet, kind_ids: &BTreeSet<i64>) -> SourceResult<Vec<CostRecord>> {
        self.counters.cost.fetch_add(1, Ordering::Relaxed);
        Ok(self
            .costs
            .iter()
            .filter(|c| rows.contains(&c.row_id) && kind_ids.contains(&c.kind_id))
            .cloned()
            .collect())
    }
}

impl InvolvementSource for MemoryStore {
    fn involvements(
        &self,
        rows: &RowIdSet,
        kind_ids: &BTreeSet<i64>,
    ) -> SourceResult<Vec<InvolvementRecord>> {
        self.counters.involvement.fetch_add(1, Ordering::Relaxed);
        Ok(self
            .involvements
            .iter()
            .filter(|i| rows.contains(&i.row_id) && kind_ids.contains(&i.kind_id))
            .cloned()
            .collect())
    }
}
