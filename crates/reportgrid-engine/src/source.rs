//! Read-only interfaces the engine consumes.
//!
//! Each attribute kind has its own source trait so any backing store (SQL, key-value, a remote
//! service) can implement them independently. Implementations must be safe to call from several
//! blocking tasks at once.

use crate::error::SourceResult;
use reportgrid_model::{EntityKind, GridHeader, GridIdentifier, RowId, RowIdSet, RowScope};
use std::collections::{BTreeMap, BTreeSet};

/// One configured column as stored, before enum parsing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnRow {
    pub entity_id: i64,
    /// Configured override if present, else the attribute's own name.
    pub display_name: String,
    pub description: Option<String>,
    pub position: i32,
    pub usage_kind: String,
    pub rollup_rule: String,
}

/// A direct rating of a row against a column target (assessment or taxonomy node).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RatingRecord {
    pub row_id: RowId,
    pub column_id: i64,
    pub rating_id: i64,
    pub comment: Option<String>,
}

/// A rating scheme item as seen by the rollup comparator. Rank 0 is the best rating.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RatingItem {
    pub id: i64,
    pub rank: i32,
    pub name: String,
}

/// A rating attached to a summary node or one of its descendants, for one row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RollupCandidate {
    pub row_id: RowId,
    pub summary_id: i64,
    pub rating: RatingItem,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CostRecord {
    pub row_id: RowId,
    pub kind_id: i64,
    pub year: i32,
    pub amount: f64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvolvementRecord {
    pub row_id: RowId,
    pub kind_id: i64,
    /// Identifying text of the person (e.g. email).
    pub contributor: String,
    pub removed: bool,
}

/// Turns a logical scope into a concrete set of row subjects.
pub trait RowSelector: Send + Sync {
    fn resolve(&self, scope: &RowScope) -> SourceResult<RowIdSet>;
}

/// Durable grid configuration.
pub trait GridConfigSource: Send + Sync {
    fn find_grid(&self, identifier: &GridIdentifier) -> SourceResult<Option<GridHeader>>;

    fn list_grids(&self) -> SourceResult<Vec<GridHeader>>;

    /// Distinct column kind strings configured for a grid, unparsed.
    fn column_kinds(&self, grid_id: i64) -> SourceResult<Vec<String>>;

    /// Columns of one kind for a grid, in no particular order.
    fn column_rows(&self, grid_id: i64, kind: EntityKind) -> SourceResult<Vec<ColumnRow>>;
}

pub trait AssessmentSource: Send + Sync {
    fn assessment_ratings(
        &self,
        rows: &RowIdSet,
        definition_ids: &BTreeSet<i64>,
    ) -> SourceResult<Vec<RatingRecord>>;
}

pub trait MeasurableRatingSource: Send + Sync {
    /// Ratings directly against the given nodes.
    fn direct_ratings(
        &self,
        rows: &RowIdSet,
        node_ids: &BTreeSet<i64>,
    ) -> SourceResult<Vec<RatingRecord>>;

    /// Ratings against each summary node or any of its descendants, tagged with the summary
    /// node they roll up to.
    fn rollup_candidates(
        &self,
        rows: &RowIdSet,
        summary_ids: &BTreeSet<i64>,
    ) -> SourceResult<Vec<RollupCandidate>>;
}

pub trait CostSource: Send + Sync {
    /// Cost records of all years for the given kinds.
    fn costs(&self, rows: &RowIdSet, kind_ids: &BTreeSet<i64>) -> SourceResult<Vec<CostRecord>>;
}

pub trait InvolvementSource: Send + Sync {
    /// Person involvements for the given kinds, removed people included.
    fn involvements(
        &self,
        rows: &RowIdSet,
        kind_ids: &BTreeSet<i64>,
    ) -> SourceResult<Vec<InvolvementRecord>>;
}

/// Every attribute source the fetchers need.
pub trait AttributeStore:
    AssessmentSource + MeasurableRatingSource + CostSource + InvolvementSource
{
}

impl<T> AttributeStore for T where
    T: AssessmentSource + MeasurableRatingSource + CostSource + InvolvementSource
{
}

/// `node` followed by its ancestors, nearest first, following `parents` links. `None` on a cycle.
///
/// Shared by stores that keep a taxonomy as `id -> parent_id` pairs.
pub fn lineage(parents: &BTreeMap<i64, Option<i64>>, node: i64) -> Option<Vec<i64>> {
    let mut out = vec![node];
    let mut current = node;
    while let Some(Some(parent)) = parents.get(&current) {
        if out.contains(parent) {
            return None;
        }
        out.push(*parent);
        current = *parent;
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn lineage_walks_to_the_root() {
        let parents = BTreeMap::from([(1, None), (2, Some(1)), (3, Some(2))]);
        assert_eq!(lineage(&parents, 3), Some(vec![3, 2, 1]));
        assert_eq!(lineage(&parents, 1), Some(vec![1]));
    }

    #[test]
    fn unknown_node_is_its_own_root() {
        let parents = BTreeMap::from([(1, None)]);
        assert_eq!(lineage(&parents, 9), Some(vec![9]));
    }

    #[test]
    fn lineage_detects_cycles() {
        let parents = BTreeMap::from([(1, Some(2)), (2, Some(1))]);
        assert_eq!(lineage(&parents, 1), None);
        let self_loop = BTreeMap::from([(4, Some(4))]);
        assert_eq!(lineage(&self_loop, 4), None);
    }
}
