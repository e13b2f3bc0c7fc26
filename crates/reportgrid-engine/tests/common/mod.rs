#![allow(dead_code)]

use chrono::NaiveDate;
use reportgrid_engine::{
    AssessmentSource, ColumnRow, CostRecord, CostSource, DataSourceError, GridConfigSource,
    InvolvementRecord, InvolvementSource, MeasurableRatingSource, MemoryStore, RatingItem,
    RatingRecord, RollupCandidate, SourceResult,
};
use reportgrid_model::{EntityKind, GridHeader, GridIdentifier, RowIdSet};
use std::collections::BTreeSet;
use std::time::Duration;

pub const GRID_ID: i64 = 1;
pub const CRITICALITY: i64 = 50;
pub const FUNCTIONS: i64 = 1;
pub const PAYMENTS_HUB: i64 = 2;
pub const PAYMENTS: i64 = 3;
pub const TRADING: i64 = 4;
pub const REGIONS: i64 = 10;
pub const EMEA: i64 = 11;
pub const APAC: i64 = 12;
pub const INFRA_COST: i64 = 70;
pub const OWNERS: i64 = 80;

pub const GREEN: i64 = 101;
pub const AMBER: i64 = 102;
pub const RED: i64 = 103;

pub fn header(id: i64, name: &str, external_id: Option<&str>) -> GridHeader {
    GridHeader {
        id,
        name: name.to_string(),
        description: Some(format!("{name} grid")),
        external_id: external_id.map(str::to_string),
        provenance: "test".to_string(),
        last_updated_at: NaiveDate::from_ymd_opt(2021, 6, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap(),
        last_updated_by: "admin".to_string(),
    }
}

pub fn column(entity_id: i64, name: &str, position: i32, rollup_rule: &str) -> ColumnRow {
    ColumnRow {
        entity_id,
        display_name: name.to_string(),
        description: None,
        position,
        usage_kind: if rollup_rule == "NONE" { "NONE" } else { "SUMMARY" }.to_string(),
        rollup_rule: rollup_rule.to_string(),
    }
}

fn item(id: i64, rank: i32, name: &str) -> RatingItem {
    RatingItem {
        id,
        rank,
        name: name.to_string(),
    }
}

/// Three applications, one grid with every column kind.
///
/// Expected cells (11 in total):
/// - app 1: criticality 500 "high", functions AMBER, regions GREEN, payments GREEN "core",
///   infra 12.5, owners "a@x.com; b@x.com"
/// - app 2: functions RED, payments RED
/// - app 3: criticality 501, infra 3.0, owners "d@x.com"
pub fn overview_store() -> MemoryStore {
    let mut store = MemoryStore::new();
    store
        .add_grid(header(GRID_ID, "Overview", Some("OVERVIEW")))
        .add_column(GRID_ID, "ASSESSMENT_DEFINITION", column(CRITICALITY, "Criticality", 0, "NONE"))
        .add_column(GRID_ID, "MEASURABLE", column(FUNCTIONS, "Functions", 1, "PICK_HIGHEST"))
        .add_column(GRID_ID, "MEASURABLE", column(REGIONS, "Regions", 1, "PICK_LOWEST"))
        .add_column(GRID_ID, "MEASURABLE", column(PAYMENTS, "Payments", 2, "NONE"))
        .add_column(GRID_ID, "INVOLVEMENT_KIND", column(OWNERS, "Owners", 3, "NONE"))
        .add_column(GRID_ID, "COST_KIND", column(INFRA_COST, "Infra", 3, "NONE"));

    store
        .add_application(1, Some(1))
        .add_application(2, Some(2))
        .add_application(3, Some(1))
        .add_org_unit(1, None)
        .add_org_unit(2, None);

    store
        .add_measurable(FUNCTIONS, None)
        .add_measurable(PAYMENTS_HUB, Some(FUNCTIONS))
        .add_measurable(PAYMENTS, Some(PAYMENTS_HUB))
        .add_measurable(TRADING, Some(FUNCTIONS))
        .add_measurable(REGIONS, None)
        .add_measurable(EMEA, Some(REGIONS))
        .add_measurable(APAC, Some(REGIONS))
        .add_rating_item(item(GREEN, 3, "Green"))
        .add_rating_item(item(AMBER, 1, "Amber"))
        .add_rating_item(item(RED, 1, "Red"));

    store
        .rate_measurable(1, PAYMENTS, GREEN, Some("core"))
        .rate_measurable(1, TRADING, AMBER, None)
        .rate_measurable(1, PAYMENTS_HUB, RED, None)
        .rate_measurable(1, EMEA, GREEN, None)
        .rate_measurable(1, APAC, RED, None)
        .rate_measurable(2, PAYMENTS, RED, None);

    store
        .add_assessment(1, CRITICALITY, 500, Some("high"))
        .add_assessment(3, CRITICALITY, 501, None);

    store
        .add_cost(1, INFRA_COST, 2022, 10.0)
        .add_cost(1, INFRA_COST, 2023, 12.5)
        .add_cost(2, INFRA_COST, 2022, 8.0)
        .add_cost(3, INFRA_COST, 2023, 3.0);

    store
        .add_involvement(1, OWNERS, "b@x.com", false)
        .add_involvement(1, OWNERS, "a@x.com", false)
        .add_involvement(2, OWNERS, "c@x.com", true)
        .add_involvement(3, OWNERS, "d@x.com", false);

    store
}

pub fn all_rows() -> RowIdSet {
    [1, 2, 3].into_iter().collect()
}

pub fn overview() -> GridIdentifier {
    GridIdentifier::Id(GRID_ID)
}

/// Wraps a [`MemoryStore`], making the cost source slow or failing.
pub struct FaultyStore {
    pub inner: MemoryStore,
    pub cost_delay: Option<Duration>,
    pub fail_costs: bool,
}

impl FaultyStore {
    pub fn failing(inner: MemoryStore) -> Self {
        Self {
            inner,
            cost_delay: None,
            fail_costs: true,
        }
    }

    pub fn slow(inner: MemoryStore, delay: Duration) -> Self {
        Self {
            inner,
            cost_delay: Some(delay),
            fail_costs: false,
        }
    }
}

impl GridConfigSource for FaultyStore {
    fn find_grid(&self, identifier: &GridIdentifier) -> SourceResult<Option<GridHeader>> {
        self.inner.find_grid(identifier)
    }

    fn list_grids(&self) -> SourceResult<Vec<GridHeader>> {
        self.inner.list_grids()
    }

    fn column_kinds(&self, grid_id: i64) -> SourceResult<Vec<String>> {
        self.inner.column_kinds(grid_id)
    }

    fn column_rows(&self, grid_id: i64, kind: EntityKind) -> SourceResult<Vec<ColumnRow>> {
        self.inner.column_rows(grid_id, kind)
    }
}

impl AssessmentSource for FaultyStore {
    fn assessment_ratings(
        &self,
        rows: &RowIdSet,
        definition_ids: &BTreeSet<i64>,
    ) -> SourceResult<Vec<RatingRecord>> {
        self.inner.assessment_ratings(rows, definition_ids)
    }
}

impl MeasurableRatingSource for FaultyStore {
    fn direct_ratings(
        &self,
        rows: &RowIdSet,
        node_ids: &BTreeSet<i64>,
    ) -> SourceResult<Vec<RatingRecord>> {
        self.inner.direct_ratings(rows, node_ids)
    }

    fn rollup_candidates(
        &self,
        rows: &RowIdSet,
        summary_ids: &BTreeSet<i64>,
    ) -> SourceResult<Vec<RollupCandidate>> {
        self.inner.rollup_candidates(rows, summary_ids)
    }
}

impl CostSource for FaultyStore {
    fn costs(&self, rows: &RowIdSet, kind_ids: &BTreeSet<i64>) -> SourceResult<Vec<CostRecord>> {
        if let Some(delay) = self.cost_delay {
            std::thread::sleep(delay);
        }
        if self.fail_costs {
            return Err(DataSourceError::new("cost", "connection reset"));
        }
        self.inner.costs(rows, kind_ids)
    }
}

impl InvolvementSource for FaultyStore {
    fn involvements(
        &self,
        rows: &RowIdSet,
        kind_ids: &BTreeSet<i64>,
    ) -> SourceResult<Vec<InvolvementRecord>> {
        self.inner.involvements(rows, kind_ids)
    }
}
