mod common;

use common::*;
use pretty_assertions::assert_eq;
use reportgrid_engine::{
    AggregationConfig, AggregationEngine, FetchExecution, FetchPlan, GridError, MemoryStore,
};
use reportgrid_model::{
    Cell, CellPayload, ColumnDefinition, EntityKind, EntityRef, GridIdentifier, RatingRollupRule,
};
use std::collections::BTreeSet;
use std::sync::Arc;

fn cell(row_id: i64, kind: EntityKind, id: i64, payload: CellPayload) -> Cell {
    Cell::try_new(row_id, EntityRef::new(kind, id), payload).unwrap()
}

fn expected_overview_cells() -> BTreeSet<Cell> {
    use EntityKind::*;
    BTreeSet::from([
        cell(1, AssessmentDefinition, CRITICALITY, CellPayload::rating(500, Some("high".into()))),
        cell(1, Measurable, FUNCTIONS, CellPayload::rating(AMBER, None)),
        cell(1, Measurable, REGIONS, CellPayload::rating(GREEN, None)),
        cell(1, Measurable, PAYMENTS, CellPayload::rating(GREEN, Some("core".into()))),
        cell(1, CostKind, INFRA_COST, CellPayload::amount(12.5)),
        cell(1, InvolvementKind, OWNERS, CellPayload::text("a@x.com; b@x.com")),
        cell(2, Measurable, FUNCTIONS, CellPayload::rating(RED, None)),
        cell(2, Measurable, PAYMENTS, CellPayload::rating(RED, None)),
        cell(3, AssessmentDefinition, CRITICALITY, CellPayload::rating(501, None)),
        cell(3, CostKind, INFRA_COST, CellPayload::amount(3.0)),
        cell(3, InvolvementKind, OWNERS, CellPayload::text("d@x.com")),
    ])
}

#[test]
fn blocking_aggregation_produces_sparse_cells() {
    let engine = AggregationEngine::new(Arc::new(overview_store()));
    let cells = engine.aggregate_blocking(&overview(), &all_rows()).unwrap();

    assert_eq!(cells, expected_overview_cells());
    // 3 rows x 6 columns would be 18; only populated coordinates are present.
    assert_eq!(cells.len(), 11);
}

#[tokio::test(flavor = "current_thread")]
async fn concurrent_and_sequential_execution_agree() {
    let store = Arc::new(overview_store());
    let concurrent = AggregationEngine::new(Arc::clone(&store));
    let sequential = AggregationEngine::with_config(
        store,
        AggregationConfig::default().with_execution(FetchExecution::Sequential),
    );

    let a = concurrent.aggregate(&overview(), &all_rows()).await.unwrap();
    let b = sequential.aggregate(&overview(), &all_rows()).await.unwrap();
    assert_eq!(a, expected_overview_cells());
    assert_eq!(a, b);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn repeated_aggregation_is_idempotent() {
    let engine = AggregationEngine::new(Arc::new(overview_store()));
    let first = engine.aggregate(&overview(), &all_rows()).await.unwrap();
    let second = engine.aggregate(&overview(), &all_rows()).await.unwrap();
    assert_eq!(first, second);
}

#[test]
fn at_most_one_cell_per_coordinate() {
    let engine = AggregationEngine::new(Arc::new(overview_store()));
    let cells = engine.aggregate_blocking(&overview(), &all_rows()).unwrap();
    let keys: BTreeSet<_> = cells.iter().map(Cell::key).collect();
    assert_eq!(keys.len(), cells.len());
}

#[test]
fn rows_outside_the_selection_are_ignored() {
    let engine = AggregationEngine::new(Arc::new(overview_store()));
    let rows = [3].into_iter().collect();
    let cells = engine.aggregate_blocking(&overview(), &rows).unwrap();
    assert!(cells.iter().all(|c| c.row_id == 3));
    assert_eq!(cells.len(), 3);
}

#[test]
fn cost_cells_only_use_the_latest_year() {
    let engine = AggregationEngine::new(Arc::new(overview_store()));
    let cells = engine.aggregate_blocking(&overview(), &all_rows()).unwrap();
    let costs: Vec<(i64, f64)> = cells
        .iter()
        .filter_map(|c| c.amount().map(|amount| (c.row_id, amount)))
        .collect();
    // App 2 only reported in 2022 and so has no cell.
    assert_eq!(costs, vec![(1, 12.5), (3, 3.0)]);
}

#[test]
fn latest_year_is_computed_per_cost_kind() {
    let mut store = MemoryStore::new();
    store
        .add_grid(header(1, "Costs", None))
        .add_column(1, "COST_KIND", column(70, "Infra", 0, "NONE"))
        .add_column(1, "COST_KIND", column(71, "People", 1, "NONE"))
        .add_cost(1, 70, 2023, 1.0)
        .add_cost(1, 71, 2021, 2.0)
        .add_cost(2, 71, 2020, 4.0);
    let engine = AggregationEngine::new(Arc::new(store));
    let cells = engine
        .aggregate_blocking(&GridIdentifier::Id(1), &[1, 2].into_iter().collect())
        .unwrap();
    let amounts: Vec<(i64, i64, f64)> = cells
        .iter()
        .map(|c| (c.row_id, c.column_ref.id, c.amount().unwrap()))
        .collect();
    assert_eq!(amounts, vec![(1, 70, 1.0), (1, 71, 2.0)]);
}

#[test]
fn involvement_merges_into_one_cell() {
    let mut store = MemoryStore::new();
    store
        .add_grid(header(1, "People", None))
        .add_column(1, "INVOLVEMENT_KIND", column(80, "Owners", 0, "NONE"))
        .add_involvement(9, 80, "b@x.com", false)
        .add_involvement(9, 80, "a@x.com", false)
        .add_involvement(9, 80, "gone@x.com", true);
    let engine = AggregationEngine::new(Arc::new(store));
    let cells = engine
        .aggregate_blocking(&GridIdentifier::Id(1), &[9].into_iter().collect())
        .unwrap();

    assert_eq!(cells.len(), 1);
    let only = cells.iter().next().unwrap();
    assert_eq!(only.text(), Some("a@x.com; b@x.com"));
}

#[test]
fn exact_columns_do_not_expand_the_hierarchy() {
    let mut store = overview_store();
    // A rating on a child of PAYMENTS must not show up in the PAYMENTS exact column.
    store
        .add_measurable(99, Some(PAYMENTS))
        .rate_measurable(3, 99, GREEN, None);
    let engine = AggregationEngine::new(Arc::new(store));
    let cells = engine.aggregate_blocking(&overview(), &all_rows()).unwrap();

    let payments = EntityRef::new(EntityKind::Measurable, PAYMENTS);
    assert!(cells
        .iter()
        .all(|c| !(c.row_id == 3 && c.column_ref == payments)));
    // It does roll up into the summary column.
    let functions = EntityRef::new(EntityKind::Measurable, FUNCTIONS);
    assert!(cells
        .iter()
        .any(|c| c.row_id == 3 && c.column_ref == functions));
}

#[test]
fn empty_partitions_issue_no_queries() {
    let mut store = MemoryStore::new();
    store
        .add_grid(header(1, "Costs only", None))
        .add_column(1, "COST_KIND", column(70, "Infra", 0, "NONE"));
    let store = Arc::new(store);
    let engine = AggregationEngine::new(Arc::clone(&store));
    engine
        .aggregate_blocking(&GridIdentifier::Id(1), &all_rows())
        .unwrap();

    let stats = store.stats();
    assert_eq!(stats.cost_queries, 1);
    assert_eq!(stats.assessment_queries, 0);
    assert_eq!(stats.direct_rating_queries, 0);
    assert_eq!(stats.rollup_queries, 0);
    assert_eq!(stats.involvement_queries, 0);
}

#[test]
fn grid_without_columns_yields_no_cells() {
    let mut store = MemoryStore::new();
    store.add_grid(header(1, "Empty", None));
    let engine = AggregationEngine::new(Arc::new(store));
    let cells = engine
        .aggregate_blocking(&GridIdentifier::Id(1), &all_rows())
        .unwrap();
    assert!(cells.is_empty());
}

#[test]
fn duplicate_assessments_are_rejected() {
    let mut store = overview_store();
    store.add_assessment(1, CRITICALITY, 502, None);
    let engine = AggregationEngine::new(Arc::new(store));
    let err = engine
        .aggregate_blocking(&overview(), &all_rows())
        .unwrap_err();
    match err {
        GridError::DataSource(source) => assert_eq!(source.source_name(), "assessment"),
        other => panic!("expected data source error, got {other:?}"),
    }
}

#[test]
fn duplicate_direct_measurable_ratings_are_rejected() {
    let mut store = overview_store();
    store.rate_measurable(1, PAYMENTS, RED, None);
    let engine = AggregationEngine::new(Arc::new(store));
    let err = engine
        .aggregate_blocking(&overview(), &all_rows())
        .unwrap_err();
    match err {
        GridError::DataSource(source) => assert_eq!(source.source_name(), "measurable rating"),
        other => panic!("expected data source error, got {other:?}"),
    }
}

#[test]
fn duplicate_latest_year_costs_are_rejected() {
    let mut store = overview_store();
    store.add_cost(1, INFRA_COST, 2023, 1.0);
    let engine = AggregationEngine::new(Arc::new(store));
    let err = engine
        .aggregate_blocking(&overview(), &all_rows())
        .unwrap_err();
    match err {
        GridError::DataSource(source) => assert_eq!(source.source_name(), "cost"),
        other => panic!("expected data source error, got {other:?}"),
    }
}

#[test]
fn node_with_exact_and_rollup_columns_yields_one_cell() {
    let mut store = overview_store();
    store
        .add_column(GRID_ID, "MEASURABLE", column(FUNCTIONS, "Functions (direct)", 4, "NONE"))
        .rate_measurable(1, FUNCTIONS, GREEN, Some("direct"));
    let engine = AggregationEngine::new(Arc::new(store));

    let definition = engine.resolve_definition(&overview()).unwrap();
    let plan = FetchPlan::from_definition(&definition).unwrap();
    assert_eq!(plan.exact_measurables, BTreeSet::from([PAYMENTS]));
    assert_eq!(plan.pick_highest_measurables, BTreeSet::from([FUNCTIONS]));

    let cells = engine.aggregate_blocking(&overview(), &all_rows()).unwrap();
    let keys: BTreeSet<_> = cells.iter().map(Cell::key).collect();
    assert_eq!(keys.len(), cells.len());
    // Amber still outranks the direct Green rating on the summary node.
    assert_eq!(cells, expected_overview_cells());
}

#[test]
fn plan_partitions_by_kind_and_rollup_rule() {
    let engine = AggregationEngine::new(Arc::new(overview_store()));
    let definition = engine.resolve_definition(&overview()).unwrap();
    let plan = FetchPlan::from_definition(&definition).unwrap();

    assert_eq!(plan.assessment_definitions, BTreeSet::from([CRITICALITY]));
    assert_eq!(plan.exact_measurables, BTreeSet::from([PAYMENTS]));
    assert_eq!(plan.pick_highest_measurables, BTreeSet::from([FUNCTIONS]));
    assert_eq!(plan.pick_lowest_measurables, BTreeSet::from([REGIONS]));
    assert_eq!(plan.cost_kinds, BTreeSet::from([INFRA_COST]));
    assert_eq!(plan.involvement_kinds, BTreeSet::from([OWNERS]));
    assert_eq!(plan.tasks().len(), 5);
}

#[test]
fn rollup_rule_on_non_taxonomy_column_is_ignored() {
    let mut definition = AggregationEngine::new(Arc::new(overview_store()))
        .resolve_definition(&overview())
        .unwrap();
    definition.columns = vec![ColumnDefinition::new(
        EntityRef::named(EntityKind::CostKind, INFRA_COST, "Infra"),
        0,
    )
    .with_rollup_rule(RatingRollupRule::PickHighest)];

    let plan = FetchPlan::from_definition(&definition).unwrap();
    assert_eq!(plan.cost_kinds, BTreeSet::from([INFRA_COST]));
    assert!(plan.pick_highest_measurables.is_empty());
}

#[test]
fn non_column_kind_in_definition_is_a_configuration_error() {
    let mut definition = AggregationEngine::new(Arc::new(overview_store()))
        .resolve_definition(&overview())
        .unwrap();
    definition
        .columns
        .push(ColumnDefinition::new(EntityRef::named(EntityKind::Application, 1, "App"), 9));

    assert!(matches!(
        FetchPlan::from_definition(&definition),
        Err(GridError::Configuration(_))
    ));
}
