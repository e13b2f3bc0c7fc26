use crate::error::{GridError, GridResult};
use crate::fetch;
use crate::source::AttributeStore;
use reportgrid_model::{Cell, EntityKind, GridDefinition, RatingRollupRule, RowIdSet};
use std::collections::BTreeSet;

/// Column ids of a grid partitioned by the fetcher responsible for them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FetchPlan {
    pub assessment_definitions: BTreeSet<i64>,
    pub exact_measurables: BTreeSet<i64>,
    pub pick_highest_measurables: BTreeSet<i64>,
    pub pick_lowest_measurables: BTreeSet<i64>,
    pub cost_kinds: BTreeSet<i64>,
    pub involvement_kinds: BTreeSet<i64>,
}

impl FetchPlan {
    /// Partition by column kind, then split taxonomy columns by rollup rule.
    ///
    /// Rollup rules on other kinds carry no meaning and are ignored. A taxonomy node with both
    /// a `NONE` column and a rolled-up column is only fetched by the summary fetcher.
    pub fn from_definition(definition: &GridDefinition) -> GridResult<Self> {
        let mut plan = Self::default();
        for column in &definition.columns {
            let id = column.column_ref.id;
            match column.column_ref.kind {
                EntityKind::AssessmentDefinition => {
                    plan.assessment_definitions.insert(id);
                }
                EntityKind::Measurable => match column.rollup_rule {
                    RatingRollupRule::None => {
                        plan.exact_measurables.insert(id);
                    }
                    RatingRollupRule::PickHighest => {
                        plan.pick_highest_measurables.insert(id);
                    }
                    RatingRollupRule::PickLowest => {
                        plan.pick_lowest_measurables.insert(id);
                    }
                },
                EntityKind::CostKind => {
                    plan.cost_kinds.insert(id);
                }
                EntityKind::InvolvementKind => {
                    plan.involvement_kinds.insert(id);
                }
                kind @ (EntityKind::Application | EntityKind::OrgUnit) => {
                    return Err(GridError::Configuration(format!(
                        "column {id} of grid {} has kind {kind}, which is not a column kind",
                        definition.id
                    )));
                }
            }
        }

        // A node with both an exact and a rolled-up column gets the rolled-up cell only.
        let shadowed: Vec<i64> = plan
            .exact_measurables
            .iter()
            .copied()
            .filter(|id| {
                plan.pick_highest_measurables.contains(id)
                    || plan.pick_lowest_measurables.contains(id)
            })
            .collect();
        for id in shadowed {
            log::debug!(
                "grid {}: measurable {id} has exact and rolled-up columns, keeping the rollup",
                definition.id
            );
            plan.exact_measurables.remove(&id);
        }
        Ok(plan)
    }

    /// Tasks for every fetcher with work to do.
    pub fn tasks(&self) -> Vec<FetchTask> {
        let mut tasks = Vec::new();
        if !self.assessment_definitions.is_empty() {
            tasks.push(FetchTask::Assessment(self.assessment_definitions.clone()));
        }
        if !self.exact_measurables.is_empty() {
            tasks.push(FetchTask::ExactMeasurable(self.exact_measurables.clone()));
        }
        if !self.pick_highest_measurables.is_empty() || !self.pick_lowest_measurables.is_empty() {
            tasks.push(FetchTask::SummaryMeasurable {
                pick_highest: self.pick_highest_measurables.clone(),
                pick_lowest: self.pick_lowest_measurables.clone(),
            });
        }
        if !self.cost_kinds.is_empty() {
            tasks.push(FetchTask::Cost(self.cost_kinds.clone()));
        }
        if !self.involvement_kinds.is_empty() {
            tasks.push(FetchTask::Involvement(self.involvement_kinds.clone()));
        }
        tasks
    }
}

/// One independent fetch. Owns its ids so it can move into a blocking task.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchTask {
    Assessment(BTreeSet<i64>),
    ExactMeasurable(BTreeSet<i64>),
    SummaryMeasurable {
        pick_highest: BTreeSet<i64>,
        pick_lowest: BTreeSet<i64>,
    },
    Cost(BTreeSet<i64>),
    Involvement(BTreeSet<i64>),
}

impl FetchTask {
    pub fn name(&self) -> &'static str {
        match self {
            FetchTask::Assessment(_) => "assessment",
            FetchTask::ExactMeasurable(_) => "exact measurable",
            FetchTask::SummaryMeasurable { .. } => "summary measurable",
            FetchTask::Cost(_) => "cost",
            FetchTask::Involvement(_) => "involvement",
        }
    }

    pub fn run<S>(&self, store: &S, rows: &RowIdSet) -> GridResult<Vec<Cell>>
    where
        S: AttributeStore + ?Sized,
    {
        match self {
            FetchTask::Assessment(ids) => fetch::fetch_assessments(store, rows, ids),
            FetchTask::ExactMeasurable(ids) => fetch::fetch_exact_measurables(store, rows, ids),
            FetchTask::SummaryMeasurable {
                pick_highest,
                pick_lowest,
            } => fetch::fetch_summary_measurables(store, rows, pick_highest, pick_lowest),
            FetchTask::Cost(ids) => fetch::fetch_costs(store, rows, ids),
            FetchTask::Involvement(ids) => fetch::fetch_involvements(store, rows, ids),
        }
    }
}
