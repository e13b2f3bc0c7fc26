//! Aggregation engine.
//!
//! An aggregation resolves the grid definition, partitions its columns into a [`FetchPlan`], runs
//! one fetch task per non-empty partition and unions the results. Partitions are disjoint by
//! column kind, so the union needs no conflict resolution.
//!
//! The async entry points run fetches as blocking tasks in a [`JoinSet`]. The set is joined
//! before the union, and dropping it (on the first error or on timeout) aborts every task that
//! has not started yet; results of tasks already running are discarded. No partial cell set is
//! ever returned.

use crate::config::{AggregationConfig, FetchExecution};
use crate::error::{DataSourceError, GridError, GridResult};
use crate::plan::{FetchPlan, FetchTask};
use crate::resolver::ColumnCatalogResolver;
use crate::source::{AttributeStore, GridConfigSource};
use reportgrid_model::{Cell, GridDefinition, GridIdentifier, RowIdSet};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::task::{JoinError, JoinSet};

pub struct AggregationEngine<S: ?Sized> {
    store: Arc<S>,
    config: AggregationConfig,
}

impl<S: ?Sized> Clone for AggregationEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
        }
    }
}

impl<S> AggregationEngine<S>
where
    S: GridConfigSource + AttributeStore + ?Sized + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self::with_config(store, AggregationConfig::default())
    }

    pub fn with_config(store: Arc<S>, config: AggregationConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &AggregationConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn resolve_definition(&self, identifier: &GridIdentifier) -> GridResult<GridDefinition> {
        ColumnCatalogResolver::new(self.store.as_ref()).resolve(identifier)
    }

    pub async fn resolve_definition_async(
        &self,
        identifier: &GridIdentifier,
    ) -> GridResult<GridDefinition> {
        let store = Arc::clone(&self.store);
        let identifier = identifier.clone();
        tokio::task::spawn_blocking(move || {
            ColumnCatalogResolver::new(store.as_ref()).resolve(&identifier)
        })
        .await
        .map_err(join_error)?
    }

    pub fn list_definitions(&self) -> GridResult<Vec<GridDefinition>> {
        ColumnCatalogResolver::new(self.store.as_ref()).list_definitions()
    }

    /// Resolve the grid and aggregate its cells for `rows`, on the calling thread.
    pub fn aggregate_blocking(
        &self,
        identifier: &GridIdentifier,
        rows: &RowIdSet,
    ) -> GridResult<BTreeSet<Cell>> {
        let definition = self.resolve_definition(identifier)?;
        self.aggregate_definition_blocking(&definition, rows)
    }

    /// Fetchers run one after another; the timeout setting does not apply.
    pub fn aggregate_definition_blocking(
        &self,
        definition: &GridDefinition,
        rows: &RowIdSet,
    ) -> GridResult<BTreeSet<Cell>> {
        let plan = FetchPlan::from_definition(definition)?;
        let mut cells = BTreeSet::new();
        for task in plan.tasks() {
            cells.extend(run_task(&task, self.store.as_ref(), rows)?);
        }
        Ok(cells)
    }

    pub async fn aggregate(
        &self,
        identifier: &GridIdentifier,
        rows: &RowIdSet,
    ) -> GridResult<BTreeSet<Cell>> {
        let definition = self.resolve_definition_async(identifier).await?;
        self.aggregate_definition(&definition, rows).await
    }

    pub async fn aggregate_definition(
        &self,
        definition: &GridDefinition,
        rows: &RowIdSet,
    ) -> GridResult<BTreeSet<Cell>> {
        let plan = FetchPlan::from_definition(definition)?;
        let tasks = plan.tasks();
        log::debug!(
            "aggregating grid {} over {} rows with {} fetch tasks ({:?})",
            definition.id,
            rows.len(),
            tasks.len(),
            self.config.execution
        );

        let fetch_all = self.fetch_all(tasks, rows.clone());
        match self.config.fetch_timeout {
            Some(limit) => tokio::time::timeout(limit, fetch_all).await.map_err(|_| {
                log::warn!(
                    "aggregation of grid {} timed out after {limit:?}",
                    definition.id
                );
                GridError::Timeout(limit)
            })?,
            None => fetch_all.await,
        }
    }

    async fn fetch_all(&self, tasks: Vec<FetchTask>, rows: RowIdSet) -> GridResult<BTreeSet<Cell>> {
        let mut group: JoinSet<GridResult<Vec<Cell>>> = JoinSet::new();
        match self.config.execution {
            FetchExecution::Concurrent => {
                for task in tasks {
                    let store = Arc::clone(&self.store);
                    let rows = rows.clone();
                    group.spawn_blocking(move || run_task(&task, store.as_ref(), &rows));
                }
            }
            FetchExecution::Sequential => {
                let store = Arc::clone(&self.store);
                group.spawn_blocking(move || -> GridResult<Vec<Cell>> {
                    let mut cells = Vec::new();
                    for task in &tasks {
                        cells.extend(run_task(task, store.as_ref(), &rows)?);
                    }
                    Ok(cells)
                });
            }
        }

        let mut cells = BTreeSet::new();
        while let Some(joined) = group.join_next().await {
            cells.extend(joined.map_err(join_error)??);
        }
        Ok(cells)
    }
}

fn run_task<S>(task: &FetchTask, store: &S, rows: &RowIdSet) -> GridResult<Vec<Cell>>
where
    S: AttributeStore + ?Sized,
{
    task.run(store, rows).map_err(|err| {
        log::warn!("{} fetch failed: {err}", task.name());
        err
    })
}

pub(crate) fn join_error(err: JoinError) -> GridError {
    GridError::DataSource(DataSourceError::new("fetch task", err.to_string()))
}
