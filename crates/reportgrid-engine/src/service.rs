use crate::assembler::assemble;
use crate::config::AggregationConfig;
use crate::engine::{join_error, AggregationEngine};
use crate::error::GridResult;
use crate::source::{AttributeStore, GridConfigSource, RowSelector};
use reportgrid_model::{GridDefinition, GridIdentifier, ReportGridResult, RowScope};
use std::sync::Arc;

/// The produced surface: a grid for an identifier and a row scope.
pub struct ReportGridService<S: ?Sized, R: ?Sized> {
    engine: AggregationEngine<S>,
    selector: Arc<R>,
}

impl<S, R> ReportGridService<S, R>
where
    S: GridConfigSource + AttributeStore + ?Sized + 'static,
    R: RowSelector + ?Sized + 'static,
{
    pub fn new(store: Arc<S>, selector: Arc<R>, config: AggregationConfig) -> Self {
        Self {
            engine: AggregationEngine::with_config(store, config),
            selector,
        }
    }

    pub fn engine(&self) -> &AggregationEngine<S> {
        &self.engine
    }

    pub async fn get_report_grid(
        &self,
        identifier: &GridIdentifier,
        scope: &RowScope,
    ) -> GridResult<ReportGridResult> {
        let selector = Arc::clone(&self.selector);
        let owned_scope = scope.clone();
        let rows = tokio::task::spawn_blocking(move || selector.resolve(&owned_scope))
            .await
            .map_err(join_error)??;
        log::debug!("scope {scope} selected {} rows", rows.len());

        let definition = self.engine.resolve_definition_async(identifier).await?;
        let cells = self.engine.aggregate_definition(&definition, &rows).await?;
        Ok(assemble(definition, cells))
    }

    pub fn get_report_grid_blocking(
        &self,
        identifier: &GridIdentifier,
        scope: &RowScope,
    ) -> GridResult<ReportGridResult> {
        let rows = self.selector.resolve(scope)?;
        log::debug!("scope {scope} selected {} rows", rows.len());

        let definition = self.engine.resolve_definition(identifier)?;
        let cells = self.engine.aggregate_definition_blocking(&definition, &rows)?;
        Ok(assemble(definition, cells))
    }

    pub fn list_definitions(&self) -> GridResult<Vec<GridDefinition>> {
        self.engine.list_definitions()
    }
}
