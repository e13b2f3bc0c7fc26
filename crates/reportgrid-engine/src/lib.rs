//! Report grid cell aggregation.
//!
//! Given a grid's column configuration and a set of selected rows, the engine fans out to one
//! fetcher per attribute kind, applies each column's merge/rollup policy and assembles a sparse
//! set of cells:
//!
//! - [`ColumnCatalogResolver`] turns a [`GridIdentifier`](reportgrid_model::GridIdentifier) into
//!   an ordered [`GridDefinition`](reportgrid_model::GridDefinition).
//! - [`FetchPlan`] partitions the columns; the [`fetch`] functions read the [`source`] traits.
//! - [`AggregationEngine`] runs the fetchers (concurrently by default) and unions their cells.
//! - [`assemble`] and [`ReportGridService`] produce the final
//!   [`ReportGridResult`](reportgrid_model::ReportGridResult).

mod assembler;
mod config;
mod engine;
mod error;
pub mod fetch;
mod memory;
mod plan;
mod resolver;
pub mod rollup;
pub mod source;
mod service;

pub use crate::assembler::assemble;
pub use crate::config::{AggregationConfig, FetchExecution, FETCH_TIMEOUT_ENV, SEQUENTIAL_FETCH_ENV};
pub use crate::engine::AggregationEngine;
pub use crate::error::{DataSourceError, GridError, GridResult, SourceResult};
pub use crate::memory::{MemoryStore, MemoryStoreStats};
pub use crate::plan::{FetchPlan, FetchTask};
pub use crate::resolver::ColumnCatalogResolver;
pub use crate::service::ReportGridService;
pub use crate::source::{
    lineage, AssessmentSource, AttributeStore, ColumnRow, CostRecord, CostSource,
    GridConfigSource, InvolvementRecord, InvolvementSource, MeasurableRatingSource, RatingItem,
    RatingRecord, RollupCandidate, RowSelector,
};
