//! `reportgrid-model` defines the data structures shared by the report grid engine, its stores
//! and its front-ends.
//!
//! A report grid is a sparse matrix: rows are entities in scope (applications), columns are
//! heterogeneous attributes (taxonomy ratings, assessments, costs, involvements). Everything here
//! is serde-friendly so results can cross process boundaries as JSON.

mod cell;
mod column;
mod entity;
mod error;
mod grid;
mod result;
mod scope;

pub use cell::{AmountPayload, Cell, CellPayload, PayloadKind, RatingPayload, TextPayload};
pub use column::{cmp_columns, sort_columns, ColumnDefinition, ColumnUsageKind, RatingRollupRule};
pub use entity::{EntityKind, EntityRef};
pub use error::ModelError;
pub use grid::{GridDefinition, GridHeader, GridIdentifier};
pub use result::ReportGridResult;
pub use scope::{RowId, RowIdSet, RowScope};
