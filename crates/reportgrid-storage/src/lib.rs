//! SQLite-backed storage for report grids.
//!
//! [`Storage`] owns the schema (grid configuration, taxonomies, ratings, costs and
//! involvements) and implements every source trait the aggregation engine reads, plus the
//! application row selector. Taxonomy expansion uses the `entity_hierarchy` closure table, which
//! [`Storage::rebuild_hierarchy`] recomputes from `parent_id` links.

mod schema;
mod sources;
pub mod storage;

pub use storage::{Result, Storage, StorageError};
