use reportgrid_model::{GridIdentifier, ModelError};
use std::error::Error as StdError;
use std::time::Duration;
use thiserror::Error;

pub type SourceResult<T> = Result<T, DataSourceError>;
pub type GridResult<T> = Result<T, GridError>;

/// Failure of an underlying store or row selector call.
#[derive(Debug, Error)]
#[error("{source_name} source failed: {cause}")]
pub struct DataSourceError {
    source_name: String,
    #[source]
    cause: Box<dyn StdError + Send + Sync>,
}

impl DataSourceError {
    pub fn new(
        source_name: impl Into<String>,
        cause: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        Self {
            source_name: source_name.into(),
            cause: cause.into(),
        }
    }

    /// Name of the source that failed (e.g. `cost`, `row-selector`).
    pub fn source_name(&self) -> &str {
        &self.source_name
    }
}

#[derive(Debug, Error)]
pub enum GridError {
    #[error("report grid not found: {0}")]
    NotFound(GridIdentifier),

    #[error(transparent)]
    DataSource(#[from] DataSourceError),

    #[error("invalid grid configuration: {0}")]
    Configuration(String),

    #[error("aggregation timed out after {0:?}")]
    Timeout(Duration),
}

impl From<ModelError> for GridError {
    fn from(err: ModelError) -> Self {
        GridError::Configuration(err.to_string())
    }
}
