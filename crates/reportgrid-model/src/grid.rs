use crate::ColumnDefinition;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Predicate identifying a single grid.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum GridIdentifier {
    Id(i64),
    ExternalId(String),
}

impl fmt::Display for GridIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridIdentifier::Id(id) => write!(f, "id {id}"),
            GridIdentifier::ExternalId(external_id) => write!(f, "external id {external_id:?}"),
        }
    }
}

impl From<i64> for GridIdentifier {
    fn from(id: i64) -> Self {
        GridIdentifier::Id(id)
    }
}

/// Grid metadata as stored, before its columns are resolved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridHeader {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub external_id: Option<String>,
    pub provenance: String,
    pub last_updated_at: NaiveDateTime,
    pub last_updated_by: String,
}

impl GridHeader {
    pub fn into_definition(self, columns: Vec<ColumnDefinition>) -> GridDefinition {
        GridDefinition {
            id: self.id,
            name: self.name,
            description: self.description,
            external_id: self.external_id,
            provenance: self.provenance,
            last_updated_at: self.last_updated_at,
            last_updated_by: self.last_updated_by,
            columns,
        }
    }
}

/// A grid with its ordered columns. Read-only once resolved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridDefinition {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub external_id: Option<String>,
    pub provenance: String,
    pub last_updated_at: NaiveDateTime,
    pub last_updated_by: String,
    pub columns: Vec<ColumnDefinition>,
}

impl GridDefinition {
    pub fn identifier(&self) -> GridIdentifier {
        GridIdentifier::Id(self.id)
    }
}
