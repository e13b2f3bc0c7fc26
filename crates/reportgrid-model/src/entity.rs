use crate::ModelError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kinds of addressable entities.
///
/// Only [`EntityKind::is_column_kind`] kinds may be the target of a grid column; the others
/// appear as row subjects or scope anchors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    Application,
    OrgUnit,
    Measurable,
    AssessmentDefinition,
    CostKind,
    InvolvementKind,
}

impl EntityKind {
    /// Column kinds, in the order their column sources are queried.
    pub const COLUMN_KINDS: [EntityKind; 4] = [
        EntityKind::AssessmentDefinition,
        EntityKind::Measurable,
        EntityKind::CostKind,
        EntityKind::InvolvementKind,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Application => "APPLICATION",
            EntityKind::OrgUnit => "ORG_UNIT",
            EntityKind::Measurable => "MEASURABLE",
            EntityKind::AssessmentDefinition => "ASSESSMENT_DEFINITION",
            EntityKind::CostKind => "COST_KIND",
            EntityKind::InvolvementKind => "INVOLVEMENT_KIND",
        }
    }

    pub fn is_column_kind(self) -> bool {
        Self::COLUMN_KINDS.contains(&self)
    }

    /// Parse a configured column kind, rejecting kinds that cannot back a column.
    pub fn parse_column_kind(s: &str) -> Result<Self, ModelError> {
        let kind: EntityKind = s.parse()?;
        if kind.is_column_kind() {
            Ok(kind)
        } else {
            Err(ModelError::NotAColumnKind(kind))
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "APPLICATION" => Ok(EntityKind::Application),
            "ORG_UNIT" => Ok(EntityKind::OrgUnit),
            "MEASURABLE" => Ok(EntityKind::Measurable),
            "ASSESSMENT_DEFINITION" => Ok(EntityKind::AssessmentDefinition),
            "COST_KIND" => Ok(EntityKind::CostKind),
            "INVOLVEMENT_KIND" => Ok(EntityKind::InvolvementKind),
            other => Err(ModelError::UnknownEntityKind(other.to_string())),
        }
    }
}

/// Reference to any addressable entity.
///
/// Cells carry bare references (kind + id); column definitions carry the resolved display name
/// and description as well.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl EntityRef {
    pub fn new(kind: EntityKind, id: i64) -> Self {
        Self {
            kind,
            id,
            name: None,
            description: None,
        }
    }

    pub fn named(kind: EntityKind, id: i64, name: impl Into<String>) -> Self {
        Self {
            kind,
            id,
            name: Some(name.into()),
            description: None,
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    /// The same reference with name and description stripped.
    pub fn bare(&self) -> Self {
        Self::new(self.kind, self.id)
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}
