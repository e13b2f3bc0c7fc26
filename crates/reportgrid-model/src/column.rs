use crate::{EntityRef, ModelError};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColumnUsageKind {
    #[default]
    None,
    Summary,
}

impl ColumnUsageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ColumnUsageKind::None => "NONE",
            ColumnUsageKind::Summary => "SUMMARY",
        }
    }
}

impl FromStr for ColumnUsageKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NONE" => Ok(ColumnUsageKind::None),
            "SUMMARY" => Ok(ColumnUsageKind::Summary),
            other => Err(ModelError::UnknownUsageKind(other.to_string())),
        }
    }
}

/// How multiple hierarchy ratings collapse into the single rating of a category column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RatingRollupRule {
    /// Direct associations only, no hierarchy expansion.
    #[default]
    None,
    /// Best rating (lowest rank) among the node and its descendants.
    PickHighest,
    /// Worst rating (highest rank) among the node and its descendants.
    PickLowest,
}

impl RatingRollupRule {
    pub fn as_str(self) -> &'static str {
        match self {
            RatingRollupRule::None => "NONE",
            RatingRollupRule::PickHighest => "PICK_HIGHEST",
            RatingRollupRule::PickLowest => "PICK_LOWEST",
        }
    }

    pub fn expands_hierarchy(self) -> bool {
        !matches!(self, RatingRollupRule::None)
    }
}

impl fmt::Display for RatingRollupRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RatingRollupRule {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NONE" => Ok(RatingRollupRule::None),
            "PICK_HIGHEST" => Ok(RatingRollupRule::PickHighest),
            "PICK_LOWEST" => Ok(RatingRollupRule::PickLowest),
            other => Err(ModelError::UnknownRollupRule(other.to_string())),
        }
    }
}

/// A resolved grid column. `column_ref.name` holds the display name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDefinition {
    pub column_ref: EntityRef,
    pub position: i32,
    #[serde(default)]
    pub usage_kind: ColumnUsageKind,
    #[serde(default)]
    pub rollup_rule: RatingRollupRule,
}

impl ColumnDefinition {
    pub fn new(column_ref: EntityRef, position: i32) -> Self {
        Self {
            column_ref,
            position,
            usage_kind: ColumnUsageKind::None,
            rollup_rule: RatingRollupRule::None,
        }
    }

    pub fn with_rollup_rule(mut self, rule: RatingRollupRule) -> Self {
        self.rollup_rule = rule;
        self
    }

    pub fn with_usage_kind(mut self, usage_kind: ColumnUsageKind) -> Self {
        self.usage_kind = usage_kind;
        self
    }

    pub fn display_name(&self) -> &str {
        self.column_ref.display_name()
    }
}

/// Grid column order: position ascending, then display name (ordinal, case-sensitive).
///
/// Positions are not unique across attribute kinds, so the name is needed for a total order.
pub fn cmp_columns(a: &ColumnDefinition, b: &ColumnDefinition) -> Ordering {
    a.position
        .cmp(&b.position)
        .then_with(|| a.display_name().cmp(b.display_name()))
}

pub fn sort_columns(columns: &mut [ColumnDefinition]) {
    // Stable, so columns equal on both keys keep their source order.
    columns.sort_by(cmp_columns);
}
