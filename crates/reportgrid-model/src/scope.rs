use crate::ModelError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;
use std::sync::Arc;

pub type RowId = i64;

/// Immutable snapshot of the row subjects selected for one request.
///
/// Clones share the underlying set, so every fetcher filters against the same materialized
/// snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RowIdSet(Arc<BTreeSet<RowId>>);

impl RowIdSet {
    pub fn new(ids: BTreeSet<RowId>) -> Self {
        Self(Arc::new(ids))
    }

    pub fn to_vec(&self) -> Vec<RowId> {
        self.0.iter().copied().collect()
    }
}

impl Deref for RowIdSet {
    type Target = BTreeSet<RowId>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromIterator<RowId> for RowIdSet {
    fn from_iter<I: IntoIterator<Item = RowId>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Logical selection of row subjects, turned into a [`RowIdSet`] by a row selector.
///
/// Textual form (used by the CLI): `all`, `org-unit:<id>`, `apps:<id>,<id>,...`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum RowScope {
    /// Every active application.
    All,
    /// Applications owned by the unit or any of its descendants.
    OrgUnit(i64),
    /// An explicit list, filtered to applications that exist and are active.
    Applications(BTreeSet<RowId>),
}

impl fmt::Display for RowScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowScope::All => f.write_str("all"),
            RowScope::OrgUnit(id) => write!(f, "org-unit:{id}"),
            RowScope::Applications(ids) => {
                f.write_str("apps:")?;
                for (idx, id) in ids.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{id}")?;
                }
                Ok(())
            }
        }
    }
}

impl FromStr for RowScope {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ModelError::InvalidScope(s.to_string());
        let s_trimmed = s.trim();
        if s_trimmed.eq_ignore_ascii_case("all") {
            return Ok(RowScope::All);
        }
        let (prefix, rest) = s_trimmed.split_once(':').ok_or_else(invalid)?;
        match prefix {
            "org-unit" => rest
                .trim()
                .parse::<i64>()
                .map(RowScope::OrgUnit)
                .map_err(|_| invalid()),
            "apps" => {
                let mut ids = BTreeSet::new();
                for part in rest.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                    ids.insert(part.parse::<RowId>().map_err(|_| invalid())?);
                }
                Ok(RowScope::Applications(ids))
            }
            _ => Err(invalid()),
        }
    }
}
