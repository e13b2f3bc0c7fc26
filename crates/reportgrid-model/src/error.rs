use crate::{EntityKind, PayloadKind};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("unknown entity kind: {0}")]
    UnknownEntityKind(String),
    #[error("unknown column usage kind: {0}")]
    UnknownUsageKind(String),
    #[error("unknown rating rollup rule: {0}")]
    UnknownRollupRule(String),
    #[error("entity kind {0} cannot be used as a grid column")]
    NotAColumnKind(EntityKind),
    #[error("{payload} payload is not valid for a {kind} column")]
    PayloadMismatch { kind: EntityKind, payload: PayloadKind },
    #[error("invalid row scope: {0}")]
    InvalidScope(String),
}
