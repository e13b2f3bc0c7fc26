use crate::{EntityKind, EntityRef, ModelError, RowId};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingPayload {
    pub rating_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AmountPayload {
    pub amount: OrderedFloat<f64>,
}

impl AmountPayload {
    pub fn new(amount: f64) -> Self {
        Self {
            amount: OrderedFloat(amount),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TextPayload {
    pub text: String,
}

/// Cell content. Which variant is legal depends on the column kind.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CellPayload {
    Rating(RatingPayload),
    Amount(AmountPayload),
    Text(TextPayload),
}

/// Discriminant of [`CellPayload`], used in errors and for kind checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PayloadKind {
    Rating,
    Amount,
    Text,
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PayloadKind::Rating => "rating",
            PayloadKind::Amount => "amount",
            PayloadKind::Text => "text",
        })
    }
}

impl PayloadKind {
    /// The payload a column of `kind` carries, if `kind` is a column kind at all.
    pub fn for_column_kind(kind: EntityKind) -> Option<PayloadKind> {
        match kind {
            EntityKind::Measurable | EntityKind::AssessmentDefinition => Some(PayloadKind::Rating),
            EntityKind::CostKind => Some(PayloadKind::Amount),
            EntityKind::InvolvementKind => Some(PayloadKind::Text),
            EntityKind::Application | EntityKind::OrgUnit => None,
        }
    }
}

impl CellPayload {
    pub fn kind(&self) -> PayloadKind {
        match self {
            CellPayload::Rating(_) => PayloadKind::Rating,
            CellPayload::Amount(_) => PayloadKind::Amount,
            CellPayload::Text(_) => PayloadKind::Text,
        }
    }

    pub fn rating(rating_id: i64, comment: Option<String>) -> Self {
        CellPayload::Rating(RatingPayload { rating_id, comment })
    }

    pub fn amount(amount: f64) -> Self {
        CellPayload::Amount(AmountPayload::new(amount))
    }

    pub fn text(text: impl Into<String>) -> Self {
        CellPayload::Text(TextPayload { text: text.into() })
    }
}

/// One populated `(row, column)` coordinate of a report grid.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    pub row_id: RowId,
    pub column_ref: EntityRef,
    pub payload: CellPayload,
}

impl Cell {
    /// Build a cell, checking that `payload` is legal for the column kind.
    pub fn try_new(
        row_id: RowId,
        column_ref: EntityRef,
        payload: CellPayload,
    ) -> Result<Self, ModelError> {
        let kind = column_ref.kind;
        match PayloadKind::for_column_kind(kind) {
            None => Err(ModelError::NotAColumnKind(kind)),
            Some(expected) if expected != payload.kind() => Err(ModelError::PayloadMismatch {
                kind,
                payload: payload.kind(),
            }),
            Some(_) => Ok(Self {
                row_id,
                column_ref,
                payload,
            }),
        }
    }

    pub fn key(&self) -> (RowId, EntityKind, i64) {
        (self.row_id, self.column_ref.kind, self.column_ref.id)
    }

    pub fn rating(&self) -> Option<&RatingPayload> {
        match &self.payload {
            CellPayload::Rating(rating) => Some(rating),
            _ => None,
        }
    }

    pub fn amount(&self) -> Option<f64> {
        match &self.payload {
            CellPayload::Amount(amount) => Some(amount.amount.into_inner()),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.payload {
            CellPayload::Text(text) => Some(&text.text),
            _ => None,
        }
    }
}
