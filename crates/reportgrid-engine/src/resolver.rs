use crate::error::{GridError, GridResult};
use crate::source::{ColumnRow, GridConfigSource};
use reportgrid_model::{
    sort_columns, ColumnDefinition, EntityKind, EntityRef, GridDefinition, GridHeader,
    GridIdentifier,
};

/// Resolves grid definitions by unioning the four column kinds.
pub struct ColumnCatalogResolver<'a, S: ?Sized> {
    source: &'a S,
}

impl<'a, S> ColumnCatalogResolver<'a, S>
where
    S: GridConfigSource + ?Sized,
{
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    pub fn resolve(&self, identifier: &GridIdentifier) -> GridResult<GridDefinition> {
        let header = self
            .source
            .find_grid(identifier)?
            .ok_or_else(|| GridError::NotFound(identifier.clone()))?;
        self.resolve_header(header)
    }

    /// Every configured grid with its columns, in grid id order.
    pub fn list_definitions(&self) -> GridResult<Vec<GridDefinition>> {
        let mut headers = self.source.list_grids()?;
        headers.sort_by_key(|h| h.id);
        headers
            .into_iter()
            .map(|header| self.resolve_header(header))
            .collect()
    }

    fn resolve_header(&self, header: GridHeader) -> GridResult<GridDefinition> {
        // Reject unrecognised kinds before any column is read.
        for kind in self.source.column_kinds(header.id)? {
            EntityKind::parse_column_kind(&kind)?;
        }

        let mut columns = Vec::new();
        for kind in EntityKind::COLUMN_KINDS {
            for row in self.source.column_rows(header.id, kind)? {
                columns.push(to_column(kind, row)?);
            }
        }
        sort_columns(&mut columns);

        log::debug!(
            "resolved report grid {} ({:?}) with {} columns",
            header.id,
            header.name,
            columns.len()
        );
        Ok(header.into_definition(columns))
    }
}

fn to_column(kind: EntityKind, row: ColumnRow) -> GridResult<ColumnDefinition> {
    let column_ref =
        EntityRef::named(kind, row.entity_id, row.display_name).with_description(row.description);
    Ok(ColumnDefinition {
        column_ref,
        position: row.position,
        usage_kind: row.usage_kind.parse()?,
        rollup_rule: row.rollup_rule.parse()?,
    })
}
