use crate::schema;
use reportgrid_engine::{lineage, DataSourceError};
use reportgrid_model::EntityKind;
use rusqlite::{params, params_from_iter, Connection, OpenFlags, Row};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;

/// Row ids bound per statement; keeps `IN (...)` lists under SQLite's variable limit.
pub(crate) const ROW_CHUNK: usize = 4_000;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("storage connection poisoned by a panicked writer")]
    Poisoned,
    #[error("{kind} hierarchy has a cycle through node {node}")]
    HierarchyCycle { kind: EntityKind, node: i64 },
    #[error("entity kind {0} is not supported here")]
    UnsupportedKind(EntityKind),
}

impl StorageError {
    pub(crate) fn into_source(self, source_name: &str) -> DataSourceError {
        DataSourceError::new(source_name, self)
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;

#[derive(Debug, Clone)]
pub struct Storage {
    conn: Arc<Mutex<Connection>>,
}

impl Storage {
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    pub fn open_uri(uri: &str) -> Result<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_URI;
        let conn = Connection::open_with_flags(uri, flags)?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.busy_timeout(Duration::from_secs(5))?;
        schema::init(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub(crate) fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StorageError::Poisoned)
    }

    /// Execute a batch of SQL statements, e.g. a fixture or an import script.
    pub fn load_fixture_sql(&self, sql: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute_batch(sql)?;
        Ok(())
    }

    /// Recompute the `entity_hierarchy` closure for `kind` from its `parent_id` links.
    ///
    /// Every node gets a self row plus one row per ancestor. `level` is the ancestor's depth,
    /// with roots at level 1. Returns the number of rows written.
    pub fn rebuild_hierarchy(&self, kind: EntityKind) -> Result<usize> {
        let table = hierarchy_table(kind)?;
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let parents: BTreeMap<i64, Option<i64>> = {
            let mut stmt = tx.prepare(&format!("SELECT id, parent_id FROM {table}"))?;
            let rows = stmt.query_map([], |r| {
                Ok((r.get::<_, i64>(0)?, r.get::<_, Option<i64>>(1)?))
            })?;
            rows.collect::<rusqlite::Result<_>>()?
        };

        tx.execute(
            "DELETE FROM entity_hierarchy WHERE kind = ?1",
            params![kind.as_str()],
        )?;

        let mut written = 0;
        {
            let mut insert = tx.prepare(
                "INSERT INTO entity_hierarchy (kind, id, ancestor_id, level) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for &node in parents.keys() {
                let chain = lineage(&parents, node)
                    .ok_or(StorageError::HierarchyCycle { kind, node })?;
                let depth = chain.len();
                for (idx, ancestor) in chain.into_iter().enumerate() {
                    let level = (depth - idx) as i64;
                    insert.execute(params![kind.as_str(), node, ancestor, level])?;
                    written += 1;
                }
            }
        }

        tx.commit()?;
        log::debug!("rebuilt {kind} hierarchy: {} nodes, {written} rows", parents.len());
        Ok(written)
    }
}

fn hierarchy_table(kind: EntityKind) -> Result<&'static str> {
    match kind {
        EntityKind::Measurable => Ok("measurable"),
        EntityKind::OrgUnit => Ok("organisational_unit"),
        other => Err(StorageError::UnsupportedKind(other)),
    }
}

pub(crate) fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

/// Run `build(row_marks, id_marks)` once per chunk of `rows`, binding the chunk's row ids then
/// `ids`, and collect every mapped row.
pub(crate) fn select_by_rows_and_ids<T, F>(
    conn: &Connection,
    rows: &[i64],
    ids: &[i64],
    build: impl Fn(&str, &str) -> String,
    mut map: F,
) -> Result<Vec<T>>
where
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    if rows.is_empty() || ids.is_empty() {
        return Ok(Vec::new());
    }

    let id_marks = placeholders(ids.len());
    let mut out = Vec::new();
    for chunk in rows.chunks(ROW_CHUNK) {
        let sql = build(&placeholders(chunk.len()), &id_marks);
        let mut stmt = conn.prepare(&sql)?;
        let mapped = stmt.query_map(params_from_iter(chunk.iter().chain(ids)), &mut map)?;
        for item in mapped {
            out.push(item?);
        }
    }
    Ok(out)
}
