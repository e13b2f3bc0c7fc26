use rusqlite::Connection;

pub(crate) fn init(conn: &Connection) -> rusqlite::Result<()> {
    conn.pragma_update(None, "foreign_keys", "ON")?;

    conn.execute_batch(
        r#"
        -- Row subjects
        CREATE TABLE IF NOT EXISTS organisational_unit (
          id INTEGER PRIMARY KEY,
          name TEXT NOT NULL,
          parent_id INTEGER REFERENCES organisational_unit(id)
        );

        CREATE TABLE IF NOT EXISTS application (
          id INTEGER PRIMARY KEY,
          name TEXT NOT NULL,
          organisational_unit_id INTEGER REFERENCES organisational_unit(id),
          is_removed INTEGER NOT NULL DEFAULT 0
        );

        -- Grid configuration
        CREATE TABLE IF NOT EXISTS report_grid (
          id INTEGER PRIMARY KEY,
          name TEXT NOT NULL,
          description TEXT,
          external_id TEXT UNIQUE,
          provenance TEXT NOT NULL DEFAULT 'local',
          last_updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
          last_updated_by TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS report_grid_column_definition (
          id INTEGER PRIMARY KEY,
          report_grid_id INTEGER NOT NULL REFERENCES report_grid(id),
          column_entity_kind TEXT NOT NULL,
          column_entity_id INTEGER NOT NULL,
          position INTEGER NOT NULL DEFAULT 0,
          display_name TEXT,
          column_usage_kind TEXT NOT NULL DEFAULT 'NONE',
          rating_rollup_rule TEXT NOT NULL DEFAULT 'NONE'
        );

        CREATE INDEX IF NOT EXISTS idx_grid_column_grid
          ON report_grid_column_definition(report_grid_id, column_entity_kind);

        -- Ratings
        CREATE TABLE IF NOT EXISTS rating_scheme (
          id INTEGER PRIMARY KEY,
          name TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS rating_scheme_item (
          id INTEGER PRIMARY KEY,
          scheme_id INTEGER NOT NULL REFERENCES rating_scheme(id),
          code TEXT NOT NULL,
          name TEXT NOT NULL,
          position INTEGER NOT NULL DEFAULT 0,  -- rank: 0 is the best rating
          UNIQUE (scheme_id, code)
        );

        -- Taxonomies
        CREATE TABLE IF NOT EXISTS measurable_category (
          id INTEGER PRIMARY KEY,
          name TEXT NOT NULL,
          rating_scheme_id INTEGER NOT NULL REFERENCES rating_scheme(id)
        );

        CREATE TABLE IF NOT EXISTS measurable (
          id INTEGER PRIMARY KEY,
          name TEXT NOT NULL,
          description TEXT,
          parent_id INTEGER REFERENCES measurable(id),
          measurable_category_id INTEGER NOT NULL REFERENCES measurable_category(id)
        );

        CREATE TABLE IF NOT EXISTS entity_hierarchy (
          kind TEXT NOT NULL,
          id INTEGER NOT NULL,
          ancestor_id INTEGER NOT NULL,
          level INTEGER NOT NULL,
          PRIMARY KEY (kind, id, ancestor_id)
        );

        CREATE INDEX IF NOT EXISTS idx_entity_hierarchy_ancestor
          ON entity_hierarchy(kind, ancestor_id);

        CREATE TABLE IF NOT EXISTS measurable_rating (
          entity_id INTEGER NOT NULL REFERENCES application(id),
          measurable_id INTEGER NOT NULL REFERENCES measurable(id),
          rating TEXT NOT NULL,  -- rating_scheme_item.code within the category's scheme
          description TEXT,
          PRIMARY KEY (entity_id, measurable_id)
        );

        -- Assessments
        CREATE TABLE IF NOT EXISTS assessment_definition (
          id INTEGER PRIMARY KEY,
          name TEXT NOT NULL,
          description TEXT,
          rating_scheme_id INTEGER NOT NULL REFERENCES rating_scheme(id)
        );

        CREATE TABLE IF NOT EXISTS assessment_rating (
          entity_id INTEGER NOT NULL REFERENCES application(id),
          assessment_definition_id INTEGER NOT NULL REFERENCES assessment_definition(id),
          rating_id INTEGER NOT NULL REFERENCES rating_scheme_item(id),
          description TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_assessment_rating_entity
          ON assessment_rating(entity_id, assessment_definition_id);

        -- Costs
        CREATE TABLE IF NOT EXISTS cost_kind (
          id INTEGER PRIMARY KEY,
          name TEXT NOT NULL,
          description TEXT
        );

        CREATE TABLE IF NOT EXISTS cost (
          entity_id INTEGER NOT NULL REFERENCES application(id),
          cost_kind_id INTEGER NOT NULL REFERENCES cost_kind(id),
          year INTEGER NOT NULL,
          amount REAL NOT NULL,
          PRIMARY KEY (entity_id, cost_kind_id, year)
        );

        -- Involvements
        CREATE TABLE IF NOT EXISTS involvement_kind (
          id INTEGER PRIMARY KEY,
          name TEXT NOT NULL,
          description TEXT
        );

        CREATE TABLE IF NOT EXISTS person (
          employee_id TEXT PRIMARY KEY,
          email TEXT NOT NULL,
          display_name TEXT NOT NULL,
          is_removed INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS involvement (
          entity_id INTEGER NOT NULL REFERENCES application(id),
          kind_id INTEGER NOT NULL REFERENCES involvement_kind(id),
          employee_id TEXT NOT NULL REFERENCES person(employee_id),
          PRIMARY KEY (entity_id, kind_id, employee_id)
        );
        "#,
    )?;

    Ok(())
}
