//! SQL schema for the Atlas SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Parent links are deferred so a load may insert children before parents.
CREATE TABLE IF NOT EXISTS location (
    id              INTEGER PRIMARY KEY,
    code            TEXT NOT NULL,
    level           TEXT NOT NULL,   -- 'country' | 'department' | 'municipality'
    parent_id       INTEGER REFERENCES location(id) DEFERRABLE INITIALLY DEFERRED,
    name_en         TEXT,
    name_short_en   TEXT,
    description_en  TEXT,
    name_es         TEXT,
    name_short_es   TEXT,
    description_es  TEXT
);

CREATE TABLE IF NOT EXISTS hs_product (
    id              INTEGER PRIMARY KEY,
    code            TEXT NOT NULL,
    level           TEXT NOT NULL,   -- 'section' | '2digit' | '4digit'
    parent_id       INTEGER REFERENCES hs_product(id) DEFERRABLE INITIALLY DEFERRED,
    name_en         TEXT,
    name_short_en   TEXT,
    description_en  TEXT,
    name_es         TEXT,
    name_short_es   TEXT,
    description_es  TEXT
);

-- Fact tables are bulk-loaded and never updated.
CREATE TABLE IF NOT EXISTS department_product_year (
    id              INTEGER PRIMARY KEY,
    department_id   INTEGER NOT NULL REFERENCES location(id),
    product_id      INTEGER NOT NULL REFERENCES hs_product(id),
    year            INTEGER NOT NULL,
    import_value    INTEGER NOT NULL,
    export_value    INTEGER NOT NULL,
    export_rca      INTEGER NOT NULL,
    density         REAL    NOT NULL CHECK (density BETWEEN 0.0 AND 1.0),
    cog             REAL    NOT NULL,
    coi             REAL    NOT NULL
);

CREATE TABLE IF NOT EXISTS department_year (
    id              INTEGER PRIMARY KEY,
    department_id   INTEGER NOT NULL REFERENCES location(id),
    year            INTEGER NOT NULL,
    eci             REAL    NOT NULL,
    eci_rank        INTEGER NOT NULL,
    diversity       REAL    NOT NULL
);

CREATE TABLE IF NOT EXISTS product_year (
    id              INTEGER PRIMARY KEY,
    product_id      INTEGER NOT NULL REFERENCES hs_product(id),
    year            INTEGER NOT NULL,
    pci             REAL    NOT NULL,
    pci_rank        INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS location_level_idx   ON location(level);
CREATE INDEX IF NOT EXISTS hs_product_level_idx ON hs_product(level);
CREATE INDEX IF NOT EXISTS dpy_department_idx   ON department_product_year(department_id, year);
CREATE INDEX IF NOT EXISTS dpy_product_idx      ON department_product_year(product_id, year);
CREATE INDEX IF NOT EXISTS dy_department_idx    ON department_year(department_id, year);
CREATE INDEX IF NOT EXISTS py_product_idx       ON product_year(product_id, year);

PRAGMA user_version = 1;
";

/// SQL form of `DepartmentProductYear::distance`. Both the `max_distance`
/// predicate and the distance sort key use it verbatim, so SQLite evaluates
/// the same double subtraction as the in-memory accessor.
pub const DISTANCE_SQL: &str = "(1.0 - density)";
