//! SQLite schema creation and migration.
//!
//! Constraint names follow `<table>_<columns>_key` for uniqueness,
//! `<table>_pkey` for composite primary keys and
//! `<table>_parent_id_child_id_check` for the self-edge checks. The error
//! classifier relies on these names.

use std::path::Path;
use std::time::Duration;

use rusqlite::{Connection, OpenFlags};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Migration error: expected version {expected}, found {found}")]
    VersionMismatch { expected: i32, found: i32 },
}

/// Current schema version. Increment when adding migrations.
pub const CURRENT_VERSION: i32 = 1;

/// How long a connection waits on a locked database before failing.
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Create all tables and indexes if they don't exist.
///
/// This is idempotent, safe to call on an existing database.
pub fn create_schema(conn: &Connection) -> Result<(), SchemaError> {
    conn.execute_batch(SCHEMA_SQL)?;
    if get_schema_version(conn)? < CURRENT_VERSION {
        set_schema_version(conn, CURRENT_VERSION)?;
    }
    log::debug!("schema at version {CURRENT_VERSION}");
    Ok(())
}

/// Open or create a catalog database at the given path, creating or
/// migrating the schema as needed.
pub fn open_database(path: &Path) -> Result<Connection, SchemaError> {
    let conn = Connection::open(path)?;
    configure(&conn)?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;

    let version = get_schema_version(&conn)?;
    if version == 0 {
        log::info!("Creating catalog schema in {}", path.display());
        create_schema(&conn)?;
    } else if version < CURRENT_VERSION {
        log::info!("Migrating catalog schema from version {version}");
        migrate(&conn, version)?;
    } else if version > CURRENT_VERSION {
        return Err(SchemaError::VersionMismatch {
            expected: CURRENT_VERSION,
            found: version,
        });
    }

    Ok(conn)
}

/// Open an in-memory database with the full schema. Useful for testing.
pub fn open_memory() -> Result<Connection, SchemaError> {
    let conn = Connection::open_in_memory()?;
    configure(&conn)?;
    create_schema(&conn)?;
    Ok(conn)
}

/// Open a named in-memory database shared by every connection that opens
/// the same name within this process.
pub fn open_shared_memory(name: &str) -> Result<Connection, SchemaError> {
    let uri = format!("file:{name}?mode=memory&cache=shared");
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_URI
        | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let conn = Connection::open_with_flags(uri, flags)?;
    configure(&conn)?;
    Ok(conn)
}

/// Per-connection settings every pooled connection needs.
pub fn configure(conn: &Connection) -> Result<(), SchemaError> {
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    Ok(())
}

/// Get the current schema version, or 0 if no schema exists.
pub fn get_schema_version(conn: &Connection) -> Result<i32, SchemaError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
        [],
        |row| row.get(0),
    )?;

    if !exists {
        return Ok(0);
    }

    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<(), SchemaError> {
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// Run migrations from `from_version` up to `CURRENT_VERSION`.
fn migrate(conn: &Connection, from_version: i32) -> Result<(), SchemaError> {
    if from_version > CURRENT_VERSION {
        return Err(SchemaError::VersionMismatch {
            expected: CURRENT_VERSION,
            found: from_version,
        });
    }

    // Every table is created with IF NOT EXISTS, so re-running the schema
    // brings older files up to date before the version is recorded.
    conn.execute_batch(SCHEMA_SQL)?;
    let mut version = from_version;
    while version < CURRENT_VERSION {
        version += 1;
        set_schema_version(conn, version)?;
    }

    Ok(())
}

const SCHEMA_SQL: &str = r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Reference data
CREATE TABLE IF NOT EXISTS language (
    id INTEGER PRIMARY KEY,
    ietf TEXT NOT NULL,
    name TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),
    updated_at TEXT,
    CONSTRAINT language_ietf_key UNIQUE (ietf)
);

CREATE TABLE IF NOT EXISTS website (
    id INTEGER PRIMARY KEY,
    domain TEXT NOT NULL,
    name TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),
    updated_at TEXT,
    CONSTRAINT website_domain_key UNIQUE (domain)
);

CREATE TABLE IF NOT EXISTS category_type (
    id INTEGER PRIMARY KEY,
    code TEXT NOT NULL,
    name TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),
    updated_at TEXT,
    CONSTRAINT category_type_code_key UNIQUE (code)
);

CREATE TABLE IF NOT EXISTS tag_type (
    id INTEGER PRIMARY KEY,
    code TEXT NOT NULL,
    name TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),
    updated_at TEXT,
    CONSTRAINT tag_type_code_key UNIQUE (code)
);

CREATE TABLE IF NOT EXISTS comic_relation_type (
    id INTEGER PRIMARY KEY,
    code TEXT NOT NULL,
    name TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),
    updated_at TEXT,
    CONSTRAINT comic_relation_type_code_key UNIQUE (code)
);

-- Categories and tags
CREATE TABLE IF NOT EXISTS category (
    id INTEGER PRIMARY KEY,
    type_id INTEGER NOT NULL REFERENCES category_type(id) ON DELETE CASCADE,
    code TEXT NOT NULL,
    name TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),
    updated_at TEXT,
    CONSTRAINT category_type_id_code_key UNIQUE (type_id, code)
);

CREATE TABLE IF NOT EXISTS category_relation (
    parent_id INTEGER NOT NULL REFERENCES category(id) ON DELETE CASCADE,
    child_id INTEGER NOT NULL REFERENCES category(id) ON DELETE CASCADE,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),
    updated_at TEXT,
    CONSTRAINT category_relation_pkey PRIMARY KEY (parent_id, child_id),
    CONSTRAINT category_relation_parent_id_child_id_check CHECK (parent_id <> child_id)
);
CREATE INDEX IF NOT EXISTS category_relation_child_id_idx ON category_relation(child_id);

CREATE TABLE IF NOT EXISTS tag (
    id INTEGER PRIMARY KEY,
    type_id INTEGER NOT NULL REFERENCES tag_type(id) ON DELETE CASCADE,
    code TEXT NOT NULL,
    name TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),
    updated_at TEXT,
    CONSTRAINT tag_type_id_code_key UNIQUE (type_id, code)
);

-- Comics
CREATE TABLE IF NOT EXISTS comic (
    id INTEGER PRIMARY KEY,
    code TEXT NOT NULL,
    language_id INTEGER REFERENCES language(id) ON DELETE SET NULL,
    published_from TEXT,
    published_to TEXT,
    total_chapter INTEGER,
    total_volume INTEGER,
    nsfw INTEGER,
    nsfl INTEGER,
    additionals TEXT NOT NULL DEFAULT '{}',
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),
    updated_at TEXT,
    CONSTRAINT comic_code_key UNIQUE (code)
);

CREATE TABLE IF NOT EXISTS comic_title (
    id INTEGER PRIMARY KEY,
    comic_id INTEGER NOT NULL REFERENCES comic(id) ON DELETE CASCADE,
    rid TEXT NOT NULL,
    language_id INTEGER NOT NULL REFERENCES language(id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    synonym BOOLEAN,
    romanized BOOLEAN,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),
    updated_at TEXT,
    CONSTRAINT comic_title_comic_id_rid_key UNIQUE (comic_id, rid),
    CONSTRAINT comic_title_comic_id_title_key UNIQUE (comic_id, title)
);

CREATE TABLE IF NOT EXISTS comic_cover (
    id INTEGER PRIMARY KEY,
    comic_id INTEGER NOT NULL REFERENCES comic(id) ON DELETE CASCADE,
    rid TEXT NOT NULL,
    website_id INTEGER NOT NULL REFERENCES website(id) ON DELETE CASCADE,
    relative_url TEXT NOT NULL,
    priority INTEGER,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),
    updated_at TEXT,
    CONSTRAINT comic_cover_comic_id_rid_key UNIQUE (comic_id, rid),
    CONSTRAINT comic_cover_comic_id_website_id_relative_url_key UNIQUE (comic_id, website_id, relative_url)
);

CREATE TABLE IF NOT EXISTS comic_synopsis (
    id INTEGER PRIMARY KEY,
    comic_id INTEGER NOT NULL REFERENCES comic(id) ON DELETE CASCADE,
    rid TEXT NOT NULL,
    language_id INTEGER NOT NULL REFERENCES language(id) ON DELETE CASCADE,
    synopsis TEXT NOT NULL,
    version TEXT,
    romanized BOOLEAN,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),
    updated_at TEXT,
    CONSTRAINT comic_synopsis_comic_id_rid_key UNIQUE (comic_id, rid),
    CONSTRAINT comic_synopsis_comic_id_synopsis_key UNIQUE (comic_id, synopsis)
);

CREATE TABLE IF NOT EXISTS comic_external (
    id INTEGER PRIMARY KEY,
    comic_id INTEGER NOT NULL REFERENCES comic(id) ON DELETE CASCADE,
    rid TEXT NOT NULL,
    website_id INTEGER NOT NULL REFERENCES website(id) ON DELETE CASCADE,
    relative_url TEXT,
    official BOOLEAN,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),
    updated_at TEXT,
    CONSTRAINT comic_external_comic_id_rid_key UNIQUE (comic_id, rid),
    CONSTRAINT comic_external_comic_id_website_id_relative_url_key UNIQUE (comic_id, website_id, relative_url)
);

CREATE TABLE IF NOT EXISTS comic_category (
    comic_id INTEGER NOT NULL REFERENCES comic(id) ON DELETE CASCADE,
    category_id INTEGER NOT NULL REFERENCES category(id) ON DELETE CASCADE,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),
    updated_at TEXT,
    CONSTRAINT comic_category_pkey PRIMARY KEY (comic_id, category_id)
);

CREATE TABLE IF NOT EXISTS comic_tag (
    comic_id INTEGER NOT NULL REFERENCES comic(id) ON DELETE CASCADE,
    tag_id INTEGER NOT NULL REFERENCES tag(id) ON DELETE CASCADE,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),
    updated_at TEXT,
    CONSTRAINT comic_tag_pkey PRIMARY KEY (comic_id, tag_id)
);

CREATE TABLE IF NOT EXISTS comic_relation (
    type_id INTEGER NOT NULL REFERENCES comic_relation_type(id) ON DELETE CASCADE,
    parent_id INTEGER NOT NULL REFERENCES comic(id) ON DELETE CASCADE,
    child_id INTEGER NOT NULL REFERENCES comic(id) ON DELETE CASCADE,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),
    updated_at TEXT,
    CONSTRAINT comic_relation_pkey PRIMARY KEY (type_id, parent_id, child_id),
    CONSTRAINT comic_relation_parent_id_child_id_check CHECK (parent_id <> child_id)
);
CREATE INDEX IF NOT EXISTS comic_relation_parent_id_idx ON comic_relation(parent_id);

CREATE TABLE IF NOT EXISTS comic_chapter (
    id INTEGER PRIMARY KEY,
    comic_id INTEGER NOT NULL REFERENCES comic(id) ON DELETE CASCADE,
    chapter TEXT NOT NULL,
    version TEXT,
    volume TEXT,
    released_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),
    updated_at TEXT
);
-- An absent version is a value of its own, not a wildcard.
CREATE UNIQUE INDEX IF NOT EXISTS comic_chapter_comic_id_chapter_version_key
    ON comic_chapter(comic_id, chapter, COALESCE(version, ''));
"#;
