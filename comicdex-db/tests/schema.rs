use comicdex_db::open_memory;
use comicdex_db::schema::{create_schema, open_database, CURRENT_VERSION};

#[test]
fn create_schema_in_memory() {
    let conn = open_memory().unwrap();
    let version: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(version, CURRENT_VERSION);
}

#[test]
fn schema_is_idempotent() {
    let conn = open_memory().unwrap();
    // Creating again should not error
    create_schema(&conn).unwrap();
}

#[test]
fn foreign_keys_enabled() {
    let conn = open_memory().unwrap();
    let fk: i32 = conn
        .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
        .unwrap();
    assert_eq!(fk, 1);
}

#[test]
fn all_tables_exist() {
    let conn = open_memory().unwrap();
    let tables = [
        "schema_version",
        "language",
        "website",
        "category_type",
        "tag_type",
        "comic_relation_type",
        "category",
        "category_relation",
        "tag",
        "comic",
        "comic_title",
        "comic_cover",
        "comic_synopsis",
        "comic_external",
        "comic_category",
        "comic_tag",
        "comic_relation",
        "comic_chapter",
    ];
    for table in tables {
        let exists: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name=?1)",
                [table],
                |row| row.get(0),
            )
            .unwrap();
        assert!(exists, "table '{}' should exist", table);
    }
}

#[test]
fn open_database_reopens_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.db");
    {
        let conn = open_database(&path).unwrap();
        conn.execute("INSERT INTO language (ietf, name) VALUES ('en', 'English')", [])
            .unwrap();
    }
    let conn = open_database(&path).unwrap();
    let n: i64 = conn
        .query_row("SELECT COUNT(*) FROM language", [], |row| row.get(0))
        .unwrap();
    assert_eq!(n, 1);
}

#[test]
fn self_edges_are_rejected_by_the_schema() {
    let conn = open_memory().unwrap();
    conn.execute("INSERT INTO category_type (code, name) VALUES ('genre', 'Genre')", [])
        .unwrap();
    conn.execute("INSERT INTO category (type_id, code, name) VALUES (1, 'action', 'Action')", [])
        .unwrap();
    let err = conn
        .execute("INSERT INTO category_relation (parent_id, child_id) VALUES (1, 1)", [])
        .unwrap_err();
    assert!(err.to_string().contains("category_relation_parent_id_child_id_check"));
}

#[test]
fn chapter_without_version_is_unique() {
    let conn = open_memory().unwrap();
    conn.execute("INSERT INTO comic (code) VALUES ('AAAAAAAA')", []).unwrap();
    conn.execute("INSERT INTO comic_chapter (comic_id, chapter) VALUES (1, '1')", [])
        .unwrap();
    assert!(conn
        .execute("INSERT INTO comic_chapter (comic_id, chapter) VALUES (1, '1')", [])
        .is_err());
    conn.execute(
        "INSERT INTO comic_chapter (comic_id, chapter, version) VALUES (1, '1', 'v2')",
        [],
    )
    .unwrap();
}
