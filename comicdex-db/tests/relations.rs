use comicdex_catalog::{
    AddCategory, AddCategoryRelation, AddComic, AddComicRelation, AddTypeDef, CategorySid,
    ListParams, SetCategory, SetComicRelation,
};
use comicdex_db::category::{self, add_category, add_category_relation, update_category};
use comicdex_db::comic::add_comic;
use comicdex_db::comic_relation::{
    add_comic_relation, get_comic_relation, list_comic_relation, update_comic_relation,
};
use comicdex_db::condition::Condition;
use comicdex_db::type_def::{add_type, CATEGORY_TYPE, COMIC_RELATION_TYPE};
use comicdex_db::{open_memory, DataError, ErrorKind};
use rusqlite::Connection;

fn setup_db() -> Connection {
    open_memory().unwrap()
}

fn add_type_def(conn: &Connection, table: &comicdex_db::Table, code: &str) {
    add_type(
        conn,
        table,
        &AddTypeDef {
            code: code.to_string(),
            name: code.to_uppercase(),
        },
    )
    .unwrap();
}

// ── Categories ──────────────────────────────────────────────────────────────

fn setup_categories() -> Connection {
    let conn = setup_db();
    add_type_def(&conn, &CATEGORY_TYPE, "genre");
    add_type_def(&conn, &CATEGORY_TYPE, "theme");
    for code in ["a", "b", "c", "d"] {
        add_category(
            &conn,
            &AddCategory {
                type_code: Some("genre".to_string()),
                code: code.to_string(),
                name: code.to_uppercase(),
                ..Default::default()
            },
        )
        .unwrap();
    }
    conn
}

fn relate(conn: &Connection, parent: &str, child: &str) -> Result<(), DataError> {
    add_category_relation(
        conn,
        &AddCategoryRelation {
            type_code: Some("genre".to_string()),
            parent_code: Some(parent.to_string()),
            child_code: Some(child.to_string()),
            ..Default::default()
        },
    )
    .map(|_| ())
}

fn category_edges(conn: &Connection) -> Vec<(i64, i64)> {
    category::list_category_relation(conn, &Condition::none(), &ListParams::default())
        .unwrap()
        .into_iter()
        .map(|r| (r.parent_id, r.child_id))
        .collect()
}

#[test]
fn category_loop_is_rejected_and_rolled_back() {
    let conn = setup_categories();
    relate(&conn, "a", "b").unwrap();
    relate(&conn, "b", "c").unwrap();
    let before = category_edges(&conn);

    let err = relate(&conn, "c", "a").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Generic);
    assert_eq!(err.to_string(), "category relation loop detected");
    assert_eq!(category_edges(&conn), before);
    assert!(conn.is_autocommit());

    relate(&conn, "c", "d").unwrap();
    assert_eq!(category_edges(&conn).len(), 3);
}

#[test]
fn category_relation_constraints() {
    let conn = setup_categories();
    let err = relate(&conn, "a", "a").unwrap_err();
    assert_eq!(err.to_string(), "parent category and child category cannot be same");

    relate(&conn, "a", "b").unwrap();
    let err = relate(&conn, "a", "b").unwrap_err();
    assert_eq!(err.to_string(), "same child id already exists");

    let err = relate(&conn, "a", "missing").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Generic);
    assert_eq!(err.to_string(), "parent or child category does not exist");
}

#[test]
fn relation_carries_child_code() {
    let conn = setup_categories();
    let rel = add_category_relation(
        &conn,
        &AddCategoryRelation {
            type_code: Some("genre".to_string()),
            parent_code: Some("a".to_string()),
            child_code: Some("b".to_string()),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(rel.child_code, "b");
}

#[test]
fn type_change_prunes_edges_of_moved_category() {
    let conn = setup_categories();
    relate(&conn, "a", "b").unwrap();
    relate(&conn, "b", "c").unwrap();
    relate(&conn, "d", "a").unwrap();

    let sid = CategorySid {
        type_code: Some("genre".to_string()),
        code: "a".to_string(),
        ..Default::default()
    };
    let moved = update_category(
        &conn,
        &sid,
        &SetCategory {
            type_code: Some("theme".to_string()),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(moved.type_code, "theme");
    let edges = category_edges(&conn);
    assert_eq!(edges.len(), 1);
    assert!(edges.iter().all(|(p, c)| *p != moved.id && *c != moved.id));
}

#[test]
fn rename_keeps_edges() {
    let conn = setup_categories();
    relate(&conn, "a", "b").unwrap();
    let sid = CategorySid {
        type_code: Some("genre".to_string()),
        code: "a".to_string(),
        ..Default::default()
    };
    update_category(
        &conn,
        &sid,
        &SetCategory {
            name: Some("Alpha".to_string()),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(category_edges(&conn).len(), 1);
}

// ── Comics ──────────────────────────────────────────────────────────────────

const A: &str = "AAAAAAAA";
const B: &str = "BBBBBBBB";
const C: &str = "CCCCCCCC";
const D: &str = "DDDDDDDD";

fn setup_comics() -> Connection {
    let conn = setup_db();
    add_type_def(&conn, &COMIC_RELATION_TYPE, "sequel");
    add_type_def(&conn, &COMIC_RELATION_TYPE, "spinoff");
    for code in [A, B, C, D] {
        add_comic(
            &conn,
            &AddComic {
                code: Some(code.to_string()),
                ..Default::default()
            },
        )
        .unwrap();
    }
    conn
}

fn edge(kind: &str, parent: &str, child: &str) -> AddComicRelation {
    AddComicRelation {
        type_code: Some(kind.to_string()),
        parent_code: Some(parent.to_string()),
        child_code: Some(child.to_string()),
        ..Default::default()
    }
}

fn comic_edges(conn: &Connection) -> usize {
    list_comic_relation(conn, &Condition::none(), &ListParams::default())
        .unwrap()
        .len()
}

#[test]
fn comic_loop_is_rejected_per_type() {
    let conn = setup_comics();
    add_comic_relation(&conn, &edge("sequel", A, B)).unwrap();
    add_comic_relation(&conn, &edge("sequel", B, C)).unwrap();

    let err = add_comic_relation(&conn, &edge("sequel", C, A)).unwrap_err();
    assert_eq!(err.to_string(), "comic relation loop detected");
    assert_eq!(comic_edges(&conn), 2);

    add_comic_relation(&conn, &edge("sequel", C, D)).unwrap();
    // Another type is a separate graph.
    let rel = add_comic_relation(&conn, &edge("spinoff", C, A)).unwrap();
    assert_eq!(rel.child_code, A);
    assert_eq!(comic_edges(&conn), 4);
}

#[test]
fn comic_self_edge_is_rejected() {
    let conn = setup_comics();
    let err = add_comic_relation(&conn, &edge("sequel", A, A)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Generic);
    assert_eq!(err.to_string(), "parent comic and child comic cannot be same");
    assert_eq!(comic_edges(&conn), 0);
}

#[test]
fn retyped_edge_is_checked_under_its_new_type() {
    let conn = setup_comics();
    add_comic_relation(&conn, &edge("sequel", A, B)).unwrap();
    add_comic_relation(&conn, &edge("sequel", B, C)).unwrap();
    add_comic_relation(&conn, &edge("spinoff", C, A)).unwrap();

    let to_spinoff = SetComicRelation {
        type_code: Some("spinoff".to_string()),
        ..Default::default()
    };
    let moved = update_comic_relation(&conn, &edge("sequel", A, B), &to_spinoff).unwrap();
    assert_eq!(moved.child_code, B);

    let err = update_comic_relation(&conn, &edge("sequel", B, C), &to_spinoff).unwrap_err();
    assert_eq!(err.to_string(), "comic relation loop detected");
    get_comic_relation(&conn, &edge("sequel", B, C)).unwrap();
    assert_eq!(comic_edges(&conn), 3);
}

#[test]
fn unknown_relation_type_is_a_generic_error() {
    let conn = setup_comics();
    let err = add_comic_relation(&conn, &edge("prequel", A, B)).unwrap_err();
    assert!(matches!(err, DataError::Generic(_)));
    assert_eq!(
        err.to_string(),
        "comic relation type, parent comic or child comic does not exist"
    );
}
