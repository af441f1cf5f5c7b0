use comicdex_catalog::{
    AddCategory, AddComic, AddComicChapter, AddComicExternal, AddComicTitle, AddLanguage,
    AddTypeDef, AddWebsite, ComicChapter, ComicChapterSid, ComicGenericSid, ListParams, SetComic,
    SetComicTitle,
};
use comicdex_db::category::add_category;
use comicdex_db::chapter::{self, add_comic_chapter, get_comic_chapter};
use comicdex_db::comic::{add_comic, count_comic, delete_comic, list_comic, update_comic};
use comicdex_db::comic_parts::{
    add_comic_external, add_comic_title, batch_add_comic_title, count_comic_title,
    get_comic_title, update_comic_title,
};
use comicdex_db::condition::Condition;
use comicdex_db::engine;
use comicdex_db::language::add_language;
use comicdex_db::type_def::{add_type, CATEGORY_TYPE};
use comicdex_db::website::add_website;
use comicdex_db::{open_memory, DataError, ErrorKind};
use rusqlite::Connection;

fn setup_db() -> Connection {
    let conn = open_memory().unwrap();
    add_language(
        &conn,
        &AddLanguage {
            ietf: "en".to_string(),
            name: "English".to_string(),
        },
    )
    .unwrap();
    add_website(
        &conn,
        &AddWebsite {
            domain: "example.com".to_string(),
            name: "Example".to_string(),
        },
    )
    .unwrap();
    conn
}

fn comic(conn: &Connection, code: &str) -> i64 {
    add_comic(
        conn,
        &AddComic {
            code: Some(code.to_string()),
            language_ietf: Some("en".to_string()),
            ..Default::default()
        },
    )
    .unwrap()
    .id
}

fn title(code: &str, text: &str) -> AddComicTitle {
    AddComicTitle {
        comic_code: Some(code.to_string()),
        language_ietf: Some("en".to_string()),
        title: text.to_string(),
        ..Default::default()
    }
}

// ── Natural keys and constraint messages ────────────────────────────────────

#[test]
fn natural_keys_resolve_inside_the_statement() {
    let conn = setup_db();
    let c = add_comic(
        &conn,
        &AddComic {
            code: Some("ONEPIECE".to_string()),
            language_ietf: Some("en".to_string()),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(c.language_ietf.as_deref(), Some("en"));
    assert!(c.language_id.is_some());
    assert!(c.additionals.is_empty());
    assert!(c.titles.is_empty());
}

#[test]
fn generated_codes_have_fixed_length() {
    let conn = setup_db();
    let c = add_comic(&conn, &AddComic::default()).unwrap();
    assert_eq!(c.code.len(), comicdex_catalog::validate::COMIC_CODE_LENGTH);
    let t = add_comic_title(&conn, &title(&c.code, "Untitled")).unwrap();
    assert_eq!(t.rid.len(), comicdex_catalog::validate::COMIC_RID_LENGTH);
    assert_eq!(t.language_ietf, "en");
}

#[test]
fn unknown_reference_is_reported_by_name() {
    let conn = setup_db();
    let err = add_comic(
        &conn,
        &AddComic {
            language_ietf: Some("xx".to_string()),
            ..Default::default()
        },
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Generic);
    assert_eq!(err.to_string(), "language does not exist");

    let err = add_comic_title(&conn, &title("NOSUCHCC", "Ghost")).unwrap_err();
    assert_eq!(err.to_string(), "comic or language does not exist");
}

#[test]
fn duplicates_use_entity_wording() {
    let conn = setup_db();
    comic(&conn, "AAAAAAAA");
    let err = add_comic(
        &conn,
        &AddComic {
            code: Some("AAAAAAAA".to_string()),
            ..Default::default()
        },
    )
    .unwrap_err();
    assert!(matches!(err, DataError::Generic(_)));
    assert_eq!(err.to_string(), "same code already exists");

    add_comic_title(&conn, &title("AAAAAAAA", "First")).unwrap();
    let err = add_comic_title(&conn, &title("AAAAAAAA", "First")).unwrap_err();
    assert_eq!(err.to_string(), "same comic id + title already exists");

    add_type(
        &conn,
        &CATEGORY_TYPE,
        &AddTypeDef {
            code: "genre".to_string(),
            name: "Genre".to_string(),
        },
    )
    .unwrap();
    let action = AddCategory {
        type_code: Some("genre".to_string()),
        code: "action".to_string(),
        name: "Action".to_string(),
        ..Default::default()
    };
    add_category(&conn, &action).unwrap();
    let err = add_category(&conn, &action).unwrap_err();
    assert_eq!(err.to_string(), "same type id + code already exists");
}

#[test]
fn invalid_payload_never_reaches_storage() {
    let conn = setup_db();
    let err = add_comic(
        &conn,
        &AddComic {
            code: Some("short".to_string()),
            ..Default::default()
        },
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Generic);
    assert_eq!(count_comic(&conn, &Condition::none(), None).unwrap(), 0);
}

// ── Comics ──────────────────────────────────────────────────────────────────

#[test]
fn clearing_additionals_stores_an_empty_object() {
    let conn = setup_db();
    let mut extra = comicdex_catalog::Additionals::new();
    extra.insert("publisher".to_string(), serde_json::json!("Shueisha"));
    add_comic(
        &conn,
        &AddComic {
            code: Some("AAAAAAAA".to_string()),
            additionals: Some(extra),
            ..Default::default()
        },
    )
    .unwrap();

    let c = update_comic(
        &conn,
        "AAAAAAAA",
        &SetComic {
            total_chapter: Some(12),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(c.additionals["publisher"], "Shueisha");

    let c = update_comic(
        &conn,
        "AAAAAAAA",
        &SetComic {
            set_null: vec!["additionals".to_string(), "total_chapter".to_string()],
            ..Default::default()
        },
    )
    .unwrap();
    assert!(c.additionals.is_empty());
    assert_eq!(c.total_chapter, None);
}

#[test]
fn comics_filter_by_external_links() {
    let conn = setup_db();
    comic(&conn, "AAAAAAAA");
    comic(&conn, "BBBBBBBB");
    for url in ["/a/1", "/a/2"] {
        add_comic_external(
            &conn,
            &AddComicExternal {
                comic_code: Some("AAAAAAAA".to_string()),
                website_domain: Some("example.com".to_string()),
                relative_url: Some(url.to_string()),
                ..Default::default()
            },
        )
        .unwrap();
    }

    let ext = Condition::eq("website_domain", "example.com".to_string());
    let found = list_comic(&conn, &Condition::none(), Some(&ext), &ListParams::default()).unwrap();
    // Two matching links still yield the comic once.
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].code, "AAAAAAAA");
    assert_eq!(count_comic(&conn, &Condition::none(), Some(&ext)).unwrap(), 1);

    let both = Condition::eq("code", "BBBBBBBB".to_string());
    assert_eq!(count_comic(&conn, &both, Some(&ext)).unwrap(), 0);
    assert_eq!(count_comic(&conn, &both, None).unwrap(), 1);
}

#[test]
fn deleting_a_comic_removes_its_children() {
    let conn = setup_db();
    comic(&conn, "AAAAAAAA");
    add_comic_title(&conn, &title("AAAAAAAA", "First")).unwrap();
    let gone = delete_comic(&conn, "AAAAAAAA").unwrap();
    assert_eq!(gone.code, "AAAAAAAA");
    assert_eq!(count_comic_title(&conn, &Condition::none()).unwrap(), 0);
}

// ── Titles ──────────────────────────────────────────────────────────────────

#[test]
fn batch_titles_come_back_in_order() {
    let conn = setup_db();
    let id = comic(&conn, "AAAAAAAA");
    let added = batch_add_comic_title(
        &conn,
        &[title("AAAAAAAA", "One"), title("AAAAAAAA", "Two")],
    )
    .unwrap();
    let names: Vec<_> = added.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(names, vec!["One", "Two"]);
    assert!(added.iter().all(|t| t.comic_id == id));

    let err = batch_add_comic_title(
        &conn,
        &[title("AAAAAAAA", "Three"), title("AAAAAAAA", "One")],
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "same comic id + title already exists");
    assert_eq!(count_comic_title(&conn, &Condition::none()).unwrap(), 2);
}

#[test]
fn title_is_found_by_comic_and_rid() {
    let conn = setup_db();
    comic(&conn, "AAAAAAAA");
    let mut v = title("AAAAAAAA", "First");
    v.rid = Some("r001".to_string());
    add_comic_title(&conn, &v).unwrap();

    let sid = ComicGenericSid {
        comic_code: Some("AAAAAAAA".to_string()),
        rid: "r001".to_string(),
        ..Default::default()
    };
    let t = update_comic_title(
        &conn,
        &sid,
        &SetComicTitle {
            romanized: Some(true),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(t.romanized, Some(true));
    assert_eq!(get_comic_title(&conn, &sid).unwrap().title, "First");
}

// ── Chapters ────────────────────────────────────────────────────────────────

fn chapter(version: Option<&str>) -> AddComicChapter {
    AddComicChapter {
        comic_code: Some("AAAAAAAA".to_string()),
        chapter: "1".to_string(),
        version: version.map(str::to_string),
        ..Default::default()
    }
}

#[test]
fn missing_version_is_its_own_identity() {
    let conn = setup_db();
    comic(&conn, "AAAAAAAA");
    let plain = add_comic_chapter(&conn, &chapter(None)).unwrap();
    let v2 = add_comic_chapter(&conn, &chapter(Some("v2"))).unwrap();
    assert_ne!(plain.id, v2.id);

    let err = add_comic_chapter(&conn, &chapter(None)).unwrap_err();
    assert_eq!(err.to_string(), "same comic id + chapter + version already exists");

    let sid = ComicChapterSid {
        comic_code: Some("AAAAAAAA".to_string()),
        chapter: "1".to_string(),
        ..Default::default()
    };
    assert_eq!(get_comic_chapter(&conn, &sid).unwrap().id, plain.id);
    let sid = ComicChapterSid {
        version: Some("v2".to_string()),
        ..sid
    };
    assert_eq!(get_comic_chapter(&conn, &sid).unwrap().id, v2.id);

    let by_lookup = Condition::eq_lookup("id", chapter::sid_to_id(&sid));
    let found: ComicChapter = engine::get(&conn, &chapter::COMIC_CHAPTER, &by_lookup).unwrap();
    assert_eq!(found.id, v2.id);
}
