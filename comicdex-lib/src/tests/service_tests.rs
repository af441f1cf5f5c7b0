use super::*;

use std::time::Duration;

use comicdex_db::ErrorKind;

use crate::error::CacheError;
use crate::permission::{write_key, Grants};

fn store() -> Store {
    Store::new(Pool::memory(4).unwrap())
}

fn admin(store: &Store) -> Catalog {
    let grants = Grants::new([write_key("comicdex")]);
    Catalog::new(store.clone(), Arc::new(grants), "comicdex")
}

fn language(ietf: &str) -> AddLanguage {
    AddLanguage {
        ietf: ietf.to_string(),
        name: ietf.to_uppercase(),
    }
}

fn comic(code: &str) -> AddComic {
    AddComic {
        code: Some(code.to_string()),
        language_ietf: Some("en".to_string()),
        ..Default::default()
    }
}

fn title(code: &str, text: &str) -> AddComicTitle {
    AddComicTitle {
        comic_code: Some(code.to_string()),
        language_ietf: Some("en".to_string()),
        title: text.to_string(),
        ..Default::default()
    }
}

async fn seeded(catalog: &Catalog) {
    let cx = CancelToken::new();
    let data = SeedData {
        languages: vec![language("en")],
        category_types: vec![AddTypeDef {
            code: "genre".to_string(),
            name: "Genre".to_string(),
        }],
        tag_types: vec![AddTypeDef {
            code: "theme".to_string(),
            name: "Theme".to_string(),
        }],
        comic_relation_types: vec![AddTypeDef {
            code: "sequel".to_string(),
            name: "Sequel".to_string(),
        }],
        ..Default::default()
    };
    catalog.seed(&cx, data).await.unwrap();
}

struct BrokenCache;

impl CacheBackend for BrokenCache {
    fn get(&self, _code: &str) -> Result<Option<Comic>, CacheError> {
        Err(CacheError::Backend("offline".to_string()))
    }
    fn put(&self, _comic: Comic) -> Result<(), CacheError> {
        Err(CacheError::Backend("offline".to_string()))
    }
    fn clear(&self) -> Result<(), CacheError> {
        Err(CacheError::Backend("offline".to_string()))
    }
    fn sweep(&self) -> Result<usize, CacheError> {
        Err(CacheError::Backend("offline".to_string()))
    }
}

#[tokio::test]
async fn seeding_skips_present_entries() {
    let catalog = admin(&store());
    let cx = CancelToken::new();
    seeded(&catalog).await;

    let again = SeedData {
        languages: vec![language("en"), language("ja")],
        ..Default::default()
    };
    let report = catalog.seed(&cx, again).await.unwrap();
    assert_eq!(report.languages, 1);
    assert_eq!(report.total(), 1);
    assert_eq!(
        catalog.count_language(&cx, Condition::none()).await.unwrap(),
        2
    );
}

#[tokio::test]
async fn new_comic_has_empty_collections() {
    let catalog = admin(&store());
    let cx = CancelToken::new();
    seeded(&catalog).await;

    let added = catalog.add_comic(&cx, comic("AAAAAAAA")).await.unwrap();
    assert!(added.titles.is_empty());

    let fetched = catalog
        .get_comic_by_code(&cx, "AAAAAAAA".to_string())
        .await
        .unwrap();
    assert_eq!(fetched.language_ietf.as_deref(), Some("en"));
    assert!(fetched.titles.is_empty());
    assert!(fetched.covers.is_empty());
    assert!(fetched.synopses.is_empty());
    assert!(fetched.chapters.is_empty());
    assert!(fetched.externals.is_empty());
    assert!(fetched.categories.is_empty());
    assert!(fetched.tags.is_empty());
    assert!(fetched.relations.is_empty());
}

#[tokio::test]
async fn batch_attaches_dependents_to_their_owners() {
    let catalog = admin(&store());
    let cx = CancelToken::new();
    seeded(&catalog).await;

    for code in ["AAAAAAAA", "BBBBBBBB", "CCCCCCCC"] {
        catalog.add_comic(&cx, comic(code)).await.unwrap();
    }
    catalog
        .batch_add_comic_title(
            &cx,
            vec![title("AAAAAAAA", "First"), title("AAAAAAAA", "Premier")],
        )
        .await
        .unwrap();
    catalog
        .add_comic_title(&cx, title("BBBBBBBB", "Second"))
        .await
        .unwrap();
    catalog
        .add_category(
            &cx,
            AddCategory {
                type_code: Some("genre".to_string()),
                code: "action".to_string(),
                name: "Action".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    catalog
        .add_comic_category(
            &cx,
            AddComicCategory {
                comic_code: Some("CCCCCCCC".to_string()),
                category_type_code: Some("genre".to_string()),
                category_code: Some("action".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    catalog
        .add_tag(
            &cx,
            AddTag {
                type_code: Some("theme".to_string()),
                code: "time-travel".to_string(),
                name: "Time travel".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    catalog
        .add_comic_tag(
            &cx,
            AddComicTag {
                comic_code: Some("AAAAAAAA".to_string()),
                tag_type_code: Some("theme".to_string()),
                tag_code: Some("time-travel".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    catalog
        .add_comic_relation(
            &cx,
            AddComicRelation {
                type_code: Some("sequel".to_string()),
                parent_code: Some("AAAAAAAA".to_string()),
                child_code: Some("BBBBBBBB".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let comics = catalog
        .list_comic(&cx, Condition::none(), None, ListParams::default())
        .await
        .unwrap();
    let codes: Vec<&str> = comics.iter().map(|c| c.code.as_str()).collect();
    assert_eq!(codes, ["AAAAAAAA", "BBBBBBBB", "CCCCCCCC"]);

    let [a, b, c] = [&comics[0], &comics[1], &comics[2]];
    assert_eq!(a.titles.len(), 2);
    assert_eq!(b.titles.len(), 1);
    assert_eq!(b.titles[0].title, "Second");
    assert!(c.titles.is_empty());

    assert!(a.categories.is_empty());
    assert_eq!(c.categories.len(), 1);
    assert_eq!(c.categories[0].code, "action");

    assert_eq!(a.tags.len(), 1);
    assert!(b.tags.is_empty() && c.tags.is_empty());

    assert_eq!(a.relations.len(), 1);
    assert_eq!(a.relations[0].child_code, "BBBBBBBB");
    assert!(b.relations.is_empty());

    let single = catalog
        .get_comic_by_code(&cx, "CCCCCCCC".to_string())
        .await
        .unwrap();
    assert_eq!(single.categories, c.categories);
}

#[tokio::test]
async fn one_failing_collection_fails_the_whole_aggregate() {
    let catalog = admin(&store());
    let cx = CancelToken::new();
    seeded(&catalog).await;
    catalog.add_comic(&cx, comic("AAAAAAAA")).await.unwrap();
    catalog
        .add_comic_title(&cx, title("AAAAAAAA", "First"))
        .await
        .unwrap();
    catalog
        .store()
        .run(&cx, |conn| Ok(conn.execute_batch("DROP TABLE comic_tag")?))
        .await
        .unwrap();

    let err = catalog
        .get_comic_by_code(&cx, "AAAAAAAA".to_string())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Database);

    let err = catalog
        .list_comic(&cx, Condition::none(), None, ListParams::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Database);

    // The comic itself is still there; only the aggregate read failed.
    assert!(catalog
        .exists_comic_by_code(&cx, "AAAAAAAA".to_string())
        .await
        .unwrap());
}

#[tokio::test]
async fn category_aggregate_carries_its_edges() {
    let catalog = admin(&store());
    let cx = CancelToken::new();
    seeded(&catalog).await;

    for code in ["action", "martial-arts"] {
        catalog
            .add_category(
                &cx,
                AddCategory {
                    type_code: Some("genre".to_string()),
                    code: code.to_string(),
                    name: code.to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }
    catalog
        .add_category_relation(
            &cx,
            AddCategoryRelation {
                type_code: Some("genre".to_string()),
                parent_code: Some("action".to_string()),
                child_code: Some("martial-arts".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let action = catalog
        .get_category_by_sid(
            &cx,
            CategorySid {
                type_code: Some("genre".to_string()),
                code: "action".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(action.relations.len(), 1);
    assert_eq!(action.relations[0].child_code, "martial-arts");

    let all = catalog
        .list_category(&cx, Condition::none(), ListParams::default())
        .await
        .unwrap();
    let leaf = all.iter().find(|c| c.code == "martial-arts").unwrap();
    assert!(leaf.relations.is_empty());
}

#[tokio::test]
async fn refused_mutation_writes_nothing() {
    let store = store();
    let cx = CancelToken::new();
    let guest = Catalog::new(store.clone(), Arc::new(Grants::none()), "comicdex");

    let err = guest.add_language(&cx, language("en")).await.unwrap_err();
    assert_eq!(err.to_string(), "missing admin permission to add language");
    assert_eq!(err.kind(), ErrorKind::Generic);

    // Refused before validation: an invalid payload gets the same answer.
    let err = guest.add_language(&cx, language("")).await.unwrap_err();
    assert!(matches!(err, ServiceError::Permission(_)));

    assert_eq!(
        admin(&store)
            .count_language(&cx, Condition::none())
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn caller_errors_pass_through_verbatim() {
    let catalog = admin(&store());
    let cx = CancelToken::new();

    let err = catalog.add_language(&cx, language("")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Generic);
    assert_eq!(err.to_string(), "ietf cannot be empty");

    let err = catalog
        .get_comic_by_code(&cx, "ZZZZZZZZ".to_string())
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "comic not found");

    catalog.add_language(&cx, language("en")).await.unwrap();
    let err = catalog.add_language(&cx, language("en")).await.unwrap_err();
    assert_eq!(err.to_string(), "same ietf already exists");
}

#[tokio::test]
async fn storage_failures_are_opaque() {
    let catalog = admin(&store());
    let cx = CancelToken::new();
    let err = catalog
        .count_language(&cx, Condition::eq("no_such_column", 1))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Database);
    assert_eq!(err.to_string(), "storage problem");
    assert!(std::error::Error::source(&err).is_some());
}

#[tokio::test]
async fn invalid_list_parameters_are_rejected() {
    let catalog = admin(&store());
    let cx = CancelToken::new();
    let err = catalog
        .list_language(&cx, Condition::none(), ListParams::page(0, 10))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Generic);
}

#[tokio::test]
async fn page_limit_is_capped() {
    let catalog = admin(&store());
    let cx = CancelToken::new();
    let many: Vec<AddLanguage> = (0..60).map(|i| language(&format!("x{i}"))).collect();
    assert_eq!(catalog.batch_add_language(&cx, many).await.unwrap(), 60);

    let page = catalog
        .list_language(&cx, Condition::none(), ListParams::page(1, 500))
        .await
        .unwrap();
    assert_eq!(page.len(), 50);

    let default = catalog
        .list_language(&cx, Condition::none(), ListParams::default())
        .await
        .unwrap();
    assert_eq!(default.len(), 10);
}

#[tokio::test]
async fn mutations_clear_cached_aggregates() {
    let store = store();
    let cache = Arc::new(MemoryCache::new(Duration::from_secs(60)));
    let catalog = admin(&store).with_cache(cache.clone());
    let cx = CancelToken::new();
    seeded(&catalog).await;
    catalog.add_comic(&cx, comic("AAAAAAAA")).await.unwrap();

    let first = catalog
        .get_comic_by_code(&cx, "AAAAAAAA".to_string())
        .await
        .unwrap();
    assert!(first.titles.is_empty());
    assert_eq!(cache.len(), 1);

    catalog
        .add_comic_title(&cx, title("AAAAAAAA", "First"))
        .await
        .unwrap();
    assert!(cache.is_empty());

    let second = catalog
        .get_comic_by_code(&cx, "AAAAAAAA".to_string())
        .await
        .unwrap();
    assert_eq!(second.titles.len(), 1);
}

#[tokio::test]
async fn cache_failures_never_fail_the_call() {
    let catalog = admin(&store()).with_cache(Arc::new(BrokenCache));
    let cx = CancelToken::new();
    seeded(&catalog).await;
    catalog.add_comic(&cx, comic("AAAAAAAA")).await.unwrap();

    let fetched = catalog
        .get_comic_by_code(&cx, "AAAAAAAA".to_string())
        .await
        .unwrap();
    assert_eq!(fetched.code, "AAAAAAAA");
}

#[tokio::test]
async fn cancelled_token_refuses_work() {
    let catalog = admin(&store());
    let cx = CancelToken::new();
    cx.cancel();
    let err = catalog.add_language(&cx, language("en")).await.unwrap_err();
    assert!(matches!(err, ServiceError::Cancelled));

    let cx = CancelToken::new();
    assert_eq!(
        catalog.count_language(&cx, Condition::none()).await.unwrap(),
        0
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cancelling_interrupts_a_running_statement() {
    let store = Store::new(Pool::memory(1).unwrap());
    let cx = CancelToken::new();
    let canceller = cx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let endless = store.run(&cx, |conn| {
        let n: i64 = conn.query_row(
            "WITH RECURSIVE c(x) AS (SELECT 1 UNION ALL SELECT x + 1 FROM c) \
             SELECT count(*) FROM c",
            [],
            |row| row.get(0),
        )?;
        Ok(n)
    });
    let err = tokio::time::timeout(Duration::from_secs(10), endless)
        .await
        .unwrap()
        .unwrap_err();
    assert!(matches!(err, ServiceError::Cancelled));

    // The single connection comes back once the interrupted statement ends.
    let fresh = CancelToken::new();
    let one = tokio::time::timeout(
        Duration::from_secs(10),
        store.run(&fresh, |conn| Ok(conn.query_row("SELECT 1", [], |r| r.get::<_, i64>(0))?)),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(one, 1);
}
