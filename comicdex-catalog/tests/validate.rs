use chrono::NaiveDate;
use comicdex_catalog::params::{ordinal, parse_order_bys, COMIC_LIST, LANGUAGE_LIST};
use comicdex_catalog::*;

fn err<V: Validate>(v: &V) -> String {
    v.validate().unwrap_err().to_string()
}

#[test]
fn language_payloads() {
    let ok = AddLanguage {
        ietf: "en".into(),
        name: "English".into(),
    };
    assert!(ok.validate().is_ok());

    let long = AddLanguage {
        ietf: "x".repeat(13),
        name: "Long".into(),
    };
    assert_eq!(err(&long), "ietf must be at most 12 characters long");

    let empty = SetLanguage {
        name: Some(String::new()),
        ..Default::default()
    };
    assert_eq!(err(&empty), "name cannot be empty");
    assert!(SetLanguage::default().validate().is_ok());
}

#[test]
fn category_requires_a_type() {
    let add = AddCategory {
        code: "action".into(),
        name: "Action".into(),
        ..Default::default()
    };
    assert_eq!(
        err(&add),
        "either category type id or category type code must exist"
    );

    let bad_type = AddCategory {
        type_code: Some(String::new()),
        code: "action".into(),
        name: "Action".into(),
        ..Default::default()
    };
    assert_eq!(err(&bad_type), "type code cannot be empty");
}

#[test]
fn comic_code_and_dates() {
    let short = AddComic {
        code: Some("abc".into()),
        ..Default::default()
    };
    assert_eq!(err(&short), "code must be 8 characters long");

    let reversed = AddComic {
        published_from: NaiveDate::from_ymd_opt(2020, 5, 1),
        published_to: NaiveDate::from_ymd_opt(2019, 1, 1),
        ..Default::default()
    };
    assert_eq!(err(&reversed), "published from is after published to");

    let nsfw = SetComic {
        nsfw: Some(3),
        ..Default::default()
    };
    assert_eq!(err(&nsfw), "nsfw must be at least -1 and at most 1");

    let set_null = SetComic {
        set_null: vec!["code".into()],
        ..Default::default()
    };
    assert_eq!(err(&set_null), "set null code is not recognized");
}

#[test]
fn child_payloads_prefix_nested_keys() {
    let title = AddComicTitle {
        comic_code: Some("short".into()),
        language_ietf: Some("en".into()),
        title: "Title".into(),
        ..Default::default()
    };
    assert_eq!(err(&title), "comic code must be 8 characters long");

    let no_language = AddComicTitle {
        comic_id: Some(1),
        title: "Title".into(),
        ..Default::default()
    };
    assert_eq!(
        err(&no_language),
        "either language id or language ietf must exist"
    );

    let rid = SetComicCover {
        rid: Some("abcde".into()),
        ..Default::default()
    };
    assert_eq!(err(&rid), "rid must be 4 characters long");
}

#[test]
fn comic_category_needs_type_with_code() {
    let missing_type = AddComicCategory {
        comic_id: Some(1),
        category_code: Some("action".into()),
        ..Default::default()
    };
    assert_eq!(
        err(&missing_type),
        "either category type id or category type code must exist"
    );

    let missing_code = SetComicCategory {
        category_type_id: Some(1),
        ..Default::default()
    };
    assert_eq!(err(&missing_code), "category code must also be provided");
}

#[test]
fn relation_payloads() {
    let add = AddComicRelation {
        type_code: Some("sequel".into()),
        parent_code: Some("AAAAAAAA".into()),
        ..Default::default()
    };
    assert_eq!(
        err(&add),
        "either child comic id or child comic code must exist"
    );

    let cat = AddCategoryRelation {
        parent_code: Some("a".into()),
        child_code: Some("b".into()),
        ..Default::default()
    };
    assert_eq!(
        err(&cat),
        "either category type id or category type code must exist"
    );
}

#[test]
fn order_by_parsing() {
    let obs = parse_order_bys(&["code", "published_from:DESC:l", "name:a:first"]).unwrap();
    assert_eq!(obs[0], OrderBy::new("code"));
    assert_eq!(obs[1], OrderBy::new("published_from").desc().nulls(Nulls::Last));
    assert_eq!(obs[2].sort, Some(Sort::Asc));
    assert_eq!(obs[1].to_string(), "published_from DESC NULLS LAST");

    let bad = parse_order_bys(&["code", "name:sideways"]).unwrap_err();
    assert_eq!(
        bad.to_string(),
        "2nd order by sort must be ascending or descending"
    );
    let bad = parse_order_bys(&["code:asc:middle"]).unwrap_err();
    assert_eq!(bad.to_string(), "1st order by nulls must be first or last");
}

#[test]
fn list_params_validation() {
    let params = ListParams::page(0, 10);
    assert_eq!(
        params.validate().unwrap_err().to_string(),
        "pagination page must be at least 1"
    );
    let params = ListParams::page(1, 0);
    assert_eq!(
        params.validate().unwrap_err().to_string(),
        "pagination limit must be at least 1"
    );
    let params = ListParams::default().order_by(OrderBy::new("code")).order_by(OrderBy::new(""));
    assert_eq!(
        params.validate().unwrap_err().to_string(),
        "2nd order by field must exist and cannot be empty"
    );
}

#[test]
fn policy_sanitizes_params() {
    let params = ListParams::page(2, 500)
        .order_by(OrderBy::new("secret"))
        .order_by(OrderBy::new("name"))
        .order_by(OrderBy::new("id"))
        .order_by(OrderBy::new("ietf"))
        .order_by(OrderBy::new("created_at"));
    let clean = LANGUAGE_LIST.sanitize(params);
    let fields: Vec<_> = clean.order_bys.iter().map(|o| o.field.as_str()).collect();
    assert_eq!(fields, vec!["name", "id", "ietf"]);
    assert_eq!(clean.pagination, Some(Pagination::new(2, 50)));

    let defaulted = COMIC_LIST.sanitize(ListParams::default());
    assert_eq!(defaulted.pagination, Some(Pagination::new(1, 10)));
    assert_eq!(
        COMIC_LIST.sanitize(ListParams::page(1, 99)).pagination,
        Some(Pagination::new(1, 30))
    );
}

#[test]
fn ordinals() {
    assert_eq!(ordinal(1), "1st");
    assert_eq!(ordinal(2), "2nd");
    assert_eq!(ordinal(3), "3rd");
    assert_eq!(ordinal(4), "4th");
    assert_eq!(ordinal(11), "11th");
    assert_eq!(ordinal(12), "12th");
    assert_eq!(ordinal(22), "22nd");
}
