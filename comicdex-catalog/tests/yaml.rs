use comicdex_catalog::{load_seed, YamlError};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_yaml(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

#[test]
fn load_seed_from_file() {
    let tmp = TempDir::new().unwrap();
    write_yaml(
        tmp.path(),
        "seed.yaml",
        r#"
languages:
  - ietf: en
    name: English
  - ietf: ja
    name: Japanese
websites:
  - domain: example.com
    name: Example
category_types:
  - code: genre
    name: Genre
comic_relation_types:
  - code: sequel
    name: Sequel
"#,
    );

    let seed = load_seed(&tmp.path().join("seed.yaml")).unwrap();
    assert_eq!(seed.languages.len(), 2);
    assert_eq!(seed.languages[1].ietf, "ja");
    assert_eq!(seed.websites[0].domain, "example.com");
    assert_eq!(seed.category_types[0].code, "genre");
    assert!(seed.tag_types.is_empty());
    assert_eq!(seed.comic_relation_types.len(), 1);
}

#[test]
fn load_seed_dir_merges_in_name_order() {
    let tmp = TempDir::new().unwrap();
    write_yaml(tmp.path(), "b.yaml", "languages:\n  - ietf: ja\n    name: Japanese\n");
    write_yaml(tmp.path(), "a.yml", "languages:\n  - ietf: en\n    name: English\n");
    write_yaml(tmp.path(), "notes.txt", "not yaml at all: [");

    let seed = load_seed(tmp.path()).unwrap();
    let codes: Vec<_> = seed.languages.iter().map(|l| l.ietf.as_str()).collect();
    assert_eq!(codes, vec!["en", "ja"]);
}

#[test]
fn empty_document_is_empty_seed() {
    let tmp = TempDir::new().unwrap();
    write_yaml(tmp.path(), "empty.yaml", "{}\n");
    let seed = load_seed(&tmp.path().join("empty.yaml")).unwrap();
    assert!(seed.is_empty());
}

#[test]
fn missing_path_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let err = load_seed(&tmp.path().join("nonexistent.yaml")).unwrap_err();
    assert!(matches!(err, YamlError::NotFound(_)));
}

#[test]
fn malformed_yaml_reports_path() {
    let tmp = TempDir::new().unwrap();
    write_yaml(tmp.path(), "bad.yaml", "languages: [ietf: \n");
    let err = load_seed(&tmp.path().join("bad.yaml")).unwrap_err();
    assert!(matches!(err, YamlError::Parse { .. }));
    assert!(err.to_string().contains("bad.yaml"));
}
