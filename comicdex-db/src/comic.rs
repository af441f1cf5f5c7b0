//! Comics, the aggregate root. This module covers the comic row itself;
//! dependents live in their own modules and are stitched on by the
//! assembler in `comicdex-lib`.

use comicdex_catalog::validate::{COMIC_CODE_LENGTH, COMIC_SET_NULL_ALLOW};
use comicdex_catalog::{AddComic, Additionals, Comic, ListParams, SetComic, Validate};
use rand::distributions::Alphanumeric;
use rand::Rng;
use rusqlite::types::Value;
use rusqlite::{Connection, Row};

use crate::builder::{self, Columns};
use crate::classify::Rule;
use crate::comic_parts::COMIC_EXTERNAL;
use crate::condition::{Condition, SubLookup};
use crate::engine::{self, Record, Table};
use crate::error::DataError;
use crate::language::ietf_to_id;

pub const COMIC: Table = Table {
    name: "comic",
    entity: "comic",
    view: "(SELECT c.*, l.ietf AS language_ietf FROM comic c \
           LEFT JOIN language l ON l.id = c.language_id) comic",
    key: &["id"],
    rules: &[
        Rule::unique("comic_code_key", "same code already exists"),
        Rule::foreign_key("language does not exist"),
    ],
};

impl Record for Comic {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let additionals = match row.get::<_, serde_json::Value>("additionals")? {
            serde_json::Value::Object(map) => map,
            _ => Additionals::new(),
        };
        Ok(Comic {
            id: row.get("id")?,
            code: row.get("code")?,
            language_id: row.get("language_id")?,
            language_ietf: row.get("language_ietf")?,
            published_from: row.get("published_from")?,
            published_to: row.get("published_to")?,
            total_chapter: row.get("total_chapter")?,
            total_volume: row.get("total_volume")?,
            nsfw: row.get("nsfw")?,
            nsfl: row.get("nsfl")?,
            additionals,
            titles: Vec::new(),
            covers: Vec::new(),
            synopses: Vec::new(),
            chapters: Vec::new(),
            externals: Vec::new(),
            categories: Vec::new(),
            tags: Vec::new(),
            relations: Vec::new(),
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

/// Random alphanumeric identifier, used for comic codes and RIDs.
pub fn random_code(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

pub fn code_to_id(code: &str) -> SubLookup {
    SubLookup::id("comic", Condition::eq("code", code.to_string()))
}

/// `comic_id` given directly or by comic code.
pub fn comic_ref(id: Option<i64>, code: Option<&str>) -> Condition {
    Condition::reference("comic_id", id, code.map(code_to_id))
}

pub fn by_code(code: &str) -> Condition {
    Condition::eq("code", code.to_string())
}

fn additionals_value(map: &Additionals) -> Result<Value, DataError> {
    serde_json::to_string(map)
        .map(Value::Text)
        .map_err(|e| DataError::generic(format!("additionals cannot be encoded: {e}")))
}

/// Restrict a comic listing to comics with at least one external link
/// matching `external` (a condition over the external-link view).
fn with_externals(cond: &Condition, external: Option<&Condition>) -> Condition {
    match external {
        Some(ext) => Condition::and(vec![
            cond.clone(),
            Condition::cross("id", "comic_id", COMIC_EXTERNAL.view, ext.clone()),
        ]),
        None => cond.clone(),
    }
}

pub fn add_comic(conn: &Connection, v: &AddComic) -> Result<Comic, DataError> {
    v.validate()?;
    let code = v
        .code
        .clone()
        .unwrap_or_else(|| random_code(COMIC_CODE_LENGTH));
    let mut cols = Columns::new();
    cols.set("code", code)
        .reference("language_id", v.language_id, v.language_ietf.as_deref().map(ietf_to_id))
        .set_opt("published_from", v.published_from.as_ref().map(builder::date))
        .set_opt("published_to", v.published_to.as_ref().map(builder::date))
        .set_opt("total_chapter", v.total_chapter)
        .set_opt("total_volume", v.total_volume)
        .set_opt("nsfw", v.nsfw)
        .set_opt("nsfl", v.nsfl);
    if let Some(map) = &v.additionals {
        cols.set("additionals", additionals_value(map)?);
    }
    engine::add_returning(conn, &COMIC, &cols)
}

pub fn get_comic_by_code(conn: &Connection, code: &str) -> Result<Comic, DataError> {
    engine::get(conn, &COMIC, &by_code(code))
}

pub fn update_comic(conn: &Connection, code: &str, v: &SetComic) -> Result<Comic, DataError> {
    v.validate()?;
    let mut cols = Columns::new();
    cols.set_opt("code", v.code.clone())
        .reference("language_id", v.language_id, v.language_ietf.as_deref().map(ietf_to_id))
        .set_opt("published_from", v.published_from.as_ref().map(builder::date))
        .set_opt("published_to", v.published_to.as_ref().map(builder::date))
        .set_opt("total_chapter", v.total_chapter)
        .set_opt("total_volume", v.total_volume)
        .set_opt("nsfw", v.nsfw)
        .set_opt("nsfl", v.nsfl);
    if let Some(map) = &v.additionals {
        cols.set("additionals", additionals_value(map)?);
    }
    cols.set_null(&v.set_null, COMIC_SET_NULL_ALLOW);
    // Cleared attributes are stored as an empty object.
    if v.set_null.iter().any(|c| c == "additionals") {
        cols.set("additionals", "{}".to_string());
    }
    engine::update_returning(conn, &COMIC, &cols, &by_code(code))
}

pub fn delete_comic(conn: &Connection, code: &str) -> Result<Comic, DataError> {
    engine::delete_returning(conn, &COMIC, &by_code(code))
}

pub fn list_comic(
    conn: &Connection,
    cond: &Condition,
    external: Option<&Condition>,
    params: &ListParams,
) -> Result<Vec<Comic>, DataError> {
    engine::list(
        conn,
        &COMIC,
        &with_externals(cond, external),
        &engine::ordered(params, &["code"]),
    )
}

pub fn count_comic(
    conn: &Connection,
    cond: &Condition,
    external: Option<&Condition>,
) -> Result<i64, DataError> {
    engine::count(conn, &COMIC, &with_externals(cond, external))
}

pub fn exists_comic_by_code(conn: &Connection, code: &str) -> Result<bool, DataError> {
    engine::exists(conn, &COMIC, &by_code(code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_code_is_alphanumeric() {
        let code = random_code(COMIC_CODE_LENGTH);
        assert_eq!(code.len(), 8);
        assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn external_filter_wraps_condition() {
        let cond = with_externals(
            &Condition::eq("nsfw", 0),
            Some(&Condition::eq("website_domain", "example.com".to_string())),
        );
        let mut args = crate::condition::Args::new();
        let sql = cond.build(&mut args);
        assert!(sql.starts_with("nsfw = ?1 AND id IN (SELECT DISTINCT comic_id FROM"));
        assert!(sql.ends_with("WHERE website_domain = ?2)"));
    }
}
