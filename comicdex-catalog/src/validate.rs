//! Write payload validation.
//!
//! Every `Add*`/`Set*` payload implements [`Validate`]; invalid payloads are
//! rejected before any statement is built. Messages are user-facing and are
//! surfaced verbatim.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::types::*;

/// A payload or list parameter was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Prepend the owning entity or field to a nested error.
    pub fn prefixed(self, prefix: &str) -> Self {
        Self(format!("{prefix} {}", self.0))
    }
}

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

// ── Limits ──────────────────────────────────────────────────────────────────

pub const LANGUAGE_IETF_MAX: usize = 12;
pub const LANGUAGE_NAME_MAX: usize = 24;
pub const WEBSITE_DOMAIN_MAX: usize = 32;
pub const WEBSITE_NAME_MAX: usize = 48;
pub const TYPE_CODE_MAX: usize = 24;
pub const TYPE_NAME_MAX: usize = 24;
pub const CATEGORY_CODE_MAX: usize = 32;
pub const CATEGORY_NAME_MAX: usize = 32;
pub const TAG_CODE_MAX: usize = 32;
pub const TAG_NAME_MAX: usize = 32;
pub const COMIC_CODE_LENGTH: usize = 8;
pub const COMIC_RID_LENGTH: usize = 4;
pub const COMIC_TITLE_MAX: usize = 255;
pub const COMIC_RELATIVE_URL_MAX: usize = 128;
pub const COMIC_SYNOPSIS_MAX: usize = 2048;
pub const COMIC_SYNOPSIS_VERSION_MAX: usize = 12;
pub const CHAPTER_CHAPTER_MAX: usize = 64;
pub const CHAPTER_VERSION_MAX: usize = 32;
pub const CHAPTER_VOLUME_MAX: usize = 24;

pub const COMIC_SET_NULL_ALLOW: &[&str] = &[
    "published_from",
    "published_to",
    "total_chapter",
    "total_volume",
    "nsfw",
    "nsfl",
    "language_id",
    "additionals",
];
pub const COMIC_TITLE_SET_NULL_ALLOW: &[&str] = &["synonym", "romanized"];
pub const COMIC_COVER_SET_NULL_ALLOW: &[&str] = &["priority"];
pub const COMIC_SYNOPSIS_SET_NULL_ALLOW: &[&str] = &["version", "romanized"];
pub const COMIC_EXTERNAL_SET_NULL_ALLOW: &[&str] = &["relative_url", "official"];
pub const COMIC_CHAPTER_SET_NULL_ALLOW: &[&str] = &["version", "volume"];

static DOMAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?:[0-9\p{L}](?:[0-9\p{L}-]{0,61}[0-9\p{L}])?\.)+",
        r"[0-9\p{L}][0-9\p{L}-]{0,61}[0-9\p{L}]$",
    ))
    .expect("domain pattern should compile")
});

// ── Helpers ─────────────────────────────────────────────────────────────────

fn text(field: &str, value: Option<&str>, max: usize) -> Result<(), ValidationError> {
    let Some(value) = value else { return Ok(()) };
    if value.is_empty() {
        return Err(ValidationError(format!("{field} cannot be empty")));
    }
    if value.chars().count() > max {
        return Err(ValidationError(format!(
            "{field} must be at most {max} characters long"
        )));
    }
    Ok(())
}

fn exact(field: &str, value: Option<&str>, len: usize) -> Result<(), ValidationError> {
    let Some(value) = value else { return Ok(()) };
    if value.is_empty() {
        return Err(ValidationError(format!("{field} cannot be empty")));
    }
    if value.chars().count() != len {
        return Err(ValidationError(format!(
            "{field} must be {len} characters long"
        )));
    }
    Ok(())
}

fn either<A, B>(a: &Option<A>, b: &Option<B>, what: &str) -> Result<(), ValidationError> {
    if a.is_none() && b.is_none() {
        return Err(ValidationError(format!("either {what} must exist")));
    }
    Ok(())
}

fn tristate(field: &str, value: Option<i64>) -> Result<(), ValidationError> {
    match value {
        Some(v) if !(-1..=1).contains(&v) => Err(ValidationError(format!(
            "{field} must be at least -1 and at most 1"
        ))),
        _ => Ok(()),
    }
}

fn set_null(list: &[String], allow: &[&str]) -> Result<(), ValidationError> {
    match list.iter().find(|key| !allow.contains(&key.as_str())) {
        Some(key) => Err(ValidationError(format!("set null {key} is not recognized"))),
        None => Ok(()),
    }
}

/// Validate the natural key of a referenced entity, prefixing any error.
fn nested(prefix: &str, result: Result<(), ValidationError>) -> Result<(), ValidationError> {
    result.map_err(|e| e.prefixed(prefix))
}

fn ietf(value: Option<&str>) -> Result<(), ValidationError> {
    text("ietf", value, LANGUAGE_IETF_MAX)
}

fn domain(value: Option<&str>) -> Result<(), ValidationError> {
    text("domain", value, WEBSITE_DOMAIN_MAX)?;
    if let Some(v) = value {
        if !DOMAIN_RE.is_match(v) {
            return Err(ValidationError::new("domain must be a valid domain name"));
        }
    }
    Ok(())
}

fn comic_code(value: Option<&str>) -> Result<(), ValidationError> {
    exact("code", value, COMIC_CODE_LENGTH)
}

fn rid(value: Option<&str>) -> Result<(), ValidationError> {
    exact("rid", value, COMIC_RID_LENGTH)
}

// ── Language / Website / Types ──────────────────────────────────────────────

impl Validate for AddLanguage {
    fn validate(&self) -> Result<(), ValidationError> {
        SetLanguage {
            ietf: Some(self.ietf.clone()),
            name: Some(self.name.clone()),
        }
        .validate()
    }
}

impl Validate for SetLanguage {
    fn validate(&self) -> Result<(), ValidationError> {
        ietf(self.ietf.as_deref())?;
        text("name", self.name.as_deref(), LANGUAGE_NAME_MAX)
    }
}

impl Validate for AddWebsite {
    fn validate(&self) -> Result<(), ValidationError> {
        domain(Some(&self.domain))?;
        text("name", Some(&self.name), WEBSITE_NAME_MAX)
    }
}

impl Validate for SetWebsite {
    fn validate(&self) -> Result<(), ValidationError> {
        domain(self.domain.as_deref())?;
        text("name", self.name.as_deref(), WEBSITE_NAME_MAX)
    }
}

impl Validate for AddTypeDef {
    fn validate(&self) -> Result<(), ValidationError> {
        text("code", Some(&self.code), TYPE_CODE_MAX)?;
        text("name", Some(&self.name), TYPE_NAME_MAX)
    }
}

impl Validate for SetTypeDef {
    fn validate(&self) -> Result<(), ValidationError> {
        text("code", self.code.as_deref(), TYPE_CODE_MAX)?;
        text("name", self.name.as_deref(), TYPE_NAME_MAX)
    }
}

// ── Category / Tag ──────────────────────────────────────────────────────────

fn type_code(value: Option<&str>) -> Result<(), ValidationError> {
    nested("type", text("code", value, TYPE_CODE_MAX))
}

impl Validate for AddCategory {
    fn validate(&self) -> Result<(), ValidationError> {
        either(&self.type_id, &self.type_code, "category type id or category type code")?;
        type_code(self.type_code.as_deref())?;
        text("code", Some(&self.code), CATEGORY_CODE_MAX)?;
        text("name", Some(&self.name), CATEGORY_NAME_MAX)
    }
}

impl Validate for SetCategory {
    fn validate(&self) -> Result<(), ValidationError> {
        type_code(self.type_code.as_deref())?;
        text("code", self.code.as_deref(), CATEGORY_CODE_MAX)?;
        text("name", self.name.as_deref(), CATEGORY_NAME_MAX)
    }
}

impl Validate for CategorySid {
    fn validate(&self) -> Result<(), ValidationError> {
        either(&self.type_id, &self.type_code, "category type id or category type code")?;
        type_code(self.type_code.as_deref())?;
        text("code", Some(&self.code), CATEGORY_CODE_MAX)
    }
}

fn category_relation_codes(
    type_id: &Option<i64>,
    type_code_value: &Option<String>,
    parent_code: &Option<String>,
    child_code: &Option<String>,
) -> Result<(), ValidationError> {
    if (parent_code.is_some() || child_code.is_some())
        && type_id.is_none()
        && type_code_value.is_none()
    {
        return Err(ValidationError::new(
            "either category type id or category type code must exist",
        ));
    }
    type_code(type_code_value.as_deref())?;
    nested("parent category", text("code", parent_code.as_deref(), CATEGORY_CODE_MAX))?;
    nested("child category", text("code", child_code.as_deref(), CATEGORY_CODE_MAX))
}

impl Validate for AddCategoryRelation {
    fn validate(&self) -> Result<(), ValidationError> {
        either(&self.parent_id, &self.parent_code, "parent category id or parent category code")?;
        either(&self.child_id, &self.child_code, "child category id or child category code")?;
        category_relation_codes(&self.type_id, &self.type_code, &self.parent_code, &self.child_code)
    }
}

impl Validate for SetCategoryRelation {
    fn validate(&self) -> Result<(), ValidationError> {
        category_relation_codes(&self.type_id, &self.type_code, &self.parent_code, &self.child_code)
    }
}

impl Validate for AddTag {
    fn validate(&self) -> Result<(), ValidationError> {
        either(&self.type_id, &self.type_code, "tag type id or tag type code")?;
        type_code(self.type_code.as_deref())?;
        text("code", Some(&self.code), TAG_CODE_MAX)?;
        text("name", Some(&self.name), TAG_NAME_MAX)
    }
}

impl Validate for SetTag {
    fn validate(&self) -> Result<(), ValidationError> {
        type_code(self.type_code.as_deref())?;
        text("code", self.code.as_deref(), TAG_CODE_MAX)?;
        text("name", self.name.as_deref(), TAG_NAME_MAX)
    }
}

impl Validate for TagSid {
    fn validate(&self) -> Result<(), ValidationError> {
        either(&self.type_id, &self.type_code, "tag type id or tag type code")?;
        type_code(self.type_code.as_deref())?;
        text("code", Some(&self.code), TAG_CODE_MAX)
    }
}

// ── Comic ───────────────────────────────────────────────────────────────────

impl Validate for AddComic {
    fn validate(&self) -> Result<(), ValidationError> {
        SetComic {
            code: self.code.clone(),
            language_id: self.language_id,
            language_ietf: self.language_ietf.clone(),
            published_from: self.published_from,
            published_to: self.published_to,
            total_chapter: self.total_chapter,
            total_volume: self.total_volume,
            nsfw: self.nsfw,
            nsfl: self.nsfl,
            additionals: None,
            set_null: Vec::new(),
        }
        .validate()
    }
}

impl Validate for SetComic {
    fn validate(&self) -> Result<(), ValidationError> {
        comic_code(self.code.as_deref())?;
        nested("language", ietf(self.language_ietf.as_deref()))?;
        if let (Some(from), Some(to)) = (self.published_from, self.published_to) {
            if from > to {
                return Err(ValidationError::new("published from is after published to"));
            }
        }
        tristate("nsfw", self.nsfw)?;
        tristate("nsfl", self.nsfl)?;
        set_null(&self.set_null, COMIC_SET_NULL_ALLOW)
    }
}

/// Shared checks for the comic reference every child payload carries.
fn comic_ref(comic_code_value: Option<&str>) -> Result<(), ValidationError> {
    nested("comic", comic_code(comic_code_value))
}

impl Validate for ComicGenericSid {
    fn validate(&self) -> Result<(), ValidationError> {
        either(&self.comic_id, &self.comic_code, "comic id or comic code")?;
        comic_ref(self.comic_code.as_deref())?;
        rid(Some(&self.rid))
    }
}

impl Validate for AddComicTitle {
    fn validate(&self) -> Result<(), ValidationError> {
        either(&self.comic_id, &self.comic_code, "comic id or comic code")?;
        either(&self.language_id, &self.language_ietf, "language id or language ietf")?;
        comic_ref(self.comic_code.as_deref())?;
        rid(self.rid.as_deref())?;
        nested("language", ietf(self.language_ietf.as_deref()))?;
        text("title", Some(&self.title), COMIC_TITLE_MAX)
    }
}

impl Validate for SetComicTitle {
    fn validate(&self) -> Result<(), ValidationError> {
        comic_ref(self.comic_code.as_deref())?;
        rid(self.rid.as_deref())?;
        nested("language", ietf(self.language_ietf.as_deref()))?;
        text("title", self.title.as_deref(), COMIC_TITLE_MAX)?;
        set_null(&self.set_null, COMIC_TITLE_SET_NULL_ALLOW)
    }
}

impl Validate for AddComicCover {
    fn validate(&self) -> Result<(), ValidationError> {
        either(&self.comic_id, &self.comic_code, "comic id or comic code")?;
        either(&self.website_id, &self.website_domain, "website id or website domain")?;
        comic_ref(self.comic_code.as_deref())?;
        rid(self.rid.as_deref())?;
        nested("website", domain(self.website_domain.as_deref()))?;
        text("relative url", Some(&self.relative_url), COMIC_RELATIVE_URL_MAX)
    }
}

impl Validate for SetComicCover {
    fn validate(&self) -> Result<(), ValidationError> {
        comic_ref(self.comic_code.as_deref())?;
        rid(self.rid.as_deref())?;
        nested("website", domain(self.website_domain.as_deref()))?;
        text("relative url", self.relative_url.as_deref(), COMIC_RELATIVE_URL_MAX)?;
        set_null(&self.set_null, COMIC_COVER_SET_NULL_ALLOW)
    }
}

impl Validate for AddComicSynopsis {
    fn validate(&self) -> Result<(), ValidationError> {
        either(&self.comic_id, &self.comic_code, "comic id or comic code")?;
        either(&self.language_id, &self.language_ietf, "language id or language ietf")?;
        comic_ref(self.comic_code.as_deref())?;
        rid(self.rid.as_deref())?;
        nested("language", ietf(self.language_ietf.as_deref()))?;
        text("synopsis", Some(&self.synopsis), COMIC_SYNOPSIS_MAX)?;
        text("version", self.version.as_deref(), COMIC_SYNOPSIS_VERSION_MAX)
    }
}

impl Validate for SetComicSynopsis {
    fn validate(&self) -> Result<(), ValidationError> {
        comic_ref(self.comic_code.as_deref())?;
        rid(self.rid.as_deref())?;
        nested("language", ietf(self.language_ietf.as_deref()))?;
        text("synopsis", self.synopsis.as_deref(), COMIC_SYNOPSIS_MAX)?;
        text("version", self.version.as_deref(), COMIC_SYNOPSIS_VERSION_MAX)?;
        set_null(&self.set_null, COMIC_SYNOPSIS_SET_NULL_ALLOW)
    }
}

impl Validate for AddComicExternal {
    fn validate(&self) -> Result<(), ValidationError> {
        either(&self.comic_id, &self.comic_code, "comic id or comic code")?;
        either(&self.website_id, &self.website_domain, "website id or website domain")?;
        comic_ref(self.comic_code.as_deref())?;
        rid(self.rid.as_deref())?;
        nested("website", domain(self.website_domain.as_deref()))?;
        text("relative url", self.relative_url.as_deref(), COMIC_RELATIVE_URL_MAX)
    }
}

impl Validate for SetComicExternal {
    fn validate(&self) -> Result<(), ValidationError> {
        comic_ref(self.comic_code.as_deref())?;
        rid(self.rid.as_deref())?;
        nested("website", domain(self.website_domain.as_deref()))?;
        text("relative url", self.relative_url.as_deref(), COMIC_RELATIVE_URL_MAX)?;
        set_null(&self.set_null, COMIC_EXTERNAL_SET_NULL_ALLOW)
    }
}

// ── Comic join rows / relations ─────────────────────────────────────────────

fn sid_parts(
    what: &str,
    id: &Option<i64>,
    type_id: &Option<i64>,
    type_code_value: &Option<String>,
    code: &Option<String>,
    code_max: usize,
) -> Result<(), ValidationError> {
    if code.is_some() && id.is_none() && type_id.is_none() && type_code_value.is_none() {
        return Err(ValidationError(format!(
            "either {what} type id or {what} type code must exist"
        )));
    }
    if (type_id.is_some() || type_code_value.is_some()) && code.is_none() && id.is_none() {
        return Err(ValidationError(format!("{what} code must also be provided")));
    }
    nested(what, type_code(type_code_value.as_deref()))?;
    nested(what, text("code", code.as_deref(), code_max))
}

impl Validate for AddComicCategory {
    fn validate(&self) -> Result<(), ValidationError> {
        either(&self.comic_id, &self.comic_code, "comic id or comic code")?;
        either(&self.category_id, &self.category_code, "category id or category code")?;
        comic_ref(self.comic_code.as_deref())?;
        sid_parts(
            "category",
            &self.category_id,
            &self.category_type_id,
            &self.category_type_code,
            &self.category_code,
            CATEGORY_CODE_MAX,
        )
    }
}

impl Validate for SetComicCategory {
    fn validate(&self) -> Result<(), ValidationError> {
        comic_ref(self.comic_code.as_deref())?;
        sid_parts(
            "category",
            &self.category_id,
            &self.category_type_id,
            &self.category_type_code,
            &self.category_code,
            CATEGORY_CODE_MAX,
        )
    }
}

impl Validate for AddComicTag {
    fn validate(&self) -> Result<(), ValidationError> {
        either(&self.comic_id, &self.comic_code, "comic id or comic code")?;
        either(&self.tag_id, &self.tag_code, "tag id or tag code")?;
        comic_ref(self.comic_code.as_deref())?;
        sid_parts(
            "tag",
            &self.tag_id,
            &self.tag_type_id,
            &self.tag_type_code,
            &self.tag_code,
            TAG_CODE_MAX,
        )
    }
}

impl Validate for SetComicTag {
    fn validate(&self) -> Result<(), ValidationError> {
        comic_ref(self.comic_code.as_deref())?;
        sid_parts(
            "tag",
            &self.tag_id,
            &self.tag_type_id,
            &self.tag_type_code,
            &self.tag_code,
            TAG_CODE_MAX,
        )
    }
}

fn comic_relation_parts(
    type_code_value: Option<&str>,
    parent_code: Option<&str>,
    child_code: Option<&str>,
) -> Result<(), ValidationError> {
    nested("type", text("code", type_code_value, TYPE_CODE_MAX))?;
    nested("parent comic", comic_code(parent_code))?;
    nested("child comic", comic_code(child_code))
}

impl Validate for AddComicRelation {
    fn validate(&self) -> Result<(), ValidationError> {
        either(
            &self.type_id,
            &self.type_code,
            "comic relation type id or comic relation type code",
        )?;
        either(&self.parent_id, &self.parent_code, "parent comic id or parent comic code")?;
        either(&self.child_id, &self.child_code, "child comic id or child comic code")?;
        comic_relation_parts(
            self.type_code.as_deref(),
            self.parent_code.as_deref(),
            self.child_code.as_deref(),
        )
    }
}

impl Validate for SetComicRelation {
    fn validate(&self) -> Result<(), ValidationError> {
        comic_relation_parts(
            self.type_code.as_deref(),
            self.parent_code.as_deref(),
            self.child_code.as_deref(),
        )
    }
}

// ── Chapter ─────────────────────────────────────────────────────────────────

impl Validate for AddComicChapter {
    fn validate(&self) -> Result<(), ValidationError> {
        either(&self.comic_id, &self.comic_code, "comic id or comic code")?;
        comic_ref(self.comic_code.as_deref())?;
        text("chapter", Some(&self.chapter), CHAPTER_CHAPTER_MAX)?;
        text("version", self.version.as_deref(), CHAPTER_VERSION_MAX)?;
        text("volume", self.volume.as_deref(), CHAPTER_VOLUME_MAX)
    }
}

impl Validate for SetComicChapter {
    fn validate(&self) -> Result<(), ValidationError> {
        comic_ref(self.comic_code.as_deref())?;
        text("chapter", self.chapter.as_deref(), CHAPTER_CHAPTER_MAX)?;
        text("version", self.version.as_deref(), CHAPTER_VERSION_MAX)?;
        text("volume", self.volume.as_deref(), CHAPTER_VOLUME_MAX)?;
        set_null(&self.set_null, COMIC_CHAPTER_SET_NULL_ALLOW)
    }
}

impl Validate for ComicChapterSid {
    fn validate(&self) -> Result<(), ValidationError> {
        either(&self.comic_id, &self.comic_code, "comic id or comic code")?;
        comic_ref(self.comic_code.as_deref())?;
        text("chapter", Some(&self.chapter), CHAPTER_CHAPTER_MAX)?;
        text("version", self.version.as_deref(), CHAPTER_VERSION_MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_limits_count_characters() {
        assert!(text("name", Some("日本語"), 3).is_ok());
        assert_eq!(
            text("name", Some("abcd"), 3).unwrap_err().0,
            "name must be at most 3 characters long"
        );
        assert_eq!(text("name", Some(""), 3).unwrap_err().0, "name cannot be empty");
        assert!(text("name", None, 3).is_ok());
    }

    #[test]
    fn domain_syntax() {
        assert!(domain(Some("example.com")).is_ok());
        assert!(domain(Some("sub.example.co.jp")).is_ok());
        assert!(domain(Some("localhost")).is_err());
        assert!(domain(Some("-bad.com")).is_err());
    }

    #[test]
    fn tristate_bounds() {
        assert!(tristate("nsfw", Some(-1)).is_ok());
        assert!(tristate("nsfw", Some(1)).is_ok());
        assert!(tristate("nsfw", Some(2)).is_err());
        assert!(tristate("nsfw", None).is_ok());
    }
}
