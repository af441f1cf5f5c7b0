//! Data model types for the comic catalog.
//!
//! Entities mirror the persistent rows (plus the joined natural-key columns
//! each view exposes). Write payloads come in pairs: `Add*` for creation and
//! `Set*` for partial updates, where `None` means "leave untouched" and the
//! optional `set_null` list names columns to clear.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Free-form attribute map stored alongside a comic.
pub type Additionals = serde_json::Map<String, serde_json::Value>;

// ── Language / Website ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Language {
    pub id: i64,
    pub ietf: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddLanguage {
    pub ietf: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetLanguage {
    pub ietf: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Website {
    pub id: i64,
    pub domain: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddWebsite {
    pub domain: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetWebsite {
    pub domain: Option<String>,
    pub name: Option<String>,
}

// ── Type definitions ────────────────────────────────────────────────────────

/// A code + name pair classifying categories, tags or comic relations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDef {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

pub type CategoryType = TypeDef;
pub type TagType = TypeDef;
pub type ComicRelationType = TypeDef;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddTypeDef {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetTypeDef {
    pub code: Option<String>,
    pub name: Option<String>,
}

// ── Category / Tag ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub type_id: i64,
    pub type_code: String,
    pub code: String,
    pub name: String,
    pub relations: Vec<CategoryRelation>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddCategory {
    pub type_id: Option<i64>,
    pub type_code: Option<String>,
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetCategory {
    pub type_id: Option<i64>,
    pub type_code: Option<String>,
    pub code: Option<String>,
    pub name: Option<String>,
}

/// Secondary identifier of a category: its type plus its code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategorySid {
    pub type_id: Option<i64>,
    pub type_code: Option<String>,
    pub code: String,
}

/// Directed edge from a parent category to a child category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRelation {
    #[serde(skip)]
    pub parent_id: i64,
    #[serde(rename = "categoryID")]
    pub child_id: i64,
    #[serde(rename = "categoryCode")]
    pub child_code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Parent and child codes are resolved inside the category type given by
/// `type_id` or `type_code`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddCategoryRelation {
    pub type_id: Option<i64>,
    pub type_code: Option<String>,
    pub parent_id: Option<i64>,
    pub parent_code: Option<String>,
    pub child_id: Option<i64>,
    pub child_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetCategoryRelation {
    pub type_id: Option<i64>,
    pub type_code: Option<String>,
    pub parent_id: Option<i64>,
    pub parent_code: Option<String>,
    pub child_id: Option<i64>,
    pub child_code: Option<String>,
}

/// Identifies one edge: the same fields as the add payload.
pub type CategoryRelationSid = AddCategoryRelation;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: i64,
    pub type_id: i64,
    pub type_code: String,
    pub code: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddTag {
    pub type_id: Option<i64>,
    pub type_code: Option<String>,
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetTag {
    pub type_id: Option<i64>,
    pub type_code: Option<String>,
    pub code: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagSid {
    pub type_id: Option<i64>,
    pub type_code: Option<String>,
    pub code: String,
}

// ── Comic ───────────────────────────────────────────────────────────────────

/// The aggregate root. Collections are always present; a comic without
/// dependents carries empty vectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comic {
    pub id: i64,
    pub code: String,
    pub language_id: Option<i64>,
    #[serde(rename = "languageIETF")]
    pub language_ietf: Option<String>,
    pub published_from: Option<NaiveDate>,
    pub published_to: Option<NaiveDate>,
    pub total_chapter: Option<i64>,
    pub total_volume: Option<i64>,
    pub nsfw: Option<i64>,
    pub nsfl: Option<i64>,
    pub additionals: Additionals,
    pub titles: Vec<ComicTitle>,
    pub covers: Vec<ComicCover>,
    pub synopses: Vec<ComicSynopsis>,
    pub chapters: Vec<ComicChapter>,
    pub externals: Vec<ComicExternal>,
    pub categories: Vec<Category>,
    pub tags: Vec<Tag>,
    pub relations: Vec<ComicRelation>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// When `code` is omitted a random alphanumeric code is generated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddComic {
    pub code: Option<String>,
    pub language_id: Option<i64>,
    pub language_ietf: Option<String>,
    pub published_from: Option<NaiveDate>,
    pub published_to: Option<NaiveDate>,
    pub total_chapter: Option<i64>,
    pub total_volume: Option<i64>,
    pub nsfw: Option<i64>,
    pub nsfl: Option<i64>,
    pub additionals: Option<Additionals>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetComic {
    pub code: Option<String>,
    pub language_id: Option<i64>,
    pub language_ietf: Option<String>,
    pub published_from: Option<NaiveDate>,
    pub published_to: Option<NaiveDate>,
    pub total_chapter: Option<i64>,
    pub total_volume: Option<i64>,
    pub nsfw: Option<i64>,
    pub nsfl: Option<i64>,
    pub additionals: Option<Additionals>,
    #[serde(default)]
    pub set_null: Vec<String>,
}

/// Identifies a child row of a comic by the comic and the row's RID.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComicGenericSid {
    pub comic_id: Option<i64>,
    pub comic_code: Option<String>,
    pub rid: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComicTitle {
    pub id: i64,
    #[serde(skip)]
    pub comic_id: i64,
    pub rid: String,
    #[serde(rename = "languageID")]
    pub language_id: i64,
    #[serde(rename = "languageIETF")]
    pub language_ietf: String,
    pub title: String,
    pub synonym: Option<bool>,
    pub romanized: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddComicTitle {
    pub comic_id: Option<i64>,
    pub comic_code: Option<String>,
    pub rid: Option<String>,
    pub language_id: Option<i64>,
    pub language_ietf: Option<String>,
    pub title: String,
    pub synonym: Option<bool>,
    pub romanized: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetComicTitle {
    pub comic_id: Option<i64>,
    pub comic_code: Option<String>,
    pub rid: Option<String>,
    pub language_id: Option<i64>,
    pub language_ietf: Option<String>,
    pub title: Option<String>,
    pub synonym: Option<bool>,
    pub romanized: Option<bool>,
    #[serde(default)]
    pub set_null: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComicCover {
    pub id: i64,
    #[serde(skip)]
    pub comic_id: i64,
    pub rid: String,
    #[serde(rename = "websiteID")]
    pub website_id: i64,
    pub website_domain: String,
    #[serde(rename = "relativeURL")]
    pub relative_url: String,
    pub priority: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddComicCover {
    pub comic_id: Option<i64>,
    pub comic_code: Option<String>,
    pub rid: Option<String>,
    pub website_id: Option<i64>,
    pub website_domain: Option<String>,
    pub relative_url: String,
    pub priority: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetComicCover {
    pub comic_id: Option<i64>,
    pub comic_code: Option<String>,
    pub rid: Option<String>,
    pub website_id: Option<i64>,
    pub website_domain: Option<String>,
    pub relative_url: Option<String>,
    pub priority: Option<i64>,
    #[serde(default)]
    pub set_null: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComicSynopsis {
    pub id: i64,
    #[serde(skip)]
    pub comic_id: i64,
    pub rid: String,
    #[serde(rename = "languageID")]
    pub language_id: i64,
    #[serde(rename = "languageIETF")]
    pub language_ietf: String,
    pub synopsis: String,
    pub version: Option<String>,
    pub romanized: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddComicSynopsis {
    pub comic_id: Option<i64>,
    pub comic_code: Option<String>,
    pub rid: Option<String>,
    pub language_id: Option<i64>,
    pub language_ietf: Option<String>,
    pub synopsis: String,
    pub version: Option<String>,
    pub romanized: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetComicSynopsis {
    pub comic_id: Option<i64>,
    pub comic_code: Option<String>,
    pub rid: Option<String>,
    pub language_id: Option<i64>,
    pub language_ietf: Option<String>,
    pub synopsis: Option<String>,
    pub version: Option<String>,
    pub romanized: Option<bool>,
    #[serde(default)]
    pub set_null: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComicExternal {
    pub id: i64,
    #[serde(skip)]
    pub comic_id: i64,
    pub rid: String,
    #[serde(rename = "websiteID")]
    pub website_id: i64,
    pub website_domain: String,
    #[serde(rename = "relativeURL")]
    pub relative_url: Option<String>,
    pub official: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddComicExternal {
    pub comic_id: Option<i64>,
    pub comic_code: Option<String>,
    pub rid: Option<String>,
    pub website_id: Option<i64>,
    pub website_domain: Option<String>,
    pub relative_url: Option<String>,
    pub official: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetComicExternal {
    pub comic_id: Option<i64>,
    pub comic_code: Option<String>,
    pub rid: Option<String>,
    pub website_id: Option<i64>,
    pub website_domain: Option<String>,
    pub relative_url: Option<String>,
    pub official: Option<bool>,
    #[serde(default)]
    pub set_null: Vec<String>,
}

// ── Comic join rows ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComicCategory {
    #[serde(skip)]
    pub comic_id: i64,
    #[serde(rename = "categoryID")]
    pub category_id: i64,
    #[serde(rename = "categoryTypeID")]
    pub category_type_id: i64,
    pub category_code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddComicCategory {
    pub comic_id: Option<i64>,
    pub comic_code: Option<String>,
    pub category_id: Option<i64>,
    pub category_type_id: Option<i64>,
    pub category_type_code: Option<String>,
    pub category_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetComicCategory {
    pub comic_id: Option<i64>,
    pub comic_code: Option<String>,
    pub category_id: Option<i64>,
    pub category_type_id: Option<i64>,
    pub category_type_code: Option<String>,
    pub category_code: Option<String>,
}

pub type ComicCategorySid = AddComicCategory;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComicTag {
    #[serde(skip)]
    pub comic_id: i64,
    #[serde(rename = "tagID")]
    pub tag_id: i64,
    #[serde(rename = "tagTypeID")]
    pub tag_type_id: i64,
    pub tag_code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddComicTag {
    pub comic_id: Option<i64>,
    pub comic_code: Option<String>,
    pub tag_id: Option<i64>,
    pub tag_type_id: Option<i64>,
    pub tag_type_code: Option<String>,
    pub tag_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetComicTag {
    pub comic_id: Option<i64>,
    pub comic_code: Option<String>,
    pub tag_id: Option<i64>,
    pub tag_type_id: Option<i64>,
    pub tag_type_code: Option<String>,
    pub tag_code: Option<String>,
}

pub type ComicTagSid = AddComicTag;

/// Directed edge between two comics, scoped by a relation type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComicRelation {
    #[serde(rename = "typeID")]
    pub type_id: i64,
    #[serde(skip)]
    pub parent_id: i64,
    #[serde(rename = "comicID")]
    pub child_id: i64,
    #[serde(rename = "comicCode")]
    pub child_code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddComicRelation {
    pub type_id: Option<i64>,
    pub type_code: Option<String>,
    pub parent_id: Option<i64>,
    pub parent_code: Option<String>,
    pub child_id: Option<i64>,
    pub child_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetComicRelation {
    pub type_id: Option<i64>,
    pub type_code: Option<String>,
    pub parent_id: Option<i64>,
    pub parent_code: Option<String>,
    pub child_id: Option<i64>,
    pub child_code: Option<String>,
}

pub type ComicRelationSid = AddComicRelation;

// ── Chapter ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComicChapter {
    pub id: i64,
    #[serde(skip)]
    pub comic_id: i64,
    pub chapter: String,
    pub version: Option<String>,
    pub volume: Option<String>,
    pub released_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// `released_at` defaults to the insertion time when omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddComicChapter {
    pub comic_id: Option<i64>,
    pub comic_code: Option<String>,
    pub chapter: String,
    pub version: Option<String>,
    pub volume: Option<String>,
    pub released_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetComicChapter {
    pub comic_id: Option<i64>,
    pub comic_code: Option<String>,
    pub chapter: Option<String>,
    pub version: Option<String>,
    pub volume: Option<String>,
    pub released_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub set_null: Vec<String>,
}

/// A chapter is identified by comic, chapter label and version (or its absence).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComicChapterSid {
    pub comic_id: Option<i64>,
    pub comic_code: Option<String>,
    pub chapter: String,
    pub version: Option<String>,
}
