//! List parameters: ordering, pagination, and per-entity list policies.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::validate::ValidationError;

/// Columns every table can be ordered by.
pub const GENERIC_ORDER_BY_ALLOW: &[&str] = &["id", "created_at", "updated_at"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sort {
    Asc,
    Desc,
}

impl FromStr for Sort {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "a" | "asc" | "ascend" | "ascending" => Ok(Sort::Asc),
            "d" | "desc" | "descend" | "descending" => Ok(Sort::Desc),
            _ => Err(ValidationError::new(
                "order by sort must be ascending or descending",
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Nulls {
    First,
    Last,
}

impl FromStr for Nulls {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "f" | "first" => Ok(Nulls::First),
            "l" | "last" => Ok(Nulls::Last),
            _ => Err(ValidationError::new("order by nulls must be first or last")),
        }
    }
}

/// One ORDER BY term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: String,
    pub sort: Option<Sort>,
    pub nulls: Option<Nulls>,
}

impl OrderBy {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            sort: None,
            nulls: None,
        }
    }

    pub fn desc(mut self) -> Self {
        self.sort = Some(Sort::Desc);
        self
    }

    pub fn nulls(mut self, nulls: Nulls) -> Self {
        self.nulls = Some(nulls);
        self
    }
}

/// Parses `field[:sort[:nulls]]`, e.g. `published_from:desc:last`.
impl FromStr for OrderBy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':');
        let field = parts.next().unwrap_or_default().trim();
        let sort = match parts.next().filter(|p| !p.is_empty()) {
            Some(p) => Some(p.parse()?),
            None => None,
        };
        let nulls = match parts.next().filter(|p| !p.is_empty()) {
            Some(p) => Some(p.parse()?),
            None => None,
        };
        Ok(Self {
            field: field.to_string(),
            sort,
            nulls,
        })
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.field)?;
        match self.sort {
            Some(Sort::Asc) => write!(f, " ASC")?,
            Some(Sort::Desc) => write!(f, " DESC")?,
            None => {}
        }
        match self.nulls {
            Some(Nulls::First) => write!(f, " NULLS FIRST"),
            Some(Nulls::Last) => write!(f, " NULLS LAST"),
            None => Ok(()),
        }
    }
}

/// Page numbers start at 1. A limit of 0 means "no limit".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Pagination {
    pub fn new(page: u32, limit: u32) -> Self {
        Self { page, limit }
    }

    /// Every row, used by aggregate fetches.
    pub fn all() -> Self {
        Self { page: 0, limit: 0 }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.page < 1 {
            return Err(ValidationError::new("pagination page must be at least 1"));
        }
        if self.limit < 1 {
            return Err(ValidationError::new("pagination limit must be at least 1"));
        }
        Ok(())
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.limit) * u64::from(self.page.saturating_sub(1))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub order_bys: Vec<OrderBy>,
    pub pagination: Option<Pagination>,
}

impl ListParams {
    pub fn page(page: u32, limit: u32) -> Self {
        Self {
            order_bys: Vec::new(),
            pagination: Some(Pagination::new(page, limit)),
        }
    }

    pub fn order_by(mut self, ob: OrderBy) -> Self {
        self.order_bys.push(ob);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for (i, ob) in self.order_bys.iter().enumerate() {
            if ob.field.is_empty() {
                return Err(ValidationError::new(
                    "order by field must exist and cannot be empty",
                )
                .prefixed(&ordinal(i + 1)));
            }
        }
        if let Some(p) = &self.pagination {
            p.validate()?;
        }
        Ok(())
    }
}

/// Parse a list of `field[:sort[:nulls]]` terms, naming the offending one on error.
pub fn parse_order_bys<S: AsRef<str>>(terms: &[S]) -> Result<Vec<OrderBy>, ValidationError> {
    terms
        .iter()
        .enumerate()
        .map(|(i, t)| t.as_ref().parse().map_err(|e: ValidationError| e.prefixed(&ordinal(i + 1))))
        .collect()
}

/// English ordinal for a 1-based position: 1st, 2nd, 3rd, 4th, 11th, 21st...
pub fn ordinal(n: usize) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

// ── List policies ───────────────────────────────────────────────────────────

/// How an entity's list endpoint sanitizes caller-supplied parameters.
#[derive(Debug, Clone, Copy)]
pub struct ListPolicy {
    pub default_limit: u32,
    pub max_limit: u32,
    pub max_order_bys: usize,
    /// Entity-specific sortable columns; the generic ones are always allowed.
    pub order_by_allow: &'static [&'static str],
}

impl ListPolicy {
    pub fn allows(&self, field: &str) -> bool {
        self.order_by_allow.contains(&field) || GENERIC_ORDER_BY_ALLOW.contains(&field)
    }

    /// Drop disallowed order-bys, truncate to the maximum count, and clamp
    /// or default the pagination.
    pub fn sanitize(&self, mut params: ListParams) -> ListParams {
        params.order_bys.retain(|ob| self.allows(&ob.field));
        params.order_bys.truncate(self.max_order_bys);
        let pagination = match params.pagination {
            Some(mut p) => {
                p.limit = p.limit.min(self.max_limit);
                p
            }
            None => Pagination::new(1, self.default_limit),
        };
        params.pagination = Some(pagination);
        params
    }
}

const fn policy(
    max_limit: u32,
    max_order_bys: usize,
    allow: &'static [&'static str],
) -> ListPolicy {
    ListPolicy {
        default_limit: 10,
        max_limit,
        max_order_bys,
        order_by_allow: allow,
    }
}

pub const LANGUAGE_LIST: ListPolicy = policy(50, 3, &["ietf", "name"]);
pub const WEBSITE_LIST: ListPolicy = policy(50, 3, &["domain", "name"]);
pub const TYPE_DEF_LIST: ListPolicy = policy(50, 3, &["code", "name"]);
pub const CATEGORY_LIST: ListPolicy = policy(50, 3, &["code", "name"]);
pub const CATEGORY_RELATION_LIST: ListPolicy = policy(50, 3, &["child_id"]);
pub const TAG_LIST: ListPolicy = policy(50, 3, &["code", "name"]);
pub const COMIC_LIST: ListPolicy = policy(
    30,
    5,
    &[
        "code",
        "published_from",
        "published_to",
        "total_chapter",
        "total_volume",
        "nsfw",
        "nsfl",
        "language_id",
    ],
);
pub const COMIC_TITLE_LIST: ListPolicy =
    policy(50, 3, &["rid", "language_id", "title", "synonym", "romanized"]);
pub const COMIC_COVER_LIST: ListPolicy =
    policy(50, 3, &["rid", "website_id", "relative_url", "priority"]);
pub const COMIC_SYNOPSIS_LIST: ListPolicy =
    policy(50, 3, &["rid", "language_id", "synopsis", "version", "romanized"]);
pub const COMIC_EXTERNAL_LIST: ListPolicy = policy(
    50,
    3,
    &["rid", "website_id", "website_domain", "relative_url", "official"],
);
pub const COMIC_CATEGORY_LIST: ListPolicy = policy(50, 3, &["category_id"]);
pub const COMIC_TAG_LIST: ListPolicy = policy(50, 3, &["tag_id"]);
pub const COMIC_RELATION_LIST: ListPolicy = policy(50, 3, &["type_id", "child_id"]);
pub const COMIC_CHAPTER_LIST: ListPolicy = policy(
    50,
    5,
    &["comic_id", "chapter", "version", "volume", "released_at"],
);
