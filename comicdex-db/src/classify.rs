//! Constraint-violation classification.
//!
//! SQLite reports a violated uniqueness constraint by its columns
//! (`UNIQUE constraint failed: comic.code`), a violated expression index by
//! name (`UNIQUE constraint failed: index 'x'`), a named check by name, and a
//! foreign-key violation without any name at all. [`ConstraintViolation`]
//! recovers the constraint name the schema declares so each entity can map
//! it to its own wording through a table of [`Rule`]s.

use std::fmt;

use rusqlite::ErrorCode;
use rusqlite::ffi;

use crate::error::DataError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Unique,
    ForeignKey,
    Check,
    NotNull,
    Other,
}

/// A parsed constraint failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintViolation {
    pub kind: ConstraintKind,
    /// Constraint name following the schema's naming convention; foreign
    /// keys carry none.
    pub name: Option<String>,
    pub message: String,
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} ({name})", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ConstraintViolation {}

impl ConstraintViolation {
    /// Parse a rusqlite error, returning `None` for anything that is not a
    /// constraint failure.
    pub fn from_error(err: &rusqlite::Error) -> Option<Self> {
        let rusqlite::Error::SqliteFailure(e, msg) = err else {
            return None;
        };
        if e.code != ErrorCode::ConstraintViolation {
            return None;
        }
        let message = msg.clone().unwrap_or_default();
        let (kind, name) = match e.extended_code {
            ffi::SQLITE_CONSTRAINT_PRIMARYKEY => (
                ConstraintKind::Unique,
                unique_columns(&message).map(|cols| format!("{}_pkey", table_of(&cols))),
            ),
            ffi::SQLITE_CONSTRAINT_UNIQUE => (ConstraintKind::Unique, unique_name(&message)),
            ffi::SQLITE_CONSTRAINT_FOREIGNKEY => (ConstraintKind::ForeignKey, None),
            ffi::SQLITE_CONSTRAINT_CHECK => (
                ConstraintKind::Check,
                message
                    .strip_prefix("CHECK constraint failed: ")
                    .map(|n| n.trim().to_string()),
            ),
            ffi::SQLITE_CONSTRAINT_NOTNULL => (ConstraintKind::NotNull, None),
            _ => (ConstraintKind::Other, None),
        };
        Some(Self {
            kind,
            name,
            message,
        })
    }
}

/// `t.a, t.b` from a uniqueness message, or `None` for an index-named one.
fn unique_columns(message: &str) -> Option<Vec<String>> {
    let rest = message.strip_prefix("UNIQUE constraint failed: ")?;
    if rest.starts_with("index ") {
        return None;
    }
    Some(rest.split(", ").map(|c| c.trim().to_string()).collect())
}

fn table_of(cols: &[String]) -> &str {
    cols.first()
        .and_then(|c| c.split('.').next())
        .unwrap_or_default()
}

fn unique_name(message: &str) -> Option<String> {
    let rest = message.strip_prefix("UNIQUE constraint failed: ")?;
    if let Some(index) = rest.strip_prefix("index ") {
        return Some(index.trim_matches('\'').to_string());
    }
    let cols = unique_columns(message)?;
    let mut name = table_of(&cols).to_string();
    for col in &cols {
        name.push('_');
        name.push_str(col.rsplit('.').next().unwrap_or(col));
    }
    name.push_str("_key");
    Some(name)
}

/// One entity-specific mapping from a constraint to a user-facing message.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub kind: ConstraintKind,
    /// `None` matches any violation of `kind` (used for foreign keys).
    pub name: Option<&'static str>,
    pub message: &'static str,
}

impl Rule {
    pub const fn unique(name: &'static str, message: &'static str) -> Self {
        Self {
            kind: ConstraintKind::Unique,
            name: Some(name),
            message,
        }
    }

    pub const fn foreign_key(message: &'static str) -> Self {
        Self {
            kind: ConstraintKind::ForeignKey,
            name: None,
            message,
        }
    }

    pub const fn check(name: &'static str, message: &'static str) -> Self {
        Self {
            kind: ConstraintKind::Check,
            name: Some(name),
            message,
        }
    }

    fn matches(&self, v: &ConstraintViolation) -> bool {
        self.kind == v.kind
            && match self.name {
                Some(name) => v.name.as_deref() == Some(name),
                None => true,
            }
    }
}

/// Map a storage error to a domain error using an entity's rules.
///
/// Matched rules become `Generic`; unmatched check violations are wrapped as
/// a generic validation failure with the cause preserved; interrupted
/// statements become `Cancelled`; everything else stays `Database`.
pub fn classify(err: rusqlite::Error, rules: &[Rule]) -> DataError {
    if let rusqlite::Error::SqliteFailure(e, _) = &err {
        if e.code == ErrorCode::OperationInterrupted {
            return DataError::Cancelled;
        }
    }
    let Some(violation) = ConstraintViolation::from_error(&err) else {
        return DataError::Database(err);
    };
    if let Some(rule) = rules.iter().find(|r| r.matches(&violation)) {
        return DataError::Generic(rule.message.to_string());
    }
    if violation.kind == ConstraintKind::Check {
        return DataError::Wrapped {
            message: "database validation failed".to_string(),
            source: Box::new(violation),
        };
    }
    DataError::Database(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(extended: i32, msg: &str) -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(ffi::Error::new(extended), Some(msg.to_string()))
    }

    #[test]
    fn unique_columns_become_key_name() {
        let v = ConstraintViolation::from_error(&failure(
            ffi::SQLITE_CONSTRAINT_UNIQUE,
            "UNIQUE constraint failed: category.type_id, category.code",
        ))
        .unwrap();
        assert_eq!(v.kind, ConstraintKind::Unique);
        assert_eq!(v.name.as_deref(), Some("category_type_id_code_key"));
    }

    #[test]
    fn primary_key_becomes_pkey() {
        let v = ConstraintViolation::from_error(&failure(
            ffi::SQLITE_CONSTRAINT_PRIMARYKEY,
            "UNIQUE constraint failed: comic_relation.type_id, comic_relation.parent_id, comic_relation.child_id",
        ))
        .unwrap();
        assert_eq!(v.name.as_deref(), Some("comic_relation_pkey"));
    }

    #[test]
    fn expression_index_keeps_its_name() {
        let v = ConstraintViolation::from_error(&failure(
            ffi::SQLITE_CONSTRAINT_UNIQUE,
            "UNIQUE constraint failed: index 'comic_chapter_comic_id_chapter_version_key'",
        ))
        .unwrap();
        assert_eq!(
            v.name.as_deref(),
            Some("comic_chapter_comic_id_chapter_version_key")
        );
    }

    #[test]
    fn rules_and_fallbacks() {
        let rules = [
            Rule::unique("language_ietf_key", "same ietf already exists"),
            Rule::check("x_check", "x is wrong"),
        ];
        let err = classify(
            failure(ffi::SQLITE_CONSTRAINT_UNIQUE, "UNIQUE constraint failed: language.ietf"),
            &rules,
        );
        assert_eq!(err.to_string(), "same ietf already exists");

        let err = classify(
            failure(ffi::SQLITE_CONSTRAINT_CHECK, "CHECK constraint failed: other_check"),
            &rules,
        );
        assert!(matches!(err, DataError::Wrapped { .. }));
        assert_eq!(err.to_string(), "database validation failed");

        let err = classify(
            failure(ffi::SQLITE_CONSTRAINT_FOREIGNKEY, "FOREIGN KEY constraint failed"),
            &rules,
        );
        assert!(matches!(err, DataError::Database(_)));

        let err = classify(failure(ffi::SQLITE_INTERRUPT, "interrupted"), &rules);
        assert!(matches!(err, DataError::Cancelled));
    }
}
