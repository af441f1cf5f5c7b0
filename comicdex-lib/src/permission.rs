//! Capability checks consulted before every mutation.

use std::collections::HashSet;

use crate::error::ServiceError;

/// Answers whether the caller holds a scoped capability key such as
/// `comicdex.write`.
pub trait Permissions: Send + Sync {
    fn has_permission(&self, key: &str) -> bool;
}

/// A fixed set of granted keys.
#[derive(Debug, Clone, Default)]
pub struct Grants {
    keys: HashSet<String>,
}

impl Grants {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Nothing granted; every mutation is refused.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn grant(&mut self, key: impl Into<String>) {
        self.keys.insert(key.into());
    }
}

impl Permissions for Grants {
    fn has_permission(&self, key: &str) -> bool {
        self.keys.contains(key)
    }
}

pub fn write_key(prefix: &str) -> String {
    format!("{prefix}.write")
}

/// Refuse `verb` on `entity` unless the write capability under `prefix` is held.
pub fn require_write(
    perms: &dyn Permissions,
    prefix: &str,
    verb: &str,
    entity: &str,
) -> Result<(), ServiceError> {
    if perms.has_permission(&write_key(prefix)) {
        return Ok(());
    }
    log::debug!("refused {verb} {entity}: missing {}", write_key(prefix));
    Err(ServiceError::permission(format!(
        "missing admin permission to {verb} {entity}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_capability_is_scoped_by_prefix() {
        let grants = Grants::new(["comicdex.write"]);
        assert!(require_write(&grants, "comicdex", "add", "language").is_ok());

        let err = require_write(&grants, "other", "delete", "comic").unwrap_err();
        assert_eq!(err.to_string(), "missing admin permission to delete comic");
        assert_eq!(err.kind(), comicdex_db::ErrorKind::Generic);
    }

    #[test]
    fn empty_grants_refuse() {
        assert!(!Grants::none().has_permission("comicdex.write"));
    }
}
