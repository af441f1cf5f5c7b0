//! YAML loading for curated reference data.
//!
//! A seed document lists the leaf entities a fresh catalog needs before comics
//! can reference them: languages, websites, and the three type tables. A seed
//! path may be a single file or a directory of `.yaml`/`.yml` files, which are
//! merged in file-name order.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{AddLanguage, AddTypeDef, AddWebsite};

#[derive(Debug, Error)]
pub enum YamlError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("YAML parse error in {path}: {source}")]
    Parse {
        path: String,
        source: serde_yml::Error,
    },
    #[error("Seed path not found: {0}")]
    NotFound(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedData {
    pub languages: Vec<AddLanguage>,
    pub websites: Vec<AddWebsite>,
    pub category_types: Vec<AddTypeDef>,
    pub tag_types: Vec<AddTypeDef>,
    pub comic_relation_types: Vec<AddTypeDef>,
}

impl SeedData {
    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
            && self.websites.is_empty()
            && self.category_types.is_empty()
            && self.tag_types.is_empty()
            && self.comic_relation_types.is_empty()
    }

    fn extend(&mut self, other: SeedData) {
        self.languages.extend(other.languages);
        self.websites.extend(other.websites);
        self.category_types.extend(other.category_types);
        self.tag_types.extend(other.tag_types);
        self.comic_relation_types.extend(other.comic_relation_types);
    }
}

/// Load seed data from a file or a directory of files.
pub fn load_seed(path: &Path) -> Result<SeedData, YamlError> {
    if !path.exists() {
        return Err(YamlError::NotFound(path.display().to_string()));
    }
    if !path.is_dir() {
        return load_file(path);
    }

    let mut entries: Vec<_> = std::fs::read_dir(path)
        .map_err(|e| YamlError::Io {
            path: path.display().to_string(),
            source: e,
        })?
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.path()
                .extension()
                .is_some_and(|ext| ext == "yaml" || ext == "yml")
        })
        .collect();
    entries.sort_by_key(|e| e.file_name());

    let mut seed = SeedData::default();
    for entry in entries {
        seed.extend(load_file(&entry.path())?);
    }
    Ok(seed)
}

fn load_file(path: &Path) -> Result<SeedData, YamlError> {
    let contents = std::fs::read_to_string(path).map_err(|e| YamlError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    serde_yml::from_str(&contents).map_err(|e| YamlError::Parse {
        path: path.display().to_string(),
        source: e,
    })
}
