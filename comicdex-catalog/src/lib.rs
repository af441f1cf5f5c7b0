//! Comic catalog data model, write payloads, validation, and YAML seed loading.
//!
//! This crate defines the catalog entities and the payloads used to create or
//! modify them without any database dependencies. `comicdex-db` persists these
//! types; `comicdex-lib` assembles them into aggregates.

pub mod params;
pub mod types;
pub mod validate;
pub mod yaml;

pub use params::{ListParams, ListPolicy, Nulls, OrderBy, Pagination, Sort};
pub use types::*;
pub use validate::{Validate, ValidationError};
pub use yaml::{load_seed, SeedData, YamlError};
