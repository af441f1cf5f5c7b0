//! SQLite persistence layer for the comic catalog.
//!
//! Layered bottom-up: a condition algebra compiles filters to SQL fragments,
//! the statement builder turns column sets into INSERT/UPDATE/SELECT text,
//! and the generic engine runs those against any table described by a
//! [`engine::Table`]. Entity modules add validation, natural-key resolution
//! and joined views on top. Self-referential relation writes go through the
//! cycle guard inside a [`unit::UnitOfWork`].

pub mod builder;
pub mod classify;
pub mod condition;
pub mod engine;
pub mod error;
pub mod guard;
pub mod pool;
pub mod schema;
pub mod unit;

pub mod category;
pub mod chapter;
pub mod comic;
pub mod comic_links;
pub mod comic_parts;
pub mod comic_relation;
pub mod language;
pub mod tag;
pub mod type_def;
pub mod website;

pub use builder::{ColumnValue, Columns, Statement};
pub use classify::{classify, ConstraintKind, ConstraintViolation, Rule};
pub use condition::{Args, Condition, Item, Logical, SubLookup};
pub use engine::{Record, Table};
pub use error::{DataError, ErrorKind};
pub use pool::{Pool, PooledConnection};
pub use schema::{open_database, open_memory, SchemaError};
pub use unit::UnitOfWork;
