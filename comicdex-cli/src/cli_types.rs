//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "comicdex")]
#[command(about = "Manage a local comic catalog", long_about = None)]
pub(crate) struct Cli {
    /// Catalog database file (overrides settings and COMICDEX_DATABASE_PATH)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Enable debug logging, including the SQL sent to the database
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Create or migrate the catalog database
    Init,

    /// Load languages, websites and type tables from YAML
    Seed {
        /// A seed file or a directory of .yaml/.yml files
        path: PathBuf,
    },

    /// Manage languages
    Language {
        #[command(subcommand)]
        action: ReferenceAction,
    },

    /// Manage websites
    Website {
        #[command(subcommand)]
        action: ReferenceAction,
    },

    /// Manage category types
    CategoryType {
        #[command(subcommand)]
        action: ReferenceAction,
    },

    /// Manage tag types
    TagType {
        #[command(subcommand)]
        action: ReferenceAction,
    },

    /// Manage comic relation types
    RelationType {
        #[command(subcommand)]
        action: ReferenceAction,
    },

    /// Manage categories and their hierarchy
    Category {
        #[command(subcommand)]
        action: CategoryAction,
    },

    /// Manage tags
    Tag {
        #[command(subcommand)]
        action: TagAction,
    },

    /// Manage comics
    Comic {
        #[command(subcommand)]
        action: ComicAction,
    },

    /// Inspect settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Shared by the code/name keyed tables.
#[derive(Subcommand)]
pub(crate) enum ReferenceAction {
    /// Add an entry
    Add {
        /// IETF tag, domain, or type code
        code: String,
        name: String,
    },

    /// List entries
    List {
        #[command(flatten)]
        list: ListArgs,
    },
}

#[derive(Args, Clone)]
pub(crate) struct ListArgs {
    /// Page number, starting at 1
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Entries per page (capped per entity)
    #[arg(long, default_value_t = 10)]
    pub limit: u32,

    /// Sort terms as field[:asc|desc[:first|last]]
    #[arg(long = "order-by", value_delimiter = ',')]
    pub order_by: Vec<String>,
}

#[derive(Subcommand)]
pub(crate) enum CategoryAction {
    /// Add a category
    Add {
        #[arg(value_name = "TYPE")]
        type_code: String,
        code: String,
        name: String,
    },

    /// Show a category with its child edges
    Show {
        #[arg(value_name = "TYPE")]
        type_code: String,
        code: String,
    },

    /// List categories
    List {
        /// Only categories of this type
        #[arg(long = "type", value_name = "TYPE")]
        type_code: Option<String>,

        #[command(flatten)]
        list: ListArgs,
    },

    /// Make one category the parent of another
    Relate {
        #[arg(value_name = "TYPE")]
        type_code: String,
        parent: String,
        child: String,
    },
}

#[derive(Subcommand)]
pub(crate) enum TagAction {
    /// Add a tag
    Add {
        #[arg(value_name = "TYPE")]
        type_code: String,
        code: String,
        name: String,
    },

    /// List tags
    List {
        /// Only tags of this type
        #[arg(long = "type", value_name = "TYPE")]
        type_code: Option<String>,

        #[command(flatten)]
        list: ListArgs,
    },
}

#[derive(Subcommand)]
pub(crate) enum ComicAction {
    /// Add a comic
    Add {
        /// Eight-character code (random when omitted)
        #[arg(long)]
        code: Option<String>,

        /// Original language as an IETF tag
        #[arg(long)]
        language: Option<String>,
    },

    /// Show a comic with everything attached to it
    Show { code: String },

    /// List comics
    List {
        #[command(flatten)]
        list: ListArgs,

        /// Only comics with an external link on this website
        #[arg(long)]
        website: Option<String>,
    },

    /// Add a title
    Title {
        code: String,
        ietf: String,
        title: String,
    },

    /// Attach a category
    LinkCategory {
        code: String,
        #[arg(value_name = "TYPE")]
        type_code: String,
        category: String,
    },

    /// Attach a tag
    LinkTag {
        code: String,
        #[arg(value_name = "TYPE")]
        type_code: String,
        tag: String,
    },

    /// Relate two comics under a relation type
    Relate {
        #[arg(value_name = "TYPE")]
        type_code: String,
        parent: String,
        child: String,
    },

    /// Add a chapter
    Chapter {
        code: String,
        chapter: String,

        #[arg(long)]
        version: Option<String>,

        #[arg(long)]
        volume: Option<String>,

        /// Release time as RFC 3339 (defaults to now)
        #[arg(long)]
        released_at: Option<String>,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Show the effective settings
    Show,

    /// Print the settings file path
    Path,
}
