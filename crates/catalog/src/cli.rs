//! Clap derive structures for the `catalog` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use catalog_core::{CategoryId, ItemId, OwnerId};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// catalog -- browse and edit a category/item catalog
#[derive(Debug, Parser)]
#[command(
    name = "catalog",
    version,
    about = "Browse and edit a catalog of categories and items",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Server profile to use
    #[arg(long, short = 'p', env = "CATALOG_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Catalog server URL (overrides profile)
    #[arg(long, short = 's', env = "CATALOG_SERVER", global = true)]
    pub server: Option<String>,

    /// Signed-in user id (overrides profile)
    #[arg(long, short = 'u', env = "CATALOG_USER", global = true)]
    pub user: Option<OwnerId>,

    /// Session token sent with every request
    #[arg(long, env = "CATALOG_SESSION_TOKEN", global = true, hide_env = true)]
    pub session_token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "CATALOG_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "CATALOG_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "CATALOG_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one id per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage categories
    #[command(alias = "cat", alias = "c")]
    Categories(CategoriesArgs),

    /// Manage items
    #[command(alias = "it", alias = "i")]
    Items(ItemsArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CATEGORIES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CategoriesArgs {
    #[command(subcommand)]
    pub command: CategoriesCommand,
}

#[derive(Debug, Subcommand)]
pub enum CategoriesCommand {
    /// List categories, sorted by name
    #[command(alias = "ls")]
    List {
        /// Only categories owned by the signed-in user
        #[arg(long)]
        mine: bool,
    },

    /// Create a category
    Add {
        /// Category name
        name: String,
    },

    /// Rename a category you own
    Rename {
        /// Category id
        id: CategoryId,

        /// New name
        name: String,
    },

    /// Delete a category you own, with all of its items
    #[command(alias = "rm")]
    Delete {
        /// Category id
        id: CategoryId,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ITEMS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ItemsArgs {
    #[command(subcommand)]
    pub command: ItemsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ItemsCommand {
    /// List items in a category, or the most recent items
    #[command(alias = "ls")]
    List {
        /// Category to list
        #[arg(long, short = 'c')]
        category: Option<CategoryId>,

        /// List every item regardless of category
        #[arg(long, conflicts_with = "category")]
        all: bool,
    },

    /// Show item details
    Get {
        /// Item id
        id: ItemId,
    },

    /// Create an item
    Add {
        /// Item name
        name: String,

        /// Category the item belongs to
        #[arg(long, short = 'c')]
        category: CategoryId,

        /// Free-form description
        #[arg(long, short = 'd', default_value = "")]
        description: String,

        /// JPEG or PNG image to attach
        #[arg(long)]
        image: Option<PathBuf>,
    },

    /// Edit an item you own
    Edit {
        /// Item id
        id: ItemId,

        #[command(flatten)]
        fields: ItemFields,
    },

    /// Delete an item you own, and its image
    #[command(alias = "rm")]
    Delete {
        /// Item id
        id: ItemId,
    },
}

/// Optional field updates for `items edit`.
#[derive(Debug, Args)]
pub struct ItemFields {
    /// New name
    #[arg(long)]
    pub name: Option<String>,

    /// New description
    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Move to another category
    #[arg(long, short = 'c')]
    pub category: Option<CategoryId>,

    /// Replace the image
    #[arg(long)]
    pub image: Option<PathBuf>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current configuration
    Show,

    /// Set a value on the active profile
    Set {
        /// Profile key (e.g., "server", "user_id", "image_cleanup")
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store a session token in the system keyring
    SetToken {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
