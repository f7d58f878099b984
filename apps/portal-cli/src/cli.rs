//! Command line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use portal_core::ExportFormat;
use portal_search::DateRange;

/// Manage parties, defect groups, tickets and attachments
#[derive(Parser, Debug)]
#[command(name = "portal")]
#[command(about = "Operations portal: searchable, persistent record pages")]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding the stored collections
    #[arg(long, value_name = "DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// User id the collections are stored under
    #[arg(long, value_name = "ID", global = true)]
    pub user: Option<String>,

    /// Config file (TOML, or JSON with a .json extension)
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub entity: EntityCommand,
}

// ============================================
// Entities
// ============================================

#[derive(Subcommand, Debug)]
pub enum EntityCommand {
    /// Customers and suppliers
    Parties(PageArgs),

    /// Defect classification groups
    DefectGroups(PageArgs),

    /// Support tickets with status history
    Tickets(PageArgs),

    /// File attachment metadata
    Attachments(PageArgs),
}

#[derive(Args, Debug)]
pub struct PageArgs {
    #[command(subcommand)]
    pub command: Command,
}

// ============================================
// Page commands
// ============================================

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show one page of the filtered, sorted records
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Create a record from field assignments
    Create {
        /// Field assignment, e.g. --set name=Acme
        #[arg(long = "set", value_name = "FIELD=VALUE", required = true)]
        set: Vec<String>,
    },

    /// Overwrite fields of one record
    Update {
        id: String,

        /// Field assignment; an empty value removes optional fields
        #[arg(long = "set", value_name = "FIELD=VALUE", required = true)]
        set: Vec<String>,
    },

    /// Delete records by id
    #[command(visible_alias = "rm")]
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Mark records active (parties and defect groups)
    Activate {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Mark records inactive (parties and defect groups)
    Deactivate {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Import a .json or .csv file into the collection
    Import { file: PathBuf },

    /// Export the filtered records
    Export(ExportArgs),

    /// Move a ticket to a new status
    Status {
        id: String,

        /// open, in-progress, resolved or closed
        status: String,

        /// Who made the change
        #[arg(long, value_name = "NAME")]
        by: String,
    },

    /// Add a comment to a ticket
    Comment {
        id: String,

        text: String,

        /// Comment author
        #[arg(long, value_name = "NAME")]
        by: String,
    },
}

/// Search, filter and sort options shared by `list` and `export`.
#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// Free-text search
    #[arg(short, long)]
    pub query: Option<String>,

    /// Interpret the query with smart (typo-tolerant, pattern-aware) matching
    #[arg(long)]
    pub smart: bool,

    /// Per-field substring filter
    #[arg(long = "filter", value_name = "FIELD=VALUE")]
    pub filters: Vec<String>,

    /// Category chip, e.g. --chip category=Electrical
    #[arg(long = "chip", value_name = "CATEGORY=VALUE")]
    pub chips: Vec<String>,

    /// Only records created in the last 7, 30 or 90 days
    #[arg(long, value_name = "DAYS", value_parser = parse_date_range)]
    pub range: Option<DateRange>,

    /// Sort field
    #[arg(long, value_name = "FIELD")]
    pub sort: Option<String>,

    /// Sort descending
    #[arg(long, requires = "sort")]
    pub desc: bool,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub filters: FilterArgs,

    /// Page number (1-based)
    #[arg(long, default_value_t = 1)]
    pub page: usize,

    /// Print the page as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    #[command(flatten)]
    pub filters: FilterArgs,

    #[arg(long, value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Write to a file instead of stdout; a directory gets the default
    /// `<entity>-export.<ext>` name
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Csv,
}

impl From<OutputFormat> for ExportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => ExportFormat::Json,
            OutputFormat::Csv => ExportFormat::Csv,
        }
    }
}

fn parse_date_range(s: &str) -> Result<DateRange, String> {
    s.parse()
}
