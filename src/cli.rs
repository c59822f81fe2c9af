use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Parse every book document and write per-book JSON content.
    Setup(SetupArgs),
    /// Parse a single plaintext book document.
    Convert(ConvertArgs),
    /// Validate written content against its chapter count table.
    Check(CheckArgs),
    /// Print content at a scripture reference.
    Show(ShowArgs),
}

#[derive(Debug, Args)]
pub struct SetupArgs {
    /// Directory or `.zip` archive holding the book documents (`.txt` or `.rtf`).
    #[arg(long)]
    pub source: String,

    /// Output directory for book JSON files and tables.
    #[arg(long)]
    pub out: String,

    /// Regex for book entry names; group 1 is the canonical book number
    /// (default: `VERSIFY_ENTRY_PATTERN` or the nwt layout).
    #[arg(long)]
    pub entry_pattern: Option<String>,

    /// Books parsed concurrently (default: `VERSIFY_JOBS` or available cores).
    #[arg(long)]
    pub jobs: Option<usize>,

    /// Write into an existing output directory.
    #[arg(long, default_value_t = false)]
    pub force: bool,

    /// Succeed even when books fail to parse or are missing from the source.
    #[arg(long, default_value_t = false)]
    pub allow_partial: bool,
}

#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Plaintext book document.
    #[arg(long)]
    pub input: String,

    /// Output JSON file (default: stdout).
    #[arg(long)]
    pub out: Option<String>,

    /// Pretty-print the JSON.
    #[arg(long, default_value_t = false)]
    pub pretty: bool,
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Content directory (created by `setup`).
    #[arg(long)]
    pub dir: String,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Content directory (created by `setup`).
    #[arg(long)]
    pub dir: String,

    /// Book name, e.g. `Genesis` or `1 John` (default: list all books).
    #[arg(long)]
    pub book: Option<String>,

    #[arg(long)]
    pub chapter: Option<u32>,

    #[arg(long)]
    pub verse: Option<u32>,
}
