use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tb", about = concat!("taskboard v", env!("CARGO_PKG_VERSION"), " - filtered, cached kanban views"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Task file (JSON array of tasks)
    #[arg(short = 'f', long = "file", global = true, default_value = "tasks.json")]
    pub file: String,

    /// Board config (TOML); defaults apply when omitted
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Log cache and board activity to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List tasks matching the filters
    Filter(FilterArgs),
    /// Show the board: one column per status
    Board(BoardArgs),
    /// Move a task to another column
    Move(MoveArgs),
    /// Re-run a view through the cache and report timings
    Bench(BenchArgs),
}

// ---------------------------------------------------------------------------
// Filter args
// ---------------------------------------------------------------------------

/// Filters shared by every view command
#[derive(Args, Clone, Default)]
pub struct CriteriaArgs {
    /// Case-insensitive text matched against title or description
    #[arg(long, short = 's')]
    pub search: Option<String>,
    /// Priority (low, medium, high, urgent)
    #[arg(long, short = 'p')]
    pub priority: Option<String>,
    /// Tag to match (repeatable; any tag matches)
    #[arg(long = "tag", short = 't')]
    pub tags: Vec<String>,
    /// Earliest due date (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    pub due_from: Option<String>,
    /// Latest due date (YYYY-MM-DD covers the whole day, or RFC 3339)
    #[arg(long)]
    pub due_to: Option<String>,
}

#[derive(Args)]
pub struct FilterArgs {
    #[command(flatten)]
    pub criteria: CriteriaArgs,
    /// Status (pending, in_progress, completed)
    #[arg(long)]
    pub status: Option<String>,
    /// Sort in board order instead of file order
    #[arg(long)]
    pub sorted: bool,
}

#[derive(Args)]
pub struct BoardArgs {
    #[command(flatten)]
    pub criteria: CriteriaArgs,
    /// Title column width in terminal cells
    #[arg(long, default_value_t = 40)]
    pub width: usize,
}

#[derive(Args)]
pub struct MoveArgs {
    /// Task ID
    pub id: String,
    /// Target status (pending, in_progress, completed)
    pub status: String,
}

#[derive(Args)]
pub struct BenchArgs {
    #[command(flatten)]
    pub criteria: CriteriaArgs,
    /// Number of column renders
    #[arg(long, short = 'n', default_value_t = 100)]
    pub iterations: usize,
}
