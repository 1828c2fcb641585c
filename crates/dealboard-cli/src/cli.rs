use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "dealboard")]
#[command(about = "Task and deal pipeline boards from the command line", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to workspace data file (or set DEALBOARD_FILE env var)
    #[arg(short, long, value_name = "FILE", env = "DEALBOARD_FILE", global = true)]
    pub file: Option<String>,

    /// Path to config file (defaults to the platform config directory)
    #[arg(long, value_name = "CONFIG", env = "DEALBOARD_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Board operations
    Board(BoardCommand),
    /// Pipeline reporting
    Pipeline(PipelineCommand),
    /// Task operations
    Task(TaskCommand),
    /// Deal operations
    Deal(DealCommand),
    /// Pipeline stage operations
    Stage(StageCommand),
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BoardKind {
    /// Task board, one column per status
    Tasks,
    /// Deal board, one column per pipeline stage
    Deals,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CloseOutcome {
    Won,
    Lost,
}

// Board commands
#[derive(Args)]
pub struct BoardCommand {
    #[command(subcommand)]
    pub action: BoardAction,
}

#[derive(Subcommand)]
pub enum BoardAction {
    /// Print every column in order with its cards
    Show {
        #[arg(long, value_enum)]
        kind: BoardKind,
    },
    /// Drag a card from one column slot to another
    Move(MoveArgs),
    /// Find the column and index of a card
    Locate {
        #[arg(long, value_enum)]
        kind: BoardKind,
        #[arg(long)]
        id: Uuid,
    },
    /// Renumber the positions of one column
    Compact {
        #[arg(long, value_enum)]
        kind: BoardKind,
        #[arg(long)]
        bucket: String,
    },
}

#[derive(Args)]
pub struct MoveArgs {
    #[arg(long, value_enum)]
    pub kind: BoardKind,
    /// Source column
    #[arg(long)]
    pub from: String,
    /// Index of the card within the source column
    #[arg(long)]
    pub from_index: usize,
    /// Destination column
    #[arg(long)]
    pub to: String,
    /// Index to drop at within the destination column
    #[arg(long)]
    pub to_index: usize,
}

// Pipeline commands
#[derive(Args)]
pub struct PipelineCommand {
    #[command(subcommand)]
    pub action: PipelineAction,
}

#[derive(Subcommand)]
pub enum PipelineAction {
    /// Per-stage and overall deal figures
    Summary,
}

// Task commands
#[derive(Args)]
pub struct TaskCommand {
    #[command(subcommand)]
    pub action: TaskAction,
}

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a task at the end of its status column
    Add {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "todo")]
        status: String,
    },
}

// Deal commands
#[derive(Args)]
pub struct DealCommand {
    #[command(subcommand)]
    pub action: DealAction,
}

#[derive(Subcommand)]
pub enum DealAction {
    /// Add a deal at the end of its stage
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        stage: String,
        #[arg(long, default_value_t = 0.0)]
        value: f64,
    },
    /// Mark a deal won or lost
    Close {
        #[arg(long)]
        id: Uuid,
        #[arg(long, value_enum)]
        status: CloseOutcome,
        /// Why the deal was lost (required with --status lost)
        #[arg(long)]
        reason: Option<String>,
    },
}

// Stage commands
#[derive(Args)]
pub struct StageCommand {
    #[command(subcommand)]
    pub action: StageAction,
}

#[derive(Subcommand)]
pub enum StageAction {
    /// Add a pipeline stage
    Add {
        #[arg(long)]
        name: String,
        /// Column order; defaults to after the last stage
        #[arg(long)]
        order: Option<i32>,
    },
    /// Change the column order of a stage
    Reorder {
        #[arg(long)]
        name: String,
        #[arg(long)]
        order: i32,
    },
    /// List stages in column order
    List,
}
