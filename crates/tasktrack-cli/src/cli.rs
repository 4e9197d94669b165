use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tasktrack")]
#[command(about = "Project and task tracker with spreadsheet import and export", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the storage file (or set TASKTRACK_FILE env var)
    #[arg(long, short = 'f', value_name = "FILE", env = "TASKTRACK_FILE")]
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Project operations
    Project(ProjectCommand),
    /// Task operations on the current project
    Task(TaskCommand),
    /// Filters, view mode and paging of the current project
    View(ViewCommand),
    /// Import tasks from a CSV, TXT or Excel file, or CSV text on stdin
    Import(ImportArgs),
    /// Export the current project's visible tasks
    Export(ExportArgs),
    /// Write or describe the import template
    Template(TemplateCommand),
    /// Full backup and restore of all projects
    Backup(BackupCommand),
    /// Storage usage and reset
    Storage(StorageCommand),
    /// Task statistics for the current project
    Stats,
    /// Toggle appearance settings
    Settings(SettingsCommand),
    /// Print reloads caused by other writers of the storage file
    Watch(WatchArgs),
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// Project commands
#[derive(Args)]
pub struct ProjectCommand {
    #[command(subcommand)]
    pub action: ProjectAction,
}

#[derive(Subcommand)]
pub enum ProjectAction {
    /// Create a project and make it current
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// List all projects
    List,
    /// Show the current project
    Current,
    /// Make a project current (by id or name)
    Select {
        #[arg(long)]
        id: String,
    },
    /// Update a project
    Update(ProjectUpdateArgs),
    /// Delete a project and its tasks
    Delete {
        #[arg(long)]
        id: String,
    },
    /// Print a project's metadata and data as JSON
    Dump {
        #[arg(long)]
        id: Option<String>,
    },
}

#[derive(Args)]
pub struct ProjectUpdateArgs {
    #[arg(long)]
    pub id: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long, conflicts_with = "clear_description")]
    pub description: Option<String>,
    #[arg(long)]
    pub clear_description: bool,
    #[arg(long)]
    pub color: Option<String>,
}

// Task commands
#[derive(Args)]
pub struct TaskCommand {
    #[command(subcommand)]
    pub action: TaskAction,
}

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a task to the top of the current project
    Add(TaskAddArgs),
    /// List the tasks of the current view
    List,
    /// Get a specific task
    Get {
        #[arg(long)]
        id: String,
    },
    /// Change a task's status
    Status {
        #[arg(long)]
        id: String,
        #[arg(long)]
        status: String,
    },
    /// Set one field of a task
    Edit {
        #[arg(long)]
        id: String,
        #[arg(long)]
        field: String,
        #[arg(long)]
        value: String,
    },
    /// Delete a task
    Delete {
        #[arg(long)]
        id: String,
    },
}

#[derive(Args)]
pub struct TaskAddArgs {
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub assignee: Option<String>,
    /// Extra fields as KEY=VALUE, repeatable
    #[arg(long = "field", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub fields: Vec<(String, String)>,
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{}'", raw)),
    }
}

// View commands
#[derive(Args)]
pub struct ViewCommand {
    #[command(subcommand)]
    pub action: ViewAction,
}

#[derive(Subcommand)]
pub enum ViewAction {
    /// Replace the task filters
    Filter(FilterArgs),
    /// Switch between kanban and table view
    Mode {
        #[arg(value_enum)]
        mode: ViewModeArg,
    },
    /// Go to a table page
    Page {
        page: usize,
    },
    /// Tasks grouped by workflow stage
    Board,
    /// Distinct assignees of the current project
    Assignees,
}

#[derive(Args)]
pub struct FilterArgs {
    #[arg(long)]
    pub assignee: Option<String>,
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub priority: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ViewModeArg {
    Kanban,
    Table,
}

// Import/export commands
#[derive(Args)]
pub struct ImportArgs {
    /// Spreadsheet to import; reads CSV text from stdin when omitted
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,
}

#[derive(Args)]
pub struct ExportArgs {
    #[arg(value_enum, default_value = "xlsx")]
    pub format: ExportFormat,
    /// Output path; defaults to a dated file name in the working directory
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ExportFormat {
    Xlsx,
    Csv,
}

#[derive(Args)]
pub struct TemplateCommand {
    #[command(subcommand)]
    pub action: TemplateAction,
}

#[derive(Subcommand)]
pub enum TemplateAction {
    /// Write the CSV template
    Csv {
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Write the Excel template
    Xlsx {
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Describe the template columns and accepted values
    Info,
}

#[derive(Args)]
pub struct BackupCommand {
    #[command(subcommand)]
    pub action: BackupAction,
}

#[derive(Subcommand)]
pub enum BackupAction {
    /// Write every project and its data to a JSON file
    Create {
        #[arg(long)]
        output: PathBuf,
    },
    /// Replace all data with a backup file's content
    Restore {
        #[arg(long)]
        input: PathBuf,
    },
}

#[derive(Args)]
pub struct StorageCommand {
    #[command(subcommand)]
    pub action: StorageAction,
}

#[derive(Subcommand)]
pub enum StorageAction {
    /// Bytes used by tracker keys
    Size,
    /// Remove every tracker key
    Clear {
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args)]
pub struct SettingsCommand {
    #[command(subcommand)]
    pub action: SettingsAction,
}

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Toggle dark mode
    DarkMode,
    /// Toggle the collapsed sidebar
    Sidebar,
}

#[derive(Args)]
pub struct WatchArgs {
    /// Stop after this many seconds instead of waiting for Ctrl-C
    #[arg(long)]
    pub timeout: Option<u64>,
}
