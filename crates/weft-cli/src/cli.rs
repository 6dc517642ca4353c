use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "weft",
    about = "weft — component-level version control",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Workspace root (defaults to the current directory).
    #[arg(long, global = true, default_value = ".")]
    pub workspace: String,
}

#[derive(Subcommand)]
pub enum Command {
    /// Initialize a new weft workspace
    Init(InitArgs),
    /// Track a directory as a component
    Add(AddArgs),
    /// Record changed components as new versions
    Snap(SnapArgs),
    /// Fetch components from a remote scope
    Import(ImportArgs),
    /// Show which components changed since their last version
    Status(StatusArgs),
    /// Show a component's version history
    Log(LogArgs),
}

#[derive(Args)]
pub struct InitArgs {
    pub path: Option<String>,
    /// Scope this workspace publishes under.
    #[arg(long)]
    pub scope: String,
}

#[derive(Args)]
pub struct AddArgs {
    /// Component name within the scope, e.g. `ui/button`.
    pub name: String,
    /// Source directory, relative to the workspace root. Defaults to the
    /// component name.
    #[arg(long)]
    pub path: Option<String>,
    /// Names of workspace components this one depends on.
    #[arg(long = "depends-on", value_delimiter = ',')]
    pub dependencies: Vec<String>,
}

#[derive(Args)]
pub struct SnapArgs {
    /// Component to snap. Omit to snap every changed component.
    pub id: Option<String>,

    #[arg(short, long)]
    pub message: Option<String>,

    /// Human-readable release label for the new version.
    #[arg(long)]
    pub tag: Option<String>,

    /// Record a new version even when nothing changed.
    #[arg(long)]
    pub unmodified: bool,

    /// DEPRECATED: use --unmodified.
    #[arg(long, hide = true)]
    pub force: bool,

    /// DEPRECATED: snapping all changed components is the default.
    #[arg(long, hide = true)]
    pub all: bool,

    /// Run the snap pipeline locally before recording.
    #[arg(long)]
    pub build: bool,

    /// Run the snap pipeline but skip its test step.
    #[arg(long)]
    pub skip_tests: bool,

    /// Skip the snap pipeline entirely.
    #[arg(long, conflicts_with = "force_deploy")]
    pub disable_snap_pipeline: bool,

    /// Record the version even if the pipeline fails.
    #[arg(long)]
    pub force_deploy: bool,

    /// Issue kinds that do not block this snap: a comma-separated list, or
    /// `*` for all.
    #[arg(long)]
    pub ignore_issues: Option<String>,

    /// Do not re-snap dependents of the snapped components.
    #[arg(long)]
    pub skip_auto_snap: bool,
}

#[derive(Args)]
pub struct ImportArgs {
    /// Components to import. Omit to import everything the remote
    /// publishes.
    pub ids: Vec<String>,

    /// Path to the remote scope's metadata directory (a `.weft/` layout).
    #[arg(long)]
    pub from: String,

    /// Name of the remote scope.
    #[arg(long, default_value = "remote")]
    pub scope: String,

    /// Fetch objects only; never touch working copies or heads.
    #[arg(long = "objects", conflicts_with = "merge")]
    pub objects_only: bool,

    /// Merge strategy for diverged components: theirs, ours or manual.
    #[arg(long)]
    pub merge: Option<String>,

    /// Discard local working-copy changes when updating files.
    #[arg(long = "override", conflicts_with = "merge")]
    pub override_local: bool,

    /// Fetch complete histories instead of stopping at known versions.
    #[arg(long)]
    pub all_history: bool,
}

#[derive(Args)]
pub struct StatusArgs {}

#[derive(Args)]
pub struct LogArgs {
    pub name: String,
    #[arg(long)]
    pub oneline: bool,
}
