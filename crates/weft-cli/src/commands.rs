use std::path::PathBuf;

use anyhow::{bail, Context};
use colored::Colorize;
use weft_diff::TreeChange;
use weft_import::{FsRemoteScope, ImportOptions, ImportStatus, MergeStrategy};
use weft_snap::{IssueFilter, SnapOptions};
use weft_types::ComponentId;
use weft_workspace::{
    ComponentEntry, ComponentStatus, Workspace, WorkspaceError, WorkspaceSnapOptions,
};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let root = PathBuf::from(&cli.workspace);
    match cli.command {
        Command::Init(args) => cmd_init(root, args),
        Command::Add(args) => cmd_add(root, args),
        Command::Snap(args) => cmd_snap(root, args),
        Command::Import(args) => cmd_import(root, args),
        Command::Status(_) => cmd_status(root),
        Command::Log(args) => cmd_log(root, args),
    }
}

fn open(root: PathBuf) -> anyhow::Result<Workspace> {
    Workspace::open(&root).with_context(|| format!("opening workspace at {}", root.display()))
}

fn cmd_init(root: PathBuf, args: InitArgs) -> anyhow::Result<()> {
    let path = args.path.map(PathBuf::from).unwrap_or(root);
    let ws = Workspace::init(&path, &args.scope)?;
    println!(
        "{} Initialized weft workspace in {}",
        "✓".green().bold(),
        path.display().to_string().bold()
    );
    println!("  Scope: {}", ws.manifest().scope.cyan());
    println!("  Lane: {}", ws.lane().to_string().yellow());
    Ok(())
}

fn cmd_add(root: PathBuf, args: AddArgs) -> anyhow::Result<()> {
    let mut ws = open(root)?;
    let path = args.path.unwrap_or_else(|| args.name.clone());
    ws.track(
        &args.name,
        ComponentEntry {
            path: path.clone(),
            dependencies: args.dependencies,
            scope: None,
        },
    )?;
    println!(
        "{} Tracking {} at {}",
        "✓".green(),
        args.name.bold(),
        path
    );
    Ok(())
}

fn cmd_snap(root: PathBuf, args: SnapArgs) -> anyhow::Result<()> {
    let ws = open(root)?;

    if args.all {
        eprintln!(
            "{} --all is deprecated: snapping all changed components is the default",
            "warning:".yellow().bold()
        );
    }
    let mut unmodified = args.unmodified;
    if args.force {
        eprintln!(
            "{} --force is deprecated: use --unmodified",
            "warning:".yellow().bold()
        );
        // --force only ever applied to an explicitly named component.
        if args.id.is_some() {
            unmodified = true;
        }
    }

    let ignore_issues = match &args.ignore_issues {
        Some(spec) => IssueFilter::parse(spec)
            .map_err(|e| anyhow::anyhow!(e))
            .context("parsing --ignore-issues")?,
        None => IssueFilter::default(),
    };

    let options = WorkspaceSnapOptions {
        target: args.id,
        snap: SnapOptions {
            message: args.message.unwrap_or_default(),
            tag: args.tag,
            unmodified,
            build: args.build,
            skip_tests: args.skip_tests,
            disable_snap_pipeline: args.disable_snap_pipeline,
            force_deploy: args.force_deploy,
            ignore_issues,
            ..SnapOptions::default()
        },
        skip_auto_snap: args.skip_auto_snap,
    };

    let summary = match ws.snap(&options) {
        Ok(summary) => summary,
        Err(WorkspaceError::NothingToSnap) => {
            println!("nothing to snap");
            return Ok(());
        }
        Err(error) => return Err(error.into()),
    };

    let new: Vec<_> = summary.new_components().collect();
    if !new.is_empty() {
        println!("{}", "new components".green().bold());
        for receipt in new {
            println!(
                "  {} {}",
                receipt.component.full_name().bold(),
                receipt.hash.short_hex().yellow()
            );
        }
    }
    let changed: Vec<_> = summary.changed_components().collect();
    if !changed.is_empty() {
        println!("{}", "changed components".green().bold());
        for receipt in changed {
            let tag = receipt
                .version
                .tag
                .as_deref()
                .map(|t| format!(" ({t})"))
                .unwrap_or_default();
            println!(
                "  {} {}{}",
                receipt.component.full_name().bold(),
                receipt.hash.short_hex().yellow(),
                tag.cyan()
            );
        }
    }
    if !summary.auto_snapped.is_empty() {
        println!("{}", "auto-snapped dependents".green().bold());
        for auto in &summary.auto_snapped {
            let causes: Vec<_> = auto
                .triggered_by
                .iter()
                .map(ComponentId::full_name)
                .collect();
            println!(
                "  {} {} {} {}",
                auto.receipt.component.full_name().bold(),
                auto.receipt.hash.short_hex().yellow(),
                "<-".dimmed(),
                causes.join(", ").dimmed()
            );
        }
    }
    for failure in &summary.failures {
        println!(
            "  {} {}: {}",
            "skipped".red(),
            failure.component.full_name().bold(),
            failure.error
        );
    }
    println!(
        "{} {} version(s) recorded on lane {}",
        "✓".green().bold(),
        summary.total(),
        ws.lane().to_string().yellow()
    );
    Ok(())
}

fn cmd_import(root: PathBuf, args: ImportArgs) -> anyhow::Result<()> {
    let mut ws = open(root)?;
    let remote = FsRemoteScope::open(&args.scope, &args.from)
        .with_context(|| format!("opening remote scope at {}", args.from))?;

    let merge = match &args.merge {
        Some(s) => Some(
            s.parse::<MergeStrategy>()
                .map_err(|e| anyhow::anyhow!(e))
                .context("parsing --merge")?,
        ),
        None => None,
    };
    let ids = args
        .ids
        .iter()
        .map(|s| s.parse::<ComponentId>())
        .collect::<Result<Vec<_>, _>>()?;

    let options = ImportOptions {
        ids,
        objects_only: args.objects_only,
        merge,
        override_local: args.override_local,
        all_history: args.all_history,
    };
    let report = ws.import(&remote, &options)?;

    for entry in &report.components {
        let label = match &entry.status {
            ImportStatus::UpToDate => "up to date".dimmed(),
            ImportStatus::Added => "added".green(),
            ImportStatus::FastForwarded => "updated".green(),
            ImportStatus::MergePending => "merge pending".yellow(),
            ImportStatus::Merged { strategy, clean: true } => {
                format!("merged ({strategy})").green()
            }
            ImportStatus::Merged { strategy, clean: false } => {
                format!("merged ({strategy}), conflicts").red()
            }
            ImportStatus::ObjectsFetched => "objects fetched".dimmed(),
        };
        println!("  {} {}", entry.component.full_name().bold(), label);
        for path in &entry.conflicts {
            println!("    {} {}", "conflict:".red(), path);
        }
    }
    println!(
        "{} {} version(s) fetched from {}",
        "✓".green().bold(),
        report.versions_fetched(),
        report.scope.bold()
    );
    if report.has_pending_merges() {
        println!(
            "{} diverged components left untouched; re-run with --merge to resolve",
            "note:".yellow()
        );
    }
    Ok(())
}

fn cmd_status(root: PathBuf) -> anyhow::Result<()> {
    let ws = open(root)?;
    let statuses = ws.status()?;
    if statuses.iter().all(|s| !s.is_dirty()) {
        println!("Workspace clean: nothing to snap.");
        return Ok(());
    }
    for status in statuses.iter().filter(|s| s.is_dirty()) {
        println!("{}", status.id.full_name().bold());
        for detail in status_details(status) {
            println!("  {detail}");
        }
    }
    Ok(())
}

fn status_details(status: &ComponentStatus) -> Vec<String> {
    let mut details = Vec::new();
    if status.new_component {
        details.push("new component".green().to_string());
    }
    for change in &status.changes.changes {
        details.push(match change {
            TreeChange::Added { path, .. } => format!("{} {}", "new file:".green(), path),
            TreeChange::Modified { path, .. } => format!("{} {}", "modified:".yellow(), path),
            TreeChange::Removed { path, .. } => format!("{} {}", "deleted:".red(), path),
        });
    }
    if status.dependencies_changed {
        details.push("modified dependencies".yellow().to_string());
    }
    for pin in &status.stale_pins {
        details.push(format!("{} {}", "stale pin:".yellow(), pin.full_name()));
    }
    if status.merge_pending {
        details.push("merge pending: snap to resolve".red().to_string());
    }
    details
}

fn cmd_log(root: PathBuf, args: LogArgs) -> anyhow::Result<()> {
    let ws = open(root)?;
    let entries = ws.log(&args.name)?;
    if entries.is_empty() {
        bail!("component '{}' has no versions on lane '{}'", args.name, ws.lane());
    }
    for (hash, version) in entries {
        if args.oneline {
            println!("{} {}", hash.short_hex().yellow(), version.message);
            continue;
        }
        println!("{} {}", "version".yellow().bold(), hash.to_hex().yellow());
        if let Some(tag) = &version.tag {
            println!("Tag:    {}", tag.cyan());
        }
        println!("Author: {} <{}>", version.author.name, version.author.email);
        println!("Date:   {}", format_timestamp(version.timestamp_ms));
        if version.is_merge() {
            let parents: Vec<_> = version.parents.iter().map(|p| p.short_hex()).collect();
            println!("Merge:  {}", parents.join(" "));
        }
        println!("\n    {}\n", version.message);
    }
    Ok(())
}

fn format_timestamp(ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| ms.to_string())
}
