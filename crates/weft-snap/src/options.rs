//! Options controlling a single snap.

use crate::error::{SnapError, SnapResult};
use crate::issues::IssueFilter;

/// Per-snap options.
///
/// `build` defaults to `true` here; the CLI leaves it off unless `--build`
/// is given, since a real pipeline is only wired up in CI-like callers.
#[derive(Clone, Debug)]
pub struct SnapOptions {
    /// Log message for the new version.
    pub message: String,
    /// Optional human-readable release label.
    pub tag: Option<String>,
    /// Snap even when nothing changed.
    pub unmodified: bool,
    /// Run the pipeline before recording.
    pub build: bool,
    /// Skip only the test step of the pipeline.
    pub skip_tests: bool,
    /// Skip the pipeline entirely.
    pub disable_snap_pipeline: bool,
    /// Record the version even if the pipeline fails.
    pub force_deploy: bool,
    /// Issue kinds that do not block this snap.
    pub ignore_issues: IssueFilter,
}

impl SnapOptions {
    /// Options with only a message, everything else default.
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    /// Reject mutually exclusive combinations before any side effect.
    pub fn validate(&self) -> SnapResult<()> {
        if self.disable_snap_pipeline && self.force_deploy {
            return Err(SnapError::InvalidFlagCombination(
                "--disable-snap-pipeline conflicts with --force-deploy: there is no pipeline \
                 outcome to override"
                    .into(),
            ));
        }
        Ok(())
    }

    /// Returns `true` if the pipeline should run for this snap.
    ///
    /// `skip_tests` does not disable the run; it is forwarded to the runner
    /// so the build step still executes.
    pub fn pipeline_enabled(&self) -> bool {
        self.build && !self.disable_snap_pipeline
    }
}

impl Default for SnapOptions {
    fn default() -> Self {
        Self {
            message: String::new(),
            tag: None,
            unmodified: false,
            build: true,
            skip_tests: false,
            disable_snap_pipeline: false,
            force_deploy: false,
            ignore_issues: IssueFilter::default(),
        }
    }
}
