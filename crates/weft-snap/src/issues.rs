//! Component issue detection and the snap-time ignore filter.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::state::ComponentState;

/// Categories of component problems that block a snap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IssueKind {
    /// A declared dependency has no resolvable version.
    MissingDependency,
    /// The component participates in a dependency cycle.
    CyclicDependency,
    /// An import in the sources is not declared as a dependency.
    UntrackedDependency,
    /// The working copy references files that do not exist.
    MissingSourceFiles,
}

impl IssueKind {
    /// Stable identifier used on the command line and in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingDependency => "missing-dependency",
            Self::CyclicDependency => "cyclic-dependency",
            Self::UntrackedDependency => "untracked-dependency",
            Self::MissingSourceFiles => "missing-source-files",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "missing-dependency" => Ok(Self::MissingDependency),
            "cyclic-dependency" => Ok(Self::CyclicDependency),
            "untracked-dependency" => Ok(Self::UntrackedDependency),
            "missing-source-files" => Ok(Self::MissingSourceFiles),
            other => Err(format!("unknown issue kind '{other}'")),
        }
    }
}

/// One detected problem on a component.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComponentIssue {
    pub kind: IssueKind,
    pub description: String,
}

impl ComponentIssue {
    pub fn new(kind: IssueKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
        }
    }
}

impl fmt::Display for ComponentIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.description)
    }
}

/// Which issue kinds a snap is allowed to proceed despite.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum IssueFilter {
    /// Every issue blocks (the default).
    #[default]
    IgnoreNone,
    /// No issue blocks.
    IgnoreAll,
    /// Only the listed kinds are ignored.
    Ignore(BTreeSet<IssueKind>),
}

impl IssueFilter {
    /// Parse the CLI form: `"*"` ignores everything, otherwise a
    /// comma-separated list of issue kinds.
    pub fn parse(s: &str) -> Result<Self, String> {
        if s.trim() == "*" {
            return Ok(Self::IgnoreAll);
        }
        let kinds = s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(IssueKind::from_str)
            .collect::<Result<BTreeSet<_>, _>>()?;
        if kinds.is_empty() {
            return Ok(Self::IgnoreNone);
        }
        Ok(Self::Ignore(kinds))
    }

    /// Returns `true` if issues of `kind` should not block the snap.
    pub fn ignores(&self, kind: IssueKind) -> bool {
        match self {
            Self::IgnoreNone => false,
            Self::IgnoreAll => true,
            Self::Ignore(kinds) => kinds.contains(&kind),
        }
    }

    /// The issues that still block after filtering.
    pub fn blocking(&self, issues: Vec<ComponentIssue>) -> Vec<ComponentIssue> {
        issues
            .into_iter()
            .filter(|issue| !self.ignores(issue.kind))
            .collect()
    }
}

/// Inspects a component's working copy for problems that should block a
/// snap. Real detection lives outside the engine; this seam lets hosts
/// plug theirs in.
pub trait IssueChecker: Send + Sync {
    fn issues(&self, state: &ComponentState) -> Vec<ComponentIssue>;
}

/// Checker that never reports issues.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoIssues;

impl IssueChecker for NoIssues {
    fn issues(&self, _state: &ComponentState) -> Vec<ComponentIssue> {
        Vec::new()
    }
}

/// Checker with a fixed per-component issue table, for hosts that compute
/// issues up front and for tests.
#[derive(Clone, Debug, Default)]
pub struct StaticIssueChecker {
    by_component: std::collections::BTreeMap<String, Vec<ComponentIssue>>,
}

impl StaticIssueChecker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `issue` against the component named by `full_name`.
    pub fn add(&mut self, full_name: impl Into<String>, issue: ComponentIssue) {
        self.by_component
            .entry(full_name.into())
            .or_default()
            .push(issue);
    }
}

impl IssueChecker for StaticIssueChecker {
    fn issues(&self, state: &ComponentState) -> Vec<ComponentIssue> {
        self.by_component
            .get(&state.id.full_name())
            .cloned()
            .unwrap_or_default()
    }
}
