//! Options controlling an import.

use std::fmt;
use std::str::FromStr;

use weft_types::ComponentId;

use crate::error::{ImportError, ImportResult};

/// How to resolve a component whose local and remote histories diverged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Take the incoming files wholesale.
    Theirs,
    /// Keep the local files wholesale.
    Ours,
    /// Three-way merge per file, leaving conflict markers for the user.
    Manual,
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Theirs => "theirs",
            Self::Ours => "ours",
            Self::Manual => "manual",
        })
    }
}

impl FromStr for MergeStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "theirs" => Ok(Self::Theirs),
            "ours" => Ok(Self::Ours),
            "manual" => Ok(Self::Manual),
            other => Err(format!(
                "unknown merge strategy '{other}' (expected theirs, ours or manual)"
            )),
        }
    }
}

/// Per-import options. Defaults match a plain `weft import <id>`.
#[derive(Clone, Debug, Default)]
pub struct ImportOptions {
    /// Components to import. Empty means every component the workspace
    /// already tracks from this remote.
    pub ids: Vec<ComponentId>,
    /// Fetch objects only; never touch working copies or heads.
    pub objects_only: bool,
    /// Strategy for diverged components. `None` leaves them pending.
    pub merge: Option<MergeStrategy>,
    /// Discard local working-copy changes when updating files.
    pub override_local: bool,
    /// Fetch complete histories instead of stopping at locally-known
    /// versions.
    pub all_history: bool,
}

impl ImportOptions {
    /// Import specific components with defaults otherwise.
    pub fn for_ids(ids: impl IntoIterator<Item = ComponentId>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Reject mutually exclusive combinations before any fetch.
    pub fn validate(&self) -> ImportResult<()> {
        if self.objects_only && self.merge.is_some() {
            return Err(ImportError::InvalidFlagCombination(
                "--objects conflicts with --merge: an objects-only import never touches \
                 working copies"
                    .into(),
            ));
        }
        if self.override_local && self.merge.is_some() {
            return Err(ImportError::InvalidFlagCombination(
                "--override conflicts with --merge: overriding discards the local side a \
                 merge would need"
                    .into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(ImportOptions::default().validate().is_ok());
    }

    #[test]
    fn objects_with_merge_is_rejected() {
        let options = ImportOptions {
            objects_only: true,
            merge: Some(MergeStrategy::Theirs),
            ..ImportOptions::default()
        };
        assert!(matches!(
            options.validate(),
            Err(ImportError::InvalidFlagCombination(_))
        ));
    }

    #[test]
    fn override_with_merge_is_rejected() {
        let options = ImportOptions {
            override_local: true,
            merge: Some(MergeStrategy::Manual),
            ..ImportOptions::default()
        };
        assert!(matches!(
            options.validate(),
            Err(ImportError::InvalidFlagCombination(_))
        ));
    }

    #[test]
    fn strategy_parse_roundtrip() {
        for strategy in [
            MergeStrategy::Theirs,
            MergeStrategy::Ours,
            MergeStrategy::Manual,
        ] {
            assert_eq!(
                strategy.to_string().parse::<MergeStrategy>().unwrap(),
                strategy
            );
        }
        assert!("yours".parse::<MergeStrategy>().is_err());
    }
}
