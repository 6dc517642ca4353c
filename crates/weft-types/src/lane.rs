use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Name of the default lane, the trunk of every component's history.
pub const TRUNK_LANE: &str = "main";

/// A named, independent head pointer into a component's version graph.
///
/// Lanes allow parallel history lines per component without those lines
/// needing a common remote, analogous to branches. The default lane is
/// distinguished as the trunk ([`Lane::trunk`]).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Lane(String);

impl Lane {
    /// Create a lane with the given name.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        if name.is_empty() {
            return Err(TypeError::InvalidLaneName {
                name,
                reason: "empty name".into(),
            });
        }
        if name.starts_with('/') || name.ends_with('/') || name.contains("//") {
            return Err(TypeError::InvalidLaneName {
                name,
                reason: "malformed path separators".into(),
            });
        }
        if name.chars().any(|c| c.is_whitespace() || c == '@') {
            return Err(TypeError::InvalidLaneName {
                name,
                reason: "contains a reserved character".into(),
            });
        }
        Ok(Self(name))
    }

    /// The default trunk lane.
    pub fn trunk() -> Self {
        Self(TRUNK_LANE.into())
    }

    /// Returns `true` if this is the trunk lane.
    pub fn is_trunk(&self) -> bool {
        self.0 == TRUNK_LANE
    }

    /// The lane name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Default for Lane {
    fn default() -> Self {
        Self::trunk()
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Lane({})", self.0)
    }
}
