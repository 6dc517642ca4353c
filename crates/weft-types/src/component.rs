use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Identity of an independently versioned component.
///
/// Identity is `scope` + `path`; the optional `version` names a point in that
/// component's history (a version object hash or a release tag label). A
/// `ComponentId` is immutable once constructed — version changes produce a
/// new id via [`with_version`].
///
/// The string form is `scope/path` or `scope/path@version`, e.g.
/// `acme.design/ui/button@1f3a9c0d2`.
///
/// [`with_version`]: ComponentId::with_version
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentId {
    scope: String,
    path: String,
    version: Option<String>,
}

impl ComponentId {
    /// Create a component id without a version.
    pub fn new(scope: impl Into<String>, path: impl Into<String>) -> Result<Self, TypeError> {
        let scope = scope.into();
        let path = path.into();
        validate_segment(&scope, &path, "scope", &scope)?;
        validate_path(&scope, &path)?;
        Ok(Self {
            scope,
            path,
            version: None,
        })
    }

    /// The scope this component belongs to.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// The namespace path within the scope (e.g. `ui/button`).
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The version reference, if any.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// A copy of this id pointing at the given version.
    pub fn with_version(&self, version: impl Into<String>) -> Self {
        Self {
            scope: self.scope.clone(),
            path: self.path.clone(),
            version: Some(version.into()),
        }
    }

    /// A copy of this id with the version stripped.
    pub fn without_version(&self) -> Self {
        Self {
            scope: self.scope.clone(),
            path: self.path.clone(),
            version: None,
        }
    }

    /// Identity comparison: same scope and path, ignoring version.
    pub fn same_component(&self, other: &ComponentId) -> bool {
        self.scope == other.scope && self.path == other.path
    }

    /// The version-less `scope/path` form, used as a map key for identity.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.scope, self.path)
    }
}

fn validate_segment(scope: &str, path: &str, what: &str, value: &str) -> Result<(), TypeError> {
    if value.is_empty() {
        return Err(TypeError::InvalidComponentId {
            id: format!("{scope}/{path}"),
            reason: format!("empty {what}"),
        });
    }
    if value.contains(['@', ' ', '\t', '\n']) {
        return Err(TypeError::InvalidComponentId {
            id: format!("{scope}/{path}"),
            reason: format!("{what} contains a reserved character"),
        });
    }
    Ok(())
}

fn validate_path(scope: &str, path: &str) -> Result<(), TypeError> {
    validate_segment(scope, path, "path", path)?;
    if path.split('/').any(str::is_empty) {
        return Err(TypeError::InvalidComponentId {
            id: format!("{scope}/{path}"),
            reason: "path has an empty segment".into(),
        });
    }
    Ok(())
}

impl FromStr for ComponentId {
    type Err = TypeError;

    /// Parse `scope/path[@version]`.
    fn from_str(s: &str) -> Result<Self, TypeError> {
        let (name, version) = match s.split_once('@') {
            Some((name, version)) if !version.is_empty() => (name, Some(version.to_string())),
            Some(_) => {
                return Err(TypeError::InvalidComponentId {
                    id: s.into(),
                    reason: "empty version after '@'".into(),
                })
            }
            None => (s, None),
        };
        let (scope, path) = name.split_once('/').ok_or_else(|| TypeError::InvalidComponentId {
            id: s.into(),
            reason: "expected 'scope/path'".into(),
        })?;
        let mut id = ComponentId::new(scope, path)?;
        id.version = version;
        Ok(id)
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(v) => write!(f, "{}/{}@{}", self.scope, self.path, v),
            None => write!(f, "{}/{}", self.scope, self.path),
        }
    }
}

impl fmt::Debug for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentId({self})")
    }
}
