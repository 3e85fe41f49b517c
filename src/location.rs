//! Where a discovered node comes from.
use anyhow::{anyhow, Result};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

pub const FILE_SCHEME: &str = "file";
pub const CLASSPATH_SCHEME: &str = "classpath";

/// Minimal `scheme:scheme-specific-part` URI.
///
/// An empty authority (`file:///tmp/x`) is folded away so that file URIs
/// built from paths and parsed from text compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceUri {
    scheme: String,
    specific: String,
}

impl ResourceUri {
    pub fn new(scheme: &str, specific: &str) -> Self {
        Self {
            scheme: scheme.to_ascii_lowercase(),
            specific: specific.to_string(),
        }
    }

    pub fn from_path(path: &Path) -> Self {
        Self::new(FILE_SCHEME, &path.to_string_lossy().replace('\\', "/"))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let (scheme, rest) = raw
            .split_once(':')
            .ok_or_else(|| anyhow!("URI {raw:?} has no scheme"))?;
        let valid_scheme = scheme
            .chars()
            .next()
            .is_some_and(|first| first.is_ascii_alphabetic())
            && scheme
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '+' | '-' | '.'));
        if !valid_scheme {
            return Err(anyhow!("URI {raw:?} has an invalid scheme"));
        }
        let specific = match rest.strip_prefix("//") {
            Some(after) if after.starts_with('/') => after,
            _ => rest,
        };
        Ok(Self::new(scheme, specific))
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn scheme_specific_part(&self) -> &str {
        &self.specific
    }

    /// Last `/`-separated component of the scheme-specific part.
    pub fn file_name(&self) -> Option<&str> {
        self.specific
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty())
    }

    pub fn to_file_path(&self) -> Option<PathBuf> {
        (self.scheme == FILE_SCHEME).then(|| PathBuf::from(&self.specific))
    }
}

impl fmt::Display for ResourceUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.scheme, self.specific)
    }
}

impl Serialize for ResourceUri {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Location reported for a feature or scenario.
///
/// `Physical` points at the file or resource itself. `Logical` names a code
/// unit (and optionally a member of it) and is used once a suite code unit
/// put the resolution into class mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Location {
    Physical {
        uri: ResourceUri,
    },
    Logical {
        unit: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        member: Option<String>,
    },
}

impl Location {
    pub fn physical(uri: ResourceUri) -> Self {
        Location::Physical { uri }
    }

    pub fn logical(unit: &str, member: Option<&str>) -> Self {
        Location::Logical {
            unit: unit.to_string(),
            member: member.map(str::to_string),
        }
    }

    /// Location for a feature found at `uri`.
    pub fn for_feature(uri: &ResourceUri, class_mode: bool) -> Self {
        if class_mode {
            Self::logical(uri.scheme_specific_part(), None)
        } else {
            Self::physical(uri.clone())
        }
    }

    /// Location for a scenario named `scenario` inside a feature at `self`.
    pub fn for_scenario(&self, scenario: &str) -> Self {
        match self {
            Location::Logical { unit, .. } => Self::logical(unit, Some(scenario)),
            Location::Physical { .. } => self.clone(),
        }
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, Location::Logical { .. })
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Physical { uri } => write!(f, "{uri}"),
            Location::Logical { unit, member: None } => write!(f, "unit:{unit}"),
            Location::Logical {
                unit,
                member: Some(member),
            } => write!(f, "unit:{unit}#{member}"),
        }
    }
}
