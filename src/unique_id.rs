//! Hierarchical identifiers for discovered nodes.
//!
//! A `UniqueId` is an append-only list of `(kind, name)` segments. Its
//! canonical rendering is used both for sibling deduplication and for the
//! substring matching done by identifier selectors, so the format must stay
//! stable: `[kind:name]` segments joined by `/`.
use anyhow::{anyhow, Result};
use serde::Serialize;
use std::fmt;

/// Segment kind for the engine root.
pub const ENGINE_SEGMENT: &str = "engine";
/// Segment kind for feature nodes.
pub const FEATURE_SEGMENT: &str = "feature";
/// Segment kind for scenario nodes.
pub const SCENARIO_SEGMENT: &str = "scenario";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Segment {
    pub kind: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct UniqueId {
    segments: Vec<Segment>,
}

impl UniqueId {
    /// The empty path.
    pub fn root() -> Self {
        Self::default()
    }

    /// Single-segment id for an engine root, e.g. `[engine:feature-discovery]`.
    pub fn for_engine(name: &str) -> Self {
        Self::root().append(ENGINE_SEGMENT, name)
    }

    /// Return a new id with one more segment; `self` is left untouched.
    pub fn append(&self, kind: &str, name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment {
            kind: kind.to_string(),
            name: name.to_string(),
        });
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn last_segment(&self) -> Option<&Segment> {
        self.segments.last()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Parse the canonical rendering back into an id.
    ///
    /// The empty string parses to the root path. Segment names may contain
    /// `:` (only the first one separates kind from name) but not `]` or `/`
    /// followed by `[`.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(Self::root());
        }
        let mut segments = Vec::new();
        for part in raw.split("]/[") {
            let part = part.strip_prefix('[').unwrap_or(part);
            let part = part.strip_suffix(']').unwrap_or(part);
            let (kind, name) = part
                .split_once(':')
                .ok_or_else(|| anyhow!("invalid unique id segment {part:?} in {raw:?}"))?;
            if kind.is_empty() {
                return Err(anyhow!("empty segment kind in unique id {raw:?}"));
            }
            segments.push(Segment {
                kind: kind.to_string(),
                name: name.to_string(),
            });
        }
        if !raw.starts_with('[') || !raw.ends_with(']') {
            return Err(anyhow!("unique id must be bracketed segments (got {raw:?})"));
        }
        Ok(Self { segments })
    }
}

impl fmt::Display for UniqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, segment) in self.segments.iter().enumerate() {
            if index > 0 {
                f.write_str("/")?;
            }
            write!(f, "[{}:{}]", segment.kind, segment.name)?;
        }
        Ok(())
    }
}

impl Serialize for UniqueId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_leaves_parent_untouched() {
        let engine = UniqueId::for_engine("fd");
        let feature = engine.append(FEATURE_SEGMENT, "a.feature");

        assert_eq!(engine.segments().len(), 1);
        assert_eq!(feature.segments().len(), 2);
        assert_eq!(feature.to_string(), "[engine:fd]/[feature:a.feature]");
    }

    #[test]
    fn root_renders_empty() {
        assert_eq!(UniqueId::root().to_string(), "");
        assert!(UniqueId::parse("").expect("parse root").is_root());
    }

    #[test]
    fn parse_accepts_canonical_rendering() {
        let id = UniqueId::for_engine("fd")
            .append(FEATURE_SEGMENT, "login.feature")
            .append(SCENARIO_SEGMENT, "user logs in: with sso");

        let parsed = UniqueId::parse(&id.to_string()).expect("parse id");
        assert_eq!(parsed, id);
        assert_eq!(
            parsed.last_segment().map(|segment| segment.name.as_str()),
            Some("user logs in: with sso")
        );
    }

    #[test]
    fn parse_rejects_unbracketed_text() {
        assert!(UniqueId::parse("feature:a.feature").is_err());
        assert!(UniqueId::parse("[nokind]").is_err());
    }
}
