//! Discovery selectors.
use crate::location::ResourceUri;
use crate::unique_id::UniqueId;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// A named code unit (e.g. a test suite type) with the markers it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeUnit {
    /// Fully qualified dotted name, `com.acme.LoginSuite`.
    pub name: String,
    pub markers: BTreeSet<String>,
}

impl CodeUnit {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            markers: BTreeSet::new(),
        }
    }

    pub fn with_marker(mut self, marker: &str) -> Self {
        self.markers.insert(marker.to_string());
        self
    }

    /// Dotted namespace the unit lives in; empty for top-level units.
    pub fn namespace(&self) -> &str {
        self.name
            .rsplit_once('.')
            .map(|(namespace, _)| namespace)
            .unwrap_or("")
    }
}

/// Decides whether a code unit is a feature suite.
pub trait SuitePredicate {
    fn is_suite(&self, unit: &CodeUnit) -> bool;
}

impl<F> SuitePredicate for F
where
    F: Fn(&CodeUnit) -> bool,
{
    fn is_suite(&self, unit: &CodeUnit) -> bool {
        self(unit)
    }
}

/// Suite predicate that looks for a marker by name.
#[derive(Debug, Clone)]
pub struct MarkerPredicate {
    marker: String,
}

impl MarkerPredicate {
    pub fn new(marker: &str) -> Self {
        Self {
            marker: marker.to_string(),
        }
    }
}

impl SuitePredicate for MarkerPredicate {
    fn is_suite(&self, unit: &CodeUnit) -> bool {
        unit.markers.contains(&self.marker)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    CodeUnit(CodeUnit),
    File(PathBuf),
    Directory(PathBuf),
    /// Root of a resource tree; its relative paths are namespace-filtered.
    ClasspathRoot(ResourceUri),
    /// Dotted namespace searched across every resolution root.
    Namespace(String),
    /// Slash-separated resource name relative to the resolution roots.
    Resource(String),
    Uri(ResourceUri),
    UniqueId(UniqueId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SelectorKind {
    CodeUnit,
    File,
    Directory,
    ClasspathRoot,
    Namespace,
    Resource,
    Uri,
    UniqueId,
}

impl SelectorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SelectorKind::CodeUnit => "code_unit",
            SelectorKind::File => "file",
            SelectorKind::Directory => "directory",
            SelectorKind::ClasspathRoot => "classpath_root",
            SelectorKind::Namespace => "namespace",
            SelectorKind::Resource => "resource",
            SelectorKind::Uri => "uri",
            SelectorKind::UniqueId => "unique_id",
        }
    }
}

impl Selector {
    pub fn kind(&self) -> SelectorKind {
        match self {
            Selector::CodeUnit(_) => SelectorKind::CodeUnit,
            Selector::File(_) => SelectorKind::File,
            Selector::Directory(_) => SelectorKind::Directory,
            Selector::ClasspathRoot(_) => SelectorKind::ClasspathRoot,
            Selector::Namespace(_) => SelectorKind::Namespace,
            Selector::Resource(_) => SelectorKind::Resource,
            Selector::Uri(_) => SelectorKind::Uri,
            Selector::UniqueId(_) => SelectorKind::UniqueId,
        }
    }
}
